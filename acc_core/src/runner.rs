//! Drive a controller from a `LeadSource` into a `CommandSink` until the
//! source is exhausted.

use acc_traits::{CommandSink, LeadSource};
use eyre::WrapErr;

use crate::controller::ControllerLoop;
use crate::error::{ControllerError, Result};

/// Counters gathered over one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub ticks: u64,
    pub mode_changes: u64,
    /// Ticks whose raw command fell outside `[max_decel, max_accel]`.
    pub saturated_ticks: u64,
}

/// Tick `controller` once per sample. Stops at the first source or sink
/// error; the controller keeps whatever state it reached.
pub fn run<S, K>(source: &mut S, sink: &mut K, controller: &mut ControllerLoop) -> Result<RunStats>
where
    S: LeadSource + ?Sized,
    K: CommandSink + ?Sized,
{
    let mut stats = RunStats::default();
    let (lo, hi) = (controller.config().max_decel, controller.config().max_accel);

    loop {
        let sample = source
            .next_sample()
            .map_err(|e| eyre::Report::new(ControllerError::Source(e.to_string())))
            .wrap_err_with(|| format!("reading sample {}", stats.ticks))?;
        let Some(input) = sample else { break };

        let before = controller.mode();
        let out = controller.tick(&input);
        if out.mode != before {
            stats.mode_changes += 1;
        }
        if out.raw_cmd < lo || out.raw_cmd > hi {
            stats.saturated_ticks += 1;
        }

        sink.publish(stats.ticks, out.cmd_accel, out.mode.as_str())
            .map_err(|e| eyre::Report::new(ControllerError::Sink(e.to_string())))
            .wrap_err_with(|| format!("publishing command for tick {}", stats.ticks))?;
        stats.ticks += 1;
    }

    tracing::info!(
        ticks = stats.ticks,
        mode_changes = stats.mode_changes,
        saturated_ticks = stats.saturated_ticks,
        final_mode = controller.mode().as_str(),
        "run complete"
    );
    Ok(stats)
}
