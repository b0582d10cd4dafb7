//! Test and helper doubles for the `acc_traits` seams.

use acc_traits::{BoxError, CommandSink, LeadSource, TickInput};

/// Replays a fixed list of samples, then reports exhaustion.
#[derive(Debug, Clone, Default)]
pub struct VecSource {
    samples: std::vec::IntoIter<TickInput>,
}

impl VecSource {
    pub fn new(samples: Vec<TickInput>) -> Self {
        Self {
            samples: samples.into_iter(),
        }
    }
}

impl LeadSource for VecSource {
    fn next_sample(&mut self) -> Result<Option<TickInput>, BoxError> {
        Ok(self.samples.next())
    }
}

/// One published command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Published {
    pub tick: u64,
    pub cmd_accel: f64,
    pub mode: &'static str,
}

/// Keeps every published command in memory.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    pub published: Vec<Published>,
}

impl CommandSink for RecordingSink {
    fn publish(&mut self, tick: u64, cmd_accel: f64, mode: &'static str) -> Result<(), BoxError> {
        self.published.push(Published {
            tick,
            cmd_accel,
            mode,
        });
        Ok(())
    }
}

/// A sink that rejects every command; exercises error mapping in the runner.
pub struct FailingSink;

impl CommandSink for FailingSink {
    fn publish(&mut self, _tick: u64, _cmd_accel: f64, _mode: &'static str) -> Result<(), BoxError> {
        Err(Box::new(std::io::Error::other("actuator bus offline")))
    }
}
