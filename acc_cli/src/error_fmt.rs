//! Human-readable error descriptions, exit codes and structured JSON errors.

use acc_core::error::{BuildError, ControllerError};

/// Problems with the configuration inputs themselves (file, preset, gains CSV).
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("invalid configuration: {0}")]
    Config(String),
}

pub const EXIT_OTHER: i32 = 1;
pub const EXIT_CONFIG: i32 = 3;

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    // Typed matches first
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: An out-of-range value in the TOML, or a preset combined with an override that contradicts it.\nHow to fix: Run `acc check-config` with the same flags, edit the file, then rerun."
            ),
            BuildError::NonFiniteGain { mode, field } => format!(
                "What happened: Gain {field} for mode {mode} is not a finite number.\nLikely causes: nan/inf in [gains.{mode}] or in the gain-schedule CSV.\nHow to fix: Replace the value with a finite number."
            ),
            BuildError::InvalidWindow => {
                "What happened: The moving-average window is out of range.\nLikely causes: filter.ma_window is 0 or above 10000 in the config.\nHow to fix: Set filter.ma_window between 1 and 10000.".to_string()
            }
        };
    }

    if let Some(ce) = err.downcast_ref::<ControllerError>() {
        return match ce {
            ControllerError::Source(msg) => format!(
                "What happened: Reading the trace failed ({msg}).\nLikely causes: A malformed row or a non-numeric value in the trace CSV.\nHow to fix: Fix the reported row; each row needs lead_dist,rel_vel,ego_vel (lead_dist may be empty)."
            ),
            ControllerError::Sink(msg) => format!(
                "What happened: Writing the command output failed ({msg}).\nLikely causes: stdout was closed early (for example by a pipe to `head`).\nHow to fix: Write the output to a file or use --summary."
            ),
        };
    }

    // String-based heuristics for errors coming from file handling
    let msg = format!("{err:#}");
    let lower = msg.to_ascii_lowercase();

    if lower.contains("gain csv must have headers") {
        return "Invalid headers in gain CSV. Expected 'mode,alpha,tau,beta'.".to_string();
    }
    if lower.contains("trace csv must have headers") {
        return "Invalid headers in trace CSV. Expected 'lead_dist,rel_vel,ego_vel'.".to_string();
    }
    if let Some(CliError::Config(msg)) = err.downcast_ref::<CliError>() {
        return format!(
            "What happened: Invalid configuration ({msg}).\nLikely causes: Missing file, TOML syntax error, unknown key, or out-of-range value.\nHow to fix: Edit the config file, then rerun `acc check-config`."
        );
    }

    if lower.contains("open trace csv") {
        return format!(
            "What happened: The trace file could not be opened.\nLikely causes: Wrong path or missing permissions.\nHow to fix: Check the path passed to `acc replay`. Original: {msg}"
        );
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Configuration problems exit with 3; everything else with 1. Usage errors
/// never get here: clap exits with 2 itself.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    if err.downcast_ref::<BuildError>().is_some() || err.downcast_ref::<CliError>().is_some() {
        return EXIT_CONFIG;
    }
    EXIT_OTHER
}

fn reason_name(err: &eyre::Report) -> &'static str {
    if err.downcast_ref::<BuildError>().is_some() || err.downcast_ref::<CliError>().is_some() {
        return "InvalidConfig";
    }
    match err.downcast_ref::<ControllerError>() {
        Some(ControllerError::Source(_)) => "SourceError",
        Some(ControllerError::Sink(_)) => "SinkError",
        None => "Error",
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;

    json!({
        "reason": reason_name(err),
        "message": humanize(err),
        "exit_code": exit_code_for_error(err),
    })
    .to_string()
}
