//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "acc", version, about = "Adaptive cruise control replay and tuning CLI")]
pub struct Cli {
    /// Path to config TOML; without it the selected preset is used as-is
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Optional gain-schedule CSV (strict header: mode,alpha,tau,beta)
    #[arg(long, value_name = "FILE")]
    pub gains: Option<PathBuf>,

    /// Base preset; replaces the `preset` key of the config file
    #[arg(long, value_enum, value_name = "NAME")]
    pub preset: Option<PresetArg>,

    /// Emit JSON lines instead of text (output, logs and errors)
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace); RUST_LOG wins when set
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum PresetArg {
    Default,
    Conservative,
    Aggressive,
}

impl From<PresetArg> for acc_config::PresetName {
    fn from(p: PresetArg) -> Self {
        match p {
            PresetArg::Default => Self::Default,
            PresetArg::Conservative => Self::Conservative,
            PresetArg::Aggressive => Self::Aggressive,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a recorded CSV trace (lead_dist,rel_vel,ego_vel) through the controller
    Replay {
        /// Trace CSV; an empty or `inf` lead_dist means no lead vehicle
        #[arg(value_name = "TRACE")]
        trace: PathBuf,
        /// Only print the run summary, not every tick
        #[arg(long, action = ArgAction::SetTrue)]
        summary: bool,
    },
    /// Load, merge and validate the configuration, then print the effective values
    CheckConfig,
    /// List the built-in presets, or print one in full
    Presets {
        #[arg(value_enum, value_name = "NAME")]
        name: Option<PresetArg>,
    },
}
