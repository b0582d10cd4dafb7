#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Core longitudinal controller (sensor- and actuator-agnostic).
//!
//! Each tick turns a gap/relative-velocity/ego-velocity sample into a bounded,
//! smoothed acceleration request. Upstream and downstream are reached only
//! through `acc_traits::LeadSource` and `acc_traits::CommandSink`.
//!
//! ## Pipeline
//!
//! - **Sanitize**: non-finite samples hold the last good value (`sanitize`)
//! - **Condition**: lead velocity and its derivative through moving averages
//!   (`conditioner`)
//! - **Classify**: five-state traffic mode machine (`classifier`, `mode`)
//! - **Control**: one linear car-following law per mode (`control_law`)
//! - **Post-process**: speed limiter, saturation, anti-jerk low-pass
//!   (`postprocess`)
//!
//! `ControllerLoop` is the entry point: it validates the config once, then
//! owns the `ControllerState` the pipeline runs against. Each host vehicle
//! owns its own loop. All quantities are SI and `f64`.

pub mod classifier;
pub mod conditioner;
pub mod config;
pub mod control_law;
pub mod controller;
pub mod conversions;
pub mod error;
pub mod mocks;
pub mod mode;
pub mod postprocess;
pub mod presets;
pub mod runner;
pub mod sanitize;
pub mod state;

pub use acc_traits::TickInput;
pub use conditioner::ConditionedSignals;
pub use config::{ControllerConfig, GainSchedule, ModeGains, TransitionThresholds};
pub use controller::{ControllerLoop, TickOutput};
pub use error::{BuildError, ControllerError, Result};
pub use mode::Mode;
pub use presets::Preset;
pub use runner::RunStats;
pub use state::ControllerState;
