use thiserror::Error;

use crate::mode::Mode;

/// Errors raised while driving the controller against its collaborators.
#[derive(Debug, Error, Clone)]
pub enum ControllerError {
    #[error("lead source error: {0}")]
    Source(String),
    #[error("command sink error: {0}")]
    Sink(String),
}

/// Construction-time failures. A controller is never built from a config
/// that produces one of these.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum BuildError {
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
    #[error("non-finite gain {field} for mode {mode}")]
    NonFiniteGain { mode: Mode, field: &'static str },
    #[error("moving-average window must be in [1, 10000]")]
    InvalidWindow,
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
