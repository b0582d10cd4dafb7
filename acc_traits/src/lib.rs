//! Seams between the controller core and the collaborators around it.
//!
//! - `LeadSource`: upstream perception/sensor fusion, one sample per tick.
//! - `CommandSink`: downstream consumer of the requested acceleration
//!   (typically an independent safety-override layer).
//!
//! Both traits use boxed errors so hosts can plug in any transport.

use std::error::Error;

pub type BoxError = Box<dyn Error + Send + Sync>;

/// One tick worth of measurements, SI units.
///
/// `lead_dist == None` (or `Some(f64::INFINITY)`) means no lead vehicle is
/// currently detected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickInput {
    /// Space gap to the lead vehicle (m).
    pub lead_dist: Option<f64>,
    /// Lead velocity minus ego velocity (m/s).
    pub rel_vel: f64,
    /// Ego velocity (m/s).
    pub ego_vel: f64,
}

impl TickInput {
    pub fn new(lead_dist: f64, rel_vel: f64, ego_vel: f64) -> Self {
        Self {
            lead_dist: Some(lead_dist),
            rel_vel,
            ego_vel,
        }
    }

    /// Sample with no lead vehicle in range.
    pub fn no_lead(rel_vel: f64, ego_vel: f64) -> Self {
        Self {
            lead_dist: None,
            rel_vel,
            ego_vel,
        }
    }
}

/// Upstream stage delivering samples in arrival order.
pub trait LeadSource {
    /// Next sample, or `Ok(None)` once the stream is exhausted.
    fn next_sample(&mut self) -> Result<Option<TickInput>, BoxError>;
}

/// Downstream stage consuming the requested acceleration.
///
/// The published value is a request: the sink may override it before it
/// reaches the actuator.
pub trait CommandSink {
    fn publish(&mut self, tick: u64, cmd_accel: f64, mode: &'static str) -> Result<(), BoxError>;
}

impl<T: LeadSource + ?Sized> LeadSource for Box<T> {
    fn next_sample(&mut self) -> Result<Option<TickInput>, BoxError> {
        (**self).next_sample()
    }
}

impl<T: CommandSink + ?Sized> CommandSink for Box<T> {
    fn publish(&mut self, tick: u64, cmd_accel: f64, mode: &'static str) -> Result<(), BoxError> {
        (**self).publish(tick, cmd_accel, mode)
    }
}
