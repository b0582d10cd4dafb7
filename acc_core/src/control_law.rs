//! Per-mode linear car-following laws.
//!
//! Every law works on the gap error `lead_dist - desired_distance` with the
//! mode's own `(alpha, tau, beta)`. Relative velocity is lead minus ego.

use crate::config::{ControllerConfig, ModeGains};
use crate::mode::Mode;

/// Gain of the soft velocity gate used in free traffic (1/s).
const SOFT_GATE_GAIN: f64 = 0.333;
/// Velocity error at which the soft gate saturates (m/s).
const SOFT_GATE_SPAN: f64 = 3.0;

/// Inputs shared by all laws, already sanitized.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LawInput {
    pub lead_dist: f64,
    pub rel_vel: f64,
    pub ego_vel: f64,
}

/// Raw (pre-post-processing) acceleration request for `mode`.
///
/// `Initial` never reaches dispatch in a running controller; it requests 0.
pub fn command(mode: Mode, input: &LawInput, cfg: &ControllerConfig) -> f64 {
    let g = &cfg.gains;
    match mode {
        Mode::Initial => 0.0,
        Mode::NoWave => no_wave(&g.no_wave, input, cfg),
        Mode::IntoWave => into_wave(&g.into_wave, input, cfg),
        Mode::InWave => in_wave(&g.in_wave, input, cfg),
        Mode::OutOfWave => out_of_wave(&g.out_of_wave, input, cfg),
    }
}

/// Soft velocity gate in [0, 1]: 1 well below cruise speed, 0 at or above it.
pub fn velocity_gate(ego_vel: f64, cfg: &ControllerConfig) -> f64 {
    let target = cfg.max_velo.min(cfg.speed_limit);
    (SOFT_GATE_GAIN * (target - ego_vel).clamp(0.0, SOFT_GATE_SPAN)).min(1.0)
}

/// Free traffic: the saturated distance law, scaled by the velocity gate.
pub fn no_wave(g: &ModeGains, x: &LawInput, cfg: &ControllerConfig) -> f64 {
    let error = x.lead_dist - cfg.desired_distance;
    let distance_accel = (error - g.tau * x.rel_vel) * g.alpha + g.beta * x.ego_vel;
    let distance_accel = distance_accel.clamp(cfg.max_decel, cfg.max_accel);
    velocity_gate(x.ego_vel, cfg) * distance_accel
}

/// Closing on a wave. Unsaturated here.
pub fn into_wave(g: &ModeGains, x: &LawInput, cfg: &ControllerConfig) -> f64 {
    let error = x.lead_dist - cfg.desired_distance;
    g.alpha * (error - g.tau * x.ego_vel) + g.beta * x.rel_vel
}

/// Following inside the wave, saturated immediately.
pub fn in_wave(g: &ModeGains, x: &LawInput, cfg: &ControllerConfig) -> f64 {
    let error = x.lead_dist - cfg.desired_distance;
    let raw = g.alpha * (error - g.tau * x.rel_vel) + g.beta * x.rel_vel;
    raw.clamp(cfg.max_decel, cfg.max_accel)
}

/// Leaving the wave. Unsaturated here; the post-processor bounds it.
pub fn out_of_wave(g: &ModeGains, x: &LawInput, cfg: &ControllerConfig) -> f64 {
    let error = x.lead_dist - cfg.desired_distance;
    g.alpha * (error - g.tau * x.ego_vel) + g.beta * x.rel_vel
}
