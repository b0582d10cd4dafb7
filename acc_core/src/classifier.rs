//! Five-state traffic-mode classifier.
//!
//! Only the predicates of the current mode are evaluated, in table order, and
//! the first match wins. At most one transition happens per tick; when nothing
//! matches the mode holds.

use crate::conditioner::ConditionedSignals;
use crate::config::ControllerConfig;
use crate::mode::Mode;

/// Why a transition fired. Carried into the debug log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reason {
    /// Initial: fast lead or no lead in range.
    FreeTraffic,
    /// Initial: slow lead within range.
    SlowLead,
    /// NoWave: slow lead braking within range.
    LeadBraking,
    /// NoWave: slow lead inside the close threshold.
    SlowLeadClose,
    /// IntoWave: lead velocity fell to wave speed.
    ReachedWaveSpeed,
    /// Lead accelerating away.
    LeadAccelerating,
    /// Lead beyond the far threshold.
    LeadFar,
    /// OutOfWave: lead back above free-traffic speed.
    LeadFast,
    /// OutOfWave: lead braking again.
    LeadBrakingAgain,
}

impl Reason {
    pub fn as_str(self) -> &'static str {
        match self {
            Reason::FreeTraffic => "free_traffic",
            Reason::SlowLead => "slow_lead",
            Reason::LeadBraking => "lead_braking",
            Reason::SlowLeadClose => "slow_lead_close",
            Reason::ReachedWaveSpeed => "reached_wave_speed",
            Reason::LeadAccelerating => "lead_accelerating",
            Reason::LeadFar => "lead_far",
            Reason::LeadFast => "lead_fast",
            Reason::LeadBrakingAgain => "lead_braking_again",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: Mode,
    pub to: Mode,
    pub reason: Reason,
}

/// Evaluate the outgoing edges of `current`. `None` means hold.
pub fn transition(
    current: Mode,
    signals: &ConditionedSignals,
    lead_dist: f64,
    cfg: &ControllerConfig,
) -> Option<Transition> {
    let v = signals.smoothed_velocity;
    let a = signals.smoothed_accel;
    let th = &cfg.transitions;
    let far = lead_dist > cfg.far_threshold;

    let (to, reason) = match current {
        Mode::Initial => {
            if v > cfg.no_wave_velo || far {
                (Mode::NoWave, Reason::FreeTraffic)
            } else {
                (Mode::InWave, Reason::SlowLead)
            }
        }
        Mode::NoWave => {
            let slow = v < cfg.no_wave_velo;
            if a < th.into_wave_accel && slow && lead_dist < cfg.far_threshold {
                (Mode::IntoWave, Reason::LeadBraking)
            } else if slow && lead_dist < cfg.close_threshold {
                (Mode::IntoWave, Reason::SlowLeadClose)
            } else {
                return None;
            }
        }
        Mode::IntoWave => {
            if v <= cfg.wave_velo {
                (Mode::InWave, Reason::ReachedWaveSpeed)
            } else if a >= th.leave_into_wave_accel {
                (Mode::OutOfWave, Reason::LeadAccelerating)
            } else if far {
                (Mode::NoWave, Reason::LeadFar)
            } else {
                return None;
            }
        }
        Mode::InWave => {
            if a > th.out_of_wave_accel && v > cfg.wave_velo {
                (Mode::OutOfWave, Reason::LeadAccelerating)
            } else if far {
                (Mode::NoWave, Reason::LeadFar)
            } else {
                return None;
            }
        }
        Mode::OutOfWave => {
            if v > cfg.no_wave_velo {
                (Mode::NoWave, Reason::LeadFast)
            } else if far {
                (Mode::NoWave, Reason::LeadFar)
            } else if a <= th.back_into_wave_accel {
                (Mode::IntoWave, Reason::LeadBrakingAgain)
            } else {
                return None;
            }
        }
    };
    debug_assert!(current.can_transition_to(to));
    Some(Transition {
        from: current,
        to,
        reason,
    })
}

/// Mode for this tick: the transition target, or `current` when holding.
pub fn next_mode(
    current: Mode,
    signals: &ConditionedSignals,
    lead_dist: f64,
    cfg: &ControllerConfig,
) -> Mode {
    transition(current, signals, lead_dist, cfg).map_or(current, |t| t.to)
}
