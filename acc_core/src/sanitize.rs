//! Guards the filters against corrupt upstream samples.
//!
//! Policy: a non-finite value is replaced by the last sanitized value of the
//! same channel. Before any good value exists the channel falls back to a safe
//! default (0 for velocities, `far_threshold` for distance). An explicit
//! "no lead" report is not a fault; it maps to `no_lead_distance`.

use acc_traits::TickInput;

use crate::config::ControllerConfig;

/// Finite, non-negative tick values ready for conditioning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SanitizedInput {
    pub lead_dist: f64,
    pub rel_vel: f64,
    pub ego_vel: f64,
    /// True when upstream reported no lead vehicle this tick.
    pub no_lead: bool,
    /// Number of channels that were substituted this tick.
    pub substituted: u8,
}

/// Hold-last-good memory per channel.
#[derive(Debug, Clone, Default)]
pub struct InputSanitizer {
    last_lead_dist: Option<f64>,
    last_rel_vel: Option<f64>,
    last_ego_vel: Option<f64>,
}

impl InputSanitizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sanitize(&mut self, input: &TickInput, cfg: &ControllerConfig) -> SanitizedInput {
        let mut substituted = 0u8;
        let (lead_dist, no_lead) = match input.lead_dist {
            None => (cfg.no_lead_distance, true),
            Some(d) if d == f64::INFINITY => (cfg.no_lead_distance, true),
            Some(d) => (
                hold(d, 0.0, &mut self.last_lead_dist, cfg.far_threshold, &mut substituted),
                false,
            ),
        };
        if no_lead {
            self.last_lead_dist = Some(lead_dist);
        }
        let rel_vel = hold(
            input.rel_vel,
            f64::NEG_INFINITY,
            &mut self.last_rel_vel,
            0.0,
            &mut substituted,
        );
        let ego_vel = hold(input.ego_vel, 0.0, &mut self.last_ego_vel, 0.0, &mut substituted);

        if substituted > 0 {
            tracing::debug!(
                substituted,
                lead_dist,
                rel_vel,
                ego_vel,
                "non-finite input replaced with last good value"
            );
        }
        SanitizedInput {
            lead_dist,
            rel_vel,
            ego_vel,
            no_lead,
            substituted,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

// Finiteness is checked before clamping: f64::max would turn NaN into `floor`.
#[inline]
fn hold(x: f64, floor: f64, last: &mut Option<f64>, default: f64, substituted: &mut u8) -> f64 {
    if x.is_finite() {
        let v = x.max(floor);
        *last = Some(v);
        v
    } else {
        *substituted += 1;
        last.unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> ControllerConfig {
        ControllerConfig::default()
    }

    #[test]
    fn finite_values_pass_through() {
        let mut s = InputSanitizer::new();
        let out = s.sanitize(&TickInput::new(42.0, -1.5, 12.0), &cfg());
        assert_eq!(
            (out.lead_dist, out.rel_vel, out.ego_vel, out.no_lead, out.substituted),
            (42.0, -1.5, 12.0, false, 0)
        );
    }

    #[test]
    fn first_tick_uses_safe_defaults() {
        let mut s = InputSanitizer::new();
        let out = s.sanitize(
            &TickInput::new(f64::NEG_INFINITY, f64::NAN, f64::INFINITY),
            &cfg(),
        );
        assert_eq!(out.lead_dist, 200.0);
        assert_eq!(out.rel_vel, 0.0);
        assert_eq!(out.ego_vel, 0.0);
        assert_eq!(out.substituted, 3);
    }

    #[test]
    fn holds_last_good_value() {
        let mut s = InputSanitizer::new();
        s.sanitize(&TickInput::new(30.0, -2.0, 15.0), &cfg());
        let out = s.sanitize(&TickInput::new(f64::NAN, f64::NAN, f64::NAN), &cfg());
        assert_eq!((out.lead_dist, out.rel_vel, out.ego_vel), (30.0, -2.0, 15.0));
        assert_eq!(out.substituted, 3);
    }

    #[test]
    fn no_lead_is_not_a_fault() {
        let mut s = InputSanitizer::new();
        let out = s.sanitize(&TickInput::no_lead(0.0, 20.0), &cfg());
        assert!(out.no_lead);
        assert_eq!(out.lead_dist, 500.0);
        assert_eq!(out.substituted, 0);

        let out = s.sanitize(&TickInput::new(f64::INFINITY, 0.0, 20.0), &cfg());
        assert!(out.no_lead);
        assert_eq!(out.substituted, 0);

        // A later glitch holds the no-lead distance.
        let out = s.sanitize(&TickInput::new(f64::NAN, 0.0, 20.0), &cfg());
        assert_eq!(out.lead_dist, 500.0);
    }

    #[test]
    fn negative_distance_and_speed_clamp_to_zero() {
        let mut s = InputSanitizer::new();
        let out = s.sanitize(&TickInput::new(-0.3, 1.0, -0.01), &cfg());
        assert_eq!(out.lead_dist, 0.0);
        assert_eq!(out.ego_vel, 0.0);
    }
}
