//! Runtime configuration for the controller.
//!
//! These are the plain-data structs consumed by `ControllerLoop`. They are
//! separate from the TOML-deserialized config in `acc_config`; see
//! `conversions` for the mapping.

use crate::error::BuildError;
use crate::mode::Mode;

/// Upper bound on `ma_window`; the ring buffers are allocated up front.
pub const MAX_MA_WINDOW: usize = 10_000;

/// Gain triple of one linear car-following law.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModeGains {
    /// Distance gain (1/s²).
    pub alpha: f64,
    /// Time headway (s).
    pub tau: f64,
    /// Velocity damping gain (1/s).
    pub beta: f64,
}

impl ModeGains {
    pub const fn new(alpha: f64, tau: f64, beta: f64) -> Self {
        Self { alpha, tau, beta }
    }
}

/// One gain triple per operating mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GainSchedule {
    pub no_wave: ModeGains,
    pub into_wave: ModeGains,
    pub in_wave: ModeGains,
    pub out_of_wave: ModeGains,
}

impl GainSchedule {
    /// Gains for `mode`; `Initial` has no law of its own and maps to `None`.
    pub fn for_mode(&self, mode: Mode) -> Option<&ModeGains> {
        match mode {
            Mode::Initial => None,
            Mode::NoWave => Some(&self.no_wave),
            Mode::IntoWave => Some(&self.into_wave),
            Mode::InWave => Some(&self.in_wave),
            Mode::OutOfWave => Some(&self.out_of_wave),
        }
    }
}

impl Default for GainSchedule {
    fn default() -> Self {
        Self {
            no_wave: ModeGains::new(0.15, 2.0, 0.424),
            into_wave: ModeGains::new(0.7, 2.4, 0.23),
            in_wave: ModeGains::new(0.2, 2.5, 0.35),
            out_of_wave: ModeGains::new(1.1, 2.4, 0.24),
        }
    }
}

/// Smoothed-acceleration thresholds driving the mode classifier (m/s²).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionThresholds {
    /// NoWave -> IntoWave when the lead decelerates harder than this.
    pub into_wave_accel: f64,
    /// IntoWave -> OutOfWave once the lead accelerates at least this much.
    pub leave_into_wave_accel: f64,
    /// InWave -> OutOfWave when the lead accelerates harder than this.
    pub out_of_wave_accel: f64,
    /// OutOfWave -> IntoWave once the lead decelerates at least this much.
    pub back_into_wave_accel: f64,
}

impl Default for TransitionThresholds {
    fn default() -> Self {
        Self {
            into_wave_accel: -0.5,
            leave_into_wave_accel: 0.25,
            out_of_wave_accel: 0.5,
            back_into_wave_accel: -0.25,
        }
    }
}

/// Immutable per-run controller configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerConfig {
    /// Smoothed lead velocity above which traffic is considered free (m/s).
    pub no_wave_velo: f64,
    /// Smoothed lead velocity at or below which traffic is a wave (m/s).
    pub wave_velo: f64,
    /// Desired cruise velocity in free traffic (m/s).
    pub max_velo: f64,
    pub gains: GainSchedule,
    /// Standstill gap the laws regulate to (m).
    pub desired_distance: f64,
    pub max_accel: f64,
    pub max_decel: f64,
    /// Above this ego velocity only deceleration is permitted (m/s).
    pub speed_limit: f64,
    /// Beyond this gap the lead no longer constrains the ego (m).
    pub far_threshold: f64,
    /// Below this gap a slow lead forces the controller into the wave (m).
    pub close_threshold: f64,
    /// Gap substituted when upstream reports no lead vehicle (m).
    pub no_lead_distance: f64,
    /// Anti-jerk low-pass coefficient, in (0, 1]. 1.0 disables smoothing.
    pub filter_coeff: f64,
    /// Moving-average window length in samples.
    pub ma_window: usize,
    /// 1/dt of the tick, used by the lead-acceleration derivative.
    pub sample_rate_factor: f64,
    /// Saturation applied to the raw lead acceleration before smoothing.
    pub accel_sat_min: f64,
    pub accel_sat_max: f64,
    pub transitions: TransitionThresholds,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            no_wave_velo: 13.5,
            wave_velo: 10.0,
            max_velo: 25.0,
            gains: GainSchedule::default(),
            desired_distance: 10.0,
            max_accel: 1.5,
            max_decel: -3.0,
            speed_limit: 35.0,
            far_threshold: 200.0,
            close_threshold: 75.0,
            no_lead_distance: 500.0,
            filter_coeff: 0.65,
            ma_window: 10,
            sample_rate_factor: 20.0,
            accel_sat_min: -3.5,
            accel_sat_max: 2.0,
            transitions: TransitionThresholds::default(),
        }
    }
}

fn finite(v: f64, what: &'static str) -> Result<(), BuildError> {
    if v.is_finite() {
        Ok(())
    } else {
        Err(BuildError::InvalidConfig(what))
    }
}

impl ControllerConfig {
    /// Check every invariant the tick relies on. Called by `ControllerLoop::new`.
    pub fn validate(&self) -> Result<(), BuildError> {
        if self.ma_window == 0 || self.ma_window > MAX_MA_WINDOW {
            return Err(BuildError::InvalidWindow);
        }
        for mode in Mode::OPERATING {
            let Some(g) = self.gains.for_mode(mode) else {
                continue;
            };
            for (field, v) in [("alpha", g.alpha), ("tau", g.tau), ("beta", g.beta)] {
                if !v.is_finite() {
                    return Err(BuildError::NonFiniteGain { mode, field });
                }
            }
        }
        self.validate_velocity_thresholds()?;

        finite(self.max_accel, "max_accel must be finite")?;
        finite(self.max_decel, "max_decel must be finite")?;
        if !(self.max_decel < 0.0 && self.max_accel > 0.0) {
            return Err(BuildError::InvalidConfig(
                "limits must satisfy max_decel < 0 < max_accel",
            ));
        }
        finite(self.desired_distance, "desired_distance must be finite")?;
        if self.desired_distance < 0.0 {
            return Err(BuildError::InvalidConfig("desired_distance must be >= 0"));
        }
        finite(self.speed_limit, "speed_limit must be finite")?;
        if self.speed_limit <= 0.0 {
            return Err(BuildError::InvalidConfig("speed_limit must be > 0"));
        }

        finite(self.far_threshold, "far_threshold must be finite")?;
        finite(self.close_threshold, "close_threshold must be finite")?;
        finite(self.no_lead_distance, "no_lead_distance must be finite")?;
        if self.close_threshold < 0.0 || self.close_threshold > self.far_threshold {
            return Err(BuildError::InvalidConfig(
                "close_threshold must be in [0, far_threshold]",
            ));
        }
        if self.no_lead_distance <= self.far_threshold {
            return Err(BuildError::InvalidConfig(
                "no_lead_distance must be > far_threshold",
            ));
        }

        if !(self.filter_coeff > 0.0 && self.filter_coeff <= 1.0) {
            return Err(BuildError::InvalidConfig("filter_coeff must be in (0.0, 1.0]"));
        }
        if !(self.sample_rate_factor.is_finite() && self.sample_rate_factor > 0.0) {
            return Err(BuildError::InvalidConfig("sample_rate_factor must be > 0"));
        }
        finite(self.accel_sat_min, "accel_sat_min must be finite")?;
        finite(self.accel_sat_max, "accel_sat_max must be finite")?;
        if self.accel_sat_min >= self.accel_sat_max {
            return Err(BuildError::InvalidConfig(
                "accel_sat_min must be < accel_sat_max",
            ));
        }

        let t = &self.transitions;
        for v in [
            t.into_wave_accel,
            t.leave_into_wave_accel,
            t.out_of_wave_accel,
            t.back_into_wave_accel,
        ] {
            finite(v, "transition thresholds must be finite")?;
        }
        Ok(())
    }

    /// The subset adjustable at deployment time.
    pub(crate) fn validate_velocity_thresholds(&self) -> Result<(), BuildError> {
        finite(self.no_wave_velo, "no_wave_velo must be finite")?;
        finite(self.wave_velo, "wave_velo must be finite")?;
        finite(self.max_velo, "max_velo must be finite")?;
        if self.wave_velo < 0.0 {
            return Err(BuildError::InvalidConfig("wave_velo must be >= 0"));
        }
        if self.wave_velo > self.no_wave_velo {
            return Err(BuildError::InvalidConfig("wave_velo must be <= no_wave_velo"));
        }
        if self.max_velo <= 0.0 {
            return Err(BuildError::InvalidConfig("max_velo must be > 0"));
        }
        Ok(())
    }

    /// Tick period in seconds.
    pub fn dt(&self) -> f64 {
        1.0 / self.sample_rate_factor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn defaults_are_valid() {
        ControllerConfig::default().validate().unwrap();
        assert!((ControllerConfig::default().dt() - 0.05).abs() < 1e-12);
    }

    #[rstest]
    #[case::zero_window(|c: &mut ControllerConfig| c.ma_window = 0, BuildError::InvalidWindow)]
    #[case::huge_window(|c: &mut ControllerConfig| c.ma_window = 1 << 40, BuildError::InvalidWindow)]
    #[case::decel_not_negative(
        |c: &mut ControllerConfig| c.max_decel = 0.0,
        BuildError::InvalidConfig("limits must satisfy max_decel < 0 < max_accel")
    )]
    #[case::accel_not_positive(
        |c: &mut ControllerConfig| c.max_accel = -0.1,
        BuildError::InvalidConfig("limits must satisfy max_decel < 0 < max_accel")
    )]
    #[case::nan_gain(
        |c: &mut ControllerConfig| c.gains.in_wave.tau = f64::NAN,
        BuildError::NonFiniteGain { mode: Mode::InWave, field: "tau" }
    )]
    #[case::filter_zero(
        |c: &mut ControllerConfig| c.filter_coeff = 0.0,
        BuildError::InvalidConfig("filter_coeff must be in (0.0, 1.0]")
    )]
    #[case::wave_above_no_wave(
        |c: &mut ControllerConfig| c.wave_velo = 20.0,
        BuildError::InvalidConfig("wave_velo must be <= no_wave_velo")
    )]
    #[case::negative_wave_velo(
        |c: &mut ControllerConfig| c.wave_velo = -3.0,
        BuildError::InvalidConfig("wave_velo must be >= 0")
    )]
    #[case::inverted_limits(
        |c: &mut ControllerConfig| c.max_decel = 2.0,
        BuildError::InvalidConfig("limits must satisfy max_decel < 0 < max_accel")
    )]
    #[case::no_lead_inside_far(
        |c: &mut ControllerConfig| c.no_lead_distance = 150.0,
        BuildError::InvalidConfig("no_lead_distance must be > far_threshold")
    )]
    fn rejects_invalid(#[case] mutate: fn(&mut ControllerConfig), #[case] expected: BuildError) {
        let mut cfg = ControllerConfig::default();
        mutate(&mut cfg);
        assert_eq!(cfg.validate(), Err(expected));
    }

    #[test]
    fn filter_coeff_one_is_accepted() {
        let cfg = ControllerConfig {
            filter_coeff: 1.0,
            ma_window: 1,
            ..ControllerConfig::default()
        };
        cfg.validate().unwrap();
    }
}
