//! The per-tick pipeline and the `ControllerLoop` wrapper that owns a config
//! and its state.
//!
//! Order inside one tick is fixed: sanitize, condition, classify, control law
//! (with the mode chosen on this tick), post-process.

use acc_traits::TickInput;

use crate::classifier;
use crate::conditioner::ConditionedSignals;
use crate::config::ControllerConfig;
use crate::control_law::{self, LawInput};
use crate::error::BuildError;
use crate::mode::Mode;
use crate::state::ControllerState;

/// Result of one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickOutput {
    /// Bounded, smoothed acceleration command (m/s²).
    pub cmd_accel: f64,
    /// Mode in force after this tick's classification.
    pub mode: Mode,
    /// Control-law output before the safety stages.
    pub raw_cmd: f64,
}

/// Run one controller tick against `state`.
///
/// Never fails: every input has already been made finite by the sanitizer.
/// `cfg` must be the validated config `state` was built from; `ControllerLoop`
/// is the only caller and keeps the two together.
pub(crate) fn tick(
    input: &TickInput,
    cfg: &ControllerConfig,
    state: &mut ControllerState,
) -> TickOutput {
    let x = state.sanitizer.sanitize(input, cfg);
    let signals = state.conditioner.condition(x.rel_vel, x.ego_vel, cfg);

    if let Some(t) = classifier::transition(state.mode, &signals, x.lead_dist, cfg) {
        tracing::debug!(
            from = t.from.as_str(),
            to = t.to.as_str(),
            reason = t.reason.as_str(),
            tick = state.ticks,
            lead_velocity = signals.smoothed_velocity,
            lead_accel = signals.smoothed_accel,
            lead_dist = x.lead_dist,
            "mode transition"
        );
        state.mode = t.to;
    }

    let law = LawInput {
        lead_dist: x.lead_dist,
        rel_vel: x.rel_vel,
        ego_vel: x.ego_vel,
    };
    let raw_cmd = control_law::command(state.mode, &law, cfg);
    let cmd_accel = state.post.apply(raw_cmd, x.ego_vel, cfg);

    tracing::trace!(
        tick = state.ticks,
        mode = state.mode.as_str(),
        raw_cmd,
        cmd_accel,
        "tick"
    );

    state.last_signals = Some(signals);
    state.ticks = state.ticks.wrapping_add(1);
    TickOutput {
        cmd_accel,
        mode: state.mode,
        raw_cmd,
    }
}

/// A validated config bundled with the state it drives.
#[derive(Clone)]
pub struct ControllerLoop {
    config: ControllerConfig,
    state: ControllerState,
}

impl core::fmt::Debug for ControllerLoop {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ControllerLoop")
            .field("mode", &self.state.mode)
            .field("ticks", &self.state.ticks)
            .field("filtered_cmd_accel", &self.state.filtered_cmd_accel())
            .finish_non_exhaustive()
    }
}

impl ControllerLoop {
    /// Validate `config` and build a controller in `Initial` mode.
    pub fn new(config: ControllerConfig) -> Result<Self, BuildError> {
        config.validate()?;
        tracing::debug!(
            ma_window = config.ma_window,
            filter_coeff = config.filter_coeff,
            no_wave_velo = config.no_wave_velo,
            wave_velo = config.wave_velo,
            max_velo = config.max_velo,
            "controller built"
        );
        let state = ControllerState::new(&config);
        Ok(Self { config, state })
    }

    pub fn tick(&mut self, input: &TickInput) -> TickOutput {
        tick(input, &self.config, &mut self.state)
    }

    /// Back to `Initial` with empty buffers; the config is kept.
    pub fn reset(&mut self) {
        self.state.reset();
    }

    pub fn mode(&self) -> Mode {
        self.state.mode
    }

    pub fn last_signals(&self) -> Option<&ConditionedSignals> {
        self.state.last_signals()
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    /// Adjust the classifier velocity thresholds between ticks.
    ///
    /// The new values are validated as a set; on error the previous
    /// thresholds stay in force.
    pub fn set_velocity_thresholds(
        &mut self,
        no_wave_velo: f64,
        wave_velo: f64,
        max_velo: f64,
    ) -> Result<(), BuildError> {
        let mut candidate = self.config.clone();
        candidate.no_wave_velo = no_wave_velo;
        candidate.wave_velo = wave_velo;
        candidate.max_velo = max_velo;
        candidate.validate_velocity_thresholds()?;
        tracing::debug!(no_wave_velo, wave_velo, max_velo, "velocity thresholds updated");
        self.config = candidate;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> ControllerLoop {
        ControllerLoop::new(ControllerConfig::default()).unwrap()
    }

    #[test]
    fn first_tick_leaves_initial() {
        let mut c = controller();
        assert_eq!(c.mode(), Mode::Initial);
        let out = c.tick(&TickInput::new(100.0, 0.0, 10.0));
        assert_eq!(out.mode, Mode::InWave);
        assert_eq!(out.raw_cmd, 1.5);
        assert!((out.cmd_accel - 0.65 * 1.5).abs() < 1e-12);
        assert_eq!(c.state().ticks(), 1);
    }

    #[test]
    fn law_uses_mode_chosen_this_tick() {
        // Lead at 20 m/s: Initial -> NoWave on the first tick, so the raw
        // command is the gated free-traffic law, not zero.
        let mut c = controller();
        let out = c.tick(&TickInput::new(100.0, 10.0, 10.0));
        assert_eq!(out.mode, Mode::NoWave);
        assert!(out.raw_cmd > 0.0);
    }

    #[test]
    fn reset_returns_to_initial() {
        let mut c = controller();
        for _ in 0..5 {
            c.tick(&TickInput::new(30.0, -1.0, 12.0));
        }
        c.reset();
        assert_eq!(c.mode(), Mode::Initial);
        assert!(c.last_signals().is_none());
        assert_eq!(c.state().filtered_cmd_accel(), 0.0);
        assert!(c.state().conditioner().velocity_filter().is_empty());
    }

    #[test]
    fn rejects_invalid_config() {
        let cfg = ControllerConfig {
            ma_window: 0,
            ..ControllerConfig::default()
        };
        assert_eq!(ControllerLoop::new(cfg).unwrap_err(), BuildError::InvalidWindow);
    }

    #[test]
    fn inverted_limits_never_reach_a_tick() {
        let cfg = ControllerConfig {
            max_decel: 2.0,
            ..ControllerConfig::default()
        };
        assert!(cfg.validate().is_err());
        assert_eq!(
            ControllerLoop::new(cfg).unwrap_err(),
            BuildError::InvalidConfig("limits must satisfy max_decel < 0 < max_accel")
        );
    }

    #[test]
    fn state_window_follows_config() {
        let cfg = ControllerConfig {
            ma_window: 2,
            ..ControllerConfig::default()
        };
        let mut c = ControllerLoop::new(cfg).unwrap();
        for _ in 0..5 {
            c.tick(&TickInput::new(60.0, 0.0, 12.0));
        }
        assert_eq!(c.config().ma_window, 2);
        assert_eq!(c.state().conditioner().velocity_filter().len(), 2);
    }

    #[test]
    fn negative_wave_velo_update_is_rejected() {
        let mut c = controller();
        assert_eq!(
            c.set_velocity_thresholds(5.0, -3.0, 25.0).unwrap_err(),
            BuildError::InvalidConfig("wave_velo must be >= 0")
        );
        assert_eq!(c.config().wave_velo, 10.0);
    }

    #[test]
    fn threshold_update_keeps_old_values_on_error() {
        let mut c = controller();
        let err = c.set_velocity_thresholds(8.0, 12.0, 25.0).unwrap_err();
        assert_eq!(
            err,
            BuildError::InvalidConfig("wave_velo must be <= no_wave_velo")
        );
        assert_eq!(c.config().no_wave_velo, 13.5);
        assert_eq!(c.config().wave_velo, 10.0);

        c.set_velocity_thresholds(15.0, 9.0, 30.0).unwrap();
        assert_eq!(
            (c.config().no_wave_velo, c.config().wave_velo, c.config().max_velo),
            (15.0, 9.0, 30.0)
        );
    }

    #[test]
    fn free_function_and_loop_agree() {
        let cfg = ControllerConfig::default();
        let mut state = ControllerState::new(&cfg);
        let mut c = controller();
        for i in 0..40 {
            let gap = 120.0 - f64::from(i);
            let input = TickInput::new(gap, -0.5, 14.0);
            assert_eq!(tick(&input, &cfg, &mut state), c.tick(&input));
        }
    }
}
