//! Output-side safety stages: speed limiter, hard saturation, anti-jerk
//! low-pass, final saturation.

use crate::config::ControllerConfig;

/// Post-processor with its low-pass memory (starts at 0).
#[derive(Debug, Clone, Default)]
pub struct SafetyPostProcessor {
    filtered_cmd_accel: f64,
}

impl SafetyPostProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bound and smooth `raw_cmd`. The result always lies in
    /// `[max_decel, max_accel]`.
    pub fn apply(&mut self, raw_cmd: f64, ego_vel: f64, cfg: &ControllerConfig) -> f64 {
        // NaN only comes out of overflow with extreme gains; it maps to 0.
        let mut cmd = if raw_cmd.is_nan() { 0.0 } else { raw_cmd };
        if ego_vel >= cfg.speed_limit {
            cmd = cmd.min(0.0);
        }
        cmd = cmd.clamp(cfg.max_decel, cfg.max_accel);
        // Same as `f + k * (cmd - f)`, written in convex form so k = 1.0 is an
        // exact pass-through.
        let k = cfg.filter_coeff;
        let filtered = (1.0 - k) * self.filtered_cmd_accel + k * cmd;
        let out = filtered.clamp(cfg.max_decel, cfg.max_accel);
        self.filtered_cmd_accel = out;
        out
    }

    /// Low-pass memory, i.e. the last emitted command.
    pub fn filtered_cmd_accel(&self) -> f64 {
        self.filtered_cmd_accel
    }

    pub fn reset(&mut self) {
        self.filtered_cmd_accel = 0.0;
    }
}
