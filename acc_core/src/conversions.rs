//! `From` implementations bridging `acc_config` types to `acc_core` types.
//!
//! A config file is an overlay: the named preset supplies every value and the
//! keys present in the file replace them one by one.

use crate::config::{ControllerConfig, GainSchedule, ModeGains};
use crate::presets::Preset;

// ── Preset ───────────────────────────────────────────────────────────────────

impl From<acc_config::PresetName> for Preset {
    fn from(p: acc_config::PresetName) -> Self {
        match p {
            acc_config::PresetName::Default => Preset::Default,
            acc_config::PresetName::Conservative => Preset::Conservative,
            acc_config::PresetName::Aggressive => Preset::Aggressive,
        }
    }
}

// ── Gains ────────────────────────────────────────────────────────────────────

fn overlay_gains(base: &mut ModeGains, o: &acc_config::GainOverride) {
    if let Some(v) = o.alpha {
        base.alpha = v;
    }
    if let Some(v) = o.tau {
        base.tau = v;
    }
    if let Some(v) = o.beta {
        base.beta = v;
    }
}

impl From<&acc_config::GainTriple> for ModeGains {
    fn from(g: &acc_config::GainTriple) -> Self {
        Self::new(g.alpha, g.tau, g.beta)
    }
}

impl From<&acc_config::GainTable> for GainSchedule {
    fn from(t: &acc_config::GainTable) -> Self {
        Self {
            no_wave: (&t.no_wave).into(),
            into_wave: (&t.into_wave).into(),
            in_wave: (&t.in_wave).into(),
            out_of_wave: (&t.out_of_wave).into(),
        }
    }
}

// ── ControllerConfig ─────────────────────────────────────────────────────────

fn set<T: Copy>(slot: &mut T, v: Option<T>) {
    if let Some(v) = v {
        *slot = v;
    }
}

impl From<&acc_config::Config> for ControllerConfig {
    fn from(c: &acc_config::Config) -> Self {
        let mut out = Preset::from(c.preset).config();

        set(&mut out.no_wave_velo, c.thresholds.no_wave_velo);
        set(&mut out.wave_velo, c.thresholds.wave_velo);
        set(&mut out.max_velo, c.thresholds.max_velo);

        overlay_gains(&mut out.gains.no_wave, &c.gains.no_wave);
        overlay_gains(&mut out.gains.into_wave, &c.gains.into_wave);
        overlay_gains(&mut out.gains.in_wave, &c.gains.in_wave);
        overlay_gains(&mut out.gains.out_of_wave, &c.gains.out_of_wave);

        set(&mut out.max_accel, c.limits.max_accel);
        set(&mut out.max_decel, c.limits.max_decel);
        set(&mut out.speed_limit, c.limits.speed_limit);
        set(&mut out.desired_distance, c.limits.desired_distance);

        set(&mut out.filter_coeff, c.filter.filter_coeff);
        set(&mut out.ma_window, c.filter.ma_window);
        set(&mut out.sample_rate_factor, c.filter.sample_rate_factor);
        set(&mut out.accel_sat_min, c.filter.accel_sat_min);
        set(&mut out.accel_sat_max, c.filter.accel_sat_max);

        let k = &c.classifier;
        set(&mut out.far_threshold, k.far_threshold);
        set(&mut out.close_threshold, k.close_threshold);
        set(&mut out.no_lead_distance, k.no_lead_distance);
        set(&mut out.transitions.into_wave_accel, k.accel_into_wave);
        set(&mut out.transitions.leave_into_wave_accel, k.accel_out_of_wave_low);
        set(&mut out.transitions.out_of_wave_accel, k.accel_out_of_wave_high);
        set(&mut out.transitions.back_into_wave_accel, k.accel_leave_out_of_wave);

        out
    }
}
