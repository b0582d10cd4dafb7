//! Config assembly: TOML overlay, CLI preset, gain CSV, in that order.

use acc_core::{ControllerConfig, GainSchedule, ModeGains};
use serde_json::{Value, json};

use crate::cli::Cli;
use crate::error_fmt::CliError;

/// Load and validate the config file (or an empty overlay when none is given).
pub fn load_file_config(cli: &Cli) -> eyre::Result<acc_config::Config> {
    let mut cfg = match cli.config.as_deref() {
        Some(path) => acc_config::load_toml_file(path)
            .map_err(|e| eyre::Report::new(CliError::Config(format!("{e:#}"))))?,
        None => acc_config::Config::default(),
    };
    if let Some(p) = cli.preset {
        cfg.preset = p.into();
    }
    cfg.validate()
        .map_err(|e| eyre::Report::new(CliError::Config(format!("{e:#}"))))?;
    Ok(cfg)
}

/// Merge the file overlay and the optional gain CSV into a runtime config.
/// Not validated here; `ControllerLoop::new` does that.
pub fn controller_config(cli: &Cli, file: &acc_config::Config) -> eyre::Result<ControllerConfig> {
    let mut cfg = ControllerConfig::from(file);
    if let Some(path) = cli.gains.as_deref() {
        let table = acc_config::load_gain_schedule_csv(path)
            .map_err(|e| eyre::Report::new(CliError::Config(format!("{e:#}"))))?;
        cfg.gains = GainSchedule::from(&table);
        tracing::debug!(path = %path.display(), "gain schedule loaded from CSV");
    }
    Ok(cfg)
}

fn gains_json(g: &ModeGains) -> Value {
    json!({ "alpha": g.alpha, "tau": g.tau, "beta": g.beta })
}

/// Effective config in the same section layout as the TOML file.
pub fn config_json(c: &ControllerConfig) -> Value {
    json!({
        "thresholds": {
            "no_wave_velo": c.no_wave_velo,
            "wave_velo": c.wave_velo,
            "max_velo": c.max_velo,
        },
        "gains": {
            "no_wave": gains_json(&c.gains.no_wave),
            "into_wave": gains_json(&c.gains.into_wave),
            "in_wave": gains_json(&c.gains.in_wave),
            "out_of_wave": gains_json(&c.gains.out_of_wave),
        },
        "limits": {
            "max_accel": c.max_accel,
            "max_decel": c.max_decel,
            "speed_limit": c.speed_limit,
            "desired_distance": c.desired_distance,
        },
        "filter": {
            "filter_coeff": c.filter_coeff,
            "ma_window": c.ma_window,
            "sample_rate_factor": c.sample_rate_factor,
            "accel_sat_min": c.accel_sat_min,
            "accel_sat_max": c.accel_sat_max,
        },
        "classifier": {
            "far_threshold": c.far_threshold,
            "close_threshold": c.close_threshold,
            "no_lead_distance": c.no_lead_distance,
            "accel_into_wave": c.transitions.into_wave_accel,
            "accel_out_of_wave_low": c.transitions.leave_into_wave_accel,
            "accel_out_of_wave_high": c.transitions.out_of_wave_accel,
            "accel_leave_out_of_wave": c.transitions.back_into_wave_accel,
        },
    })
}

/// Flatten a nested JSON object into `a.b.c = value` lines.
pub fn flatten(prefix: &str, v: &Value, out: &mut Vec<String>) {
    match v {
        Value::Object(map) => {
            for (k, child) in map {
                let key = if prefix.is_empty() {
                    k.clone()
                } else {
                    format!("{prefix}.{k}")
                };
                flatten(&key, child, out);
            }
        }
        other => out.push(format!("{prefix} = {other}")),
    }
}
