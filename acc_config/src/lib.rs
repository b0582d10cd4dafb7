#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema and gain-schedule parsing for the ACC controller.
//!
//! - `Config` is deserialized from TOML and validated key by key. Every key is
//!   optional: a file names a `preset` and overrides only what it needs.
//! - The gain-schedule CSV loader enforces headers and requires exactly one
//!   row per operating mode.
//!
//! Cross-field checks that need the preset's values (for example
//! `wave_velo <= no_wave_velo` when only one of them is set) are left to
//! `acc_core`, which validates the merged config before building a controller.
use std::path::Path;

use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PresetName {
    #[default]
    Default,
    Conservative,
    Aggressive,
}

/// Deployment-adjustable velocity thresholds (m/s).
#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct Thresholds {
    pub no_wave_velo: Option<f64>,
    pub wave_velo: Option<f64>,
    pub max_velo: Option<f64>,
}

/// Partial gain triple; unset fields keep the preset's value.
#[derive(Debug, Deserialize, Default, Clone, Copy)]
#[serde(default, deny_unknown_fields)]
pub struct GainOverride {
    pub alpha: Option<f64>,
    pub tau: Option<f64>,
    pub beta: Option<f64>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct Gains {
    pub no_wave: GainOverride,
    pub into_wave: GainOverride,
    pub in_wave: GainOverride,
    pub out_of_wave: GainOverride,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct Limits {
    pub max_accel: Option<f64>,
    pub max_decel: Option<f64>,
    /// Above this ego speed only braking is allowed (m/s).
    pub speed_limit: Option<f64>,
    pub desired_distance: Option<f64>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct FilterCfg {
    /// Anti-jerk low-pass coefficient. Range: (0.0, 1.0].
    pub filter_coeff: Option<f64>,
    pub ma_window: Option<usize>,
    /// 1/dt of the tick (Hz).
    pub sample_rate_factor: Option<f64>,
    pub accel_sat_min: Option<f64>,
    pub accel_sat_max: Option<f64>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct Classifier {
    pub far_threshold: Option<f64>,
    pub close_threshold: Option<f64>,
    /// Gap substituted when no lead vehicle is reported.
    pub no_lead_distance: Option<f64>,
    /// NoWave -> IntoWave below this smoothed lead acceleration.
    pub accel_into_wave: Option<f64>,
    /// IntoWave -> OutOfWave at or above this.
    pub accel_out_of_wave_low: Option<f64>,
    /// InWave -> OutOfWave above this.
    pub accel_out_of_wave_high: Option<f64>,
    /// OutOfWave -> IntoWave at or below this.
    pub accel_leave_out_of_wave: Option<f64>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Base values; every other section overrides on top of it.
    pub preset: PresetName,
    pub thresholds: Thresholds,
    pub gains: Gains,
    pub limits: Limits,
    pub filter: FilterCfg,
    pub classifier: Classifier,
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

pub fn load_toml_file(path: &Path) -> eyre::Result<Config> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("read config {:?}: {}", path, e))?;
    load_toml(&text).map_err(|e| eyre::eyre!("parse config {:?}: {}", path, e))
}

fn finite(v: Option<f64>, key: &str) -> eyre::Result<()> {
    if let Some(x) = v
        && !x.is_finite()
    {
        eyre::bail!("{key} must be finite");
    }
    Ok(())
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Thresholds
        let t = &self.thresholds;
        finite(t.no_wave_velo, "thresholds.no_wave_velo")?;
        finite(t.wave_velo, "thresholds.wave_velo")?;
        finite(t.max_velo, "thresholds.max_velo")?;
        if let Some(v) = t.wave_velo
            && v < 0.0
        {
            eyre::bail!("thresholds.wave_velo must be >= 0");
        }
        if let (Some(w), Some(n)) = (t.wave_velo, t.no_wave_velo)
            && w > n
        {
            eyre::bail!("thresholds.wave_velo must be <= thresholds.no_wave_velo");
        }
        if let Some(v) = t.max_velo
            && v <= 0.0
        {
            eyre::bail!("thresholds.max_velo must be > 0");
        }

        // Gains
        for (name, g) in [
            ("no_wave", &self.gains.no_wave),
            ("into_wave", &self.gains.into_wave),
            ("in_wave", &self.gains.in_wave),
            ("out_of_wave", &self.gains.out_of_wave),
        ] {
            for (field, v) in [("alpha", g.alpha), ("tau", g.tau), ("beta", g.beta)] {
                if let Some(x) = v
                    && !x.is_finite()
                {
                    eyre::bail!("gains.{name}.{field} must be finite");
                }
            }
        }

        // Limits
        let l = &self.limits;
        finite(l.max_accel, "limits.max_accel")?;
        finite(l.max_decel, "limits.max_decel")?;
        finite(l.speed_limit, "limits.speed_limit")?;
        finite(l.desired_distance, "limits.desired_distance")?;
        if let Some(v) = l.max_accel
            && v <= 0.0
        {
            eyre::bail!("limits.max_accel must be > 0");
        }
        if let Some(v) = l.max_decel
            && v >= 0.0
        {
            eyre::bail!("limits.max_decel must be < 0");
        }
        if let Some(v) = l.speed_limit
            && v <= 0.0
        {
            eyre::bail!("limits.speed_limit must be > 0");
        }
        if let Some(v) = l.desired_distance
            && v < 0.0
        {
            eyre::bail!("limits.desired_distance must be >= 0");
        }

        // Filter
        let f = &self.filter;
        if let Some(k) = f.filter_coeff
            && !(k > 0.0 && k <= 1.0)
        {
            eyre::bail!("filter.filter_coeff must be in (0.0, 1.0]");
        }
        if f.ma_window == Some(0) {
            eyre::bail!("filter.ma_window must be >= 1");
        }
        if f.ma_window.is_some_and(|w| w > 10_000) {
            eyre::bail!("filter.ma_window is unreasonably large (>10000)");
        }
        if let Some(r) = f.sample_rate_factor
            && !(r.is_finite() && r > 0.0)
        {
            eyre::bail!("filter.sample_rate_factor must be > 0");
        }
        finite(f.accel_sat_min, "filter.accel_sat_min")?;
        finite(f.accel_sat_max, "filter.accel_sat_max")?;
        if let (Some(lo), Some(hi)) = (f.accel_sat_min, f.accel_sat_max)
            && lo >= hi
        {
            eyre::bail!("filter.accel_sat_min must be < filter.accel_sat_max");
        }

        // Classifier
        let c = &self.classifier;
        finite(c.far_threshold, "classifier.far_threshold")?;
        finite(c.close_threshold, "classifier.close_threshold")?;
        finite(c.no_lead_distance, "classifier.no_lead_distance")?;
        finite(c.accel_into_wave, "classifier.accel_into_wave")?;
        finite(c.accel_out_of_wave_low, "classifier.accel_out_of_wave_low")?;
        finite(c.accel_out_of_wave_high, "classifier.accel_out_of_wave_high")?;
        finite(c.accel_leave_out_of_wave, "classifier.accel_leave_out_of_wave")?;
        if let Some(v) = c.close_threshold
            && v < 0.0
        {
            eyre::bail!("classifier.close_threshold must be >= 0");
        }
        if let (Some(close), Some(far)) = (c.close_threshold, c.far_threshold)
            && close > far
        {
            eyre::bail!("classifier.close_threshold must be <= classifier.far_threshold");
        }
        if let (Some(none), Some(far)) = (c.no_lead_distance, c.far_threshold)
            && none <= far
        {
            eyre::bail!("classifier.no_lead_distance must be > classifier.far_threshold");
        }

        // Logging
        if let Some(r) = self.logging.rotation.as_deref()
            && !matches!(r, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never, daily, hourly");
        }

        Ok(())
    }
}

// ── Gain schedule CSV ────────────────────────────────────────────────────────

/// Gain-schedule CSV schema.
///
/// Expected headers:
/// mode,alpha,tau,beta
///
/// Example:
/// mode,alpha,tau,beta
/// no_wave,0.15,2.0,0.424
/// into_wave,0.7,2.4,0.23
/// in_wave,0.2,2.5,0.35
/// out_of_wave,1.1,2.4,0.24
#[derive(Debug, Deserialize, Clone)]
pub struct GainRow {
    pub mode: String,
    pub alpha: f64,
    pub tau: f64,
    pub beta: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GainTriple {
    pub alpha: f64,
    pub tau: f64,
    pub beta: f64,
}

/// A complete gain schedule read from CSV.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GainTable {
    pub no_wave: GainTriple,
    pub into_wave: GainTriple,
    pub in_wave: GainTriple,
    pub out_of_wave: GainTriple,
}

const MODE_NAMES: [&str; 4] = ["no_wave", "into_wave", "in_wave", "out_of_wave"];

impl GainTable {
    /// Build a table from rows in any order. Each mode must appear exactly once.
    pub fn from_rows(rows: &[GainRow]) -> eyre::Result<Self> {
        let mut slots: [Option<GainTriple>; 4] = [None; 4];
        for (idx, row) in rows.iter().enumerate() {
            let Some(pos) = MODE_NAMES.iter().position(|m| *m == row.mode.trim()) else {
                eyre::bail!(
                    "gain row {}: unknown mode '{}' (expected one of {})",
                    idx + 2,
                    row.mode,
                    MODE_NAMES.join(", ")
                );
            };
            for (field, v) in [("alpha", row.alpha), ("tau", row.tau), ("beta", row.beta)] {
                if !v.is_finite() {
                    eyre::bail!("gain row {}: {} for {} must be finite", idx + 2, field, row.mode);
                }
            }
            if slots[pos].is_some() {
                eyre::bail!("gain schedule lists mode '{}' more than once", MODE_NAMES[pos]);
            }
            slots[pos] = Some(GainTriple {
                alpha: row.alpha,
                tau: row.tau,
                beta: row.beta,
            });
        }
        let missing: Vec<&str> = MODE_NAMES
            .iter()
            .zip(slots.iter())
            .filter(|(_, s)| s.is_none())
            .map(|(m, _)| *m)
            .collect();
        match slots {
            [Some(no_wave), Some(into_wave), Some(in_wave), Some(out_of_wave)] => Ok(Self {
                no_wave,
                into_wave,
                in_wave,
                out_of_wave,
            }),
            _ => eyre::bail!("gain schedule is missing modes: {}", missing.join(", ")),
        }
    }
}

impl TryFrom<&[GainRow]> for GainTable {
    type Error = eyre::Report;
    fn try_from(rows: &[GainRow]) -> Result<Self, Self::Error> {
        Self::from_rows(rows)
    }
}

/// Parse a gain schedule from any CSV reader.
pub fn read_gain_schedule_csv<R: std::io::Read>(reader: R) -> eyre::Result<GainTable> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    // Enforce exact headers
    let headers = rdr
        .headers()
        .map_err(|e| eyre::eyre!("read CSV headers: {}", e))?
        .clone();
    let expected = ["mode", "alpha", "tau", "beta"];
    let actual: Vec<String> = headers.iter().map(|s| s.to_string()).collect();
    if actual != expected {
        eyre::bail!(
            "gain CSV must have headers 'mode,alpha,tau,beta', got: {}",
            actual.join(",")
        );
    }

    let mut rows = Vec::new();
    for (idx, rec) in rdr.deserialize::<GainRow>().enumerate() {
        match rec {
            Ok(row) => rows.push(row),
            Err(e) => {
                eyre::bail!("invalid CSV row {}: {}", idx + 2, e);
            }
        }
    }

    GainTable::from_rows(&rows)
}

pub fn load_gain_schedule_csv(path: &Path) -> eyre::Result<GainTable> {
    let file = std::fs::File::open(path)
        .map_err(|e| eyre::eyre!("open gain CSV {:?}: {}", path, e))?;
    read_gain_schedule_csv(file).map_err(|e| eyre::eyre!("{:?}: {}", path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_all_defaults() {
        let cfg = load_toml("").unwrap();
        assert_eq!(cfg.preset, PresetName::Default);
        assert!(cfg.thresholds.max_velo.is_none());
        cfg.validate().unwrap();
    }

    #[test]
    fn unknown_key_is_rejected() {
        assert!(load_toml("[limits]\nmax_acel = 1.0\n").is_err());
    }

    #[test]
    fn rows_in_any_order() {
        let rows: Vec<GainRow> = ["out_of_wave", "in_wave", "into_wave", "no_wave"]
            .iter()
            .enumerate()
            .map(|(i, m)| GainRow {
                mode: (*m).to_string(),
                alpha: i as f64,
                tau: 1.0,
                beta: 0.5,
            })
            .collect();
        let t = GainTable::try_from(rows.as_slice()).unwrap();
        assert_eq!(t.no_wave.alpha, 3.0);
        assert_eq!(t.out_of_wave.alpha, 0.0);
    }
}
