//! Named starting points for `ControllerConfig`.
//!
//! A preset only fills in values; anything set explicitly in a config file is
//! layered on top of it (see `conversions`).

use core::fmt;

use crate::config::{ControllerConfig, GainSchedule, ModeGains};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Preset {
    #[default]
    Default,
    /// Lower cruise speed, softer limits, longer headways, heavier smoothing.
    Conservative,
    /// Higher cruise speed, shorter headways, quicker response.
    Aggressive,
}

impl Preset {
    pub const ALL: [Preset; 3] = [Preset::Default, Preset::Conservative, Preset::Aggressive];

    pub fn as_str(self) -> &'static str {
        match self {
            Preset::Default => "default",
            Preset::Conservative => "conservative",
            Preset::Aggressive => "aggressive",
        }
    }

    pub fn config(self) -> ControllerConfig {
        let base = ControllerConfig::default();
        match self {
            Preset::Default => base,
            Preset::Conservative => {
                let d = GainSchedule::default();
                ControllerConfig {
                    max_velo: 20.0,
                    max_accel: 1.0,
                    max_decel: -2.0,
                    filter_coeff: 0.4,
                    gains: GainSchedule {
                        no_wave: ModeGains { tau: 2.5, ..d.no_wave },
                        into_wave: ModeGains { alpha: 0.5, tau: 3.0, ..d.into_wave },
                        in_wave: ModeGains { alpha: 0.15, tau: 3.0, ..d.in_wave },
                        out_of_wave: ModeGains { tau: 3.0, ..d.out_of_wave },
                    },
                    ..base
                }
            }
            Preset::Aggressive => {
                let d = GainSchedule::default();
                ControllerConfig {
                    max_velo: 30.0,
                    filter_coeff: 0.8,
                    gains: GainSchedule {
                        no_wave: ModeGains { tau: 1.5, ..d.no_wave },
                        into_wave: ModeGains { alpha: 0.9, tau: 1.8, ..d.into_wave },
                        in_wave: ModeGains { alpha: 0.3, tau: 2.0, ..d.in_wave },
                        out_of_wave: ModeGains { alpha: 1.3, tau: 1.8, ..d.out_of_wave },
                    },
                    ..base
                }
            }
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
