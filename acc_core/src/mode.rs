//! Traffic-following modes.

use core::fmt;

/// Discrete traffic regime selected by the classifier each tick.
///
/// `Initial` is only the entry state; the first tick always leaves it and it
/// is never re-entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    #[default]
    Initial,
    /// Free driving, no constraining lead vehicle.
    NoWave,
    /// Closing in on slower traffic.
    IntoWave,
    /// Following inside slow traffic.
    InWave,
    /// Traffic ahead is clearing.
    OutOfWave,
}

impl Mode {
    /// Modes a controller can be in after its first tick.
    pub const OPERATING: [Mode; 4] = [Mode::NoWave, Mode::IntoWave, Mode::InWave, Mode::OutOfWave];

    /// Stable snake_case name, used in logs and on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Initial => "initial",
            Mode::NoWave => "no_wave",
            Mode::IntoWave => "into_wave",
            Mode::InWave => "in_wave",
            Mode::OutOfWave => "out_of_wave",
        }
    }

    /// Numeric index as recorded by the reference logs (Initial = -1).
    pub fn index(self) -> i8 {
        match self {
            Mode::Initial => -1,
            Mode::NoWave => 0,
            Mode::IntoWave => 1,
            Mode::InWave => 2,
            Mode::OutOfWave => 3,
        }
    }

    /// True when `self -> to` is an edge of the transition table.
    /// Holding the current mode is always allowed except for `Initial`.
    pub fn can_transition_to(self, to: Mode) -> bool {
        use Mode::*;
        match (self, to) {
            (Initial, NoWave | InWave) => true,
            (Initial, _) => false,
            (_, Initial) => false,
            (a, b) if a == b => true,
            (NoWave, IntoWave) => true,
            (IntoWave, InWave | OutOfWave | NoWave) => true,
            (InWave, OutOfWave | NoWave) => true,
            (OutOfWave, NoWave | IntoWave) => true,
            _ => false,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
