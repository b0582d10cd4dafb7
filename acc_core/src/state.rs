//! Persistent per-vehicle controller memory.

use crate::conditioner::{ConditionedSignals, SignalConditioner};
use crate::config::ControllerConfig;
use crate::mode::Mode;
use crate::postprocess::SafetyPostProcessor;
use crate::sanitize::InputSanitizer;

/// Everything a controller carries from one tick to the next.
///
/// Owned by exactly one controller instance; it is mutated only by `tick`.
/// Ticks must be applied in arrival order since both the moving averages and
/// the low-pass filter are order-sensitive.
#[derive(Debug, Clone)]
pub struct ControllerState {
    pub(crate) mode: Mode,
    pub(crate) conditioner: SignalConditioner,
    pub(crate) post: SafetyPostProcessor,
    pub(crate) sanitizer: InputSanitizer,
    pub(crate) last_signals: Option<ConditionedSignals>,
    pub(crate) ticks: u64,
}

impl ControllerState {
    /// Fresh state: empty buffers, `Initial` mode, filter memory at 0.
    /// `cfg` must already be validated; see `ControllerLoop::new`.
    pub(crate) fn new(cfg: &ControllerConfig) -> Self {
        Self {
            mode: Mode::Initial,
            conditioner: SignalConditioner::new(cfg.ma_window),
            post: SafetyPostProcessor::new(),
            sanitizer: InputSanitizer::new(),
            last_signals: None,
            ticks: 0,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn filtered_cmd_accel(&self) -> f64 {
        self.post.filtered_cmd_accel()
    }

    pub fn conditioner(&self) -> &SignalConditioner {
        &self.conditioner
    }

    pub fn last_signals(&self) -> Option<&ConditionedSignals> {
        self.last_signals.as_ref()
    }

    /// Ticks applied since construction or the last reset.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn reset(&mut self) {
        self.mode = Mode::Initial;
        self.conditioner.reset();
        self.post.reset();
        self.sanitizer.reset();
        self.last_signals = None;
        self.ticks = 0;
    }
}
