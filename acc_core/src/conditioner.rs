//! Input-side signal conditioning: moving averages and the lead-acceleration
//! derivative.

use crate::config::ControllerConfig;

/// Fixed-window moving average over a preallocated ring buffer.
///
/// `push` is O(1): the oldest sample is evicted from the running sum once the
/// window is full. Until then the average is taken over the samples seen so
/// far. The sum is recomputed from the buffer each time the write index wraps
/// so floating-point drift cannot accumulate across windows.
#[derive(Debug, Clone)]
pub struct MovingAverage {
    buf: Box<[f64]>,
    idx: usize,
    len: usize,
    sum: f64,
}

impl MovingAverage {
    /// `window` is clamped to at least 1.
    pub fn new(window: usize) -> Self {
        Self {
            buf: vec![0.0; window.max(1)].into_boxed_slice(),
            idx: 0,
            len: 0,
            sum: 0.0,
        }
    }

    /// Insert a sample and return the updated average.
    pub fn push(&mut self, x: f64) -> f64 {
        let cap = self.buf.len();
        if self.len == cap {
            self.sum -= self.buf[self.idx];
        } else {
            self.len += 1;
        }
        self.buf[self.idx] = x;
        self.sum += x;
        self.idx += 1;
        if self.idx == cap {
            self.idx = 0;
            self.sum = self.buf.iter().sum();
        }
        self.average()
    }

    /// Current average; 0.0 before the first sample.
    pub fn average(&self) -> f64 {
        if self.len == 0 {
            0.0
        } else {
            self.sum / self.len as f64
        }
    }

    /// Number of samples currently held (saturates at the window size).
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn sum(&self) -> f64 {
        self.sum
    }

    pub fn clear(&mut self) {
        self.buf.fill(0.0);
        self.idx = 0;
        self.len = 0;
        self.sum = 0.0;
    }
}

/// Output of one conditioning step.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ConditionedSignals {
    /// `ego_vel + rel_vel` for this tick, unsmoothed.
    pub lead_velocity: f64,
    /// Saturated finite-difference lead acceleration, unsmoothed.
    pub lead_accel_raw: f64,
    pub smoothed_velocity: f64,
    pub smoothed_accel: f64,
}

/// Turns raw relative/ego velocity samples into smoothed lead velocity and
/// smoothed lead acceleration.
#[derive(Debug, Clone)]
pub struct SignalConditioner {
    velocity_ma: MovingAverage,
    accel_ma: MovingAverage,
    // None until the first sample; the first derivative then reads as 0.
    previous_lead_velocity: Option<f64>,
}

impl SignalConditioner {
    pub fn new(ma_window: usize) -> Self {
        Self {
            velocity_ma: MovingAverage::new(ma_window),
            accel_ma: MovingAverage::new(ma_window),
            previous_lead_velocity: None,
        }
    }

    /// Condition one tick. Inputs must already be finite.
    pub fn condition(&mut self, rel_vel: f64, ego_vel: f64, cfg: &ControllerConfig) -> ConditionedSignals {
        let lead_velocity = ego_vel + rel_vel;
        let previous = self.previous_lead_velocity.unwrap_or(lead_velocity);
        let lead_accel_raw = ((lead_velocity - previous) * cfg.sample_rate_factor)
            .clamp(cfg.accel_sat_min, cfg.accel_sat_max);
        self.previous_lead_velocity = Some(lead_velocity);

        ConditionedSignals {
            lead_velocity,
            lead_accel_raw,
            smoothed_velocity: self.velocity_ma.push(lead_velocity),
            smoothed_accel: self.accel_ma.push(lead_accel_raw),
        }
    }

    pub fn previous_lead_velocity(&self) -> Option<f64> {
        self.previous_lead_velocity
    }

    pub fn velocity_filter(&self) -> &MovingAverage {
        &self.velocity_ma
    }

    pub fn reset(&mut self) {
        self.velocity_ma.clear();
        self.accel_ma.clear();
        self.previous_lead_velocity = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn averages_over_samples_seen_until_full() {
        let mut ma = MovingAverage::new(4);
        assert_eq!(ma.average(), 0.0);
        assert_eq!(ma.push(2.0), 2.0);
        assert_eq!(ma.push(4.0), 3.0);
        assert_eq!(ma.push(6.0), 4.0);
        assert_eq!(ma.push(8.0), 5.0);
        // Window full: 2.0 is evicted.
        assert_eq!(ma.push(10.0), 7.0);
        assert_eq!(ma.len(), 4);
    }

    #[rstest]
    #[case(1)]
    #[case(3)]
    #[case(10)]
    fn constant_input_converges_exactly(#[case] window: usize) {
        let mut ma = MovingAverage::new(window);
        for _ in 0..5 {
            ma.push(-40.0);
        }
        let mut last = 0.0;
        for _ in 0..window {
            last = ma.push(12.5);
        }
        assert_eq!(last, 12.5);
    }

    #[test]
    fn window_one_is_pass_through() {
        let mut ma = MovingAverage::new(1);
        for x in [3.0, -1.25, 7.5, 0.0] {
            assert_eq!(ma.push(x), x);
        }
    }

    #[test]
    fn running_sum_matches_buffer_after_many_pushes() {
        let mut ma = MovingAverage::new(7);
        for i in 0..1003 {
            ma.push((i as f64 * 0.37).sin() * 11.0);
        }
        let expected: f64 = ma.buf.iter().sum();
        assert!((ma.sum() - expected).abs() < 1e-9);
    }

    #[test]
    fn first_derivative_reads_zero() {
        let cfg = ControllerConfig::default();
        let mut sc = SignalConditioner::new(cfg.ma_window);
        let s = sc.condition(-5.0, 20.0, &cfg);
        assert_eq!(s.lead_velocity, 15.0);
        assert_eq!(s.lead_accel_raw, 0.0);
        assert_eq!(s.smoothed_velocity, 15.0);
        assert_eq!(s.smoothed_accel, 0.0);
    }

    #[test]
    fn derivative_is_scaled_and_saturated() {
        let cfg = ControllerConfig::default();
        let mut sc = SignalConditioner::new(1);
        sc.condition(0.0, 10.0, &cfg);
        // +0.05 m/s over one 50 ms tick = 1.0 m/s²
        let s = sc.condition(0.05, 10.0, &cfg);
        assert!((s.lead_accel_raw - 1.0).abs() < 1e-9);
        // Large jumps clip to the saturation band.
        let s = sc.condition(10.0, 10.0, &cfg);
        assert_eq!(s.lead_accel_raw, 2.0);
        let s = sc.condition(-10.0, 10.0, &cfg);
        assert_eq!(s.lead_accel_raw, -3.5);
    }

    #[test]
    fn reset_forgets_history() {
        let cfg = ControllerConfig::default();
        let mut sc = SignalConditioner::new(cfg.ma_window);
        sc.condition(0.0, 10.0, &cfg);
        sc.condition(5.0, 10.0, &cfg);
        sc.reset();
        assert!(sc.velocity_filter().is_empty());
        assert_eq!(sc.previous_lead_velocity(), None);
        let s = sc.condition(0.0, 3.0, &cfg);
        assert_eq!(s.smoothed_velocity, 3.0);
        assert_eq!(s.lead_accel_raw, 0.0);
    }
}
