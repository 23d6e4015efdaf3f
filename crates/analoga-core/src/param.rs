//! Parameter smoothing for click-free control changes.
//!
//! Controls arrive once per block but are consumed per sample. Jumping a gain
//! or a filter coefficient between blocks produces zipper noise, so values
//! are ramped toward their target:
//!
//! - [`SmoothedParam`] - exponential (one-pole) approach, RC-like
//! - [`LinearSmoothedParam`] - constant-rate ramp that lands exactly on target
//!
//! ```rust
//! use analoga_core::SmoothedParam;
//!
//! let mut amp = SmoothedParam::with_config(1.0, 48000.0, 5.0);
//! amp.set_target(0.5);
//! for _ in 0..2400 {
//!     amp.advance();
//! }
//! assert!((amp.get() - 0.5).abs() < 0.01);
//! ```

use libm::expf;

/// Exponentially smoothed value.
///
/// `y[n] = y[n-1] + coeff·(target − y[n-1])` with
/// `coeff = 1 − exp(−1 / (τ·fs))`. After five time constants the value is
/// within 0.7 % of the target.
#[derive(Debug, Clone)]
pub struct SmoothedParam {
    current: f32,
    target: f32,
    coeff: f32,
    sample_rate: f32,
    time_ms: f32,
}

impl SmoothedParam {
    /// Create a value that follows its target instantly until configured.
    pub fn new(initial: f32) -> Self {
        Self {
            current: initial,
            target: initial,
            coeff: 1.0,
            sample_rate: 48000.0,
            time_ms: 0.0,
        }
    }

    /// Create a smoothed value with sample rate and time constant.
    pub fn with_config(initial: f32, sample_rate: f32, time_ms: f32) -> Self {
        let mut param = Self::new(initial);
        param.sample_rate = sample_rate;
        param.time_ms = time_ms;
        param.recalculate_coeff();
        param
    }

    /// Set the value to approach.
    #[inline]
    pub fn set_target(&mut self, target: f32) {
        self.target = target;
    }

    /// Jump to `value` without smoothing.
    #[inline]
    pub fn set_immediate(&mut self, value: f32) {
        self.target = value;
        self.current = value;
    }

    /// Change the sample rate, keeping the time constant.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.recalculate_coeff();
    }

    /// Change the time constant in milliseconds (0 = instant).
    pub fn set_smoothing_time_ms(&mut self, time_ms: f32) {
        self.time_ms = time_ms;
        self.recalculate_coeff();
    }

    /// Advance one sample and return the new value.
    #[inline]
    pub fn advance(&mut self) -> f32 {
        self.current += self.coeff * (self.target - self.current);
        self.current
    }

    /// Current value.
    #[inline]
    pub fn get(&self) -> f32 {
        self.current
    }

    /// Target value.
    #[inline]
    pub fn target(&self) -> f32 {
        self.target
    }

    /// Whether the value is within 1e-6 of its target.
    #[inline]
    pub fn is_settled(&self) -> bool {
        (self.current - self.target).abs() < 1e-6
    }

    /// Jump to the target.
    #[inline]
    pub fn snap_to_target(&mut self) {
        self.current = self.target;
    }

    fn recalculate_coeff(&mut self) {
        self.coeff = if self.time_ms <= 0.0 || self.sample_rate <= 0.0 {
            1.0
        } else {
            let samples = self.time_ms * 0.001 * self.sample_rate;
            1.0 - expf(-1.0 / samples)
        };
    }
}

impl Default for SmoothedParam {
    fn default() -> Self {
        Self::new(0.0)
    }
}

/// Linearly ramped value.
///
/// Every new target restarts a ramp of fixed duration from the current value.
/// The ramp snaps exactly onto the target on its final step.
#[derive(Debug, Clone)]
pub struct LinearSmoothedParam {
    current: f32,
    target: f32,
    step: f32,
    steps_left: u32,
    ramp_len: u32,
    sample_rate: f32,
    ramp_ms: f32,
}

impl LinearSmoothedParam {
    /// Create a ramped value with sample rate and ramp time.
    pub fn with_config(initial: f32, sample_rate: f32, ramp_ms: f32) -> Self {
        let mut param = Self {
            current: initial,
            target: initial,
            step: 0.0,
            steps_left: 0,
            ramp_len: 0,
            sample_rate,
            ramp_ms,
        };
        param.recalculate_len();
        param
    }

    /// Start a ramp toward `target`. Re-setting the same target is a no-op.
    pub fn set_target(&mut self, target: f32) {
        if target == self.target {
            return;
        }
        self.target = target;
        if self.ramp_len == 0 {
            self.current = target;
            self.steps_left = 0;
        } else {
            self.step = (target - self.current) / self.ramp_len as f32;
            self.steps_left = self.ramp_len;
        }
    }

    /// Jump to `value` without a ramp.
    pub fn set_immediate(&mut self, value: f32) {
        self.current = value;
        self.target = value;
        self.steps_left = 0;
    }

    /// Change the sample rate, keeping the ramp time.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.recalculate_len();
    }

    /// Advance one sample and return the new value.
    #[inline]
    pub fn advance(&mut self) -> f32 {
        if self.steps_left > 0 {
            self.steps_left -= 1;
            self.current = if self.steps_left == 0 {
                self.target
            } else {
                self.current + self.step
            };
        }
        self.current
    }

    /// Current value.
    #[inline]
    pub fn get(&self) -> f32 {
        self.current
    }

    /// Target value.
    #[inline]
    pub fn target(&self) -> f32 {
        self.target
    }

    /// Whether the ramp has finished.
    #[inline]
    pub fn is_settled(&self) -> bool {
        self.steps_left == 0
    }

    /// Jump to the target.
    pub fn snap_to_target(&mut self) {
        self.current = self.target;
        self.steps_left = 0;
    }

    fn recalculate_len(&mut self) {
        self.ramp_len = (self.ramp_ms * 0.001 * self.sample_rate).max(0.0) as u32;
    }
}
