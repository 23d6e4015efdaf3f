//! Hard-knee feed-forward compressor for the console chain.
//!
//! # Signal Flow
//!
//! ```text
//! Input → Peak Follower → Gain Computer → × Input
//! ```
//!
//! Above the threshold the output level rises `1/ratio` dB per input dB;
//! below it the gain is exactly unity. There is no knee and no makeup gain:
//! the console's post-gain does the level matching.
//!
//! # Parameters
//!
//! | Parameter | Range | Default |
//! |-----------|-------|---------|
//! | Threshold | -60 to 0 dB | 0.0 |
//! | Ratio | 1:1 to 20:1 | 4.0 |
//! | Attack | 0–500 ms | 5.0 |
//! | Release | 1–2000 ms | 60.0 |

use analoga_core::{Effect, EnvelopeFollower, db_to_linear, linear_to_db};

/// Gain computer for the static curve.
#[derive(Debug, Clone)]
struct GainComputer {
    threshold_db: f32,
    ratio: f32,
}

impl GainComputer {
    #[inline]
    fn compute_gain_db(&self, input_db: f32) -> f32 {
        let overshoot = input_db - self.threshold_db;
        if overshoot <= 0.0 {
            0.0
        } else {
            -(overshoot * (1.0 - 1.0 / self.ratio))
        }
    }
}

/// Mono compressor.
///
/// # Example
///
/// ```rust
/// use analoga_core::Effect;
/// use analoga_effects::Compressor;
///
/// let mut comp = Compressor::new(48000.0);
/// comp.set_threshold_db(-12.0);
/// comp.set_ratio(2.0);
/// comp.set_attack_ms(3.0);
/// comp.set_release_ms(100.0);
///
/// for _ in 0..4800 {
///     comp.process(0.5);
/// }
/// assert!(comp.gain_reduction_db() < -2.0);
/// ```
#[derive(Debug, Clone)]
pub struct Compressor {
    envelope_follower: EnvelopeFollower,
    gain_computer: GainComputer,
    /// Last computed gain reduction in dB (always non-positive).
    last_gain_reduction_db: f32,
}

impl Compressor {
    /// Compressor at 0 dB threshold, 4:1, 5 ms attack, 60 ms release.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            envelope_follower: EnvelopeFollower::with_times(sample_rate, 5.0, 60.0),
            gain_computer: GainComputer {
                threshold_db: 0.0,
                ratio: 4.0,
            },
            last_gain_reduction_db: 0.0,
        }
    }

    /// Set threshold in dB.
    pub fn set_threshold_db(&mut self, threshold_db: f32) {
        self.gain_computer.threshold_db = threshold_db.clamp(-60.0, 0.0);
    }

    /// Current threshold.
    pub fn threshold_db(&self) -> f32 {
        self.gain_computer.threshold_db
    }

    /// Set compression ratio.
    pub fn set_ratio(&mut self, ratio: f32) {
        self.gain_computer.ratio = ratio.clamp(1.0, 20.0);
    }

    /// Current ratio.
    pub fn ratio(&self) -> f32 {
        self.gain_computer.ratio
    }

    /// Set attack time in milliseconds.
    pub fn set_attack_ms(&mut self, attack_ms: f32) {
        self.envelope_follower
            .set_attack_ms(attack_ms.clamp(0.0, 500.0));
    }

    /// Current attack time.
    pub fn attack_ms(&self) -> f32 {
        self.envelope_follower.attack_ms()
    }

    /// Set release time in milliseconds.
    pub fn set_release_ms(&mut self, release_ms: f32) {
        self.envelope_follower
            .set_release_ms(release_ms.clamp(1.0, 2000.0));
    }

    /// Current release time.
    pub fn release_ms(&self) -> f32 {
        self.envelope_follower.release_ms()
    }

    /// Returns the last computed gain reduction in dB (always non-positive).
    pub fn gain_reduction_db(&self) -> f32 {
        self.last_gain_reduction_db
    }
}

impl Effect for Compressor {
    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        let envelope = self.envelope_follower.process(input);
        let gain_reduction_db = self.gain_computer.compute_gain_db(linear_to_db(envelope));
        self.last_gain_reduction_db = gain_reduction_db;
        if gain_reduction_db == 0.0 {
            input
        } else {
            input * db_to_linear(gain_reduction_db)
        }
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.envelope_follower.set_sample_rate(sample_rate);
    }

    fn reset(&mut self) {
        self.envelope_follower.reset();
        self.last_gain_reduction_db = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: f32 = 48000.0;

    #[test]
    fn below_threshold_is_untouched() {
        let mut comp = Compressor::new(SR);
        comp.set_threshold_db(-12.0);
        for i in 0..4800 {
            let x = 0.1 * (i as f32 * 0.05).sin();
            assert_eq!(comp.process(x), x);
        }
        assert_eq!(comp.gain_reduction_db(), 0.0);
    }

    #[test]
    fn steady_state_follows_ratio() {
        let mut comp = Compressor::new(SR);
        comp.set_threshold_db(-20.0);
        comp.set_ratio(4.0);
        let mut y = 0.0;
        for _ in 0..48000 {
            y = comp.process(0.5);
        }
        // 0.5 ≈ −6 dB: 14 dB over, reduced by 14·0.75 = 10.5 dB.
        let expected = 0.5 * db_to_linear(-(linear_to_db(0.5) + 20.0) * 0.75);
        assert!((y - expected).abs() < 1e-3, "{y} vs {expected}");
    }

    #[test]
    fn parameters_clamp() {
        let mut comp = Compressor::new(SR);
        comp.set_ratio(0.5);
        assert_eq!(comp.ratio(), 1.0);
        comp.set_threshold_db(12.0);
        assert_eq!(comp.threshold_db(), 0.0);
        comp.set_release_ms(0.0);
        assert_eq!(comp.release_ms(), 1.0);
    }

    #[test]
    fn reset_clears_reduction() {
        let mut comp = Compressor::new(SR);
        comp.set_threshold_db(-30.0);
        for _ in 0..1000 {
            comp.process(0.9);
        }
        assert!(comp.gain_reduction_db() < 0.0);
        comp.reset();
        assert_eq!(comp.gain_reduction_db(), 0.0);
    }
}
