//! Damped feedback comb for Freeverb-style reverbs.
//!
//! ```text
//! y      = buf[n − L]
//! store  = y·(1 − damp) + store·damp
//! buf[n] = x + store·feedback
//! ```
//!
//! The one-pole lowpass in the loop makes high frequencies decay faster than
//! low ones, like absorption in a real room.

use crate::{DelayBuffer, flush_denormal};

/// Lowpass-feedback comb filter with a fixed loop length.
///
/// ```rust
/// use analoga_core::CombFilter;
///
/// let mut comb = CombFilter::new(1116);
/// comb.set_feedback(0.84);
/// comb.set_damp(0.2);
/// assert_eq!(comb.process(1.0), 0.0);
/// ```
#[derive(Debug, Clone)]
pub struct CombFilter {
    line: DelayBuffer,
    feedback: f32,
    damp: f32,
    store: f32,
}

impl CombFilter {
    /// Comb whose loop is `len` samples long.
    pub fn new(len: usize) -> Self {
        Self {
            line: DelayBuffer::new(len),
            feedback: 0.5,
            damp: 0.0,
            store: 0.0,
        }
    }

    /// Loop gain, clamped to `[0, 0.99]`.
    #[inline]
    pub fn set_feedback(&mut self, feedback: f32) {
        self.feedback = feedback.clamp(0.0, 0.99);
    }

    /// Current loop gain.
    pub fn feedback(&self) -> f32 {
        self.feedback
    }

    /// Loop lowpass amount in `[0, 1]` (0 = bright).
    #[inline]
    pub fn set_damp(&mut self, damp: f32) {
        self.damp = damp.clamp(0.0, 1.0);
    }

    /// Current damping.
    pub fn damp(&self) -> f32 {
        self.damp
    }

    /// Process one sample.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let output = self.line.oldest();
        self.store = flush_denormal(output * (1.0 - self.damp) + self.store * self.damp);
        self.line.write(input + self.store * self.feedback);
        output
    }

    /// Clear the loop.
    pub fn clear(&mut self) {
        self.line.clear();
        self.store = 0.0;
    }

    /// Loop length in samples.
    pub fn len(&self) -> usize {
        self.line.len()
    }

    /// Always false.
    pub fn is_empty(&self) -> bool {
        self.line.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn impulse_returns_after_loop_length() {
        let mut comb = CombFilter::new(100);
        comb.set_feedback(0.5);
        comb.set_damp(0.0);
        assert_eq!(comb.process(1.0), 0.0);
        for _ in 0..99 {
            assert_eq!(comb.process(0.0), 0.0);
        }
        assert_eq!(comb.process(0.0), 1.0);
        // Second echo after another loop, scaled by feedback.
        for _ in 0..99 {
            comb.process(0.0);
        }
        assert!((comb.process(0.0) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn damping_darkens_the_tail() {
        let energy = |damp: f32| {
            let mut comb = CombFilter::new(20);
            comb.set_feedback(0.8);
            comb.set_damp(damp);
            comb.process(1.0);
            (0..400).map(|_| comb.process(0.0).abs()).sum::<f32>()
        };
        assert!(energy(0.8) < energy(0.0));
    }

    #[test]
    fn clear_silences() {
        let mut comb = CombFilter::new(10);
        for _ in 0..30 {
            comb.process(1.0);
        }
        comb.clear();
        for _ in 0..30 {
            assert_eq!(comb.process(0.0), 0.0);
        }
    }

    #[test]
    fn feedback_is_clamped() {
        let mut comb = CombFilter::new(10);
        comb.set_feedback(1.5);
        assert_eq!(comb.feedback(), 0.99);
    }
}
