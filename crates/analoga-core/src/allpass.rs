//! Freeverb diffusion allpass.
//!
//! ```text
//! d      = buf[n − L]
//! y      = d − x
//! buf[n] = x + d·g
//! ```
//!
//! With `g = 0.5` this is the classic Freeverb approximation of a Schroeder
//! allpass; it smears the comb output into a dense tail.

use crate::{DelayBuffer, flush_denormal};

/// Fixed-length diffusion allpass.
///
/// ```rust
/// use analoga_core::AllpassFilter;
///
/// let mut ap = AllpassFilter::new(556);
/// assert_eq!(ap.process(1.0), -1.0);
/// ```
#[derive(Debug, Clone)]
pub struct AllpassFilter {
    line: DelayBuffer,
    feedback: f32,
}

impl AllpassFilter {
    /// Allpass with a `len`-sample loop and feedback 0.5.
    pub fn new(len: usize) -> Self {
        Self {
            line: DelayBuffer::new(len),
            feedback: 0.5,
        }
    }

    /// Loop gain, clamped to `(-1, 1)`.
    pub fn set_feedback(&mut self, feedback: f32) {
        self.feedback = feedback.clamp(-0.99, 0.99);
    }

    /// Process one sample.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let delayed = self.line.oldest();
        self.line
            .write(flush_denormal(input + delayed * self.feedback));
        delayed - input
    }

    /// Clear the loop.
    pub fn clear(&mut self) {
        self.line.clear();
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
