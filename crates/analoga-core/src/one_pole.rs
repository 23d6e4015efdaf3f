//! One-pole lowpass for tone shaping.
//!
//! ```text
//! y[n] = (1 − c)·x[n] + c·y[n-1]
//! ```
//!
//! The pole `c` is either derived from a cutoff (`c = exp(−2π·f/fs)`) or fixed
//! directly. The delay line and the global drive both use a fixed pole of
//! 0.65, which darkens the signal the same way at any sample rate.
//!
//! ```rust
//! use analoga_core::OnePole;
//!
//! let mut lp = OnePole::from_pole(0.65);
//! assert!((lp.process(1.0) - 0.35).abs() < 1e-6);
//! ```

use crate::flush_denormal;
use libm::expf;

/// One-pole (6 dB/oct) lowpass.
#[derive(Debug, Clone)]
pub struct OnePole {
    state: f32,
    pole: f32,
}

impl OnePole {
    /// Lowpass with its −3 dB point at `freq_hz`.
    pub fn new(sample_rate: f32, freq_hz: f32) -> Self {
        Self {
            state: 0.0,
            pole: expf(-core::f32::consts::TAU * freq_hz / sample_rate),
        }
    }

    /// Lowpass with a fixed pole in `[0, 1)`.
    pub fn from_pole(pole: f32) -> Self {
        Self {
            state: 0.0,
            pole: pole.clamp(0.0, 0.999_999),
        }
    }

    /// Move the cutoff.
    pub fn set_frequency(&mut self, sample_rate: f32, freq_hz: f32) {
        self.pole = expf(-core::f32::consts::TAU * freq_hz / sample_rate);
    }

    /// Current pole.
    pub fn pole(&self) -> f32 {
        self.pole
    }

    /// Filter one sample.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        self.state = flush_denormal(input + self.pole * (self.state - input));
        self.state
    }

    /// Clear the state.
    pub fn reset(&mut self) {
        self.state = 0.0;
    }
}
