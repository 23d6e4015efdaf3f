//! Tempo-syncable feedback delay.
//!
//! One [`DelayLine`] per channel; the engine keeps a left and a right line
//! with identical settings.
//!
//! # Signal Flow
//!
//! ```text
//! smoothed = 0.99·smoothed + 0.01·target          (per sample)
//! tap      = catmull_rom(write − smoothed)
//! wet      = 0.35·tap + 0.65·wet                  (tone)
//! out      = in·(1 − mix) + wet·mix
//! write    ← clamp(in + wet·feedback, −1.5, 1.5)
//! ```
//!
//! # Parameters
//!
//! | Parameter | Range | Default |
//! |-----------|-------|---------|
//! | Delay time | 0 to (len − 3)/fs seconds | 0 |
//! | Feedback | 0.0–0.98 | 0.5 |
//! | Mix | 0.0–1.0 | 0.3 |

use analoga_core::{DelayBuffer, OnePole};

/// Longest delay the engine prepares for.
pub const MAX_DELAY_SECONDS: f32 = 5.0;

/// Per-sample weight of the delay-time smoother.
const TIME_SMOOTHING: f32 = 0.01;

/// Pole of the tap's tone filter.
const TONE_POLE: f32 = 0.65;

/// Headroom of the recirculating signal.
const FEEDBACK_LIMIT: f32 = 1.5;

/// Mono delay line with smoothed time, cubic interpolation and a dark tap.
///
/// ```rust
/// use analoga_effects::DelayLine;
///
/// let mut delay = DelayLine::new();
/// delay.prepare(48000.0, 1.0);
/// delay.set_delay_time(0.25);
/// delay.set_feedback(0.4);
/// delay.set_mix(0.5);
///
/// let mut block = [0.5f32; 64];
/// delay.process_block(&mut block);
/// ```
#[derive(Debug, Clone)]
pub struct DelayLine {
    buffer: DelayBuffer,
    sample_rate: f32,
    target_samples: f32,
    smoothed_samples: f32,
    tone: OnePole,
    feedback: f32,
    mix: f32,
}

impl Default for DelayLine {
    fn default() -> Self {
        Self::new()
    }
}

impl DelayLine {
    /// An unprepared line. [`prepare`](Self::prepare) sizes the buffer.
    pub fn new() -> Self {
        Self {
            buffer: DelayBuffer::new(1),
            sample_rate: 48000.0,
            target_samples: 0.0,
            smoothed_samples: 0.0,
            tone: OnePole::from_pole(TONE_POLE),
            feedback: 0.5,
            mix: 0.3,
        }
    }

    /// Allocate `max_seconds` of buffer at `sample_rate` and clear all state.
    ///
    /// Feedback and mix keep their values.
    pub fn prepare(&mut self, sample_rate: f32, max_seconds: f32) {
        self.sample_rate = sample_rate;
        self.buffer = DelayBuffer::from_time(sample_rate, max_seconds);
        self.target_samples = self.target_samples.min(self.max_delay_samples());
        self.smoothed_samples = 0.0;
        self.tone.reset();
    }

    /// Longest settable delay in seconds.
    pub fn max_delay_seconds(&self) -> f32 {
        self.max_delay_samples() / self.sample_rate
    }

    fn max_delay_samples(&self) -> f32 {
        (self.buffer.len() as f32 - 3.0).max(0.0)
    }

    /// Target delay in seconds, clamped to `[0, max_delay_seconds()]`.
    pub fn set_delay_time(&mut self, seconds: f32) {
        let seconds = if seconds.is_finite() { seconds } else { 0.0 };
        let seconds = seconds.clamp(0.0, self.max_delay_seconds());
        self.target_samples = seconds * self.sample_rate;
    }

    /// Target delay in samples.
    pub fn target_delay_samples(&self) -> f32 {
        self.target_samples
    }

    /// Delay currently being read, in samples.
    pub fn current_delay_samples(&self) -> f32 {
        self.smoothed_samples
    }

    /// Recirculation gain, clamped to `[0, 0.98]`.
    pub fn set_feedback(&mut self, feedback: f32) {
        self.feedback = feedback.clamp(0.0, 0.98);
    }

    /// Current feedback.
    pub fn feedback(&self) -> f32 {
        self.feedback
    }

    /// Wet proportion, clamped to `[0, 1]`.
    pub fn set_mix(&mut self, mix: f32) {
        self.mix = mix.clamp(0.0, 1.0);
    }

    /// Current mix.
    pub fn mix(&self) -> f32 {
        self.mix
    }

    /// Process one sample.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        self.smoothed_samples = (1.0 - TIME_SMOOTHING) * self.smoothed_samples
            + TIME_SMOOTHING * self.target_samples;

        let wet = self.tone.process(self.buffer.read(self.smoothed_samples));
        let output = input * (1.0 - self.mix) + wet * self.mix;

        self.buffer
            .write((input + wet * self.feedback).clamp(-FEEDBACK_LIMIT, FEEDBACK_LIMIT));
        output
    }

    /// Process a buffer in place.
    pub fn process_block(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process(*sample);
        }
    }

    /// Clear the buffer, the tone filter and the time smoother.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.tone.reset();
        self.smoothed_samples = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: f32 = 48000.0;

    fn prepared() -> DelayLine {
        let mut d = DelayLine::new();
        d.prepare(SR, MAX_DELAY_SECONDS);
        d
    }

    #[test]
    fn delay_time_is_clamped_to_buffer() {
        let mut d = DelayLine::new();
        d.prepare(1000.0, 1.0);
        d.set_delay_time(10.0);
        assert!((d.target_delay_samples() - 997.0).abs() < 1e-2);
        d.set_delay_time(-1.0);
        assert_eq!(d.target_delay_samples(), 0.0);
        d.set_delay_time(f32::NAN);
        assert_eq!(d.target_delay_samples(), 0.0);
    }

    #[test]
    fn feedback_and_mix_are_clamped() {
        let mut d = prepared();
        d.set_feedback(1.5);
        assert_eq!(d.feedback(), 0.98);
        d.set_mix(-0.5);
        assert_eq!(d.mix(), 0.0);
    }

    #[test]
    fn time_glides_instead_of_jumping() {
        let mut d = prepared();
        d.set_delay_time(0.1);
        d.process(0.0);
        let first = d.current_delay_samples();
        assert!((first - 48.0).abs() < 1e-3, "first step {first}");
        for _ in 0..2000 {
            d.process(0.0);
        }
        assert!((d.current_delay_samples() - 4800.0).abs() < 1.0);
    }

    #[test]
    fn dry_mix_is_exact_passthrough() {
        let mut d = prepared();
        d.set_mix(0.0);
        d.set_feedback(0.9);
        d.set_delay_time(0.01);
        for i in 0..4000 {
            let x = ((i * 37) % 101) as f32 / 50.0 - 1.0;
            assert_eq!(d.process(x), x);
        }
    }

    #[test]
    fn feedback_stays_bounded() {
        let mut d = prepared();
        d.set_mix(1.0);
        d.set_feedback(0.98);
        d.set_delay_time(0.001);
        for _ in 0..48000 {
            let y = d.process(1.0);
            assert!(y.is_finite() && y.abs() < 2.0, "{y}");
        }
    }

    #[test]
    fn reset_silences_the_tail() {
        let mut d = prepared();
        d.set_mix(1.0);
        d.set_delay_time(0.002);
        for _ in 0..500 {
            d.process(0.8);
        }
        d.reset();
        d.set_delay_time(0.002);
        for _ in 0..500 {
            assert_eq!(d.process(0.0), 0.0);
        }
    }
}
