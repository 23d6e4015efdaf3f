//! Topology-preserving transform state variable filter.
//!
//! Trapezoidal-integrator SVF after Zavalishin, "The Art of VA Filter Design"
//! (2012), chapter 3. The TPT form keeps the analog prototype's response and
//! stays stable while cutoff is swept, which is what the per-voice filter
//! needs when an LFO drives it.
//!
//! ```text
//! g = tan(π·fc/fs)    R2 = 1/Q    h = 1 / (1 + R2·g + g²)
//!
//! hp = h·(x − (R2 + g)·s1 − s2)
//! bp = g·hp + s1        s1 = g·hp + bp
//! lp = g·bp + s2        s2 = g·bp + lp
//! ```
//!
//! Cutoff and Q are held in [`SmoothedParam`]s and the coefficients are
//! recomputed per sample only while either value is still moving.

use core::f32::consts::PI;
use libm::tanf;

use crate::{Effect, SmoothedParam, flush_denormal};

/// Lowest accepted Q. The synth's resonance range starts at 0.1.
pub const SVF_MIN_Q: f32 = 0.05;
/// Highest accepted Q.
pub const SVF_MAX_Q: f32 = 20.0;

/// Which response [`StateVariableFilter::process`] returns.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SvfOutput {
    /// 12 dB/oct lowpass.
    #[default]
    Lowpass,
    /// 12 dB/oct highpass.
    Highpass,
    /// Constant-skirt bandpass.
    Bandpass,
}

/// Two-pole TPT state variable filter with smoothed cutoff and Q.
///
/// ```rust
/// use analoga_core::{Effect, StateVariableFilter};
///
/// let mut svf = StateVariableFilter::new(48000.0);
/// svf.set_cutoff(800.0);
/// svf.set_resonance(0.7);
/// let y = svf.process(0.5);
/// assert!(y.is_finite());
/// ```
#[derive(Debug, Clone)]
pub struct StateVariableFilter {
    s1: f32,
    s2: f32,
    g: f32,
    r2: f32,
    h: f32,
    cutoff: SmoothedParam,
    resonance: SmoothedParam,
    sample_rate: f32,
    output: SvfOutput,
}

impl Default for StateVariableFilter {
    fn default() -> Self {
        Self::new(48000.0)
    }
}

impl StateVariableFilter {
    /// 1 kHz Butterworth lowpass with 5 ms parameter smoothing.
    pub fn new(sample_rate: f32) -> Self {
        let mut svf = Self {
            s1: 0.0,
            s2: 0.0,
            g: 0.0,
            r2: 0.0,
            h: 0.0,
            cutoff: SmoothedParam::with_config(1000.0, sample_rate, 5.0),
            resonance: SmoothedParam::with_config(
                core::f32::consts::FRAC_1_SQRT_2,
                sample_rate,
                5.0,
            ),
            sample_rate,
            output: SvfOutput::Lowpass,
        };
        svf.update_coefficients();
        svf
    }

    /// Set the cutoff target in Hz, clamped to `[10, 0.49·fs]`.
    pub fn set_cutoff(&mut self, freq: f32) {
        self.cutoff.set_target(self.clamp_cutoff(freq));
    }

    /// Set the cutoff without smoothing.
    pub fn set_cutoff_immediate(&mut self, freq: f32) {
        self.cutoff.set_immediate(self.clamp_cutoff(freq));
        self.update_coefficients();
    }

    /// Current (smoothed) cutoff in Hz.
    pub fn cutoff(&self) -> f32 {
        self.cutoff.get()
    }

    /// Set the Q target, clamped to [`SVF_MIN_Q`]..=[`SVF_MAX_Q`].
    pub fn set_resonance(&mut self, q: f32) {
        self.resonance.set_target(q.clamp(SVF_MIN_Q, SVF_MAX_Q));
    }

    /// Current (smoothed) Q.
    pub fn resonance(&self) -> f32 {
        self.resonance.get()
    }

    /// Set the smoothing time for cutoff and Q (0 = instant).
    pub fn set_smoothing_ms(&mut self, ms: f32) {
        self.cutoff.set_smoothing_time_ms(ms);
        self.resonance.set_smoothing_time_ms(ms);
    }

    /// Select the response.
    pub fn set_output_type(&mut self, output: SvfOutput) {
        self.output = output;
    }

    /// Filter one sample and return `(lowpass, bandpass, highpass)`.
    #[inline]
    pub fn process_all(&mut self, input: f32) -> (f32, f32, f32) {
        if !self.cutoff.is_settled() || !self.resonance.is_settled() {
            self.cutoff.advance();
            self.resonance.advance();
            self.update_coefficients();
        }

        let hp = self.h * (input - (self.r2 + self.g) * self.s1 - self.s2);
        let ghp = self.g * hp;
        let bp = ghp + self.s1;
        self.s1 = flush_denormal(ghp + bp);
        let gbp = self.g * bp;
        let lp = gbp + self.s2;
        self.s2 = flush_denormal(gbp + lp);
        (lp, bp, hp)
    }

    fn clamp_cutoff(&self, freq: f32) -> f32 {
        freq.clamp(10.0, self.sample_rate * 0.49)
    }

    fn update_coefficients(&mut self) {
        self.g = tanf(PI * self.cutoff.get() / self.sample_rate);
        self.r2 = 1.0 / self.resonance.get();
        self.h = 1.0 / (1.0 + self.r2 * self.g + self.g * self.g);
    }
}

impl Effect for StateVariableFilter {
    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        let (lp, bp, hp) = self.process_all(input);
        match self.output {
            SvfOutput::Lowpass => lp,
            SvfOutput::Bandpass => bp,
            SvfOutput::Highpass => hp,
        }
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.cutoff.set_sample_rate(sample_rate);
        self.resonance.set_sample_rate(sample_rate);
        let cutoff = self.clamp_cutoff(self.cutoff.target());
        self.cutoff.set_immediate(cutoff);
        self.resonance.snap_to_target();
        self.update_coefficients();
    }

    fn reset(&mut self) {
        self.s1 = 0.0;
        self.s2 = 0.0;
        self.cutoff.snap_to_target();
        self.resonance.snap_to_target();
        self.update_coefficients();
    }
}
