//! Transistor-ladder style multimode filter.
//!
//! Five cascaded states, each a one-zero/one-pole section with the zero at
//! `b1/b0 = 0.3`, and a global feedback path from the last state. Both the
//! input and the feedback pass through `tanh`, so driving the filter harder
//! compresses the resonance the way a real ladder does.
//!
//! ```text
//! a1 = exp(−2π·fc/fs)    g = 1 − a1    b0 = g/1.3    b1 = 0.3·g/1.3
//!
//! dx = gain·tanh(drive·x)
//! a  = dx − 4·res·(gain2·tanh(drive2·s4) − comp·dx)
//! b  = b1·s0 + a1·s1 + b0·a      (c, d, e likewise)
//! y  = 1.2·(A0·a + A1·b + A2·c + A3·d + A4·e)
//! ```
//!
//! The mix vector `A` selects the response ([`LadderMode`]). The cutoff pole
//! `a1` and the scaled resonance both ramp linearly per sample, so block-rate
//! control changes never step the coefficients.

use core::f32::consts::TAU;
use libm::{expf, powf, tanhf};

use crate::{Effect, LinearSmoothedParam, flush_denormal};

/// Coefficient ramp time.
pub const LADDER_RAMP_MS: f32 = 50.0;

/// Drive the synth profiles fall back to.
pub const DEFAULT_LADDER_DRIVE: f32 = 1.2;

/// Response of a [`LadderFilter`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LadderMode {
    /// 12 dB/oct lowpass.
    Lpf12,
    /// 12 dB/oct highpass.
    Hpf12,
    /// 12 dB/oct bandpass.
    Bpf12,
    /// 24 dB/oct lowpass.
    #[default]
    Lpf24,
    /// 24 dB/oct highpass.
    Hpf24,
    /// 24 dB/oct bandpass.
    Bpf24,
}

impl LadderMode {
    /// State mix vector (before the 1.2 output scale) and input compensation.
    fn taps(self) -> ([f32; 5], f32) {
        match self {
            Self::Lpf12 => ([0.0, 0.0, 1.0, 0.0, 0.0], 0.5),
            Self::Hpf12 => ([1.0, -2.0, 1.0, 0.0, 0.0], 0.0),
            Self::Bpf12 => ([0.0, 0.0, -1.0, 1.0, 0.0], 0.5),
            Self::Lpf24 => ([0.0, 0.0, 0.0, 0.0, 1.0], 0.5),
            Self::Hpf24 => ([1.0, -4.0, 6.0, -4.0, 1.0], 0.0),
            Self::Bpf24 => ([0.0, 0.0, 1.0, -2.0, 1.0], 0.5),
        }
    }
}

/// Ladder filter with saturating input and feedback.
///
/// ## Parameters
///
/// - `cutoff`: Hz, clamped to `[10, 0.49·fs]`
/// - `resonance`: 0..1, mapped onto a feedback amount of 0.1..1.0
/// - `drive`: ≥ 1, input drive with automatic makeup
/// - `mode`: [`LadderMode`]
///
/// ```rust
/// use analoga_core::{Effect, LadderFilter, LadderMode};
///
/// let mut ladder = LadderFilter::new(48000.0);
/// ladder.set_mode(LadderMode::Lpf24);
/// ladder.set_cutoff(2000.0);
/// ladder.set_resonance(0.3);
/// ladder.set_drive(1.2);
/// assert!(ladder.process(0.25).is_finite());
/// ```
#[derive(Debug, Clone)]
pub struct LadderFilter {
    state: [f32; 5],
    taps: [f32; 5],
    comp: f32,
    mode: LadderMode,
    drive: f32,
    drive2: f32,
    gain: f32,
    gain2: f32,
    cutoff_hz: f32,
    pole: LinearSmoothedParam,
    resonance: LinearSmoothedParam,
    sample_rate: f32,
}

impl Default for LadderFilter {
    fn default() -> Self {
        Self::new(48000.0)
    }
}

impl LadderFilter {
    /// Lpf24 at 200 Hz, no resonance, drive 1.2.
    pub fn new(sample_rate: f32) -> Self {
        let mut ladder = Self {
            state: [0.0; 5],
            taps: [0.0; 5],
            comp: 0.0,
            mode: LadderMode::Lpf24,
            drive: 1.0,
            drive2: 1.0,
            gain: 1.0,
            gain2: 1.0,
            cutoff_hz: 200.0,
            pole: LinearSmoothedParam::with_config(0.0, sample_rate, LADDER_RAMP_MS),
            resonance: LinearSmoothedParam::with_config(0.1, sample_rate, LADDER_RAMP_MS),
            sample_rate,
        };
        ladder.set_mode(LadderMode::Lpf24);
        ladder.set_drive(DEFAULT_LADDER_DRIVE);
        ladder.pole.set_immediate(ladder.pole_for(ladder.cutoff_hz));
        ladder
    }

    /// Select the response.
    pub fn set_mode(&mut self, mode: LadderMode) {
        let (taps, comp) = mode.taps();
        self.mode = mode;
        self.comp = comp;
        self.taps = taps.map(|t| t * 1.2);
    }

    /// Current response.
    pub fn mode(&self) -> LadderMode {
        self.mode
    }

    /// Ramp toward a new cutoff.
    pub fn set_cutoff(&mut self, freq: f32) {
        self.cutoff_hz = self.clamp_cutoff(freq);
        self.pole.set_target(self.pole_for(self.cutoff_hz));
    }

    /// Jump to a new cutoff.
    pub fn set_cutoff_immediate(&mut self, freq: f32) {
        self.cutoff_hz = self.clamp_cutoff(freq);
        self.pole.set_immediate(self.pole_for(self.cutoff_hz));
    }

    /// Last requested cutoff in Hz.
    pub fn cutoff(&self) -> f32 {
        self.cutoff_hz
    }

    /// Ramp toward a new resonance in `[0, 1]`.
    pub fn set_resonance(&mut self, resonance: f32) {
        self.resonance.set_target(Self::scale_resonance(resonance));
    }

    /// Jump to a new resonance in `[0, 1]`.
    pub fn set_resonance_immediate(&mut self, resonance: f32) {
        self.resonance
            .set_immediate(Self::scale_resonance(resonance));
    }

    /// Set the input drive. Values below 1 are raised to 1.
    ///
    /// Makeup gain follows `drive^−2.642·0.6103 + 0.3903`, which holds the
    /// small-signal level roughly constant as drive rises.
    pub fn set_drive(&mut self, drive: f32) {
        self.drive = drive.max(1.0);
        self.gain = powf(self.drive, -2.642) * 0.6103 + 0.3903;
        self.drive2 = self.drive * 0.04 + 0.96;
        self.gain2 = powf(self.drive2, -2.642) * 0.6103 + 0.3903;
    }

    /// Current drive.
    pub fn drive(&self) -> f32 {
        self.drive
    }

    fn scale_resonance(resonance: f32) -> f32 {
        0.1 + resonance.clamp(0.0, 1.0) * 0.9
    }

    fn clamp_cutoff(&self, freq: f32) -> f32 {
        freq.clamp(10.0, self.sample_rate * 0.49)
    }

    fn pole_for(&self, freq: f32) -> f32 {
        expf(-TAU * freq / self.sample_rate)
    }
}

impl Effect for LadderFilter {
    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        let a1 = self.pole.advance();
        let res = self.resonance.advance();
        let g = 1.0 - a1;
        let b0 = g * 0.769_230_77;
        let b1 = g * 0.230_769_23;

        let s = &mut self.state;
        let dx = self.gain * tanhf(self.drive * input);
        let a = dx + res * -4.0 * (self.gain2 * tanhf(self.drive2 * s[4]) - dx * self.comp);
        let b = b1 * s[0] + a1 * s[1] + b0 * a;
        let c = b1 * s[1] + a1 * s[2] + b0 * b;
        let d = b1 * s[2] + a1 * s[3] + b0 * c;
        let e = b1 * s[3] + a1 * s[4] + b0 * d;
        *s = [a, b, c, d, e].map(flush_denormal);

        let t = &self.taps;
        a * t[0] + b * t[1] + c * t[2] + d * t[3] + e * t[4]
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.pole.set_sample_rate(sample_rate);
        self.resonance.set_sample_rate(sample_rate);
        self.cutoff_hz = self.clamp_cutoff(self.cutoff_hz);
        self.pole.set_immediate(self.pole_for(self.cutoff_hz));
        self.resonance.snap_to_target();
    }

    fn reset(&mut self) {
        self.state = [0.0; 5];
        self.pole.snap_to_target();
        self.resonance.snap_to_target();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use libm::sinf;

    const SR: f32 = 48000.0;

    fn settled(mode: LadderMode, cutoff: f32) -> LadderFilter {
        let mut f = LadderFilter::new(SR);
        f.set_mode(mode);
        f.set_cutoff_immediate(cutoff);
        f.set_resonance_immediate(0.0);
        f
    }

    fn peak(f: &mut LadderFilter, freq: f32, amp: f32) -> f32 {
        let mut p = 0.0f32;
        for i in 0..24000 {
            let y = f.process(amp * sinf(TAU * freq * i as f32 / SR));
            if i > 12000 {
                p = p.max(y.abs());
            }
        }
        p
    }

    #[test]
    fn lowpass_24_rolls_off_steeply() {
        let mut f = settled(LadderMode::Lpf24, 500.0);
        let pass = peak(&mut f, 60.0, 0.1);
        f.reset();
        let stop = peak(&mut f, 8000.0, 0.1);
        assert!(pass > 0.05, "passband {pass}");
        assert!(stop < pass * 0.001, "stopband {stop} vs {pass}");
    }

    #[test]
    fn highpass_12_blocks_low_frequencies() {
        let mut f = settled(LadderMode::Hpf12, 2000.0);
        let low = peak(&mut f, 50.0, 0.1);
        f.reset();
        let high = peak(&mut f, 15000.0, 0.1);
        assert!(low < high * 0.05, "low {low} high {high}");
    }

    #[test]
    fn resonance_maps_onto_feedback_range() {
        assert!((LadderFilter::scale_resonance(0.0) - 0.1).abs() < 1e-6);
        assert!((LadderFilter::scale_resonance(1.0) - 1.0).abs() < 1e-6);
        assert!((LadderFilter::scale_resonance(5.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn full_resonance_and_drive_stay_bounded() {
        let mut f = settled(LadderMode::Lpf24, 1000.0);
        f.set_resonance_immediate(1.0);
        f.set_drive(8.0);
        for i in 0..48000 {
            let x = if i < 10 { 1.0 } else { 0.0 };
            let y = f.process(x);
            assert!(y.is_finite() && y.abs() < 10.0, "sample {i}: {y}");
        }
    }

    #[test]
    fn cutoff_change_ramps() {
        let mut f = settled(LadderMode::Lpf24, 200.0);
        let before = f.pole.get();
        f.set_cutoff(8000.0);
        f.process(0.0);
        let after = f.pole.get();
        assert!(after < before, "pole should move toward the new cutoff");
        assert!(after > f.pole_for(8000.0), "pole should not jump");
    }

    #[test]
    fn drive_below_one_is_raised() {
        let mut f = LadderFilter::new(SR);
        f.set_drive(0.2);
        assert_eq!(f.drive(), 1.0);
    }
}
