//! Band-limited oscillator pair.
//!
//! Each oscillator is a bare phase accumulator plus the integrator the
//! triangle needs; frequency is supplied per sample as a phase increment, so
//! LFO pitch modulation and detune changes never leave a stale increment
//! behind.
//!
//! Discontinuities are smoothed with a 2nd-order PolyBLEP (one sample either
//! side of the edge). Square and pulse are softened by `tanh(0.9·x)` and
//! scaled by 0.65 to sit near the saw's loudness.

use core::f32::consts::TAU;
use libm::{floorf, powf, sinf, tanhf};

use analoga_core::{Noise, flush_denormal};

const SQUARE_SOFTEN: f32 = 0.9;
const SQUARE_LEVEL: f32 = 0.65;
const TRIANGLE_LEAK: f32 = 0.0005;
const TRIANGLE_GAIN: f32 = 3.0;

/// Oscillator waveforms, in parameter order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Waveform {
    /// Sawtooth.
    #[default]
    Saw,
    /// 50 % square.
    Square,
    /// Variable-width pulse, DC-corrected.
    Pulse,
    /// Integrated square.
    Triangle,
    /// Sine.
    Sine,
}

impl Waveform {
    /// All waveforms in parameter order.
    pub const ALL: [Self; 5] = [
        Self::Saw,
        Self::Square,
        Self::Pulse,
        Self::Triangle,
        Self::Sine,
    ];

    /// Waveform for a parameter index, `None` outside `0..=4`.
    pub fn from_index(index: i32) -> Option<Self> {
        usize::try_from(index)
            .ok()
            .and_then(|i| Self::ALL.get(i))
            .copied()
    }

    /// Display name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Saw => "Saw",
            Self::Square => "Square",
            Self::Pulse => "Pulse",
            Self::Triangle => "Triangle",
            Self::Sine => "Sine",
        }
    }
}

/// 2nd-order PolyBLEP residual at phase `t` for increment `dt`.
#[inline]
pub fn poly_blep(t: f32, dt: f32) -> f32 {
    if t < dt {
        let u = t / dt;
        u + u - u * u - 1.0
    } else if t > 1.0 - dt {
        let u = (t - 1.0) / dt;
        u * u + u + u + 1.0
    } else {
        0.0
    }
}

#[inline]
fn wrap_unit(t: f32) -> f32 {
    if t >= 1.0 { t - 1.0 } else { t }
}

#[inline]
fn blep_square(t: f32, dt: f32) -> f32 {
    let naive = if t < 0.5 { 1.0 } else { -1.0 };
    naive + poly_blep(t, dt) - poly_blep(wrap_unit(t + 0.5), dt)
}

/// One phase accumulator with triangle integrator.
///
/// ```rust
/// use analoga_synth::{Oscillator, Waveform};
///
/// let mut osc = Oscillator::new();
/// let dt = 440.0 / 48000.0;
/// for _ in 0..1000 {
///     let s = osc.next_sample(Some(Waveform::Saw), dt, 0.5);
///     assert!(s.abs() <= 1.0 + 1e-6);
/// }
/// assert!((0.0..1.0).contains(&osc.phase()));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Oscillator {
    phase: f32,
    triangle: f32,
}

impl Oscillator {
    /// Oscillator at phase zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current phase in `[0, 1)`.
    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Current triangle integrator state.
    pub fn triangle_state(&self) -> f32 {
        self.triangle
    }

    /// Zero the phase and the triangle integrator.
    pub fn reset(&mut self) {
        self.phase = 0.0;
        self.triangle = 0.0;
    }

    /// Render one sample at the current phase, then advance by `dt`.
    ///
    /// `None` renders silence but still advances the phase. `pulse_width` is
    /// only read by [`Waveform::Pulse`] and is clamped to `[0.05, 0.95]`.
    #[inline]
    pub fn next_sample(&mut self, waveform: Option<Waveform>, dt: f32, pulse_width: f32) -> f32 {
        let t = self.phase;
        let out = match waveform {
            Some(Waveform::Saw) => 2.0 * t - 1.0 - poly_blep(t, dt),
            Some(Waveform::Square) => {
                tanhf(SQUARE_SOFTEN * blep_square(t, dt)) * SQUARE_LEVEL
            }
            Some(Waveform::Pulse) => {
                let pw = pulse_width.clamp(0.05, 0.95);
                let naive = if t < pw { 1.0 } else { -1.0 };
                let pulse = naive - (2.0 * pw - 1.0) + poly_blep(t, dt)
                    - poly_blep(wrap_unit(t + 1.0 - pw), dt);
                tanhf(SQUARE_SOFTEN * pulse) * SQUARE_LEVEL
            }
            Some(Waveform::Triangle) => {
                self.triangle += blep_square(t, dt) * dt;
                self.triangle = flush_denormal(self.triangle - self.triangle * TRIANGLE_LEAK);
                (self.triangle * TRIANGLE_GAIN).clamp(-1.0, 1.0)
            }
            Some(Waveform::Sine) => sinf(TAU * t),
            None => 0.0,
        };

        self.phase += dt;
        if self.phase >= 1.0 {
            self.phase -= floorf(self.phase);
        }
        out
    }
}

/// Settings shared by both oscillators for one block.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OscillatorSettings {
    /// First oscillator waveform.
    pub waveform1: Option<Waveform>,
    /// Second oscillator waveform.
    pub waveform2: Option<Waveform>,
    /// First oscillator level.
    pub volume1: f32,
    /// Second oscillator level.
    pub volume2: f32,
    /// Pulse width for [`Waveform::Pulse`].
    pub pulse_width: f32,
    /// Noise crossfade, `None` when noise is off.
    pub noise_mix: Option<f32>,
}

impl Default for OscillatorSettings {
    fn default() -> Self {
        Self {
            waveform1: Some(Waveform::Saw),
            waveform2: Some(Waveform::Saw),
            volume1: 0.1,
            volume2: 0.1,
            pulse_width: 0.5,
            noise_mix: None,
        }
    }
}

/// Frequency ratio of the second oscillator, `2^((semi + cents/100)/12)`.
#[inline]
pub fn detune_ratio(semitones: f32, cents: f32) -> f32 {
    powf(2.0, (semitones + cents * 0.01) / 12.0)
}

/// Two oscillators and the noise source of one voice.
#[derive(Debug, Clone)]
pub struct OscillatorPair {
    osc1: Oscillator,
    osc2: Oscillator,
    noise: Noise,
}

impl OscillatorPair {
    /// Pair with its own noise seed.
    pub fn new(noise_seed: u32) -> Self {
        Self {
            osc1: Oscillator::new(),
            osc2: Oscillator::new(),
            noise: Noise::new(noise_seed),
        }
    }

    /// First oscillator.
    pub fn osc1(&self) -> &Oscillator {
        &self.osc1
    }

    /// Second oscillator.
    pub fn osc2(&self) -> &Oscillator {
        &self.osc2
    }

    /// Zero both phases and integrators.
    pub fn reset(&mut self) {
        self.osc1.reset();
        self.osc2.reset();
    }

    /// Mixed output for one sample. `phase_inc` drives the first oscillator,
    /// `phase_inc · detune` the second.
    #[inline]
    pub fn next(&mut self, settings: &OscillatorSettings, phase_inc: f32, detune: f32) -> f32 {
        let pw = settings.pulse_width;
        let a = self.osc1.next_sample(settings.waveform1, phase_inc, pw);
        let b = self
            .osc2
            .next_sample(settings.waveform2, phase_inc * detune, pw);
        let out = a * settings.volume1 + b * settings.volume2;

        match settings.noise_mix {
            Some(mix) => out * (1.0 - mix) + self.noise.next_bipolar() * mix,
            None => out,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: f32 = 48000.0;

    #[test]
    fn blep_is_zero_away_from_edges() {
        let dt = 0.01;
        assert_eq!(poly_blep(0.5, dt), 0.0);
        assert_eq!(poly_blep(0.0, dt), -1.0);
        assert!((poly_blep(0.999_999, dt) - 1.0).abs() < 1e-3);
    }

    #[test]
    fn saw_starts_at_minus_one_with_blep() {
        let mut osc = Oscillator::new();
        // t = 0: 2·0 − 1 − (−1) = 0
        assert_eq!(osc.next_sample(Some(Waveform::Saw), 0.01, 0.5), 0.0);
    }

    #[test]
    fn sine_frequency_by_zero_crossings() {
        let mut osc = Oscillator::new();
        let dt = 1000.0 / SR;
        let mut crossings = 0;
        let mut prev = 0.0;
        for _ in 0..48000 {
            let s = osc.next_sample(Some(Waveform::Sine), dt, 0.5);
            if prev <= 0.0 && s > 0.0 {
                crossings += 1;
            }
            prev = s;
        }
        assert!((crossings - 1000i32).abs() <= 2, "{crossings}");
    }

    #[test]
    fn square_and_pulse_are_level_matched() {
        for wf in [Waveform::Square, Waveform::Pulse] {
            let mut osc = Oscillator::new();
            for _ in 0..10_000 {
                let s = osc.next_sample(Some(wf), 220.0 / SR, 0.3);
                assert!(s.abs() <= SQUARE_LEVEL, "{wf:?}: {s}");
            }
        }
    }

    #[test]
    fn pulse_has_no_dc() {
        let mut osc = Oscillator::new();
        let dt = 100.0 / SR;
        let n = 48000;
        let mean: f32 =
            (0..n).map(|_| osc.next_sample(Some(Waveform::Pulse), dt, 0.2)).sum::<f32>() / n as f32;
        assert!(mean.abs() < 0.01, "mean {mean}");
    }

    #[test]
    fn silent_waveform_still_advances() {
        let mut osc = Oscillator::new();
        assert_eq!(osc.next_sample(None, 0.25, 0.5), 0.0);
        assert_eq!(osc.phase(), 0.25);
    }

    #[test]
    fn phase_stays_in_unit_interval_for_large_increments() {
        let mut osc = Oscillator::new();
        for _ in 0..1000 {
            osc.next_sample(Some(Waveform::Saw), 1.37, 0.5);
            assert!((0.0..1.0).contains(&osc.phase()));
        }
    }

    #[test]
    fn detune_ratio_octave_and_cents() {
        assert!((detune_ratio(12.0, 0.0) - 2.0).abs() < 1e-6);
        assert!((detune_ratio(-24.0, 0.0) - 0.25).abs() < 1e-6);
        assert!((detune_ratio(0.0, 100.0) - detune_ratio(1.0, 0.0)).abs() < 1e-6);
    }

    #[test]
    fn noise_crossfade_replaces_oscillators_at_full_mix() {
        let mut pair = OscillatorPair::new(7);
        let settings = OscillatorSettings {
            noise_mix: Some(1.0),
            ..OscillatorSettings::default()
        };
        let mut reference = Noise::new(7);
        for _ in 0..100 {
            let y = pair.next(&settings, 0.01, 1.0);
            assert_eq!(y, reference.next_bipolar());
        }
    }
}
