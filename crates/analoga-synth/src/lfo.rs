//! Per-voice LFO and its destination scalings.
//!
//! The LFO ticks once per sample while enabled and caches the raw value, so
//! pitch, cutoff and amplitude all see the same tick. A disabled LFO outputs
//! zero and keeps its phase.

use core::f32::consts::TAU;
use libm::sinf;

use analoga_core::{SyncDivision, wrap_phase};

/// Lowest and highest cutoff an LFO sweep may reach.
pub const LFO_CUTOFF_RANGE: (f32, f32) = (20.0, 20000.0);

/// LFO shapes, in parameter order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LfoShape {
    /// Sine.
    #[default]
    Sine,
    /// Triangle.
    Triangle,
    /// Rising saw.
    Saw,
    /// Square.
    Square,
    /// Constant zero, for indices outside [`ALL`](Self::ALL).
    Flat,
}

impl LfoShape {
    /// All shapes in parameter order.
    pub const ALL: [Self; 4] = [Self::Sine, Self::Triangle, Self::Saw, Self::Square];

    /// Shape for a parameter index. Unknown indices give [`Flat`](Self::Flat).
    pub fn from_index(index: i32) -> Self {
        usize::try_from(index)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
            .unwrap_or(Self::Flat)
    }

    /// Value at phase `t` in `[0, 1)`.
    #[inline]
    pub fn value_at(self, t: f32) -> f32 {
        match self {
            Self::Sine => sinf(TAU * t),
            Self::Triangle => {
                if t < 0.5 {
                    4.0 * t - 1.0
                } else {
                    3.0 - 4.0 * t
                }
            }
            Self::Saw => 2.0 * t - 1.0,
            Self::Square => {
                if t < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            Self::Flat => 0.0,
        }
    }
}

/// Block-rate LFO controls.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LfoSettings {
    /// Whether the LFO runs at all.
    pub enabled: bool,
    /// Waveform.
    pub shape: LfoShape,
    /// Free-running rate in Hz.
    pub rate_hz: f32,
    /// Tempo division, used instead of `rate_hz` when set and a tempo is
    /// known.
    pub sync: Option<SyncDivision>,
    /// Phase offset in cycles, `[0, 1]`.
    pub phase_offset: f32,
}

impl Default for LfoSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            shape: LfoShape::Sine,
            rate_hz: 5.0,
            sync: None,
            phase_offset: 0.0,
        }
    }
}

impl LfoSettings {
    /// Effective rate in Hz at `host_bpm`.
    pub fn rate(&self, host_bpm: f32) -> f32 {
        match self.sync {
            Some(division) if host_bpm > 0.0 => division.to_hz(host_bpm),
            _ => self.rate_hz,
        }
    }
}

/// Per-voice LFO.
///
/// ```rust
/// use analoga_synth::{Lfo, LfoSettings, LfoShape};
///
/// let mut lfo = Lfo::new(48000.0);
/// let settings = LfoSettings {
///     enabled: true,
///     shape: LfoShape::Square,
///     ..LfoSettings::default()
/// };
/// assert_eq!(lfo.next(&settings, 120.0), 1.0);
/// assert_eq!(lfo.last(), 1.0);
/// ```
#[derive(Debug, Clone)]
pub struct Lfo {
    phase: f32,
    last: f32,
    sample_rate: f32,
}

impl Default for Lfo {
    fn default() -> Self {
        Self::new(48000.0)
    }
}

impl Lfo {
    /// LFO at phase zero.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            phase: 0.0,
            last: 0.0,
            sample_rate,
        }
    }

    /// Set sample rate.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
    }

    /// Advance one sample and return the raw value in `[-1, 1]`.
    #[inline]
    pub fn next(&mut self, settings: &LfoSettings, host_bpm: f32) -> f32 {
        if !settings.enabled {
            self.last = 0.0;
            return 0.0;
        }

        let increment = (settings.rate(host_bpm) / self.sample_rate).clamp(0.0, 0.5);
        self.phase = wrap_phase(self.phase + increment);
        let t = wrap_phase(self.phase + settings.phase_offset.clamp(0.0, 1.0));
        self.last = settings.shape.value_at(t);
        self.last
    }

    /// Value produced by the most recent [`next`](Self::next).
    pub fn last(&self) -> f32 {
        self.last
    }

    /// Current phase in `[0, 1)`.
    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Zero the phase and the cached value.
    pub fn reset(&mut self) {
        self.phase = 0.0;
        self.last = 0.0;
    }
}

/// Pitch multiplier for an LFO value at `depth`: `1 + lfo·depth²·0.08`.
#[inline]
pub fn pitch_factor(lfo: f32, depth: f32) -> f32 {
    1.0 + lfo * depth * depth * 0.08
}

/// Cutoff swept by the LFO: `clamp(cutoff·(1 + depth·0.5·lfo), 20, 20000)`.
#[inline]
pub fn modulated_cutoff(cutoff: f32, lfo: f32, depth: f32) -> f32 {
    (cutoff * (1.0 + depth * 0.5 * lfo)).clamp(LFO_CUTOFF_RANGE.0, LFO_CUTOFF_RANGE.1)
}

/// Amplitude target for an LFO value: `1 + clamp(depth, 0, 0.9)·lfo`.
#[inline]
pub fn amp_target(lfo: f32, depth: f32) -> f32 {
    1.0 + depth.clamp(0.0, 0.9) * lfo
}
