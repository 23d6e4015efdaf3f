//! Parameter table, lock-free store and per-block snapshot.
//!
//! Every control of the synth is a single `f32` addressed by [`ParamId`].
//! The host side writes into a [`ParamStore`] (atomic bit patterns, relaxed
//! ordering) from any thread; the render thread takes one [`ParamSnapshot`]
//! per block and reads only from that.
//!
//! Reads never fail. A non-finite value falls back to the parameter default
//! and every value is clamped to its declared range, so the DSP code can
//! trust whatever it reads.
//!
//! ```rust
//! use analoga_synth::{ParamId, ParamStore};
//!
//! let store = ParamStore::new();
//! store.set(ParamId::Cutoff, 1200.0);
//! assert!(store.set_by_name("RESONANCE", 0.4));
//! assert!(!store.set_by_name("NOT_A_PARAM", 1.0));
//!
//! let snap = store.snapshot();
//! assert_eq!(snap.get(ParamId::Cutoff), 1200.0);
//! assert_eq!(snap.by_name("RESONANCE"), Some(0.4));
//! ```

use core::sync::atomic::{AtomicU32, Ordering};

/// Unit of a parameter value, used for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParamUnit {
    /// Index into a list of choices.
    Choice,
    /// On/off; on is anything above 0.5.
    Toggle,
    /// Unitless linear value.
    #[default]
    Linear,
    /// Frequency.
    Hertz,
    /// Time in seconds.
    Seconds,
    /// Time in milliseconds.
    Milliseconds,
    /// Pitch offset in semitones.
    Semitones,
    /// Pitch offset in cents.
    Cents,
}

impl ParamUnit {
    /// Short suffix for display.
    pub fn suffix(self) -> &'static str {
        match self {
            Self::Choice | Self::Toggle | Self::Linear => "",
            Self::Hertz => "Hz",
            Self::Seconds => "s",
            Self::Milliseconds => "ms",
            Self::Semitones => "st",
            Self::Cents => "ct",
        }
    }
}

/// Static description of one parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamDescriptor {
    /// Identifier.
    pub id: ParamId,
    /// Stable text id used by hosts and render configs (`"CUTOFF"`).
    pub string_id: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Display unit.
    pub unit: ParamUnit,
    /// Lowest value.
    pub min: f32,
    /// Highest value.
    pub max: f32,
    /// Default value.
    pub default: f32,
    /// Group for display.
    pub group: &'static str,
}

impl ParamDescriptor {
    /// Clamp `value` into range; non-finite values become the default.
    #[inline]
    pub fn sanitize(&self, value: f32) -> f32 {
        if value.is_finite() {
            value.clamp(self.min, self.max)
        } else {
            self.default
        }
    }
}

/// Every parameter, in table order.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum ParamId {
    Model,
    Waveform,
    Waveform2,
    Osc1Volume,
    Osc2Volume,
    PulseWidth,
    Osc2Semi,
    Osc2Fine,
    Cutoff,
    Resonance,
    LfoOn,
    LfoRate,
    LfoDepth,
    LfoShape,
    LfoSync,
    LfoSyncDiv,
    LfoPhase,
    LfoToPitch,
    LfoToCutoff,
    LfoToAmp,
    NoiseOn,
    NoiseMix,
    DriveOn,
    DriveAmt,
    Attack,
    Decay,
    Sustain,
    Release,
    DelayOn,
    DelayMix,
    DelayTime,
    DelayFb,
    DelaySync,
    DelaySyncDiv,
    ReverbOn,
    ReverbMix,
    ReverbType,
    ReverbSize,
    AnaFree,
    AnaDrift,
    AnaFiltTol,
    AnaVcaClip,
    HumOn,
    CrossOn,
    ConsoleOn,
    ConsoleModel,
    AnaEnv,
    AnaLegato,
    MasterGain,
    FilterOs,
}

/// Number of parameters.
pub const PARAM_COUNT: usize = 50;

const fn param(
    id: ParamId,
    string_id: &'static str,
    name: &'static str,
    unit: ParamUnit,
    range: (f32, f32),
    default: f32,
    group: &'static str,
) -> ParamDescriptor {
    ParamDescriptor {
        id,
        string_id,
        name,
        unit,
        min: range.0,
        max: range.1,
        default,
        group,
    }
}

const fn toggle(id: ParamId, string_id: &'static str, name: &'static str, group: &'static str) -> ParamDescriptor {
    param(id, string_id, name, ParamUnit::Toggle, (0.0, 1.0), 0.0, group)
}

const fn choice(
    id: ParamId,
    string_id: &'static str,
    name: &'static str,
    last: f32,
    default: f32,
    group: &'static str,
) -> ParamDescriptor {
    param(id, string_id, name, ParamUnit::Choice, (0.0, last), default, group)
}

use ParamId as P;
use ParamUnit as U;

/// The parameter table, indexed by `ParamId as usize`.
pub static PARAMS: [ParamDescriptor; PARAM_COUNT] = [
    choice(P::Model, "MODEL", "Model", 94.0, 0.0, "Voice"),
    choice(P::Waveform, "WAVEFORM", "Waveform 1", 4.0, 0.0, "Oscillator"),
    choice(P::Waveform2, "WAVEFORM2", "Waveform 2", 4.0, 0.0, "Oscillator"),
    param(P::Osc1Volume, "OSC1_VOLUME", "Osc 1 Vol", U::Linear, (0.0, 0.15), 0.10, "Oscillator"),
    param(P::Osc2Volume, "OSC2_VOLUME", "Osc 2 Vol", U::Linear, (0.0, 0.15), 0.10, "Oscillator"),
    param(P::PulseWidth, "PULSE_WIDTH", "Pulse Width", U::Linear, (0.05, 0.95), 0.5, "Oscillator"),
    param(P::Osc2Semi, "OSC2_SEMI", "Osc2 Semi", U::Semitones, (-24.0, 24.0), 0.0, "Oscillator"),
    param(P::Osc2Fine, "OSC2_FINE", "Osc2 Fine", U::Cents, (-100.0, 100.0), 0.0, "Oscillator"),
    param(P::Cutoff, "CUTOFF", "Cutoff", U::Hertz, (20.0, 20000.0), 20000.0, "Filter"),
    param(P::Resonance, "RESONANCE", "Resonance", U::Linear, (0.1, 0.95), 0.7, "Filter"),
    toggle(P::LfoOn, "LFO_ON", "LFO On", "LFO"),
    param(P::LfoRate, "LFO_RATE", "LFO Rate", U::Hertz, (0.1, 20.0), 5.0, "LFO"),
    param(P::LfoDepth, "LFO_DEPTH", "LFO Depth", U::Linear, (0.0, 1.0), 0.0, "LFO"),
    choice(P::LfoShape, "LFO_SHAPE", "LFO Shape", 3.0, 0.0, "LFO"),
    toggle(P::LfoSync, "LFO_SYNC", "LFO Sync", "LFO"),
    choice(P::LfoSyncDiv, "LFO_SYNC_DIV", "LFO Sync Div", 6.0, 2.0, "LFO"),
    param(P::LfoPhase, "LFO_PHASE", "LFO Phase", U::Linear, (0.0, 1.0), 0.0, "LFO"),
    toggle(P::LfoToPitch, "LFO_TO_PITCH", "LFO > Pitch", "LFO"),
    toggle(P::LfoToCutoff, "LFO_TO_CUTOFF", "LFO > Cutoff", "LFO"),
    toggle(P::LfoToAmp, "LFO_TO_AMP", "LFO > Amp", "LFO"),
    toggle(P::NoiseOn, "NOISE_ON", "Noise On", "Oscillator"),
    param(P::NoiseMix, "NOISE_MIX", "Noise Mix", U::Linear, (0.0, 1.0), 0.0, "Oscillator"),
    toggle(P::DriveOn, "DRIVE_ON", "Drive On", "Effects"),
    param(P::DriveAmt, "DRIVE_AMT", "Drive Amt", U::Linear, (0.0, 7.0), 3.0, "Effects"),
    param(P::Attack, "ATTACK", "Attack", U::Seconds, (0.001, 5.0), 0.01, "Envelope"),
    param(P::Decay, "DECAY", "Decay", U::Seconds, (0.001, 5.0), 0.1, "Envelope"),
    param(P::Sustain, "SUSTAIN", "Sustain", U::Linear, (0.0, 1.0), 0.8, "Envelope"),
    param(P::Release, "RELEASE", "Release", U::Seconds, (0.001, 10.0), 0.2, "Envelope"),
    toggle(P::DelayOn, "DELAY_ON", "Delay On", "Effects"),
    param(P::DelayMix, "DELAY_MIX", "Delay Mix", U::Linear, (0.0, 1.0), 0.3, "Effects"),
    param(P::DelayTime, "DELAY_TIME", "Delay Time", U::Milliseconds, (1.0, 2000.0), 500.0, "Effects"),
    param(P::DelayFb, "DELAY_FB", "Delay Feedback", U::Linear, (0.0, 0.95), 0.5, "Effects"),
    toggle(P::DelaySync, "DELAY_SYNC", "Delay Sync", "Effects"),
    choice(P::DelaySyncDiv, "DELAY_SYNC_DIV", "Delay Sync Div", 6.0, 2.0, "Effects"),
    toggle(P::ReverbOn, "REVERB_ON", "Reverb On", "Effects"),
    param(P::ReverbMix, "REVERB_MIX", "Reverb Mix", U::Linear, (0.0, 1.0), 0.3, "Effects"),
    choice(P::ReverbType, "REVERB_TYPE", "Reverb Type", 7.0, 0.0, "Effects"),
    param(P::ReverbSize, "REVERB_SIZE", "Reverb Size", U::Linear, (0.1, 2.0), 1.0, "Effects"),
    toggle(P::AnaFree, "ANA_FREE", "Free Phase", "Analog"),
    toggle(P::AnaDrift, "ANA_DRIFT", "VCO Drift", "Analog"),
    toggle(P::AnaFiltTol, "ANA_FILT_TOL", "Filter Tol", "Analog"),
    toggle(P::AnaVcaClip, "ANA_VCA_CLIP", "VCA Clip", "Analog"),
    toggle(P::HumOn, "HUM_ON", "Hum / Hiss", "Analog"),
    toggle(P::CrossOn, "CROSS_ON", "Stereo Bleed", "Analog"),
    toggle(P::ConsoleOn, "CONSOLE_ON", "Fat On", "Console"),
    choice(P::ConsoleModel, "CONSOLE_MODEL", "Fat Mode", 24.0, 0.0, "Console"),
    toggle(P::AnaEnv, "ANA_ENV", "Analog Env", "Analog"),
    toggle(P::AnaLegato, "ANA_LEGATO", "Legato", "Analog"),
    param(P::MasterGain, "MASTER_GAIN", "Master Gain", U::Linear, (0.0, 1.5), 1.0, "Master"),
    choice(P::FilterOs, "FILTER_OS", "Filter Oversampling", 4.0, 0.0, "Filter"),
];

impl ParamId {
    /// Table entry for this parameter.
    #[inline]
    pub fn descriptor(self) -> &'static ParamDescriptor {
        &PARAMS[self as usize]
    }

    /// Stable text id.
    pub fn string_id(self) -> &'static str {
        self.descriptor().string_id
    }

    /// Look a parameter up by its text id.
    pub fn from_name(name: &str) -> Option<Self> {
        PARAMS.iter().find(|d| d.string_id == name).map(|d| d.id)
    }

    /// Iterate every parameter in table order.
    pub fn iter() -> impl Iterator<Item = Self> {
        PARAMS.iter().map(|d| d.id)
    }

    /// Clamp `value` to this parameter's range.
    #[inline]
    pub fn sanitize(self, value: f32) -> f32 {
        self.descriptor().sanitize(value)
    }
}

/// Shared, lock-free parameter values.
///
/// Hold it in an `Arc`; writers call [`set`](Self::set) from any thread and
/// the render thread calls [`snapshot`](Self::snapshot) once per block.
#[derive(Debug)]
pub struct ParamStore {
    values: [AtomicU32; PARAM_COUNT],
}

impl Default for ParamStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ParamStore {
    /// Store holding every default.
    pub fn new() -> Self {
        Self {
            values: core::array::from_fn(|i| AtomicU32::new(PARAMS[i].default.to_bits())),
        }
    }

    /// Write a raw value. Sanitation happens on read.
    pub fn set(&self, id: ParamId, value: f32) {
        self.values[id as usize].store(value.to_bits(), Ordering::Relaxed);
    }

    /// Write by text id; returns `false` for an unknown name.
    pub fn set_by_name(&self, name: &str, value: f32) -> bool {
        match ParamId::from_name(name) {
            Some(id) => {
                self.set(id, value);
                true
            }
            None => false,
        }
    }

    /// Sanitized current value.
    pub fn get(&self, id: ParamId) -> f32 {
        id.sanitize(f32::from_bits(
            self.values[id as usize].load(Ordering::Relaxed),
        ))
    }

    /// Restore every default.
    pub fn reset_to_defaults(&self) {
        for (value, desc) in self.values.iter().zip(PARAMS.iter()) {
            value.store(desc.default.to_bits(), Ordering::Relaxed);
        }
    }

    /// Sanitized copy of every value.
    pub fn snapshot(&self) -> ParamSnapshot {
        ParamSnapshot {
            values: core::array::from_fn(|i| {
                PARAMS[i].sanitize(f32::from_bits(self.values[i].load(Ordering::Relaxed)))
            }),
        }
    }
}

/// Immutable parameter values for one block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSnapshot {
    values: [f32; PARAM_COUNT],
}

impl Default for ParamSnapshot {
    fn default() -> Self {
        Self {
            values: core::array::from_fn(|i| PARAMS[i].default),
        }
    }
}

impl ParamSnapshot {
    /// Value of `id`.
    #[inline]
    pub fn get(&self, id: ParamId) -> f32 {
        self.values[id as usize]
    }

    /// Toggle state of `id` (`> 0.5`).
    #[inline]
    pub fn flag(&self, id: ParamId) -> bool {
        self.get(id) > 0.5
    }

    /// Choice index of `id`, rounded to nearest.
    #[inline]
    pub fn index(&self, id: ParamId) -> i32 {
        libm::roundf(self.get(id)) as i32
    }

    /// Value by text id.
    pub fn by_name(&self, name: &str) -> Option<f32> {
        ParamId::from_name(name).map(|id| self.get(id))
    }

    /// Copy with `id` set to the sanitized `value`.
    #[must_use]
    pub fn with(mut self, id: ParamId, value: f32) -> Self {
        self.values[id as usize] = id.sanitize(value);
        self
    }
}
