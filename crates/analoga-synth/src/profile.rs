//! Per-model filter/drive voicings.
//!
//! Each of the 95 models fixes a pre-filter gain, a filter topology, the
//! ladder response and drive, and a post-filter waveshaper. The voice looks
//! the profile up only when the model index changes.
//!
//! Models 50 to 74 have names but no voicing of their own; they, and any
//! index past the table, use [`FALLBACK_PROFILE`]. Models 2 to 8 never pick a
//! ladder response and keep the prepare-time `Lpf24` at drive 1.2.

use analoga_core::{DEFAULT_LADDER_DRIVE, LadderMode, cubic_clip, rational_clip};
use libm::tanhf;

/// Number of selectable models.
pub const MODEL_COUNT: usize = 95;

/// Which filter a model runs through.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FilterPath {
    /// Ladder filter.
    #[default]
    Ladder,
    /// TPT state variable lowpass.
    Svf,
}

/// Post-filter waveshaper.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Shaper {
    /// `x`.
    Identity,
    /// `tanh(k·x)`.
    Tanh(f32),
    /// `linear·x + amount·tanh(drive·x)`.
    Blend {
        /// Weight of the clean signal.
        linear: f32,
        /// Weight of the tanh branch.
        amount: f32,
        /// Drive into the tanh branch.
        drive: f32,
    },
    /// `clamp(x − k·x³, −1, 1)`.
    Cubic(f32),
    /// `x / (1 + |x|)`.
    Rational,
    /// `x·tanh(x)`.
    EvenTanh,
}

impl Shaper {
    /// Shape one sample.
    #[inline]
    pub fn apply(self, x: f32) -> f32 {
        match self {
            Self::Identity => x,
            Self::Tanh(k) => tanhf(k * x),
            Self::Blend {
                linear,
                amount,
                drive,
            } => linear * x + amount * tanhf(drive * x),
            Self::Cubic(k) => cubic_clip(x, k),
            Self::Rational => rational_clip(x),
            Self::EvenTanh => x * tanhf(x),
        }
    }
}

/// Fixed voicing of one model.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ModelProfile {
    /// Linear gain before the filter.
    pub gain: f32,
    /// Filter topology.
    pub path: FilterPath,
    /// Ladder response.
    pub mode: LadderMode,
    /// Ladder input drive.
    pub drive: f32,
    /// Waveshaper after the filter.
    pub shaper: Shaper,
}

const fn ladder(mode: LadderMode, drive: f32, gain: f32, shaper: Shaper) -> ModelProfile {
    ModelProfile {
        gain,
        path: FilterPath::Ladder,
        mode,
        drive,
        shaper,
    }
}

const fn lp24(drive: f32, gain: f32, shaper: Shaper) -> ModelProfile {
    ladder(LadderMode::Lpf24, drive, gain, shaper)
}

/// Plain LPF24 voicing where the shaper's tanh drive equals the ladder drive.
const fn lp24_tanh(drive: f32) -> ModelProfile {
    lp24(drive, 1.0, Shaper::Tanh(drive))
}

const fn untouched_ladder(gain: f32, k: f32) -> ModelProfile {
    ladder(LadderMode::Lpf24, DEFAULT_LADDER_DRIVE, gain, Shaper::Tanh(k))
}

/// SVF voicing. The path ignores gain and shaper.
const SVF: ModelProfile = ModelProfile {
    gain: 1.0,
    path: FilterPath::Svf,
    mode: LadderMode::Lpf24,
    drive: DEFAULT_LADDER_DRIVE,
    shaper: Shaper::Identity,
};

const fn blend(linear: f32, amount: f32, drive: f32) -> Shaper {
    Shaper::Blend {
        linear,
        amount,
        drive,
    }
}

/// Voicing for unvoiced and out-of-range models.
pub const FALLBACK_PROFILE: ModelProfile = lp24(1.25, 1.0, Shaper::Tanh(1.25));

const IDENTITY_1: ModelProfile = lp24(1.0, 1.0, Shaper::Identity);

/// Voicings for models 0 to 49.
static CLASSIC_PROFILES: [ModelProfile; 50] = [
    lp24(1.4, 0.9, Shaper::Tanh(1.6)), // Minimoog
    lp24(1.1, 0.9, Shaper::Tanh(1.3)), // Prodigy
    SVF,                               // ARP 2600
    SVF,                               // Odyssey
    untouched_ladder(1.0, 1.25),       // CS-80
    untouched_ladder(1.0, 1.30),       // Jupiter-4
    SVF,                               // MS-20
    untouched_ladder(1.0, 1.10),       // Polymoog
    untouched_ladder(1.0, 1.40),       // OB-X
    lp24(1.30, 1.0, Shaper::Tanh(1.25)),
    lp24(1.60, 1.1, Shaper::Tanh(1.55)),
    lp24(1.40, 0.95, Shaper::Tanh(1.45)),
    lp24_tanh(1.20),
    lp24_tanh(1.15),
    lp24_tanh(1.30),
    lp24(1.35, 0.95, Shaper::Tanh(1.40)),
    lp24_tanh(1.25),
    lp24_tanh(1.30),
    lp24_tanh(1.25),
    lp24_tanh(1.20),
    lp24_tanh(1.15), // PPG Wave
    lp24_tanh(1.25),
    IDENTITY_1, // DX7
    lp24(1.30, 1.0, Shaper::Tanh(1.35)),
    lp24(1.10, 1.0, Shaper::Identity), // D-50
    lp24_tanh(1.35),
    lp24_tanh(1.20),
    lp24_tanh(1.45),
    lp24_tanh(1.05),
    lp24_tanh(1.10),
    lp24_tanh(1.15), // Prophet VS
    lp24_tanh(1.25),
    lp24_tanh(1.10),
    IDENTITY_1, // CZ-101
    lp24_tanh(1.10),
    lp24_tanh(1.20),
    IDENTITY_1, // Massive
    lp24_tanh(1.15),
    lp24_tanh(1.30),
    lp24_tanh(1.10),
    lp24(1.40, 1.05, Shaper::Tanh(1.40)), // TB-303
    lp24_tanh(1.25),
    IDENTITY_1, // M1
    lp24(1.05, 1.0, Shaper::Identity),
    lp24_tanh(1.15),
    lp24_tanh(1.10),
    lp24_tanh(1.30),
    lp24(1.35, 1.05, Shaper::Tanh(1.35)),
    IDENTITY_1, // Kronos
    lp24_tanh(1.25),
];

/// Voicings for models 75 to 94.
static EXTENDED_PROFILES: [ModelProfile; 20] = [
    ladder(LadderMode::Lpf12, 1.15, 1.0, blend(0.6, 0.4, 1.8)), // Nebula
    lp24(1.35, 0.95, Shaper::Tanh(1.35)),
    ladder(LadderMode::Bpf24, 1.25, 1.05, Shaper::Rational),
    ladder(LadderMode::Hpf24, 1.20, 1.0, blend(0.3, 0.7, 1.1)),
    ladder(LadderMode::Lpf12, 1.15, 1.10, Shaper::Cubic(0.2)),
    ladder(LadderMode::Bpf12, 1.18, 1.05, Shaper::Tanh(1.20)), // Polaris
    lp24(1.40, 0.90, Shaper::Tanh(1.45)),
    ladder(LadderMode::Hpf12, 1.25, 1.05, Shaper::Cubic(0.25)),
    ladder(LadderMode::Bpf24, 1.30, 1.0, blend(0.5, 0.5, 1.8)),
    lp24(1.50, 1.10, Shaper::Cubic(0.15)),
    lp24(1.30, 1.0, Shaper::Tanh(1.35)), // Fusion-84
    ladder(LadderMode::Lpf12, 1.10, 1.05, blend(0.6, 0.4, 2.0)),
    ladder(LadderMode::Bpf12, 1.25, 1.0, Shaper::Rational),
    lp24(1.45, 0.90, Shaper::Cubic(0.2)),
    ladder(LadderMode::Bpf24, 1.30, 1.0, blend(0.5, 0.5, 1.7)),
    ladder(LadderMode::Lpf12, 1.20, 1.05, Shaper::Tanh(1.15)), // StringEvo
    lp24(1.35, 1.0, Shaper::EvenTanh),
    lp24(1.30, 1.0, blend(0.6, 0.4, 1.2)),
    ladder(LadderMode::Hpf12, 1.25, 1.05, Shaper::Cubic(0.25)),
    lp24(1.10, 1.10, Shaper::Tanh(1.05)), // GlowPad
];

/// Display names, in parameter order.
pub static MODEL_NAMES: [&str; MODEL_COUNT] = [
    "Minimoog", "Prodigy", "ARP 2600", "Odyssey", "CS-80", "Jupiter-4", "MS-20", "Polymoog",
    "OB-X", "Prophet-5", "Taurus", "Model D", "SH-101", "Juno-60", "MonoPoly", "Voyager",
    "Prophet-6", "Jupiter-8", "Polysix", "Matrix-12", "PPG Wave", "OB-6", "DX7", "Virus", "D-50",
    "Memorymoog", "Minilogue", "Sub 37", "Nord Lead 2", "Blofeld", "Prophet VS", "Prophet-10",
    "JX-8P", "CZ-101", "ESQ-1", "System-8", "Massive", "MicroFreak", "Analog Four", "MicroKorg",
    "TB-303", "JP-8000", "M1", "Wavestation", "JD-800", "Hydrasynth", "PolyBrute", "Matriarch",
    "Kronos", "Prophet-12", "OB-Xa", "OB-X8", "Juno-106", "JX-3P", "Jupiter-6", "Alpha Juno",
    "Grandmother", "Subsequent 25", "Moog One", "ARP Omni", "CS-30", "AN1x", "Prologue",
    "DW-8000", "MS2000", "Delta", "Rev2", "Prophet X", "Microwave", "Q", "Lead 4", "SQ-80",
    "CZ-5000", "System-100", "Poly Evolver", "Nebula", "Solstice", "Aurora", "Lumina", "Cascade",
    "Polaris", "Eclipse", "Quasar", "Helios", "Meteor", "Fusion-84", "Velvet-CS", "PolyProphet",
    "BassMatrix", "WaveVoyager", "StringEvo", "MicroMass", "DigitalMoog", "HybridLead", "GlowPad",
];

/// Voicing for a model index.
///
/// ```rust
/// use analoga_synth::{FALLBACK_PROFILE, FilterPath, model_profile};
///
/// assert_eq!(model_profile(3).path, FilterPath::Svf);
/// assert_eq!(model_profile(60), FALLBACK_PROFILE);
/// assert_eq!(model_profile(-1), FALLBACK_PROFILE);
/// ```
pub fn model_profile(model: i32) -> ModelProfile {
    match model {
        0..=49 => CLASSIC_PROFILES[model as usize],
        75..=94 => EXTENDED_PROFILES[(model - 75) as usize],
        _ => FALLBACK_PROFILE,
    }
}

/// Display name for a model index.
pub fn model_name(model: i32) -> Option<&'static str> {
    usize::try_from(model)
        .ok()
        .and_then(|i| MODEL_NAMES.get(i))
        .copied()
}
