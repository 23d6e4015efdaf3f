//! Console / "fatness" channel-strip emulation.
//!
//! Six stages per channel, each individually bypassable:
//!
//! ```text
//! pre-gain → tone EQ 1 → tone EQ 2 → compressor → saturator → post-gain
//! ```
//!
//! Twenty-five [`ConsoleMode`]s, stored in [`CONSOLE_MODES`], fix every
//! stage. [`ConsoleChain::set_mode`] rebuilds the chain only when the index
//! differs from the previous call; rebuilding on every block would restart
//! the filters and the compressor envelope.
//!
//! Selecting a mode always enables tone EQ 1 and bypasses tone EQ 2 and the
//! compressor before the mode's own stages are applied. A compressor setting
//! without attack or release keeps whatever times the previous mode left. An
//! index outside the table bypasses every stage.

use analoga_core::{
    BUTTERWORTH_Q, Biquad, BiquadCoefficients, Effect, high_shelf_coefficients,
    highpass_coefficients, low_shelf_coefficients, lowpass_coefficients, peak_coefficients,
};
use libm::tanhf;

use crate::Compressor;

/// Number of console modes.
pub const CONSOLE_MODE_COUNT: usize = 25;

/// Cutoff of the flat tone stages before any mode is selected.
const FLAT_LOWPASS_HZ: f32 = 24000.0;

/// Compressor times until a mode sets its own.
const DEFAULT_COMP_ATTACK_MS: f32 = 1.0;
const DEFAULT_COMP_RELEASE_MS: f32 = 100.0;

/// One tone EQ stage. Shelf and peak gains are linear factors.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ToneEq {
    /// Low shelf.
    LowShelf {
        /// Corner frequency in Hz.
        freq: f32,
        /// Shelf Q.
        q: f32,
        /// Linear gain.
        gain: f32,
    },
    /// High shelf.
    HighShelf {
        /// Corner frequency in Hz.
        freq: f32,
        /// Shelf Q.
        q: f32,
        /// Linear gain.
        gain: f32,
    },
    /// Peaking bell.
    Peak {
        /// Centre frequency in Hz.
        freq: f32,
        /// Bandwidth Q.
        q: f32,
        /// Linear gain.
        gain: f32,
    },
    /// Butterworth lowpass.
    LowPass {
        /// Cutoff in Hz.
        freq: f32,
    },
    /// Butterworth highpass.
    HighPass {
        /// Cutoff in Hz.
        freq: f32,
    },
}

impl ToneEq {
    /// Biquad coefficients at `sample_rate`. Frequencies are kept below
    /// `0.49·fs`.
    pub fn coefficients(self, sample_rate: f32) -> BiquadCoefficients {
        let nyquist_guard = |f: f32| f.clamp(10.0, sample_rate * 0.49);
        match self {
            Self::LowShelf { freq, q, gain } => {
                low_shelf_coefficients(nyquist_guard(freq), q, gain, sample_rate)
            }
            Self::HighShelf { freq, q, gain } => {
                high_shelf_coefficients(nyquist_guard(freq), q, gain, sample_rate)
            }
            Self::Peak { freq, q, gain } => {
                peak_coefficients(nyquist_guard(freq), q, gain, sample_rate)
            }
            Self::LowPass { freq } => {
                lowpass_coefficients(nyquist_guard(freq), BUTTERWORTH_Q, sample_rate)
            }
            Self::HighPass { freq } => {
                highpass_coefficients(nyquist_guard(freq), BUTTERWORTH_Q, sample_rate)
            }
        }
    }
}

/// Compressor stage of a mode.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CompressorSettings {
    /// Threshold in dB.
    pub threshold_db: f32,
    /// Ratio.
    pub ratio: f32,
    /// Attack in ms; `None` keeps the current attack.
    pub attack_ms: Option<f32>,
    /// Release in ms; `None` keeps the current release.
    pub release_ms: Option<f32>,
}

const fn comp(threshold_db: f32, ratio: f32, attack_ms: f32, release_ms: f32) -> CompressorSettings {
    CompressorSettings {
        threshold_db,
        ratio,
        attack_ms: Some(attack_ms),
        release_ms: Some(release_ms),
    }
}

/// Saturator curve of a mode.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Saturation {
    /// `x`.
    Identity,
    /// `linear·x + amount·tanh(drive·x)`.
    Blend {
        /// Weight of the clean signal.
        linear: f32,
        /// Weight of the tanh branch.
        amount: f32,
        /// Drive into the tanh branch.
        drive: f32,
    },
    /// `a·tanh(drive_a·x) + b·tanh(drive_b·x)`.
    DualTanh {
        /// Weight of the first branch.
        a: f32,
        /// Drive of the first branch.
        drive_a: f32,
        /// Weight of the second branch.
        b: f32,
        /// Drive of the second branch.
        drive_b: f32,
    },
    /// `linear·x + cubic·clamp(x³, −1, 1)`.
    CubicBlend {
        /// Weight of the clean signal.
        linear: f32,
        /// Weight of the cubic branch.
        cubic: f32,
    },
    /// `y = tanh(3.5x)`, then `0.6·y + 0.4·tanh(1.2·y)`.
    TubeCascade,
    /// `tanh(2x)·(1 − 0.1·x²)`.
    Triode,
}

impl Saturation {
    /// Shape one sample.
    #[inline]
    pub fn apply(self, x: f32) -> f32 {
        match self {
            Self::Identity => x,
            Self::Blend {
                linear,
                amount,
                drive,
            } => linear * x + amount * tanhf(drive * x),
            Self::DualTanh {
                a,
                drive_a,
                b,
                drive_b,
            } => a * tanhf(drive_a * x) + b * tanhf(drive_b * x),
            Self::CubicBlend { linear, cubic } => {
                linear * x + cubic * (x * x * x).clamp(-1.0, 1.0)
            }
            Self::TubeCascade => {
                let y = tanhf(3.5 * x);
                0.6 * y + 0.4 * tanhf(1.2 * y)
            }
            Self::Triode => tanhf(2.0 * x) * (1.0 - 0.1 * x * x),
        }
    }
}

const fn blend(linear: f32, amount: f32, drive: f32) -> Saturation {
    Saturation::Blend {
        linear,
        amount,
        drive,
    }
}

const fn dual(a: f32, drive_a: f32, b: f32, drive_b: f32) -> Saturation {
    Saturation::DualTanh {
        a,
        drive_a,
        b,
        drive_b,
    }
}

const fn low_shelf(freq: f32, q: f32, gain: f32) -> ToneEq {
    ToneEq::LowShelf { freq, q, gain }
}

const fn high_shelf(freq: f32, q: f32, gain: f32) -> ToneEq {
    ToneEq::HighShelf { freq, q, gain }
}

/// Fixed configuration of one console flavour.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConsoleMode {
    /// Display name.
    pub name: &'static str,
    /// Linear input gain.
    pub pre_gain: f32,
    /// First tone stage, always active.
    pub tone1: ToneEq,
    /// Second tone stage, bypassed when `None`.
    pub tone2: Option<ToneEq>,
    /// Compressor, bypassed when `None`.
    pub compressor: Option<CompressorSettings>,
    /// Saturator curve.
    pub saturation: Saturation,
    /// Linear output gain.
    pub post_gain: f32,
}

/// All console modes in parameter order.
pub const CONSOLE_MODES: [ConsoleMode; CONSOLE_MODE_COUNT] = [
    ConsoleMode {
        name: "Tape Thick",
        pre_gain: 1.20,
        tone1: low_shelf(200.0, 0.7, 1.5),
        tone2: None,
        compressor: None,
        saturation: blend(0.6, 0.4, 1.8),
        post_gain: 0.83,
    },
    ConsoleMode {
        name: "Warm Tube",
        pre_gain: 1.30,
        tone1: ToneEq::LowPass { freq: 14000.0 },
        tone2: None,
        compressor: None,
        saturation: blend(0.4, 0.6, 2.5),
        post_gain: 0.80,
    },
    ConsoleMode {
        name: "Deep Console",
        pre_gain: 1.25,
        tone1: high_shelf(6000.0, 0.8, 0.9),
        tone2: None,
        compressor: Some(CompressorSettings {
            threshold_db: -12.0,
            ratio: 2.0,
            attack_ms: None,
            release_ms: None,
        }),
        saturation: blend(0.45, 0.55, 2.0),
        post_gain: 0.90,
    },
    ConsoleMode {
        name: "Punch Glue",
        pre_gain: 1.10,
        tone1: high_shelf(5000.0, 0.8, 1.25),
        tone2: None,
        compressor: Some(comp(-18.0, 4.0, 5.0, 60.0)),
        saturation: blend(0.5, 0.5, 2.2),
        post_gain: 1.0,
    },
    ConsoleMode {
        name: "Sub Boom",
        pre_gain: 1.15,
        tone1: low_shelf(80.0, 0.7, 1.8),
        tone2: None,
        compressor: None,
        saturation: Saturation::CubicBlend {
            linear: 0.7,
            cubic: 0.3,
        },
        post_gain: 0.80,
    },
    ConsoleMode {
        name: "Opto Smooth",
        pre_gain: 1.12,
        tone1: high_shelf(7000.0, 0.7, 1.10),
        tone2: None,
        compressor: Some(comp(-16.0, 3.0, 10.0, 150.0)),
        saturation: blend(0.5, 0.5, 2.0),
        post_gain: 0.92,
    },
    ConsoleMode {
        name: "Tube Crunch",
        pre_gain: 1.40,
        tone1: high_shelf(1200.0, 0.7, 0.8),
        tone2: None,
        compressor: None,
        saturation: Saturation::TubeCascade,
        post_gain: 0.78,
    },
    ConsoleMode {
        name: "X-Former Fat",
        pre_gain: 1.25,
        tone1: low_shelf(110.0, 0.7, 1.7),
        tone2: None,
        compressor: None,
        saturation: dual(0.55, 2.8, 0.45, 0.9),
        post_gain: 0.85,
    },
    ConsoleMode {
        name: "Bus Glue",
        pre_gain: 1.10,
        tone1: high_shelf(9000.0, 0.8, 0.95),
        tone2: None,
        compressor: Some(comp(-10.0, 1.8, 2.0, 80.0)),
        saturation: blend(0.6, 0.4, 1.6),
        post_gain: 0.95,
    },
    ConsoleMode {
        name: "Vintage Tape",
        pre_gain: 1.30,
        tone1: ToneEq::LowPass { freq: 15000.0 },
        tone2: None,
        compressor: Some(comp(-15.0, 2.5, 5.0, 60.0)),
        saturation: blend(0.3, 0.7, 2.2),
        post_gain: 0.85,
    },
    ConsoleMode {
        name: "Neve 1073",
        pre_gain: 1.25,
        tone1: low_shelf(80.0, 0.7, 1.6),
        tone2: Some(high_shelf(12000.0, 0.8, 1.15)),
        compressor: None,
        saturation: blend(0.55, 0.45, 2.8),
        post_gain: 0.88,
    },
    ConsoleMode {
        name: "API 312/550A",
        pre_gain: 1.20,
        tone1: low_shelf(50.0, 0.7, 1.5),
        tone2: Some(ToneEq::Peak {
            freq: 3500.0,
            q: 1.0,
            gain: 1.25,
        }),
        compressor: Some(comp(-14.0, 3.0, 1.0, 50.0)),
        saturation: blend(0.5, 0.5, 3.2),
        post_gain: 0.90,
    },
    ConsoleMode {
        name: "Helios 69",
        pre_gain: 1.15,
        tone1: high_shelf(10000.0, 0.7, 1.25),
        tone2: Some(ToneEq::Peak {
            freq: 700.0,
            q: 1.4,
            gain: 0.8,
        }),
        compressor: None,
        saturation: Saturation::Triode,
        post_gain: 0.85,
    },
    ConsoleMode {
        name: "Studer A80",
        pre_gain: 1.30,
        tone1: low_shelf(45.0, 0.7, 1.8),
        tone2: Some(ToneEq::LowPass { freq: 15000.0 }),
        compressor: Some(comp(-17.0, 2.2, 5.0, 60.0)),
        saturation: dual(0.6, 2.4, 0.4, 0.9),
        post_gain: 0.82,
    },
    ConsoleMode {
        name: "EMI TG12345",
        pre_gain: 1.18,
        tone1: ToneEq::HighPass { freq: 30.0 },
        tone2: Some(high_shelf(5000.0, 0.8, 1.2)),
        compressor: Some(comp(-12.0, 2.0, 5.0, 100.0)),
        saturation: blend(0.5, 0.5, 1.8),
        post_gain: 0.90,
    },
    ConsoleMode {
        name: "SSL 4K-Bus",
        pre_gain: 1.08,
        tone1: ToneEq::LowPass { freq: 18500.0 },
        tone2: None,
        compressor: Some(comp(-12.0, 2.0, 3.0, 100.0)),
        saturation: blend(0.4, 0.6, 1.8),
        post_gain: 0.93,
    },
    ConsoleMode {
        name: "LA-2A",
        pre_gain: 1.20,
        tone1: ToneEq::LowPass { freq: 22000.0 },
        tone2: None,
        compressor: Some(comp(-14.0, 3.5, 10.0, 200.0)),
        saturation: blend(0.5, 0.5, 2.3),
        post_gain: 0.88,
    },
    ConsoleMode {
        name: "Fairchild 670",
        pre_gain: 1.25,
        tone1: ToneEq::LowPass { freq: 16000.0 },
        tone2: None,
        compressor: Some(comp(-10.0, 6.0, 0.8, 300.0)),
        saturation: blend(0.45, 0.55, 3.0),
        post_gain: 0.83,
    },
    ConsoleMode {
        name: "Pultec EQP-1A",
        pre_gain: 1.15,
        tone1: low_shelf(30.0, 0.7, 1.8),
        tone2: Some(high_shelf(5000.0, 0.8, 1.2)),
        compressor: None,
        saturation: blend(0.65, 0.35, 1.6),
        post_gain: 0.85,
    },
    ConsoleMode {
        name: "Quad-Eight",
        pre_gain: 1.22,
        tone1: low_shelf(100.0, 0.9, 1.6),
        tone2: None,
        compressor: None,
        saturation: blend(0.45, 0.55, 2.4),
        post_gain: 0.87,
    },
    ConsoleMode {
        name: "Harrison 32",
        pre_gain: 1.10,
        tone1: high_shelf(8000.0, 0.8, 1.15),
        tone2: None,
        compressor: Some(comp(-11.0, 1.7, 2.0, 90.0)),
        saturation: blend(0.5, 0.5, 1.7),
        post_gain: 0.95,
    },
    ConsoleMode {
        name: "MCI JH-636",
        pre_gain: 1.18,
        tone1: low_shelf(60.0, 0.7, 1.4),
        tone2: None,
        compressor: Some(comp(-15.0, 4.0, 1.5, 70.0)),
        saturation: blend(0.45, 0.55, 2.2),
        post_gain: 0.88,
    },
    ConsoleMode {
        name: "API 2500",
        pre_gain: 1.25,
        tone1: low_shelf(90.0, 0.8, 1.5),
        tone2: None,
        compressor: Some(comp(-12.0, 3.0, 0.8, 60.0)),
        saturation: blend(0.4, 0.6, 2.6),
        post_gain: 0.86,
    },
    ConsoleMode {
        name: "Ampex 440",
        pre_gain: 1.28,
        tone1: low_shelf(50.0, 0.7, 1.7),
        tone2: Some(high_shelf(14000.0, 0.8, 0.9)),
        compressor: Some(comp(-16.0, 2.0, 5.0, 60.0)),
        saturation: blend(0.3, 0.7, 2.1),
        post_gain: 0.84,
    },
    ConsoleMode {
        name: "Moog Ladder Out",
        pre_gain: 1.30,
        tone1: ToneEq::LowPass { freq: 17000.0 },
        tone2: None,
        compressor: None,
        saturation: blend(0.0, 1.0, 3.0),
        post_gain: 0.80,
    },
];

/// Mode for a parameter index, or `None` outside the table.
pub fn console_mode(index: i32) -> Option<&'static ConsoleMode> {
    usize::try_from(index).ok().and_then(|i| CONSOLE_MODES.get(i))
}

/// Which stages currently run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StageBypass {
    /// Pre-gain bypassed.
    pub pre_gain: bool,
    /// Tone EQ 1 bypassed.
    pub tone1: bool,
    /// Tone EQ 2 bypassed.
    pub tone2: bool,
    /// Compressor bypassed.
    pub compressor: bool,
    /// Saturator bypassed.
    pub saturation: bool,
    /// Post-gain bypassed.
    pub post_gain: bool,
}

impl StageBypass {
    const NONE: Self = Self {
        pre_gain: false,
        tone1: false,
        tone2: false,
        compressor: false,
        saturation: false,
        post_gain: false,
    };

    const ALL: Self = Self {
        pre_gain: true,
        tone1: true,
        tone2: true,
        compressor: true,
        saturation: true,
        post_gain: true,
    };
}

/// Stereo console chain.
///
/// # Example
///
/// ```rust
/// use analoga_core::Effect;
/// use analoga_effects::ConsoleChain;
///
/// let mut console = ConsoleChain::new(48000.0);
/// assert!(console.set_mode(15));
/// assert!(!console.set_mode(15));
/// assert_eq!(console.mode_name(), Some("SSL 4K-Bus"));
///
/// let (l, r) = console.process_stereo(0.2, 0.2);
/// assert!(l.is_finite() && r.is_finite());
/// ```
#[derive(Debug, Clone)]
pub struct ConsoleChain {
    tone1: [Biquad; 2],
    tone2: [Biquad; 2],
    compressors: [Compressor; 2],
    tone1_eq: ToneEq,
    tone2_eq: ToneEq,
    pre_gain: f32,
    post_gain: f32,
    saturation: Saturation,
    bypass: StageBypass,
    mode: Option<i32>,
    sample_rate: f32,
}

impl ConsoleChain {
    /// Unconfigured chain: unity gains, flat tone stages, identity saturator,
    /// compressor at 4:1 / 1 ms / 100 ms.
    pub fn new(sample_rate: f32) -> Self {
        let flat = ToneEq::LowPass {
            freq: FLAT_LOWPASS_HZ,
        };
        let mut chain = Self {
            tone1: [Biquad::new(), Biquad::new()],
            tone2: [Biquad::new(), Biquad::new()],
            compressors: [Compressor::new(sample_rate), Compressor::new(sample_rate)],
            tone1_eq: flat,
            tone2_eq: flat,
            pre_gain: 1.0,
            post_gain: 1.0,
            saturation: Saturation::Identity,
            bypass: StageBypass::NONE,
            mode: None,
            sample_rate,
        };
        for comp in &mut chain.compressors {
            comp.set_attack_ms(DEFAULT_COMP_ATTACK_MS);
            comp.set_release_ms(DEFAULT_COMP_RELEASE_MS);
        }
        chain.load_tone_coefficients();
        chain
    }

    /// Select a mode by parameter index. The chain is rebuilt only when the
    /// index differs from the previous call; returns whether it was.
    pub fn set_mode(&mut self, index: i32) -> bool {
        if self.mode == Some(index) {
            return false;
        }
        self.mode = Some(index);

        let Some(mode) = console_mode(index) else {
            #[cfg(feature = "tracing")]
            tracing::debug!(index, "unknown console mode, bypassing chain");
            self.bypass = StageBypass::ALL;
            return true;
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(index, name = mode.name, "console mode change");

        self.bypass = StageBypass {
            tone2: true,
            compressor: true,
            ..StageBypass::NONE
        };

        self.pre_gain = mode.pre_gain;
        self.post_gain = mode.post_gain;
        self.saturation = mode.saturation;
        self.tone1_eq = mode.tone1;

        if let Some(eq) = mode.tone2 {
            self.tone2_eq = eq;
            self.bypass.tone2 = false;
        }

        if let Some(settings) = mode.compressor {
            for comp in &mut self.compressors {
                comp.set_threshold_db(settings.threshold_db);
                comp.set_ratio(settings.ratio);
                if let Some(ms) = settings.attack_ms {
                    comp.set_attack_ms(ms);
                }
                if let Some(ms) = settings.release_ms {
                    comp.set_release_ms(ms);
                }
            }
            self.bypass.compressor = false;
        }

        self.load_tone_coefficients();
        true
    }

    /// Index of the last [`set_mode`](Self::set_mode) call.
    pub fn mode(&self) -> Option<i32> {
        self.mode
    }

    /// Name of the active mode, if it is a known one.
    pub fn mode_name(&self) -> Option<&'static str> {
        self.mode.and_then(console_mode).map(|m| m.name)
    }

    /// Current stage bypass flags.
    pub fn bypass(&self) -> StageBypass {
        self.bypass
    }

    /// Deepest gain reduction of the two compressors, in dB.
    pub fn gain_reduction_db(&self) -> f32 {
        if self.bypass.compressor {
            0.0
        } else {
            self.compressors[0]
                .gain_reduction_db()
                .min(self.compressors[1].gain_reduction_db())
        }
    }

    fn load_tone_coefficients(&mut self) {
        let c1 = self.tone1_eq.coefficients(self.sample_rate);
        let c2 = self.tone2_eq.coefficients(self.sample_rate);
        for bq in &mut self.tone1 {
            bq.set(c1);
        }
        for bq in &mut self.tone2 {
            bq.set(c2);
        }
    }

    #[inline]
    fn process_channel(&mut self, ch: usize, input: f32) -> f32 {
        let b = self.bypass;
        let mut x = input;
        if !b.pre_gain {
            x *= self.pre_gain;
        }
        if !b.tone1 {
            x = self.tone1[ch].process(x);
        }
        if !b.tone2 {
            x = self.tone2[ch].process(x);
        }
        if !b.compressor {
            x = self.compressors[ch].process(x);
        }
        if !b.saturation {
            x = self.saturation.apply(x);
        }
        if !b.post_gain {
            x *= self.post_gain;
        }
        x
    }
}

impl Effect for ConsoleChain {
    fn process(&mut self, input: f32) -> f32 {
        self.process_channel(0, input)
    }

    #[inline]
    fn process_stereo(&mut self, left: f32, right: f32) -> (f32, f32) {
        (self.process_channel(0, left), self.process_channel(1, right))
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        for comp in &mut self.compressors {
            comp.set_sample_rate(sample_rate);
        }
        self.load_tone_coefficients();
    }

    fn reset(&mut self) {
        for bq in self.tone1.iter_mut().chain(self.tone2.iter_mut()) {
            bq.clear();
        }
        for comp in &mut self.compressors {
            comp.reset();
        }
    }
}
