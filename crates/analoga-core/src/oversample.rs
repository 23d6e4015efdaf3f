//! Runtime-selectable oversampling for nonlinear stages.
//!
//! Saturating filters and clippers generate harmonics above Nyquist that fold
//! back into the audible band. Running them at 2× or 4× the host rate keeps
//! those harmonics representable until the downsampling filter removes them:
//!
//! ```text
//! x ─▶ upsample (×N) ─▶ nonlinear stage at N·fs ─▶ lowpass + decimate ─▶ y
//! ```
//!
//! Two half-band designs are available, both built as cascadable 2× stages
//! (4× is two 2× stages in series):
//!
//! | Mode | Filter | Phase | Cost |
//! |------|--------|-------|------|
//! | [`OversamplingMode::Iir2x`] / [`Iir4x`](OversamplingMode::Iir4x) | polyphase allpass pair, order 8 | minimum-ish | low |
//! | [`OversamplingMode::Fir2x`] / [`Fir4x`](OversamplingMode::Fir4x) | 16-tap windowed-sinc half-band | linear | higher |
//!
//! The mode can be changed at runtime without reallocating: every stage holds
//! fixed-size state for the largest design.
//!
//! ```rust
//! use analoga_core::{Oversampler, OversamplingMode};
//!
//! let mut os = Oversampler::new(OversamplingMode::Iir2x);
//! let y = os.process_with(0.5, |s| s.clamp(-0.3, 0.3));
//! assert!(y.is_finite());
//! ```

use crate::{Effect, flush_denormal};

/// Largest supported factor.
pub const MAX_OVERSAMPLE_FACTOR: usize = 4;

const FIR_TAPS: usize = 16;

/// Windowed-sinc (Kaiser, β ≈ 5.6) half-band lowpass at 0.5 × Nyquist.
/// Every other tap is zero apart from the centre.
#[rustfmt::skip]
static FIR_HALFBAND: [f32; FIR_TAPS] = [
    -0.00152541,  0.00000000,  0.01309369,  0.00000000,
    -0.05738920,  0.00000000,  0.29581875,  0.50000434,
     0.29581875,  0.00000000, -0.05738920,  0.00000000,
     0.01309369,  0.00000000, -0.00152541,  0.00000000,
];

/// Allpass coefficients of the even path of the order-8 polyphase half-band
/// (transition band 0.1, ~70 dB rejection).
static IIR_PATH_A: [f32; 4] = [
    0.077_115_08,
    0.482_070_63,
    0.796_820_47,
    0.941_251_43,
];

/// Allpass coefficients of the odd path.
static IIR_PATH_B: [f32; 4] = [
    0.265_968_53,
    0.665_104_15,
    0.884_101_5,
    0.982_005_4,
];

/// Oversampling factor and filter design.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OversamplingMode {
    /// Run at the host rate.
    #[default]
    Off,
    /// 2× with the polyphase IIR half-band.
    Iir2x,
    /// 4× with two cascaded IIR stages.
    Iir4x,
    /// 2× with the linear-phase FIR half-band.
    Fir2x,
    /// 4× with two cascaded FIR stages.
    Fir4x,
}

impl OversamplingMode {
    /// All modes in parameter order.
    pub const ALL: [Self; 5] = [Self::Off, Self::Iir2x, Self::Iir4x, Self::Fir2x, Self::Fir4x];

    /// Mode for a parameter index; out-of-range indices clamp.
    pub fn from_index(index: i32) -> Self {
        Self::ALL[index.clamp(0, 4) as usize]
    }

    /// Parameter index of this mode.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Rate multiplier.
    pub fn factor(self) -> usize {
        match self {
            Self::Off => 1,
            Self::Iir2x | Self::Fir2x => 2,
            Self::Iir4x | Self::Fir4x => 4,
        }
    }

    /// Number of cascaded 2× stages.
    fn stages(self) -> usize {
        match self.factor() {
            1 => 0,
            2 => 1,
            _ => 2,
        }
    }

    fn is_fir(self) -> bool {
        matches!(self, Self::Fir2x | Self::Fir4x)
    }

    /// Display name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Iir2x => "2x IIR",
            Self::Iir4x => "4x IIR",
            Self::Fir2x => "2x FIR",
            Self::Fir4x => "4x FIR",
        }
    }
}

/// Cascade of first-order allpasses at the low rate.
///
/// Each section is `A(z) = (a + z⁻¹) / (1 + a·z⁻¹)`, which becomes the
/// `z⁻²` allpass of the polyphase structure at the high rate.
#[derive(Debug, Clone, Default)]
struct AllpassPath {
    state: [f32; 4],
}

impl AllpassPath {
    #[inline]
    fn process(&mut self, mut x: f32, coeffs: &[f32; 4]) -> f32 {
        for (s, &a) in self.state.iter_mut().zip(coeffs) {
            let y = a * x + *s;
            *s = flush_denormal(x - a * y);
            x = y;
        }
        x
    }
}

/// Polyphase IIR half-band: `H(z) = ½·(A(z²) + z⁻¹·B(z²))`.
#[derive(Debug, Clone, Default)]
struct IirStage {
    up_a: AllpassPath,
    up_b: AllpassPath,
    down_a: AllpassPath,
    down_b: AllpassPath,
}

impl IirStage {
    #[inline]
    fn upsample(&mut self, x: f32) -> [f32; 2] {
        [
            self.up_a.process(x, &IIR_PATH_A),
            self.up_b.process(x, &IIR_PATH_B),
        ]
    }

    #[inline]
    fn downsample(&mut self, pair: [f32; 2]) -> f32 {
        let a = self.down_a.process(pair[1], &IIR_PATH_A);
        let b = self.down_b.process(pair[0], &IIR_PATH_B);
        0.5 * (a + b)
    }
}

/// Zero-stuffing interpolator and decimator sharing one FIR kernel.
#[derive(Debug, Clone, Default)]
struct FirStage {
    up: [f32; FIR_TAPS],
    down: [f32; FIR_TAPS],
}

impl FirStage {
    #[inline]
    fn push(line: &mut [f32; FIR_TAPS], x: f32) {
        line.copy_within(0..FIR_TAPS - 1, 1);
        line[0] = x;
    }

    #[inline]
    fn convolve(line: &[f32; FIR_TAPS]) -> f32 {
        line.iter().zip(FIR_HALFBAND.iter()).map(|(s, c)| s * c).sum()
    }

    #[inline]
    fn upsample(&mut self, x: f32) -> [f32; 2] {
        Self::push(&mut self.up, 2.0 * x);
        let first = Self::convolve(&self.up);
        Self::push(&mut self.up, 0.0);
        let second = Self::convolve(&self.up);
        [first, second]
    }

    #[inline]
    fn downsample(&mut self, pair: [f32; 2]) -> f32 {
        Self::push(&mut self.down, pair[0]);
        Self::push(&mut self.down, pair[1]);
        Self::convolve(&self.down)
    }
}

#[derive(Debug, Clone, Default)]
struct Stage {
    iir: IirStage,
    fir: FirStage,
}

impl Stage {
    #[inline]
    fn upsample(&mut self, x: f32, fir: bool) -> [f32; 2] {
        if fir {
            self.fir.upsample(x)
        } else {
            self.iir.upsample(x)
        }
    }

    #[inline]
    fn downsample(&mut self, pair: [f32; 2], fir: bool) -> f32 {
        if fir {
            self.fir.downsample(pair)
        } else {
            self.iir.downsample(pair)
        }
    }
}

/// Per-sample up/down converter with a runtime-selectable mode.
///
/// Use either the split API ([`upsample`](Self::upsample), process the
/// returned slice in place, then [`downsample`](Self::downsample)) or the
/// [`process_with`](Self::process_with) helper.
#[derive(Debug, Clone, Default)]
pub struct Oversampler {
    mode: OversamplingMode,
    stages: [Stage; 2],
    work: [f32; MAX_OVERSAMPLE_FACTOR],
}

impl Oversampler {
    /// Converter in `mode` with cleared state.
    pub fn new(mode: OversamplingMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Current mode.
    pub fn mode(&self) -> OversamplingMode {
        self.mode
    }

    /// Current factor.
    pub fn factor(&self) -> usize {
        self.mode.factor()
    }

    /// Switch mode and clear filter state. Not click-free on a live signal.
    pub fn set_mode(&mut self, mode: OversamplingMode) {
        if mode != self.mode {
            #[cfg(feature = "tracing")]
            tracing::debug!(from = self.mode.name(), to = mode.name(), "oversampler mode change");
            self.mode = mode;
            self.reset();
        }
    }

    /// Clear filter state.
    pub fn reset(&mut self) {
        self.stages = Default::default();
        self.work = [0.0; MAX_OVERSAMPLE_FACTOR];
    }

    /// Interpolate one host-rate sample to `factor()` high-rate samples.
    #[inline]
    pub fn upsample(&mut self, input: f32) -> &mut [f32] {
        let fir = self.mode.is_fir();
        match self.mode.stages() {
            0 => self.work[0] = input,
            1 => {
                let [a, b] = self.stages[0].upsample(input, fir);
                self.work[0] = a;
                self.work[1] = b;
            }
            _ => {
                let [a, b] = self.stages[0].upsample(input, fir);
                let [a0, a1] = self.stages[1].upsample(a, fir);
                let [b0, b1] = self.stages[1].upsample(b, fir);
                self.work = [a0, a1, b0, b1];
            }
        }
        &mut self.work[..self.mode.factor()]
    }

    /// Filter and decimate the work buffer back to one host-rate sample.
    #[inline]
    pub fn downsample(&mut self) -> f32 {
        let fir = self.mode.is_fir();
        let w = self.work;
        match self.mode.stages() {
            0 => w[0],
            1 => self.stages[0].downsample([w[0], w[1]], fir),
            _ => {
                let a = self.stages[1].downsample([w[0], w[1]], fir);
                let b = self.stages[1].downsample([w[2], w[3]], fir);
                self.stages[0].downsample([a, b], fir)
            }
        }
    }

    /// Run `f` on every high-rate sample of `input` and return the decimated
    /// result. With [`OversamplingMode::Off`] this is just `f(input)`.
    #[inline]
    pub fn process_with<F: FnMut(f32) -> f32>(&mut self, input: f32, mut f: F) -> f32 {
        for s in self.upsample(input).iter_mut() {
            *s = f(*s);
        }
        self.downsample()
    }

    /// Approximate group delay in host-rate samples (FIR modes only).
    pub fn latency_samples(&self) -> usize {
        match self.mode {
            OversamplingMode::Fir2x => 7,
            OversamplingMode::Fir4x => 11,
            _ => 0,
        }
    }
}

/// An [`Effect`] running inside an [`Oversampler`].
///
/// The inner effect is configured for `sample_rate × factor`.
#[derive(Debug, Clone)]
pub struct Oversampled<E: Effect> {
    effect: E,
    os: Oversampler,
    sample_rate: f32,
}

impl<E: Effect> Oversampled<E> {
    /// Wrap `effect`, which is re-rated to the oversampled rate.
    pub fn new(mut effect: E, sample_rate: f32, mode: OversamplingMode) -> Self {
        effect.set_sample_rate(sample_rate * mode.factor() as f32);
        Self {
            effect,
            os: Oversampler::new(mode),
            sample_rate,
        }
    }

    /// The wrapped effect.
    pub fn inner(&self) -> &E {
        &self.effect
    }

    /// The wrapped effect, mutably.
    pub fn inner_mut(&mut self) -> &mut E {
        &mut self.effect
    }

    /// Change the mode, re-rating the inner effect.
    pub fn set_mode(&mut self, mode: OversamplingMode) {
        if mode != self.os.mode() {
            self.os.set_mode(mode);
            self.effect
                .set_sample_rate(self.sample_rate * mode.factor() as f32);
        }
    }

    /// Current factor.
    pub fn factor(&self) -> usize {
        self.os.factor()
    }
}

impl<E: Effect> Effect for Oversampled<E> {
    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        let effect = &mut self.effect;
        self.os.process_with(input, |s| effect.process(s))
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.effect
            .set_sample_rate(sample_rate * self.os.factor() as f32);
    }

    fn reset(&mut self) {
        self.os.reset();
        self.effect.reset();
    }

    fn latency_samples(&self) -> usize {
        self.os.latency_samples() + self.effect.latency_samples()
    }
}
