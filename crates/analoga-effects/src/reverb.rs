//! Algorithmic stereo reverb.
//!
//! A Freeverb network (8 parallel damped combs into 4 series allpasses per
//! channel, right channel detuned by a 23-sample spread) under eight macro
//! "types". Each type is a fixed `(room, damping, width, wet, dry)` tuple;
//! a size scale multiplies the room size on top.
//!
//! ```text
//! in   = (L + R)·0.015
//! outL = allpasses(Σ combs(in))          feedback = room·0.28 + 0.7
//! L'   = outL·wet1 + outR·wet2 + L·dry   damping  = damp·0.4
//! ```
//!
//! The mix control is an outer linear blend between the untouched input and
//! the reverb output above, so the type's own dry level still colours a
//! fully wet setting.

use analoga_core::{AllpassFilter, CombFilter, Effect, LinearSmoothedParam, flush_denormal};

/// Freeverb comb tunings at 44.1 kHz.
const COMB_TUNINGS_44K: [usize; 8] = [1116, 1188, 1277, 1356, 1422, 1491, 1557, 1617];

/// Freeverb allpass tunings at 44.1 kHz.
const ALLPASS_TUNINGS_44K: [usize; 4] = [556, 441, 341, 225];

/// Extra samples on every right-channel section.
const STEREO_SPREAD: usize = 23;

/// Reference sample rate for the tunings.
const REFERENCE_RATE: f32 = 44100.0;

const INPUT_GAIN: f32 = 0.015;
const ROOM_SCALE: f32 = 0.28;
const ROOM_OFFSET: f32 = 0.7;
const DAMP_SCALE: f32 = 0.4;
const WET_SCALE: f32 = 3.0;
const DRY_SCALE: f32 = 2.0;

/// Gain ramp time for parameter changes.
const RAMP_MS: f32 = 10.0;

/// Scale delay times from reference rate to target rate.
fn scale_to_rate(samples: usize, target_rate: f32) -> usize {
    ((samples as f32 * target_rate / REFERENCE_RATE).round() as usize).max(1)
}

/// Underlying reverb settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReverbParameters {
    /// Room size, 0..1.
    pub room_size: f32,
    /// High-frequency damping, 0..1.
    pub damping: f32,
    /// Stereo width, 0..1.
    pub width: f32,
    /// Reverb level, 0..1.
    pub wet_level: f32,
    /// Direct level, 0..1.
    pub dry_level: f32,
}

impl Default for ReverbParameters {
    fn default() -> Self {
        Self {
            room_size: 0.5,
            damping: 0.5,
            width: 1.0,
            wet_level: 0.33,
            dry_level: 0.4,
        }
    }
}

impl ReverbParameters {
    fn sanitized(self) -> Self {
        let unit = |v: f32, fallback: f32| {
            if v.is_finite() {
                v.clamp(0.0, 1.0)
            } else {
                fallback
            }
        };
        let d = Self::default();
        Self {
            room_size: unit(self.room_size, d.room_size),
            damping: unit(self.damping, d.damping),
            width: unit(self.width, d.width),
            wet_level: unit(self.wet_level, d.wet_level),
            dry_level: unit(self.dry_level, d.dry_level),
        }
    }
}

/// Macro reverb character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReverbType {
    /// Balanced all-rounder.
    #[default]
    Classic,
    /// Large, dark and long.
    Hall,
    /// Bright and dense.
    Plate,
    /// Very bright, long tail.
    Shimmer,
    /// Narrow and boingy.
    Spring,
    /// Small space.
    Room,
    /// Maximum size.
    Cathedral,
    /// Short, bright and wide.
    Gated,
}

impl ReverbType {
    /// All types in parameter order.
    pub const ALL: [Self; 8] = [
        Self::Classic,
        Self::Hall,
        Self::Plate,
        Self::Shimmer,
        Self::Spring,
        Self::Room,
        Self::Cathedral,
        Self::Gated,
    ];

    /// Type for a parameter index; out-of-range indices clamp.
    pub fn from_index(index: i32) -> Self {
        Self::ALL[index.clamp(0, Self::ALL.len() as i32 - 1) as usize]
    }

    /// Parameter index.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Display name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Classic => "Classic",
            Self::Hall => "Hall",
            Self::Plate => "Plate",
            Self::Shimmer => "Shimmer",
            Self::Spring => "Spring",
            Self::Room => "Room",
            Self::Cathedral => "Cathedral",
            Self::Gated => "Gated",
        }
    }

    /// Base parameters of this type.
    pub fn parameters(self) -> ReverbParameters {
        let (room_size, damping, width, wet_level, dry_level) = match self {
            Self::Classic => (0.60, 0.40, 1.00, 0.33, 0.67),
            Self::Hall => (0.95, 0.70, 1.00, 0.40, 0.60),
            Self::Plate => (0.75, 0.25, 0.90, 0.38, 0.62),
            Self::Shimmer => (0.85, 0.10, 1.00, 0.45, 0.55),
            Self::Spring => (0.55, 0.45, 0.70, 0.35, 0.65),
            Self::Room => (0.40, 0.50, 0.90, 0.32, 0.68),
            Self::Cathedral => (1.00, 0.60, 1.00, 0.50, 0.50),
            Self::Gated => (0.30, 0.20, 1.00, 0.42, 0.58),
        };
        ReverbParameters {
            room_size,
            damping,
            width,
            wet_level,
            dry_level,
        }
    }

    /// Parameters with the room size scaled by `size` (clamped to 0.1..2.0).
    ///
    /// ```rust
    /// use analoga_effects::ReverbType;
    ///
    /// let p = ReverbType::Hall.scaled(2.0);
    /// assert_eq!(p.room_size, 1.0);
    /// ```
    pub fn scaled(self, size: f32) -> ReverbParameters {
        let mut p = self.parameters();
        p.room_size = (p.room_size * clamp_size(size)).clamp(0.0, 1.0);
        p
    }
}

fn clamp_size(size: f32) -> f32 {
    if size.is_finite() {
        size.clamp(0.1, 2.0)
    } else {
        1.0
    }
}

/// Stereo Freeverb with macro types and an outer dry/wet mix.
///
/// ## Parameters
///
/// - `type`: [`ReverbType`], selected through [`configure`](Self::configure)
/// - `size`: 0.1–2.0 room size scale (default 1.0)
/// - `mix`: 0.0–1.0 outer blend (default 0.3)
///
/// # Example
///
/// ```rust
/// use analoga_core::Effect;
/// use analoga_effects::{Reverb, ReverbType};
///
/// let mut reverb = Reverb::new(48000.0);
/// assert!(reverb.configure(ReverbType::Plate, 1.2));
/// assert!(!reverb.configure(ReverbType::Plate, 1.2));
/// reverb.set_mix(0.4);
///
/// let (l, r) = reverb.process_stereo(0.5, -0.5);
/// assert!(l.is_finite() && r.is_finite());
/// ```
#[derive(Debug, Clone)]
pub struct Reverb {
    combs: [[CombFilter; 8]; 2],
    allpasses: [[AllpassFilter; 4]; 2],

    damping: LinearSmoothedParam,
    feedback: LinearSmoothedParam,
    dry_gain: LinearSmoothedParam,
    wet_gain1: LinearSmoothedParam,
    wet_gain2: LinearSmoothedParam,

    params: ReverbParameters,
    configured: Option<(ReverbType, f32)>,
    mix: f32,
    sample_rate: f32,
}

impl Reverb {
    /// Reverb at `sample_rate` with default parameters and mix 0.3.
    pub fn new(sample_rate: f32) -> Self {
        let ramp = |v: f32| LinearSmoothedParam::with_config(v, sample_rate, RAMP_MS);
        let mut reverb = Self {
            combs: Self::build_combs(sample_rate),
            allpasses: Self::build_allpasses(sample_rate),
            damping: ramp(0.0),
            feedback: ramp(0.0),
            dry_gain: ramp(0.0),
            wet_gain1: ramp(0.0),
            wet_gain2: ramp(0.0),
            params: ReverbParameters::default(),
            configured: None,
            mix: 0.3,
            sample_rate,
        };
        reverb.apply_parameters();
        reverb.snap_smoothers();
        reverb
    }

    fn build_combs(sample_rate: f32) -> [[CombFilter; 8]; 2] {
        core::array::from_fn(|ch| {
            core::array::from_fn(|i| {
                CombFilter::new(scale_to_rate(
                    COMB_TUNINGS_44K[i] + ch * STEREO_SPREAD,
                    sample_rate,
                ))
            })
        })
    }

    fn build_allpasses(sample_rate: f32) -> [[AllpassFilter; 4]; 2] {
        core::array::from_fn(|ch| {
            core::array::from_fn(|i| {
                let mut ap = AllpassFilter::new(scale_to_rate(
                    ALLPASS_TUNINGS_44K[i] + ch * STEREO_SPREAD,
                    sample_rate,
                ));
                ap.set_feedback(0.5);
                ap
            })
        })
    }

    /// Outer wet proportion, clamped to `[0, 1]`.
    pub fn set_mix(&mut self, mix: f32) {
        self.mix = if mix.is_finite() { mix.clamp(0.0, 1.0) } else { 0.3 };
    }

    /// Current outer mix.
    pub fn mix(&self) -> f32 {
        self.mix
    }

    /// Set the underlying parameters directly. Gains ramp over 10 ms.
    pub fn set_parameters(&mut self, params: ReverbParameters) {
        self.params = params.sanitized();
        self.apply_parameters();
    }

    /// Current underlying parameters.
    pub fn parameters(&self) -> ReverbParameters {
        self.params
    }

    /// Select a type and size, recomputing the parameters only when either
    /// differs from the last call. Returns whether anything changed; the
    /// first call always configures.
    pub fn configure(&mut self, reverb_type: ReverbType, size: f32) -> bool {
        let key = (reverb_type, clamp_size(size));
        if self.configured == Some(key) {
            return false;
        }
        self.configured = Some(key);

        #[cfg(feature = "tracing")]
        tracing::debug!(reverb_type = reverb_type.name(), size = key.1, "reverb reconfigured");

        self.set_parameters(reverb_type.scaled(key.1));
        true
    }

    /// Type and size of the last [`configure`](Self::configure) call.
    pub fn configuration(&self) -> Option<(ReverbType, f32)> {
        self.configured
    }

    fn apply_parameters(&mut self) {
        let p = self.params;
        let wet = p.wet_level * WET_SCALE;
        self.damping.set_target(p.damping * DAMP_SCALE);
        self.feedback.set_target(p.room_size * ROOM_SCALE + ROOM_OFFSET);
        self.dry_gain.set_target(p.dry_level * DRY_SCALE);
        self.wet_gain1.set_target(0.5 * wet * (1.0 + p.width));
        self.wet_gain2.set_target(0.5 * wet * (1.0 - p.width));
    }

    fn snap_smoothers(&mut self) {
        self.damping.snap_to_target();
        self.feedback.snap_to_target();
        self.dry_gain.snap_to_target();
        self.wet_gain1.snap_to_target();
        self.wet_gain2.snap_to_target();
    }

    /// The Freeverb network without the outer mix.
    #[inline]
    fn process_network(&mut self, left: f32, right: f32) -> (f32, f32) {
        let input = (left + right) * INPUT_GAIN;
        let damp = self.damping.advance();
        let feedback = self.feedback.advance();

        let mut out = [0.0f32; 2];
        for (ch, acc) in out.iter_mut().enumerate() {
            for comb in &mut self.combs[ch] {
                comb.set_damp(damp);
                comb.set_feedback(feedback);
                *acc += comb.process(input);
            }
            for ap in &mut self.allpasses[ch] {
                *acc = ap.process(*acc);
            }
            *acc = flush_denormal(*acc);
        }

        let dry = self.dry_gain.advance();
        let wet1 = self.wet_gain1.advance();
        let wet2 = self.wet_gain2.advance();
        (
            out[0] * wet1 + out[1] * wet2 + left * dry,
            out[1] * wet1 + out[0] * wet2 + right * dry,
        )
    }
}

impl Effect for Reverb {
    fn process(&mut self, input: f32) -> f32 {
        let (l, r) = self.process_stereo(input, input);
        (l + r) * 0.5
    }

    #[inline]
    fn process_stereo(&mut self, left: f32, right: f32) -> (f32, f32) {
        let (wl, wr) = self.process_network(left, right);
        let mix = self.mix;
        (
            left * (1.0 - mix) + wl * mix,
            right * (1.0 - mix) + wr * mix,
        )
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.combs = Self::build_combs(sample_rate);
        self.allpasses = Self::build_allpasses(sample_rate);
        for s in [
            &mut self.damping,
            &mut self.feedback,
            &mut self.dry_gain,
            &mut self.wet_gain1,
            &mut self.wet_gain2,
        ] {
            s.set_sample_rate(sample_rate);
        }
        self.snap_smoothers();
    }

    fn reset(&mut self) {
        for comb in self.combs.iter_mut().flatten() {
            comb.clear();
        }
        for ap in self.allpasses.iter_mut().flatten() {
            ap.clear();
        }
        self.snap_smoothers();
    }
}
