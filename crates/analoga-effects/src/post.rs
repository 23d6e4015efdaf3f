//! Final stage: mains hum and hiss, stereo bleed, master gain.

use analoga_core::{Effect, Noise};
use core::f32::consts::TAU;
use libm::sinf;

/// Mains frequency of the hum.
pub const HUM_FREQUENCY: f32 = 50.0;

const HUM_LEVEL: f32 = 0.0015;
const HISS_LEVEL: f32 = 0.0006;
const CROSSTALK_KEEP: f32 = 0.97;
const CROSSTALK_BLEED: f32 = 0.03;

/// Upper end of the master gain control.
pub const MAX_MASTER_GAIN: f32 = 1.5;

/// Hum/hiss injection, crosstalk and master gain.
///
/// The hum phase lives here, so two engines never share it.
///
/// ```rust
/// use analoga_core::Effect;
/// use analoga_effects::PostStage;
///
/// let mut post = PostStage::new(48000.0);
/// post.set_crosstalk(true);
/// let (l, r) = post.process_stereo(1.0, 0.0);
/// assert!((l - 0.97).abs() < 1e-6 && (r - 0.03).abs() < 1e-6);
/// ```
#[derive(Debug, Clone)]
pub struct PostStage {
    hum_phase: f32,
    hum_increment: f32,
    hiss: Noise,
    hum_on: bool,
    crosstalk_on: bool,
    master_gain: f32,
}

impl PostStage {
    /// Hum and crosstalk off, unity gain.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            hum_phase: 0.0,
            hum_increment: HUM_FREQUENCY / sample_rate,
            hiss: Noise::new(0x5EED_0050),
            hum_on: false,
            crosstalk_on: false,
            master_gain: 1.0,
        }
    }

    /// Enable hum and hiss.
    pub fn set_hum(&mut self, on: bool) {
        self.hum_on = on;
    }

    /// Enable the 3 % stereo bleed.
    pub fn set_crosstalk(&mut self, on: bool) {
        self.crosstalk_on = on;
    }

    /// Output gain, clamped to `[0, 1.5]`.
    pub fn set_master_gain(&mut self, gain: f32) {
        self.master_gain = if gain.is_finite() {
            gain.clamp(0.0, MAX_MASTER_GAIN)
        } else {
            1.0
        };
    }

    /// Current master gain.
    pub fn master_gain(&self) -> f32 {
        self.master_gain
    }

    /// Hum phase in `[0, 1)`.
    pub fn hum_phase(&self) -> f32 {
        self.hum_phase
    }

    #[inline]
    fn next_hum(&mut self) -> f32 {
        let hum = HUM_LEVEL * sinf(TAU * self.hum_phase);
        let hiss = HISS_LEVEL * self.hiss.next_bipolar();
        self.hum_phase += self.hum_increment;
        if self.hum_phase >= 1.0 {
            self.hum_phase -= 1.0;
        }
        hum + hiss
    }
}

impl Effect for PostStage {
    fn process(&mut self, input: f32) -> f32 {
        let mut x = input;
        if self.hum_on {
            x += self.next_hum();
        }
        x * self.master_gain
    }

    #[inline]
    fn process_stereo(&mut self, left: f32, right: f32) -> (f32, f32) {
        let (mut l, mut r) = (left, right);
        if self.hum_on {
            let n = self.next_hum();
            l += n;
            r += n;
        }
        if self.crosstalk_on {
            (l, r) = (
                CROSSTALK_KEEP * l + CROSSTALK_BLEED * r,
                CROSSTALK_KEEP * r + CROSSTALK_BLEED * l,
            );
        }
        (l * self.master_gain, r * self.master_gain)
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.hum_increment = HUM_FREQUENCY / sample_rate;
    }

    fn reset(&mut self) {
        self.hum_phase = 0.0;
    }
}
