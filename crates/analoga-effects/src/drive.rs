//! Global analogue drive.
//!
//! A double quadratic clip between a DC-blocking highpass and a one-pole
//! lowpass, run per channel at twice the host rate. Everything hangs off a
//! single amount control:
//!
//! | Amount | Pregain | Mix | Postgain |
//! |--------|---------|-----|----------|
//! | 0 | 0 | 0.2 | 1.0 |
//! | 3 (default) | 3 | 0.5 | 1.13 |
//! | 7 | 7 | 0.9 | 1.3 |

use analoga_core::{
    Effect, OnePole, Oversampled, OversamplingMode, flush_denormal, map_range, quadratic_clip,
};

/// Upper end of the amount control.
pub const MAX_DRIVE: f32 = 7.0;

/// Default drive amount.
pub const DEFAULT_DRIVE: f32 = 3.0;

const HIGHPASS_COEFF: f32 = 0.9978;
const LOWPASS_POLE: f32 = 0.65;

/// One channel of the drive circuit, at whatever rate it is run.
#[derive(Debug, Clone)]
pub struct DriveStage {
    pregain: f32,
    mix: f32,
    postgain: f32,
    hp_state: f32,
    lowpass: OnePole,
}

impl Default for DriveStage {
    fn default() -> Self {
        Self::new()
    }
}

impl DriveStage {
    /// Stage at the default amount.
    pub fn new() -> Self {
        let mut stage = Self {
            pregain: 0.0,
            mix: 0.0,
            postgain: 1.0,
            hp_state: 0.0,
            lowpass: OnePole::from_pole(LOWPASS_POLE),
        };
        stage.set_amount(DEFAULT_DRIVE);
        stage
    }

    /// Derive pregain, mix and postgain from `amount` in `[0, 7]`.
    pub fn set_amount(&mut self, amount: f32) {
        let amount = if amount.is_finite() {
            amount.clamp(0.0, MAX_DRIVE)
        } else {
            DEFAULT_DRIVE
        };
        self.pregain = amount;
        self.mix = map_range(amount, 0.0, MAX_DRIVE, 0.2, 0.9);
        self.postgain = map_range(amount, 0.0, MAX_DRIVE, 1.0, 1.3);
    }

    /// `(pregain, mix, postgain)`.
    pub fn gains(&self) -> (f32, f32, f32) {
        (self.pregain, self.mix, self.postgain)
    }
}

impl Effect for DriveStage {
    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        let dry = input;

        let mut x = input - self.hp_state;
        self.hp_state = flush_denormal(x + HIGHPASS_COEFF * self.hp_state);

        x = quadratic_clip(self.pregain * x);
        x = quadratic_clip(x);

        let wet = self.postgain * self.lowpass.process(x);
        (1.0 - self.mix) * dry + self.mix * wet
    }

    // The coefficients are fixed for a 2× rate.
    fn set_sample_rate(&mut self, _sample_rate: f32) {}

    fn reset(&mut self) {
        self.hp_state = 0.0;
        self.lowpass.reset();
    }
}

/// Stereo drive, 2× IIR oversampled.
///
/// ```rust
/// use analoga_core::Effect;
/// use analoga_effects::AnalogueDrive;
///
/// let mut drive = AnalogueDrive::new(48000.0);
/// drive.set_amount(5.0);
/// let (l, r) = drive.process_stereo(0.3, -0.3);
/// assert!(l.is_finite() && r.is_finite());
/// ```
#[derive(Debug, Clone)]
pub struct AnalogueDrive {
    channels: [Oversampled<DriveStage>; 2],
    amount: f32,
}

impl AnalogueDrive {
    /// Drive at `sample_rate` with the default amount.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            channels: core::array::from_fn(|_| {
                Oversampled::new(DriveStage::new(), sample_rate, OversamplingMode::Iir2x)
            }),
            amount: DEFAULT_DRIVE,
        }
    }

    /// Set the drive amount, 0..7.
    pub fn set_amount(&mut self, amount: f32) {
        for ch in &mut self.channels {
            ch.inner_mut().set_amount(amount);
        }
        self.amount = if amount.is_finite() {
            amount.clamp(0.0, MAX_DRIVE)
        } else {
            DEFAULT_DRIVE
        };
    }

    /// Current amount.
    pub fn amount(&self) -> f32 {
        self.amount
    }
}

impl Effect for AnalogueDrive {
    fn process(&mut self, input: f32) -> f32 {
        self.channels[0].process(input)
    }

    #[inline]
    fn process_stereo(&mut self, left: f32, right: f32) -> (f32, f32) {
        let [l, r] = &mut self.channels;
        (l.process(left), r.process(right))
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        for ch in &mut self.channels {
            ch.set_sample_rate(sample_rate);
        }
    }

    fn reset(&mut self) {
        for ch in &mut self.channels {
            ch.reset();
        }
    }
}
