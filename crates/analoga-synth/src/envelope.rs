//! Linear-segment ADSR envelope.
//!
//! Every stage moves the level by a fixed increment per sample:
//!
//! | Stage   | Increment           |
//! |---------|---------------------|
//! | Attack  | `1 / (A·sr)`        |
//! | Decay   | `(1 − S) / (D·sr)`  |
//! | Release | `level / (R·sr)`, latched at note-off |
//!
//! A retrigger restarts the attack from the current level rather than from
//! zero, so note-on never steps the output. Stages with zero length are
//! skipped.

/// ADSR envelope states
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EnvelopeState {
    /// Output is zero.
    #[default]
    Idle,
    /// Ramping up toward 1.
    Attack,
    /// Falling from 1 toward the sustain level.
    Decay,
    /// Holding the sustain level while the gate is held.
    Sustain,
    /// Falling to zero after the gate is released.
    Release,
}

/// ADSR envelope generator.
///
/// # Example
///
/// ```rust
/// use analoga_synth::{AdsrEnvelope, EnvelopeState};
///
/// let mut env = AdsrEnvelope::new(48000.0);
/// env.set_parameters(0.01, 0.1, 0.8, 0.2);
///
/// env.note_on(false);
/// for _ in 0..480 {
///     env.next_value();
/// }
/// assert_eq!(env.state(), EnvelopeState::Decay);
///
/// env.note_off();
/// assert_eq!(env.state(), EnvelopeState::Release);
/// ```
#[derive(Debug, Clone)]
pub struct AdsrEnvelope {
    state: EnvelopeState,
    level: f32,
    sample_rate: f32,

    // Seconds
    attack: f32,
    decay: f32,
    sustain: f32,
    release: f32,

    attack_rate: f32,
    decay_rate: f32,
    release_rate: f32,
}

impl Default for AdsrEnvelope {
    fn default() -> Self {
        Self::new(48000.0)
    }
}

impl AdsrEnvelope {
    /// Envelope with attack 10 ms, decay 100 ms, sustain 0.8, release 200 ms.
    pub fn new(sample_rate: f32) -> Self {
        let mut env = Self {
            state: EnvelopeState::Idle,
            level: 0.0,
            sample_rate,
            attack: 0.01,
            decay: 0.1,
            sustain: 0.8,
            release: 0.2,
            attack_rate: 0.0,
            decay_rate: 0.0,
            release_rate: 0.0,
        };
        env.recalculate_rates();
        env
    }

    /// Set all four stages at once. Times are in seconds; negative or
    /// non-finite times count as zero and the sustain level is clamped to
    /// `[0, 1]`.
    pub fn set_parameters(&mut self, attack: f32, decay: f32, sustain: f32, release: f32) {
        self.attack = sanitize_time(attack);
        self.decay = sanitize_time(decay);
        self.sustain = if sustain.is_finite() {
            sustain.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.release = sanitize_time(release);
        self.recalculate_rates();

        if self.state == EnvelopeState::Sustain {
            self.level = self.sustain;
        }
    }

    /// Set sample rate.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.recalculate_rates();
    }

    /// Start the attack. With `legato` set, an already-active envelope keeps
    /// its current stage; returns whether the envelope was (re)triggered.
    pub fn note_on(&mut self, legato: bool) -> bool {
        if legato && self.is_active() {
            return false;
        }

        if self.attack_rate > 0.0 {
            self.state = EnvelopeState::Attack;
        } else if self.decay_rate > 0.0 {
            self.level = 1.0;
            self.state = EnvelopeState::Decay;
        } else {
            self.level = self.sustain;
            self.state = EnvelopeState::Sustain;
        }
        true
    }

    /// Enter the release stage from wherever the envelope currently is.
    pub fn note_off(&mut self) {
        if self.state == EnvelopeState::Idle {
            return;
        }
        if self.release > 0.0 {
            self.release_rate = self.level / (self.release * self.sample_rate);
            self.state = EnvelopeState::Release;
        } else {
            self.reset();
        }
    }

    /// Force envelope to idle state.
    pub fn reset(&mut self) {
        self.state = EnvelopeState::Idle;
        self.level = 0.0;
    }

    /// Get current state.
    pub fn state(&self) -> EnvelopeState {
        self.state
    }

    /// Current level without advancing.
    pub fn level(&self) -> f32 {
        self.level
    }

    /// Check if envelope is active (not idle).
    pub fn is_active(&self) -> bool {
        self.state != EnvelopeState::Idle
    }

    /// Advance by one sample and return the new level.
    #[inline]
    pub fn next_value(&mut self) -> f32 {
        match self.state {
            EnvelopeState::Idle => return 0.0,
            EnvelopeState::Attack => {
                self.level += self.attack_rate;
                if self.level >= 1.0 {
                    self.level = 1.0;
                    self.leave_attack();
                }
            }
            EnvelopeState::Decay => {
                self.level -= self.decay_rate;
                if self.level <= self.sustain {
                    self.level = self.sustain;
                    self.state = EnvelopeState::Sustain;
                }
            }
            EnvelopeState::Sustain => self.level = self.sustain,
            EnvelopeState::Release => {
                self.level -= self.release_rate;
                if self.level <= 0.0 {
                    self.reset();
                }
            }
        }
        self.level
    }

    fn leave_attack(&mut self) {
        self.state = if self.decay_rate > 0.0 {
            EnvelopeState::Decay
        } else {
            self.level = self.sustain;
            EnvelopeState::Sustain
        };
    }

    fn recalculate_rates(&mut self) {
        self.attack_rate = self.rate(1.0, self.attack);
        self.decay_rate = self.rate(1.0 - self.sustain, self.decay);
    }

    fn rate(&self, distance: f32, seconds: f32) -> f32 {
        if seconds > 0.0 {
            distance / (seconds * self.sample_rate)
        } else {
            0.0
        }
    }
}

fn sanitize_time(seconds: f32) -> f32 {
    if seconds.is_finite() {
        seconds.max(0.0)
    } else {
        0.0
    }
}
