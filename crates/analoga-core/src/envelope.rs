//! Peak envelope follower for dynamics processing.

use libm::expf;

/// Peak detector with separate attack and release time constants.
///
/// `env = x + c·(env − x)` where `c` is the attack coefficient while the
/// rectified input is above the envelope and the release coefficient
/// otherwise. Times at or below 0.1 ms make the respective side instant.
///
/// ```rust
/// use analoga_core::EnvelopeFollower;
///
/// let mut env = EnvelopeFollower::with_times(48000.0, 1.0, 100.0);
/// for _ in 0..4800 {
///     env.process(0.5);
/// }
/// assert!((env.level() - 0.5).abs() < 1e-3);
/// ```
#[derive(Debug, Clone)]
pub struct EnvelopeFollower {
    envelope: f32,
    attack_coeff: f32,
    release_coeff: f32,
    attack_ms: f32,
    release_ms: f32,
    sample_rate: f32,
}

impl EnvelopeFollower {
    /// 10 ms attack, 100 ms release.
    pub fn new(sample_rate: f32) -> Self {
        Self::with_times(sample_rate, 10.0, 100.0)
    }

    /// Follower with explicit times in milliseconds.
    pub fn with_times(sample_rate: f32, attack_ms: f32, release_ms: f32) -> Self {
        let mut follower = Self {
            envelope: 0.0,
            attack_coeff: 0.0,
            release_coeff: 0.0,
            attack_ms,
            release_ms,
            sample_rate,
        };
        follower.update();
        follower
    }

    /// Attack time in milliseconds.
    pub fn set_attack_ms(&mut self, ms: f32) {
        self.attack_ms = ms.max(0.0);
        self.update();
    }

    /// Release time in milliseconds.
    pub fn set_release_ms(&mut self, ms: f32) {
        self.release_ms = ms.max(0.0);
        self.update();
    }

    /// Current attack time.
    pub fn attack_ms(&self) -> f32 {
        self.attack_ms
    }

    /// Current release time.
    pub fn release_ms(&self) -> f32 {
        self.release_ms
    }

    /// Recompute coefficients for a new rate.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.update();
    }

    /// Track one sample and return the envelope.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let x = input.abs();
        let c = if x > self.envelope {
            self.attack_coeff
        } else {
            self.release_coeff
        };
        self.envelope = crate::flush_denormal(x + c * (self.envelope - x));
        self.envelope
    }

    /// Envelope without advancing.
    pub fn level(&self) -> f32 {
        self.envelope
    }

    /// Drop the envelope to zero.
    pub fn reset(&mut self) {
        self.envelope = 0.0;
    }

    fn coeff(ms: f32, sample_rate: f32) -> f32 {
        if ms <= 0.1 {
            0.0
        } else {
            expf(-1000.0 / (ms * sample_rate))
        }
    }

    fn update(&mut self) {
        self.attack_coeff = Self::coeff(self.attack_ms, self.sample_rate);
        self.release_coeff = Self::coeff(self.release_ms, self.sample_rate);
    }
}
