//! Xorshift32 white noise.
//!
//! Fast, allocation-free, and deterministic from its seed, which keeps test
//! renders reproducible. Not suitable for anything but audio.

/// Xorshift32 generator.
///
/// ```rust
/// use analoga_core::Noise;
///
/// let mut n = Noise::new(1);
/// let x = n.next_bipolar();
/// assert!((-1.0..=1.0).contains(&x));
/// ```
#[derive(Debug, Clone)]
pub struct Noise {
    state: u32,
}

impl Default for Noise {
    fn default() -> Self {
        Self::new(0x1234_5678)
    }
}

impl Noise {
    /// Generator seeded with `seed`. A zero seed is replaced, since xorshift
    /// would stay at zero forever.
    pub fn new(seed: u32) -> Self {
        Self {
            state: if seed == 0 { 0x9E37_79B9 } else { seed },
        }
    }

    /// Next raw 32-bit state.
    #[inline]
    pub fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }

    /// Uniform value in `[-1, 1]`.
    #[inline]
    pub fn next_bipolar(&mut self) -> f32 {
        (self.next_u32() as i32 as f32) / (i32::MAX as f32)
    }

    /// Uniform value in `[0, 1)`.
    #[inline]
    pub fn next_unit(&mut self) -> f32 {
        (self.next_u32() >> 8) as f32 / (1u32 << 24) as f32
    }

    /// Uniform value in `[lo, hi)`.
    #[inline]
    pub fn next_range(&mut self, lo: f32, hi: f32) -> f32 {
        lo + (hi - lo) * self.next_unit()
    }
}
