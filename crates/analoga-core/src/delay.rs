//! Circular delay buffer with cubic fractional reads.
//!
//! [`DelayBuffer`] is allocated once and never grows. Reads address the
//! buffer relative to the write cursor, *before* the current sample is
//! written, so a delay of `d` samples returns the sample written `d` calls
//! to [`write`](DelayBuffer::write) ago. A read of exactly the buffer length
//! returns the oldest stored sample, which is what recirculating comb and
//! allpass sections need.

#[cfg(not(feature = "std"))]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std as alloc;

use alloc::vec;
use alloc::vec::Vec;

use crate::catmull_rom;

/// Heap-allocated circular buffer.
///
/// ```rust
/// use analoga_core::DelayBuffer;
///
/// let mut line = DelayBuffer::new(8);
/// line.write(1.0);
/// line.write(0.0);
/// assert_eq!(line.read(2.0), 1.0);
/// ```
#[derive(Debug, Clone)]
pub struct DelayBuffer {
    buffer: Vec<f32>,
    write_pos: usize,
}

impl DelayBuffer {
    /// Buffer holding `len` samples. A zero length is raised to one.
    pub fn new(len: usize) -> Self {
        Self {
            buffer: vec![0.0; len.max(1)],
            write_pos: 0,
        }
    }

    /// Buffer long enough for `seconds` at `sample_rate`.
    pub fn from_time(sample_rate: f32, seconds: f32) -> Self {
        Self::new((sample_rate * seconds).max(1.0) as usize)
    }

    /// Number of stored samples.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Always false; a buffer holds at least one sample.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Index the next [`write`](Self::write) lands on.
    pub fn write_position(&self) -> usize {
        self.write_pos
    }

    /// Sample at an absolute index, wrapped into the buffer.
    #[inline]
    pub fn sample_at(&self, index: isize) -> f32 {
        let len = self.buffer.len() as isize;
        self.buffer[index.rem_euclid(len) as usize]
    }

    /// Catmull-Rom read at a fractional delay in samples.
    ///
    /// The read position is `write_position − delay`, wrapped; integer delays
    /// return stored samples exactly.
    #[inline]
    pub fn read(&self, delay: f32) -> f32 {
        let mut pos = self.write_pos as f32 - delay;
        if pos < 0.0 {
            pos += self.buffer.len() as f32;
        }
        let idx = libm::floorf(pos);
        let frac = pos - idx;
        let i = idx as isize;
        catmull_rom(
            self.sample_at(i - 1),
            self.sample_at(i),
            self.sample_at(i + 1),
            self.sample_at(i + 2),
            frac,
        )
    }

    /// Oldest stored sample, i.e. a delay of exactly [`len`](Self::len).
    #[inline]
    pub fn oldest(&self) -> f32 {
        self.buffer[self.write_pos]
    }

    /// Store `sample` and advance the cursor.
    #[inline]
    pub fn write(&mut self, sample: f32) {
        self.buffer[self.write_pos] = sample;
        self.write_pos += 1;
        if self.write_pos >= self.buffer.len() {
            self.write_pos = 0;
        }
    }

    /// Zero the contents and rewind the cursor.
    pub fn clear(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }
}
