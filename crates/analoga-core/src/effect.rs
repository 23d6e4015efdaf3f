//! The [`Effect`] trait shared by every per-sample processor.
//!
//! Processors are mono at heart: one `f32` in, one `f32` out. Stereo stages
//! either override [`Effect::process_stereo`] (reverb, console) or hold one
//! mono instance per channel.
//!
//! The trait is object-safe, but the engine always dispatches statically.

/// A stateful per-sample audio processor.
///
/// ```rust
/// use analoga_core::Effect;
///
/// struct Trim(f32);
///
/// impl Effect for Trim {
///     fn process(&mut self, input: f32) -> f32 {
///         input * self.0
///     }
///     fn set_sample_rate(&mut self, _sample_rate: f32) {}
///     fn reset(&mut self) {}
/// }
///
/// let mut trim = Trim(0.5);
/// let mut buf = [1.0, -1.0];
/// trim.process_block_inplace(&mut buf);
/// assert_eq!(buf, [0.5, -0.5]);
/// ```
pub trait Effect {
    /// Process one sample, advancing internal state.
    fn process(&mut self, input: f32) -> f32;

    /// Process one stereo frame.
    ///
    /// The default runs the same mono state over both channels in sequence,
    /// which is only correct for stateless processors. Anything with memory
    /// overrides this or is instantiated per channel.
    fn process_stereo(&mut self, left: f32, right: f32) -> (f32, f32) {
        (self.process(left), self.process(right))
    }

    /// Process `input` into `output`. Both slices must have the same length.
    fn process_block(&mut self, input: &[f32], output: &mut [f32]) {
        debug_assert_eq!(input.len(), output.len());
        for (inp, out) in input.iter().zip(output.iter_mut()) {
            *out = self.process(*inp);
        }
    }

    /// Process a buffer in place.
    fn process_block_inplace(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process(*sample);
        }
    }

    /// Process a stereo pair of buffers in place, frame by frame through
    /// [`process_stereo`](Self::process_stereo).
    fn process_block_stereo_inplace(&mut self, left: &mut [f32], right: &mut [f32]) {
        debug_assert_eq!(left.len(), right.len());
        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            (*l, *r) = self.process_stereo(*l, *r);
        }
    }

    /// Recompute every sample-rate dependent coefficient.
    fn set_sample_rate(&mut self, sample_rate: f32);

    /// Clear internal state without touching parameters.
    fn reset(&mut self);

    /// Latency introduced by this processor, in samples.
    fn latency_samples(&self) -> usize {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Gain(f32);

    impl Effect for Gain {
        fn process(&mut self, input: f32) -> f32 {
            input * self.0
        }
        fn set_sample_rate(&mut self, _: f32) {}
        fn reset(&mut self) {}
    }

    #[test]
    fn block_matches_per_sample() {
        let mut g = Gain(2.0);
        let input = [1.0, 2.0, 3.0];
        let mut output = [0.0; 3];
        g.process_block(&input, &mut output);
        assert_eq!(output, [2.0, 4.0, 6.0]);
    }

    #[test]
    fn default_stereo_processes_both_channels() {
        let mut g = Gain(3.0);
        assert_eq!(g.process_stereo(1.0, -1.0), (3.0, -3.0));
        assert_eq!(g.latency_samples(), 0);
    }

    #[test]
    fn stereo_block_matches_per_frame() {
        let mut g = Gain(0.5);
        let mut left = [1.0, 2.0];
        let mut right = [-4.0, 8.0];
        g.process_block_stereo_inplace(&mut left, &mut right);
        assert_eq!(left, [0.5, 1.0]);
        assert_eq!(right, [-2.0, 4.0]);
    }
}
