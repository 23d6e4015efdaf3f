//! analoga core: DSP primitives for the analoga synthesizer.
//!
//! Everything here is allocation-free once constructed and runs under
//! `no_std` with `libm` for transcendental math. Higher crates compose these
//! pieces into voices (`analoga-synth`) and the global effects chain
//! (`analoga-effects`).
//!
//! # Processing Trait
//!
//! - [`Effect`] - per-sample mono processor with block and stereo helpers
//!
//! # Parameter Smoothing
//!
//! - [`SmoothedParam`] - exponential approach
//! - [`LinearSmoothedParam`] - fixed-length linear ramp
//!
//! # Filters
//!
//! | Type | Topology | Used for |
//! |------|----------|----------|
//! | [`LadderFilter`] | 5-state ladder, tanh input/feedback, 6 modes | voice filter |
//! | [`StateVariableFilter`] | TPT SVF | voice filter (SVF models) |
//! | [`Biquad`] | RBJ Direct Form I | console EQ |
//! | [`OnePole`] | 6 dB/oct lowpass | delay and drive tone |
//! | [`CombFilter`] / [`AllpassFilter`] | Freeverb sections | reverb |
//!
//! # Delay
//!
//! - [`DelayBuffer`] - circular buffer with Catmull-Rom fractional reads
//!
//! # Anti-Aliasing
//!
//! - [`Oversampler`] - runtime 1×/2×/4× converter, IIR or FIR half-bands
//! - [`Oversampled`] - [`Effect`] wrapper around an oversampler
//!
//! # Dynamics, Timing, Noise
//!
//! - [`EnvelopeFollower`] - peak detector for the compressor
//! - [`SyncDivision`] - tempo-synced note lengths
//! - [`Noise`] - xorshift32 white noise
//!
//! # no_std
//!
//! ```toml
//! [dependencies]
//! analoga-core = { version = "0.1", default-features = false }
//! ```
//!
//! # Example
//!
//! ```rust
//! use analoga_core::{Effect, LadderFilter, LadderMode, Oversampler, OversamplingMode};
//!
//! let mut filter = LadderFilter::new(96000.0);
//! filter.set_mode(LadderMode::Lpf24);
//! filter.set_cutoff(1200.0);
//!
//! let mut os = Oversampler::new(OversamplingMode::Iir2x);
//! let y = os.process_with(0.3, |s| filter.process(s));
//! assert!(y.is_finite());
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod allpass;
pub mod biquad;
pub mod comb;
pub mod delay;
pub mod effect;
pub mod envelope;
pub mod ladder;
pub mod math;
pub mod noise;
pub mod one_pole;
pub mod oversample;
pub mod param;
pub mod svf;
pub mod tempo;

pub use allpass::AllpassFilter;
pub use biquad::{
    BUTTERWORTH_Q, Biquad, BiquadCoefficients, high_shelf_coefficients, highpass_coefficients,
    low_shelf_coefficients, lowpass_coefficients, peak_coefficients,
};
pub use comb::CombFilter;
pub use delay::DelayBuffer;
pub use effect::Effect;
pub use envelope::EnvelopeFollower;
pub use ladder::{DEFAULT_LADDER_DRIVE, LADDER_RAMP_MS, LadderFilter, LadderMode};
pub use math::{
    catmull_rom, cubic_clip, db_to_linear, flush_denormal, linear_to_db, map_range,
    quadratic_clip, rational_clip, wet_dry_mix, wrap_phase,
};
pub use noise::Noise;
pub use one_pole::OnePole;
pub use oversample::{MAX_OVERSAMPLE_FACTOR, Oversampled, Oversampler, OversamplingMode};
pub use param::{LinearSmoothedParam, SmoothedParam};
pub use svf::{SVF_MAX_Q, SVF_MIN_Q, StateVariableFilter, SvfOutput};
pub use tempo::{SyncDivision, beat_seconds};
