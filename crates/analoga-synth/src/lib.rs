//! analoga synth: the polyphonic voice engine.
//!
//! A [`SynthEngine`] owns eight [`Voice`]s and the global effect chain from
//! `analoga-effects`. Each voice runs:
//!
//! ```text
//! OscillatorPair ─► FilterChain (model voicing, oversampled) ─► × ADSR × LFO amp ─► L/R
//!      ▲                  ▲
//!      └── LFO pitch      └── LFO cutoff, component tolerance
//! ```
//!
//! # Core Components
//!
//! ## Oscillators
//!
//! - [`Oscillator`] - phase accumulator with PolyBLEP saw, square, pulse,
//!   leaky-integrated triangle and sine
//! - [`OscillatorPair`] - two oscillators plus a noise crossfade
//!
//! ```rust
//! use analoga_synth::{Oscillator, Waveform};
//!
//! let mut osc = Oscillator::new();
//! let dt = 440.0 / 48000.0;
//! let first = osc.next_sample(Some(Waveform::Saw), dt, 0.5);
//! assert!(first.abs() <= 1.0);
//! ```
//!
//! ## Envelopes and LFO
//!
//! - [`AdsrEnvelope`] - linear ADSR with a release slope latched at note-off
//! - [`Lfo`] - per-voice LFO routed to pitch, cutoff and amplitude
//!
//! ```rust
//! use analoga_synth::{AdsrEnvelope, EnvelopeState};
//!
//! let mut env = AdsrEnvelope::new(48000.0);
//! env.set_parameters(0.01, 0.1, 0.7, 0.2);
//! env.note_on(false);
//! assert_eq!(env.state(), EnvelopeState::Attack);
//! let level = env.next_value();
//! assert!(level > 0.0);
//! ```
//!
//! ## Models
//!
//! [`model_profile`] maps each of the [`MODEL_COUNT`] models to a gain,
//! filter path, ladder response and waveshaper.
//!
//! ## Parameters
//!
//! [`ParamStore`] holds every parameter in lock-free atomics. Writers set
//! values from any thread; the engine takes a [`ParamSnapshot`] once per
//! block.
//!
//! ```rust
//! use analoga_synth::{ParamId, ParamStore};
//!
//! let store = ParamStore::new();
//! assert!(store.set_by_name("CUTOFF", 50_000.0));
//! assert_eq!(store.get(ParamId::Cutoff), 20000.0);
//! ```
//!
//! # no_std Support
//!
//! The engine itself is `no_std` + `alloc`. Disable the default `std` feature:
//!
//! ```toml
//! [dependencies]
//! analoga-synth = { version = "0.1", default-features = false }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod engine;
pub mod envelope;
pub mod filter_chain;
pub mod lfo;
pub mod oscillator;
pub mod params;
pub mod profile;
pub mod voice;

pub use engine::{DEFAULT_BPM, DEFAULT_MAX_BLOCK, MidiEvent, MidiEventKind, SynthEngine};
pub use envelope::{AdsrEnvelope, EnvelopeState};
pub use filter_chain::{DEFAULT_CUTOFF, DEFAULT_RESONANCE, FilterChain};
pub use lfo::{
    LFO_CUTOFF_RANGE, Lfo, LfoSettings, LfoShape, amp_target, modulated_cutoff, pitch_factor,
};
pub use oscillator::{
    Oscillator, OscillatorPair, OscillatorSettings, Waveform, detune_ratio, poly_blep,
};
pub use params::{
    PARAM_COUNT, PARAMS, ParamDescriptor, ParamId, ParamSnapshot, ParamStore, ParamUnit,
};
pub use profile::{
    FALLBACK_PROFILE, FilterPath, MODEL_COUNT, MODEL_NAMES, ModelProfile, Shaper, model_name,
    model_profile,
};
pub use voice::{
    DEFAULT_POLYPHONY, OversamplingState, Voice, VoiceAllocationMode, VoiceManager, VoiceParams,
    midi_to_freq,
};

// Re-export the core types that appear in this crate's API
pub use analoga_core::{LadderMode, OversamplingMode, SyncDivision};
