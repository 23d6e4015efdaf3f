//! analoga effects: the global chain that runs after the voices are summed.
//!
//! ```text
//! voices → DelayLine (L, R) → Reverb → AnalogueDrive → ConsoleChain → PostStage
//! ```
//!
//! - [`DelayLine`] - mono feedback delay with a dark, smoothed tap
//! - [`Reverb`] - Freeverb with eight [`ReverbType`] presets and a size control
//! - [`AnalogueDrive`] - 2× oversampled double soft clip
//! - [`ConsoleChain`] - 25 channel-strip flavours built from EQ, [`Compressor`]
//!   and a saturator
//! - [`PostStage`] - hum, crosstalk, master gain
//!
//! Every stage reconfigures only when its settings change, so the engine can
//! push parameters once per block without restarting filters.
//!
//! ## Example
//!
//! ```rust
//! use analoga_core::Effect;
//! use analoga_effects::{AnalogueDrive, ConsoleChain, Reverb, ReverbType};
//!
//! let mut reverb = Reverb::new(48000.0);
//! reverb.configure(ReverbType::Plate, 1.2);
//! reverb.set_mix(0.25);
//!
//! let mut drive = AnalogueDrive::new(48000.0);
//! let mut console = ConsoleChain::new(48000.0);
//! console.set_mode(10);
//!
//! let (l, r) = reverb.process_stereo(0.2, 0.2);
//! let (l, r) = drive.process_stereo(l, r);
//! let (l, r) = console.process_stereo(l, r);
//! assert!(l.is_finite() && r.is_finite());
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod compressor;
pub mod console;
pub mod delay;
pub mod drive;
pub mod post;
pub mod reverb;

pub use compressor::Compressor;
pub use console::{
    CONSOLE_MODE_COUNT, CONSOLE_MODES, CompressorSettings, ConsoleChain, ConsoleMode, Saturation,
    StageBypass, ToneEq, console_mode,
};
pub use delay::{DelayLine, MAX_DELAY_SECONDS};
pub use drive::{AnalogueDrive, DEFAULT_DRIVE, DriveStage, MAX_DRIVE};
pub use post::{HUM_FREQUENCY, MAX_MASTER_GAIN, PostStage};
pub use reverb::{Reverb, ReverbParameters, ReverbType};
