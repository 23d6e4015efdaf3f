//! Render configuration.
//!
//! A render is described by a TOML file, command-line overrides, or both:
//!
//! ```toml
//! sample_rate = 48000
//! block_size = 512
//! bpm = 120.0
//! release = 1.0
//!
//! [[notes]]
//! note = 57
//! start = 0.0
//! length = 1.5
//!
//! [[notes]]
//! note = 64
//! start = 0.5
//! length = 1.0
//! velocity = 90
//!
//! [params]
//! MODEL = 40
//! CUTOFF = 1800.0
//! REVERB_ON = 1
//! ```
//!
//! Parameter names are the engine's text ids (`analoga params`).

use std::collections::BTreeMap;
use std::path::Path;

use analoga_synth::{MidiEvent, MidiEventKind, ParamId, ParamStore};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Highest sample rate a render accepts.
const MAX_SAMPLE_RATE: u32 = 384_000;
/// Largest engine block a render accepts.
const MAX_BLOCK_SIZE: usize = 8192;

/// One note in a render.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NoteConfig {
    /// MIDI note number.
    pub note: u8,
    /// Start time in seconds.
    #[serde(default)]
    pub start: f32,
    /// Time until note-off, in seconds.
    #[serde(default = "default_length")]
    pub length: f32,
    /// MIDI velocity.
    #[serde(default = "default_velocity")]
    pub velocity: u8,
}

fn default_length() -> f32 {
    1.0
}

fn default_velocity() -> u8 {
    100
}

impl NoteConfig {
    /// Note starting at zero with default length and velocity.
    pub fn new(note: u8) -> Self {
        Self {
            note,
            start: 0.0,
            length: default_length(),
            velocity: default_velocity(),
        }
    }
}

/// Everything needed to render a WAV file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    /// Output sample rate in Hz.
    pub sample_rate: u32,
    /// Engine block size.
    pub block_size: usize,
    /// Host tempo; unset renders at the engine default.
    pub bpm: Option<f64>,
    /// Seconds rendered after the last note-off.
    pub release: f32,
    /// Notes to play.
    pub notes: Vec<NoteConfig>,
    /// Parameter values by text id.
    pub params: BTreeMap<String, f32>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48000,
            block_size: 512,
            bpm: None,
            release: 1.0,
            notes: Vec::new(),
            params: BTreeMap::new(),
        }
    }
}

/// A note event at an absolute frame of the render.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimedEvent {
    /// Frame from the start of the render.
    pub frame: usize,
    /// Event.
    pub kind: MidiEventKind,
}

impl TimedEvent {
    /// The event relative to a block starting at `block_start`.
    pub fn at_offset(&self, block_start: usize) -> MidiEvent {
        MidiEvent {
            offset: self.frame - block_start,
            kind: self.kind,
        }
    }
}

impl RenderConfig {
    /// Load a render configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml_str(&content)
    }

    /// Parse a render configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Check ranges and parameter names.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_rate == 0 || self.sample_rate > MAX_SAMPLE_RATE {
            return Err(ConfigError::out_of_range(
                "sample_rate",
                format!("{} Hz (expected 1..={MAX_SAMPLE_RATE})", self.sample_rate),
            ));
        }
        if self.block_size == 0 || self.block_size > MAX_BLOCK_SIZE {
            return Err(ConfigError::out_of_range(
                "block_size",
                format!("{} (expected 1..={MAX_BLOCK_SIZE})", self.block_size),
            ));
        }
        if !self.release.is_finite() || self.release < 0.0 {
            return Err(ConfigError::out_of_range(
                "release",
                format!("{} s", self.release),
            ));
        }
        for n in &self.notes {
            if n.note > 127 || n.velocity > 127 {
                return Err(ConfigError::out_of_range(
                    "notes",
                    format!("note {} velocity {} (expected 0..=127)", n.note, n.velocity),
                ));
            }
            if !(n.start.is_finite() && n.start >= 0.0 && n.length.is_finite() && n.length > 0.0)
            {
                return Err(ConfigError::out_of_range(
                    "notes",
                    format!("note {} start {} length {}", n.note, n.start, n.length),
                ));
            }
        }
        for name in self.params.keys() {
            if ParamId::from_name(name).is_none() {
                return Err(ConfigError::UnknownParameter(name.clone()));
            }
        }
        Ok(())
    }

    /// Write every `[params]` entry into `store`.
    pub fn apply_params(&self, store: &ParamStore) -> Result<(), ConfigError> {
        for (name, &value) in &self.params {
            if !store.set_by_name(name, value) {
                return Err(ConfigError::UnknownParameter(name.clone()));
            }
        }
        Ok(())
    }

    /// Length of the render in seconds: the last note-off plus the release.
    pub fn duration(&self) -> f32 {
        let last = self
            .notes
            .iter()
            .map(|n| n.start + n.length)
            .fold(0.0f32, f32::max);
        last + self.release
    }

    /// Length of the render in frames.
    pub fn total_frames(&self) -> usize {
        self.seconds_to_frames(self.duration())
    }

    /// Note-on and note-off events sorted by frame. At equal frames
    /// note-offs come first so a repeated note retriggers.
    pub fn events(&self) -> Vec<TimedEvent> {
        let mut events = Vec::with_capacity(self.notes.len() * 2);
        for n in &self.notes {
            let on = self.seconds_to_frames(n.start);
            let off = self.seconds_to_frames(n.start + n.length).max(on + 1);
            events.push(TimedEvent {
                frame: on,
                kind: MidiEventKind::NoteOn {
                    note: n.note,
                    velocity: n.velocity,
                },
            });
            events.push(TimedEvent {
                frame: off,
                kind: MidiEventKind::NoteOff { note: n.note },
            });
        }
        events.sort_by_key(|e| (e.frame, matches!(e.kind, MidiEventKind::NoteOn { .. })));
        events
    }

    fn seconds_to_frames(&self, seconds: f32) -> usize {
        (f64::from(seconds) * f64::from(self.sample_rate)).round() as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXAMPLE: &str = r#"
sample_rate = 44100
block_size = 256
bpm = 98.0
release = 0.5

[[notes]]
note = 57
length = 1.5

[[notes]]
note = 64
start = 0.5
velocity = 90

[params]
MODEL = 40
CUTOFF = 1800.0
"#;

    #[test]
    fn parses_full_example() {
        let config = RenderConfig::from_toml_str(EXAMPLE).unwrap();
        assert_eq!(config.sample_rate, 44100);
        assert_eq!(config.block_size, 256);
        assert_eq!(config.bpm, Some(98.0));
        assert_eq!(config.notes.len(), 2);
        assert_eq!(config.notes[0].start, 0.0);
        assert_eq!(config.notes[0].velocity, 100);
        assert_eq!(config.notes[1].length, 1.0);
        assert_eq!(config.params["CUTOFF"], 1800.0);
        config.validate().unwrap();
    }

    #[test]
    fn empty_file_gives_defaults() {
        let config = RenderConfig::from_toml_str("").unwrap();
        assert_eq!(config, RenderConfig::default());
    }

    #[test]
    fn unknown_keys_and_params_are_rejected() {
        assert!(matches!(
            RenderConfig::from_toml_str("sample_rte = 48000"),
            Err(ConfigError::TomlParse(_))
        ));

        let mut config = RenderConfig::default();
        config.params.insert("CUTOF".into(), 100.0);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::UnknownParameter(name)) if name == "CUTOF"
        ));
    }

    #[test]
    fn out_of_range_settings_are_rejected() {
        let config = RenderConfig {
            block_size: 0,
            ..RenderConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OutOfRange { field: "block_size", .. })
        ));

        let config = RenderConfig {
            notes: vec![NoteConfig {
                length: -1.0,
                ..NoteConfig::new(60)
            }],
            ..RenderConfig::default()
        };
        assert!(config.validate().is_err());

        let config = RenderConfig {
            notes: vec![NoteConfig::new(200)],
            ..RenderConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn params_are_written_and_sanitized() {
        let config = RenderConfig::from_toml_str(EXAMPLE).unwrap();
        let store = ParamStore::new();
        config.apply_params(&store).unwrap();
        assert_eq!(store.get(ParamId::Model), 40.0);
        assert_eq!(store.get(ParamId::Cutoff), 1800.0);
    }

    #[test]
    fn events_are_sorted_with_offs_first() {
        let config = RenderConfig {
            sample_rate: 1000,
            notes: vec![
                NoteConfig {
                    length: 0.5,
                    ..NoteConfig::new(60)
                },
                NoteConfig {
                    start: 0.5,
                    length: 0.25,
                    ..NoteConfig::new(60)
                },
            ],
            ..RenderConfig::default()
        };
        let events = config.events();
        let frames: Vec<usize> = events.iter().map(|e| e.frame).collect();
        assert_eq!(frames, vec![0, 500, 500, 750]);
        assert_eq!(events[1].kind, MidiEventKind::NoteOff { note: 60 });
        assert!(matches!(events[2].kind, MidiEventKind::NoteOn { note: 60, .. }));
        assert_eq!(events[3].at_offset(700).offset, 50);
    }

    #[test]
    fn duration_covers_last_note_and_release() {
        let config = RenderConfig::from_toml_str(EXAMPLE).unwrap();
        assert!((config.duration() - 2.0).abs() < 1e-6);
        assert_eq!(config.total_frames(), 88200);
    }
}
