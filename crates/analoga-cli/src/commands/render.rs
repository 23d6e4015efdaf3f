//! Offline render command.

use std::path::PathBuf;

use clap::Args;

use super::common::{parse_key_val, parse_note_list};
use crate::config::{NoteConfig, RenderConfig};
use crate::error::ConfigError;
use crate::render::{linear_to_db, render, write_wav};

/// Note played when neither the config nor `--notes` name any.
const DEFAULT_NOTE: u8 = 69;

#[derive(Args)]
pub struct RenderArgs {
    /// Output WAV file (32-bit float, stereo)
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Render configuration (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Comma-separated MIDI notes started together (e.g. "57,60,64");
    /// replaces the notes from the config
    #[arg(short, long)]
    notes: Option<String>,

    /// Length of each `--notes` note in seconds
    #[arg(short, long)]
    duration: Option<f32>,

    /// Seconds rendered after the last note-off
    #[arg(long)]
    release: Option<f32>,

    /// Sample rate in Hz
    #[arg(long)]
    sample_rate: Option<u32>,

    /// Engine block size
    #[arg(long)]
    block_size: Option<usize>,

    /// Host tempo in BPM
    #[arg(long)]
    bpm: Option<f64>,

    /// Parameter override by text id (e.g. "CUTOFF=1200")
    #[arg(long = "set", value_parser = parse_key_val, number_of_values = 1)]
    set: Vec<(String, f32)>,
}

impl RenderArgs {
    /// Merge the config file (if any) with the command-line overrides.
    fn into_config(self) -> Result<(PathBuf, RenderConfig), ConfigError> {
        let mut config = match &self.config {
            Some(path) => RenderConfig::load(path)?,
            None => RenderConfig::default(),
        };

        if let Some(sample_rate) = self.sample_rate {
            config.sample_rate = sample_rate;
        }
        if let Some(block_size) = self.block_size {
            config.block_size = block_size;
        }
        if let Some(release) = self.release {
            config.release = release;
        }
        if self.bpm.is_some() {
            config.bpm = self.bpm;
        }

        if let Some(notes) = &self.notes {
            let length = self.duration.unwrap_or(1.0);
            config.notes = parse_note_list(notes)?
                .into_iter()
                .map(|note| NoteConfig {
                    length,
                    ..NoteConfig::new(note)
                })
                .collect();
        }
        if config.notes.is_empty() {
            config.notes.push(NoteConfig {
                length: self.duration.unwrap_or(1.0),
                ..NoteConfig::new(DEFAULT_NOTE)
            });
        }

        config.params.extend(self.set);
        Ok((self.output, config))
    }
}

pub fn run(args: RenderArgs) -> anyhow::Result<()> {
    let (output, config) = args.into_config()?;

    println!(
        "Rendering {} note(s), {:.2}s at {} Hz...",
        config.notes.len(),
        config.duration(),
        config.sample_rate
    );
    let buffer = render(&config)?;
    if buffer.is_empty() {
        anyhow::bail!("nothing to render");
    }

    println!("\nStats:");
    println!(
        "  Output: RMS {:.1} dB, Peak {:.1} dB",
        linear_to_db(buffer.rms()),
        linear_to_db(buffer.peak())
    );

    println!("\nWriting {}...", output.display());
    write_wav(&output, &buffer)?;
    println!("Done!");

    Ok(())
}
