//! Offline rendering through the engine and WAV output.

use std::path::Path;
use std::sync::Arc;

use analoga_synth::{MidiEvent, ParamStore, SynthEngine};
use hound::{SampleFormat, WavSpec, WavWriter};

use crate::config::RenderConfig;
use crate::error::RenderError;

/// Rendered stereo audio.
#[derive(Debug, Clone, Default)]
pub struct StereoBuffer {
    /// Left channel.
    pub left: Vec<f32>,
    /// Right channel.
    pub right: Vec<f32>,
    /// Sample rate in Hz.
    pub sample_rate: u32,
}

impl StereoBuffer {
    /// Frames per channel.
    pub fn len(&self) -> usize {
        self.left.len()
    }

    /// Whether the buffer holds no frames.
    pub fn is_empty(&self) -> bool {
        self.left.is_empty()
    }

    /// Largest absolute sample over both channels.
    pub fn peak(&self) -> f32 {
        self.left
            .iter()
            .chain(self.right.iter())
            .map(|s| s.abs())
            .fold(0.0, f32::max)
    }

    /// RMS over both channels.
    pub fn rms(&self) -> f32 {
        let n = self.left.len() + self.right.len();
        if n == 0 {
            return 0.0;
        }
        let sum: f32 = self.left.iter().chain(self.right.iter()).map(|s| s * s).sum();
        (sum / n as f32).sqrt()
    }
}

/// Render `config` through a fresh engine.
///
/// The engine is driven one `block_size` block at a time, like a host would,
/// with each note event handed over in the block that contains it.
pub fn render(config: &RenderConfig) -> Result<StereoBuffer, RenderError> {
    config.validate()?;

    let params = Arc::new(ParamStore::new());
    config.apply_params(&params)?;

    let mut engine = SynthEngine::new(Arc::clone(&params));
    engine.prepare(config.sample_rate as f32, config.block_size);
    engine.set_host_bpm(config.bpm);

    let total = config.total_frames();
    let events = config.events();
    tracing::info!(
        sample_rate = config.sample_rate,
        block_size = config.block_size,
        frames = total,
        notes = config.notes.len(),
        "rendering"
    );

    let mut out = StereoBuffer {
        left: vec![0.0; total],
        right: vec![0.0; total],
        sample_rate: config.sample_rate,
    };

    let mut block_events: Vec<MidiEvent> = Vec::new();
    let mut next = 0;
    let mut start = 0;
    while start < total {
        let end = (start + config.block_size).min(total);

        block_events.clear();
        while let Some(event) = events.get(next) {
            if event.frame >= end {
                break;
            }
            block_events.push(event.at_offset(start));
            next += 1;
        }

        engine.process(
            &mut out.left[start..end],
            &mut out.right[start..end],
            &block_events,
        );
        start = end;
    }

    if next < events.len() {
        tracing::debug!(dropped = events.len() - next, "events past the end of the render");
    }

    Ok(out)
}

/// Write `buffer` as a 32-bit float stereo WAV file.
pub fn write_wav(path: impl AsRef<Path>, buffer: &StereoBuffer) -> Result<(), RenderError> {
    let path = path.as_ref();
    let spec = WavSpec {
        channels: 2,
        sample_rate: buffer.sample_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };

    let mut writer =
        WavWriter::create(path, spec).map_err(|e| RenderError::write_wav(path, e))?;
    for (&l, &r) in buffer.left.iter().zip(buffer.right.iter()) {
        writer
            .write_sample(l)
            .and_then(|()| writer.write_sample(r))
            .map_err(|e| RenderError::write_wav(path, e))?;
    }
    writer
        .finalize()
        .map_err(|e| RenderError::write_wav(path, e))?;

    tracing::debug!(path = %path.display(), frames = buffer.len(), "wrote WAV");
    Ok(())
}

/// Linear level to dBFS, floored at -120.
pub fn linear_to_db(linear: f32) -> f32 {
    if linear <= 0.0 {
        -120.0
    } else {
        20.0 * linear.log10()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NoteConfig;

    fn short_config() -> RenderConfig {
        RenderConfig {
            block_size: 128,
            release: 0.3,
            notes: vec![NoteConfig {
                length: 0.1,
                ..NoteConfig::new(69)
            }],
            ..RenderConfig::default()
        }
    }

    #[test]
    fn renders_note_then_silence() {
        let buffer = render(&short_config()).unwrap();
        assert_eq!(buffer.len(), 19200);
        assert!(buffer.peak() > 0.01);
        // 200 ms default release, so the last 50 ms are silent
        assert!(buffer.left[16800..].iter().all(|&x| x == 0.0));
    }

    #[test]
    fn block_size_does_not_change_the_result() {
        let a = render(&short_config()).unwrap();
        let b = render(&RenderConfig {
            block_size: 500,
            ..short_config()
        })
        .unwrap();
        assert_eq!(a.left, b.left);
    }

    #[test]
    fn unknown_param_fails_before_rendering() {
        let mut config = short_config();
        config.params.insert("NOT_A_PARAM".into(), 1.0);
        assert!(render(&config).is_err());
    }

    #[test]
    fn wav_round_trip_is_float_stereo() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.wav");
        let buffer = StereoBuffer {
            left: vec![0.25, -0.5],
            right: vec![0.125, 1.0],
            sample_rate: 44100,
        };
        write_wav(&path, &buffer).unwrap();

        let mut reader = hound::WavReader::open(&path).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 2);
        assert_eq!(spec.sample_rate, 44100);
        assert_eq!(spec.sample_format, SampleFormat::Float);
        let samples: Vec<f32> = reader.samples::<f32>().map(Result::unwrap).collect();
        assert_eq!(samples, vec![0.25, 0.125, -0.5, 1.0]);
    }

    #[test]
    fn db_conversion() {
        assert_eq!(linear_to_db(0.0), -120.0);
        assert!((linear_to_db(1.0)).abs() < 1e-6);
        assert!((linear_to_db(0.5) + 6.0206).abs() < 1e-3);
    }
}
