//! Top-level render engine.
//!
//! ```text
//! ParamStore ──snapshot──► voices (8) ──► delay ─► reverb ─► drive ─► console ─► post ─► out
//!                              ▲
//! MidiEvent[] ── split at offsets
//! ```
//!
//! One parameter snapshot is taken per block (or per `max_block` chunk of a
//! longer buffer). Voices render between note events so every event lands on
//! its exact sample. The global stages are allocated in
//! [`prepare`](SynthEngine::prepare); `process` never allocates or locks.

#[cfg(not(feature = "std"))]
extern crate alloc;
#[cfg(feature = "std")]
extern crate std as alloc;

use alloc::sync::Arc;

use analoga_core::{Effect, OversamplingMode, beat_seconds};
use analoga_effects::{
    AnalogueDrive, ConsoleChain, DelayLine, MAX_DELAY_SECONDS, PostStage, Reverb, ReverbType,
};

use crate::params::{ParamId, ParamSnapshot, ParamStore};
use crate::voice::{DEFAULT_POLYPHONY, VoiceManager, VoiceParams};

/// Tempo used until the host reports one.
pub const DEFAULT_BPM: f64 = 120.0;

/// Block size assumed before [`SynthEngine::prepare`].
pub const DEFAULT_MAX_BLOCK: usize = 512;

/// What a [`MidiEvent`] does.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MidiEventKind {
    /// Key pressed.
    NoteOn {
        /// MIDI note number.
        note: u8,
        /// Velocity, accepted but not applied to level.
        velocity: u8,
    },
    /// Key released.
    NoteOff {
        /// MIDI note number.
        note: u8,
    },
    /// Sustain pedal down (`true`) or up.
    Sustain(bool),
    /// Release every sounding note.
    AllNotesOff,
}

/// A note event at a sample offset inside the buffer passed to
/// [`SynthEngine::process`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MidiEvent {
    /// Sample offset from the start of the buffer.
    pub offset: usize,
    /// Event.
    pub kind: MidiEventKind,
}

impl MidiEvent {
    /// Note-on at `offset`.
    pub fn note_on(offset: usize, note: u8, velocity: u8) -> Self {
        Self {
            offset,
            kind: MidiEventKind::NoteOn { note, velocity },
        }
    }

    /// Note-off at `offset`.
    pub fn note_off(offset: usize, note: u8) -> Self {
        Self {
            offset,
            kind: MidiEventKind::NoteOff { note },
        }
    }
}

/// The whole synth: voices plus the global effect chain.
///
/// ```rust
/// use std::sync::Arc;
/// use analoga_synth::{MidiEvent, ParamId, ParamStore, SynthEngine};
///
/// let params = Arc::new(ParamStore::new());
/// params.set(ParamId::Cutoff, 4000.0);
///
/// let mut engine = SynthEngine::new(Arc::clone(&params));
/// engine.prepare(48000.0, 256);
///
/// let mut left = vec![0.0f32; 256];
/// let mut right = vec![0.0f32; 256];
/// engine.process(&mut left, &mut right, &[MidiEvent::note_on(0, 69, 100)]);
/// assert!(left.iter().any(|x| x.abs() > 0.0));
/// ```
#[derive(Debug)]
pub struct SynthEngine {
    params: Arc<ParamStore>,
    voices: VoiceManager<DEFAULT_POLYPHONY>,
    delay: [DelayLine; 2],
    reverb: Reverb,
    drive: AnalogueDrive,
    console: ConsoleChain,
    post: PostStage,
    sample_rate: f32,
    max_block: usize,
    host_bpm: f64,
    last_snapshot: ParamSnapshot,
}

impl SynthEngine {
    /// Engine reading from `params`. Call [`prepare`](Self::prepare) before
    /// processing.
    pub fn new(params: Arc<ParamStore>) -> Self {
        let sample_rate = 48000.0;
        let mut engine = Self {
            params,
            voices: VoiceManager::new(sample_rate),
            delay: [DelayLine::new(), DelayLine::new()],
            reverb: Reverb::new(sample_rate),
            drive: AnalogueDrive::new(sample_rate),
            console: ConsoleChain::new(sample_rate),
            post: PostStage::new(sample_rate),
            sample_rate,
            max_block: DEFAULT_MAX_BLOCK,
            host_bpm: DEFAULT_BPM,
            last_snapshot: ParamSnapshot::default(),
        };
        engine.prepare(sample_rate, DEFAULT_MAX_BLOCK);
        engine
    }

    /// Allocate and clear everything for `sample_rate`; buffers passed to
    /// [`process`](Self::process) are handled in chunks of `max_block`.
    pub fn prepare(&mut self, sample_rate: f32, max_block: usize) {
        #[cfg(feature = "tracing")]
        tracing::debug!(sample_rate, max_block, "engine prepare");

        self.sample_rate = sample_rate;
        self.max_block = max_block.max(1);

        let snapshot = self.params.snapshot();
        self.voices
            .set_oversampling(OversamplingMode::from_index(snapshot.index(ParamId::FilterOs)));
        self.voices.prepare(sample_rate);

        for line in &mut self.delay {
            line.prepare(sample_rate, MAX_DELAY_SECONDS);
        }
        self.reverb = Reverb::new(sample_rate);
        self.drive = AnalogueDrive::new(sample_rate);
        self.console = ConsoleChain::new(sample_rate);
        self.post = PostStage::new(sample_rate);
        self.last_snapshot = snapshot;
    }

    /// Host tempo; `None` (or a non-positive tempo) restores the 120 BPM
    /// default.
    pub fn set_host_bpm(&mut self, bpm: Option<f64>) {
        self.host_bpm = match bpm {
            Some(bpm) if bpm.is_finite() && bpm > 0.0 => bpm,
            _ => DEFAULT_BPM,
        };
    }

    /// Current tempo.
    pub fn host_bpm(&self) -> f64 {
        self.host_bpm
    }

    /// Sample rate from the last prepare.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Shared parameter store.
    pub fn params(&self) -> &Arc<ParamStore> {
        &self.params
    }

    /// Voice pool.
    pub fn voices(&self) -> &VoiceManager<DEFAULT_POLYPHONY> {
        &self.voices
    }

    /// Console chain.
    pub fn console(&self) -> &ConsoleChain {
        &self.console
    }

    /// Snapshot used by the most recent block.
    pub fn last_snapshot(&self) -> &ParamSnapshot {
        &self.last_snapshot
    }

    /// Silence every voice and clear all effect state.
    pub fn reset(&mut self) {
        self.voices.reset();
        for line in &mut self.delay {
            line.reset();
        }
        self.reverb.reset();
        self.drive.reset();
        self.console.reset();
        self.post.reset();
    }

    /// Render into `left`/`right` (overwritten). Event offsets are relative
    /// to the start of the buffers and should be sorted; offsets past the end
    /// land on the last sample.
    pub fn process(&mut self, left: &mut [f32], right: &mut [f32], events: &[MidiEvent]) {
        let len = left.len().min(right.len());
        let (left, right) = (&mut left[..len], &mut right[..len]);
        left.fill(0.0);
        right.fill(0.0);
        if len == 0 {
            let params = VoiceParams::from_snapshot(&self.last_snapshot, self.host_bpm as f32);
            for event in events {
                self.handle_event(event.kind, &params);
            }
            return;
        }

        let mut next_event = 0;
        let mut start = 0;
        while start < len {
            let end = (start + self.max_block).min(len);
            let is_last = end == len;
            next_event = self.process_chunk(
                &mut left[start..end],
                &mut right[start..end],
                start,
                is_last,
                events,
                next_event,
            );
            start = end;
        }
    }

    fn process_chunk(
        &mut self,
        left: &mut [f32],
        right: &mut [f32],
        chunk_start: usize,
        is_last: bool,
        events: &[MidiEvent],
        mut next_event: usize,
    ) -> usize {
        let snapshot = self.params.snapshot();
        let bpm = self.host_bpm as f32;

        self.voices
            .set_oversampling(OversamplingMode::from_index(snapshot.index(ParamId::FilterOs)));

        let voice_params = VoiceParams::from_snapshot(&snapshot, bpm);
        self.voices.apply_block_params(&voice_params);

        let n = left.len();
        let mut pos = 0;
        while let Some(event) = events.get(next_event) {
            let offset = event.offset.saturating_sub(chunk_start);
            if offset >= n && !is_last {
                break;
            }
            let at = offset.clamp(pos, n.saturating_sub(1));
            if at > pos {
                self.voices
                    .render(&mut left[pos..at], &mut right[pos..at], &voice_params);
                pos = at;
            }
            self.handle_event(event.kind, &voice_params);
            next_event += 1;
        }
        self.voices
            .render(&mut left[pos..], &mut right[pos..], &voice_params);

        self.process_global(left, right, &snapshot, bpm);
        self.last_snapshot = snapshot;
        next_event
    }

    fn handle_event(&mut self, kind: MidiEventKind, params: &VoiceParams) {
        match kind {
            MidiEventKind::NoteOn { note, velocity } if velocity > 0 => {
                self.voices.note_on(note, velocity, params);
            }
            MidiEventKind::NoteOn { note, .. } | MidiEventKind::NoteOff { note } => {
                self.voices.note_off(note);
            }
            MidiEventKind::Sustain(down) => self.voices.set_sustain(down),
            MidiEventKind::AllNotesOff => self.voices.all_notes_off(),
        }
    }

    fn process_global(&mut self, left: &mut [f32], right: &mut [f32], p: &ParamSnapshot, bpm: f32) {
        if p.flag(ParamId::DelayOn) {
            let seconds = if p.flag(ParamId::DelaySync) && bpm > 0.0 {
                beat_seconds(bpm)
            } else {
                p.get(ParamId::DelayTime) * 0.001
            };
            for (line, buffer) in self.delay.iter_mut().zip([&mut *left, &mut *right]) {
                line.set_mix(p.get(ParamId::DelayMix));
                line.set_feedback(p.get(ParamId::DelayFb));
                line.set_delay_time(seconds);
                line.process_block(buffer);
            }
        }

        self.reverb.configure(
            ReverbType::from_index(p.index(ParamId::ReverbType)),
            p.get(ParamId::ReverbSize),
        );
        if p.flag(ParamId::ReverbOn) {
            self.reverb.set_mix(p.get(ParamId::ReverbMix));
            self.reverb.process_block_stereo_inplace(left, right);
        }

        if p.flag(ParamId::DriveOn) {
            self.drive.set_amount(p.get(ParamId::DriveAmt));
            self.drive.process_block_stereo_inplace(left, right);
        }

        if p.flag(ParamId::ConsoleOn) {
            self.console.set_mode(p.index(ParamId::ConsoleModel));
            self.console.process_block_stereo_inplace(left, right);
        }

        self.post.set_hum(p.flag(ParamId::HumOn));
        self.post.set_crosstalk(p.flag(ParamId::CrossOn));
        self.post.set_master_gain(p.get(ParamId::MasterGain));
        self.post.process_block_stereo_inplace(left, right);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: f32 = 48000.0;

    fn engine() -> SynthEngine {
        let mut e = SynthEngine::new(Arc::new(ParamStore::new()));
        e.prepare(SR, 256);
        e
    }

    #[test]
    fn silent_without_notes() {
        let mut e = engine();
        let mut l = [1.0f32; 256];
        let mut r = [1.0f32; 256];
        e.process(&mut l, &mut r, &[]);
        assert!(l.iter().chain(r.iter()).all(|&x| x == 0.0));
    }

    #[test]
    fn note_starts_on_its_offset() {
        let mut e = engine();
        let mut l = [0.0f32; 256];
        let mut r = [0.0f32; 256];
        e.process(&mut l, &mut r, &[MidiEvent::note_on(100, 69, 100)]);
        assert!(l[..100].iter().all(|&x| x == 0.0));
        assert!(l[100..].iter().any(|&x| x != 0.0));
    }

    #[test]
    fn long_buffers_are_chunked() {
        let mut e = engine();
        let mut l = vec![0.0f32; 1000];
        let mut r = vec![0.0f32; 1000];
        e.process(&mut l, &mut r, &[MidiEvent::note_on(700, 60, 100)]);
        assert!(l[..700].iter().all(|&x| x == 0.0));
        assert!(l[700..].iter().any(|&x| x != 0.0));
        assert_eq!(e.voices().active_voice_count(), 1);
    }

    #[test]
    fn late_events_land_on_last_sample() {
        let mut e = engine();
        let mut l = [0.0f32; 64];
        let mut r = [0.0f32; 64];
        e.process(&mut l, &mut r, &[MidiEvent::note_on(5000, 60, 100)]);
        assert_eq!(e.voices().active_voice_count(), 1);
    }

    #[test]
    fn zero_velocity_note_on_is_note_off() {
        let mut e = engine();
        let mut l = [0.0f32; 64];
        let mut r = [0.0f32; 64];
        e.process(
            &mut l,
            &mut r,
            &[MidiEvent::note_on(0, 60, 100), MidiEvent::note_on(10, 60, 0)],
        );
        assert!(!e.voices().voices().iter().any(|v| v.is_key_down()));
    }

    #[test]
    fn host_bpm_defaults_to_120() {
        let mut e = engine();
        assert_eq!(e.host_bpm(), 120.0);
        e.set_host_bpm(Some(90.0));
        assert_eq!(e.host_bpm(), 90.0);
        e.set_host_bpm(Some(-1.0));
        assert_eq!(e.host_bpm(), 120.0);
        e.set_host_bpm(None);
        assert_eq!(e.host_bpm(), 120.0);
    }

    #[test]
    fn master_gain_zero_silences() {
        let mut e = engine();
        e.params().set(ParamId::MasterGain, 0.0);
        let mut l = [0.0f32; 256];
        let mut r = [0.0f32; 256];
        e.process(&mut l, &mut r, &[MidiEvent::note_on(0, 69, 100)]);
        assert!(l.iter().all(|&x| x == 0.0));
    }
}
