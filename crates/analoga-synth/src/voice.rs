//! Voices and polyphonic voice management.
//!
//! A [`Voice`] is one note: oscillator pair, LFO, ADSR and the oversampled
//! filter chain. [`VoiceManager`] owns a fixed pool, allocates and steals
//! voices, holds released notes while the sustain pedal is down and rolls
//! filter oversampling changes out to voices only while they are silent.

use libm::{sqrtf, tanhf};

use analoga_core::{Effect, LinearSmoothedParam, Noise, OversamplingMode, SyncDivision};

use crate::envelope::AdsrEnvelope;
use crate::filter_chain::FilterChain;
use crate::lfo::{Lfo, LfoSettings, LfoShape, amp_target, modulated_cutoff, pitch_factor};
use crate::oscillator::{OscillatorPair, OscillatorSettings, Waveform, detune_ratio};
use crate::params::{ParamId, ParamSnapshot};

/// Number of voices the engine runs.
pub const DEFAULT_POLYPHONY: usize = 8;

/// LFO → amplitude smoothing time.
const AMP_MOD_SMOOTHING_MS: f32 = 5.0;

/// Voice allocation modes for polyphonic synthesizers.
///
/// A voice already holding the requested note is always retriggered, and a
/// free voice is always preferred; the mode only decides which sounding
/// voice is stolen when the pool is full.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VoiceAllocationMode {
    /// Steal the oldest released voice, else the oldest sounding one.
    #[default]
    OldestReleased,
    /// Cycle through voices in order
    RoundRobin,
    /// Steal the oldest active note
    OldestNote,
    /// Steal the lowest pitch voice
    LowestNote,
    /// Steal the highest pitch voice
    HighestNote,
}

/// Everything a voice reads from the parameter snapshot, resolved once per
/// block.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VoiceParams {
    /// Waveforms, levels, pulse width and noise.
    pub oscillators: OscillatorSettings,
    /// Second oscillator frequency ratio.
    pub detune: f32,
    /// LFO controls.
    pub lfo: LfoSettings,
    /// LFO depth, 0..1.
    pub lfo_depth: f32,
    /// LFO modulates pitch.
    pub lfo_to_pitch: bool,
    /// LFO modulates cutoff.
    pub lfo_to_cutoff: bool,
    /// LFO modulates amplitude.
    pub lfo_to_amp: bool,
    /// Model index.
    pub model: i32,
    /// Filter cutoff in Hz.
    pub cutoff: f32,
    /// Filter resonance, 0.1..0.95.
    pub resonance: f32,
    /// Attack, decay and release in seconds, sustain level.
    pub adsr: (f32, f32, f32, f32),
    /// Keep oscillator and LFO phases running across notes.
    pub free_phase: bool,
    /// Per-note pitch drift.
    pub drift: bool,
    /// Per-voice filter tolerance.
    pub filter_tolerance: bool,
    /// `tanh` on the voice output.
    pub vca_clip: bool,
    /// `sqrt` on the envelope.
    pub analog_env: bool,
    /// Single-trigger envelope.
    pub legato: bool,
    /// Host tempo for LFO sync.
    pub host_bpm: f32,
}

impl Default for VoiceParams {
    fn default() -> Self {
        Self::from_snapshot(&ParamSnapshot::default(), 120.0)
    }
}

impl VoiceParams {
    /// Resolve a snapshot into voice controls.
    pub fn from_snapshot(p: &ParamSnapshot, host_bpm: f32) -> Self {
        let noise_mix = p.flag(ParamId::NoiseOn).then(|| p.get(ParamId::NoiseMix));
        Self {
            oscillators: OscillatorSettings {
                waveform1: Waveform::from_index(p.index(ParamId::Waveform)),
                waveform2: Waveform::from_index(p.index(ParamId::Waveform2)),
                volume1: p.get(ParamId::Osc1Volume),
                volume2: p.get(ParamId::Osc2Volume),
                pulse_width: p.get(ParamId::PulseWidth),
                noise_mix,
            },
            detune: detune_ratio(p.get(ParamId::Osc2Semi), p.get(ParamId::Osc2Fine)),
            lfo: LfoSettings {
                enabled: p.flag(ParamId::LfoOn),
                shape: LfoShape::from_index(p.index(ParamId::LfoShape)),
                rate_hz: p.get(ParamId::LfoRate),
                sync: p
                    .flag(ParamId::LfoSync)
                    .then(|| SyncDivision::from_index(p.index(ParamId::LfoSyncDiv))),
                phase_offset: p.get(ParamId::LfoPhase),
            },
            lfo_depth: p.get(ParamId::LfoDepth),
            lfo_to_pitch: p.flag(ParamId::LfoToPitch),
            lfo_to_cutoff: p.flag(ParamId::LfoToCutoff),
            lfo_to_amp: p.flag(ParamId::LfoToAmp),
            model: p.index(ParamId::Model),
            cutoff: p.get(ParamId::Cutoff),
            resonance: p.get(ParamId::Resonance),
            adsr: (
                p.get(ParamId::Attack),
                p.get(ParamId::Decay),
                p.get(ParamId::Sustain),
                p.get(ParamId::Release),
            ),
            free_phase: p.flag(ParamId::AnaFree),
            drift: p.flag(ParamId::AnaDrift),
            filter_tolerance: p.flag(ParamId::AnaFiltTol),
            vca_clip: p.flag(ParamId::AnaVcaClip),
            analog_env: p.flag(ParamId::AnaEnv),
            legato: p.flag(ParamId::AnaLegato),
            host_bpm,
        }
    }
}

/// One synthesizer voice.
#[derive(Debug, Clone)]
pub struct Voice {
    oscillators: OscillatorPair,
    lfo: Lfo,
    envelope: AdsrEnvelope,
    filter: FilterChain,
    amp_mod: LinearSmoothedParam,
    random: Noise,
    cutoff_tolerance: f32,
    resonance_tolerance: f32,
    note: u8,
    velocity: u8,
    frequency: f32,
    drift: f32,
    key_down: bool,
    sustained: bool,
    age: u64,
    sample_rate: f32,
}

impl Voice {
    /// Silent voice. `seed` feeds its noise source and its tolerance and
    /// drift draws.
    pub fn new(sample_rate: f32, seed: u32) -> Self {
        let mut voice = Self {
            oscillators: OscillatorPair::new(seed.wrapping_mul(0x2545_F491) | 1),
            lfo: Lfo::new(sample_rate),
            envelope: AdsrEnvelope::new(sample_rate),
            filter: FilterChain::new(sample_rate),
            amp_mod: LinearSmoothedParam::with_config(1.0, sample_rate, AMP_MOD_SMOOTHING_MS),
            random: Noise::new(seed),
            cutoff_tolerance: 1.0,
            resonance_tolerance: 1.0,
            note: 0,
            velocity: 0,
            frequency: 0.0,
            drift: 0.0,
            key_down: false,
            sustained: false,
            age: 0,
            sample_rate,
        };
        voice.draw_tolerances();
        voice
    }

    /// Re-rate everything, redraw tolerances and silence the voice.
    pub fn prepare(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.lfo.set_sample_rate(sample_rate);
        self.envelope.set_sample_rate(sample_rate);
        self.filter.set_sample_rate(sample_rate);
        self.amp_mod.set_sample_rate(sample_rate);
        self.amp_mod.set_immediate(1.0);
        self.draw_tolerances();
        self.kill();
    }

    fn draw_tolerances(&mut self) {
        self.cutoff_tolerance = 1.0 + (self.random.next_unit() - 0.5) * 0.04;
        self.resonance_tolerance = 1.0 + (self.random.next_unit() - 0.5) * 0.10;
    }

    /// Start (or restart) a note.
    pub fn start_note(&mut self, note: u8, velocity: u8, params: &VoiceParams) {
        self.envelope.set_parameters(params.adsr.0, params.adsr.1, params.adsr.2, params.adsr.3);
        self.envelope.note_on(params.legato);

        self.note = note;
        self.velocity = velocity;
        self.frequency = midi_to_freq(note);
        self.key_down = true;
        self.sustained = false;

        if !params.free_phase {
            self.oscillators.reset();
            self.lfo.reset();
        }

        self.drift = if params.drift {
            self.random.next_range(-0.001, 0.001)
        } else {
            0.0
        };
    }

    /// Key released. With `hold` the voice keeps sounding until
    /// [`release`](Self::release).
    pub fn key_up(&mut self, hold: bool) {
        self.key_down = false;
        if hold {
            self.sustained = true;
        } else {
            self.release();
        }
    }

    /// Enter the release stage.
    pub fn release(&mut self) {
        self.key_down = false;
        self.sustained = false;
        self.envelope.note_off();
    }

    /// Silence immediately.
    pub fn kill(&mut self) {
        self.envelope.reset();
        self.filter.reset();
        self.key_down = false;
        self.sustained = false;
    }

    /// Whether the envelope is still running.
    pub fn is_active(&self) -> bool {
        self.envelope.is_active()
    }

    /// Sounding after note-off, not held by the pedal.
    pub fn is_releasing(&self) -> bool {
        self.is_active() && !self.key_down && !self.sustained
    }

    /// Held by the sustain pedal after its key was released.
    pub fn is_sustained(&self) -> bool {
        self.sustained
    }

    /// Key is still down.
    pub fn is_key_down(&self) -> bool {
        self.key_down
    }

    /// Current MIDI note.
    pub fn note(&self) -> u8 {
        self.note
    }

    /// Velocity of the current note.
    pub fn velocity(&self) -> u8 {
        self.velocity
    }

    /// Note base frequency in Hz.
    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    /// Drift factor offset of the current note.
    pub fn drift(&self) -> f32 {
        self.drift
    }

    /// Allocation age.
    pub fn age(&self) -> u64 {
        self.age
    }

    /// Set allocation age.
    pub fn set_age(&mut self, age: u64) {
        self.age = age;
    }

    /// Cutoff and resonance tolerance factors drawn at prepare.
    pub fn tolerances(&self) -> (f32, f32) {
        (self.cutoff_tolerance, self.resonance_tolerance)
    }

    /// Filter chain.
    pub fn filter(&self) -> &FilterChain {
        &self.filter
    }

    /// Oscillators.
    pub fn oscillators(&self) -> &OscillatorPair {
        &self.oscillators
    }

    /// Switch filter oversampling. Only done while silent.
    pub fn set_oversampling(&mut self, mode: OversamplingMode) {
        self.filter.set_oversampling(mode);
    }

    /// Block-rate updates: model voicing, filter settings, envelope times.
    pub fn apply_block_params(&mut self, params: &VoiceParams) {
        self.filter.apply_model_profile(params.model);

        let mut cutoff = params.cutoff;
        if params.lfo.enabled && params.lfo_to_cutoff {
            cutoff = modulated_cutoff(cutoff, self.lfo.last(), params.lfo_depth);
        }
        let mut resonance = params.resonance;
        if params.filter_tolerance {
            cutoff *= self.cutoff_tolerance;
            resonance = (resonance * self.resonance_tolerance).clamp(0.0, 1.0);
        }
        self.filter.apply_smoothed_filter_params(cutoff, resonance);

        let (a, d, s, r) = params.adsr;
        self.envelope.set_parameters(a, d, s, r);
    }

    /// Add this voice into both channels.
    pub fn render(&mut self, left: &mut [f32], right: &mut [f32], params: &VoiceParams) {
        if !self.is_active() {
            return;
        }

        let base = self.frequency * (1.0 + self.drift);
        let inv_sr = 1.0 / self.sample_rate;

        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            let lfo = self.lfo.next(&params.lfo, params.host_bpm);
            let freq = if params.lfo_to_pitch {
                base * pitch_factor(lfo, params.lfo_depth)
            } else {
                base
            };

            let osc = self
                .oscillators
                .next(&params.oscillators, freq * inv_sr, params.detune);
            let filtered = self.filter.process(osc);

            let mut env = self.envelope.next_value();
            if params.analog_env {
                env = sqrtf(env);
            }
            let target = if params.lfo.enabled && params.lfo_to_amp {
                amp_target(lfo, params.lfo_depth)
            } else {
                1.0
            };
            self.amp_mod.set_target(target);
            env *= self.amp_mod.advance();

            let mut y = filtered * env;
            if params.vca_clip {
                y = tanhf(y);
            }
            *l += y;
            *r += y;
        }

        if !self.envelope.is_active() {
            self.key_down = false;
            self.sustained = false;
        }
    }
}

/// Where filter oversampling stands across the pool.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OversamplingState {
    /// Not prepared yet.
    #[default]
    Idle,
    /// Some voices still run the previous mode and switch once silent.
    Reconfiguring {
        /// Mode being rolled out.
        target: OversamplingMode,
    },
    /// Every voice runs the current mode.
    Ready,
}

/// Voice manager for polyphonic synthesis.
///
/// Manages a pool of voices and handles note allocation/stealing.
///
/// # Example
///
/// ```rust
/// use analoga_synth::{VoiceManager, VoiceParams};
///
/// let params = VoiceParams::default();
/// let mut manager: VoiceManager<8> = VoiceManager::new(48000.0);
///
/// manager.note_on(60, 100, &params);
/// manager.note_on(64, 100, &params);
/// assert_eq!(manager.active_voice_count(), 2);
///
/// let mut left = [0.0f32; 64];
/// let mut right = [0.0f32; 64];
/// manager.apply_block_params(&params);
/// manager.render(&mut left, &mut right, &params);
/// ```
#[derive(Debug)]
pub struct VoiceManager<const N: usize> {
    voices: [Voice; N],
    allocation_mode: VoiceAllocationMode,
    sample_rate: f32,
    /// Global voice age counter
    age_counter: u64,
    /// Round-robin index
    round_robin_idx: usize,
    sustain: bool,
    oversampling: OversamplingMode,
    oversampling_state: OversamplingState,
}

impl<const N: usize> VoiceManager<N> {
    /// Create a new voice manager with the specified number of voices.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            voices: core::array::from_fn(|i| Voice::new(sample_rate, 0x5EED_0000 + i as u32 * 7919)),
            allocation_mode: VoiceAllocationMode::default(),
            sample_rate,
            age_counter: 0,
            round_robin_idx: 0,
            sustain: false,
            oversampling: OversamplingMode::Off,
            oversampling_state: OversamplingState::Idle,
        }
    }

    /// Re-rate and silence every voice.
    pub fn prepare(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        for voice in &mut self.voices {
            voice.prepare(sample_rate);
            voice.set_oversampling(self.oversampling);
        }
        self.sustain = false;
        self.oversampling_state = OversamplingState::Ready;
    }

    /// Set voice allocation mode.
    pub fn set_allocation_mode(&mut self, mode: VoiceAllocationMode) {
        self.allocation_mode = mode;
    }

    /// Get current allocation mode.
    pub fn allocation_mode(&self) -> VoiceAllocationMode {
        self.allocation_mode
    }

    /// Get number of voices.
    pub fn voice_count(&self) -> usize {
        N
    }

    /// Get number of active voices.
    pub fn active_voice_count(&self) -> usize {
        self.voices.iter().filter(|v| v.is_active()).count()
    }

    /// Get read access to all voices.
    pub fn voices(&self) -> &[Voice; N] {
        &self.voices
    }

    /// Sustain pedal state.
    pub fn sustain(&self) -> bool {
        self.sustain
    }

    /// Requested oversampling mode.
    pub fn oversampling(&self) -> OversamplingMode {
        self.oversampling
    }

    /// Oversampling rollout state.
    pub fn oversampling_state(&self) -> OversamplingState {
        self.oversampling_state
    }

    /// Request an oversampling mode. Call at block boundaries: silent voices
    /// switch now, sounding ones at the first boundary after they fall silent.
    pub fn set_oversampling(&mut self, mode: OversamplingMode) {
        if mode != self.oversampling {
            #[cfg(feature = "tracing")]
            tracing::debug!(
                from = self.oversampling.name(),
                to = mode.name(),
                "filter oversampling change requested"
            );
            self.oversampling = mode;
            self.oversampling_state = OversamplingState::Reconfiguring { target: mode };
        }

        if let OversamplingState::Reconfiguring { target } = self.oversampling_state {
            let mut pending = false;
            for voice in &mut self.voices {
                if voice.filter().oversampling() == target {
                    continue;
                }
                if voice.is_active() {
                    pending = true;
                } else {
                    voice.set_oversampling(target);
                }
            }
            if !pending {
                #[cfg(feature = "tracing")]
                tracing::debug!(mode = target.name(), "filter oversampling ready");
                self.oversampling_state = OversamplingState::Ready;
            }
        }
    }

    /// Trigger a note on.
    pub fn note_on(&mut self, note: u8, velocity: u8, params: &VoiceParams) {
        let idx = self.allocate_voice(note);
        self.age_counter += 1;
        let mode = self.oversampling;
        let voice = &mut self.voices[idx];
        // A retriggered or stolen voice keeps its mode until it falls silent
        if !voice.is_active() && voice.filter().oversampling() != mode {
            voice.set_oversampling(mode);
        }
        voice.set_age(self.age_counter);
        voice.apply_block_params(params);
        voice.start_note(note, velocity, params);
    }

    /// Trigger a note off. With the pedal down the note is held.
    pub fn note_off(&mut self, note: u8) {
        let hold = self.sustain;
        for voice in &mut self.voices {
            if voice.is_active() && voice.is_key_down() && voice.note() == note {
                voice.key_up(hold);
            }
        }
    }

    /// Sustain pedal. Releasing it releases every held note.
    pub fn set_sustain(&mut self, down: bool) {
        self.sustain = down;
        if !down {
            for voice in &mut self.voices {
                if voice.is_sustained() {
                    voice.release();
                }
            }
        }
    }

    /// Release every voice (with tail).
    pub fn all_notes_off(&mut self) {
        self.sustain = false;
        for voice in &mut self.voices {
            if voice.is_active() {
                voice.release();
            }
        }
    }

    /// Silence every voice immediately.
    pub fn reset(&mut self) {
        for voice in &mut self.voices {
            voice.kill();
        }
        self.age_counter = 0;
        self.round_robin_idx = 0;
        self.sustain = false;
    }

    /// Block-rate parameter update for every active voice.
    pub fn apply_block_params(&mut self, params: &VoiceParams) {
        for voice in self.voices.iter_mut().filter(|v| v.is_active()) {
            voice.apply_block_params(params);
        }
    }

    /// Add every active voice into `left`/`right`.
    pub fn render(&mut self, left: &mut [f32], right: &mut [f32], params: &VoiceParams) {
        for voice in &mut self.voices {
            voice.render(left, right, params);
        }
    }

    fn allocate_voice(&mut self, note: u8) -> usize {
        if let Some(i) = self
            .voices
            .iter()
            .position(|v| v.is_active() && v.note() == note)
        {
            return i;
        }

        if let Some(i) = self.voices.iter().position(|v| !v.is_active()) {
            return i;
        }

        // All voices are active, need to steal one
        let oldest = |voices: &[Voice], filter: fn(&Voice) -> bool| {
            voices
                .iter()
                .enumerate()
                .filter(|(_, v)| filter(v))
                .min_by_key(|(_, v)| v.age())
                .map(|(i, _)| i)
        };

        match self.allocation_mode {
            VoiceAllocationMode::OldestReleased => oldest(&self.voices, Voice::is_releasing)
                .or_else(|| oldest(&self.voices, |_| true))
                .unwrap_or(0),
            VoiceAllocationMode::RoundRobin => {
                let idx = self.round_robin_idx;
                self.round_robin_idx = (self.round_robin_idx + 1) % N;
                idx
            }
            VoiceAllocationMode::OldestNote => oldest(&self.voices, |_| true).unwrap_or(0),
            VoiceAllocationMode::LowestNote => self
                .voices
                .iter()
                .enumerate()
                .min_by_key(|(_, v)| v.note())
                .map(|(i, _)| i)
                .unwrap_or(0),
            VoiceAllocationMode::HighestNote => self
                .voices
                .iter()
                .enumerate()
                .max_by_key(|(_, v)| v.note())
                .map(|(i, _)| i)
                .unwrap_or(0),
        }
    }
}

/// Convert MIDI note number to frequency in Hz.
///
/// Uses standard tuning: A4 (note 69) = 440 Hz.
#[inline]
pub fn midi_to_freq(note: u8) -> f32 {
    440.0 * libm::powf(2.0, (f32::from(note) - 69.0) / 12.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: f32 = 48000.0;

    fn render_block(manager: &mut VoiceManager<8>, params: &VoiceParams, n: usize) -> f32 {
        let mut left = [0.0f32; 512];
        let mut right = [0.0f32; 512];
        let n = n.min(512);
        manager.apply_block_params(params);
        manager.render(&mut left[..n], &mut right[..n], params);
        left[..n].iter().map(|x| x.abs()).sum()
    }

    fn prepared() -> VoiceManager<8> {
        let mut m = VoiceManager::new(SR);
        m.prepare(SR);
        m
    }

    #[test]
    fn test_midi_to_freq_a4() {
        let freq = midi_to_freq(69);
        assert!(
            (freq - 440.0).abs() < 0.01,
            "A4 should be 440 Hz, got {}",
            freq
        );
    }

    #[test]
    fn test_midi_to_freq_middle_c() {
        let freq = midi_to_freq(60);
        assert!(
            (freq - 261.63).abs() < 0.1,
            "C4 should be ~261.63 Hz, got {}",
            freq
        );
    }

    #[test]
    fn voice_renders_and_releases() {
        let params = VoiceParams::default();
        let mut voice = Voice::new(SR, 1);
        voice.prepare(SR);
        assert!(!voice.is_active());

        voice.start_note(69, 100, &params);
        voice.apply_block_params(&params);
        let mut l = [0.0f32; 1000];
        let mut r = [0.0f32; 1000];
        voice.render(&mut l, &mut r, &params);
        assert!(l.iter().any(|x| x.abs() > 0.0), "voice should produce output");
        assert_eq!(l, r);

        voice.release();
        assert!(voice.is_releasing());
        for _ in 0..20 {
            voice.render(&mut l, &mut r, &params);
        }
        assert!(!voice.is_active());
    }

    #[test]
    fn tolerances_are_within_range() {
        for seed in 1..50 {
            let (c, r) = Voice::new(SR, seed).tolerances();
            assert!((0.98..=1.02).contains(&c), "{c}");
            assert!((0.95..=1.05).contains(&r), "{r}");
        }
    }

    #[test]
    fn drift_only_when_enabled() {
        let mut params = VoiceParams::default();
        let mut voice = Voice::new(SR, 3);
        voice.start_note(60, 100, &params);
        assert_eq!(voice.drift(), 0.0);
        params.drift = true;
        voice.start_note(60, 100, &params);
        assert!(voice.drift() != 0.0 && voice.drift().abs() <= 0.001);
    }

    #[test]
    fn free_phase_keeps_oscillator_running() {
        let mut params = VoiceParams::default();
        let mut voice = Voice::new(SR, 3);
        voice.prepare(SR);
        voice.start_note(60, 100, &params);
        let mut l = [0.0f32; 100];
        let mut r = [0.0f32; 100];
        voice.render(&mut l, &mut r, &params);
        let phase = voice.oscillators().osc1().phase();
        assert!(phase > 0.0);

        params.free_phase = true;
        voice.start_note(62, 100, &params);
        assert_eq!(voice.oscillators().osc1().phase(), phase);

        params.free_phase = false;
        voice.start_note(64, 100, &params);
        assert_eq!(voice.oscillators().osc1().phase(), 0.0);
    }

    #[test]
    fn same_note_reuses_its_voice() {
        let params = VoiceParams::default();
        let mut m = prepared();
        m.note_on(60, 100, &params);
        m.note_on(60, 100, &params);
        assert_eq!(m.active_voice_count(), 1);
    }

    #[test]
    fn steal_prefers_oldest_released() {
        let params = VoiceParams::default();
        let mut m = prepared();
        for note in 60..68 {
            m.note_on(note, 100, &params);
        }
        assert_eq!(m.active_voice_count(), 8);

        m.note_off(63);
        m.note_off(61);
        m.note_on(80, 100, &params);
        // 61 was allocated before 63
        assert!(m.voices().iter().any(|v| v.note() == 63));
        assert!(!m.voices().iter().any(|v| v.note() == 61));

        // 63 goes next, then the oldest sounding note (60)
        m.note_on(81, 100, &params);
        assert!(!m.voices().iter().any(|v| v.note() == 63));
        m.note_on(82, 100, &params);
        assert!(!m.voices().iter().any(|v| v.note() == 60));
        assert!(m.voices().iter().any(|v| v.note() == 82));
    }

    #[test]
    fn lowest_note_mode_steals_lowest() {
        let params = VoiceParams::default();
        let mut m = prepared();
        m.set_allocation_mode(VoiceAllocationMode::LowestNote);
        for note in [70, 50, 60, 65, 72, 74, 76, 78] {
            m.note_on(note, 100, &params);
        }
        m.note_on(90, 100, &params);
        assert!(!m.voices().iter().any(|v| v.note() == 50));
    }

    #[test]
    fn sustain_pedal_holds_released_notes() {
        let params = VoiceParams::default();
        let mut m = prepared();
        m.set_sustain(true);
        m.note_on(60, 100, &params);
        m.note_off(60);
        for _ in 0..100 {
            render_block(&mut m, &params, 512);
        }
        assert_eq!(m.active_voice_count(), 1);
        assert!(m.voices()[0].is_sustained());

        m.set_sustain(false);
        for _ in 0..100 {
            render_block(&mut m, &params, 512);
        }
        assert_eq!(m.active_voice_count(), 0);
    }

    #[test]
    fn all_notes_off_releases_with_tail() {
        let params = VoiceParams::default();
        let mut m = prepared();
        m.note_on(60, 100, &params);
        m.note_on(64, 100, &params);
        render_block(&mut m, &params, 512);
        m.all_notes_off();
        assert_eq!(m.active_voice_count(), 2);
        assert!(render_block(&mut m, &params, 64) > 0.0);
        for _ in 0..100 {
            render_block(&mut m, &params, 512);
        }
        assert_eq!(m.active_voice_count(), 0);
    }

    #[test]
    fn oversampling_waits_for_silence() {
        let params = VoiceParams::default();
        let mut m = prepared();
        m.note_on(60, 100, &params);
        render_block(&mut m, &params, 512);

        m.set_oversampling(OversamplingMode::Iir2x);
        assert_eq!(
            m.oversampling_state(),
            OversamplingState::Reconfiguring {
                target: OversamplingMode::Iir2x
            }
        );
        let sounding = m.voices().iter().position(Voice::is_active).unwrap();
        assert_eq!(m.voices()[sounding].filter().oversampling(), OversamplingMode::Off);
        // Idle voices switched right away
        assert!(
            m.voices()
                .iter()
                .filter(|v| !v.is_active())
                .all(|v| v.filter().oversampling() == OversamplingMode::Iir2x)
        );

        m.note_off(60);
        for _ in 0..100 {
            render_block(&mut m, &params, 512);
            m.set_oversampling(OversamplingMode::Iir2x);
        }
        assert_eq!(m.oversampling_state(), OversamplingState::Ready);
        assert_eq!(m.voices()[sounding].filter().oversampling(), OversamplingMode::Iir2x);
    }

    #[test]
    fn stolen_voice_keeps_its_mode_until_silent() {
        let params = VoiceParams::default();
        let mut m = prepared();
        for note in 60..68 {
            m.note_on(note, 100, &params);
        }
        m.set_oversampling(OversamplingMode::Fir4x);
        m.note_on(90, 100, &params);
        let stolen = m.voices().iter().position(|v| v.note() == 90).unwrap();
        assert_eq!(m.voices()[stolen].filter().oversampling(), OversamplingMode::Off);
        assert!(matches!(
            m.oversampling_state(),
            OversamplingState::Reconfiguring { .. }
        ));

        m.all_notes_off();
        for _ in 0..100 {
            render_block(&mut m, &params, 512);
            m.set_oversampling(OversamplingMode::Fir4x);
        }
        assert_eq!(m.voices()[stolen].filter().oversampling(), OversamplingMode::Fir4x);
        assert_eq!(m.oversampling_state(), OversamplingState::Ready);
    }

    #[test]
    fn retrigger_during_pending_switch_is_seamless() {
        let params = VoiceParams {
            legato: true,
            free_phase: true,
            ..VoiceParams::default()
        };
        let mut a = prepared();
        let mut b = prepared();
        a.note_on(60, 100, &params);
        b.note_on(60, 100, &params);
        for _ in 0..16 {
            render_block(&mut a, &params, 512);
            render_block(&mut b, &params, 512);
        }

        b.set_oversampling(OversamplingMode::Fir4x);
        a.note_on(60, 100, &params);
        b.note_on(60, 100, &params);
        let voice = b.voices().iter().position(|v| v.note() == 60).unwrap();
        assert_eq!(b.voices()[voice].filter().oversampling(), OversamplingMode::Off);

        let (mut al, mut ar) = ([0.0f32; 256], [0.0f32; 256]);
        let (mut bl, mut br) = ([0.0f32; 256], [0.0f32; 256]);
        a.render(&mut al, &mut ar, &params);
        b.render(&mut bl, &mut br, &params);

        let peak = al.iter().fold(0.0f32, |p, x| p.max(x.abs()));
        assert!(peak > 0.01, "held note went silent: {peak}");
        // Same samples as the manager that never switched
        for (x, y) in al.iter().zip(&bl) {
            assert!((x - y).abs() < 1e-6, "{x} vs {y}");
        }
    }
}
