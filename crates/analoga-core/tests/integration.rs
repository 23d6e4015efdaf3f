//! Integration tests for analoga-core DSP primitives.
//!
//! Signal-level checks across modules: filter responses measured with sine
//! sweeps, delay timing, oversampled nonlinear stages, and smoothing timing.

use analoga_core::{
    AllpassFilter, Biquad, CombFilter, DelayBuffer, Effect, EnvelopeFollower, LadderFilter,
    LadderMode, Oversampled, Oversampler, OversamplingMode, SmoothedParam, StateVariableFilter,
    SvfOutput, high_shelf_coefficients, low_shelf_coefficients, lowpass_coefficients,
    quadratic_clip,
};

const SAMPLE_RATE: f32 = 48000.0;
const TAU: f32 = core::f32::consts::TAU;

fn sine(freq_hz: f32, sample_rate: f32, len: usize, amp: f32) -> Vec<f32> {
    (0..len)
        .map(|n| amp * libm::sinf(TAU * freq_hz * n as f32 / sample_rate))
        .collect()
}

fn rms(signal: &[f32]) -> f32 {
    let sum_sq: f32 = signal.iter().map(|&s| s * s).sum();
    libm::sqrtf(sum_sq / signal.len() as f32)
}

fn to_db(linear: f32) -> f32 {
    20.0 * libm::log10f(linear.max(1e-10))
}

/// Steady-state gain in dB of `effect` for a sine at `freq_hz`.
fn response_db<E: Effect>(effect: &mut E, freq_hz: f32, amp: f32) -> f32 {
    effect.reset();
    let input = sine(freq_hz, SAMPLE_RATE, 9600, amp);
    let mut output = vec![0.0; input.len()];
    effect.process_block(&input, &mut output);
    to_db(rms(&output[4800..]) / rms(&input[4800..]))
}

// ============================================================================
// Filters
// ============================================================================

#[test]
fn svf_lowpass_is_12db_per_octave() {
    let mut svf = StateVariableFilter::new(SAMPLE_RATE);
    svf.set_output_type(SvfOutput::Lowpass);
    svf.set_cutoff_immediate(500.0);
    let one_octave = response_db(&mut svf, 4000.0, 0.5);
    let two_octaves = response_db(&mut svf, 8000.0, 0.5);
    let slope = one_octave - two_octaves;
    assert!(
        (slope - 12.0).abs() < 2.0,
        "expected ~12 dB/oct, got {slope:.1} dB"
    );
}

#[test]
fn svf_resonance_peaks_at_cutoff() {
    let mut svf = StateVariableFilter::new(SAMPLE_RATE);
    svf.set_cutoff_immediate(1000.0);
    svf.set_resonance(8.0);
    svf.reset();
    let at_cutoff = response_db(&mut svf, 1000.0, 0.1);
    assert!(at_cutoff > 12.0, "Q=8 should peak well above unity, got {at_cutoff:.1} dB");
}

#[test]
fn ladder_modes_have_expected_shape() {
    let measure = |mode: LadderMode, freq: f32| {
        let mut ladder = LadderFilter::new(SAMPLE_RATE);
        ladder.set_mode(mode);
        ladder.set_cutoff_immediate(1000.0);
        ladder.set_resonance_immediate(0.0);
        response_db(&mut ladder, freq, 0.05)
    };
    assert!(measure(LadderMode::Lpf24, 100.0) > measure(LadderMode::Lpf24, 8000.0) + 40.0);
    assert!(measure(LadderMode::Lpf12, 8000.0) > measure(LadderMode::Lpf24, 8000.0) + 15.0);
    assert!(measure(LadderMode::Hpf24, 8000.0) > measure(LadderMode::Hpf24, 100.0) + 40.0);
    let bp_center = measure(LadderMode::Bpf12, 1000.0);
    assert!(bp_center > measure(LadderMode::Bpf12, 50.0) + 10.0);
    assert!(bp_center > measure(LadderMode::Bpf12, 16000.0) + 10.0);
}

#[test]
fn ladder_at_4x_rate_matches_host_rate_response() {
    let mut host = LadderFilter::new(SAMPLE_RATE);
    host.set_cutoff_immediate(2000.0);
    host.set_resonance_immediate(0.0);
    let host_db = response_db(&mut host, 500.0, 0.05);

    let mut ladder = LadderFilter::new(SAMPLE_RATE * 4.0);
    ladder.set_cutoff_immediate(2000.0);
    ladder.set_resonance_immediate(0.0);
    let mut os = Oversampled::new(ladder, SAMPLE_RATE, OversamplingMode::Iir4x);
    os.inner_mut().set_cutoff_immediate(2000.0);
    let os_db = response_db(&mut os, 500.0, 0.05);
    assert!((host_db - os_db).abs() < 1.0, "host {host_db:.2} dB vs 4x {os_db:.2} dB");
}

#[test]
fn shelves_combine_like_a_tilt_eq() {
    let mut low = Biquad::new();
    low.set(low_shelf_coefficients(200.0, 0.7, 1.5, SAMPLE_RATE));
    let mut high = Biquad::new();
    high.set(high_shelf_coefficients(5000.0, 0.8, 0.8, SAMPLE_RATE));

    let input = sine(40.0, SAMPLE_RATE, 48000, 0.25);
    let out: Vec<f32> = input.iter().map(|&x| high.process(low.process(x))).collect();
    let gain = rms(&out[24000..]) / rms(&input[24000..]);
    assert!((gain - 1.5).abs() < 0.08, "bass gain {gain}");
}

// ============================================================================
// Delay and reverb sections
// ============================================================================

#[test]
fn delay_buffer_impulse_lands_at_requested_delay() {
    let mut line = DelayBuffer::new(1024);
    let delay = 300.0;
    let mut hit = None;
    for n in 0..1000 {
        let x = if n == 0 { 1.0 } else { 0.0 };
        let y = line.read(delay);
        line.write(x);
        if y > 0.5 {
            hit = Some(n);
            break;
        }
    }
    assert_eq!(hit, Some(300));
}

#[test]
fn comb_into_allpass_tail_decays() {
    let mut comb = CombFilter::new(1116);
    comb.set_feedback(0.84);
    comb.set_damp(0.2);
    let mut ap = AllpassFilter::new(556);

    let mut early = 0.0f32;
    let mut late = 0.0f32;
    for n in 0..96000 {
        let x = if n == 0 { 1.0 } else { 0.0 };
        let y = ap.process(comb.process(x));
        if (2000..12000).contains(&n) {
            early += y * y;
        }
        if n >= 86000 {
            late += y * y;
        }
    }
    assert!(early > 0.0);
    assert!(late < early * 1e-3, "tail should decay: early {early} late {late}");
}

// ============================================================================
// Oversampling
// ============================================================================

/// Energy below 2 kHz after clipping a 7 kHz tone hard. Nothing harmonic
/// lives there; at 48 kHz the 7th harmonic (49 kHz) folds down to 1 kHz.
fn alias_energy(mode: OversamplingMode) -> f32 {
    let mut os = Oversampler::new(mode);
    let input = sine(7000.0, SAMPLE_RATE, 9600, 0.9);
    let output: Vec<f32> = input
        .iter()
        .map(|&x| os.process_with(x, |s| quadratic_clip(4.0 * s)))
        .collect();
    let mut lp: [Biquad; 4] = Default::default();
    for section in &mut lp {
        section.set(lowpass_coefficients(2000.0, 0.707, SAMPLE_RATE));
    }
    let band: Vec<f32> = output
        .iter()
        .map(|&x| lp.iter_mut().fold(x, |acc, s| s.process(acc)))
        .collect();
    rms(&band[4800..])
}

#[test]
fn oversampling_reduces_low_band_aliases() {
    let off = alias_energy(OversamplingMode::Off);
    for mode in [OversamplingMode::Iir4x, OversamplingMode::Fir4x] {
        let os = alias_energy(mode);
        assert!(os < off * 0.5, "{}: {os} vs off {off}", mode.name());
    }
}

// ============================================================================
// Smoothing and dynamics
// ============================================================================

#[test]
fn smoothed_param_settles_within_five_time_constants() {
    let mut p = SmoothedParam::with_config(0.0, SAMPLE_RATE, 10.0);
    p.set_target(1.0);
    for _ in 0..(SAMPLE_RATE * 0.05) as usize {
        p.advance();
    }
    assert!((p.get() - 1.0).abs() < 0.01, "got {}", p.get());
}

#[test]
fn envelope_tracks_sine_peak() {
    let mut env = EnvelopeFollower::with_times(SAMPLE_RATE, 1.0, 300.0);
    for x in sine(200.0, SAMPLE_RATE, 9600, 0.5) {
        env.process(x);
    }
    assert!((env.level() - 0.5).abs() < 0.05, "got {}", env.level());
}
