//! Property-based tests for the voice engine.

use std::sync::Arc;

use analoga_synth::{
    AdsrEnvelope, MidiEvent, Oscillator, PARAMS, ParamId, ParamStore, SynthEngine, Waveform,
};
use proptest::prelude::*;

const SR: f32 = 48000.0;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn oscillator_phase_and_level_are_bounded(
        waveform in 0i32..5,
        dt in 0.0f32..0.999,
        pulse_width in -1.0f32..2.0,
    ) {
        let waveform = Waveform::from_index(waveform);
        let mut osc = Oscillator::new();
        for _ in 0..2048 {
            let y = osc.next_sample(waveform, dt, pulse_width);
            prop_assert!(y.is_finite() && y.abs() <= 1.0 + 1e-5, "sample {}", y);
            prop_assert!((0.0..1.0).contains(&osc.phase()), "phase {}", osc.phase());
        }
    }

    #[test]
    fn envelope_level_stays_in_unit_range(
        attack in -1.0f32..0.05,
        decay in -1.0f32..0.05,
        sustain in -1.0f32..2.0,
        release in -1.0f32..0.05,
        gate in 1usize..4800,
    ) {
        let mut env = AdsrEnvelope::new(SR);
        env.set_parameters(attack, decay, sustain, release);
        env.note_on(false);
        for _ in 0..gate {
            let level = env.next_value();
            prop_assert!((0.0..=1.0).contains(&level), "gate level {}", level);
        }
        env.note_off();
        for _ in 0..4800 {
            let level = env.next_value();
            prop_assert!((0.0..=1.0).contains(&level), "release level {}", level);
        }
        prop_assert!(!env.is_active());
    }

    #[test]
    fn snapshot_values_are_always_in_range(
        values in prop::collection::vec(prop_oneof![
            any::<f32>(),
            Just(f32::NAN),
            Just(f32::INFINITY),
            -1.0e6f32..1.0e6,
        ], 50),
    ) {
        let store = ParamStore::new();
        for (id, &v) in ParamId::iter().zip(values.iter()) {
            store.set(id, v);
        }
        let snap = store.snapshot();
        for desc in &PARAMS {
            let v = snap.get(desc.id);
            prop_assert!(v >= desc.min && v <= desc.max, "{} = {}", desc.string_id, v);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn engine_output_is_finite_for_any_settings(
        values in prop::collection::vec(0.0f32..=1.0, 50),
        notes in prop::collection::vec(24u8..108, 1..6),
    ) {
        let params = Arc::new(ParamStore::new());
        // Spread each unit value over the parameter's range
        for (desc, &u) in PARAMS.iter().zip(values.iter()) {
            params.set(desc.id, desc.min + u * (desc.max - desc.min));
        }
        let mut engine = SynthEngine::new(Arc::clone(&params));
        engine.prepare(SR, 256);

        let events: Vec<MidiEvent> = notes
            .iter()
            .enumerate()
            .map(|(i, &n)| MidiEvent::note_on(i * 32, n, 100))
            .collect();
        let mut left = vec![0.0f32; 2048];
        let mut right = vec![0.0f32; 2048];
        engine.process(&mut left, &mut right, &events);
        for _ in 0..4 {
            engine.process(&mut left, &mut right, &[]);
            for (&l, &r) in left.iter().zip(right.iter()) {
                prop_assert!(l.is_finite() && r.is_finite());
                prop_assert!(l.abs() < 32.0 && r.abs() < 32.0, "{} {}", l, r);
            }
        }
    }
}
