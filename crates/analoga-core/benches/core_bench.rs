//! Criterion benchmarks for analoga-core DSP primitives.
//!
//! Run with: cargo bench -p analoga-core
#![allow(missing_docs)]

use analoga_core::{
    AllpassFilter, Biquad, CombFilter, DelayBuffer, Effect, EnvelopeFollower, LadderFilter,
    Oversampler, OversamplingMode, StateVariableFilter, low_shelf_coefficients,
};
use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

const SAMPLE_RATE: f32 = 48000.0;
const BLOCK_SIZES: &[usize] = &[64, 256, 1024];

fn test_signal(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| (std::f32::consts::TAU * 220.0 * i as f32 / SAMPLE_RATE).sin() * 0.5)
        .collect()
}

fn bench_ladder(c: &mut Criterion) {
    let mut group = c.benchmark_group("LadderFilter");
    for &block_size in BLOCK_SIZES {
        let input = test_signal(block_size);
        group.bench_with_input(BenchmarkId::new("process", block_size), &block_size, |b, _| {
            let mut ladder = LadderFilter::new(SAMPLE_RATE);
            ladder.set_cutoff(1500.0);
            ladder.set_resonance(0.6);
            b.iter(|| {
                for &x in &input {
                    black_box(ladder.process(black_box(x)));
                }
            });
        });
    }
    group.finish();
}

fn bench_svf_swept(c: &mut Criterion) {
    let input = test_signal(512);
    c.bench_function("StateVariableFilter/swept_512", |b| {
        let mut svf = StateVariableFilter::new(SAMPLE_RATE);
        let mut flip = false;
        b.iter(|| {
            flip = !flip;
            svf.set_cutoff(if flip { 300.0 } else { 3000.0 });
            for &x in &input {
                black_box(svf.process(black_box(x)));
            }
        });
    });
}

fn bench_oversampler(c: &mut Criterion) {
    let mut group = c.benchmark_group("Oversampler");
    let input = test_signal(512);
    for mode in OversamplingMode::ALL {
        group.bench_function(mode.name(), |b| {
            let mut os = Oversampler::new(mode);
            b.iter(|| {
                for &x in &input {
                    black_box(os.process_with(black_box(x), |s| s.tanh()));
                }
            });
        });
    }
    group.finish();
}

fn bench_reverb_sections(c: &mut Criterion) {
    let input = test_signal(512);
    c.bench_function("Comb+Allpass/512", |b| {
        let mut comb = CombFilter::new(1116);
        comb.set_feedback(0.84);
        comb.set_damp(0.2);
        let mut ap = AllpassFilter::new(556);
        b.iter(|| {
            for &x in &input {
                black_box(ap.process(comb.process(black_box(x))));
            }
        });
    });
}

fn bench_delay_read(c: &mut Criterion) {
    let input = test_signal(512);
    c.bench_function("DelayBuffer/cubic_read_512", |b| {
        let mut line = DelayBuffer::new(48000 * 5);
        b.iter(|| {
            for &x in &input {
                black_box(line.read(black_box(12345.67)));
                line.write(x);
            }
        });
    });
}

fn bench_misc(c: &mut Criterion) {
    let input = test_signal(512);
    c.bench_function("Biquad/low_shelf_512", |b| {
        let mut bq = Biquad::new();
        bq.set(low_shelf_coefficients(200.0, 0.7, 1.5, SAMPLE_RATE));
        b.iter(|| {
            for &x in &input {
                black_box(bq.process(black_box(x)));
            }
        });
    });
    c.bench_function("EnvelopeFollower/512", |b| {
        let mut env = EnvelopeFollower::with_times(SAMPLE_RATE, 5.0, 100.0);
        b.iter(|| {
            for &x in &input {
                black_box(env.process(black_box(x)));
            }
        });
    });
}

criterion_group!(
    benches,
    bench_ladder,
    bench_svf_swept,
    bench_oversampler,
    bench_reverb_sections,
    bench_delay_read,
    bench_misc
);
criterion_main!(benches);
