//! Benchmarks for the envelope oscillator.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use pentaseq::dsp::{Tone, ToneConfig};

use crate::BLOCK_SIZES;

pub fn bench_tone(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/tone");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // Sounding: retriggered every iteration so it never finishes
        let mut tone = Tone::new(ToneConfig::default());
        group.bench_with_input(BenchmarkId::new("active", size), &size, |b, _| {
            b.iter(|| {
                tone.trigger(black_box(130.81));
                tone.render(black_box(&mut buffer));
            })
        });

        // Finished: the silent fast path
        let mut tone = Tone::new(ToneConfig::default());
        group.bench_with_input(BenchmarkId::new("finished", size), &size, |b, _| {
            b.iter(|| {
                tone.render(black_box(&mut buffer));
            })
        });
    }

    group.finish();
}
