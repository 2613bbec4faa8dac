//! Benchmarks for the render callback and melody publishing.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use pentaseq::{
    dsp::ToneConfig,
    runtime::{playback_pair, AudioConfig},
    sequencing::parse_melody,
};

use crate::BLOCK_SIZES;

const MELODY: &str = "240\n2\n57\n1,2,3,4,5,6,5,4,3,2,1,0,6,0,3,0,";

pub fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/render");
    let audio = AudioConfig::default();
    let channels = audio.channels as usize;

    for &frames in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; frames * channels];

        let (mut controller, mut renderer) = playback_pair(&audio, ToneConfig::default());
        controller.play(parse_melody(MELODY).expect("valid melody")).expect("publish");
        group.bench_with_input(BenchmarkId::new("playing", frames), &frames, |b, _| {
            b.iter(|| {
                renderer.render(black_box(&mut buffer));
                // Keep the rings from filling so every iteration does the same work
                controller.poll_status();
                while controller.audio_rx.pop().is_ok() {}
            })
        });

        let (controller, mut renderer) = playback_pair(&audio, ToneConfig::default());
        controller.transport.stop_playback();
        group.bench_with_input(BenchmarkId::new("stopped", frames), &frames, |b, _| {
            b.iter(|| {
                renderer.render(black_box(&mut buffer));
            })
        });
    }

    group.finish();
}

pub fn bench_publish(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/publish");
    let audio = AudioConfig::default();
    let (mut controller, _renderer) = playback_pair(&audio, ToneConfig::default());

    group.bench_function("parse_and_publish", |b| {
        b.iter(|| {
            let melody = parse_melody(black_box(MELODY)).expect("valid melody");
            controller.publisher.publish(melody).expect("publish")
        })
    });

    group.finish();
}
