//! Benchmarks for low-level DSP primitives.

mod tone;

pub use tone::bench_tone;
