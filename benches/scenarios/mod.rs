//! Scenario benchmarks: the render callback as the audio device drives it,
//! and the control-side publish path.

mod playback;

pub use playback::{bench_publish, bench_render};
