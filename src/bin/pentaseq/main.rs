//! pentaseq - Terminal pentatonic melody writer and player
//!
//! Run with: cargo run -- [melody-dir]

mod app;
mod logging;
mod ui;

use std::path::PathBuf;

use app::Pentaseq;
use pentaseq::{dsp::ToneConfig, runtime::AudioConfig, sequencing::library::DEFAULT_MAX_ENTRIES};

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    logging::init()?;

    let melody_dir = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));

    Pentaseq::new()
        .melody_dir(melody_dir)
        .audio(AudioConfig::default())
        .tone(ToneConfig::from_times(pentaseq::SAMPLE_RATE as f64, 0.1, 0.72))
        .max_melodies(DEFAULT_MAX_ENTRIES)
        .run()
}
