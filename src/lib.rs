pub mod dsp; // Envelope-shaped tone generator
pub mod error;
pub mod runtime; // Scheduler, render callback, audio stream
pub mod sequencing; // Melodies, scales, file format

pub use error::{Error, ParseErrorKind, Result};

/// Output sample rate the player runs at.
pub const SAMPLE_RATE: u32 = 48_000;
/// Interleaved output channels (the mono tone is duplicated to each).
pub const CHANNELS: u16 = 2;
/// Frames requested from the backend per callback.
pub const FRAMES_PER_BUFFER: u32 = 1024;
/// Number of steps in every melody.
pub const STEPS: usize = 16;

pub(crate) const MIN_TIME: f64 = 1.0 / 48_000.0;
