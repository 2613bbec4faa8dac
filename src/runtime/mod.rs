//! Realtime playback: scheduler, render callback and output stream.
//!
//! [`playback_pair`] splits the player into a control half for the UI thread
//! and a [`Renderer`] that is moved into the audio callback.
//!
//! # Example
//!
//! ```ignore
//! use pentaseq::{runtime::{self, AudioConfig}, dsp::ToneConfig, sequencing::parse_melody};
//!
//! let audio = AudioConfig::default();
//! let (mut controller, renderer) = runtime::playback_pair(&audio, ToneConfig::default());
//! let output = runtime::open_output(audio, renderer)?;
//! controller.play(parse_melody("120\n1\n48\n1,0,2,0,3,0,4,0,5,0,6,0,1,0,0,0,")?)?;
//! ```

pub mod audio;
pub mod renderer;
pub mod scheduler;
pub mod shared;

use std::sync::Arc;

use rtrb::RingBuffer;

use crate::dsp::{Tone, ToneConfig};

pub use audio::{open_output, AudioConfig, AudioOutput};
pub use renderer::Renderer;
pub use scheduler::PlaybackScheduler;
pub use shared::{
    MelodyPublisher, PlaybackController, PlaybackStatus, SharedState, Snapshot, Transport,
};

/// Capacity of the audio -> UI status queue (one entry per buffer).
const STATUS_QUEUE_SIZE: usize = 64;
/// Capacity of the audio -> UI sample ring used for visualization.
const AUDIO_RING_SIZE: usize = 1024 * 16;
/// Capacity of the audio -> control queue of snapshots to drop.
const RETIRED_QUEUE_SIZE: usize = 16;

/// Build the control and audio halves of a player.
///
/// The tone is rendered at the stream's sample rate; a `tone` config made
/// for another rate is rebased onto it.
pub fn playback_pair(audio: &AudioConfig, tone: ToneConfig) -> (PlaybackController, Renderer) {
    let mut tone = tone;
    let sample_rate = audio.sample_rate as f64;
    if tone.sample_rate != sample_rate {
        tracing::warn!(
            "tone configured for {} Hz, rendering at {} Hz",
            tone.sample_rate,
            sample_rate
        );
        tone.sample_rate = sample_rate;
    }

    let shared = Arc::new(SharedState::new());
    let (status_tx, status_rx) = RingBuffer::<PlaybackStatus>::new(STATUS_QUEUE_SIZE);
    let (audio_tx, audio_rx) = RingBuffer::<f32>::new(AUDIO_RING_SIZE);
    let (retired_tx, retired_rx) = RingBuffer::<Arc<Snapshot>>::new(RETIRED_QUEUE_SIZE);

    let controller = PlaybackController::new(
        shared.clone(),
        audio.sample_rate,
        status_rx,
        audio_rx,
        retired_rx,
    );
    let renderer = Renderer::new(
        shared,
        Tone::new(tone),
        audio.channels as usize,
        status_tx,
        audio_tx,
        retired_tx,
    );
    (controller, renderer)
}
