//! Render callback - fills the device buffer one frame at a time.

use std::sync::Arc;

use arc_swap::Guard;
use rtrb::Producer;

use crate::dsp::Tone;

use super::{
    scheduler::PlaybackScheduler,
    shared::{PlaybackStatus, SharedState, Snapshot},
};

/// Audio-thread half of the player.
///
/// Owns the tone and scheduler outright; the only shared state it touches is
/// the atomic melody snapshot and play flag. `render` never blocks, allocates,
/// frees or logs: a snapshot it stops using is sent back to the control side
/// to be dropped there.
pub struct Renderer {
    shared: Arc<SharedState>,
    /// Snapshot the scheduler position belongs to
    current: Arc<Snapshot>,
    tone: Tone,
    scheduler: PlaybackScheduler,
    channels: usize,
    status_tx: Producer<PlaybackStatus>,
    audio_tx: Producer<f32>,
    retired_tx: Producer<Arc<Snapshot>>,
}

impl Renderer {
    pub(crate) fn new(
        shared: Arc<SharedState>,
        tone: Tone,
        channels: usize,
        status_tx: Producer<PlaybackStatus>,
        audio_tx: Producer<f32>,
        retired_tx: Producer<Arc<Snapshot>>,
    ) -> Self {
        Self {
            current: shared.load_full(),
            shared,
            tone,
            scheduler: PlaybackScheduler::new(),
            channels: channels.max(1),
            status_tx,
            audio_tx,
            retired_tx,
        }
    }

    /// Switch to the newest published snapshot, if there is one.
    ///
    /// Skipped while the retire queue is full: the old snapshot would have
    /// nowhere to go but a drop on this thread. The switch then happens on a
    /// later buffer.
    fn refresh_snapshot(&mut self) {
        if self.retired_tx.is_full() {
            return;
        }
        let latest = self.shared.load();
        if latest.generation == self.current.generation {
            return;
        }
        let previous = std::mem::replace(&mut self.current, Guard::into_inner(latest));
        // A slot was free and this is the only producer
        let _ = self.retired_tx.push(previous);
        self.scheduler.reset();
    }

    /// Fill an interleaved buffer of `frames * channels` samples.
    ///
    /// Per frame: one tone sample copied to every channel, then one scheduler
    /// step. A newly published melody resets the position before the first
    /// frame, so the buffer never mixes two melodies.
    pub fn render(&mut self, out: &mut [f32]) {
        self.refresh_snapshot();

        let playing = self.shared.is_playing();
        match (&self.current.melody, playing) {
            (Some(melody), true) => {
                self.scheduler.on_session_start(melody, &mut self.tone);

                let mut frames = out.chunks_exact_mut(self.channels);
                for frame in &mut frames {
                    let sample = self.tone.render_sample() as f32;
                    frame.fill(sample);
                    self.scheduler.advance_one_sample(melody, &mut self.tone);

                    // Visualization only; drop when the UI falls behind
                    let _ = self.audio_tx.push(sample);
                }
                frames.into_remainder().fill(0.0);
            }
            (None, _) => {
                out.fill(0.0);
                self.tone.silence();
                self.scheduler.end_session();
            }
            (Some(_), false) => {
                out.fill(0.0);
                self.scheduler.end_session();
            }
        }

        let _ = self.status_tx.push(PlaybackStatus {
            generation: self.current.generation,
            step_index: self.scheduler.step_index(),
            is_playing: playing && self.current.melody.is_some(),
            tone_active: self.tone.is_active(),
            envelope_level: self.tone.envelope_level() as f32,
        });
    }

    pub fn tone(&self) -> &Tone {
        &self.tone
    }

    pub fn scheduler(&self) -> &PlaybackScheduler {
        &self.scheduler
    }

    pub fn channels(&self) -> usize {
        self.channels
    }
}
