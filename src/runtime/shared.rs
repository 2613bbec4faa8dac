//! State shared between the control (UI) thread and the audio thread.
//!
//! Designed for real-time safety: the active melody is an immutable snapshot
//! behind a single atomic pointer, transport is an atomic flag, and feedback
//! to the UI travels through wait-free ring buffers.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use arc_swap::ArcSwap;
use rtrb::Consumer;

use crate::{error::Result, sequencing::Melody};

/// One published melody. Never mutated after publication.
#[derive(Debug)]
pub struct Snapshot {
    /// Bumped on every publish; the audio thread resets its position when it
    /// sees a new value.
    pub generation: u64,
    /// `None` until the first melody is published.
    pub melody: Option<Melody>,
}

/// Lock-free cell read by the audio thread on every buffer.
#[derive(Debug)]
pub struct SharedState {
    pub(super) active: ArcSwap<Snapshot>,
    playing: AtomicBool,
}

impl SharedState {
    pub fn new() -> Self {
        Self {
            active: ArcSwap::from_pointee(Snapshot {
                generation: 0,
                melody: None,
            }),
            playing: AtomicBool::new(false),
        }
    }

    /// Borrow the current snapshot.
    #[inline]
    pub fn load(&self) -> arc_swap::Guard<Arc<Snapshot>> {
        self.active.load()
    }

    pub fn load_full(&self) -> Arc<Snapshot> {
        self.active.load_full()
    }

    #[inline]
    pub fn is_playing(&self) -> bool {
        self.playing.load(Ordering::Acquire)
    }

    fn set_playing(&self, playing: bool) {
        self.playing.store(playing, Ordering::Release);
    }
}

impl Default for SharedState {
    fn default() -> Self {
        Self::new()
    }
}

/// Control-side handle that publishes melodies to the audio thread.
///
/// Snapshots the renderer has let go of come back through `retired_rx` and
/// are dropped here, so the audio thread never frees one.
pub struct MelodyPublisher {
    shared: Arc<SharedState>,
    sample_rate: u32,
    generation: u64,
    retired_rx: Consumer<Arc<Snapshot>>,
}

impl MelodyPublisher {
    pub(crate) fn new(
        shared: Arc<SharedState>,
        sample_rate: u32,
        retired_rx: Consumer<Arc<Snapshot>>,
    ) -> Self {
        Self {
            shared,
            sample_rate,
            generation: 0,
            retired_rx,
        }
    }

    /// Atomically make `melody` the active melody.
    ///
    /// The step length is re-derived for the stream's sample rate first, so a
    /// failure leaves the previously active melody untouched. Playback
    /// restarts from step 0 on the next buffer.
    pub fn publish(&mut self, melody: Melody) -> Result<u64> {
        let melody = melody.with_sample_rate(self.sample_rate)?;
        self.swap_in(Some(melody));
        tracing::info!(generation = self.generation, "published melody");
        Ok(self.generation)
    }

    /// Remove the active melody; the audio thread renders silence.
    pub fn clear(&mut self) {
        self.swap_in(None);
        tracing::info!(generation = self.generation, "cleared active melody");
    }

    fn swap_in(&mut self, melody: Option<Melody>) {
        self.collect_retired();
        self.generation += 1;
        let snapshot = Arc::new(Snapshot {
            generation: self.generation,
            melody,
        });
        // The replaced snapshot is dropped here unless the renderer holds it
        drop(self.shared.active.swap(snapshot));
    }

    /// Drop snapshots the renderer has handed back. Returns how many.
    pub fn collect_retired(&mut self) -> usize {
        let mut count = 0;
        while let Ok(snapshot) = self.retired_rx.pop() {
            drop(snapshot);
            count += 1;
        }
        count
    }

    /// The melody currently visible to the audio thread.
    pub fn active(&self) -> Option<Melody> {
        self.shared.load().melody.clone()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

/// Play/stop control.
#[derive(Clone)]
pub struct Transport {
    shared: Arc<SharedState>,
}

impl Transport {
    pub fn new(shared: Arc<SharedState>) -> Self {
        Self { shared }
    }

    pub fn start_playback(&self) {
        self.shared.set_playing(true);
        tracing::info!("playback started");
    }

    pub fn stop_playback(&self) {
        self.shared.set_playing(false);
        tracing::info!("playback stopped");
    }

    /// Toggle play/stop, returning the new state.
    pub fn toggle(&self) -> bool {
        let playing = !self.shared.is_playing();
        if playing {
            self.start_playback();
        } else {
            self.stop_playback();
        }
        playing
    }

    pub fn is_playing(&self) -> bool {
        self.shared.is_playing()
    }
}

/// Per-buffer update sent from the audio thread (allocation-free, Copy).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PlaybackStatus {
    /// Generation of the melody that was rendered
    pub generation: u64,
    /// Step the scheduler is on after the buffer
    pub step_index: usize,
    /// Whether the buffer was rendered or silenced
    pub is_playing: bool,
    /// Whether the tone is sounding
    pub tone_active: bool,
    /// Envelope gain at the end of the buffer (0.0-1.0)
    pub envelope_level: f32,
}

/// Everything the UI thread holds to drive and observe playback.
pub struct PlaybackController {
    pub publisher: MelodyPublisher,
    pub transport: Transport,
    /// Latest render-side status updates
    pub status_rx: Consumer<PlaybackStatus>,
    /// Rendered mono samples for visualization
    pub audio_rx: Consumer<f32>,
    latest: PlaybackStatus,
}

impl PlaybackController {
    pub(crate) fn new(
        shared: Arc<SharedState>,
        sample_rate: u32,
        status_rx: Consumer<PlaybackStatus>,
        audio_rx: Consumer<f32>,
        retired_rx: Consumer<Arc<Snapshot>>,
    ) -> Self {
        Self {
            publisher: MelodyPublisher::new(shared.clone(), sample_rate, retired_rx),
            transport: Transport::new(shared),
            status_rx,
            audio_rx,
            latest: PlaybackStatus::default(),
        }
    }

    /// Publish a melody and start playing it from the top.
    pub fn play(&mut self, melody: Melody) -> Result<()> {
        self.publisher.publish(melody)?;
        self.transport.start_playback();
        Ok(())
    }

    /// Drain status updates, keeping only the latest. Also releases
    /// snapshots the renderer is done with.
    pub fn poll_status(&mut self) -> PlaybackStatus {
        self.publisher.collect_retired();
        while let Ok(status) = self.status_rx.pop() {
            self.latest = status;
        }
        self.latest
    }

    /// Drain rendered samples into `out`, keeping only the newest `keep`.
    pub fn drain_audio(&mut self, out: &mut Vec<f32>, keep: usize) {
        while let Ok(sample) = self.audio_rx.pop() {
            out.push(sample);
        }
        if out.len() > keep {
            let excess = out.len() - keep;
            out.drain(0..excess);
        }
    }
}
