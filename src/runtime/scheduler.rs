//! Scheduler - sample-accurate step playback
//!
//! The scheduler runs in the audio thread and turns the melody's step grid
//! into retriggers of the tone at exact sample boundaries.

use crate::{dsp::Tone, sequencing::Melody, STEPS};

/// Position within the looping 16-step melody.
///
/// The melody is passed in on every call rather than stored, so the render
/// callback can hand over whichever snapshot it loaded for the buffer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaybackScheduler {
    /// Current step (0..16, wraps)
    step_index: usize,
    /// Samples elapsed within the current step
    samples_into_step: u32,
    /// Whether the opening note of this session has been triggered
    started: bool,
}

impl PlaybackScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Trigger the first step when playback begins from the top.
    ///
    /// Does nothing once the session is under way, or if the position is not
    /// step 0 / sample 0 (a resumed pause keeps the ringing tone).
    pub fn on_session_start(&mut self, melody: &Melody, tone: &mut Tone) {
        if self.started {
            return;
        }
        self.started = true;

        if self.step_index == 0 && self.samples_into_step == 0 {
            let freq = melody.frequency(0);
            if freq != 0.0 {
                tone.trigger(freq);
            }
        }
    }

    /// Advance one sample, retriggering at step boundaries.
    ///
    /// Returns the new step index when a boundary was crossed. A step of 0 Hz
    /// does not retrigger: the previous note keeps ringing through it.
    #[inline]
    pub fn advance_one_sample(&mut self, melody: &Melody, tone: &mut Tone) -> Option<usize> {
        self.samples_into_step += 1;
        if self.samples_into_step < melody.note_duration_samples() {
            return None;
        }

        self.samples_into_step = 0;
        self.step_index = (self.step_index + 1) % STEPS;

        let freq = melody.frequency(self.step_index);
        if freq != 0.0 {
            tone.trigger(freq);
        }
        Some(self.step_index)
    }

    /// Back to the top of the melody; the next session start triggers step 0.
    pub fn reset(&mut self) {
        self.step_index = 0;
        self.samples_into_step = 0;
        self.started = false;
    }

    /// Allow the next [`on_session_start`](Self::on_session_start) to run
    /// again without moving the position.
    pub fn end_session(&mut self) {
        self.started = false;
    }

    pub fn step_index(&self) -> usize {
        self.step_index
    }

    pub fn samples_into_step(&self) -> u32 {
        self.samples_into_step
    }
}
