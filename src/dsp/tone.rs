use std::f64::consts::TAU;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{MIN_TIME, SAMPLE_RATE};

/*
Plucked Tone Generator
======================

One sine oscillator shaped by a two-part exponential envelope. This is the
only sound source in the player: every step that selects a scale degree
retriggers it, and steps of 0 leave it ringing.

Vocabulary
----------

  phase        Where we are in the sine cycle, in radians. Advanced every
               sample by `phase_increment` and wrapped into [0, 2π).

  increment    Radians per sample: 2π · frequency / sample_rate. A negative
               increment is the "finished" marker, so a silent tone costs a
               single comparison per sample.

  attack amp   Starts at 1.0 and decays toward 0. The tone is scaled by
               (1 - attack_amp), which gives a fade-in that approaches 1.

  decay amp    Starts at 1.0 and decays toward 0. The tone is scaled by it
               directly, giving the long exponential tail.


The Shape
---------

  Level
    1.0 ┐
        │   ╭─╮
        │  ╱    ╲__
        │ ╱        ╲___
        │╱              ╲________
    0.0 └──────────────────────────────→ Time
         attack        decay

  out = base_amp · sin(phase) · (1 - attack_amp) · decay_amp

Both amplitudes are one-pole multiplies (amp *= factor), so the curves are
exponential and cost nothing to compute.


Factors From Times
------------------

The factors are expressed as "time to fall by the drop level" (60 dB):

    factor = drop_level ^ (1 / (seconds * sample_rate))

At 48 kHz and 100 ms that gives 0.998562, the default attack factor. The
default decay factor 0.9998 reaches -60 dB after ~0.72 s.


The State Machine
-----------------

    ┌──────────┐  trigger(f)   ┌────────┐
    │ Finished │ ────────────→ │ Active │ ──┐ trigger(f): restart
    └──────────┘               └────────┘ ←─┘
          ↑                        │
          └────────────────────────┘
             decay_amp < drop_level

While Finished, render_sample() returns exactly 0.0 and touches nothing.
*/

/// Marker stored in `phase_increment` once the tone has died away.
const FINISHED: f64 = -1.0;

/// Fixed shaping constants for a [`Tone`].
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToneConfig {
    /// Sample rate the tone is rendered at (Hz).
    pub sample_rate: f64,
    /// Peak output level; 0.5 is -6 dBFS.
    pub base_amplitude: f64,
    /// Per-sample multiplier of the attack amplitude.
    pub attack_factor: f64,
    /// Per-sample multiplier of the decay amplitude.
    pub decay_factor: f64,
    /// Decay amplitude below which the tone is finished (0.001 = -60 dBFS).
    pub drop_level: f64,
}

impl Default for ToneConfig {
    fn default() -> Self {
        Self {
            sample_rate: SAMPLE_RATE as f64,
            base_amplitude: 0.5,
            attack_factor: 0.998562,
            decay_factor: 0.9998,
            drop_level: 0.001,
        }
    }
}

impl ToneConfig {
    /// Derive attack/decay factors from the time each takes to fall by the
    /// default drop level, at any sample rate.
    pub fn from_times(sample_rate: f64, attack_secs: f64, decay_secs: f64) -> Self {
        let defaults = Self::default();
        let drop = defaults.drop_level;
        Self {
            sample_rate,
            attack_factor: factor_for(drop, attack_secs, sample_rate),
            decay_factor: factor_for(drop, decay_secs, sample_rate),
            ..defaults
        }
    }

    pub fn with_drop_level(mut self, drop_level: f64) -> Self {
        self.drop_level = drop_level;
        self
    }
}

fn factor_for(drop_level: f64, seconds: f64, sample_rate: f64) -> f64 {
    let samples = (seconds.max(MIN_TIME) * sample_rate).max(1.0);
    drop_level.powf(1.0 / samples)
}

/// Whether the tone is currently sounding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToneState {
    Active,   // Oscillating, envelope above the drop level
    Finished, // Silent until the next trigger
}

/// A single retriggerable sine voice with attack/decay envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct Tone {
    config: ToneConfig,

    // Oscillator
    frequency: f64,
    phase: f64,
    phase_increment: f64, // FINISHED when silent

    // Envelope
    attack_amp: f64,
    decay_amp: f64,
    attack_factor: f64,
    decay_factor: f64,
}

impl Tone {
    /// A finished (silent) tone.
    pub fn new(config: ToneConfig) -> Self {
        Self {
            config,
            frequency: 0.0,
            phase: 0.0,
            phase_increment: FINISHED,
            attack_amp: 1.0,
            decay_amp: 1.0,
            attack_factor: config.attack_factor,
            decay_factor: config.decay_factor,
        }
    }

    /// Start a fresh note at `frequency` Hz.
    ///
    /// Resets phase and both envelope amplitudes, so retriggering the same
    /// pitch is indistinguishable from the very first trigger. Passing 0 Hz
    /// is left to the caller to avoid; the scheduler never does.
    pub fn trigger(&mut self, frequency: f64) {
        self.frequency = frequency;
        self.phase_increment = TAU * frequency / self.config.sample_rate;
        self.phase = 0.0;
        self.attack_factor = self.config.attack_factor;
        self.decay_factor = self.config.decay_factor;
        self.attack_amp = 1.0;
        self.decay_amp = 1.0;
    }

    /// Produce the next sample. Called once per frame.
    #[inline]
    pub fn render_sample(&mut self) -> f64 {
        if self.phase_increment < 0.0 {
            return 0.0;
        }

        let mut v = self.config.base_amplitude * self.phase.sin();
        v *= 1.0 - self.attack_amp;
        v *= self.decay_amp;

        self.attack_amp *= self.attack_factor;
        self.decay_amp *= self.decay_factor;

        self.phase += self.phase_increment;
        if self.phase >= TAU {
            self.phase %= TAU;
        }

        if self.decay_amp < self.config.drop_level {
            self.phase_increment = FINISHED;
        }

        v
    }

    /// Render a block of mono samples.
    pub fn render(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.render_sample() as f32;
        }
    }

    /// Force the tone silent without waiting for the tail.
    pub fn silence(&mut self) {
        self.phase_increment = FINISHED;
    }

    pub fn state(&self) -> ToneState {
        if self.phase_increment < 0.0 {
            ToneState::Finished
        } else {
            ToneState::Active
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state(), ToneState::Active)
    }

    /// Combined envelope gain (0.0 - 1.0), for visualization.
    pub fn envelope_level(&self) -> f64 {
        if self.is_active() {
            (1.0 - self.attack_amp) * self.decay_amp
        } else {
            0.0
        }
    }

    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    pub fn phase(&self) -> f64 {
        self.phase
    }

    pub fn config(&self) -> &ToneConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f64 = 1_000.0;

    fn test_config() -> ToneConfig {
        ToneConfig::from_times(SAMPLE_RATE, 0.01, 0.1)
    }

    fn render_samples(tone: &mut Tone, samples: usize) -> Vec<f64> {
        (0..samples).map(|_| tone.render_sample()).collect()
    }

    #[test]
    fn default_factors_match_reference_constants() {
        let derived = ToneConfig::from_times(48_000.0, 0.1, 1.0);
        let defaults = ToneConfig::default();
        assert!((derived.attack_factor - defaults.attack_factor).abs() < 1e-6);
        assert_eq!(defaults.decay_factor, 0.9998);
        assert_eq!(defaults.base_amplitude, 0.5);
    }

    #[test]
    fn new_tone_is_silent() {
        let mut tone = Tone::new(test_config());
        assert_eq!(tone.state(), ToneState::Finished);
        assert!(render_samples(&mut tone, 64).iter().all(|&s| s == 0.0));
    }

    #[test]
    fn first_sample_after_trigger_is_zero() {
        let mut tone = Tone::new(test_config());
        tone.trigger(110.0);
        // sin(0) and (1 - attack_amp) are both zero on the first sample
        assert_eq!(tone.render_sample(), 0.0);
        assert!(tone.is_active());
    }

    #[test]
    fn attack_then_decay_shapes_level() {
        let mut tone = Tone::new(ToneConfig::from_times(SAMPLE_RATE, 0.05, 1.0));
        tone.trigger(100.0);
        render_samples(&mut tone, 3);
        let early = tone.envelope_level();
        render_samples(&mut tone, 10);
        let peak_region = tone.envelope_level();
        render_samples(&mut tone, 60);
        let tail = tone.envelope_level();

        assert!(peak_region > early, "attack should ramp up");
        assert!(tail < peak_region, "decay should pull the level down");
    }

    #[test]
    fn output_never_exceeds_base_amplitude() {
        let mut tone = Tone::new(ToneConfig::default());
        tone.trigger(440.0);
        let peak = render_samples(&mut tone, 48_000)
            .into_iter()
            .fold(0.0f64, |acc, s| acc.max(s.abs()));
        assert!(peak > 0.1);
        assert!(peak <= 0.5);
    }

    #[test]
    fn finishes_below_drop_level_and_stays_silent() {
        let mut tone = Tone::new(test_config());
        tone.trigger(50.0);
        // decay reaches -60 dB after 0.1 s = 100 samples
        render_samples(&mut tone, 110);
        assert_eq!(tone.state(), ToneState::Finished);

        let frozen = tone.clone();
        assert!(render_samples(&mut tone, 500).iter().all(|&s| s == 0.0));
        assert_eq!(tone, frozen, "finished tone must not drift");
    }

    #[test]
    fn phase_stays_wrapped() {
        let mut tone = Tone::new(ToneConfig::default().with_drop_level(0.0));
        tone.trigger(997.0);
        for _ in 0..200_000 {
            tone.render_sample();
            assert!((0.0..TAU).contains(&tone.phase()));
        }
    }

    #[test]
    fn retrigger_restores_initial_state() {
        let mut tone = Tone::new(test_config());
        tone.trigger(220.0);
        let fresh = tone.clone();
        render_samples(&mut tone, 37);
        tone.trigger(220.0);
        assert_eq!(tone, fresh);
    }

    #[test]
    fn sine_follows_frequency() {
        let config = ToneConfig::default();
        let mut tone = Tone::new(config);
        tone.trigger(480.0);
        render_samples(&mut tone, 12);
        // 480 Hz at 48 kHz is 100 samples per cycle
        let expected_phase = TAU * 480.0 * 12.0 / 48_000.0;
        assert!((tone.phase() - expected_phase).abs() < 1e-9);
    }
}
