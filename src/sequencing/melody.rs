#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    SAMPLE_RATE, STEPS,
};

use super::scale::{map_step_to_frequency, Scale, MAX_STEP};

/// Tempo the editor starts from.
pub const DEFAULT_TEMPO: u32 = 120;

/// Samples per step for a tempo, one step being a sixteenth note.
///
/// Both divisions truncate: `sample_rate / floor(tempo * 4 / 60)`. Tempos
/// under 15 bpm have no whole step per second and are rejected, as are tempos
/// so fast a step would be shorter than one sample.
pub fn note_duration_samples(sample_rate: u32, tempo: u32) -> Result<u32> {
    let steps_per_second = (tempo as u64 * 4) / 60;
    if steps_per_second == 0 {
        return Err(Error::InvalidTempo(tempo));
    }
    let samples = sample_rate as u64 / steps_per_second;
    if samples == 0 {
        return Err(Error::InvalidTempo(tempo));
    }
    Ok(samples as u32)
}

/// A 16-step pentatonic melody plus its precomputed playback data.
///
/// `frequencies` and `note_duration_samples` are derived and always kept in
/// sync with the authored fields; every setter recomputes them. The render
/// path only ever sees an immutable copy.
///
/// With the `serde` feature only the authored fields are stored; the rest is
/// rebuilt (and validated) on the way back in.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "MelodyData", into = "MelodyData"))]
#[derive(Debug, Clone, PartialEq)]
pub struct Melody {
    tempo: u32,
    scale: Scale,
    start_note: i32,
    steps: [u8; STEPS],

    // Derived
    frequencies: [f64; STEPS],
    note_duration_samples: u32,
    sample_rate: u32,
}

impl Melody {
    /// An all-rest melody at the default output sample rate.
    pub fn new(tempo: u32, scale: Scale, start_note: i32) -> Result<Self> {
        check_start_note(scale, start_note)?;
        Ok(Self {
            tempo,
            scale,
            start_note,
            steps: [0; STEPS],
            frequencies: [0.0; STEPS],
            note_duration_samples: note_duration_samples(SAMPLE_RATE, tempo)?,
            sample_rate: SAMPLE_RATE,
        })
    }

    /// Replace every step at once.
    pub fn with_steps(mut self, steps: [u8; STEPS]) -> Result<Self> {
        if let Some(&bad) = steps.iter().find(|&&s| s > MAX_STEP) {
            return Err(Error::InvalidStepValue(bad));
        }
        self.steps = steps;
        self.recompute_frequencies();
        Ok(self)
    }

    /// Re-derive the step length for another sample rate.
    pub fn with_sample_rate(mut self, sample_rate: u32) -> Result<Self> {
        self.note_duration_samples = note_duration_samples(sample_rate, self.tempo)?;
        self.sample_rate = sample_rate;
        Ok(self)
    }

    pub fn set_step(&mut self, index: usize, step: u8) -> Result<()> {
        let frequency = map_step_to_frequency(step, self.scale, self.start_note)?;
        match (self.steps.get_mut(index), self.frequencies.get_mut(index)) {
            (Some(slot), Some(freq)) => {
                *slot = step;
                *freq = frequency;
                Ok(())
            }
            _ => Err(Error::InvalidStepIndex(index)),
        }
    }

    pub fn set_tempo(&mut self, tempo: u32) -> Result<()> {
        self.note_duration_samples = note_duration_samples(self.sample_rate, tempo)?;
        self.tempo = tempo;
        Ok(())
    }

    pub fn set_scale(&mut self, scale: Scale) {
        self.scale = scale;
        self.recompute_frequencies();
    }

    pub fn set_start_note(&mut self, start_note: i32) -> Result<()> {
        check_start_note(self.scale, start_note)?;
        self.start_note = start_note;
        self.recompute_frequencies();
        Ok(())
    }

    // Steps and start note are validated on the way in, so every step maps.
    fn recompute_frequencies(&mut self) {
        for (freq, &step) in self.frequencies.iter_mut().zip(self.steps.iter()) {
            *freq = map_step_to_frequency(step, self.scale, self.start_note).unwrap_or(0.0);
        }
    }

    pub fn tempo(&self) -> u32 {
        self.tempo
    }

    pub fn scale(&self) -> Scale {
        self.scale
    }

    pub fn start_note(&self) -> i32 {
        self.start_note
    }

    pub fn steps(&self) -> &[u8; STEPS] {
        &self.steps
    }

    /// Selector at `index`. Indices wrap modulo 16, like playback does.
    pub fn step(&self, index: usize) -> u8 {
        self.steps[index % STEPS]
    }

    pub fn frequencies(&self) -> &[f64; STEPS] {
        &self.frequencies
    }

    /// Pitch of a step in Hz (0.0 for rest/hold steps). Indices wrap modulo 16.
    #[inline]
    pub fn frequency(&self, index: usize) -> f64 {
        self.frequencies[index % STEPS]
    }

    /// Length of one step in samples.
    #[inline]
    pub fn note_duration_samples(&self) -> u32 {
        self.note_duration_samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Samples in one full pass over all 16 steps.
    pub fn loop_samples(&self) -> u64 {
        self.note_duration_samples as u64 * STEPS as u64
    }
}

/// The top degree is the highest pitch a start note produces, and both
/// scales share it.
fn check_start_note(scale: Scale, start_note: i32) -> Result<()> {
    map_step_to_frequency(MAX_STEP, scale, start_note).map(|_| ())
}

/// Authored fields of a [`Melody`], as stored by serde.
#[cfg(feature = "serde")]
#[derive(Serialize, Deserialize)]
struct MelodyData {
    tempo: u32,
    scale: Scale,
    start_note: i32,
    steps: [u8; STEPS],
}

#[cfg(feature = "serde")]
impl TryFrom<MelodyData> for Melody {
    type Error = Error;

    fn try_from(data: MelodyData) -> Result<Self> {
        Melody::new(data.tempo, data.scale, data.start_note)?.with_steps(data.steps)
    }
}

#[cfg(feature = "serde")]
impl From<Melody> for MelodyData {
    fn from(melody: Melody) -> Self {
        Self {
            tempo: melody.tempo,
            scale: melody.scale,
            start_note: melody.start_note,
            steps: melody.steps,
        }
    }
}

impl Default for Melody {
    fn default() -> Self {
        Self {
            tempo: DEFAULT_TEMPO,
            scale: Scale::Major,
            start_note: super::notes::C3,
            steps: [0; STEPS],
            frequencies: [0.0; STEPS],
            note_duration_samples: SAMPLE_RATE / 8,
            sample_rate: SAMPLE_RATE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_length_at_120_bpm() {
        // 120 * 4 / 60 = 8 steps per second
        assert_eq!(note_duration_samples(48_000, 120).unwrap(), 6000);
    }

    #[test]
    fn step_length_truncates_at_90_bpm() {
        // 90 * 4 / 60 = 6 (integer), so 48000 / 6
        assert_eq!(note_duration_samples(48_000, 90).unwrap(), 8000);
        // 100 * 4 / 60 = 6.67 truncates to 6 as well
        assert_eq!(note_duration_samples(48_000, 100).unwrap(), 8000);
    }

    #[test]
    fn tempo_below_fifteen_is_rejected() {
        assert!(matches!(note_duration_samples(48_000, 14), Err(Error::InvalidTempo(14))));
        assert!(matches!(note_duration_samples(48_000, 0), Err(Error::InvalidTempo(0))));
        assert_eq!(note_duration_samples(48_000, 15).unwrap(), 48_000);
    }

    #[test]
    fn default_matches_new() {
        assert_eq!(Melody::default(), Melody::new(120, Scale::Major, 48).unwrap());
    }

    #[test]
    fn frequencies_follow_steps() {
        let mut melody = Melody::new(120, Scale::Major, 48).unwrap();
        melody.set_step(3, 4).unwrap();
        assert_eq!(melody.step(3), 4);
        let expected = map_step_to_frequency(4, Scale::Major, 48).unwrap();
        assert_eq!(melody.frequency(3), expected);
        assert_eq!(melody.frequency(2), 0.0);
    }

    #[test]
    fn scale_change_recomputes_frequencies() {
        let mut melody = Melody::new(120, Scale::Major, 60)
            .unwrap()
            .with_steps([2; STEPS])
            .unwrap();
        let major = melody.frequency(0);
        melody.set_scale(Scale::Minor);
        assert!(melody.frequency(0) > major);
        assert_eq!(melody.frequency(0), map_step_to_frequency(2, Scale::Minor, 60).unwrap());
    }

    #[test]
    fn start_note_change_recomputes_frequencies() {
        let mut melody = Melody::new(120, Scale::Major, 48)
            .unwrap()
            .with_steps([1; STEPS])
            .unwrap();
        melody.set_start_note(60).unwrap();
        assert!((melody.frequency(7) - 261.63).abs() < 0.01);
    }

    #[test]
    fn tempo_change_recomputes_duration() {
        let mut melody = Melody::default();
        melody.set_tempo(90).unwrap();
        assert_eq!(melody.note_duration_samples(), 8000);
        assert!(melody.set_tempo(10).is_err());
        assert_eq!(melody.tempo(), 90, "failed update leaves tempo untouched");
    }

    #[test]
    fn invalid_step_is_rejected() {
        let mut melody = Melody::default();
        assert!(matches!(melody.set_step(0, 7), Err(Error::InvalidStepValue(7))));
        assert_eq!(melody.step(0), 0);

        let mut steps = [0; STEPS];
        steps[15] = 9;
        assert!(matches!(Melody::default().with_steps(steps), Err(Error::InvalidStepValue(9))));
    }

    #[test]
    fn out_of_range_index_is_an_error() {
        let mut melody = Melody::default();
        assert!(matches!(melody.set_step(STEPS, 1), Err(Error::InvalidStepIndex(16))));
        assert_eq!(melody.steps(), &[0; STEPS]);
        // Reads wrap the way the scheduler does
        melody.set_step(0, 3).unwrap();
        assert_eq!(melody.step(STEPS), 3);
        assert_eq!(melody.frequency(STEPS), melody.frequency(0));
    }

    #[test]
    fn unplayable_start_note_is_rejected() {
        assert!(matches!(
            Melody::new(120, Scale::Major, i32::MAX),
            Err(Error::InvalidStartNote(i32::MAX))
        ));

        let mut melody = Melody::default().with_steps([6; STEPS]).unwrap();
        assert!(melody.set_start_note(i32::MAX - 5).is_err());
        assert_eq!(melody.start_note(), 48, "failed update leaves start note untouched");

        // Very low notes are inaudible but well defined
        melody.set_start_note(i32::MIN).unwrap();
        assert!(melody.frequencies().iter().all(|f| *f >= 0.0 && f.is_finite()));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_stores_authored_fields_only() {
        let melody = Melody::new(90, Scale::Minor, 57)
            .unwrap()
            .with_steps([1, 0, 2, 0, 3, 0, 4, 0, 5, 0, 6, 0, 1, 0, 0, 0])
            .unwrap();
        let json = serde_json::to_value(&melody).unwrap();
        assert!(json.get("frequencies").is_none());
        assert_eq!(serde_json::from_value::<Melody>(json).unwrap(), melody);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_rejects_invalid_melodies() {
        let bad_step = r#"{"tempo":120,"scale":"Major","start_note":48,"steps":[9,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0]}"#;
        assert!(serde_json::from_str::<Melody>(bad_step).is_err());

        let bad_tempo = r#"{"tempo":5,"scale":"Major","start_note":48,"steps":[0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0]}"#;
        assert!(serde_json::from_str::<Melody>(bad_tempo).is_err());

        // Derived fields in the input are not trusted
        let forged = r#"{"tempo":120,"scale":"Major","start_note":48,"steps":[1,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0],"frequencies":[1.0,1.0,1.0,1.0,1.0,1.0,1.0,1.0,1.0,1.0,1.0,1.0,1.0,1.0,1.0,1.0]}"#;
        let melody: Melody = serde_json::from_str(forged).unwrap();
        assert!((melody.frequency(0) - 130.81).abs() < 0.01);
        assert_eq!(melody.frequency(1), 0.0);
    }

    #[test]
    fn sample_rate_rederives_duration() {
        let melody = Melody::default().with_sample_rate(1_000).unwrap();
        assert_eq!(melody.note_duration_samples(), 125);
        assert_eq!(melody.loop_samples(), 2_000);
    }
}
