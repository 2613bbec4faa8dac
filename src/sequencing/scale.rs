#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

use super::notes::A3;

/*
Pentatonic Step Mapping
=======================

A melody step is a selector 0..=6. Degrees 1..=6 walk up a five-note
pentatonic scale from the start note and land on the octave at 6; 0 is the
rest/hold marker and maps to 0 Hz.

  step    major    minor
  ----    -----    -----
   1        +0       +0     root
   2        +2       +3
   3        +4       +5
   4        +7       +7     fifth
   5        +9      +10
   6       +12      +12     octave

Pitch conversion is equal temperament anchored at note 57 = 220 Hz:

    freq = 220 * 2^((note - 57) / 12)

Note number 0 is special-cased to exactly 0.0 so a rest and "note 0" share
the same silent encoding.
*/

/// Which pentatonic flavour a melody is written in.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scale {
    #[default]
    Major,
    Minor,
}

impl Scale {
    /// Decode the file/editor encoding (1 = major, 2 = minor).
    pub fn from_code(code: i64) -> Result<Self> {
        match code {
            1 => Ok(Scale::Major),
            2 => Ok(Scale::Minor),
            other => Err(Error::InvalidScale(other)),
        }
    }

    pub fn code(self) -> u8 {
        match self {
            Scale::Major => 1,
            Scale::Minor => 2,
        }
    }

    /// Semitone offset from the start note for a scale degree.
    ///
    /// Returns `None` for step 0 (rest) and for anything outside 1..=6.
    pub fn degree_offset(self, step: u8) -> Option<i32> {
        let offset = match (step, self) {
            (1, _) => 0,
            (2, Scale::Major) => 2,
            (2, Scale::Minor) => 3,
            (3, Scale::Major) => 4,
            (3, Scale::Minor) => 5,
            (4, _) => 7,
            (5, Scale::Major) => 9,
            (5, Scale::Minor) => 10,
            (6, _) => 12,
            _ => return None,
        };
        Some(offset)
    }

    pub fn toggled(self) -> Self {
        match self {
            Scale::Major => Scale::Minor,
            Scale::Minor => Scale::Major,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Scale::Major => "major",
            Scale::Minor => "minor",
        }
    }
}

/// Highest valid step selector.
pub const MAX_STEP: u8 = 6;

/// Map a step selector to a pitch in Hz.
///
/// Step 0 is 0.0 (the scheduler reads that as "no new attack"). Steps above 6
/// are rejected rather than producing an unset pitch, and so are start notes
/// high enough that the degree's pitch overflows to infinity.
pub fn map_step_to_frequency(step: u8, scale: Scale, start_note: i32) -> Result<f64> {
    if step == 0 {
        return Ok(0.0);
    }
    let offset = scale
        .degree_offset(step)
        .ok_or(Error::InvalidStepValue(step))?;
    let freq = semitone_to_hz(start_note as i64 + offset as i64);
    if freq.is_finite() {
        Ok(freq)
    } else {
        Err(Error::InvalidStartNote(start_note))
    }
}

/// Convert a semitone number to Hz, A3 (57) = 220 Hz.
#[inline]
pub fn note_to_frequency(note: i32) -> f64 {
    semitone_to_hz(note as i64)
}

// Widened so start note + offset and note - 57 never overflow
fn semitone_to_hz(note: i64) -> f64 {
    if note == 0 {
        return 0.0;
    }
    220.0 * 2.0_f64.powf((note - A3 as i64) as f64 / 12.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn reference_note_is_220() {
        assert!((note_to_frequency(57) - 220.0).abs() < 1e-12);
        assert!((note_to_frequency(69) - 440.0).abs() < 1e-9);
    }

    #[test]
    fn note_zero_is_silent() {
        assert_eq!(note_to_frequency(0), 0.0);
    }

    #[test]
    fn step_zero_is_silent() {
        assert_eq!(map_step_to_frequency(0, Scale::Major, 48).unwrap(), 0.0);
        assert_eq!(map_step_to_frequency(0, Scale::Minor, 60).unwrap(), 0.0);
    }

    #[test]
    fn major_and_minor_offsets() {
        let major: Vec<i32> = (1..=6)
            .map(|s| Scale::Major.degree_offset(s).unwrap())
            .collect();
        let minor: Vec<i32> = (1..=6)
            .map(|s| Scale::Minor.degree_offset(s).unwrap())
            .collect();
        assert_eq!(major, [0, 2, 4, 7, 9, 12]);
        assert_eq!(minor, [0, 3, 5, 7, 10, 12]);
    }

    #[test]
    fn c3_major_second_step() {
        let root = map_step_to_frequency(1, Scale::Major, 48).unwrap();
        let second = map_step_to_frequency(2, Scale::Major, 48).unwrap();
        assert!((root - 130.81).abs() < 0.01, "got {root}");
        assert!((second - 146.83).abs() < 0.01, "got {second}");
    }

    #[test]
    fn out_of_range_step_is_an_error() {
        let err = map_step_to_frequency(7, Scale::Major, 48).unwrap_err();
        assert!(matches!(err, Error::InvalidStepValue(7)));
    }

    #[test]
    fn extreme_start_notes_do_not_overflow() {
        assert!(matches!(
            map_step_to_frequency(6, Scale::Major, i32::MAX),
            Err(Error::InvalidStartNote(i32::MAX))
        ));
        // Far below audible: underflows towards 0 Hz rather than wrapping
        let low = map_step_to_frequency(1, Scale::Minor, i32::MIN).unwrap();
        assert!(low >= 0.0 && low < 1e-300);
        assert!(note_to_frequency(i32::MIN) < 1e-300);
        assert_eq!(note_to_frequency(i32::MAX), f64::INFINITY);
    }

    #[test]
    fn scale_codes_round_trip() {
        assert_eq!(Scale::from_code(1).unwrap(), Scale::Major);
        assert_eq!(Scale::from_code(2).unwrap(), Scale::Minor);
        assert_eq!(Scale::Minor.code(), 2);
        assert!(matches!(Scale::from_code(3), Err(Error::InvalidScale(3))));
    }

    fn any_scale() -> impl Strategy<Value = Scale> {
        prop_oneof![Just(Scale::Major), Just(Scale::Minor)]
    }

    proptest! {
        #[test]
        fn mapping_is_strictly_increasing(scale in any_scale(), start in -200i32..200) {
            // note 0 is the silent special case; keep every degree clear of it
            prop_assume!(!(-12..=0).contains(&start));
            let freqs: Vec<f64> = (1..=MAX_STEP)
                .map(|s| map_step_to_frequency(s, scale, start).unwrap())
                .collect();
            for pair in freqs.windows(2) {
                prop_assert!(pair[0] < pair[1]);
            }
        }

        #[test]
        fn mapping_is_deterministic(step in 0u8..=6, scale in any_scale(), start in any::<i16>()) {
            let a = map_step_to_frequency(step, scale, start as i32).ok().map(f64::to_bits);
            let b = map_step_to_frequency(step, scale, start as i32).ok().map(f64::to_bits);
            prop_assert_eq!(a, b);
        }
    }
}
