/*
Note Names
==========

Start notes are plain semitone numbers on the MIDI scale. For display we
name them with the usual octave convention: middle C (C4) = 60, so the
default start note 48 reads as C3 and the 220 Hz reference 57 reads as A3.

The formula: note_number = 12 * (octave + 1) + semitone
Where semitone: C=0, C#=1, D=2, D#=3, E=4, F=5, F#=6, G=7, G#=8, A=9, A#=10, B=11

Negative numbers and numbers above 127 are legal start notes (the mapper is
defined for every integer), so octaves are computed with euclidean division.
*/

const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Middle C.
pub const C4: i32 = 60;
/// Reference pitch for frequency conversion (220 Hz).
pub const A3: i32 = 57;
/// Default start note offered by the editor.
pub const C3: i32 = 48;

/// Human-readable name for a semitone number, e.g. `60 -> "C4"`.
pub fn note_name(note: i32) -> String {
    let semitone = note.rem_euclid(12) as usize;
    let octave = note.div_euclid(12) - 1;
    format!("{}{}", NOTE_NAMES[semitone], octave)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn middle_c_is_c4() {
        assert_eq!(note_name(C4), "C4");
    }

    #[test]
    fn reference_is_a3() {
        assert_eq!(note_name(A3), "A3");
    }

    #[test]
    fn sharps_are_named() {
        assert_eq!(note_name(61), "C#4");
        assert_eq!(note_name(70), "A#4");
    }

    #[test]
    fn octaves_are_12_apart() {
        assert_eq!(note_name(C3), "C3");
        assert_eq!(note_name(C3 + 12), "C4");
    }

    #[test]
    fn negative_notes_wrap_octaves() {
        assert_eq!(note_name(0), "C-1");
        assert_eq!(note_name(-1), "B-2");
    }
}
