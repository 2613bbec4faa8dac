//! Melody text file reader/writer.
//!
//! ```text
//! 120
//! 1
//! 48
//! 1,0,2,0,3,0,4,0,5,0,6,0,1,0,0,0,
//! ```
//!
//! Three newline-terminated integer lines (tempo, scale code, start note)
//! followed by 16 single digits, each followed by a comma. The writer never
//! emits a trailing newline; the reader tolerates trailing whitespace and a
//! missing final comma, and rejects everything else.

use std::{fmt::Write as _, fs, path::Path};

use crate::{
    error::{Error, ParseErrorKind, Result},
    STEPS,
};

use super::{
    melody::Melody,
    scale::{Scale, MAX_STEP},
};

const TEMPO_LINE: usize = 1;
const SCALE_LINE: usize = 2;
const START_NOTE_LINE: usize = 3;
const STEPS_LINE: usize = 4;

/// Parse melody text into a fully derived [`Melody`].
pub fn parse_melody(text: &str) -> Result<Melody> {
    let mut rest = text;

    let tempo = read_int_line(&mut rest, TEMPO_LINE, "tempo")?;
    let scale_code = read_int_line(&mut rest, SCALE_LINE, "scale")?;
    let start_note = read_int_line(&mut rest, START_NOTE_LINE, "start note")?;

    let tempo = u32::try_from(tempo)
        .ok()
        .filter(|&t| t > 0)
        .ok_or_else(|| out_of_range(TEMPO_LINE, "tempo", tempo))?;
    let scale =
        Scale::from_code(scale_code).map_err(|_| out_of_range(SCALE_LINE, "scale", scale_code))?;
    let start_note = i32::try_from(start_note)
        .map_err(|_| out_of_range(START_NOTE_LINE, "start note", start_note))?;

    let steps = read_steps(rest)?;

    Melody::new(tempo, scale, start_note)
        .map_err(|e| match e {
            Error::InvalidStartNote(_) => {
                out_of_range(START_NOTE_LINE, "start note", start_note as i64)
            }
            _ => out_of_range(TEMPO_LINE, "tempo", tempo as i64),
        })?
        .with_steps(steps)
}

/// Render a melody in the file layout.
pub fn serialize_melody(melody: &Melody) -> String {
    let mut out = String::with_capacity(48);
    // Writing to a String cannot fail
    let _ = writeln!(out, "{}", melody.tempo());
    let _ = writeln!(out, "{}", melody.scale().code());
    let _ = writeln!(out, "{}", melody.start_note());
    for step in melody.steps() {
        let _ = write!(out, "{step},");
    }
    out
}

/// Read and parse a melody file.
pub fn load_melody(path: impl AsRef<Path>) -> Result<Melody> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    let melody = parse_melody(&text)?;
    tracing::debug!(path = %path.display(), tempo = melody.tempo(), "loaded melody");
    Ok(melody)
}

/// Write a melody file, replacing any existing one.
pub fn save_melody(path: impl AsRef<Path>, melody: &Melody) -> Result<()> {
    let path = path.as_ref();
    fs::write(path, serialize_melody(melody))?;
    tracing::info!(path = %path.display(), "saved melody");
    Ok(())
}

fn out_of_range(line: usize, field: &'static str, value: i64) -> Error {
    Error::parse(line, ParseErrorKind::OutOfRange { field, value })
}

/// Consume one `\n`-terminated line and parse it as an integer.
fn read_int_line(rest: &mut &str, line: usize, field: &'static str) -> Result<i64> {
    let Some((raw, tail)) = rest.split_once('\n') else {
        return Err(Error::parse(line, ParseErrorKind::MissingLine(field)));
    };
    *rest = tail;

    let value = raw.trim();
    value.parse::<i64>().map_err(|_| {
        Error::parse(
            line,
            ParseErrorKind::NotAnInteger {
                field,
                value: value.to_string(),
            },
        )
    })
}

/// Parse exactly 16 `digit,` pairs.
fn read_steps(text: &str) -> Result<[u8; STEPS]> {
    let err = |kind| Error::parse(STEPS_LINE, kind);
    let mut steps = [0u8; STEPS];
    let mut chars = text.chars().peekable();

    for (index, slot) in steps.iter_mut().enumerate() {
        let c = match chars.next() {
            Some(c) => c,
            None => return Err(err(ParseErrorKind::TooFewSteps(index))),
        };
        let digit = match c.to_digit(10) {
            Some(d) if d <= MAX_STEP as u32 => d as u8,
            Some(_) => return Err(err(ParseErrorKind::StepOutOfRange(c))),
            None if c.is_whitespace() && chars.peek().is_none() => {
                return Err(err(ParseErrorKind::TooFewSteps(index)))
            }
            None => return Err(err(ParseErrorKind::UnexpectedCharacter(c))),
        };
        *slot = digit;

        match chars.next() {
            Some(',') => {}
            // The final comma may be missing at end of input
            None if index == STEPS - 1 => {}
            Some(c) if index == STEPS - 1 && c.is_whitespace() => {}
            Some(c) if c.is_ascii_digit() => return Err(err(ParseErrorKind::ExpectedComma(index))),
            Some(c) if c.is_whitespace() => {
                return Err(err(ParseErrorKind::TooFewSteps(index + 1)))
            }
            Some(c) => return Err(err(ParseErrorKind::UnexpectedCharacter(c))),
            None => return Err(err(ParseErrorKind::TooFewSteps(index + 1))),
        }
    }

    if chars.any(|c| !c.is_whitespace()) {
        return Err(err(ParseErrorKind::TrailingData));
    }
    Ok(steps)
}
