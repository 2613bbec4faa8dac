//! Error types for pentaseq.

use thiserror::Error;

/// Result type alias for pentaseq operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the authoring and playback layers.
///
/// Nothing on the render path returns these; a missed audio deadline is a
/// glitch, not an error.
#[derive(Debug, Error)]
pub enum Error {
    /// Melody text could not be parsed.
    #[error("melody parse error on line {line}: {kind}")]
    Parse { line: usize, kind: ParseErrorKind },

    /// Step value outside the 0..=6 selector range.
    #[error("invalid step value {0} (expected 0-6)")]
    InvalidStepValue(u8),

    /// Step index outside 0..16.
    #[error("invalid step index {0} (expected 0-15)")]
    InvalidStepIndex(usize),

    /// Start note so high its top degree has no finite pitch.
    #[error("invalid start note {0}")]
    InvalidStartNote(i32),

    /// Tempo too slow (or too fast) to produce a whole-sample step length.
    #[error("invalid tempo {0} bpm")]
    InvalidTempo(u32),

    /// Scale code other than 1 (major) or 2 (minor).
    #[error("invalid scale code {0} (expected 1 or 2)")]
    InvalidScale(i64),

    /// Melody names become file names, so they must be plain.
    #[error("invalid melody name {0:?}")]
    InvalidMelodyName(String),

    /// Output device or stream could not be opened.
    #[error("audio backend unavailable: {0}")]
    AudioBackendUnavailable(String),

    /// I/O error (file operations).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// What went wrong while reading a melody file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error("missing {0} line")]
    MissingLine(&'static str),

    #[error("{field} is not an integer: {value:?}")]
    NotAnInteger { field: &'static str, value: String },

    #[error("{field} out of range: {value}")]
    OutOfRange { field: &'static str, value: i64 },

    #[error("step digit {0:?} outside 0-6")]
    StepOutOfRange(char),

    #[error("unexpected character {0:?} in step list")]
    UnexpectedCharacter(char),

    #[error("expected ',' after step {0}")]
    ExpectedComma(usize),

    #[error("expected 16 steps, found {0}")]
    TooFewSteps(usize),

    #[error("unexpected data after the 16th step")]
    TrailingData,
}

impl Error {
    pub(crate) fn parse(line: usize, kind: ParseErrorKind) -> Self {
        Error::Parse { line, kind }
    }
}
