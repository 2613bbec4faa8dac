//! Low-level DSP primitives used by the render callback.
//!
//! These components are allocation-free and realtime-safe, making them safe to
//! own directly inside the audio callback state.

/// Sine tone with exponential attack/decay envelope.
pub mod tone;

pub use tone::{Tone, ToneConfig, ToneState};
