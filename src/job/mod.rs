//! Caller-facing operations
//!
//! - `generate_audio`: synthesize a script and persist the audio
//! - `subtitle_timestamps`: time display captions against a finished audio file

mod alignment;
mod synthesis;

pub use alignment::{subtitle_timestamps, AlignmentJob};
pub use synthesis::{generate_audio, generate_audio_blocking};
