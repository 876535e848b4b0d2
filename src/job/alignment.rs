use crate::audio::AudioFile;
use crate::timing::{MappingPolicy, Reconciler, SubtitleTimestamp};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Inputs for timing display captions against generated speech
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlignmentJob {
    pub voice_sentences: Vec<String>,
    pub display_segments: Vec<String>,
    /// `(display_index, voice_index)` pairs
    pub mapping: Vec<(usize, usize)>,
}

impl AlignmentJob {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read alignment job {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Invalid alignment job {}", path.display()))
    }
}

/// Measure `audio_path` and place every mapped display segment on its timeline
///
/// Any failure aborts the whole job; no partial list is returned.
pub fn subtitle_timestamps(
    job: &AlignmentJob,
    audio_path: impl AsRef<Path>,
    policy: MappingPolicy,
) -> Result<Vec<SubtitleTimestamp>> {
    let audio = AudioFile::probe(audio_path)?;

    let timestamps = Reconciler::new(policy)
        .reconcile(
            &job.voice_sentences,
            &job.display_segments,
            &job.mapping,
            audio.duration_seconds,
        )
        .context("Failed to reconcile subtitle timing")?;

    info!(
        "Timed {} of {} display segments over {:.3}s of audio",
        timestamps.len(),
        job.display_segments.len(),
        audio.duration_seconds
    );

    Ok(timestamps)
}
