use super::estimator::estimate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;
use tracing::{debug, warn};

/// A caption line placed on the audio timeline, in seconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtitleTimestamp {
    pub text: String,
    pub start_time: f64,
    pub end_time: f64,
}

impl SubtitleTimestamp {
    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }
}

/// What to do with a mapping entry whose voice index is out of range
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingPolicy {
    /// Skip the entry; its display segment gets no timestamp
    #[default]
    Lenient,
    /// Fail with `InvalidMapping`
    Strict,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReconcileError {
    #[error("invalid mapping: {0}")]
    InvalidMapping(String),

    #[error("{0} display segments but no voice sentences")]
    NoVoiceSentences(usize),

    #[error("audio duration must be positive and finite, got {0}")]
    InvalidDuration(f64),

    #[error("voice sentence {voice_index} has no speaking time but display segments are mapped to it")]
    DegenerateInterval { voice_index: usize },
}

/// Projects voice-sentence timing onto display captions
#[derive(Debug, Clone, Copy, Default)]
pub struct Reconciler {
    policy: MappingPolicy,
}

impl Reconciler {
    pub fn new(policy: MappingPolicy) -> Self {
        Self { policy }
    }

    /// Per-sentence estimates rescaled so they sum to `true_audio_duration`
    ///
    /// Longer sentences absorb proportionally more of any surplus. If every
    /// estimate is zero the duration is spread evenly.
    pub fn adjusted_estimates<S: AsRef<str>>(voice_sentences: &[S], true_audio_duration: f64) -> Vec<f64> {
        let estimates: Vec<f64> = voice_sentences.iter().map(|s| estimate(s.as_ref())).collect();
        let total: f64 = estimates.iter().sum();

        if estimates.is_empty() {
            return estimates;
        }

        if total == 0.0 {
            let even = true_audio_duration / estimates.len() as f64;
            return vec![even; estimates.len()];
        }

        if total > true_audio_duration {
            let scale = true_audio_duration / total;
            estimates.iter().map(|e| e * scale).collect()
        } else if total < true_audio_duration {
            let surplus = true_audio_duration - total;
            estimates.iter().map(|e| e + surplus * (e / total)).collect()
        } else {
            estimates
        }
    }

    /// Place every mapped display segment on the audio timeline
    ///
    /// `mapping` holds `(display_index, voice_index)` pairs. Output is ordered by
    /// voice index, then display index. A voice sentence mapped to K segments is
    /// split into K equal, contiguous sub-intervals.
    pub fn reconcile<S, D>(
        &self,
        voice_sentences: &[S],
        display_segments: &[D],
        mapping: &[(usize, usize)],
        true_audio_duration: f64,
    ) -> Result<Vec<SubtitleTimestamp>, ReconcileError>
    where
        S: AsRef<str>,
        D: AsRef<str>,
    {
        if !true_audio_duration.is_finite() || true_audio_duration <= 0.0 {
            return Err(ReconcileError::InvalidDuration(true_audio_duration));
        }
        if voice_sentences.is_empty() && !display_segments.is_empty() {
            return Err(ReconcileError::NoVoiceSentences(display_segments.len()));
        }

        let groups = self.group_by_voice(voice_sentences.len(), display_segments.len(), mapping)?;

        let adjusted = Self::adjusted_estimates(voice_sentences, true_audio_duration);

        // Sentence boundaries; the last one is pinned to the measured duration
        let mut bounds = Vec::with_capacity(adjusted.len() + 1);
        let mut offset = 0.0;
        bounds.push(offset);
        for span in &adjusted {
            offset += span;
            bounds.push(offset);
        }
        if let Some(last) = bounds.last_mut() {
            *last = true_audio_duration;
        }

        let mut timestamps = Vec::with_capacity(mapping.len());

        for (voice_index, display_indices) in groups {
            let start = bounds[voice_index];
            let end = bounds[voice_index + 1];
            if end - start <= 0.0 {
                return Err(ReconcileError::DegenerateInterval { voice_index });
            }

            let parts = display_indices.len();
            let width = (end - start) / parts as f64;

            debug!(
                "Voice sentence {} spans {:.3}..{:.3}s across {} display segments",
                voice_index, start, end, parts
            );

            for (k, display_index) in display_indices.into_iter().enumerate() {
                let sub_start = start + width * k as f64;
                let sub_end = if k + 1 == parts {
                    end
                } else {
                    start + width * (k + 1) as f64
                };

                timestamps.push(SubtitleTimestamp {
                    text: display_segments[display_index].as_ref().to_string(),
                    start_time: sub_start,
                    end_time: sub_end,
                });
            }
        }

        Ok(timestamps)
    }

    fn group_by_voice(
        &self,
        voice_count: usize,
        display_count: usize,
        mapping: &[(usize, usize)],
    ) -> Result<BTreeMap<usize, Vec<usize>>, ReconcileError> {
        let mut groups: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        let mut seen = HashSet::new();

        for &(display_index, voice_index) in mapping {
            if display_index >= display_count {
                return Err(ReconcileError::InvalidMapping(format!(
                    "display index {} out of range ({} display segments)",
                    display_index, display_count
                )));
            }
            if !seen.insert(display_index) {
                return Err(ReconcileError::InvalidMapping(format!(
                    "display index {} is mapped more than once",
                    display_index
                )));
            }
            if voice_index >= voice_count {
                match self.policy {
                    MappingPolicy::Strict => {
                        return Err(ReconcileError::InvalidMapping(format!(
                            "voice index {} out of range ({} voice sentences)",
                            voice_index, voice_count
                        )));
                    }
                    MappingPolicy::Lenient => {
                        warn!(
                            "Skipping display segment {}: voice index {} out of range",
                            display_index, voice_index
                        );
                        continue;
                    }
                }
            }

            groups.entry(voice_index).or_default().push(display_index);
        }

        for indices in groups.values_mut() {
            indices.sort_unstable();
        }

        Ok(groups)
    }
}
