use serde::Serialize;

/// Progress of a synthesis call, delivered to an optional subscriber
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SynthesisEvent {
    Connected,
    RequestSent { request_id: String },
    /// Front-end metadata frame that was discarded
    Metadata { bytes: usize },
    AudioChunk {
        index: usize,
        bytes: usize,
        total_bytes: usize,
    },
    Completed { chunks: usize, total_bytes: usize },
}
