use crate::protocol::{MalformedFrame, MessageType};
use std::time::Duration;
use thiserror::Error;

/// Failures of a synthesis call
///
/// None of these are retried inside the session.
#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("missing credentials: {0} is empty")]
    MissingCredentials(&'static str),

    /// Transport failure, including a rejected handshake
    #[error("connection error: {0}")]
    Connection(String),

    #[error("no frame received within {0:?}")]
    Timeout(Duration),

    #[error("malformed frame: {0}")]
    MalformedFrame(#[from] MalformedFrame),

    /// The server sent an error message or a message type the session does not expect
    #[error("server sent {message_type} message: {}", String::from_utf8_lossy(.payload))]
    Protocol {
        message_type: MessageType,
        payload: Vec<u8>,
    },

    #[error("synthesis finished without audio")]
    EmptyAudio,

    #[error("synthesis cancelled")]
    Cancelled,

    #[error("failed to build request: {0}")]
    Request(#[from] serde_json::Error),
}
