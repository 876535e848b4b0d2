//! Streaming speech synthesis
//!
//! This module provides the `SynthesisSession` that drives one request over one
//! connection:
//! - Building the JSON control payload
//! - Sending it as a full-client-request frame
//! - Classifying inbound frames and assembling audio
//! - Reporting progress as `SynthesisEvent`s

mod error;
mod events;
mod request;
mod session;
mod transport;

pub use error::SynthesisError;
pub use events::SynthesisEvent;
pub use request::{cluster_for_voice, SynthesisRequest, DEFAULT_CLUSTER, INSTANT_CLONING_CLUSTER};
pub use session::SynthesisSession;
pub use transport::{FrameTransport, WebSocketTransport};
