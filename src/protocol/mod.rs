//! Binary framing for the streaming TTS protocol
//!
//! Every frame is a 4-byte header, an optional signed sequence number and a
//! length-prefixed payload. Encoding and decoding are pure; the session owns
//! all I/O and classification.

mod codec;
mod message;

pub use codec::{decode, encode, MalformedFrame};
pub use message::{Compression, Message, MessageFlag, MessageType, Serialization};

/// Protocol version written into the high nibble of the first header byte
pub const PROTOCOL_VERSION: u8 = 0b0001;

/// Header size in 4-byte words; only the fixed 4-byte header is emitted
pub const HEADER_WORDS: u8 = 0b0001;
