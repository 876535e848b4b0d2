use std::fmt;

/// Kind of a protocol message (high nibble of header byte 1)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    Invalid,
    /// Client control message carrying a JSON request
    FullClientRequest,
    AudioOnlyClient,
    FullServerResponse,
    /// Raw audio bytes from the server
    AudioOnlyServer,
    /// Alignment hints and other front-end metadata; never needed for audio assembly
    FrontEndResultServer,
    /// Diagnostic payload; receipt is a terminal failure
    Error,
}

impl MessageType {
    pub fn to_nibble(self) -> u8 {
        match self {
            Self::Invalid => 0b0000,
            Self::FullClientRequest => 0b0001,
            Self::AudioOnlyClient => 0b0010,
            Self::FullServerResponse => 0b1001,
            Self::AudioOnlyServer => 0b1011,
            Self::FrontEndResultServer => 0b1100,
            Self::Error => 0b1111,
        }
    }

    pub fn from_nibble(value: u8) -> Option<Self> {
        match value {
            0b0000 => Some(Self::Invalid),
            0b0001 => Some(Self::FullClientRequest),
            0b0010 => Some(Self::AudioOnlyClient),
            0b1001 => Some(Self::FullServerResponse),
            0b1011 => Some(Self::AudioOnlyServer),
            0b1100 => Some(Self::FrontEndResultServer),
            0b1111 => Some(Self::Error),
            _ => None,
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Invalid => "invalid",
            Self::FullClientRequest => "full-client-request",
            Self::AudioOnlyClient => "audio-only-client",
            Self::FullServerResponse => "full-server-response",
            Self::AudioOnlyServer => "audio-only-server",
            Self::FrontEndResultServer => "front-end-result-server",
            Self::Error => "error",
        };
        f.write_str(name)
    }
}

/// Sequencing/event semantics of a message (low nibble of header byte 1)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageFlag {
    NoSequence,
    PositiveSequence,
    LastNoSequence,
    NegativeSequence,
    WithEvent,
}

impl MessageFlag {
    pub fn to_nibble(self) -> u8 {
        match self {
            Self::NoSequence => 0b0000,
            Self::PositiveSequence => 0b0001,
            Self::LastNoSequence => 0b0010,
            Self::NegativeSequence => 0b0011,
            Self::WithEvent => 0b0100,
        }
    }

    pub fn from_nibble(value: u8) -> Option<Self> {
        match value {
            0b0000 => Some(Self::NoSequence),
            0b0001 => Some(Self::PositiveSequence),
            0b0010 => Some(Self::LastNoSequence),
            0b0011 => Some(Self::NegativeSequence),
            0b0100 => Some(Self::WithEvent),
            _ => None,
        }
    }

    /// Whether a 4-byte sequence number follows the header
    pub fn is_sequenced(self) -> bool {
        matches!(self, Self::PositiveSequence | Self::NegativeSequence)
    }
}

/// Payload serialization method (high nibble of header byte 2)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Serialization {
    Raw,
    Json,
}

impl Serialization {
    pub fn to_nibble(self) -> u8 {
        match self {
            Self::Raw => 0b0000,
            Self::Json => 0b0001,
        }
    }
}

/// Payload compression method (low nibble of header byte 2)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    None,
}

impl Compression {
    pub fn to_nibble(self) -> u8 {
        match self {
            Self::None => 0b0000,
        }
    }
}

/// A single protocol message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub message_type: MessageType,
    pub flag: MessageFlag,

    /// Only meaningful when `flag.is_sequenced()`; zero otherwise
    pub sequence: i32,

    pub payload: Vec<u8>,
}

impl Message {
    /// Unsequenced message
    pub fn new(message_type: MessageType, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            message_type,
            flag: MessageFlag::NoSequence,
            sequence: 0,
            payload: payload.into(),
        }
    }

    /// Sequenced message; the flag follows the sign of `sequence`
    pub fn sequenced(message_type: MessageType, sequence: i32, payload: impl Into<Vec<u8>>) -> Self {
        let flag = if sequence < 0 {
            MessageFlag::NegativeSequence
        } else {
            MessageFlag::PositiveSequence
        };

        Self {
            message_type,
            flag,
            sequence,
            payload: payload.into(),
        }
    }

    /// A negative sequence marks the last frame of a response stream
    pub fn is_final(&self) -> bool {
        self.flag.is_sequenced() && self.sequence < 0
    }

    /// Payload as text, for diagnostics
    pub fn payload_lossy(&self) -> String {
        String::from_utf8_lossy(&self.payload).into_owned()
    }
}
