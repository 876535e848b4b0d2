use super::message::{Compression, Message, MessageFlag, MessageType, Serialization};
use super::{HEADER_WORDS, PROTOCOL_VERSION};
use thiserror::Error;

/// Bytes that cannot be parsed as a frame
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedFrame {
    #[error("frame too short: {0} bytes, need at least 3 header bytes")]
    TooShort(usize),

    #[error("header declares {0} words, need at least 1")]
    InvalidHeaderSize(u8),

    #[error("frame truncated while reading {field}: need {needed} bytes, have {available}")]
    Truncated {
        field: &'static str,
        needed: usize,
        available: usize,
    },

    #[error("unknown message type nibble {0:#06b}")]
    UnknownMessageType(u8),

    #[error("unknown message flag nibble {0:#06b}")]
    UnknownFlag(u8),

    #[error("payload length {declared} exceeds remaining {remaining} bytes")]
    PayloadOverrun { declared: usize, remaining: usize },

    #[error("payload of {0} bytes does not fit the 32-bit length prefix")]
    PayloadTooLarge(usize),
}

fn serialization_for(message_type: MessageType) -> Serialization {
    match message_type {
        MessageType::AudioOnlyClient | MessageType::AudioOnlyServer | MessageType::Invalid => {
            Serialization::Raw
        }
        _ => Serialization::Json,
    }
}

fn length_prefix(len: usize) -> Result<[u8; 4], MalformedFrame> {
    u32::try_from(len)
        .map(u32::to_be_bytes)
        .map_err(|_| MalformedFrame::PayloadTooLarge(len))
}

/// Encode a message into a frame: 4-byte header, optional sequence, length-prefixed payload
///
/// Payloads are limited to `u32::MAX` bytes by the length prefix.
pub fn encode(message: &Message) -> Result<Vec<u8>, MalformedFrame> {
    let prefix = length_prefix(message.payload.len())?;
    let sequenced = message.flag.is_sequenced();
    let mut frame = Vec::with_capacity(4 + 4 + 4 + message.payload.len());

    frame.push((PROTOCOL_VERSION << 4) | HEADER_WORDS);
    frame.push((message.message_type.to_nibble() << 4) | message.flag.to_nibble());
    frame.push(
        (serialization_for(message.message_type).to_nibble() << 4) | Compression::None.to_nibble(),
    );
    frame.push(0x00);

    if sequenced {
        frame.extend_from_slice(&message.sequence.to_be_bytes());
    }

    frame.extend_from_slice(&prefix);
    frame.extend_from_slice(&message.payload);
    Ok(frame)
}

fn read_u32(buf: &[u8], offset: usize, field: &'static str) -> Result<[u8; 4], MalformedFrame> {
    buf.get(offset..offset + 4)
        .and_then(|b| b.try_into().ok())
        .ok_or(MalformedFrame::Truncated {
            field,
            needed: 4,
            available: buf.len().saturating_sub(offset),
        })
}

/// Decode one frame
///
/// Only syntax is checked here. An `Error` message decodes successfully; deciding
/// what it means is up to the caller.
pub fn decode(buf: &[u8]) -> Result<Message, MalformedFrame> {
    if buf.len() < 3 {
        return Err(MalformedFrame::TooShort(buf.len()));
    }

    let header_words = buf[0] & 0x0f;
    if header_words == 0 {
        return Err(MalformedFrame::InvalidHeaderSize(header_words));
    }

    let type_nibble = buf[1] >> 4;
    let flag_nibble = buf[1] & 0x0f;
    let message_type =
        MessageType::from_nibble(type_nibble).ok_or(MalformedFrame::UnknownMessageType(type_nibble))?;
    let flag = MessageFlag::from_nibble(flag_nibble).ok_or(MalformedFrame::UnknownFlag(flag_nibble))?;

    // Larger headers carry extensions we skip over
    let header_len = header_words as usize * 4;
    if buf.len() < header_len {
        return Err(MalformedFrame::Truncated {
            field: "header",
            needed: header_len,
            available: buf.len(),
        });
    }

    let mut offset = header_len;
    let mut sequence = 0;
    if flag.is_sequenced() {
        sequence = i32::from_be_bytes(read_u32(buf, offset, "sequence")?);
        offset += 4;
    }

    let declared = u32::from_be_bytes(read_u32(buf, offset, "payload length")?) as usize;
    offset += 4;

    let remaining = buf.len() - offset;
    if declared > remaining {
        return Err(MalformedFrame::PayloadOverrun { declared, remaining });
    }

    Ok(Message {
        message_type,
        flag,
        sequence,
        payload: buf[offset..offset + declared].to_vec(),
    })
}
