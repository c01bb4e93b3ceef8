//! # Wire Codecs
//!
//! One codec per backing-store client variant. The legacy client frames
//! envelopes as JSON; the modern client uses a compact binary encoding.
//! Both preserve payload bytes exactly regardless of size; the conformance
//! suite holds them to identical delivery behavior.

use bytes::Bytes;
use relay_types::{ClientVariant, Envelope};
use thiserror::Error;

/// Errors from envelope encoding and decoding.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CodecError {
    /// Failed to encode an envelope for transmission.
    #[error("encoding error: {0}")]
    Encode(String),

    /// The raw message is malformed for the expected variant.
    #[error("invalid message: {0}")]
    Decode(String),
}

/// Encode an envelope as one raw bus message.
pub fn encode(envelope: &Envelope, variant: ClientVariant) -> Result<Bytes, CodecError> {
    let raw = match variant {
        ClientVariant::Legacy => {
            serde_json::to_vec(envelope).map_err(|e| CodecError::Encode(e.to_string()))?
        }
        ClientVariant::Modern => {
            bincode::serialize(envelope).map_err(|e| CodecError::Encode(e.to_string()))?
        }
    };
    Ok(Bytes::from(raw))
}

/// Decode one raw bus message into an envelope.
pub fn decode(raw: &[u8], variant: ClientVariant) -> Result<Envelope, CodecError> {
    match variant {
        ClientVariant::Legacy => {
            serde_json::from_slice(raw).map_err(|e| CodecError::Decode(e.to_string()))
        }
        ClientVariant::Modern => {
            bincode::deserialize(raw).map_err(|e| CodecError::Decode(e.to_string()))
        }
    }
}
