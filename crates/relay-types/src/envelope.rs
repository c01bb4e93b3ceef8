//! # Broadcast Envelope
//!
//! The universal wrapper for every message crossing the publish/subscribe
//! boundary between nodes.
//!
//! ## Invariants
//!
//! - `origin` is the sole source of truth for the emitting node's identity;
//!   a bridge must never redeliver an envelope whose `origin` equals its own
//!   node id (echo suppression).
//! - `sequence` increases monotonically per origin. It exists for
//!   diagnostics only; no cross-origin ordering is implied.
//! - `binary` mirrors the payload discriminant so decoders can route
//!   without inspecting the payload body.

use crate::node::NodeId;
use serde::{Deserialize, Serialize};

/// Payload carried by an envelope.
///
/// Payloads are opaque to the relay: text and binary bodies of arbitrary
/// size (including multi-megabyte blobs) must survive the bus boundary
/// byte-exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Payload {
    /// UTF-8 text body.
    Text(String),
    /// Raw binary body.
    Binary(Vec<u8>),
}

impl Payload {
    /// Length of the payload body in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Text(s) => s.len(),
            Self::Binary(b) => b.len(),
        }
    }

    /// Whether the payload body is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the payload is a binary body (the envelope's encoding flag).
    #[must_use]
    pub fn is_binary(&self) -> bool {
        matches!(self, Self::Binary(_))
    }

    /// The payload body as raw bytes, regardless of discriminant.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Text(s) => s.as_bytes(),
            Self::Binary(b) => b.as_slice(),
        }
    }
}

impl From<&str> for Payload {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for Payload {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<u8>> for Payload {
    fn from(value: Vec<u8>) -> Self {
        Self::Binary(value)
    }
}

/// One broadcast event as it travels over the bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    /// The emitting node. Authoritative for echo suppression.
    pub origin: NodeId,
    /// Event name delivered to remote connections.
    pub event: String,
    /// Opaque payload body.
    pub payload: Payload,
    /// Encoding flag: true when `payload` is binary.
    pub binary: bool,
    /// Monotonic per-origin sequence number (diagnostic only).
    pub sequence: u64,
}

impl Envelope {
    /// Build an envelope, deriving the encoding flag from the payload.
    #[must_use]
    pub fn new(origin: NodeId, event: impl Into<String>, payload: Payload, sequence: u64) -> Self {
        let binary = payload.is_binary();
        Self {
            origin,
            event: event.into(),
            payload,
            binary,
            sequence,
        }
    }
}
