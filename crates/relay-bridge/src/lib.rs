//! # Relay Bridge
//!
//! The per-node component that makes N independent nodes behave as one
//! logical broadcast namespace.
//!
//! ```text
//! local emission ──→ [RelayBridge] ──encode──→ shared bus channel
//!                                                    │
//! remote connections ←──fan-out── [RelayBridge] ←──decode── (every other node)
//! ```
//!
//! ## Contracts
//!
//! - Outbound: [`RelayBridge::publish_local`] stamps the node's identity and
//!   the next per-origin sequence number onto an [`relay_types::Envelope`],
//!   encodes it for the connection pair's client variant, and publishes it.
//!   Payload bytes survive the boundary exactly, at any size.
//! - Inbound: every raw bus message is decoded; envelopes originating from
//!   this node are discarded (echo suppression); everything else is
//!   delivered to every attached local delivery.
//! - Undecodable raw messages are dropped and logged. They never reach a
//!   local delivery and never stop the bridge.

pub mod bridge;
pub mod codec;
pub mod ports;

pub use bridge::{BridgeStats, RelayBridge};
pub use codec::CodecError;
pub use ports::{DeliveryError, LocalDelivery};

use relay_bus::BusError;
use thiserror::Error;

/// Errors from bridge operations.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The bridge was closed.
    #[error("bridge closed")]
    Closed,

    /// A bus connection failed underneath the bridge.
    #[error(transparent)]
    Bus(#[from] BusError),

    /// An outbound envelope could not be encoded.
    #[error(transparent)]
    Codec(#[from] CodecError),
}
