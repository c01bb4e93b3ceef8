//! # Relay Bus - Pub/Sub Backing Store Abstraction
//!
//! Models the shared publish/subscribe backing store all nodes of one relay
//! domain attach to.
//!
//! ## Shape
//!
//! ```text
//! ┌──────────┐ publish            ┌───────────────┐
//! │  Node A  │ ──────────────────→│ Backing Store │
//! └──────────┘                    │  (one channel │
//! ┌──────────┐    subscribe       │  per domain)  │
//! │  Node B  │ ←──────────────────└───────────────┘
//! └──────────┘
//! ```
//!
//! ## Contracts
//!
//! - The store is a lifecycle collaborator: [`BackingStore::start`] yields an
//!   opaque [`StoreAddress`]; consumers depend only on the address, never on
//!   the store type.
//! - Each node owns exactly one [`BusConnectionPair`] (one publish and one
//!   subscribe connection). Publish handles are ready as soon as the connect
//!   completes; subscribe handles additionally require their ready
//!   handshake before delivered messages are trusted.
//! - A stopped store refuses new connections; mid-session loss is surfaced
//!   as an error to the caller and logged, never auto-recovered.

pub mod connection;
pub mod store;

pub use connection::{BusConnectionPair, PublishHandle, SubscribeHandle};
pub use store::{BackingStore, StoreAddress};

use thiserror::Error;

/// Name of the shared broadcast channel for one relay domain.
///
/// Channel naming is owned by the backing-store adapter; the relay consumes
/// it only as an opaque label on publishes and subscriptions.
pub const RELAY_CHANNEL: &str = "relay.broadcast";

/// Maximum raw messages buffered per subscriber before lag drops.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;

/// Errors from backing-store connections.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BusError {
    /// The store refused the connection (not started, or already stopped).
    #[error("connection refused: backing store at {address} is not accepting connections")]
    ConnectionRefused {
        /// Address the connection was dialed against.
        address: String,
    },

    /// The store went away while this connection was established.
    #[error("connection reset: backing store stopped mid-session")]
    ConnectionReset,

    /// The local handle was closed.
    #[error("connection closed")]
    Closed,
}
