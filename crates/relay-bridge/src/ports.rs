//! # Local Delivery Port
//!
//! The narrow seam between the bridge and whatever carries events to a
//! node's locally attached remote connections. Transport framing lives
//! behind this trait; the bridge only fans out decoded events.

use async_trait::async_trait;
use relay_types::Payload;
use thiserror::Error;

/// Errors from delivering an event to a local connection.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DeliveryError {
    /// The remote side of the connection is gone.
    #[error("remote connection disconnected")]
    Disconnected,
}

/// Delivery sink for one locally attached remote connection.
///
/// Implementations must be cheap to call on the event loop; the bridge
/// awaits each delivery in turn and logs (but does not propagate) failures.
#[async_trait]
pub trait LocalDelivery: Send + Sync {
    /// Deliver one decoded event to the remote side.
    async fn deliver(&self, event: &str, payload: Payload) -> Result<(), DeliveryError>;
}
