//! # In-Process Remote Transport
//!
//! Stand-in for the connection-oriented transport real clients would use.
//! A node exposes a [`ListenerHandle`] (its "address"); a
//! [`RemoteConnection`] attaches through it and receives every event the
//! node's bridge delivers locally. Transport framing and handshake details
//! are external collaborators; this module keeps only the narrow seam the
//! relay needs.

use async_trait::async_trait;
use relay_bridge::{DeliveryError, LocalDelivery};
use relay_types::Payload;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::debug;

/// Transport-level attach failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The listener is no longer accepting connections.
    #[error("listener closed")]
    ListenerClosed,
}

/// One event as observed at the remote side of a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedEvent {
    /// Event name.
    pub event: String,
    /// Payload body, byte-exact as emitted at the origin.
    pub payload: Payload,
}

type EventSender = mpsc::UnboundedSender<ReceivedEvent>;

/// Accept side of a node's listener, consumed by the node's accept loop.
pub struct Listener {
    accept_rx: mpsc::UnboundedReceiver<EventSender>,
}

impl Listener {
    /// Wait for the next inbound remote connection.
    ///
    /// Returns `None` once every address handle is dropped.
    pub async fn accept(&mut self) -> Option<EventSender> {
        self.accept_rx.recv().await
    }
}

/// Cloneable listener address used by remote connections to attach.
#[derive(Clone)]
pub struct ListenerHandle {
    accept_tx: mpsc::UnboundedSender<EventSender>,
}

/// Create a listener and its address handle.
#[must_use]
pub fn listener() -> (Listener, ListenerHandle) {
    let (accept_tx, accept_rx) = mpsc::unbounded_channel();
    (Listener { accept_rx }, ListenerHandle { accept_tx })
}

/// Receive side of one remote connection.
pub struct RemoteConnection {
    rx: Option<mpsc::UnboundedReceiver<ReceivedEvent>>,
}

impl RemoteConnection {
    /// Attach to a node's listener.
    pub async fn connect(handle: &ListenerHandle) -> Result<Self, TransportError> {
        let (tx, rx) = mpsc::unbounded_channel();
        handle
            .accept_tx
            .send(tx)
            .map_err(|_| TransportError::ListenerClosed)?;
        // Attaching is a suspension point, even in-process.
        tokio::task::yield_now().await;
        debug!("Remote connection attached");
        Ok(Self { rx: Some(rx) })
    }

    /// Receive the next delivered event.
    ///
    /// Returns `None` once the connection (or its node) is closed.
    pub async fn recv(&mut self) -> Option<ReceivedEvent> {
        match self.rx.as_mut() {
            Some(rx) => rx.recv().await,
            None => None,
        }
    }

    /// Disconnect. Idempotent.
    pub fn close(&mut self) {
        if self.rx.take().is_some() {
            debug!("Remote connection closed");
        }
    }
}

/// Bridge-side delivery sink feeding one remote connection.
pub(crate) struct RemoteDelivery {
    tx: EventSender,
}

impl RemoteDelivery {
    pub(crate) fn new(tx: EventSender) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl LocalDelivery for RemoteDelivery {
    async fn deliver(&self, event: &str, payload: Payload) -> Result<(), DeliveryError> {
        self.tx
            .send(ReceivedEvent {
                event: event.to_owned(),
                payload,
            })
            .map_err(|_| DeliveryError::Disconnected)
    }
}
