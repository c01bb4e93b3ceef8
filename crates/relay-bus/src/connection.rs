//! # Bus Connections
//!
//! Publish and subscribe connection handles, and the per-node
//! [`BusConnectionPair`] that owns one of each.
//!
//! Readiness is asymmetric on purpose: a publish handle is usable as soon
//! as the connect completes, while a subscribe handle must finish its ready
//! handshake before delivered messages are trusted. The harness waits on
//! the subscribe side before any emission is allowed.

use crate::store::{StoreAddress, StoreInner};
use crate::{BusError, RELAY_CHANNEL};
use bytes::Bytes;
use relay_types::ClientVariant;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tokio::sync::{broadcast, oneshot};
use tracing::{debug, warn};

/// Publish-side connection to the backing store.
pub struct PublishHandle {
    store: Arc<StoreInner>,
    open: bool,
}

impl PublishHandle {
    /// Dial the publish side of the store.
    pub(crate) async fn connect(address: &StoreAddress) -> Result<Self, BusError> {
        address.ensure_accepting()?;
        // Dialing is a suspension point, even against the in-process store.
        tokio::task::yield_now().await;
        debug!(address = %address, "Publish connection established");
        Ok(Self {
            store: address.inner.clone(),
            open: true,
        })
    }

    /// Publish one raw message to the relay domain's shared channel.
    ///
    /// Returns the number of subscribers the message was fanned out to.
    /// Zero subscribers is not an error; the message is counted as dropped
    /// by the store and logged.
    pub fn publish(&self, raw: Bytes) -> Result<usize, BusError> {
        if !self.open {
            return Err(BusError::Closed);
        }
        if !self.store.accepting.load(Ordering::SeqCst) {
            return Err(BusError::ConnectionReset);
        }

        self.store.published.fetch_add(1, Ordering::Relaxed);
        match self.store.sender.send(raw) {
            Ok(receiver_count) => Ok(receiver_count),
            Err(_) => {
                self.store.dropped.fetch_add(1, Ordering::Relaxed);
                warn!(channel = RELAY_CHANNEL, "Raw message dropped (no subscribers)");
                Ok(0)
            }
        }
    }

    /// Close the publish side. Idempotent.
    pub fn close(&mut self) {
        if self.open {
            self.open = false;
            debug!("Publish connection closed");
        }
    }

    /// Whether the handle is still open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.open
    }
}

/// Subscribe-side connection to the backing store.
pub struct SubscribeHandle {
    receiver: Option<broadcast::Receiver<Bytes>>,
    ready_rx: Option<oneshot::Receiver<()>>,
    ready: bool,
    lag_dropped: u64,
}

impl SubscribeHandle {
    /// Dial the subscribe side of the store.
    ///
    /// The subscription is registered immediately; the ready handshake
    /// completes asynchronously and must be awaited via
    /// [`ready`](SubscribeHandle::ready).
    pub(crate) async fn connect(address: &StoreAddress) -> Result<Self, BusError> {
        address.ensure_accepting()?;
        let receiver = address.inner.sender.subscribe();

        // Model the broker's subscribe-ack round trip.
        let (ack_tx, ack_rx) = oneshot::channel();
        tokio::spawn(async move {
            tokio::task::yield_now().await;
            let _ = ack_tx.send(());
        });

        debug!(address = %address, channel = RELAY_CHANNEL, "Subscribe connection established");
        Ok(Self {
            receiver: Some(receiver),
            ready_rx: Some(ack_rx),
            ready: false,
            lag_dropped: 0,
        })
    }

    /// Wait for the subscribe-ready handshake. Safe to call repeatedly.
    pub async fn ready(&mut self) -> Result<(), BusError> {
        if self.ready {
            return Ok(());
        }
        let Some(ack) = self.ready_rx.take() else {
            return Err(BusError::Closed);
        };
        ack.await.map_err(|_| BusError::ConnectionReset)?;
        self.ready = true;
        debug!(channel = RELAY_CHANNEL, "Subscription ready");
        Ok(())
    }

    /// Receive the next raw message.
    ///
    /// Returns `None` once the connection is closed. Lag drops are counted
    /// and logged, then skipped over; they never surface as errors here.
    pub async fn recv(&mut self) -> Option<Bytes> {
        let receiver = self.receiver.as_mut()?;
        loop {
            match receiver.recv().await {
                Ok(raw) => return Some(raw),
                Err(broadcast::error::RecvError::Closed) => return None,
                Err(broadcast::error::RecvError::Lagged(count)) => {
                    self.lag_dropped += count;
                    warn!(lagged = count, "Subscriber lagged, raw messages dropped");
                }
            }
        }
    }

    /// Close the subscribe side. Idempotent.
    pub fn close(&mut self) {
        if self.receiver.take().is_some() {
            debug!("Subscribe connection closed");
        }
        self.ready_rx = None;
    }

    /// Raw messages lost to subscriber lag so far.
    #[must_use]
    pub fn lag_dropped(&self) -> u64 {
        self.lag_dropped
    }
}

/// One publish plus one subscribe connection, owned exclusively by a node.
///
/// Both connections are established by [`open`](BusConnectionPair::open);
/// the owning node counts as bus-ready only after
/// [`ready`](BusConnectionPair::ready) resolves the subscribe handshake.
pub struct BusConnectionPair {
    publish: PublishHandle,
    subscribe: SubscribeHandle,
    variant: ClientVariant,
}

impl BusConnectionPair {
    /// Open both connections against the store address.
    ///
    /// Failure of either connect surfaces as a setup error for the owning
    /// node; nothing is retried here.
    pub async fn open(address: &StoreAddress, variant: ClientVariant) -> Result<Self, BusError> {
        let publish = PublishHandle::connect(address).await?;
        let subscribe = SubscribeHandle::connect(address).await?;
        Ok(Self {
            publish,
            subscribe,
            variant,
        })
    }

    /// Wait for the subscribe-ready handshake.
    pub async fn ready(&mut self) -> Result<(), BusError> {
        self.subscribe.ready().await
    }

    /// The client variant this pair was opened with.
    #[must_use]
    pub fn variant(&self) -> ClientVariant {
        self.variant
    }

    /// Split into the two handles (for the bridge's pump/publish sides).
    #[must_use]
    pub fn split(self) -> (PublishHandle, SubscribeHandle) {
        (self.publish, self.subscribe)
    }

    /// Close both connections. Idempotent, safe on a never-ready pair.
    pub fn close(&mut self) {
        self.publish.close();
        self.subscribe.close();
    }
}
