//! # Relay Bridge Service
//!
//! Owns one node's [`BusConnectionPair`] and runs the inbound pump that
//! turns raw bus messages back into local deliveries.

use crate::codec;
use crate::ports::LocalDelivery;
use crate::BridgeError;
use parking_lot::{Mutex, RwLock};
use relay_bus::{BusConnectionPair, PublishHandle, SubscribeHandle};
use relay_types::{ClientVariant, Envelope, NodeId, Payload};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Point-in-time snapshot of a bridge's counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BridgeStats {
    /// Envelopes published onto the bus by this node.
    pub published: u64,
    /// Events delivered to locally attached remote connections.
    pub delivered: u64,
    /// Own-origin envelopes discarded without local delivery.
    pub echoes_suppressed: u64,
    /// Raw messages dropped because they did not decode.
    pub decode_failures: u64,
}

#[derive(Default)]
struct BridgeMetrics {
    published: AtomicU64,
    delivered: AtomicU64,
    echoes_suppressed: AtomicU64,
    decode_failures: AtomicU64,
}

impl BridgeMetrics {
    fn snapshot(&self) -> BridgeStats {
        BridgeStats {
            published: self.published.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
            echoes_suppressed: self.echoes_suppressed.load(Ordering::Relaxed),
            decode_failures: self.decode_failures.load(Ordering::Relaxed),
        }
    }
}

/// Bidirectional bridge between local broadcast intents and bus messages.
///
/// ## Thread Safety
///
/// The bridge is shared across async tasks via `Arc`. The inbound pump is a
/// spawned task holding its own clone; [`close`](RelayBridge::close) stops
/// the pump and closes both bus connections, idempotently.
pub struct RelayBridge {
    node_id: NodeId,
    variant: ClientVariant,
    publish: Mutex<PublishHandle>,
    deliveries: RwLock<Vec<Arc<dyn LocalDelivery>>>,
    sequence: AtomicU64,
    metrics: BridgeMetrics,
    pump: Mutex<Option<JoinHandle<()>>>,
    shutdown_tx: watch::Sender<bool>,
    closed: AtomicBool,
}

impl RelayBridge {
    /// Bring up a bridge over an opened connection pair.
    ///
    /// Waits for the pair's subscribe-ready handshake, then starts the
    /// inbound pump. Messages arriving before the handshake resolves are
    /// not trusted and never reach local deliveries.
    pub async fn connect(
        node_id: NodeId,
        mut pair: BusConnectionPair,
    ) -> Result<Arc<Self>, BridgeError> {
        pair.ready().await?;
        let variant = pair.variant();
        let (publish, subscribe) = pair.split();

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let bridge = Arc::new(Self {
            node_id,
            variant,
            publish: Mutex::new(publish),
            deliveries: RwLock::new(Vec::new()),
            sequence: AtomicU64::new(0),
            metrics: BridgeMetrics::default(),
            pump: Mutex::new(None),
            shutdown_tx,
            closed: AtomicBool::new(false),
        });

        let handle = tokio::spawn(Self::pump(bridge.clone(), subscribe, shutdown_rx));
        *bridge.pump.lock() = Some(handle);

        debug!(node = %node_id, variant = ?variant, "Relay bridge connected");
        Ok(bridge)
    }

    /// This bridge's node identity.
    #[must_use]
    pub fn node_id(&self) -> NodeId {
        self.node_id
    }

    /// Attach a local delivery sink (one per remote connection).
    pub fn attach(&self, delivery: Arc<dyn LocalDelivery>) {
        let mut deliveries = self.deliveries.write();
        deliveries.push(delivery);
        debug!(node = %self.node_id, attached = deliveries.len(), "Local delivery attached");
    }

    /// Encode a local broadcast intent and publish it onto the bus.
    ///
    /// Emission order onto the bus follows call order on this bridge; no
    /// ordering holds relative to other origins.
    pub fn publish_local(&self, event: &str, payload: Payload) -> Result<(), BridgeError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(BridgeError::Closed);
        }

        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        let envelope = Envelope::new(self.node_id, event, payload, sequence);
        let raw = codec::encode(&envelope, self.variant)?;

        let receivers = self.publish.lock().publish(raw)?;
        self.metrics.published.fetch_add(1, Ordering::Relaxed);
        debug!(
            node = %self.node_id,
            event = %envelope.event,
            sequence,
            receivers,
            "Envelope published"
        );
        Ok(())
    }

    /// Handle one raw message from the bus's subscribe side.
    ///
    /// Undecodable input is dropped and logged; own-origin envelopes are
    /// discarded; everything else fans out to every attached delivery.
    pub async fn on_bus_message(&self, raw: &[u8]) {
        let envelope = match codec::decode(raw, self.variant) {
            Ok(envelope) => envelope,
            Err(e) => {
                self.metrics.decode_failures.fetch_add(1, Ordering::Relaxed);
                warn!(node = %self.node_id, error = %e, "Undecodable bus message dropped");
                return;
            }
        };

        if envelope.origin == self.node_id {
            self.metrics
                .echoes_suppressed
                .fetch_add(1, Ordering::Relaxed);
            debug!(
                node = %self.node_id,
                sequence = envelope.sequence,
                "Own-origin envelope discarded"
            );
            return;
        }

        let deliveries: Vec<Arc<dyn LocalDelivery>> = self.deliveries.read().clone();
        for delivery in deliveries {
            match delivery.deliver(&envelope.event, envelope.payload.clone()).await {
                Ok(()) => {
                    self.metrics.delivered.fetch_add(1, Ordering::Relaxed);
                }
                Err(e) => {
                    warn!(
                        node = %self.node_id,
                        origin = %envelope.origin,
                        error = %e,
                        "Local delivery failed"
                    );
                }
            }
        }
    }

    /// Counter snapshot for diagnostics and conformance checks.
    #[must_use]
    pub fn stats(&self) -> BridgeStats {
        self.metrics.snapshot()
    }

    /// Stop the pump and close both bus connections. Idempotent.
    pub async fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        let _ = self.shutdown_tx.send(true);
        let handle = self.pump.lock().take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
        self.publish.lock().close();
        debug!(node = %self.node_id, "Relay bridge closed");
    }

    /// Inbound pump: drains the subscribe handle until shutdown or the
    /// connection ends.
    async fn pump(
        bridge: Arc<Self>,
        mut subscribe: SubscribeHandle,
        mut shutdown_rx: watch::Receiver<bool>,
    ) {
        loop {
            tokio::select! {
                _ = shutdown_rx.changed() => break,
                maybe = subscribe.recv() => match maybe {
                    Some(raw) => bridge.on_bus_message(&raw).await,
                    None => {
                        debug!(node = %bridge.node_id, "Subscribe connection ended");
                        break;
                    }
                },
            }
        }
        subscribe.close();
    }
}
