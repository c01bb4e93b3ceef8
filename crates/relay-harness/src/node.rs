//! # Node Lifecycle
//!
//! One node of the relay domain: a bus connection pair wrapped by a bridge,
//! plus a listener accepting remote connections. Setup walks the node
//! through its lifecycle states; every transition is logged.

use crate::transport::{self, Listener, ListenerHandle, RemoteDelivery};
use crate::HarnessError;
use parking_lot::{Mutex, RwLock};
use relay_bridge::{BridgeError, BridgeStats, RelayBridge};
use relay_bus::{BusConnectionPair, StoreAddress};
use relay_types::{ClientVariant, NodeId, NodeState};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::debug;

/// One node: identity, lifecycle state, bridge, and listener.
///
/// Nodes are created by [`crate::Cluster::launch`] and torn down by
/// [`shutdown`](Node::shutdown), which is unconditional and idempotent.
pub struct Node {
    id: NodeId,
    state: RwLock<NodeState>,
    bridge: Arc<RelayBridge>,
    listener_handle: ListenerHandle,
    accept_task: Mutex<Option<JoinHandle<()>>>,
    shut_down: AtomicBool,
}

impl Node {
    /// Bring up one node against the store address.
    ///
    /// Returns the node plus a one-shot signal that fires when the node's
    /// listener observes its first inbound remote connection; the registry
    /// joins these signals into the cluster-ready gate. Connection failures
    /// surface as setup errors and are never retried here.
    pub async fn launch(
        id: NodeId,
        address: &StoreAddress,
        variant: ClientVariant,
    ) -> Result<(Arc<Self>, oneshot::Receiver<()>), HarnessError> {
        let wrap = |source: BridgeError| HarnessError::Setup { node: id, source };

        debug!(node = %id, state = %NodeState::Created, "Node state");
        debug!(node = %id, state = %NodeState::BusConnecting, "Node state");
        let pair = BusConnectionPair::open(address, variant)
            .await
            .map_err(|e| wrap(e.into()))?;

        // Bridge connect resolves the subscribe-ready handshake.
        let bridge = RelayBridge::connect(id, pair).await.map_err(wrap)?;
        debug!(node = %id, state = %NodeState::BusReady, "Node state");

        let (listener, listener_handle) = transport::listener();
        let (ready_tx, ready_rx) = oneshot::channel();

        let node = Arc::new(Self {
            id,
            state: RwLock::new(NodeState::BusReady),
            bridge,
            listener_handle,
            accept_task: Mutex::new(None),
            shut_down: AtomicBool::new(false),
        });

        let task = tokio::spawn(Self::accept_loop(Arc::downgrade(&node), listener, ready_tx));
        *node.accept_task.lock() = Some(task);
        node.set_state(NodeState::Listening);

        Ok((node, ready_rx))
    }

    /// Accept loop: attach every inbound remote connection to the bridge.
    ///
    /// Holds only a weak reference so an abandoned node does not keep its
    /// own listener (and with it this task) alive forever; once the node is
    /// gone the loop exits and the listener is released.
    async fn accept_loop(
        node: Weak<Self>,
        mut listener: Listener,
        ready_tx: oneshot::Sender<()>,
    ) {
        let mut ready_tx = Some(ready_tx);
        while let Some(sender) = listener.accept().await {
            let Some(node) = node.upgrade() else {
                return;
            };
            node.bridge.attach(Arc::new(RemoteDelivery::new(sender)));
            node.set_state(NodeState::RemoteConnected);
            if let Some(tx) = ready_tx.take() {
                let _ = tx.send(());
            }
        }
    }

    fn set_state(&self, next: NodeState) {
        *self.state.write() = next;
        debug!(node = %self.id, state = %next, "Node state");
    }

    /// This node's identity.
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> NodeState {
        *self.state.read()
    }

    /// This node's relay bridge.
    #[must_use]
    pub fn bridge(&self) -> &Arc<RelayBridge> {
        &self.bridge
    }

    /// Listener address for remote connections.
    #[must_use]
    pub fn listener(&self) -> ListenerHandle {
        self.listener_handle.clone()
    }

    /// Bridge counter snapshot.
    #[must_use]
    pub fn stats(&self) -> BridgeStats {
        self.bridge.stats()
    }

    /// Tear the node down: stop accepting, close bridge and connections.
    /// Idempotent, safe after a failed scenario.
    pub async fn shutdown(&self) {
        if self.shut_down.swap(true, Ordering::SeqCst) {
            return;
        }
        let task = self.accept_task.lock().take();
        if let Some(task) = task {
            // Aborting drops the listener; pending attaches fail cleanly.
            task.abort();
            let _ = task.await;
        }
        self.bridge.close().await;
        debug!(node = %self.id, "Node shut down");
    }
}
