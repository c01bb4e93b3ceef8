//! # Node Registry
//!
//! Launches the fixed-size node pool, attaches one remote connection per
//! node, and joins the per-node ready signals into a single cluster-ready
//! gate. The gate is an explicit completion join, not a shared list
//! inspected by side effect, and it fires exactly once.

use crate::node::Node;
use crate::transport::RemoteConnection;
use crate::HarnessError;
use futures::future;
use parking_lot::Mutex;
use relay_bus::StoreAddress;
use relay_types::{NodeId, ScenarioConfig};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::info;

type ReadySignal = (NodeId, oneshot::Receiver<()>);

/// A launched relay cluster: N nodes against one backing store.
pub struct Cluster {
    nodes: Vec<Arc<Node>>,
    remotes: Vec<Option<RemoteConnection>>,
    gate: Mutex<Option<Vec<ReadySignal>>>,
}

impl Cluster {
    /// Launch all nodes concurrently and attach one remote connection each.
    ///
    /// Any node failing to establish its connections aborts the launch; no
    /// partial cluster is returned, and nodes that did come up are shut
    /// down before the error surfaces.
    pub async fn launch(
        config: &ScenarioConfig,
        address: &StoreAddress,
    ) -> Result<Self, HarnessError> {
        let setups = (0..config.node_count)
            .map(|i| Node::launch(NodeId(i as u16), address, config.client_variant));
        let results = future::join_all(setups).await;

        let mut nodes = Vec::with_capacity(config.node_count);
        let mut gate = Vec::with_capacity(config.node_count);
        let mut failure = None;
        for result in results {
            match result {
                Ok((node, ready_rx)) => {
                    gate.push((node.id(), ready_rx));
                    nodes.push(node);
                }
                Err(e) => failure = failure.or(Some(e)),
            }
        }
        if let Some(e) = failure {
            Self::abort_launch(&nodes).await;
            return Err(e);
        }

        // One remote connection per node, fixed at 1:1 for this harness.
        let mut remotes = Vec::with_capacity(nodes.len());
        for node in &nodes {
            match RemoteConnection::connect(&node.listener()).await {
                Ok(remote) => remotes.push(Some(remote)),
                Err(_) => {
                    let failed = node.id();
                    Self::abort_launch(&nodes).await;
                    return Err(HarnessError::RemoteAttach { node: failed });
                }
            }
        }

        info!(nodes = config.node_count, variant = ?config.client_variant, "Cluster launched");
        Ok(Self {
            nodes,
            remotes,
            gate: Mutex::new(Some(gate)),
        })
    }

    /// Partial-failure cleanup: tear down every node that did launch.
    async fn abort_launch(nodes: &[Arc<Node>]) {
        for node in nodes {
            node.shutdown().await;
        }
        if !nodes.is_empty() {
            info!(nodes = nodes.len(), "Partial cluster torn down after failed launch");
        }
    }

    /// Wait until every node has observed its inbound remote connection,
    /// then give subscribe handshakes a settling delay.
    ///
    /// The gate closes on the Nth transition and only once; later calls
    /// return immediately.
    pub async fn await_ready(&self, settle: Duration) -> Result<(), HarnessError> {
        let taken = { self.gate.lock().take() };
        let Some(gate) = taken else {
            return Ok(());
        };

        future::try_join_all(gate.into_iter().map(|(node, rx)| async move {
            rx.await.map_err(|_| HarnessError::RemoteAttach { node })
        }))
        .await?;

        // Let subscribe handshakes finish before any emission; firing
        // earlier silently drops deliveries.
        tokio::time::sleep(settle).await;
        info!(nodes = self.nodes.len(), "Cluster ready");
        Ok(())
    }

    /// All nodes, in ordinal order.
    #[must_use]
    pub fn nodes(&self) -> &[Arc<Node>] {
        &self.nodes
    }

    /// Node by ordinal.
    #[must_use]
    pub fn node(&self, ordinal: usize) -> &Arc<Node> {
        &self.nodes[ordinal]
    }

    /// The designated origin node for single-origin bursts.
    #[must_use]
    pub fn origin(&self) -> &Arc<Node> {
        &self.nodes[0]
    }

    /// Take ownership of a node's remote connection (once).
    pub fn take_remote(&mut self, ordinal: usize) -> Option<RemoteConnection> {
        self.remotes.get_mut(ordinal).and_then(Option::take)
    }

    /// Tear down every node and remote connection. Idempotent; runs after
    /// both successful and failed scenarios.
    pub async fn shutdown(&mut self) {
        for remote in self.remotes.iter_mut().flatten() {
            remote.close();
        }
        for node in &self.nodes {
            node.shutdown().await;
        }
        info!(nodes = self.nodes.len(), "Cluster shut down");
    }
}
