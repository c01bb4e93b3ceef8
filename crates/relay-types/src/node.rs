//! Node identity and lifecycle state.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordinal identity of a node within one relay domain.
///
/// Nodes are created by the harness in ordinal order starting at 0; the id
/// is stamped into every [`crate::Envelope`] a node publishes and is the
/// sole input to echo suppression.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct NodeId(pub u16);

impl NodeId {
    /// The conventional origin node for single-origin bursts.
    pub const ORIGIN: NodeId = NodeId(0);

    /// Ordinal position of this node.
    #[must_use]
    pub fn ordinal(self) -> usize {
        usize::from(self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node-{}", self.0)
    }
}

impl From<u16> for NodeId {
    fn from(value: u16) -> Self {
        Self(value)
    }
}

/// Lifecycle states of a node during harness setup.
///
/// Transitions are strictly forward:
///
/// ```text
/// Created -> BusConnecting -> BusReady -> Listening -> RemoteConnected
/// ```
///
/// A node only counts toward the cluster-ready gate once it reaches
/// `RemoteConnected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum NodeState {
    /// Node object exists; no connections opened yet.
    Created,
    /// Publish and subscribe connections to the backing store are dialing.
    BusConnecting,
    /// Both bus connections established; subscribe handshake complete.
    BusReady,
    /// Local listener is accepting remote connections.
    Listening,
    /// At least one inbound remote connection observed.
    RemoteConnected,
}

impl fmt::Display for NodeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Created => "created",
            Self::BusConnecting => "bus-connecting",
            Self::BusReady => "bus-ready",
            Self::Listening => "listening",
            Self::RemoteConnected => "remote-connected",
        };
        f.write_str(s)
    }
}
