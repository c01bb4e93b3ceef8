//! # Relay Harness
//!
//! Builds an N-node relay cluster against one backing store and drives
//! conformance scenarios over it.
//!
//! ## Scenario Control Flow
//!
//! ```text
//! Cluster::launch ──→ per-node setup (concurrent)
//!        │              Created -> BusConnecting -> BusReady -> Listening
//!        │                                                        │
//!        │              one RemoteConnection attached per node    │
//!        │                                         RemoteConnected
//!        ↓
//! all-ready gate (fires once, Nth node) + settling delay
//!        ↓
//! BurstDriver::fire (origin node, fixed cadence, fire-and-forget)
//!        ↓
//! DeliveryVerifier per non-origin node (exactly K, no more, no fewer)
//!        ↓
//! unconditional teardown (bridges, connections, store)
//! ```
//!
//! Emitting before every subscribe handle is ready silently drops
//! deliveries, which is why the gate and settling delay precede any burst.

pub mod burst;
pub mod fixture;
pub mod node;
pub mod registry;
pub mod scenario;
pub mod transport;
pub mod verifier;

pub use burst::BurstDriver;
pub use node::Node;
pub use registry::Cluster;
pub use scenario::{Scenario, ScenarioReport};
pub use transport::{ReceivedEvent, RemoteConnection};
pub use verifier::{DeliveryVerifier, VerifierState};

use relay_bridge::BridgeError;
use relay_types::NodeId;
use thiserror::Error;

/// Scenario failure taxonomy.
///
/// Setup failures abort a scenario before any emission; over-delivery and
/// under-delivery are distinct correctness verdicts and are never conflated.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// A node's bus connections or bridge failed to establish.
    #[error("setup failed for {node}")]
    Setup {
        /// The node whose setup failed.
        node: NodeId,
        /// Underlying bridge or bus failure.
        #[source]
        source: BridgeError,
    },

    /// A node's listener rejected or lost the remote connection.
    #[error("setup failed for {node}: listener rejected the remote connection")]
    RemoteAttach {
        /// The node whose remote attach failed.
        node: NodeId,
    },

    /// The cluster did not reach all-ready within the allotted time.
    #[error("cluster setup timed out before all nodes connected")]
    SetupTimeout,

    /// More deliveries arrived than the scenario expected. Fatal.
    #[error("over-delivery: received {received} events, expected exactly {expected}")]
    OverDelivery {
        /// Exact number of deliveries the scenario expected.
        expected: u64,
        /// Deliveries observed when the violation surfaced.
        received: u64,
    },

    /// The expected count was not reached before the scenario timeout.
    #[error("under-delivery: timed out with {received} of {expected} events")]
    Timeout {
        /// Exact number of deliveries the scenario expected.
        expected: u64,
        /// Deliveries observed at expiry.
        received: u64,
    },
}
