//! Scenario configuration from explicit values or environment variables.

use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Which backing-store client implementation a connection pair uses.
///
/// The two variants speak different wire encodings but are behaviorally
/// equivalent; the conformance suite verifies identical delivery guarantees
/// under both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ClientVariant {
    /// Legacy client: JSON wire encoding.
    Legacy,
    /// Modern client: compact binary wire encoding.
    #[default]
    Modern,
}

impl ClientVariant {
    /// Both supported variants, for variant-matrix tests.
    pub const ALL: [ClientVariant; 2] = [ClientVariant::Legacy, ClientVariant::Modern];
}

/// Shape of one conformance scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioConfig {
    /// Number of nodes in the relay domain.
    pub node_count: usize,

    /// Number of emissions fired from the origin node.
    pub emission_count: u64,

    /// Spacing between consecutive emissions.
    pub interval: Duration,

    /// Payload body size in bytes. Zero means the small inline payload.
    pub payload_size: usize,

    /// Backing-store client implementation under test.
    pub client_variant: ClientVariant,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            node_count: 2,
            emission_count: 600,
            interval: Duration::from_millis(100),
            payload_size: 0,
            client_variant: ClientVariant::default(),
        }
    }
}

impl ScenarioConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `RELAY_NODE_COUNT`: Number of nodes (default: 2)
    /// - `RELAY_EMISSION_COUNT`: Emissions per burst (default: 600)
    /// - `RELAY_INTERVAL_MS`: Emission spacing in ms (default: 100)
    /// - `RELAY_PAYLOAD_SIZE`: Payload bytes, 0 for inline (default: 0)
    /// - `RELAY_CLIENT_VARIANT`: `legacy` or `modern` (default: modern)
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            node_count: env::var("RELAY_NODE_COUNT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.node_count),

            emission_count: env::var("RELAY_EMISSION_COUNT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.emission_count),

            interval: env::var("RELAY_INTERVAL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.interval),

            payload_size: env::var("RELAY_PAYLOAD_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.payload_size),

            client_variant: env::var("RELAY_CLIENT_VARIANT")
                .ok()
                .and_then(|v| match v.to_lowercase().as_str() {
                    "legacy" => Some(ClientVariant::Legacy),
                    "modern" => Some(ClientVariant::Modern),
                    _ => None,
                })
                .unwrap_or(defaults.client_variant),
        }
    }

    /// Override the client variant, keeping everything else.
    #[must_use]
    pub fn with_variant(mut self, variant: ClientVariant) -> Self {
        self.client_variant = variant;
        self
    }

    /// Override the payload size, keeping everything else.
    #[must_use]
    pub fn with_payload_size(mut self, size: usize) -> Self {
        self.payload_size = size;
        self
    }

    /// Total deliveries expected across all non-origin nodes.
    #[must_use]
    pub fn expected_total_deliveries(&self) -> u64 {
        self.emission_count * (self.node_count as u64 - 1)
    }
}
