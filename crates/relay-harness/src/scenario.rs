//! # Scenario Runner
//!
//! One conformance scenario end to end: start the store, launch the
//! cluster, gate on all-ready, fire the burst from the origin node, verify
//! exact delivery at every other node's remote connection, and always tear
//! down, success or failure.

use crate::burst::BurstDriver;
use crate::fixture;
use crate::registry::Cluster;
use crate::verifier::{DeliveryVerifier, VerifierState};
use crate::HarnessError;
use futures::future;
use relay_bridge::BridgeStats;
use relay_bus::BackingStore;
use relay_types::ScenarioConfig;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};
use uuid::Uuid;

/// Default event name emitted by scenarios.
pub const DEFAULT_EVENT: &str = "hello";

/// Summary of a finished (passing) scenario.
#[derive(Debug, Clone)]
pub struct ScenarioReport {
    /// Correlation id for this scenario's log lines.
    pub scenario_id: Uuid,
    /// Deliveries observed across all non-origin remote connections.
    pub delivered_total: u64,
    /// Wall-clock duration of the scenario body.
    pub elapsed: Duration,
    /// Origin bridge counters at teardown.
    pub origin_stats: BridgeStats,
}

/// A runnable conformance scenario.
pub struct Scenario {
    config: ScenarioConfig,
    event: String,
    timeout: Duration,
    settle: Duration,
    grace: Duration,
}

impl Scenario {
    /// Build a scenario from its configuration.
    ///
    /// The default timeout covers the full burst duration plus margin.
    #[must_use]
    pub fn new(config: ScenarioConfig) -> Self {
        let burst_span = config
            .interval
            .saturating_mul(u32::try_from(config.emission_count).unwrap_or(u32::MAX));
        Self {
            config,
            event: DEFAULT_EVENT.to_owned(),
            timeout: burst_span + Duration::from_secs(30),
            settle: Duration::from_millis(50),
            grace: Duration::from_millis(100),
        }
    }

    /// Override the overall scenario timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the emitted event name.
    #[must_use]
    pub fn with_event(mut self, event: impl Into<String>) -> Self {
        self.event = event.into();
        self
    }

    /// Run the scenario. Teardown is unconditional.
    pub async fn run(&self) -> Result<ScenarioReport, HarnessError> {
        let scenario_id = Uuid::new_v4();
        let started = Instant::now();
        info!(
            %scenario_id,
            nodes = self.config.node_count,
            emissions = self.config.emission_count,
            interval_ms = self.config.interval.as_millis() as u64,
            payload_bytes = self.config.payload_size,
            variant = ?self.config.client_variant,
            "Scenario starting"
        );

        let store = BackingStore::start();
        let launched = tokio::time::timeout(
            self.timeout,
            Cluster::launch(&self.config, &store.address()),
        )
        .await;
        let mut cluster = match launched {
            Ok(Ok(cluster)) => cluster,
            Ok(Err(e)) => {
                store.stop();
                warn!(%scenario_id, error = %e, "Scenario setup failed");
                return Err(e);
            }
            Err(_) => {
                store.stop();
                return Err(HarnessError::SetupTimeout);
            }
        };

        let verdict = self.drive(&mut cluster).await;

        // Teardown runs on every path so no scenario leaks connections.
        cluster.shutdown().await;
        store.stop();

        match verdict {
            Ok(delivered_total) => {
                let report = ScenarioReport {
                    scenario_id,
                    delivered_total,
                    elapsed: started.elapsed(),
                    origin_stats: cluster.origin().stats(),
                };
                info!(
                    %scenario_id,
                    delivered = report.delivered_total,
                    elapsed_ms = report.elapsed.as_millis() as u64,
                    "Scenario passed"
                );
                Ok(report)
            }
            Err(e) => {
                warn!(%scenario_id, error = %e, "Scenario failed");
                Err(e)
            }
        }
    }

    /// Scenario body between launch and teardown.
    async fn drive(&self, cluster: &mut Cluster) -> Result<u64, HarnessError> {
        tokio::time::timeout(self.timeout, cluster.await_ready(self.settle))
            .await
            .map_err(|_| HarnessError::SetupTimeout)??;

        // One verifier per non-origin node: each remote side must see
        // exactly the burst size, so per-node over-delivery cannot hide
        // behind an aggregate balance.
        let expected = self.config.emission_count;
        let mut verifiers: Vec<Arc<DeliveryVerifier>> = Vec::new();
        let mut pumps = Vec::new();
        for ordinal in 1..self.config.node_count {
            let mut remote =
                cluster
                    .take_remote(ordinal)
                    .ok_or_else(|| HarnessError::RemoteAttach {
                        node: cluster.node(ordinal).id(),
                    })?;
            let verifier = DeliveryVerifier::expect(expected);
            let recorder = verifier.clone();
            pumps.push(tokio::spawn(async move {
                while let Some(_event) = remote.recv().await {
                    if recorder.record().is_err() {
                        break;
                    }
                }
            }));
            verifiers.push(verifier);
        }

        let payload = fixture::scenario_payload(self.config.payload_size);
        let _burst = BurstDriver::fire(
            cluster.origin().bridge().clone(),
            &self.event,
            payload,
            expected,
            self.config.interval,
        );

        let waited =
            future::try_join_all(verifiers.iter().map(|v| v.wait(self.timeout))).await;

        let verdict = match waited {
            Ok(_) => {
                // Drain briefly so a duplicate arriving right after
                // satisfaction still fails the scenario.
                tokio::time::sleep(self.grace).await;
                verifiers
                    .iter()
                    .find(|v| v.state() == VerifierState::Violated)
                    .map_or(Ok(()), |v| {
                        Err(HarnessError::OverDelivery {
                            expected,
                            received: v.received(),
                        })
                    })
            }
            Err(e) => Err(e),
        };

        for pump in pumps {
            pump.abort();
        }

        verdict.map(|()| verifiers.iter().map(|v| v.received()).sum())
    }
}
