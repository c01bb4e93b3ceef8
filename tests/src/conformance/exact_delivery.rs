//! # Exact Delivery
//!
//! The core acceptance criterion: a burst of K emissions from the origin
//! yields exactly K deliveries at every other node's remote connection.
//! Never K+1 (duplicate relay), never a timeout below K (lossy relay).

#[cfg(test)]
mod tests {
    use crate::conformance::support;
    use relay_bridge::codec;
    use relay_harness::{
        DeliveryVerifier, HarnessError, Node, RemoteConnection, Scenario, VerifierState,
    };
    use relay_types::{ClientVariant, Envelope, NodeId, Payload, ScenarioConfig};
    use std::time::Duration;
    use tokio::time::timeout;

    /// The canonical scenario: 2 nodes, 600 × "hello" -> "world" at 100 ms
    /// spacing from node 0; node 1's remote connection must observe exactly
    /// 600 events.
    #[tokio::test(start_paused = true)]
    async fn test_two_nodes_600_emissions_exactly() {
        support::init_tracing();
        let report = Scenario::new(ScenarioConfig::default()).run().await.unwrap();

        assert_eq!(report.delivered_total, 600);
        assert_eq!(report.origin_stats.published, 600);
        assert_eq!(report.origin_stats.delivered, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_four_node_fanout_is_exact_per_node() {
        support::init_tracing();
        let config = ScenarioConfig {
            node_count: 4,
            emission_count: 50,
            interval: Duration::from_millis(10),
            ..ScenarioConfig::default()
        };
        let report = Scenario::new(config).run().await.unwrap();

        // Three non-origin nodes, fifty each; the runner verifies each node
        // independently, so this total cannot hide a per-node imbalance.
        assert_eq!(report.delivered_total, 150);
    }

    #[tokio::test]
    async fn test_duplicate_injection_is_fatal_over_delivery() {
        support::init_tracing();
        let store = relay_bus::BackingStore::start();
        let (node0, _ready0) = Node::launch(NodeId(0), &store.address(), ClientVariant::Modern)
            .await
            .unwrap();
        let (node1, ready1) = Node::launch(NodeId(1), &store.address(), ClientVariant::Modern)
            .await
            .unwrap();

        let mut remote1 = RemoteConnection::connect(&node1.listener()).await.unwrap();
        ready1.await.unwrap();

        let expected = 5u64;
        let verifier = DeliveryVerifier::expect(expected);
        let recorder = verifier.clone();
        let pump = tokio::spawn(async move {
            while let Some(_event) = remote1.recv().await {
                if recorder.record().is_err() {
                    break;
                }
            }
        });

        for _ in 0..expected {
            node0
                .bridge()
                .publish_local("hello", Payload::from("world"))
                .unwrap();
        }
        timeout(Duration::from_secs(5), verifier.wait(Duration::from_secs(5)))
            .await
            .expect("wall timeout")
            .expect("exactly K first");

        // A replayed envelope from the origin is one delivery too many.
        let duplicate = Envelope::new(NodeId(0), "hello", Payload::from("world"), 1);
        let raw = codec::encode(&duplicate, ClientVariant::Modern).unwrap();
        node1.bridge().on_bus_message(&raw).await;

        // The pump records the duplicate asynchronously; the violation must
        // become terminal even though the verifier was already satisfied.
        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        while verifier.state() != VerifierState::Violated {
            assert!(
                tokio::time::Instant::now() < deadline,
                "duplicate delivery was never recorded"
            );
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        let err = verifier.wait(Duration::from_millis(100)).await.unwrap_err();
        assert!(matches!(
            err,
            HarnessError::OverDelivery {
                expected: 5,
                received: 6
            }
        ));

        pump.abort();
        node0.shutdown().await;
        node1.shutdown().await;
        store.stop();
    }

    #[tokio::test]
    async fn test_under_delivery_is_a_timeout_not_a_violation() {
        support::init_tracing();
        let store = relay_bus::BackingStore::start();
        let origin = support::bridge_on(&store, 0, ClientVariant::Modern).await;
        let (node1, ready1) = Node::launch(NodeId(1), &store.address(), ClientVariant::Modern)
            .await
            .unwrap();
        let mut remote1 = RemoteConnection::connect(&node1.listener()).await.unwrap();
        ready1.await.unwrap();

        let verifier = DeliveryVerifier::expect(10);
        let recorder = verifier.clone();
        let pump = tokio::spawn(async move {
            while let Some(_event) = remote1.recv().await {
                if recorder.record().is_err() {
                    break;
                }
            }
        });

        // Only seven of the expected ten ever arrive.
        for _ in 0..7 {
            origin
                .publish_local("hello", Payload::from("world"))
                .unwrap();
        }

        let err = verifier.wait(Duration::from_millis(300)).await.unwrap_err();
        match err {
            HarnessError::Timeout { expected, received } => {
                assert_eq!(expected, 10);
                assert_eq!(received, 7);
            }
            other => panic!("expected a timeout verdict, got {other}"),
        }

        pump.abort();
        origin.close().await;
        node1.shutdown().await;
        store.stop();
    }
}
