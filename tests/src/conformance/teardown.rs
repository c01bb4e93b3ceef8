//! # Teardown Idempotence
//!
//! Cleanup must succeed after both passing and failing scenarios, close
//! every opened connection, and be safe to invoke repeatedly.

#[cfg(test)]
mod tests {
    use crate::conformance::support;
    use relay_bus::BackingStore;
    use relay_harness::Cluster;
    use relay_types::{ClientVariant, Payload, ScenarioConfig};
    use std::time::Duration;

    fn config(node_count: usize) -> ScenarioConfig {
        ScenarioConfig {
            node_count,
            client_variant: ClientVariant::Modern,
            ..ScenarioConfig::default()
        }
    }

    #[tokio::test]
    async fn test_double_shutdown_after_success() {
        support::init_tracing();
        let store = BackingStore::start();
        let mut cluster = Cluster::launch(&config(3), &store.address()).await.unwrap();
        cluster.await_ready(Duration::from_millis(10)).await.unwrap();

        cluster
            .origin()
            .bridge()
            .publish_local("hello", Payload::from("world"))
            .unwrap();

        cluster.shutdown().await;
        cluster.shutdown().await;
        store.stop();
        store.stop();

        // Nothing publishes after teardown.
        assert!(cluster
            .origin()
            .bridge()
            .publish_local("hello", Payload::from("late"))
            .is_err());
    }

    #[tokio::test]
    async fn test_shutdown_after_mid_scenario_store_loss() {
        support::init_tracing();
        let store = BackingStore::start();
        let mut cluster = Cluster::launch(&config(2), &store.address()).await.unwrap();
        cluster.await_ready(Duration::from_millis(10)).await.unwrap();

        // Store loss mid-scenario: publishes fail, teardown still succeeds.
        store.stop();
        assert!(cluster
            .origin()
            .bridge()
            .publish_local("hello", Payload::from("x"))
            .is_err());

        cluster.shutdown().await;
        cluster.shutdown().await;
    }

    #[tokio::test]
    async fn test_remote_connections_end_after_shutdown() {
        support::init_tracing();
        let store = BackingStore::start();
        let mut cluster = Cluster::launch(&config(2), &store.address()).await.unwrap();
        cluster.await_ready(Duration::from_millis(10)).await.unwrap();

        let mut remote = cluster.take_remote(1).expect("remote connection");
        cluster.shutdown().await;
        store.stop();

        // The surviving handle drains to end-of-stream instead of hanging.
        drop(cluster);
        assert!(remote.recv().await.is_none());
        remote.close();
        remote.close();
    }
}
