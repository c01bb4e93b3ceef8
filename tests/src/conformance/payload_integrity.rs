//! # Payload Integrity
//!
//! Bytes delivered at the remote side must equal the bytes emitted at the
//! origin, for small strings and multi-megabyte blobs alike. Large bodies
//! are the stress case: any truncation or re-framing bug in the relay
//! codecs shows up here.

#[cfg(test)]
mod tests {
    use crate::conformance::support;
    use relay_harness::{fixture, Node, RemoteConnection, Scenario};
    use relay_types::{ClientVariant, NodeId, Payload, ScenarioConfig};
    use std::time::Duration;
    use tokio::time::timeout;

    const FIVE_MB: usize = 5 * 1024 * 1024;

    /// Emit one payload from node 0, return what node 1's remote observed.
    async fn round_trip(variant: ClientVariant, payload: Payload) -> (String, Payload) {
        let store = relay_bus::BackingStore::start();
        let (node0, _ready0) = Node::launch(NodeId(0), &store.address(), variant)
            .await
            .unwrap();
        let (node1, ready1) = Node::launch(NodeId(1), &store.address(), variant)
            .await
            .unwrap();
        let mut remote1 = RemoteConnection::connect(&node1.listener()).await.unwrap();
        ready1.await.unwrap();

        node0.bridge().publish_local("hello", payload).unwrap();
        let received = timeout(Duration::from_secs(10), remote1.recv())
            .await
            .expect("timeout")
            .expect("delivery");

        node0.shutdown().await;
        node1.shutdown().await;
        store.stop();
        (received.event, received.payload)
    }

    #[tokio::test]
    async fn test_small_string_is_byte_exact() {
        support::init_tracing();
        let (event, payload) = round_trip(ClientVariant::Modern, Payload::from("world")).await;
        assert_eq!(event, "hello");
        assert_eq!(payload, Payload::from("world"));
    }

    #[tokio::test]
    async fn test_five_megabyte_json_blob_is_byte_exact() {
        support::init_tracing();
        let blob = fixture::json_text_payload(FIVE_MB);
        let (_, payload) = round_trip(ClientVariant::Modern, blob.clone()).await;
        assert_eq!(payload.len(), blob.len());
        assert_eq!(payload.as_bytes(), blob.as_bytes());
        assert!(!payload.is_binary());
    }

    #[tokio::test]
    async fn test_binary_blob_is_byte_exact() {
        support::init_tracing();
        let blob = fixture::binary_payload(1024 * 1024);
        let (_, payload) = round_trip(ClientVariant::Modern, blob.clone()).await;
        assert_eq!(payload.as_bytes(), blob.as_bytes());
        assert!(payload.is_binary());
    }

    /// The canonical large-payload scenario: same exact-600 guarantee as
    /// the small-payload burst, with a ~5 MB JSON-encoded string body.
    #[tokio::test(start_paused = true)]
    async fn test_600_emissions_of_five_megabytes_are_exact() {
        support::init_tracing();
        let config = ScenarioConfig::default().with_payload_size(FIVE_MB);
        let report = Scenario::new(config).run().await.unwrap();
        assert_eq!(report.delivered_total, 600);
        assert_eq!(report.origin_stats.published, 600);
    }
}
