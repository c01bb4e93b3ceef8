//! # No-Echo Invariant
//!
//! A node must never deliver locally an event whose origin is its own id,
//! for any payload size. The origin's remote connection stays silent while
//! every other node's remote sees the full burst.

#[cfg(test)]
mod tests {
    use crate::conformance::support;
    use relay_harness::{fixture, Node, RemoteConnection};
    use relay_types::{ClientVariant, NodeId, Payload};
    use std::time::Duration;
    use tokio::time::timeout;

    async fn assert_no_echo(payload: Payload) {
        support::init_tracing();
        let store = relay_bus::BackingStore::start();
        let (node0, ready0) = Node::launch(NodeId(0), &store.address(), ClientVariant::Modern)
            .await
            .unwrap();
        let (node1, ready1) = Node::launch(NodeId(1), &store.address(), ClientVariant::Modern)
            .await
            .unwrap();

        // The origin gets a remote connection of its own; it must stay silent.
        let mut remote0 = RemoteConnection::connect(&node0.listener()).await.unwrap();
        let mut remote1 = RemoteConnection::connect(&node1.listener()).await.unwrap();
        ready0.await.unwrap();
        ready1.await.unwrap();

        let burst = 5u64;
        for _ in 0..burst {
            node0.bridge().publish_local("hello", payload.clone()).unwrap();
        }

        for _ in 0..burst {
            timeout(Duration::from_secs(10), remote1.recv())
                .await
                .expect("node 1 should see the burst")
                .expect("delivery");
        }

        // Everything has flowed; node 0's remote saw nothing.
        timeout(Duration::from_millis(200), remote0.recv())
            .await
            .expect_err("no echo at the origin");
        assert_eq!(node0.stats().echoes_suppressed, burst);
        assert_eq!(node0.stats().delivered, 0);
        assert_eq!(node1.stats().delivered, burst);

        node0.shutdown().await;
        node1.shutdown().await;
        store.stop();
    }

    #[tokio::test]
    async fn test_no_echo_small_payload() {
        assert_no_echo(Payload::from("world")).await;
    }

    #[tokio::test]
    async fn test_no_echo_large_payload() {
        assert_no_echo(fixture::json_text_payload(2 * 1024 * 1024)).await;
    }
}
