//! Cross-crate conformance scenarios.

pub mod client_variants;
pub mod echo;
pub mod exact_delivery;
pub mod payload_integrity;
pub mod teardown;

#[cfg(test)]
pub(crate) mod support {
    use relay_bridge::RelayBridge;
    use relay_bus::{BackingStore, BusConnectionPair};
    use relay_types::{ClientVariant, NodeId};
    use std::sync::Arc;

    /// Install the test log subscriber once per process.
    pub fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    /// One connected bridge on the given store.
    pub async fn bridge_on(
        store: &BackingStore,
        id: u16,
        variant: ClientVariant,
    ) -> Arc<RelayBridge> {
        let pair = BusConnectionPair::open(&store.address(), variant)
            .await
            .expect("open pair");
        RelayBridge::connect(NodeId(id), pair)
            .await
            .expect("connect bridge")
    }
}
