//! # Client Variant Matrix
//!
//! The two backing-store client implementations must be behaviorally
//! identical: same exact-count guarantee for small and large payloads,
//! four combinations verified independently.

#[cfg(test)]
mod tests {
    use crate::conformance::support;
    use relay_harness::Scenario;
    use relay_types::{ClientVariant, ScenarioConfig};
    use std::time::Duration;

    const FIVE_MB: usize = 5 * 1024 * 1024;

    async fn run_matrix_cell(variant: ClientVariant, payload_size: usize) {
        support::init_tracing();
        let config = ScenarioConfig {
            node_count: 2,
            emission_count: 50,
            interval: Duration::from_millis(10),
            payload_size,
            client_variant: variant,
        };
        let report = Scenario::new(config).run().await.unwrap();
        assert_eq!(report.delivered_total, 50);
        assert_eq!(report.origin_stats.published, 50);
        assert_eq!(report.origin_stats.decode_failures, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_legacy_client_small_payload() {
        run_matrix_cell(ClientVariant::Legacy, 0).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_legacy_client_large_payload() {
        run_matrix_cell(ClientVariant::Legacy, FIVE_MB).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_modern_client_small_payload() {
        run_matrix_cell(ClientVariant::Modern, 0).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_modern_client_large_payload() {
        run_matrix_cell(ClientVariant::Modern, FIVE_MB).await;
    }
}
