//! # Conformance Runner
//!
//! Runs one relay scenario shaped by `RELAY_*` environment variables and
//! reports the verdict. Useful for soak runs outside the test suite:
//!
//! ```bash
//! RELAY_NODE_COUNT=4 RELAY_PAYLOAD_SIZE=5242880 cargo run -p relay-harness
//! ```

use anyhow::Result;
use relay_harness::Scenario;
use relay_types::ScenarioConfig;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ScenarioConfig::from_env();
    let report = Scenario::new(config).run().await?;

    info!(
        scenario = %report.scenario_id,
        delivered = report.delivered_total,
        elapsed_ms = report.elapsed.as_millis() as u64,
        published = report.origin_stats.published,
        echoes_suppressed = report.origin_stats.echoes_suppressed,
        "Conformance scenario passed"
    );
    Ok(())
}
