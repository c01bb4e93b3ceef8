//! # Burst Driver
//!
//! Fires a fixed number of emissions at a fixed cadence from one origin
//! bridge. Emissions are fire-and-forget: nothing paces them by
//! acknowledgment, which is exactly the load shape that exposes relays
//! that fall behind on large payloads.

use relay_bridge::RelayBridge;
use relay_types::Payload;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

/// Schedules emission bursts.
pub struct BurstDriver;

impl BurstDriver {
    /// Emit `count` events named `event` from `origin`, spaced by
    /// `interval`.
    ///
    /// The schedule is non-cancelable once fired; dropping the returned
    /// handle detaches it. Publish failures (e.g. after teardown) are
    /// logged and do not stop the remaining schedule.
    pub fn fire(
        origin: Arc<RelayBridge>,
        event: &str,
        payload: Payload,
        count: u64,
        interval: Duration,
    ) -> JoinHandle<()> {
        let event = event.to_owned();
        info!(
            origin = %origin.node_id(),
            event = %event,
            count,
            interval_ms = interval.as_millis() as u64,
            payload_bytes = payload.len(),
            "Burst scheduled"
        );

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval.max(Duration::from_millis(1)));
            // Keep the cadence fixed; never pace by downstream progress.
            ticker.set_missed_tick_behavior(MissedTickBehavior::Burst);

            for i in 0..count {
                ticker.tick().await;
                if let Err(e) = origin.publish_local(&event, payload.clone()) {
                    warn!(
                        origin = %origin.node_id(),
                        emission = i,
                        error = %e,
                        "Burst emission failed"
                    );
                }
            }
        })
    }
}
