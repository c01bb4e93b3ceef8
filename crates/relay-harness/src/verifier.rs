//! # Delivery Verifier
//!
//! A bounded counter with terminal states. `Pending -> Satisfied` on the
//! Nth recorded delivery; any record beyond the bound transitions to
//! `Violated`, which is terminal and surfaces immediately. Reaching the
//! bound exactly is the scenario's completion signal; exceeding it is the
//! primary bug class this harness exists to catch.

use crate::HarnessError;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error};

/// Verifier lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifierState {
    /// Fewer than `expected` deliveries recorded.
    Pending,
    /// Exactly `expected` deliveries recorded.
    Satisfied,
    /// More than `expected` deliveries recorded. Terminal.
    Violated,
}

/// Counts deliveries against an exact expected count.
///
/// The counter is recorded from the receive callback on the event loop;
/// violation checks happen synchronously inside [`record`]
/// (DeliveryVerifier::record), never deferred.
pub struct DeliveryVerifier {
    expected: u64,
    received: AtomicU64,
    state_tx: watch::Sender<VerifierState>,
}

impl DeliveryVerifier {
    /// Create a verifier expecting exactly `count` deliveries.
    #[must_use]
    pub fn expect(count: u64) -> Arc<Self> {
        let initial = if count == 0 {
            VerifierState::Satisfied
        } else {
            VerifierState::Pending
        };
        let (state_tx, _) = watch::channel(initial);
        Arc::new(Self {
            expected: count,
            received: AtomicU64::new(0),
            state_tx,
        })
    }

    /// Record one delivery.
    ///
    /// Returns the over-delivery error on the call that crosses the bound;
    /// the violation is also visible to every waiter immediately.
    pub fn record(&self) -> Result<(), HarnessError> {
        let received = self.received.fetch_add(1, Ordering::SeqCst) + 1;

        if received < self.expected {
            return Ok(());
        }
        if received == self.expected {
            self.transition(VerifierState::Satisfied);
            debug!(expected = self.expected, "Delivery count satisfied");
            return Ok(());
        }

        self.transition(VerifierState::Violated);
        error!(
            expected = self.expected,
            received, "Over-delivery detected"
        );
        Err(HarnessError::OverDelivery {
            expected: self.expected,
            received,
        })
    }

    /// Terminality: `Violated` is never overwritten.
    fn transition(&self, next: VerifierState) {
        self.state_tx.send_if_modified(|state| {
            if *state == VerifierState::Violated || *state == next {
                false
            } else {
                *state = next;
                true
            }
        });
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> VerifierState {
        *self.state_tx.borrow()
    }

    /// Deliveries recorded so far.
    #[must_use]
    pub fn received(&self) -> u64 {
        self.received.load(Ordering::SeqCst)
    }

    /// The exact expected count.
    #[must_use]
    pub fn expected(&self) -> u64 {
        self.expected
    }

    /// Wait until satisfied, violated, or the scenario timeout expires.
    ///
    /// Under-delivery at expiry is reported as [`HarnessError::Timeout`],
    /// distinct from over-delivery.
    pub async fn wait(&self, limit: Duration) -> Result<(), HarnessError> {
        let mut state_rx = self.state_tx.subscribe();
        let outcome = tokio::time::timeout(limit, async {
            loop {
                match *state_rx.borrow_and_update() {
                    VerifierState::Satisfied => return Ok(()),
                    VerifierState::Violated => {
                        return Err(HarnessError::OverDelivery {
                            expected: self.expected,
                            received: self.received(),
                        })
                    }
                    VerifierState::Pending => {}
                }
                if state_rx.changed().await.is_err() {
                    // Sender lives inside self; unreachable in practice.
                    return Err(HarnessError::Timeout {
                        expected: self.expected,
                        received: self.received(),
                    });
                }
            }
        })
        .await;

        match outcome {
            Ok(verdict) => verdict,
            Err(_) => Err(HarnessError::Timeout {
                expected: self.expected,
                received: self.received(),
            }),
        }
    }
}
