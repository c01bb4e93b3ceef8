//! # Fanout-Relay Conformance Suite
//!
//! Unified test crate for cross-crate relay properties.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── conformance/
//!     ├── exact_delivery.rs    # exactly-K guarantees, over/under verdicts
//!     ├── payload_integrity.rs # byte-equality, multi-megabyte bodies
//!     ├── client_variants.rs   # legacy/modern × small/large matrix
//!     ├── echo.rs              # no-echo invariant
//!     └── teardown.rs          # idempotent cleanup
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All conformance scenarios
//! cargo test -p relay-tests
//!
//! # By category
//! cargo test -p relay-tests conformance::exact_delivery::
//! cargo test -p relay-tests conformance::payload_integrity::
//! ```
//!
//! Timer-driven scenarios run under tokio's paused clock, so the canonical
//! 600-emission burst at 100 ms spacing completes in milliseconds of wall
//! time without weakening its timing semantics.

#![allow(dead_code)]

pub mod conformance;
