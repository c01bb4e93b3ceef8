//! # Relay Types Crate
//!
//! Domain types shared across the relay crates.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All cross-crate types are defined here.
//! - **Envelope Integrity**: The [`Envelope`] is the sole wrapper for every
//!   message crossing the publish/subscribe boundary; its `origin` field is
//!   the authoritative identity used for echo suppression.
//! - **No hidden state**: Scenario shape is carried explicitly in
//!   [`ScenarioConfig`], never read ad hoc from the environment at use sites.

pub mod config;
pub mod envelope;
pub mod node;

pub use config::{ClientVariant, ScenarioConfig};
pub use envelope::{Envelope, Payload};
pub use node::{NodeId, NodeState};
