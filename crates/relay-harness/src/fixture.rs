//! # Payload Fixtures
//!
//! Deterministic stand-ins for the external fixture blob used by
//! large-payload scenarios. Loading real fixture files is an external
//! concern; these generators produce equivalent opaque bodies.

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use relay_types::Payload;

/// Fixed seed so fixture bodies are identical across runs.
const FIXTURE_SEED: u64 = 0x52454c41590a;

/// A JSON-encoded string payload of at least `size` bytes.
///
/// The body is a JSON document (`{"blob":"..."}`) so the bytes crossing the
/// bus look like the serialized fixtures real deployments relay.
#[must_use]
pub fn json_text_payload(size: usize) -> Payload {
    let mut rng = StdRng::seed_from_u64(FIXTURE_SEED);
    let alphabet = b"abcdefghijklmnopqrstuvwxyz0123456789";
    let filler: String = (0..size)
        .map(|_| alphabet[rng.gen_range(0..alphabet.len())] as char)
        .collect();
    Payload::Text(format!("{{\"blob\":\"{filler}\"}}"))
}

/// A binary payload of exactly `size` pseudo-random bytes.
#[must_use]
pub fn binary_payload(size: usize) -> Payload {
    let mut rng = StdRng::seed_from_u64(FIXTURE_SEED);
    let mut body = vec![0u8; size];
    rng.fill_bytes(&mut body);
    Payload::Binary(body)
}

/// Payload for a scenario: the small inline body when `size` is zero,
/// otherwise a JSON-encoded text blob of at least `size` bytes.
#[must_use]
pub fn scenario_payload(size: usize) -> Payload {
    if size == 0 {
        Payload::from("world")
    } else {
        json_text_payload(size)
    }
}
