// crates/repbridge-receiver/src/replay.rs
//
// Replay guard: strict per-agent nonce ordering.
//
// Stateless. The watermark lives in the agent's BridgedReputation record and
// is re-checked by the store's compare-and-swap at commit time.

/// Whether an incoming nonce may be applied over the stored watermark.
///
/// True iff there is no record yet or `incoming` is strictly greater than
/// the stored nonce. Equal or lower nonces are always replays.
pub fn accepts(existing_nonce: Option<u64>, incoming_nonce: u64) -> bool {
    match existing_nonce {
        None => true,
        Some(stored) => incoming_nonce > stored,
    }
}
