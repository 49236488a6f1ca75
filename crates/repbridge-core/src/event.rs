// crates/repbridge-core/src/event.rs
//
// Events published by the receiver after a state change commits.
// Rejected operations publish nothing.

use serde::{Deserialize, Serialize};

use crate::identity::{hex32, hex_bytes, AccountId};

/// A committed bridge state change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum BridgeEvent {
    /// Program state was created.
    Initialized { admin: AccountId },
    /// The admin set the pause flag (possibly to its current value).
    PauseSet { paused: bool },
    /// An attestation was applied to an agent's record.
    ReputationBridged {
        #[serde(with = "hex_bytes")]
        source_agent: Vec<u8>,
        score: u64,
        source_chain: u32,
        nonce: u64,
        #[serde(with = "hex32")]
        attestation_id: [u8; 32],
        total_bridged: u64,
    },
}
