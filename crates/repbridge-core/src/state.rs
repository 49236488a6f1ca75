// crates/repbridge-core/src/state.rs
//
// Persistent bridge state: the per-deployment ProgramState singleton and
// the per-agent BridgedReputation record.

use serde::{Deserialize, Serialize};

use crate::identity::{hex32, hex_bytes, AccountId};

/// Deployment-wide state. Exactly one exists once `initialize` has run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramState {
    /// Account allowed to pause and unpause. Immutable after creation.
    pub admin: AccountId,
    /// When true, every inbound message is rejected.
    pub paused: bool,
    /// Count of successfully applied attestations.
    pub total_bridged: u64,
    /// `issued_at` of the last signed admin request applied. A signed
    /// request must carry a strictly later timestamp.
    #[serde(default)]
    pub last_admin_issued_at: i64,
}

impl ProgramState {
    /// Fresh state for a new deployment.
    pub fn new(admin: AccountId) -> Self {
        Self {
            admin,
            paused: false,
            total_bridged: 0,
            last_admin_issued_at: 0,
        }
    }
}

/// Latest bridged reputation for one agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgedReputation {
    pub is_initialized: bool,
    /// Raw agent identity bytes from the source chain.
    #[serde(with = "hex_bytes")]
    pub source_agent: Vec<u8>,
    pub score: u64,
    pub source_chain: u32,
    /// Replay watermark: highest nonce accepted so far.
    pub nonce: u64,
    /// Host time of the last successful write (unix seconds).
    pub last_updated: i64,
    /// Attestation timestamp of the accepted attestation.
    pub attested_at: u64,
    #[serde(with = "hex32")]
    pub attestation_id: [u8; 32],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_program_state_defaults() {
        let admin = AccountId([9u8; 32]);
        let state = ProgramState::new(admin);
        assert_eq!(state.admin, admin);
        assert!(!state.paused);
        assert_eq!(state.total_bridged, 0);
        assert_eq!(state.last_admin_issued_at, 0);
    }

    #[test]
    fn test_program_state_without_admin_mark_loads() {
        let json = serde_json::json!({
            "admin": AccountId([9u8; 32]),
            "paused": true,
            "total_bridged": 4,
        });
        let state: ProgramState = serde_json::from_value(json).unwrap();
        assert!(state.paused);
        assert_eq!(state.last_admin_issued_at, 0);
    }

    #[test]
    fn test_reputation_json_roundtrip() {
        let rep = BridgedReputation {
            is_initialized: true,
            source_agent: vec![0xde, 0xad],
            score: 850,
            source_chain: 84532,
            nonce: 3,
            last_updated: 1_700_000_100,
            attested_at: 1_700_000_000,
            attestation_id: [0xab; 32],
        };
        let json = serde_json::to_value(&rep).unwrap();
        assert_eq!(json["source_agent"], "dead");
        let back: BridgedReputation = serde_json::from_value(json).unwrap();
        assert_eq!(back, rep);
    }
}
