// crates/repbridge-rpc/src/handlers/query.rs
//
// Query handlers: GetState, GetReputation. Read-only.

use serde::{Deserialize, Serialize};

use repbridge_core::error::RepBridgeError;
use repbridge_core::identity::{hex_bytes, RecordAddress};
use repbridge_core::state::{BridgedReputation, ProgramState};
use repbridge_receiver::{MessageReceiver, ReputationLedger};

// ---------------------------------------------------------------------------
// GetState
// ---------------------------------------------------------------------------

/// Request for the program state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GetStateRequest {}

/// Handle a GetState request.
pub async fn handle_get_state(
    receiver: &MessageReceiver,
    _request: GetStateRequest,
) -> Result<ProgramState, RepBridgeError> {
    receiver.program_state().await
}

// ---------------------------------------------------------------------------
// GetReputation
// ---------------------------------------------------------------------------

/// Request for one agent's bridged reputation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetReputationRequest {
    /// Agent identity bytes, hex-encoded.
    #[serde(with = "hex_bytes")]
    pub agent: Vec<u8>,
}

/// Response with the agent's record and where it lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetReputationResponse {
    pub address: RecordAddress,
    pub record: BridgedReputation,
}

/// Handle a GetReputation request. Fails with `NotFound` for an agent
/// nothing has been bridged for.
pub async fn handle_get_reputation(
    receiver: &MessageReceiver,
    request: GetReputationRequest,
) -> Result<GetReputationResponse, RepBridgeError> {
    let record = receiver.query_reputation(&request.agent).await?;
    Ok(GetReputationResponse {
        address: ReputationLedger::locate(&request.agent),
        record,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use repbridge_core::identity::AccountId;
    use repbridge_core::Attestation;
    use repbridge_receiver::{FixedClock, InboundMessage, TrustedRemotes};
    use repbridge_store::MemoryStore;

    fn receiver() -> MessageReceiver {
        MessageReceiver::new(
            Arc::new(MemoryStore::new()),
            TrustedRemotes::new().with_remote(84532, AccountId::ZERO),
        )
        .with_clock(Arc::new(FixedClock::new(1_700_000_123)))
    }

    #[tokio::test]
    async fn test_get_state_before_and_after_init() {
        let receiver = receiver();
        let err = handle_get_state(&receiver, GetStateRequest {})
            .await
            .unwrap_err();
        assert_eq!(err, RepBridgeError::NotInitialized);

        receiver.initialize(AccountId([9u8; 32])).await.unwrap();
        let state = handle_get_state(&receiver, GetStateRequest {}).await.unwrap();
        assert_eq!(state.admin, AccountId([9u8; 32]));
        assert_eq!(state.total_bridged, 0);
    }

    #[tokio::test]
    async fn test_get_reputation() {
        let receiver = receiver();
        receiver.initialize(AccountId([9u8; 32])).await.unwrap();
        let agent = vec![0x42; 20];

        let err = handle_get_reputation(&receiver, GetReputationRequest { agent: agent.clone() })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "NotFound");

        let payload = Attestation {
            agent: agent.clone(),
            score: 910,
            source_chain: 84532,
            timestamp: 1_700_000_000,
            nonce: 2,
            attestation_id: [5u8; 32],
        }
        .encode();
        receiver
            .handle_message(&InboundMessage {
                origin: 84532,
                sender: AccountId::ZERO,
                payload,
            })
            .await
            .unwrap();

        let resp = handle_get_reputation(&receiver, GetReputationRequest { agent: agent.clone() })
            .await
            .unwrap();
        assert_eq!(resp.address, ReputationLedger::locate(&agent));
        assert_eq!(resp.record.score, 910);
        assert_eq!(resp.record.nonce, 2);
        assert_eq!(resp.record.last_updated, 1_700_000_123);
        assert_eq!(resp.record.attested_at, 1_700_000_000);
    }
}
