// crates/repbridge-receiver/src/ledger.rs
//
// Bridged-reputation ledger: locate, read, and apply agent records over a
// `BridgeStore`.
//
// `apply` is the only write path for reputation data. It commits through
// the store's compare-and-swap against the nonce the caller read, so two
// deliveries racing on one agent cannot both land.

use std::sync::Arc;

use repbridge_core::crypto::derive_record_address;
use repbridge_core::error::RepBridgeError;
use repbridge_core::identity::RecordAddress;
use repbridge_core::state::BridgedReputation;
use repbridge_core::traits::{BridgeStore, CommitOutcome};
use repbridge_core::Attestation;

/// Agent-keyed view of the store's reputation records.
#[derive(Clone)]
pub struct ReputationLedger {
    store: Arc<dyn BridgeStore>,
}

impl ReputationLedger {
    pub fn new(store: Arc<dyn BridgeStore>) -> Self {
        Self { store }
    }

    /// Deterministic record address for an agent.
    pub fn locate(agent: &[u8]) -> RecordAddress {
        derive_record_address(agent)
    }

    /// Fetch the agent's record, if any attestation has been applied.
    pub async fn fetch(&self, agent: &[u8]) -> Result<Option<BridgedReputation>, RepBridgeError> {
        self.store.reputation(&Self::locate(agent)).await
    }

    /// The agent's replay watermark, if a record exists.
    pub async fn read_nonce(&self, agent: &[u8]) -> Result<Option<u64>, RepBridgeError> {
        Ok(self.fetch(agent).await?.map(|record| record.nonce))
    }

    /// Write the attestation's fields into the agent's record, creating it
    /// on first use, provided the stored nonce still equals `expected_nonce`.
    pub async fn apply(
        &self,
        attestation: &Attestation,
        expected_nonce: Option<u64>,
        now: i64,
    ) -> Result<(BridgedReputation, CommitOutcome), RepBridgeError> {
        let address = Self::locate(&attestation.agent);
        let record = BridgedReputation {
            is_initialized: true,
            source_agent: attestation.agent.clone(),
            score: attestation.score,
            source_chain: attestation.source_chain,
            nonce: attestation.nonce,
            last_updated: now,
            attested_at: attestation.timestamp,
            attestation_id: attestation.attestation_id,
        };
        let outcome = self
            .store
            .commit_reputation(&address, expected_nonce, &record)
            .await?;
        Ok((record, outcome))
    }
}

impl std::fmt::Debug for ReputationLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReputationLedger").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use repbridge_core::identity::AccountId;
    use repbridge_core::state::ProgramState;
    use repbridge_store::MemoryStore;

    fn attestation(agent: &[u8], nonce: u64) -> Attestation {
        Attestation {
            agent: agent.to_vec(),
            score: 700,
            source_chain: 84532,
            timestamp: 1_700_000_000,
            nonce,
            attestation_id: [1u8; 32],
        }
    }

    async fn ledger() -> ReputationLedger {
        let store = Arc::new(MemoryStore::new());
        store
            .create_program_state(&ProgramState::new(AccountId::ZERO))
            .await
            .unwrap();
        ReputationLedger::new(store)
    }

    #[tokio::test]
    async fn test_read_nonce_absent_then_present() {
        let ledger = ledger().await;
        assert_eq!(ledger.read_nonce(b"agent-a").await.unwrap(), None);

        let (record, outcome) = ledger
            .apply(&attestation(b"agent-a", 4), None, 1_700_000_050)
            .await
            .unwrap();
        assert_eq!(outcome, CommitOutcome::Committed { total_bridged: 1 });
        assert!(record.is_initialized);
        assert_eq!(record.last_updated, 1_700_000_050);
        assert_eq!(ledger.read_nonce(b"agent-a").await.unwrap(), Some(4));
    }

    #[tokio::test]
    async fn test_agents_are_independent() {
        let ledger = ledger().await;
        ledger.apply(&attestation(b"agent-a", 9), None, 0).await.unwrap();
        assert_eq!(ledger.read_nonce(b"agent-b").await.unwrap(), None);
        assert_ne!(ReputationLedger::locate(b"agent-a"), ReputationLedger::locate(b"agent-b"));
    }

    #[tokio::test]
    async fn test_apply_with_stale_expectation_conflicts() {
        let ledger = ledger().await;
        ledger.apply(&attestation(b"agent-a", 1), None, 0).await.unwrap();
        let (_, outcome) = ledger
            .apply(&attestation(b"agent-a", 2), None, 0)
            .await
            .unwrap();
        assert_eq!(
            outcome,
            CommitOutcome::Conflict {
                current_nonce: Some(1)
            }
        );
        assert_eq!(ledger.read_nonce(b"agent-a").await.unwrap(), Some(1));
    }
}
