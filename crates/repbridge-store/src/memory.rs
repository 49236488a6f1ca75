// crates/repbridge-store/src/memory.rs
//
// In-memory `BridgeStore` for tests and ephemeral deployments.
//
// Program state and all records sit behind one tokio RwLock, so a commit's
// nonce compare, record write, and counter increment happen under a single
// write guard.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use repbridge_core::error::RepBridgeError;
use repbridge_core::identity::RecordAddress;
use repbridge_core::state::{BridgedReputation, ProgramState};
use repbridge_core::traits::{BridgeStore, CommitOutcome, StateMutation};

#[derive(Debug, Default)]
struct Inner {
    program_state: Option<ProgramState>,
    records: HashMap<RecordAddress, BridgedReputation>,
}

/// In-memory bridge store. Contents are lost when dropped.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of reputation records held.
    pub async fn len(&self) -> usize {
        self.inner.read().await.records.len()
    }

    /// Whether no reputation records are held.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl BridgeStore for MemoryStore {
    async fn program_state(&self) -> Result<Option<ProgramState>, RepBridgeError> {
        Ok(self.inner.read().await.program_state.clone())
    }

    async fn create_program_state(&self, state: &ProgramState) -> Result<(), RepBridgeError> {
        let mut inner = self.inner.write().await;
        if inner.program_state.is_some() {
            return Err(RepBridgeError::AlreadyInitialized);
        }
        inner.program_state = Some(state.clone());
        Ok(())
    }

    async fn update_program_state(
        &self,
        mutation: StateMutation,
    ) -> Result<ProgramState, RepBridgeError> {
        let mut inner = self.inner.write().await;
        let current = inner
            .program_state
            .as_ref()
            .ok_or(RepBridgeError::NotInitialized)?;

        // Mutate a copy so a failed mutation leaves the stored state untouched.
        let mut next = current.clone();
        mutation(&mut next)?;
        inner.program_state = Some(next.clone());
        Ok(next)
    }

    async fn reputation(
        &self,
        address: &RecordAddress,
    ) -> Result<Option<BridgedReputation>, RepBridgeError> {
        Ok(self.inner.read().await.records.get(address).cloned())
    }

    async fn commit_reputation(
        &self,
        address: &RecordAddress,
        expected_nonce: Option<u64>,
        record: &BridgedReputation,
    ) -> Result<CommitOutcome, RepBridgeError> {
        let mut inner = self.inner.write().await;

        let current_nonce = inner.records.get(address).map(|r| r.nonce);
        if current_nonce != expected_nonce {
            return Ok(CommitOutcome::Conflict { current_nonce });
        }

        let total_bridged = {
            let state = inner
                .program_state
                .as_mut()
                .ok_or(RepBridgeError::NotInitialized)?;
            state.total_bridged += 1;
            state.total_bridged
        };
        inner.records.insert(*address, record.clone());

        Ok(CommitOutcome::Committed { total_bridged })
    }
}
