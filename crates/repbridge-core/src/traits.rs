// crates/repbridge-core/src/traits.rs

use async_trait::async_trait;

use crate::error::RepBridgeError;
use crate::identity::RecordAddress;
use crate::state::{BridgedReputation, ProgramState};

/// A mutation applied to `ProgramState` under the store's write lock.
///
/// Returning an error aborts the update with nothing written.
pub type StateMutation =
    Box<dyn FnOnce(&mut ProgramState) -> Result<(), RepBridgeError> + Send>;

/// Result of a compare-and-swap commit of a reputation record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// The record was written and the bridged counter incremented.
    Committed { total_bridged: u64 },
    /// The stored nonce no longer matched the expected value; nothing was written.
    Conflict { current_nonce: Option<u64> },
}

/// Durable bridge storage: the program state singleton plus reputation
/// records keyed by derived address.
///
/// Implemented by repbridge-store (in-memory and RocksDB backends).
#[async_trait]
pub trait BridgeStore: Send + Sync {
    /// Fetch the program state, if `initialize` has run.
    async fn program_state(&self) -> Result<Option<ProgramState>, RepBridgeError>;

    /// Create the program state. Fails with `AlreadyInitialized` if it exists.
    async fn create_program_state(&self, state: &ProgramState) -> Result<(), RepBridgeError>;

    /// Atomically read-modify-write the program state.
    ///
    /// Fails with `NotInitialized` if there is no state. Returns the state
    /// as written.
    async fn update_program_state(
        &self,
        mutation: StateMutation,
    ) -> Result<ProgramState, RepBridgeError>;

    /// Fetch a reputation record by address.
    async fn reputation(
        &self,
        address: &RecordAddress,
    ) -> Result<Option<BridgedReputation>, RepBridgeError>;

    /// Write `record` at `address` only if the stored nonce still equals
    /// `expected_nonce` (`None` meaning no record exists), and increment
    /// `ProgramState::total_bridged` in the same atomic step.
    async fn commit_reputation(
        &self,
        address: &RecordAddress,
        expected_nonce: Option<u64>,
        record: &BridgedReputation,
    ) -> Result<CommitOutcome, RepBridgeError>;
}
