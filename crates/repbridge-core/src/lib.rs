// crates/repbridge-core/src/lib.rs
//
// repbridge-core: Core types, codec, and traits for the RepBridge
// cross-chain reputation bridge.
//
// This is the leaf crate that all other crates in the workspace depend on.
// It defines the attestation wire codec, the persistent state records,
// record address derivation, the error taxonomy, and the storage trait.

pub mod attestation;
pub mod crypto;
pub mod error;
pub mod event;
pub mod identity;
pub mod state;
pub mod traits;

// Re-export key types for ergonomic access from downstream crates.
pub use attestation::{Attestation, ATTESTATION_ID_LEN, MAX_AGENT_LEN};
pub use crypto::{derive_record_address, Keypair};
pub use error::{DecodeError, RepBridgeError};
pub use event::BridgeEvent;
pub use identity::{AccountId, RecordAddress};
pub use state::{BridgedReputation, ProgramState};
pub use traits::{BridgeStore, CommitOutcome, StateMutation};
