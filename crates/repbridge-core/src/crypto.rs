// crates/repbridge-core/src/crypto.rs
//
// Hashing, record address derivation, and ed25519 signatures for admin
// requests.

use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};

use crate::error::RepBridgeError;
use crate::identity::{AccountId, RecordAddress};

/// Domain-separation seed for bridged-reputation record addresses.
pub const RECORD_SEED: &[u8] = b"bridged_rep";

/// An ed25519 keypair held by a bridge admin.
#[derive(Debug)]
pub struct Keypair {
    pub signing_key: SigningKey,
    pub verifying_key: VerifyingKey,
}

impl Keypair {
    /// Generate a new random ed25519 keypair.
    pub fn generate() -> Self {
        let signing_key = SigningKey::generate(&mut OsRng);
        let verifying_key = signing_key.verifying_key();
        Keypair {
            signing_key,
            verifying_key,
        }
    }

    /// Rebuild a keypair from its 32-byte secret.
    pub fn from_secret(secret: &[u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(secret);
        let verifying_key = signing_key.verifying_key();
        Keypair {
            signing_key,
            verifying_key,
        }
    }

    /// The account identity of this keypair (its public key).
    pub fn account_id(&self) -> AccountId {
        AccountId(self.verifying_key.to_bytes())
    }

    /// Sign a message and return the 64 signature bytes.
    pub fn sign(&self, message: &[u8]) -> Vec<u8> {
        self.signing_key.sign(message).to_bytes().to_vec()
    }
}

/// Verify an ed25519 signature by `signer` over `message`.
///
/// Returns `Ok(false)` for a well-formed but wrong signature.
pub fn verify_signature(
    signer: &AccountId,
    message: &[u8],
    signature_bytes: &[u8],
) -> Result<bool, RepBridgeError> {
    let verifying_key = VerifyingKey::from_bytes(signer.as_bytes())
        .map_err(|_| RepBridgeError::Unauthorized)?;

    let signature_array: [u8; 64] = signature_bytes
        .try_into()
        .map_err(|_| RepBridgeError::Serialization("Signature must be exactly 64 bytes".to_string()))?;

    let signature = ed25519_dalek::Signature::from_bytes(&signature_array);

    Ok(verifying_key.verify(message, &signature).is_ok())
}

/// Canonical bytes an admin signs to authorize `operation` with `argument`.
///
/// Format: `repbridge:{operation}:{argument}:{issued_at}`.
pub fn admin_message(operation: &str, argument: &str, issued_at: i64) -> Vec<u8> {
    format!("repbridge:{}:{}:{}", operation, argument, issued_at).into_bytes()
}

/// Compute SHA-256 of the given bytes.
pub fn hash_bytes(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Derive the storage address of an agent's bridged-reputation record.
///
/// `sha256(RECORD_SEED || len(agent) as u32 LE || agent)`. The length is
/// folded in so no two distinct agents share a preimage.
pub fn derive_record_address(agent: &[u8]) -> RecordAddress {
    let mut preimage = Vec::with_capacity(RECORD_SEED.len() + 4 + agent.len());
    preimage.extend_from_slice(RECORD_SEED);
    preimage.extend_from_slice(&(agent.len() as u32).to_le_bytes());
    preimage.extend_from_slice(agent);
    RecordAddress(hash_bytes(&preimage))
}
