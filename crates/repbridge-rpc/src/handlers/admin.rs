// crates/repbridge-rpc/src/handlers/admin.rs
//
// Admin handlers: Initialize, SetPaused.
//
// Every admin request is signed. The caller's ed25519 public key is its
// account identity; the signature covers
// `repbridge:{operation}:{argument}:{issued_at}` and is only honored within
// the configured TTL of `issued_at`. Once verified, the caller identity is
// handed to the receiver, which applies the admin check itself. A signed
// SetPaused is applied at most once: the receiver only accepts an
// `issued_at` later than the last one it applied.

use serde::{Deserialize, Serialize};

use repbridge_core::crypto::{admin_message, verify_signature};
use repbridge_core::error::RepBridgeError;
use repbridge_core::identity::{hex_bytes, AccountId};
use repbridge_core::state::ProgramState;
use repbridge_receiver::MessageReceiver;

/// Operation name signed for `admin/initialize`.
pub const OP_INITIALIZE: &str = "initialize";
/// Operation name signed for `admin/set_paused`.
pub const OP_SET_PAUSED: &str = "set_paused";

/// Signature block carried by every admin request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminAuth {
    /// Caller's ed25519 public key.
    pub caller: AccountId,
    /// Unix seconds at which the request was signed.
    pub issued_at: i64,
    /// 64-byte ed25519 signature, hex-encoded.
    #[serde(with = "hex_bytes")]
    pub signature: Vec<u8>,
}

/// Check an admin request's signature and age, returning the caller.
pub fn verify_admin_auth(
    auth: &AdminAuth,
    operation: &str,
    argument: &str,
    now: i64,
    ttl_secs: u64,
) -> Result<AccountId, RepBridgeError> {
    let skew = now.saturating_sub(auth.issued_at).unsigned_abs();
    if skew > ttl_secs {
        tracing::warn!(
            "Admin request {} from {} outside signature window: issued_at={} now={}",
            operation,
            auth.caller,
            auth.issued_at,
            now
        );
        return Err(RepBridgeError::Unauthorized);
    }

    let message = admin_message(operation, argument, auth.issued_at);
    if !verify_signature(&auth.caller, &message, &auth.signature)? {
        tracing::warn!("Admin request {} from {} has a bad signature", operation, auth.caller);
        return Err(RepBridgeError::Unauthorized);
    }
    Ok(auth.caller)
}

// ---------------------------------------------------------------------------
// Initialize
// ---------------------------------------------------------------------------

/// Request to create the program state. The signer becomes the admin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitializeRequest {
    #[serde(flatten)]
    pub auth: AdminAuth,
}

/// Handle an Initialize request.
pub async fn handle_initialize(
    receiver: &MessageReceiver,
    request: InitializeRequest,
    now: i64,
    ttl_secs: u64,
) -> Result<ProgramState, RepBridgeError> {
    let argument = request.auth.caller.to_string();
    let admin = verify_admin_auth(&request.auth, OP_INITIALIZE, &argument, now, ttl_secs)?;
    receiver.initialize(admin).await
}

// ---------------------------------------------------------------------------
// SetPaused
// ---------------------------------------------------------------------------

/// Request to set the pause flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetPausedRequest {
    pub paused: bool,
    #[serde(flatten)]
    pub auth: AdminAuth,
}

/// Handle a SetPaused request.
pub async fn handle_set_paused(
    receiver: &MessageReceiver,
    request: SetPausedRequest,
    now: i64,
    ttl_secs: u64,
) -> Result<ProgramState, RepBridgeError> {
    let argument = request.paused.to_string();
    let caller = verify_admin_auth(&request.auth, OP_SET_PAUSED, &argument, now, ttl_secs)?;
    receiver
        .set_paused_signed(caller, request.paused, request.auth.issued_at)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use repbridge_core::Keypair;
    use repbridge_receiver::TrustedRemotes;
    use repbridge_store::MemoryStore;

    const NOW: i64 = 1_700_000_000;
    const TTL: u64 = 300;

    fn sign(keypair: &Keypair, operation: &str, argument: &str, issued_at: i64) -> AdminAuth {
        AdminAuth {
            caller: keypair.account_id(),
            issued_at,
            signature: keypair.sign(&admin_message(operation, argument, issued_at)),
        }
    }

    fn receiver() -> MessageReceiver {
        MessageReceiver::new(Arc::new(MemoryStore::new()), TrustedRemotes::new())
    }

    fn init_request(keypair: &Keypair, issued_at: i64) -> InitializeRequest {
        InitializeRequest {
            auth: sign(
                keypair,
                OP_INITIALIZE,
                &keypair.account_id().to_string(),
                issued_at,
            ),
        }
    }

    #[tokio::test]
    async fn test_signed_initialize_sets_signer_as_admin() {
        let receiver = receiver();
        let admin = Keypair::generate();
        let state = handle_initialize(&receiver, init_request(&admin, NOW), NOW, TTL)
            .await
            .unwrap();
        assert_eq!(state.admin, admin.account_id());

        let err = handle_initialize(&receiver, init_request(&admin, NOW), NOW, TTL)
            .await
            .unwrap_err();
        assert_eq!(err, RepBridgeError::AlreadyInitialized);
    }

    #[tokio::test]
    async fn test_set_paused_requires_admin_signer() {
        let receiver = receiver();
        let admin = Keypair::generate();
        let other = Keypair::generate();
        handle_initialize(&receiver, init_request(&admin, NOW), NOW, TTL)
            .await
            .unwrap();

        let request = SetPausedRequest {
            paused: true,
            auth: sign(&other, OP_SET_PAUSED, "true", NOW),
        };
        let err = handle_set_paused(&receiver, request, NOW, TTL)
            .await
            .unwrap_err();
        assert_eq!(err, RepBridgeError::Unauthorized);

        let request = SetPausedRequest {
            paused: true,
            auth: sign(&admin, OP_SET_PAUSED, "true", NOW),
        };
        let state = handle_set_paused(&receiver, request, NOW + 10, TTL)
            .await
            .unwrap();
        assert!(state.paused);
    }

    #[tokio::test]
    async fn test_captured_pause_request_cannot_be_resubmitted() {
        let receiver = receiver();
        let admin = Keypair::generate();
        handle_initialize(&receiver, init_request(&admin, NOW), NOW, TTL)
            .await
            .unwrap();

        let captured = SetPausedRequest {
            paused: true,
            auth: sign(&admin, OP_SET_PAUSED, "true", NOW),
        };
        let state = handle_set_paused(&receiver, captured.clone(), NOW, TTL)
            .await
            .unwrap();
        assert!(state.paused);

        let unpause = SetPausedRequest {
            paused: false,
            auth: sign(&admin, OP_SET_PAUSED, "false", NOW + 5),
        };
        let state = handle_set_paused(&receiver, unpause, NOW + 5, TTL)
            .await
            .unwrap();
        assert!(!state.paused);

        // Still inside the signature window, but already applied.
        let err = handle_set_paused(&receiver, captured, NOW + 200, TTL)
            .await
            .unwrap_err();
        assert_eq!(err, RepBridgeError::Unauthorized);
        assert!(!receiver.program_state().await.unwrap().paused);
    }

    #[test]
    fn test_signature_bound_to_argument() {
        let admin = Keypair::generate();
        // Signed for "true", submitted as "false".
        let auth = sign(&admin, OP_SET_PAUSED, "true", NOW);
        assert_eq!(
            verify_admin_auth(&auth, OP_SET_PAUSED, "false", NOW, TTL).unwrap_err(),
            RepBridgeError::Unauthorized
        );
        assert_eq!(
            verify_admin_auth(&auth, OP_INITIALIZE, "true", NOW, TTL).unwrap_err(),
            RepBridgeError::Unauthorized
        );
        assert_eq!(
            verify_admin_auth(&auth, OP_SET_PAUSED, "true", NOW, TTL).unwrap(),
            admin.account_id()
        );
    }

    #[test]
    fn test_signature_expires() {
        let admin = Keypair::generate();
        let auth = sign(&admin, OP_SET_PAUSED, "true", NOW);
        assert!(verify_admin_auth(&auth, OP_SET_PAUSED, "true", NOW + 300, TTL).is_ok());
        assert!(verify_admin_auth(&auth, OP_SET_PAUSED, "true", NOW + 301, TTL).is_err());
        assert!(verify_admin_auth(&auth, OP_SET_PAUSED, "true", NOW - 301, TTL).is_err());
    }

    #[test]
    fn test_request_json_is_flat() {
        let admin = Keypair::generate();
        let request = SetPausedRequest {
            paused: false,
            auth: sign(&admin, OP_SET_PAUSED, "false", NOW),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["paused"], false);
        assert_eq!(json["issued_at"], NOW);
        assert!(json["caller"].is_string());
        assert!(json["signature"].is_string());
    }
}
