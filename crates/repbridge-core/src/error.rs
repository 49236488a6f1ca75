// crates/repbridge-core/src/error.rs
//
// Protocol-wide error types for RepBridge.
//
// Every rejection the receiver can produce has its own variant, a stable
// numeric code and a stable kind name, so remote callers can tell a replay
// apart from a pause or a malformed payload without parsing messages.

use thiserror::Error;

/// Base of the custom error code space. Codes are assigned in declaration
/// order and must never be renumbered once deployed.
pub const ERROR_CODE_BASE: u32 = 6000;

/// Failures of the attestation codec. Wrapped by
/// [`RepBridgeError::MalformedMessage`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The buffer ended before a fixed-size field or the agent bytes.
    #[error("truncated input reading {field}: needed {needed} bytes, {remaining} remaining")]
    TruncatedInput {
        field: &'static str,
        needed: usize,
        remaining: usize,
    },

    /// A length prefix declared an unacceptable size, or the declared
    /// attestation id bytes are not all present.
    #[error("invalid length for {field}: declared {declared}, expected {expected}")]
    InvalidLength {
        field: &'static str,
        declared: usize,
        expected: &'static str,
    },

    /// Bytes were left over after the final field.
    #[error("{remaining} trailing bytes after attestation")]
    TrailingBytes { remaining: usize },
}

impl DecodeError {
    /// Stable sub-kind name.
    pub fn kind(&self) -> &'static str {
        match self {
            DecodeError::TruncatedInput { .. } => "TruncatedInput",
            DecodeError::InvalidLength { .. } => "InvalidLength",
            DecodeError::TrailingBytes { .. } => "TrailingBytes",
        }
    }
}

/// Protocol-wide error type for RepBridge.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepBridgeError {
    /// Message received while the bridge is paused.
    #[error("Bridge is paused")]
    SystemPaused,

    /// The payload failed to decode.
    #[error("Invalid message format: {0}")]
    MalformedMessage(#[from] DecodeError),

    /// The incoming nonce is not strictly greater than the stored watermark,
    /// or a concurrent delivery for the same agent committed first.
    #[error("Message has already been processed (replay): incoming nonce {incoming}, stored nonce {stored}")]
    ReplayedMessage { stored: u64, incoming: u64 },

    /// The attestation timestamp falls outside the configured freshness window.
    #[error("Attestation is too old: age {age_secs}s, window {max_age_secs}s")]
    StaleAttestation { age_secs: i64, max_age_secs: u64 },

    /// No bridged reputation record exists for the requested agent.
    #[error("No bridged reputation found: {0}")]
    NotFound(String),

    /// `initialize` was called on a deployment that already has program state.
    #[error("Program state already initialized")]
    AlreadyInitialized,

    /// A non-admin caller attempted a privileged operation.
    #[error("Caller is not the bridge admin")]
    Unauthorized,

    /// Origin domain or sender did not match the trusted remote dispatcher.
    #[error("Untrusted origin: {0}")]
    UntrustedOrigin(String),

    /// Underlying persistence failure.
    #[error("Storage error: {0}")]
    Storage(String),

    /// An operation that needs program state ran before `initialize`.
    #[error("Program state not initialized")]
    NotInitialized,

    /// Serialization/deserialization of a stored value failed.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl RepBridgeError {
    /// Stable numeric error code.
    pub fn code(&self) -> u32 {
        let offset = match self {
            RepBridgeError::SystemPaused => 0,
            RepBridgeError::MalformedMessage(_) => 1,
            RepBridgeError::ReplayedMessage { .. } => 2,
            RepBridgeError::StaleAttestation { .. } => 3,
            RepBridgeError::NotFound(_) => 4,
            RepBridgeError::AlreadyInitialized => 5,
            RepBridgeError::Unauthorized => 6,
            RepBridgeError::UntrustedOrigin(_) => 7,
            RepBridgeError::Storage(_) => 8,
            RepBridgeError::NotInitialized => 9,
            RepBridgeError::Serialization(_) => 10,
        };
        ERROR_CODE_BASE + offset
    }

    /// Stable kind name, independent of the human-readable message.
    pub fn kind(&self) -> &'static str {
        match self {
            RepBridgeError::SystemPaused => "SystemPaused",
            RepBridgeError::MalformedMessage(_) => "MalformedMessage",
            RepBridgeError::ReplayedMessage { .. } => "ReplayedMessage",
            RepBridgeError::StaleAttestation { .. } => "StaleAttestation",
            RepBridgeError::NotFound(_) => "NotFound",
            RepBridgeError::AlreadyInitialized => "AlreadyInitialized",
            RepBridgeError::Unauthorized => "Unauthorized",
            RepBridgeError::UntrustedOrigin(_) => "UntrustedOrigin",
            RepBridgeError::Storage(_) => "StorageError",
            RepBridgeError::NotInitialized => "NotInitialized",
            RepBridgeError::Serialization(_) => "Serialization",
        }
    }
}

impl From<serde_json::Error> for RepBridgeError {
    fn from(e: serde_json::Error) -> Self {
        RepBridgeError::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replay_code_is_6002() {
        let err = RepBridgeError::ReplayedMessage {
            stored: 1,
            incoming: 1,
        };
        assert_eq!(err.code(), 6002);
        assert_eq!(err.kind(), "ReplayedMessage");
        assert!(err.to_string().contains("replay"));
    }

    #[test]
    fn test_codes_are_unique() {
        let all = vec![
            RepBridgeError::SystemPaused,
            RepBridgeError::MalformedMessage(DecodeError::TrailingBytes { remaining: 1 }),
            RepBridgeError::ReplayedMessage {
                stored: 0,
                incoming: 0,
            },
            RepBridgeError::StaleAttestation {
                age_secs: 0,
                max_age_secs: 0,
            },
            RepBridgeError::NotFound(String::new()),
            RepBridgeError::AlreadyInitialized,
            RepBridgeError::Unauthorized,
            RepBridgeError::UntrustedOrigin(String::new()),
            RepBridgeError::Storage(String::new()),
            RepBridgeError::NotInitialized,
            RepBridgeError::Serialization(String::new()),
        ];
        let mut codes: Vec<u32> = all.iter().map(|e| e.code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), all.len());
        assert_eq!(codes[0], ERROR_CODE_BASE);
    }

    #[test]
    fn test_decode_error_wraps_as_malformed() {
        let err: RepBridgeError = DecodeError::TruncatedInput {
            field: "score",
            needed: 8,
            remaining: 3,
        }
        .into();
        assert_eq!(err.kind(), "MalformedMessage");
        match err {
            RepBridgeError::MalformedMessage(inner) => assert_eq!(inner.kind(), "TruncatedInput"),
            other => panic!("Expected MalformedMessage, got: {:?}", other),
        }
    }
}
