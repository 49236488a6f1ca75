// crates/repbridge-core/src/identity.rs
//
// Fixed-width identities used across the bridge: account identities
// (admins, remote dispatchers) and derived record addresses.
//
// Both serialize as lowercase hex strings so JSON-RPC payloads and stored
// values stay readable.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RepBridgeError;

/// A 32-byte account identity (an ed25519 public key for admins, a
/// transport-reported sender address for remote dispatchers).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AccountId(#[serde(with = "hex32")] pub [u8; 32]);

impl AccountId {
    /// The all-zero identity.
    pub const ZERO: AccountId = AccountId([0u8; 32]);

    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl FromStr for AccountId {
    type Err = RepBridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_hex32(s).map(AccountId)
    }
}

impl From<[u8; 32]> for AccountId {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

/// Deterministic storage address of a bridged-reputation record.
///
/// Derived from the agent identity alone, see [`crate::crypto::derive_record_address`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordAddress(#[serde(with = "hex32")] pub [u8; 32]);

impl RecordAddress {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for RecordAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl FromStr for RecordAddress {
    type Err = RepBridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_hex32(s).map(RecordAddress)
    }
}

/// Parse a 32-byte value from hex, with or without a `0x` prefix.
pub fn parse_hex32(s: &str) -> Result<[u8; 32], RepBridgeError> {
    let bytes = parse_hex(s)?;
    bytes.as_slice().try_into().map_err(|_| {
        RepBridgeError::Serialization(format!("expected 32 bytes of hex, got {}", bytes.len()))
    })
}

/// Parse arbitrary hex bytes, with or without a `0x` prefix.
pub fn parse_hex(s: &str) -> Result<Vec<u8>, RepBridgeError> {
    let trimmed = s.trim();
    let digits = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    hex::decode(digits).map_err(|e| RepBridgeError::Serialization(format!("invalid hex: {}", e)))
}

/// Serde adapter: `[u8; 32]` as a hex string.
pub mod hex32 {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8; 32], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<[u8; 32], D::Error> {
        let s = String::deserialize(deserializer)?;
        super::parse_hex32(&s).map_err(serde::de::Error::custom)
    }
}

/// Serde adapter: `Vec<u8>` as a hex string.
pub mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        super::parse_hex(&s).map_err(serde::de::Error::custom)
    }
}
