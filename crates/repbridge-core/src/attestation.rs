// crates/repbridge-core/src/attestation.rs
//
// Reputation attestation and its binary wire codec.
//
// Layout (all integers little-endian, no trailing bytes):
//
//   u32 agent_len | agent | u64 score | u32 source_chain | u64 timestamp
//   | u64 nonce | u32 id_len (= 32) | attestation_id

use serde::{Deserialize, Serialize};

use crate::error::DecodeError;
use crate::identity::{hex32, hex_bytes};

/// Fixed size of an attestation id.
pub const ATTESTATION_ID_LEN: usize = 32;

/// Longest accepted agent identity.
pub const MAX_AGENT_LEN: usize = 64;

/// A reputation claim for one agent, decoded from an inbound payload.
///
/// Ephemeral: the receiver copies the relevant fields into the agent's
/// bridged-reputation record and drops the attestation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attestation {
    /// Source-chain address of the reputation holder.
    #[serde(with = "hex_bytes")]
    pub agent: Vec<u8>,
    pub score: u64,
    /// Origin domain the attestation claims to come from.
    pub source_chain: u32,
    /// Unix seconds at attestation creation. Never used for replay decisions.
    pub timestamp: u64,
    /// Strictly increasing per agent.
    pub nonce: u64,
    /// Opaque correlation id.
    #[serde(with = "hex32")]
    pub attestation_id: [u8; 32],
}

impl Attestation {
    /// Encode into the wire layout.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf =
            Vec::with_capacity(4 + self.agent.len() + 8 + 4 + 8 + 8 + 4 + ATTESTATION_ID_LEN);
        buf.extend_from_slice(&(self.agent.len() as u32).to_le_bytes());
        buf.extend_from_slice(&self.agent);
        buf.extend_from_slice(&self.score.to_le_bytes());
        buf.extend_from_slice(&self.source_chain.to_le_bytes());
        buf.extend_from_slice(&self.timestamp.to_le_bytes());
        buf.extend_from_slice(&self.nonce.to_le_bytes());
        buf.extend_from_slice(&(ATTESTATION_ID_LEN as u32).to_le_bytes());
        buf.extend_from_slice(&self.attestation_id);
        buf
    }

    /// Decode from the wire layout with strict framing.
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut reader = Reader::new(bytes);

        let agent_len = reader.read_u32("agent_len")? as usize;
        if agent_len == 0 || agent_len > MAX_AGENT_LEN {
            return Err(DecodeError::InvalidLength {
                field: "agent",
                declared: agent_len,
                expected: "1..=64",
            });
        }
        let agent = reader.take("agent", agent_len)?.to_vec();

        let score = reader.read_u64("score")?;
        let source_chain = reader.read_u32("source_chain")?;
        let timestamp = reader.read_u64("timestamp")?;
        let nonce = reader.read_u64("nonce")?;

        let id_len = reader.read_u32("attestation_id_len")? as usize;
        if id_len != ATTESTATION_ID_LEN {
            return Err(DecodeError::InvalidLength {
                field: "attestation_id",
                declared: id_len,
                expected: "32",
            });
        }
        let id_bytes = reader
            .take("attestation_id", ATTESTATION_ID_LEN)
            .map_err(|_| DecodeError::InvalidLength {
                field: "attestation_id",
                declared: id_len,
                expected: "32 bytes present",
            })?;
        let mut attestation_id = [0u8; ATTESTATION_ID_LEN];
        attestation_id.copy_from_slice(id_bytes);

        if reader.remaining() > 0 {
            return Err(DecodeError::TrailingBytes {
                remaining: reader.remaining(),
            });
        }

        Ok(Self {
            agent,
            score,
            source_chain,
            timestamp,
            nonce,
            attestation_id,
        })
    }
}

/// Cursor over an input buffer. Every read checks bounds first.
struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn take(&mut self, field: &'static str, n: usize) -> Result<&'a [u8], DecodeError> {
        if self.remaining() < n {
            return Err(DecodeError::TruncatedInput {
                field,
                needed: n,
                remaining: self.remaining(),
            });
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn read_u32(&mut self, field: &'static str) -> Result<u32, DecodeError> {
        let mut arr = [0u8; 4];
        arr.copy_from_slice(self.take(field, 4)?);
        Ok(u32::from_le_bytes(arr))
    }

    fn read_u64(&mut self, field: &'static str) -> Result<u64, DecodeError> {
        let mut arr = [0u8; 8];
        arr.copy_from_slice(self.take(field, 8)?);
        Ok(u64::from_le_bytes(arr))
    }
}
