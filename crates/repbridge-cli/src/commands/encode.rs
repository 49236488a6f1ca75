// crates/repbridge-cli/src/commands/encode.rs
//
// `repbridge encode` and `repbridge address`: offline helpers that build an
// attestation payload the way the dispatcher does, and compute where an
// agent's record is stored.

use clap::Args;

use repbridge_core::identity::{parse_hex, parse_hex32};
use repbridge_core::{derive_record_address, Attestation};

use crate::output::{format_json, format_table, Field, OutputFormat};

/// Encode an attestation payload.
#[derive(Debug, Clone, Args)]
pub struct EncodeCmd {
    /// Agent identity bytes (hex).
    #[arg(long)]
    pub agent: String,

    /// Reputation score.
    #[arg(long)]
    pub score: u64,

    /// Source chain domain id.
    #[arg(long)]
    pub source_chain: u32,

    /// Per-agent nonce; must exceed the last accepted one.
    #[arg(long)]
    pub nonce: u64,

    /// Attestation time in unix seconds (default: now).
    #[arg(long)]
    pub timestamp: Option<u64>,

    /// 32-byte attestation id (hex, default: all zeros).
    #[arg(long)]
    pub attestation_id: Option<String>,
}

impl EncodeCmd {
    pub fn to_attestation(&self) -> Result<Attestation, Box<dyn std::error::Error>> {
        let timestamp = match self.timestamp {
            Some(t) => t,
            None => u64::try_from(chrono::Utc::now().timestamp())?,
        };
        let attestation_id = match &self.attestation_id {
            Some(id) => parse_hex32(id)?,
            None => [0u8; 32],
        };
        let attestation = Attestation {
            agent: parse_hex(&self.agent)?,
            score: self.score,
            source_chain: self.source_chain,
            timestamp,
            nonce: self.nonce,
            attestation_id,
        };
        // Reject what the receiver would reject as malformed.
        Attestation::decode(&attestation.encode())?;
        Ok(attestation)
    }
}

/// Show the record address for an agent.
#[derive(Debug, Clone, Args)]
pub struct AddressCmd {
    /// Agent identity bytes (hex).
    pub agent: String,
}

/// Run the encode command: print the payload as hex.
pub async fn run_encode(cmd: &EncodeCmd) -> Result<(), Box<dyn std::error::Error>> {
    let payload = cmd.to_attestation()?.encode();
    println!("0x{}", hex::encode(&payload));
    Ok(())
}

/// Run the address command.
pub async fn run_address(
    cmd: &AddressCmd,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let agent = parse_hex(&cmd.agent)?;
    let address = derive_record_address(&agent);
    match format {
        OutputFormat::Json => println!(
            "{}",
            format_json(&serde_json::json!({ "agent": hex::encode(&agent), "address": address }))
        ),
        OutputFormat::Table => println!(
            "{}",
            format_table(&[
                Field::new("agent", format!("0x{}", hex::encode(&agent))),
                Field::new("address", address),
            ])
        ),
    }
    Ok(())
}
