// crates/repbridge-cli/src/commands/deliver.rs
//
// `repbridge deliver`: post a message to the daemon's inbound boundary, as
// a transport relayer would.

use clap::Args;

use repbridge_core::identity::{parse_hex, AccountId};

use super::encode::EncodeCmd;
use super::Context;
use crate::output::print_value;
use crate::rpc_client::rpc_result;

/// Deliver a message to the receiver.
#[derive(Debug, Args)]
pub struct DeliverCmd {
    /// Origin domain id reported by the transport.
    #[arg(long)]
    pub origin: u32,

    /// Sender address on the origin domain (hex, 32 bytes).
    #[arg(long)]
    pub sender: String,

    /// Encoded payload (hex). When omitted, the payload is built from the
    /// attestation flags.
    #[arg(long, conflicts_with = "agent")]
    pub payload: Option<String>,

    /// Agent identity bytes (hex), to build the payload in place.
    #[arg(long, requires_all = ["score", "nonce"])]
    pub agent: Option<String>,

    #[arg(long)]
    pub score: Option<u64>,

    #[arg(long)]
    pub nonce: Option<u64>,

    #[arg(long)]
    pub timestamp: Option<u64>,

    #[arg(long)]
    pub attestation_id: Option<String>,
}

impl DeliverCmd {
    fn payload(&self) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
        if let Some(payload) = &self.payload {
            return Ok(parse_hex(payload)?);
        }
        let (Some(agent), Some(score), Some(nonce)) = (&self.agent, self.score, self.nonce) else {
            return Err("either --payload or --agent/--score/--nonce is required".into());
        };
        let encode = EncodeCmd {
            agent: agent.clone(),
            score,
            source_chain: self.origin,
            nonce,
            timestamp: self.timestamp,
            attestation_id: self.attestation_id.clone(),
        };
        Ok(encode.to_attestation()?.encode())
    }

    fn params(&self) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
        let sender: AccountId = self.sender.parse()?;
        Ok(serde_json::json!({
            "origin": self.origin,
            "sender": sender,
            "payload": hex::encode(&self.payload()?),
        }))
    }
}

/// Run the deliver command.
pub async fn run(ctx: &Context, cmd: &DeliverCmd) -> Result<(), Box<dyn std::error::Error>> {
    let receipt = rpc_result(&ctx.rpc, "bridge/handle_message", cmd.params()?).await?;
    print_value(ctx.format, &receipt);
    Ok(())
}
