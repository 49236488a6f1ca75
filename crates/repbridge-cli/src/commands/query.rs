// crates/repbridge-cli/src/commands/query.rs
//
// `repbridge {state, reputation, health}`: read-only queries.

use repbridge_core::identity::parse_hex;

use super::Context;
use crate::output::print_value;
use crate::rpc_client::rpc_result;

/// Run `state`.
pub async fn run_state(ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let state = rpc_result(&ctx.rpc, "query/state", serde_json::json!({})).await?;
    print_value(ctx.format, &state);
    Ok(())
}

/// Run `reputation <agent>`.
pub async fn run_reputation(ctx: &Context, agent: &str) -> Result<(), Box<dyn std::error::Error>> {
    let agent = parse_hex(agent)?;
    let params = serde_json::json!({ "agent": hex::encode(&agent) });
    let reputation = rpc_result(&ctx.rpc, "query/reputation", params).await?;
    print_value(ctx.format, &reputation);
    Ok(())
}

/// Run `health`.
pub async fn run_health(ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let health = rpc_result(&ctx.rpc, "node/health", serde_json::json!({})).await?;
    print_value(ctx.format, &health);
    Ok(())
}
