// crates/repbridge-cli/src/commands/admin.rs
//
// `repbridge {init, pause, unpause}`: signed admin requests.
//
// Each request is signed with the admin key over
// `repbridge:{operation}:{argument}:{issued_at}`.

use repbridge_core::crypto::admin_message;
use repbridge_core::Keypair;

use super::keys::{load_keypair, KeyArgs};
use super::Context;
use crate::output::print_value;
use crate::rpc_client::rpc_result;

/// Build the signature fields shared by all admin requests.
fn signed_params(keypair: &Keypair, operation: &str, argument: &str) -> serde_json::Value {
    let issued_at = chrono::Utc::now().timestamp();
    let signature = keypair.sign(&admin_message(operation, argument, issued_at));
    serde_json::json!({
        "caller": keypair.account_id(),
        "issued_at": issued_at,
        "signature": hex::encode(&signature),
    })
}

/// Run `init`: the signing key becomes the bridge admin.
pub async fn run_init(ctx: &Context, key: &KeyArgs) -> Result<(), Box<dyn std::error::Error>> {
    let keypair = load_keypair(key)?;
    let params = signed_params(&keypair, "initialize", &keypair.account_id().to_string());
    let state = rpc_result(&ctx.rpc, "admin/initialize", params).await?;
    print_value(ctx.format, &state);
    Ok(())
}

/// Run `pause` or `unpause`.
pub async fn run_set_paused(
    ctx: &Context,
    key: &KeyArgs,
    paused: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let keypair = load_keypair(key)?;
    let params = set_paused_params(&keypair, paused);
    let state = rpc_result(&ctx.rpc, "admin/set_paused", params).await?;
    print_value(ctx.format, &state);
    Ok(())
}

fn set_paused_params(keypair: &Keypair, paused: bool) -> serde_json::Value {
    let mut params = signed_params(keypair, "set_paused", &paused.to_string());
    params["paused"] = serde_json::Value::Bool(paused);
    params
}
