// crates/repbridge-cli/src/main.rs
//
// CLI entrypoint for RepBridge operators.
//
// Generates admin keys, encodes attestation payloads, delivers messages,
// sends signed admin requests, and queries bridge state over the daemon's
// JSON-RPC endpoint.

mod commands;
mod output;
mod rpc_client;

use clap::{Parser, Subcommand};

use commands::deliver::DeliverCmd;
use commands::encode::{AddressCmd, EncodeCmd};
use commands::keys::{KeyArgs, KeygenCmd};
use commands::Context;
use output::OutputFormat;

/// RepBridge CLI: operate a cross-chain reputation receiver.
#[derive(Parser, Debug)]
#[command(
    name = "repbridge",
    version = "0.1.0",
    about = "RepBridge CLI for the cross-chain reputation receiver"
)]
struct Cli {
    /// RPC endpoint for the repbridge-daemon.
    #[arg(long, global = true, default_value = "http://localhost:50051")]
    rpc: String,

    /// Print raw JSON instead of tables.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level subcommands.
#[derive(Debug, Subcommand)]
enum Commands {
    /// Generate an admin ed25519 keypair.
    Keygen(KeygenCmd),

    /// Encode an attestation payload (hex) without contacting the daemon.
    Encode(EncodeCmd),

    /// Deliver a message to the receiver's inbound boundary.
    Deliver(DeliverCmd),

    /// Initialize the bridge; the signing key becomes admin.
    Init(KeyArgs),

    /// Pause message handling (admin only).
    Pause(KeyArgs),

    /// Resume message handling (admin only).
    Unpause(KeyArgs),

    /// Show the program state.
    State,

    /// Show an agent's bridged reputation.
    Reputation {
        /// Agent identity bytes (hex).
        agent: String,
    },

    /// Show the record address derived for an agent.
    Address(AddressCmd),

    /// Show daemon health.
    Health,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let ctx = Context {
        rpc: cli.rpc.clone(),
        format: if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Table
        },
    };

    match &cli.command {
        Commands::Keygen(cmd) => commands::keys::run_keygen(cmd).await?,
        Commands::Encode(cmd) => commands::encode::run_encode(cmd).await?,
        Commands::Deliver(cmd) => commands::deliver::run(&ctx, cmd).await?,
        Commands::Init(key) => commands::admin::run_init(&ctx, key).await?,
        Commands::Pause(key) => commands::admin::run_set_paused(&ctx, key, true).await?,
        Commands::Unpause(key) => commands::admin::run_set_paused(&ctx, key, false).await?,
        Commands::State => commands::query::run_state(&ctx).await?,
        Commands::Reputation { agent } => commands::query::run_reputation(&ctx, agent).await?,
        Commands::Address(cmd) => commands::encode::run_address(cmd, ctx.format).await?,
        Commands::Health => commands::query::run_health(&ctx).await?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_pause_with_key() {
        let cli = Cli::try_parse_from(["repbridge", "--json", "pause", "--key", "/tmp/k"]).unwrap();
        assert!(cli.json);
        match cli.command {
            Commands::Pause(key) => assert_eq!(key.key.as_deref(), Some("/tmp/k")),
            other => panic!("Expected Pause, got: {:?}", other),
        }
    }
}
