// crates/repbridge-daemon/src/main.rs
//
// Binary entrypoint for the RepBridge receiver daemon.
//
// Parses CLI arguments, loads configuration, initializes tracing, opens the
// configured store, builds the message receiver, initializes the program
// state when an admin is configured, logs committed events, and serves
// JSON-RPC until terminated.

mod config;
mod events;

use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use config::DaemonConfig;

use repbridge_core::error::RepBridgeError;
use repbridge_core::traits::BridgeStore;
use repbridge_receiver::MessageReceiver;
use repbridge_rpc::RepBridgeRpcServer;
use repbridge_store::{MemoryStore, RocksStore};

/// RepBridge daemon: receives bridged reputation attestations.
#[derive(Parser, Debug)]
#[command(name = "repbridge-daemon", version = "0.1.0", about = "RepBridge receiver daemon")]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = "~/.repbridge/config.toml")]
    config: String,

    /// Storage backend override: rocksdb or memory.
    #[arg(long)]
    storage: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config_path = expand_tilde(&args.config);
    let loaded = DaemonConfig::load(&config_path);
    let default_level = loaded
        .as_ref()
        .map(|cfg| cfg.log_level.clone())
        .unwrap_or_else(|_| "info".to_string());

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    let mut daemon_config = match loaded {
        Ok(cfg) => {
            tracing::info!("Loaded configuration from {}", config_path);
            cfg
        }
        Err(e) => {
            tracing::warn!(
                "Could not load config from {}: {}. Using defaults.",
                config_path,
                e
            );
            DaemonConfig::default()
        }
    };

    // CLI --storage flag overrides the config file value.
    if let Some(storage) = args.storage {
        daemon_config.storage = storage;
    }

    tracing::info!("RepBridge Daemon v0.1.0");
    tracing::info!("Storage: {}", daemon_config.storage);
    tracing::info!(
        "RPC endpoint: {}:{}",
        daemon_config.rpc_host,
        daemon_config.rpc_port
    );
    tracing::info!(
        "Trusted remotes: {}",
        daemon_config.trusted_remotes.len()
    );
    if daemon_config.trusted_remotes.is_empty() {
        tracing::warn!("No trusted remotes configured; every message will be rejected");
    }

    let store = open_store(&daemon_config)?;
    let receiver = MessageReceiver::new(store, daemon_config.trusted_remotes())
        .with_config(daemon_config.receiver_config());

    tokio::spawn(events::run_event_logger(receiver.subscribe()));

    auto_initialize(&receiver, &daemon_config).await?;

    let receiver = Arc::new(receiver);
    let rpc_server = RepBridgeRpcServer::new(daemon_config.rpc_config(), receiver)
        .with_start_time(Instant::now());

    tokio::select! {
        result = rpc_server.start() => {
            if let Err(e) = result {
                tracing::error!("RPC server error: {}", e);
                return Err(e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received shutdown signal");
        }
    }

    tracing::info!("RepBridge daemon shut down");
    Ok(())
}

/// Open the configured storage backend.
fn open_store(config: &DaemonConfig) -> Result<Arc<dyn BridgeStore>, Box<dyn std::error::Error>> {
    match config.storage.as_str() {
        "rocksdb" => {
            let path = format!("{}/rocksdb", expand_tilde(&config.data_dir));
            let store = RocksStore::open(&path)
                .map_err(|e| format!("Failed to open RocksDB at {}: {}", path, e))?;
            tracing::info!("RocksDB store opened at {}", path);
            Ok(Arc::new(store))
        }
        "memory" => {
            tracing::warn!("Using in-memory store; state is lost on exit");
            Ok(Arc::new(MemoryStore::new()))
        }
        other => Err(format!("Unknown storage backend: {}. Use 'rocksdb' or 'memory'.", other).into()),
    }
}

/// Create the program state with the configured admin if it does not exist.
async fn auto_initialize(
    receiver: &MessageReceiver,
    config: &DaemonConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let Some(admin) = config.admin_account()? else {
        return Ok(());
    };

    match receiver.program_state().await {
        Ok(state) if state.admin != admin => {
            tracing::warn!(
                "Program state already initialized with admin {}; configured admin {} ignored",
                state.admin,
                admin
            );
        }
        Ok(_) => tracing::debug!("Program state already initialized"),
        Err(RepBridgeError::NotInitialized) => {
            receiver.initialize(admin).await?;
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

/// Expand `~` at the start of a path to the user's home directory.
fn expand_tilde(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return format!("{}/{}", home.display(), rest);
        }
    }
    path.to_string()
}
