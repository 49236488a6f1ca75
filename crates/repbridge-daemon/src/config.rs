// crates/repbridge-daemon/src/config.rs
//
// Runtime configuration for the RepBridge daemon.
// Loaded from a TOML file or populated with defaults.

use serde::Deserialize;
use std::fs;

use repbridge_core::error::RepBridgeError;
use repbridge_core::identity::AccountId;
use repbridge_receiver::{ReceiverConfig, TrustedRemote, TrustedRemotes};
use repbridge_rpc::RpcConfig;

/// Runtime configuration for the daemon.
#[derive(Debug, Clone, Deserialize)]
pub struct DaemonConfig {
    /// Directory for local data (the RocksDB database).
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Storage backend: "rocksdb" or "memory".
    #[serde(default = "default_storage")]
    pub storage: String,

    /// Host address for the RPC server.
    #[serde(default = "default_rpc_host")]
    pub rpc_host: String,

    /// Port for the RPC server.
    #[serde(default = "default_rpc_port")]
    pub rpc_port: u16,

    /// Log level used when RUST_LOG is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Admin public key (hex). When set, the daemon initializes the program
    /// state at startup if it does not exist yet.
    #[serde(default)]
    pub admin: Option<String>,

    /// Trusted dispatcher per origin domain.
    #[serde(default)]
    pub trusted_remotes: Vec<TrustedRemote>,

    /// Reject attestations older than this many seconds. Unset disables
    /// the check.
    #[serde(default)]
    pub max_attestation_age_secs: Option<u64>,

    /// Validity window of signed admin RPC requests.
    #[serde(default = "default_admin_signature_ttl_secs")]
    pub admin_signature_ttl_secs: u64,
}

fn default_data_dir() -> String {
    "~/.repbridge/data".to_string()
}

fn default_storage() -> String {
    "rocksdb".to_string()
}

fn default_rpc_host() -> String {
    "127.0.0.1".to_string()
}

fn default_rpc_port() -> u16 {
    50051
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_admin_signature_ttl_secs() -> u64 {
    300
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            storage: default_storage(),
            rpc_host: default_rpc_host(),
            rpc_port: default_rpc_port(),
            log_level: default_log_level(),
            admin: None,
            trusted_remotes: Vec::new(),
            max_attestation_age_secs: None,
            admin_signature_ttl_secs: default_admin_signature_ttl_secs(),
        }
    }
}

impl DaemonConfig {
    /// Load configuration from a TOML file at the given path.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let config: DaemonConfig = toml::from_str(contents)?;
        Ok(config)
    }

    /// The configured admin identity, if any.
    pub fn admin_account(&self) -> Result<Option<AccountId>, RepBridgeError> {
        self.admin.as_deref().map(str::parse::<AccountId>).transpose()
    }

    pub fn trusted_remotes(&self) -> TrustedRemotes {
        TrustedRemotes::from_entries(&self.trusted_remotes)
    }

    pub fn receiver_config(&self) -> ReceiverConfig {
        ReceiverConfig {
            max_attestation_age_secs: self.max_attestation_age_secs,
            ..ReceiverConfig::default()
        }
    }

    pub fn rpc_config(&self) -> RpcConfig {
        RpcConfig {
            host: self.rpc_host.clone(),
            port: self.rpc_port,
            admin_signature_ttl_secs: self.admin_signature_ttl_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = DaemonConfig::parse("").unwrap();
        assert_eq!(config.storage, "rocksdb");
        assert_eq!(config.rpc_port, 50051);
        assert_eq!(config.admin_signature_ttl_secs, 300);
        assert!(config.admin.is_none());
        assert!(config.trusted_remotes.is_empty());
        assert_eq!(config.receiver_config().max_attestation_age_secs, None);
    }

    #[test]
    fn test_full_file() {
        let toml = format!(
            r#"
            data_dir = "/var/lib/repbridge"
            storage = "memory"
            rpc_port = 6000
            log_level = "debug"
            admin = "0x{admin}"
            max_attestation_age_secs = 86400

            [[trusted_remotes]]
            domain = 84532
            sender = "{sender}"
            "#,
            admin = "ad".repeat(32),
            sender = "00".repeat(32),
        );
        let config = DaemonConfig::parse(&toml).unwrap();
        assert_eq!(config.storage, "memory");
        assert_eq!(config.admin_account().unwrap(), Some(AccountId([0xad; 32])));
        assert_eq!(config.trusted_remotes().len(), 1);
        assert_eq!(config.receiver_config().max_attestation_age_secs, Some(86_400));
        assert_eq!(config.rpc_config().port, 6000);
        assert_eq!(config.rpc_config().host, "127.0.0.1");
    }

    #[test]
    fn test_bad_admin_hex_is_an_error() {
        let config = DaemonConfig {
            admin: Some("not-hex".to_string()),
            ..DaemonConfig::default()
        };
        assert!(config.admin_account().is_err());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(DaemonConfig::load("/nonexistent/repbridge.toml").is_err());
    }
}
