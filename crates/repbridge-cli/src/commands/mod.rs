// crates/repbridge-cli/src/commands/mod.rs
//
// Command module declarations for the RepBridge CLI.

pub mod admin;
pub mod deliver;
pub mod encode;
pub mod keys;
pub mod query;

use crate::output::OutputFormat;

/// Settings shared by every command.
#[derive(Debug, Clone)]
pub struct Context {
    /// Daemon RPC endpoint.
    pub rpc: String,
    pub format: OutputFormat,
}
