// crates/repbridge-rpc/src/handlers/mod.rs
//
// Handler modules for all RPC endpoints.
// Each module defines request/response types and handler functions
// for one API group.

pub mod admin;
pub mod bridge;
pub mod node;
pub mod query;
