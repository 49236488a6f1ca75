// crates/repbridge-store/src/lib.rs
//
// repbridge-store: Storage backends for RepBridge.
//
// Provides a RocksDB-backed persistent store for deployments and an
// in-memory store for tests and ephemeral runs. Both implement
// `repbridge_core::BridgeStore` with atomic compare-and-swap commits.

pub mod memory;
pub mod rocks;

// Re-export key types for ergonomic access from downstream crates.
pub use memory::MemoryStore;
pub use rocks::RocksStore;
