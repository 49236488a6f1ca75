// crates/repbridge-rpc/src/lib.rs
//
// repbridge-rpc: JSON-RPC server and handlers for RepBridge.
//
// A single tonic service accepts JSON-encoded requests carrying a method
// name and params, and dispatches them to the inbound-message boundary,
// the signed admin surface, and the query surface of a `MessageReceiver`.

pub mod handlers;
pub mod middleware;
pub mod server;

pub use server::{JsonRpcRequest, JsonRpcResponse, RepBridgeRpcServer, RpcConfig, RpcService};
