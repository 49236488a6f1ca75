// crates/repbridge-rpc/src/handlers/bridge.rs
//
// Inbound message boundary: HandleMessage.
//
// The transport relayer posts each delivered message here with the origin
// domain and sender it authenticated.

use repbridge_core::error::RepBridgeError;
use repbridge_receiver::{HandleReceipt, InboundMessage, MessageReceiver};

/// Request carrying one delivered message. Same shape as `InboundMessage`:
/// `{ "origin": u32, "sender": hex32, "payload": hex }`.
pub type HandleMessageRequest = InboundMessage;

/// Response for a committed message.
pub type HandleMessageResponse = HandleReceipt;

/// Handle a HandleMessage request.
pub async fn handle_message(
    receiver: &MessageReceiver,
    request: HandleMessageRequest,
) -> Result<HandleMessageResponse, RepBridgeError> {
    receiver.handle_message(&request).await
}
