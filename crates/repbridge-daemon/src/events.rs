// crates/repbridge-daemon/src/events.rs
//
// Background task that logs every committed bridge event.

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

use repbridge_core::event::BridgeEvent;

/// One-line description of an event for the log.
pub fn describe(event: &BridgeEvent) -> String {
    match event {
        BridgeEvent::Initialized { admin } => format!("initialized with admin {}", admin),
        BridgeEvent::PauseSet { paused } => format!("paused set to {}", paused),
        BridgeEvent::ReputationBridged {
            source_agent,
            score,
            source_chain,
            nonce,
            total_bridged,
            ..
        } => format!(
            "reputation bridged: agent=0x{} score={} source_chain={} nonce={} total={}",
            hex::encode(source_agent),
            score,
            source_chain,
            nonce,
            total_bridged
        ),
    }
}

/// Log events until the channel closes.
pub async fn run_event_logger(mut rx: broadcast::Receiver<BridgeEvent>) {
    loop {
        match rx.recv().await {
            Ok(event) => tracing::info!("Bridge event: {}", describe(&event)),
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!("Event logger lagged, {} events skipped", skipped);
            }
            Err(RecvError::Closed) => break,
        }
    }
    tracing::debug!("Event logger stopped");
}
