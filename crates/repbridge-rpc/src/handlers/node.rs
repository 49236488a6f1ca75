// crates/repbridge-rpc/src/handlers/node.rs
//
// Node health handler: GetHealth.

use std::time::Instant;

use serde::{Deserialize, Serialize};

use repbridge_core::error::RepBridgeError;
use repbridge_receiver::MessageReceiver;

/// Request for node health status.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GetHealthRequest {}

/// Response containing node health status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetHealthResponse {
    /// "healthy" when the store answers, "uninitialized" before
    /// `initialize`, "unhealthy" when the store fails.
    pub status: String,
    /// Software version.
    pub version: String,
    /// Whether program state exists.
    pub initialized: bool,
    /// Pause flag, when initialized.
    pub paused: Option<bool>,
    /// Successful handlings so far, when initialized.
    pub total_bridged: Option<u64>,
    /// Number of allow-listed origin domains.
    pub trusted_remotes: usize,
    /// Seconds since the daemon started.
    pub uptime_seconds: u64,
    /// Human-readable details.
    pub details: Option<String>,
}

/// Handle a GetHealth request. Never fails; store errors are reported in
/// the response body.
pub async fn handle_get_health(
    receiver: &MessageReceiver,
    _request: GetHealthRequest,
    start_time: Option<Instant>,
) -> Result<GetHealthResponse, RepBridgeError> {
    let uptime_seconds = start_time.map(|t| t.elapsed().as_secs()).unwrap_or(0);
    let trusted_remotes = receiver.trusted_remotes().len();
    let version = env!("CARGO_PKG_VERSION").to_string();

    let response = match receiver.program_state().await {
        Ok(state) => GetHealthResponse {
            status: "healthy".to_string(),
            version,
            initialized: true,
            paused: Some(state.paused),
            total_bridged: Some(state.total_bridged),
            trusted_remotes,
            uptime_seconds,
            details: state.paused.then(|| "Bridge is paused".to_string()),
        },
        Err(RepBridgeError::NotInitialized) => GetHealthResponse {
            status: "uninitialized".to_string(),
            version,
            initialized: false,
            paused: None,
            total_bridged: None,
            trusted_remotes,
            uptime_seconds,
            details: Some("Program state not initialized".to_string()),
        },
        Err(e) => GetHealthResponse {
            status: "unhealthy".to_string(),
            version,
            initialized: false,
            paused: None,
            total_bridged: None,
            trusted_remotes,
            uptime_seconds,
            details: Some(e.to_string()),
        },
    };
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use repbridge_core::identity::AccountId;
    use repbridge_receiver::TrustedRemotes;
    use repbridge_store::MemoryStore;

    #[tokio::test]
    async fn test_health_reports_initialization_and_pause() {
        let admin = AccountId([1u8; 32]);
        let receiver = MessageReceiver::new(
            Arc::new(MemoryStore::new()),
            TrustedRemotes::new().with_remote(84532, AccountId::ZERO),
        );

        let resp = handle_get_health(&receiver, GetHealthRequest {}, None)
            .await
            .unwrap();
        assert_eq!(resp.status, "uninitialized");
        assert!(!resp.initialized);
        assert_eq!(resp.trusted_remotes, 1);

        receiver.initialize(admin).await.unwrap();
        receiver.set_paused(admin, true).await.unwrap();
        let resp = handle_get_health(&receiver, GetHealthRequest {}, Some(Instant::now()))
            .await
            .unwrap();
        assert_eq!(resp.status, "healthy");
        assert_eq!(resp.paused, Some(true));
        assert_eq!(resp.total_bridged, Some(0));
    }
}
