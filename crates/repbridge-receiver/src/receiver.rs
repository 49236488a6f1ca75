// crates/repbridge-receiver/src/receiver.rs
//
// MessageReceiver: the inbound-message state machine.
//
// Per delivery:
//   Received -> Authorized -> Decoded -> ReplayChecked -> Committed
// with a Rejected terminal reachable from every stage. Each stage either
// advances or returns a specific RepBridgeError. Nothing is written before
// the final compare-and-swap commit, so every rejection leaves the store
// exactly as it was.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use repbridge_core::error::RepBridgeError;
use repbridge_core::event::BridgeEvent;
use repbridge_core::identity::{hex_bytes, AccountId, RecordAddress};
use repbridge_core::state::{BridgedReputation, ProgramState};
use repbridge_core::traits::{BridgeStore, CommitOutcome};
use repbridge_core::Attestation;

use crate::access;
use crate::clock::{Clock, SystemClock};
use crate::ledger::ReputationLedger;
use crate::replay;
use crate::trusted::TrustedRemotes;

/// Default capacity of the event broadcast channel.
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// A cross-domain message as delivered by the transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundMessage {
    /// Origin domain id reported by the transport.
    pub origin: u32,
    /// Sender address on the origin domain reported by the transport.
    pub sender: AccountId,
    /// Encoded attestation.
    #[serde(with = "hex_bytes")]
    pub payload: Vec<u8>,
}

/// Key fields of a committed record, returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandleReceipt {
    pub address: RecordAddress,
    #[serde(with = "hex_bytes")]
    pub agent: Vec<u8>,
    pub score: u64,
    pub source_chain: u32,
    pub nonce: u64,
    pub last_updated: i64,
    pub total_bridged: u64,
}

/// Stage reached by one delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiveStage {
    Received,
    Authorized,
    Decoded,
    ReplayChecked,
    Committed,
}

impl fmt::Display for ReceiveStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReceiveStage::Received => write!(f, "Received"),
            ReceiveStage::Authorized => write!(f, "Authorized"),
            ReceiveStage::Decoded => write!(f, "Decoded"),
            ReceiveStage::ReplayChecked => write!(f, "ReplayChecked"),
            ReceiveStage::Committed => write!(f, "Committed"),
        }
    }
}

/// Receiver tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiverConfig {
    /// Reject attestations older than this many seconds (or dated in the
    /// future). `None` disables the check.
    #[serde(default)]
    pub max_attestation_age_secs: Option<u64>,
    /// Capacity of the event broadcast channel.
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

fn default_event_capacity() -> usize {
    DEFAULT_EVENT_CAPACITY
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        Self {
            max_attestation_age_secs: None,
            event_capacity: default_event_capacity(),
        }
    }
}

/// Entry point for inbound messages, admin operations, and queries.
///
/// Holds the store handle explicitly; two receivers over two stores are
/// fully isolated deployments.
pub struct MessageReceiver {
    store: Arc<dyn BridgeStore>,
    ledger: ReputationLedger,
    trusted: TrustedRemotes,
    clock: Arc<dyn Clock>,
    config: ReceiverConfig,
    events: broadcast::Sender<BridgeEvent>,
}

impl fmt::Debug for MessageReceiver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageReceiver")
            .field("trusted_remotes", &self.trusted.len())
            .field("config", &self.config)
            .finish()
    }
}

impl MessageReceiver {
    /// Create a receiver over `store` that trusts `trusted` dispatchers.
    pub fn new(store: Arc<dyn BridgeStore>, trusted: TrustedRemotes) -> Self {
        let config = ReceiverConfig::default();
        let (events, _) = broadcast::channel(config.event_capacity);
        Self {
            ledger: ReputationLedger::new(store.clone()),
            store,
            trusted,
            clock: Arc::new(SystemClock),
            config,
            events,
        }
    }

    /// Replace the clock.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the configuration. Recreates the event channel, so call
    /// before subscribing.
    pub fn with_config(mut self, config: ReceiverConfig) -> Self {
        let (events, _) = broadcast::channel(config.event_capacity.max(1));
        self.events = events;
        self.config = config;
        self
    }

    /// Subscribe to committed state changes.
    pub fn subscribe(&self) -> broadcast::Receiver<BridgeEvent> {
        self.events.subscribe()
    }

    pub fn trusted_remotes(&self) -> &TrustedRemotes {
        &self.trusted
    }

    pub fn config(&self) -> &ReceiverConfig {
        &self.config
    }

    // -----------------------------------------------------------------
    // Administrative operations
    // -----------------------------------------------------------------

    /// Create the deployment's program state with `admin`.
    ///
    /// Fails with `AlreadyInitialized` on every call after the first,
    /// whatever the arguments.
    pub async fn initialize(&self, admin: AccountId) -> Result<ProgramState, RepBridgeError> {
        let state = ProgramState::new(admin);
        self.store.create_program_state(&state).await?;
        tracing::info!("Bridge initialized with admin {}", admin);
        self.publish(BridgeEvent::Initialized { admin });
        Ok(state)
    }

    /// Set the pause flag. Only the admin may call this.
    pub async fn set_paused(
        &self,
        caller: AccountId,
        paused: bool,
    ) -> Result<ProgramState, RepBridgeError> {
        self.apply_pause(caller, paused, None).await
    }

    /// Set the pause flag from a signed admin request issued at `issued_at`.
    ///
    /// The timestamp is recorded with the flag in one state update; a request
    /// not newer than the last one applied fails with `Unauthorized`.
    pub async fn set_paused_signed(
        &self,
        caller: AccountId,
        paused: bool,
        issued_at: i64,
    ) -> Result<ProgramState, RepBridgeError> {
        self.apply_pause(caller, paused, Some(issued_at)).await
    }

    async fn apply_pause(
        &self,
        caller: AccountId,
        paused: bool,
        issued_at: Option<i64>,
    ) -> Result<ProgramState, RepBridgeError> {
        let state = self
            .store
            .update_program_state(Box::new(move |state| {
                access::require_admin(state, &caller)?;
                if let Some(issued_at) = issued_at {
                    access::consume_admin_signature(state, issued_at)?;
                }
                access::set_paused(state, &caller, paused)
            }))
            .await
            .inspect_err(|e| {
                tracing::warn!("set_paused({}) by {} rejected: {}", paused, caller, e);
            })?;
        tracing::info!("Bridge paused flag set to {}", paused);
        self.publish(BridgeEvent::PauseSet { paused });
        Ok(state)
    }

    // -----------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------

    /// Current program state. Fails with `NotInitialized` before `initialize`.
    pub async fn program_state(&self) -> Result<ProgramState, RepBridgeError> {
        self.store
            .program_state()
            .await?
            .ok_or(RepBridgeError::NotInitialized)
    }

    /// The agent's record, or `None` if nothing has been bridged for it.
    pub async fn reputation(
        &self,
        agent: &[u8],
    ) -> Result<Option<BridgedReputation>, RepBridgeError> {
        self.ledger.fetch(agent).await
    }

    /// The agent's record. Fails with `NotFound` if nothing has been bridged.
    pub async fn query_reputation(&self, agent: &[u8]) -> Result<BridgedReputation, RepBridgeError> {
        match self.ledger.fetch(agent).await? {
            Some(record) if record.is_initialized => Ok(record),
            _ => Err(RepBridgeError::NotFound(format!("agent {}", hex_agent(agent)))),
        }
    }

    // -----------------------------------------------------------------
    // Inbound messages
    // -----------------------------------------------------------------

    /// Handle one delivered message end to end.
    pub async fn handle_message(
        &self,
        message: &InboundMessage,
    ) -> Result<HandleReceipt, RepBridgeError> {
        let mut stage = ReceiveStage::Received;
        let result = self.process(message, &mut stage).await;

        match &result {
            Ok(receipt) => tracing::info!(
                "Bridged reputation for agent {}: score={} nonce={} total={}",
                hex_agent(&receipt.agent),
                receipt.score,
                receipt.nonce,
                receipt.total_bridged
            ),
            Err(e) => tracing::warn!(
                "Rejected message from domain {} at stage {}: {} ({})",
                message.origin,
                stage,
                e.kind(),
                e
            ),
        }
        result
    }

    async fn process(
        &self,
        message: &InboundMessage,
        stage: &mut ReceiveStage,
    ) -> Result<HandleReceipt, RepBridgeError> {
        // Received -> Authorized
        let state = self
            .store
            .program_state()
            .await?
            .ok_or(RepBridgeError::NotInitialized)?;
        access::require_not_paused(&state)?;
        advance(stage, ReceiveStage::Authorized);

        // Authorized -> Decoded
        let attestation = Attestation::decode(&message.payload)?;
        advance(stage, ReceiveStage::Decoded);

        self.trusted
            .verify(message.origin, &message.sender, attestation.source_chain)?;

        let now = self.clock.now();
        self.check_freshness(&attestation, now)?;

        // Decoded -> ReplayChecked
        let existing = self.ledger.read_nonce(&attestation.agent).await?;
        if !replay::accepts(existing, attestation.nonce) {
            return Err(RepBridgeError::ReplayedMessage {
                stored: existing.unwrap_or_default(),
                incoming: attestation.nonce,
            });
        }
        advance(stage, ReceiveStage::ReplayChecked);

        // ReplayChecked -> Committed, only if the watermark is still `existing`.
        let (record, outcome) = self.ledger.apply(&attestation, existing, now).await?;
        let total_bridged = match outcome {
            CommitOutcome::Committed { total_bridged } => total_bridged,
            CommitOutcome::Conflict { current_nonce } => {
                return Err(RepBridgeError::ReplayedMessage {
                    stored: current_nonce.unwrap_or_default(),
                    incoming: attestation.nonce,
                });
            }
        };
        advance(stage, ReceiveStage::Committed);

        self.publish(BridgeEvent::ReputationBridged {
            source_agent: record.source_agent.clone(),
            score: record.score,
            source_chain: record.source_chain,
            nonce: record.nonce,
            attestation_id: record.attestation_id,
            total_bridged,
        });

        Ok(HandleReceipt {
            address: ReputationLedger::locate(&record.source_agent),
            agent: record.source_agent,
            score: record.score,
            source_chain: record.source_chain,
            nonce: record.nonce,
            last_updated: record.last_updated,
            total_bridged,
        })
    }

    /// Reject attestations outside the configured freshness window.
    fn check_freshness(&self, attestation: &Attestation, now: i64) -> Result<(), RepBridgeError> {
        let Some(max_age_secs) = self.config.max_attestation_age_secs else {
            return Ok(());
        };
        let age_secs = now.saturating_sub(i64::try_from(attestation.timestamp).unwrap_or(i64::MAX));
        if age_secs < 0 || age_secs as u64 >= max_age_secs {
            return Err(RepBridgeError::StaleAttestation {
                age_secs,
                max_age_secs,
            });
        }
        Ok(())
    }

    fn publish(&self, event: BridgeEvent) {
        // No subscribers is not an error.
        let _ = self.events.send(event);
    }
}

fn advance(stage: &mut ReceiveStage, next: ReceiveStage) {
    tracing::debug!("Message stage: {} -> {}", stage, next);
    *stage = next;
}

fn hex_agent(agent: &[u8]) -> String {
    format!("0x{}", hex::encode(agent))
}
