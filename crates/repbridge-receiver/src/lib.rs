// crates/repbridge-receiver/src/lib.rs
//
// repbridge-receiver: the inbound-message state machine for RepBridge.
//
// Validates each delivered message (pause gate, decode, trusted origin,
// freshness, replay watermark) and commits the agent's reputation record
// together with the bridged counter.

pub mod access;
pub mod clock;
pub mod ledger;
pub mod receiver;
pub mod replay;
pub mod trusted;

pub use clock::{Clock, FixedClock, SystemClock};
pub use ledger::ReputationLedger;
pub use receiver::{
    HandleReceipt, InboundMessage, MessageReceiver, ReceiveStage, ReceiverConfig,
    DEFAULT_EVENT_CAPACITY,
};
pub use trusted::{TrustedRemote, TrustedRemotes};
