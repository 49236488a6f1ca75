// crates/repbridge-receiver/src/trusted.rs
//
// Allow-list of remote dispatchers, one per origin domain.
//
// Populated from static configuration at startup. An origin domain with no
// entry is untrusted.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use repbridge_core::error::RepBridgeError;
use repbridge_core::identity::AccountId;

/// One allow-list entry as it appears in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustedRemote {
    /// Origin domain id.
    pub domain: u32,
    /// Dispatcher address on that domain, as reported by the transport.
    pub sender: AccountId,
}

/// Trusted remote dispatcher per origin domain.
#[derive(Debug, Clone, Default)]
pub struct TrustedRemotes {
    remotes: HashMap<u32, AccountId>,
}

impl TrustedRemotes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from configuration entries. A later entry for the same domain
    /// replaces an earlier one.
    pub fn from_entries(entries: &[TrustedRemote]) -> Self {
        let mut remotes = Self::new();
        for entry in entries {
            remotes.insert(entry.domain, entry.sender);
        }
        remotes
    }

    pub fn with_remote(mut self, domain: u32, sender: AccountId) -> Self {
        self.insert(domain, sender);
        self
    }

    pub fn insert(&mut self, domain: u32, sender: AccountId) {
        self.remotes.insert(domain, sender);
    }

    pub fn len(&self) -> usize {
        self.remotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.remotes.is_empty()
    }

    /// Authenticate a delivery: the attestation must claim the domain it
    /// arrived from, and the sender must be that domain's dispatcher.
    pub fn verify(
        &self,
        origin: u32,
        sender: &AccountId,
        claimed_source_chain: u32,
    ) -> Result<(), RepBridgeError> {
        if claimed_source_chain != origin {
            return Err(RepBridgeError::UntrustedOrigin(format!(
                "attestation source chain {} does not match origin domain {}",
                claimed_source_chain, origin
            )));
        }
        match self.remotes.get(&origin) {
            Some(trusted) if trusted == sender => Ok(()),
            Some(_) => Err(RepBridgeError::UntrustedOrigin(format!(
                "sender {} is not the trusted dispatcher for domain {}",
                sender, origin
            ))),
            None => Err(RepBridgeError::UntrustedOrigin(format!(
                "no trusted dispatcher registered for domain {}",
                origin
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DISPATCHER: AccountId = AccountId([5u8; 32]);

    #[test]
    fn test_trusted_sender_passes() {
        let remotes = TrustedRemotes::new().with_remote(84532, DISPATCHER);
        assert!(remotes.verify(84532, &DISPATCHER, 84532).is_ok());
    }

    #[test]
    fn test_source_chain_mismatch_rejected() {
        let remotes = TrustedRemotes::new().with_remote(84532, DISPATCHER);
        let err = remotes.verify(84532, &DISPATCHER, 1).unwrap_err();
        assert_eq!(err.kind(), "UntrustedOrigin");
    }

    #[test]
    fn test_wrong_sender_rejected() {
        let remotes = TrustedRemotes::new().with_remote(84532, DISPATCHER);
        let err = remotes.verify(84532, &AccountId::ZERO, 84532).unwrap_err();
        assert!(matches!(err, RepBridgeError::UntrustedOrigin(_)));
    }

    #[test]
    fn test_unknown_domain_rejected() {
        let remotes = TrustedRemotes::new();
        assert!(remotes.verify(10, &DISPATCHER, 10).is_err());
    }

    #[test]
    fn test_from_entries_last_wins() {
        let remotes = TrustedRemotes::from_entries(&[
            TrustedRemote {
                domain: 1,
                sender: AccountId::ZERO,
            },
            TrustedRemote {
                domain: 1,
                sender: DISPATCHER,
            },
        ]);
        assert_eq!(remotes.len(), 1);
        assert!(remotes.verify(1, &DISPATCHER, 1).is_ok());
    }
}
