// crates/repbridge-store/src/rocks.rs
//
// RocksDB-backed persistent storage for bridge state.
//
// Key format:
//   - `state:program`          -> JSON-serialized ProgramState
//   - `rep:{record_address}`   -> JSON-serialized BridgedReputation
//
// RocksDB has no compare-and-swap, so every read-modify-write path takes
// `write_lock` and lands its keys in a single WriteBatch. Plain reads do not
// take the lock.

use async_trait::async_trait;
use rocksdb::{DBWithThreadMode, MultiThreaded, Options, WriteBatch};
use tokio::sync::Mutex;

use repbridge_core::error::RepBridgeError;
use repbridge_core::identity::RecordAddress;
use repbridge_core::state::{BridgedReputation, ProgramState};
use repbridge_core::traits::{BridgeStore, CommitOutcome, StateMutation};

const PROGRAM_STATE_KEY: &[u8] = b"state:program";

/// RocksDB wrapper implementing the `BridgeStore` trait.
#[derive(Debug)]
pub struct RocksStore {
    db: DBWithThreadMode<MultiThreaded>,
    /// Serializes all read-modify-write sequences.
    write_lock: Mutex<()>,
}

impl RocksStore {
    /// Open a RocksDB database at the given filesystem path.
    ///
    /// Creates the database directory if it does not exist.
    pub fn open(path: &str) -> Result<Self, RepBridgeError> {
        let mut opts = Options::default();
        opts.create_if_missing(true);

        let db = DBWithThreadMode::<MultiThreaded>::open(&opts, path).map_err(|e| {
            RepBridgeError::Storage(format!("Failed to open RocksDB at {}: {}", path, e))
        })?;

        tracing::debug!("Opened RocksDB bridge store at {}", path);
        Ok(Self {
            db,
            write_lock: Mutex::new(()),
        })
    }

    /// Build the record key: `rep:{address}`.
    fn record_key(address: &RecordAddress) -> Vec<u8> {
        format!("rep:{}", address).into_bytes()
    }

    /// Get raw bytes from RocksDB, mapping errors to RepBridgeError::Storage.
    fn get_raw(&self, key: &[u8]) -> Result<Option<Vec<u8>>, RepBridgeError> {
        self.db
            .get(key)
            .map_err(|e| RepBridgeError::Storage(format!("RocksDB get failed: {}", e)))
    }

    /// Put raw bytes into RocksDB, mapping errors to RepBridgeError::Storage.
    fn put_raw(&self, key: &[u8], value: &[u8]) -> Result<(), RepBridgeError> {
        self.db
            .put(key, value)
            .map_err(|e| RepBridgeError::Storage(format!("RocksDB put failed: {}", e)))
    }

    /// Apply a batch atomically.
    fn write_batch(&self, batch: WriteBatch) -> Result<(), RepBridgeError> {
        self.db
            .write(batch)
            .map_err(|e| RepBridgeError::Storage(format!("RocksDB batch write failed: {}", e)))
    }

    fn load_program_state(&self) -> Result<Option<ProgramState>, RepBridgeError> {
        match self.get_raw(PROGRAM_STATE_KEY)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn load_record(
        &self,
        address: &RecordAddress,
    ) -> Result<Option<BridgedReputation>, RepBridgeError> {
        match self.get_raw(&Self::record_key(address))? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl BridgeStore for RocksStore {
    async fn program_state(&self) -> Result<Option<ProgramState>, RepBridgeError> {
        self.load_program_state()
    }

    async fn create_program_state(&self, state: &ProgramState) -> Result<(), RepBridgeError> {
        let _guard = self.write_lock.lock().await;
        if self.load_program_state()?.is_some() {
            return Err(RepBridgeError::AlreadyInitialized);
        }
        let json = serde_json::to_vec(state)?;
        self.put_raw(PROGRAM_STATE_KEY, &json)
    }

    async fn update_program_state(
        &self,
        mutation: StateMutation,
    ) -> Result<ProgramState, RepBridgeError> {
        let _guard = self.write_lock.lock().await;
        let mut state = self
            .load_program_state()?
            .ok_or(RepBridgeError::NotInitialized)?;
        mutation(&mut state)?;
        let json = serde_json::to_vec(&state)?;
        self.put_raw(PROGRAM_STATE_KEY, &json)?;
        Ok(state)
    }

    async fn reputation(
        &self,
        address: &RecordAddress,
    ) -> Result<Option<BridgedReputation>, RepBridgeError> {
        self.load_record(address)
    }

    async fn commit_reputation(
        &self,
        address: &RecordAddress,
        expected_nonce: Option<u64>,
        record: &BridgedReputation,
    ) -> Result<CommitOutcome, RepBridgeError> {
        let _guard = self.write_lock.lock().await;

        let current_nonce = self.load_record(address)?.map(|r| r.nonce);
        if current_nonce != expected_nonce {
            return Ok(CommitOutcome::Conflict { current_nonce });
        }

        let mut state = self
            .load_program_state()?
            .ok_or(RepBridgeError::NotInitialized)?;
        state.total_bridged += 1;

        // Record and counter land together or not at all.
        let mut batch = WriteBatch::default();
        batch.put(Self::record_key(address), serde_json::to_vec(record)?);
        batch.put(PROGRAM_STATE_KEY, serde_json::to_vec(&state)?);
        self.write_batch(batch)?;

        Ok(CommitOutcome::Committed {
            total_bridged: state.total_bridged,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use repbridge_core::identity::AccountId;

    fn temp_db_path(label: &str) -> String {
        let path = std::env::temp_dir().join(format!(
            "repbridge_test_{}_{}",
            label,
            uuid::Uuid::now_v7()
        ));
        path.to_string_lossy().to_string()
    }

    fn record(nonce: u64) -> BridgedReputation {
        BridgedReputation {
            is_initialized: true,
            source_agent: vec![0xde, 0xad, 0xbe, 0xef],
            score: 850,
            source_chain: 84532,
            nonce,
            last_updated: 1_700_000_000,
            attested_at: 1_699_999_990,
            attestation_id: [0xab; 32],
        }
    }

    #[test]
    fn test_record_key_format() {
        let key = RocksStore::record_key(&RecordAddress([0u8; 32]));
        assert_eq!(key, format!("rep:{}", "00".repeat(32)).into_bytes());
    }

    #[tokio::test]
    async fn test_state_and_commit_persist_across_reopen() {
        let path = temp_db_path("reopen");
        let addr = RecordAddress([3u8; 32]);
        {
            let store = RocksStore::open(&path).unwrap();
            store
                .create_program_state(&ProgramState::new(AccountId([1u8; 32])))
                .await
                .unwrap();
            let outcome = store.commit_reputation(&addr, None, &record(1)).await.unwrap();
            assert_eq!(outcome, CommitOutcome::Committed { total_bridged: 1 });
        }

        let store = RocksStore::open(&path).unwrap();
        let state = store.program_state().await.unwrap().unwrap();
        assert_eq!(state.total_bridged, 1);
        assert_eq!(store.reputation(&addr).await.unwrap(), Some(record(1)));

        let _ = std::fs::remove_dir_all(&path);
    }

    #[tokio::test]
    async fn test_conflict_and_double_init() {
        let path = temp_db_path("conflict");
        let store = RocksStore::open(&path).unwrap();
        store
            .create_program_state(&ProgramState::new(AccountId([1u8; 32])))
            .await
            .unwrap();
        assert_eq!(
            store
                .create_program_state(&ProgramState::new(AccountId([2u8; 32])))
                .await
                .unwrap_err(),
            RepBridgeError::AlreadyInitialized
        );

        let addr = RecordAddress([4u8; 32]);
        store.commit_reputation(&addr, None, &record(2)).await.unwrap();
        let outcome = store
            .commit_reputation(&addr, Some(1), &record(3))
            .await
            .unwrap();
        assert_eq!(
            outcome,
            CommitOutcome::Conflict {
                current_nonce: Some(2)
            }
        );
        assert_eq!(store.program_state().await.unwrap().unwrap().total_bridged, 1);

        drop(store);
        let _ = std::fs::remove_dir_all(&path);
    }

    #[tokio::test]
    async fn test_update_program_state_persists() {
        let path = temp_db_path("update");
        let store = RocksStore::open(&path).unwrap();
        store
            .create_program_state(&ProgramState::new(AccountId([1u8; 32])))
            .await
            .unwrap();
        let updated = store
            .update_program_state(Box::new(|s| {
                s.paused = true;
                Ok(())
            }))
            .await
            .unwrap();
        assert!(updated.paused);
        assert!(store.program_state().await.unwrap().unwrap().paused);

        drop(store);
        let _ = std::fs::remove_dir_all(&path);
    }
}
