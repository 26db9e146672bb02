// crates/pulserank-store/src/rocks.rs
//
// RocksDB-backed single-slot snapshot cache.
//
// Key format:
//   - `leaderboard:current` -> JSON-serialized LeaderboardSnapshot
//
// The cache holds exactly one live document, replaced wholesale on every
// write (upsert semantics). It is not an append-only history: the previous
// snapshot is gone the moment the new one lands. The document carries its
// own `expires_at` marker for an external TTL reaper; under normal
// operation a fresh write always precedes expiry.

use async_trait::async_trait;
use rocksdb::{DBWithThreadMode, MultiThreaded, Options};

use pulserank_core::error::PulseRankError;
use pulserank_core::snapshot::LeaderboardSnapshot;
use pulserank_core::traits::SnapshotStore;

/// Fixed key of the single cache slot.
const SNAPSHOT_KEY: &[u8] = b"leaderboard:current";

/// Assumed maximum document size of the backing store (16 MiB).
pub const MAX_DOCUMENT_BYTES: usize = 16 * 1024 * 1024;

/// Default warning threshold: 75% of the maximum document size.
pub const DEFAULT_WARN_BYTES: usize = MAX_DOCUMENT_BYTES / 4 * 3;

/// RocksDB wrapper implementing the `SnapshotStore` trait.
#[derive(Debug)]
pub struct RocksSnapshotStore {
    db: DBWithThreadMode<MultiThreaded>,
    /// Serialized-size warning threshold in bytes.
    warn_bytes: usize,
}

impl RocksSnapshotStore {
    /// Open a RocksDB database at the given filesystem path.
    ///
    /// Creates the database directory if it does not exist.
    pub fn open(path: &str) -> Result<Self, PulseRankError> {
        let mut opts = Options::default();
        opts.create_if_missing(true);

        let db = DBWithThreadMode::<MultiThreaded>::open(&opts, path).map_err(|e| {
            PulseRankError::Storage(format!("Failed to open RocksDB at {}: {}", path, e))
        })?;

        Ok(Self {
            db,
            warn_bytes: DEFAULT_WARN_BYTES,
        })
    }

    /// Override the capacity warning threshold in bytes.
    pub fn with_warn_bytes(mut self, warn_bytes: usize) -> Self {
        self.warn_bytes = warn_bytes;
        self
    }

    /// Synchronous replace: serialize, measure, warn if near capacity, put.
    pub fn replace_sync(&self, snapshot: &LeaderboardSnapshot) -> Result<(), PulseRankError> {
        let json = serde_json::to_vec(snapshot)?;

        // Capacity signal for operators, not a fatal condition.
        if json.len() > self.warn_bytes {
            tracing::warn!(
                size_bytes = json.len(),
                warn_bytes = self.warn_bytes,
                total_nodes = snapshot.total_nodes,
                "leaderboard snapshot is nearing the store's document size limit"
            );
        }

        self.db
            .put(SNAPSHOT_KEY, &json)
            .map_err(|e| PulseRankError::Storage(format!("RocksDB put failed: {}", e)))
    }

    /// Synchronous read of the current slot, None if never written.
    pub fn read_sync(&self) -> Result<Option<LeaderboardSnapshot>, PulseRankError> {
        let bytes = self
            .db
            .get(SNAPSHOT_KEY)
            .map_err(|e| PulseRankError::Storage(format!("RocksDB get failed: {}", e)))?;

        match bytes {
            Some(bytes) => {
                let snapshot: LeaderboardSnapshot = serde_json::from_slice(&bytes)?;
                Ok(Some(snapshot))
            }
            None => Ok(None),
        }
    }
}

#[async_trait]
impl SnapshotStore for RocksSnapshotStore {
    async fn replace(&self, snapshot: &LeaderboardSnapshot) -> Result<(), PulseRankError> {
        self.replace_sync(snapshot)
    }

    async fn read(&self) -> Result<Option<LeaderboardSnapshot>, PulseRankError> {
        self.read_sync()
    }
}
