// crates/pulserank-core/src/traits.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::PulseRankError;
use crate::heartbeat::HeartbeatRecord;
use crate::registry::NodeRegistryEntry;
use crate::snapshot::LeaderboardSnapshot;

/// Trait for the read-only heartbeat telemetry source.
///
/// Implemented by pulserank-store (in-memory backend) or any adapter over
/// a queryable time-series store.
#[async_trait]
pub trait TelemetrySource: Send + Sync {
    /// Fetch all heartbeats with `timestamp >= cutoff`, in no particular order.
    async fn heartbeats_since(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<HeartbeatRecord>, PulseRankError>;
}

/// Trait for the external node registry, joined by node identifier.
/// The engine always joins against the full entry list, so a per-id
/// lookup is not part of the seam.
#[async_trait]
pub trait NodeRegistry: Send + Sync {
    /// Fetch all registry entries.
    async fn entries(&self) -> Result<Vec<NodeRegistryEntry>, PulseRankError>;
}

/// Trait for the single-slot leaderboard snapshot cache.
///
/// The cache is a document store holding exactly one live snapshot under a
/// fixed key. Readers always observe either the previous complete snapshot
/// or the new complete snapshot, never a partial one.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Atomically replace the cached snapshot wholesale (upsert semantics:
    /// create if absent).
    async fn replace(&self, snapshot: &LeaderboardSnapshot) -> Result<(), PulseRankError>;

    /// Read the current snapshot, or None if no snapshot has ever been
    /// written (the "not yet computed" sentinel).
    async fn read(&self) -> Result<Option<LeaderboardSnapshot>, PulseRankError>;
}
