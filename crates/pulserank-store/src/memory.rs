// crates/pulserank-store/src/memory.rs
//
// In-memory store implementations for development and tests.
//
// These back the same traits as the production adapters: a heartbeat
// telemetry source queryable by time range, a registry joinable by node
// identifier, and a single-slot snapshot cache with wholesale replace.

use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use pulserank_core::error::PulseRankError;
use pulserank_core::heartbeat::HeartbeatRecord;
use pulserank_core::registry::NodeRegistryEntry;
use pulserank_core::snapshot::LeaderboardSnapshot;
use pulserank_core::traits::{NodeRegistry, SnapshotStore, TelemetrySource};

/// In-memory heartbeat telemetry source.
#[derive(Debug, Default)]
pub struct MemoryTelemetryStore {
    records: RwLock<Vec<HeartbeatRecord>>,
}

impl MemoryTelemetryStore {
    /// Create a new empty telemetry store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a single heartbeat record.
    pub fn push(&self, record: HeartbeatRecord) -> Result<(), PulseRankError> {
        let mut records = self
            .records
            .write()
            .map_err(|e| PulseRankError::Telemetry(format!("RwLock poisoned: {}", e)))?;
        records.push(record);
        Ok(())
    }

    /// Append a batch of heartbeat records.
    pub fn extend(
        &self,
        batch: impl IntoIterator<Item = HeartbeatRecord>,
    ) -> Result<(), PulseRankError> {
        let mut records = self
            .records
            .write()
            .map_err(|e| PulseRankError::Telemetry(format!("RwLock poisoned: {}", e)))?;
        records.extend(batch);
        Ok(())
    }
}

#[async_trait]
impl TelemetrySource for MemoryTelemetryStore {
    async fn heartbeats_since(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<HeartbeatRecord>, PulseRankError> {
        let records = self
            .records
            .read()
            .map_err(|e| PulseRankError::Telemetry(format!("RwLock poisoned: {}", e)))?;
        Ok(records
            .iter()
            .filter(|r| r.timestamp >= cutoff)
            .cloned()
            .collect())
    }
}

/// In-memory node registry.
#[derive(Debug, Default)]
pub struct MemoryRegistry {
    entries: RwLock<Vec<NodeRegistryEntry>>,
}

impl MemoryRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node, replacing any existing entry with the same id.
    pub fn register(&self, entry: NodeRegistryEntry) -> Result<(), PulseRankError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| PulseRankError::Registry(format!("RwLock poisoned: {}", e)))?;
        entries.retain(|e| e.node_id != entry.node_id);
        entries.push(entry);
        Ok(())
    }
}

#[async_trait]
impl NodeRegistry for MemoryRegistry {
    async fn entries(&self) -> Result<Vec<NodeRegistryEntry>, PulseRankError> {
        let entries = self
            .entries
            .read()
            .map_err(|e| PulseRankError::Registry(format!("RwLock poisoned: {}", e)))?;
        Ok(entries.clone())
    }
}

/// In-memory single-slot snapshot cache.
///
/// Readers observe either the previous complete snapshot or the new one;
/// the slot swap happens under the write lock in one assignment.
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    slot: RwLock<Option<LeaderboardSnapshot>>,
}

impl MemorySnapshotStore {
    /// Create a new empty snapshot store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn replace(&self, snapshot: &LeaderboardSnapshot) -> Result<(), PulseRankError> {
        let mut slot = self
            .slot
            .write()
            .map_err(|e| PulseRankError::Storage(format!("RwLock poisoned: {}", e)))?;
        *slot = Some(snapshot.clone());
        Ok(())
    }

    async fn read(&self) -> Result<Option<LeaderboardSnapshot>, PulseRankError> {
        let slot = self
            .slot
            .read()
            .map_err(|e| PulseRankError::Storage(format!("RwLock poisoned: {}", e)))?;
        Ok(slot.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn heartbeat(node_id: &str, timestamp: DateTime<Utc>) -> HeartbeatRecord {
        HeartbeatRecord {
            node_id: node_id.to_string(),
            timestamp,
            network: None,
            resources: None,
            uptime_seconds: 0,
        }
    }

    #[tokio::test]
    async fn telemetry_store_filters_by_cutoff() {
        let store = MemoryTelemetryStore::new();
        let now = Utc::now();
        store.push(heartbeat("a", now - Duration::days(10))).unwrap();
        store.push(heartbeat("a", now - Duration::days(1))).unwrap();
        store.push(heartbeat("b", now)).unwrap();

        let records = store.heartbeats_since(now - Duration::days(7)).await.unwrap();
        assert_eq!(records.len(), 2);
    }

    #[tokio::test]
    async fn registry_replaces_entry_on_reregistration() {
        let registry = MemoryRegistry::new();
        let now = Utc::now();
        let mut entry = NodeRegistryEntry {
            node_id: "a".to_string(),
            registered_at: now,
            grace_period: false,
            grace_period_end: None,
            name: Some("first".to_string()),
            country: None,
            wallet: None,
        };
        registry.register(entry.clone()).unwrap();
        entry.name = Some("second".to_string());
        registry.register(entry).unwrap();

        let entries = registry.entries().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name.as_deref(), Some("second"));
    }

    #[tokio::test]
    async fn snapshot_store_starts_empty_and_replaces_wholesale() {
        let store = MemorySnapshotStore::new();
        assert!(store.read().await.unwrap().is_none());

        let now = Utc::now();
        let first = LeaderboardSnapshot {
            entries: Vec::new(),
            top: Vec::new(),
            total_nodes: 0,
            computed_at: now,
            expires_at: now + Duration::seconds(60),
        };
        store.replace(&first).await.unwrap();
        assert_eq!(store.read().await.unwrap().unwrap().computed_at, now);

        let later = now + Duration::seconds(60);
        let second = LeaderboardSnapshot {
            computed_at: later,
            expires_at: later + Duration::seconds(60),
            ..first
        };
        store.replace(&second).await.unwrap();
        assert_eq!(store.read().await.unwrap().unwrap().computed_at, later);
    }
}
