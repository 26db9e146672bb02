// crates/pulserank-daemon/src/facade.rs
//
// Query facade: the read/command surface over the cache slot.
//
// Every read is served from the cached snapshot; no operation here ever
// touches raw telemetry. When no snapshot has been computed yet the facade
// answers with the "not yet computed" sentinel (empty list, no timestamp)
// rather than an error.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pulserank_core::{
    LeaderboardSnapshot, LeaderboardStats, NodeScoreSnapshot, PulseRankError, SnapshotStore,
};
use pulserank_engine::MAX_TOP_N;

use crate::scheduler::{RefreshAck, RefreshScheduler};

/// Default top-N size when the caller does not specify one.
pub const DEFAULT_TOP_N: u32 = 10;

/// Response for the full ranked-list read.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TopResponse {
    /// The cached top-N projection, in rank order.
    pub entries: Vec<NodeScoreSnapshot>,
    /// Total number of nodes ranked in the underlying cycle.
    pub total_nodes: u32,
    /// Computation timestamp of the snapshot, None if not yet computed.
    pub last_updated: Option<DateTime<Utc>>,
}

/// Response for a bounded top-N read.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TopNResponse {
    /// The requested prefix of the top projection, in rank order.
    pub entries: Vec<NodeScoreSnapshot>,
    /// The clamped request size.
    pub requested: u32,
    /// The number of entries actually returned.
    pub returned: u32,
    /// Total number of nodes ranked in the underlying cycle.
    pub total_nodes: u32,
    /// Computation timestamp of the snapshot, None if not yet computed.
    pub last_updated: Option<DateTime<Utc>>,
}

/// Read operations over the cached leaderboard, plus the forced-refresh
/// command delegated to the scheduler.
pub struct QueryFacade {
    cache: Arc<dyn SnapshotStore>,
    scheduler: Arc<RefreshScheduler>,
}

impl QueryFacade {
    /// Create a facade over the given cache and scheduler.
    pub fn new(cache: Arc<dyn SnapshotStore>, scheduler: Arc<RefreshScheduler>) -> Self {
        Self { cache, scheduler }
    }

    /// The cached top-N projection plus totals, or the sentinel.
    pub async fn get_top(&self) -> Result<TopResponse, PulseRankError> {
        match self.cache.read().await? {
            Some(snapshot) => Ok(TopResponse {
                total_nodes: snapshot.total_nodes,
                last_updated: Some(snapshot.computed_at),
                entries: snapshot.top,
            }),
            None => Ok(TopResponse::default()),
        }
    }

    /// One node's entry, searched in the *full* ranked list (not just the
    /// top-N projection). A missing node is a `NotFound`, distinct from a
    /// system error.
    pub async fn get_node(&self, node_id: &str) -> Result<NodeScoreSnapshot, PulseRankError> {
        let snapshot = self
            .cache
            .read()
            .await?
            .ok_or_else(|| PulseRankError::NotFound(format!("node {}", node_id)))?;

        snapshot
            .entries
            .into_iter()
            .find(|e| e.node_id == node_id)
            .ok_or_else(|| PulseRankError::NotFound(format!("node {}", node_id)))
    }

    /// The first `n` entries of the top projection. `n` defaults to 10 and
    /// is clamped to [1, 100].
    pub async fn get_top_n(&self, n: Option<u32>) -> Result<TopNResponse, PulseRankError> {
        let requested = n.unwrap_or(DEFAULT_TOP_N).clamp(1, MAX_TOP_N as u32);

        match self.cache.read().await? {
            Some(snapshot) => {
                let take = (requested as usize).min(snapshot.top.len());
                let entries = snapshot.top[..take].to_vec();
                Ok(TopNResponse {
                    requested,
                    returned: entries.len() as u32,
                    total_nodes: snapshot.total_nodes,
                    last_updated: Some(snapshot.computed_at),
                    entries,
                })
            }
            None => Ok(TopNResponse {
                requested,
                ..TopNResponse::default()
            }),
        }
    }

    /// Aggregate statistics over the *full* ranked list (not the top-N
    /// projection). A zeroed default when no snapshot exists or the cycle
    /// ranked zero nodes.
    pub async fn get_stats(&self) -> Result<LeaderboardStats, PulseRankError> {
        match self.cache.read().await? {
            Some(snapshot) => Ok(stats_over(&snapshot)),
            None => Ok(LeaderboardStats::default()),
        }
    }

    /// Trigger an immediate recompute. Returns without awaiting
    /// completion; a no-op if a computation is already in flight.
    pub fn force_refresh(&self) -> RefreshAck {
        self.scheduler.force_refresh()
    }
}

/// Compute aggregate statistics over a snapshot's full ranked list.
fn stats_over(snapshot: &LeaderboardSnapshot) -> LeaderboardStats {
    let mut stats = LeaderboardStats {
        last_updated: Some(snapshot.computed_at),
        ..LeaderboardStats::default()
    };
    if snapshot.entries.is_empty() {
        return stats;
    }

    let mut sum = 0.0;
    let mut max = f64::MIN;
    for entry in &snapshot.entries {
        sum += entry.score;
        if entry.score > max {
            max = entry.score;
        }
        stats.tier_distribution.record(entry.tier);
    }

    stats.total_nodes = snapshot.entries.len() as u32;
    stats.average_score = sum / snapshot.entries.len() as f64;
    stats.top_score = max;
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use pulserank_core::{MetricSummary, SubScores, Tier};

    fn entry(node_id: &str, score: f64, tier: Tier, rank: u32) -> NodeScoreSnapshot {
        let now = Utc::now();
        NodeScoreSnapshot {
            node_id: node_id.to_string(),
            name: None,
            country: None,
            wallet: None,
            metrics: MetricSummary {
                distinct_hours: 0,
                total_heartbeats: 0,
                recent_heartbeats: 0,
                avg_throughput: None,
                avg_latency_ms: None,
                avg_cpu_pct: None,
                avg_memory_pct: None,
                avg_storage_pct: None,
                max_uptime_seconds: 0,
                first_seen: now,
                last_seen: now,
            },
            sub_scores: SubScores {
                availability: 0.0,
                network: 0.0,
                resources: 0.0,
                consistency: 0.0,
            },
            score,
            tier,
            rank,
            grace_eligible: false,
        }
    }

    fn snapshot(entries: Vec<NodeScoreSnapshot>) -> LeaderboardSnapshot {
        let now = Utc::now();
        let top = entries.clone();
        LeaderboardSnapshot {
            total_nodes: entries.len() as u32,
            entries,
            top,
            computed_at: now,
            expires_at: now + Duration::seconds(60),
        }
    }

    #[test]
    fn stats_match_manual_computation() {
        let snap = snapshot(vec![
            entry("a", 90.0, Tier::Prime, 1),
            entry("b", 60.0, Tier::Strong, 2),
            entry("c", 45.0, Tier::Standard, 3),
            entry("d", 30.0, Tier::Probation, 4),
        ]);
        let stats = stats_over(&snap);
        assert_eq!(stats.total_nodes, 4);
        assert!((stats.average_score - 56.25).abs() < 1e-10);
        assert_eq!(stats.top_score, 90.0);
        assert_eq!(stats.tier_distribution.prime, 1);
        assert_eq!(stats.tier_distribution.strong, 1);
        assert_eq!(stats.tier_distribution.standard, 1);
        assert_eq!(stats.tier_distribution.probation, 1);
        assert_eq!(stats.last_updated, Some(snap.computed_at));
    }

    #[test]
    fn stats_over_empty_snapshot_are_zeroed() {
        let snap = snapshot(Vec::new());
        let stats = stats_over(&snap);
        assert_eq!(stats.total_nodes, 0);
        assert_eq!(stats.average_score, 0.0);
        assert_eq!(stats.top_score, 0.0);
        // The snapshot exists, so its timestamp is still reported.
        assert!(stats.last_updated.is_some());
    }
}
