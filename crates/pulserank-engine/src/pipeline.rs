// crates/pulserank-engine/src/pipeline.rs
//
// Snapshot assembly: the full pure pipeline for one computation cycle.
//
// annotate window -> aggregate per node -> score -> rank -> assemble a
// LeaderboardSnapshot with its bounded top-N projection. Callers own all
// I/O; this function only transforms in-memory collections.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use pulserank_core::{HeartbeatRecord, LeaderboardSnapshot, NodeRegistryEntry};

use crate::aggregate::aggregate_by_node;
use crate::rank::{rank_nodes, ScoredNode};
use crate::score::{compute_sub_scores, final_score};
use crate::window::{annotate_window, WindowConfig};

/// Hard cap on the top-N projection size.
pub const MAX_TOP_N: usize = 100;

/// Configuration for the scoring-and-ranking engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Trailing-window configuration.
    #[serde(default)]
    pub window: WindowConfig,

    /// Recompute cadence in seconds; also sets each snapshot's expiry
    /// (default: 60).
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,

    /// Size of the top-N projection, capped at `MAX_TOP_N` (default: 100).
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

fn default_refresh_interval_secs() -> u64 {
    60
}

fn default_top_n() -> usize {
    MAX_TOP_N
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            refresh_interval_secs: default_refresh_interval_secs(),
            top_n: default_top_n(),
        }
    }
}

/// Compute a full leaderboard snapshot from raw heartbeats and registry
/// entries.
///
/// Nodes with zero heartbeats in the window are excluded entirely; nodes
/// with heartbeats but no registry entry are ranked without display
/// metadata and without grace protection.
pub fn compute_leaderboard(
    heartbeats: Vec<HeartbeatRecord>,
    registry: &[NodeRegistryEntry],
    config: &EngineConfig,
    now: DateTime<Utc>,
) -> LeaderboardSnapshot {
    let annotated = annotate_window(heartbeats, &config.window, now);
    let aggregates = aggregate_by_node(&annotated);

    let by_id: HashMap<&str, &NodeRegistryEntry> = registry
        .iter()
        .map(|e| (e.node_id.as_str(), e))
        .collect();

    let scored: Vec<ScoredNode> = aggregates
        .into_iter()
        .map(|agg| {
            let entry = by_id.get(agg.node_id.as_str()).copied();
            let grace_eligible = entry.map(|e| e.grace_eligible(now)).unwrap_or(false);

            let sub_scores = compute_sub_scores(&agg.metrics, &config.window, now);
            let score = final_score(&agg.metrics, &sub_scores, grace_eligible);

            ScoredNode {
                node_id: agg.node_id,
                name: entry.and_then(|e| e.name.clone()),
                country: entry.and_then(|e| e.country.clone()),
                wallet: entry.and_then(|e| e.wallet.clone()),
                metrics: agg.metrics,
                sub_scores,
                score,
                grace_eligible,
                order: agg.order,
            }
        })
        .collect();

    let entries = rank_nodes(scored);
    let total_nodes = entries.len() as u32;

    let top_len = config.top_n.min(MAX_TOP_N).min(entries.len());
    let top = entries[..top_len].to_vec();

    tracing::debug!(
        total_nodes,
        top_len,
        "leaderboard pipeline produced snapshot"
    );

    LeaderboardSnapshot {
        entries,
        top,
        total_nodes,
        computed_at: now,
        expires_at: now + Duration::seconds(config.refresh_interval_secs as i64),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulserank_core::{NetworkMetrics, Tier};

    fn heartbeat(node_id: &str, timestamp: DateTime<Utc>) -> HeartbeatRecord {
        HeartbeatRecord {
            node_id: node_id.to_string(),
            timestamp,
            network: Some(NetworkMetrics {
                throughput: Some(200.0),
                latency_ms: Some(50.0),
            }),
            resources: None,
            uptime_seconds: 7_200,
        }
    }

    fn registry_entry(node_id: &str, registered_days_ago: i64) -> NodeRegistryEntry {
        NodeRegistryEntry {
            node_id: node_id.to_string(),
            registered_at: Utc::now() - Duration::days(registered_days_ago),
            grace_period: false,
            grace_period_end: None,
            name: Some(format!("Node {}", node_id)),
            country: None,
            wallet: None,
        }
    }

    #[test]
    fn zero_heartbeat_nodes_are_excluded() {
        let now = Utc::now();
        let heartbeats = vec![heartbeat("active", now - Duration::hours(1))];
        let registry = vec![
            registry_entry("active", 30),
            registry_entry("silent", 30),
        ];
        let snapshot =
            compute_leaderboard(heartbeats, &registry, &EngineConfig::default(), now);
        assert_eq!(snapshot.total_nodes, 1);
        assert_eq!(snapshot.entries[0].node_id, "active");
    }

    #[test]
    fn brand_new_node_is_forced_to_100_and_ranked_normally() {
        let now = Utc::now();
        let mut heartbeats = vec![
            heartbeat("newcomer", now - Duration::hours(1)),
            heartbeat("newcomer", now - Duration::hours(2)),
            heartbeat("newcomer", now - Duration::hours(3)),
        ];
        // A veteran with plenty of telemetry but an imperfect score.
        for h in 0..150 {
            heartbeats.push(heartbeat("veteran", now - Duration::hours(h)));
        }
        let registry = vec![registry_entry("newcomer", 1), registry_entry("veteran", 60)];

        let snapshot =
            compute_leaderboard(heartbeats, &registry, &EngineConfig::default(), now);

        let newcomer = snapshot
            .entries
            .iter()
            .find(|e| e.node_id == "newcomer")
            .unwrap();
        assert_eq!(newcomer.score, 100.0);
        assert_eq!(newcomer.tier, Tier::Prime);
        assert_eq!(newcomer.rank, 1);
        assert!(newcomer.grace_eligible);
    }

    #[test]
    fn unregistered_nodes_rank_without_grace_or_metadata() {
        let now = Utc::now();
        let heartbeats = vec![heartbeat("ghost", now - Duration::hours(1))];
        let snapshot = compute_leaderboard(heartbeats, &[], &EngineConfig::default(), now);
        let entry = &snapshot.entries[0];
        assert!(!entry.grace_eligible);
        assert!(entry.name.is_none());
    }

    #[test]
    fn top_projection_is_a_prefix_of_entries() {
        let now = Utc::now();
        let mut heartbeats = Vec::new();
        for i in 0..20 {
            // Stagger hours so scores differ.
            for h in 0..=i {
                heartbeats.push(heartbeat(&format!("node-{i}"), now - Duration::hours(h)));
            }
        }
        let config = EngineConfig {
            top_n: 5,
            ..EngineConfig::default()
        };
        let snapshot = compute_leaderboard(heartbeats, &[], &config, now);
        assert_eq!(snapshot.top.len(), 5);
        assert_eq!(snapshot.top[..], snapshot.entries[..5]);
    }

    #[test]
    fn top_n_is_capped_at_100() {
        let now = Utc::now();
        let mut heartbeats = Vec::new();
        for i in 0..120 {
            heartbeats.push(heartbeat(&format!("node-{i}"), now - Duration::hours(1)));
        }
        let config = EngineConfig {
            top_n: 500,
            ..EngineConfig::default()
        };
        let snapshot = compute_leaderboard(heartbeats, &[], &config, now);
        assert_eq!(snapshot.total_nodes, 120);
        assert_eq!(snapshot.top.len(), MAX_TOP_N);
    }

    #[test]
    fn ranks_form_dense_permutation() {
        let now = Utc::now();
        let mut heartbeats = Vec::new();
        for i in 0..10 {
            for h in 0..(i + 1) {
                heartbeats.push(heartbeat(&format!("node-{i}"), now - Duration::hours(h)));
            }
        }
        let snapshot = compute_leaderboard(heartbeats, &[], &EngineConfig::default(), now);
        let ranks: Vec<u32> = snapshot.entries.iter().map(|e| e.rank).collect();
        assert_eq!(ranks, (1..=10).collect::<Vec<u32>>());
        // All composite scores within bounds.
        for e in &snapshot.entries {
            assert!((0.0..=100.0).contains(&e.score));
        }
    }

    #[test]
    fn expiry_follows_refresh_interval() {
        let now = Utc::now();
        let config = EngineConfig {
            refresh_interval_secs: 90,
            ..EngineConfig::default()
        };
        let snapshot = compute_leaderboard(Vec::new(), &[], &config, now);
        assert_eq!(snapshot.computed_at, now);
        assert_eq!(snapshot.expires_at, now + Duration::seconds(90));
        assert_eq!(snapshot.total_nodes, 0);
        assert!(snapshot.entries.is_empty());
        assert!(snapshot.top.is_empty());
    }
}
