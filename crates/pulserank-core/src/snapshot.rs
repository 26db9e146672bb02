// crates/pulserank-core/src/snapshot.rs
//
// Computed leaderboard documents for PulseRank.
//
// A NodeScoreSnapshot is one node's scored-and-ranked entry for a single
// computation cycle; a LeaderboardSnapshot is the full ranked result of one
// cycle. Snapshots are created fresh every cycle, never mutated afterwards,
// and superseded wholesale by the next cycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reputation tier, one of four ordered bands derived from the rounded
/// composite score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Top band: rounded composite >= 75.
    Prime,
    /// Second band: rounded composite >= 55. The floor for grace-eligible
    /// nodes, regardless of raw score.
    Strong,
    /// Third band: rounded composite >= 40.
    Standard,
    /// Bottom band: rounded composite < 40. Unreachable under grace.
    Probation,
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tier::Prime => write!(f, "prime"),
            Tier::Strong => write!(f, "strong"),
            Tier::Standard => write!(f, "standard"),
            Tier::Probation => write!(f, "probation"),
        }
    }
}

/// The four weighted sub-scores. Weights sum to 100.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SubScores {
    /// Availability score, 0-45.
    pub availability: f64,
    /// Network quality score, 0-30.
    pub network: f64,
    /// Resource headroom score, 0-10.
    pub resources: f64,
    /// Consistency score, 0-15.
    pub consistency: f64,
}

/// Per-node metrics aggregated over the trailing window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSummary {
    /// Number of distinct hour buckets with at least one heartbeat.
    pub distinct_hours: u32,
    /// Total heartbeats observed in the window.
    pub total_heartbeats: u64,
    /// Heartbeats within the recent threshold.
    pub recent_heartbeats: u64,
    /// Average throughput over present samples, None if no samples.
    pub avg_throughput: Option<f64>,
    /// Average latency (ms) over present samples, None if no samples.
    pub avg_latency_ms: Option<f64>,
    /// Average CPU utilization (%) over present samples, None if no samples.
    pub avg_cpu_pct: Option<f64>,
    /// Average memory utilization (%) over present samples, None if no samples.
    pub avg_memory_pct: Option<f64>,
    /// Average storage utilization (%) over present samples, None if no samples.
    pub avg_storage_pct: Option<f64>,
    /// Longest single continuous-uptime sample, capped at 24 hours.
    pub max_uptime_seconds: u64,
    /// Earliest heartbeat timestamp in the window.
    pub first_seen: DateTime<Utc>,
    /// Latest heartbeat timestamp in the window.
    pub last_seen: DateTime<Utc>,
}

/// One node's scored-and-ranked entry for a single computation cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeScoreSnapshot {
    /// Identifier of the node.
    pub node_id: String,
    /// Display name from the registry, if any.
    pub name: Option<String>,
    /// Country code from the registry, if any.
    pub country: Option<String>,
    /// Wallet identifier from the registry, if any.
    pub wallet: Option<String>,
    /// Aggregated window metrics the scores were derived from.
    pub metrics: MetricSummary,
    /// The four weighted sub-scores as computed (recorded even when the
    /// new-node override forces the composite).
    pub sub_scores: SubScores,
    /// Composite score in [0, 100], rounded to 2 decimals.
    pub score: f64,
    /// Reputation tier derived from the rounded composite.
    pub tier: Tier,
    /// Dense rank, 1-based, strictly following the sort order.
    pub rank: u32,
    /// Whether the node was grace-eligible this cycle.
    pub grace_eligible: bool,
}

/// The full ranked result of one computation cycle. Exactly one live
/// instance exists in the cache at a time; it is replaced atomically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardSnapshot {
    /// All ranked nodes, in rank order.
    pub entries: Vec<NodeScoreSnapshot>,
    /// Bounded top-N projection: always a prefix of `entries`, N <= 100.
    pub top: Vec<NodeScoreSnapshot>,
    /// Total number of nodes ranked this cycle.
    pub total_nodes: u32,
    /// When this snapshot was computed.
    pub computed_at: DateTime<Utc>,
    /// When this snapshot expires (computation time + refresh interval).
    /// An external TTL reaper may delete the document after this point.
    pub expires_at: DateTime<Utc>,
}

/// Per-tier node counts for aggregate statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierDistribution {
    pub prime: u32,
    pub strong: u32,
    pub standard: u32,
    pub probation: u32,
}

impl TierDistribution {
    /// Increment the count for the given tier.
    pub fn record(&mut self, tier: Tier) {
        match tier {
            Tier::Prime => self.prime += 1,
            Tier::Strong => self.strong += 1,
            Tier::Standard => self.standard += 1,
            Tier::Probation => self.probation += 1,
        }
    }
}

/// Aggregate statistics over the full ranked list of one cycle.
///
/// The `Default` value is the zeroed payload served when no nodes exist
/// (or no snapshot has been computed yet).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardStats {
    /// Total number of nodes ranked.
    pub total_nodes: u32,
    /// Mean composite score over the full list.
    pub average_score: f64,
    /// Highest composite score in the list.
    pub top_score: f64,
    /// Node counts per tier.
    pub tier_distribution: TierDistribution,
    /// Computation timestamp of the underlying snapshot, None if no
    /// snapshot has been computed yet.
    pub last_updated: Option<DateTime<Utc>>,
}
