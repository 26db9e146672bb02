// crates/pulserank-core/src/lib.rs
//
// pulserank-core: Core types, traits, and error taxonomy for PulseRank.
//
// PulseRank ranks networked nodes by a reputation score computed from
// periodic heartbeat telemetry. This crate holds the shared data model
// (heartbeats, registry entries, score snapshots, the leaderboard document)
// and the async traits at the storage seams.

pub mod error;
pub mod heartbeat;
pub mod registry;
pub mod snapshot;
pub mod traits;

// Re-export key types for ergonomic access from downstream crates.
pub use error::PulseRankError;
pub use heartbeat::{AnnotatedHeartbeat, HeartbeatRecord, NetworkMetrics, ResourceMetrics};
pub use registry::NodeRegistryEntry;
pub use snapshot::{
    LeaderboardSnapshot, LeaderboardStats, MetricSummary, NodeScoreSnapshot, SubScores, Tier,
    TierDistribution,
};
pub use traits::{NodeRegistry, SnapshotStore, TelemetrySource};
