// crates/pulserank-engine/src/lib.rs
//
// pulserank-engine: The scoring-and-ranking engine for PulseRank.
//
// An explicit sequence of pure transformations over an in-memory collection
// of heartbeats: window annotation, per-node aggregation, four-component
// weighted scoring with a new-node grace policy, tier assignment with a
// grace clamp, dense ranking, and snapshot assembly. No I/O happens here.

pub mod aggregate;
pub mod pipeline;
pub mod rank;
pub mod score;
pub mod window;

// Re-export key types for ergonomic access from downstream crates.
pub use aggregate::NodeAggregate;
pub use pipeline::{compute_leaderboard, EngineConfig, MAX_TOP_N};
pub use rank::ScoredNode;
pub use window::WindowConfig;
