// crates/pulserank-daemon/src/lib.rs
//
// pulserank-daemon: runtime wiring for PulseRank.
//
// Owns the recompute lifecycle: the leaderboard engine object with its
// injected store handles and single-flight guard, the refresh scheduler
// with its cancellable ticker and bounded-drain shutdown, the query facade
// serving reads from the cache slot, and the TOML daemon configuration.

pub mod config;
pub mod engine;
pub mod facade;
pub mod scheduler;

// Re-export key types for ergonomic access from the binary and tests.
pub use config::DaemonConfig;
pub use engine::{CycleOutcome, LeaderboardEngine};
pub use facade::{QueryFacade, TopNResponse, TopResponse};
pub use scheduler::{RefreshAck, RefreshScheduler, SchedulerState};
