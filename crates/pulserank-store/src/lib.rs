// crates/pulserank-store/src/lib.rs
//
// pulserank-store: Storage layer for PulseRank.
//
// Provides the RocksDB-backed single-slot snapshot cache (whole-document
// replace with an expiry marker and a capacity warning), plus in-memory
// telemetry, registry, and snapshot stores for development and tests.

pub mod memory;
pub mod rocks;

// Re-export key types for ergonomic access from downstream crates.
pub use memory::{MemoryRegistry, MemorySnapshotStore, MemoryTelemetryStore};
pub use rocks::RocksSnapshotStore;
