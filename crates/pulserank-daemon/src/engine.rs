// crates/pulserank-daemon/src/engine.rs
//
// The leaderboard engine object: injected store handles plus the
// single-flight computation guard.
//
// Exactly one computation may run at a time. The guard is an atomic
// compare-and-set checked at computation entry; overlapping triggers are
// dropped, not queued or serialized. This is a deliberate load-shedding
// choice: a skipped cycle under contention is preferred over pipelining.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;

use pulserank_core::{NodeRegistry, PulseRankError, SnapshotStore, TelemetrySource};
use pulserank_engine::{compute_leaderboard, EngineConfig};

/// Outcome of one `run_cycle` invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The computation ran and the cache was replaced.
    Completed,
    /// Another computation was in flight; this trigger was dropped.
    Skipped,
    /// The computation ran and failed; the previous snapshot is untouched.
    Failed,
}

/// Releases the single-flight guard on drop, so the guard cannot stay
/// latched if the cycle future is dropped before completing.
struct FlightGuard<'a>(&'a AtomicBool);

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// The scoring-and-ranking engine with its injected store handles.
///
/// Explicitly constructed and owned by whichever process boundary starts
/// it — there is no ambient global state.
pub struct LeaderboardEngine {
    telemetry: Arc<dyn TelemetrySource>,
    registry: Arc<dyn NodeRegistry>,
    cache: Arc<dyn SnapshotStore>,
    config: EngineConfig,
    computing: AtomicBool,
}

impl LeaderboardEngine {
    /// Create an engine over the given stores.
    pub fn new(
        telemetry: Arc<dyn TelemetrySource>,
        registry: Arc<dyn NodeRegistry>,
        cache: Arc<dyn SnapshotStore>,
        config: EngineConfig,
    ) -> Self {
        Self {
            telemetry,
            registry,
            cache,
            config,
            computing: AtomicBool::new(false),
        }
    }

    /// The engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Handle to the snapshot cache, for the query facade.
    pub fn cache(&self) -> Arc<dyn SnapshotStore> {
        self.cache.clone()
    }

    /// Whether a computation is currently in flight.
    pub fn is_computing(&self) -> bool {
        self.computing.load(Ordering::SeqCst)
    }

    /// Run one computation cycle under the single-flight guard.
    ///
    /// If a computation is already in flight the trigger is dropped and
    /// `Skipped` is returned immediately. A failed cycle is logged and
    /// leaves the previous cache snapshot authoritative — freshness is
    /// sacrificed for availability, and the periodic schedule itself is
    /// the retry mechanism.
    pub async fn run_cycle(&self) -> CycleOutcome {
        if self
            .computing
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            tracing::debug!("computation already in flight; dropping trigger");
            return CycleOutcome::Skipped;
        }

        let _guard = FlightGuard(&self.computing);

        match self.compute_once().await {
            Ok(total_nodes) => {
                tracing::info!(total_nodes, "leaderboard recomputed");
                CycleOutcome::Completed
            }
            Err(e) => {
                tracing::error!("leaderboard computation failed: {}", e);
                CycleOutcome::Failed
            }
        }
    }

    /// Fetch the window, compute the snapshot, and replace the cache slot.
    async fn compute_once(&self) -> Result<u32, PulseRankError> {
        let now = Utc::now();
        let cutoff = self.config.window.window_cutoff(now);

        let heartbeats = self.telemetry.heartbeats_since(cutoff).await?;
        let registry_entries = self.registry.entries().await?;

        let snapshot = compute_leaderboard(heartbeats, &registry_entries, &self.config, now);
        let total_nodes = snapshot.total_nodes;

        self.cache.replace(&snapshot).await?;
        Ok(total_nodes)
    }
}
