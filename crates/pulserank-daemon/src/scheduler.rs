// crates/pulserank-daemon/src/scheduler.rs
//
// Refresh scheduler for the PulseRank daemon.
//
// Lifecycle: Stopped -> Running -> ShuttingDown -> Stopped. While running,
// a ticker task triggers a recompute at the configured interval; ticks and
// forced refreshes share the engine's single-flight guard, so overlapping
// triggers are dropped rather than queued. Stop signals the ticker to exit
// between cycles and drains any in-flight computation with a bounded wait.
// An in-flight computation is never cancelled; it runs to completion or
// failure.

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::engine::{CycleOutcome, LeaderboardEngine};

/// Maximum time `stop` waits for an in-flight computation to finish.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);
/// Poll step used while draining detached refresh tasks.
const DRAIN_POLL: Duration = Duration::from_millis(50);

const STATE_STOPPED: u8 = 0;
const STATE_RUNNING: u8 = 1;
const STATE_SHUTTING_DOWN: u8 = 2;

/// Lifecycle states of the refresh scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Not started, or fully stopped.
    Stopped,
    /// Ticker armed; computations run on ticks and forced refreshes.
    Running,
    /// Stop requested; draining any in-flight computation.
    ShuttingDown,
}

impl fmt::Display for SchedulerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchedulerState::Stopped => write!(f, "Stopped"),
            SchedulerState::Running => write!(f, "Running"),
            SchedulerState::ShuttingDown => write!(f, "ShuttingDown"),
        }
    }
}

/// Acknowledgement returned by `force_refresh`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshAck {
    /// The refresh was accepted for processing.
    Accepted,
    /// A computation is already in flight; the request was dropped.
    AlreadyComputing,
    /// The scheduler is not running; no refresh will happen.
    NotRunning,
}

/// The armed ticker: its shutdown signal and its join handle.
struct TickerTask {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

/// Periodic recompute scheduler with single-flight execution.
pub struct RefreshScheduler {
    engine: Arc<LeaderboardEngine>,
    state: AtomicU8,
    ticker: Mutex<Option<TickerTask>>,
}

impl RefreshScheduler {
    /// Create a scheduler over the given engine. Does not start it.
    pub fn new(engine: Arc<LeaderboardEngine>) -> Self {
        Self {
            engine,
            state: AtomicU8::new(STATE_STOPPED),
            ticker: Mutex::new(None),
        }
    }

    /// The current lifecycle state.
    pub fn state(&self) -> SchedulerState {
        match self.state.load(Ordering::SeqCst) {
            STATE_RUNNING => SchedulerState::Running,
            STATE_SHUTTING_DOWN => SchedulerState::ShuttingDown,
            _ => SchedulerState::Stopped,
        }
    }

    /// Start the scheduler: arm the periodic ticker, then run one
    /// computation immediately. A no-op if already running.
    ///
    /// The ticker handle is stored before the first awaited cycle, so a
    /// `stop` racing `start` always finds it and cannot orphan the task.
    pub async fn start(&self) {
        if self
            .state
            .compare_exchange(
                STATE_STOPPED,
                STATE_RUNNING,
                Ordering::SeqCst,
                Ordering::SeqCst,
            )
            .is_err()
        {
            tracing::debug!("scheduler already running; start is a no-op");
            return;
        }

        let interval_secs = self.engine.config().refresh_interval_secs;
        let (shutdown, mut shutdown_rx) = watch::channel(false);

        let engine = self.engine.clone();
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs));
            // The first tick of a tokio interval completes immediately;
            // consume it since the initial cycle runs in `start`.
            ticker.tick().await;
            loop {
                // The shutdown signal is only observed between cycles; an
                // in-flight computation always runs to completion.
                tokio::select! {
                    _ = ticker.tick() => {
                        if engine.run_cycle().await == CycleOutcome::Skipped {
                            tracing::warn!("tick skipped: computation already in flight");
                        }
                    }
                    _ = shutdown_rx.changed() => break,
                }
            }
        });

        {
            let mut ticker = self.ticker.lock().expect("ticker lock poisoned");
            *ticker = Some(TickerTask { shutdown, handle });
        }
        tracing::info!(interval_secs, "refresh scheduler started");

        // Immediate first computation. Skipped if a racing stop already
        // moved the scheduler out of Running.
        if self.state.load(Ordering::SeqCst) == STATE_RUNNING {
            self.engine.run_cycle().await;
        }
    }

    /// Request an immediate recompute without awaiting completion.
    ///
    /// Shares the engine's single-flight guard with the periodic ticker:
    /// if a computation is in flight, the request is dropped. The ack is
    /// best-effort — the guard itself is the authority, so a refresh that
    /// races a just-started computation still cannot overlap it.
    pub fn force_refresh(&self) -> RefreshAck {
        if self.state.load(Ordering::SeqCst) != STATE_RUNNING {
            return RefreshAck::NotRunning;
        }
        if self.engine.is_computing() {
            tracing::debug!("forced refresh dropped: computation in flight");
            return RefreshAck::AlreadyComputing;
        }

        let engine = self.engine.clone();
        tokio::spawn(async move {
            engine.run_cycle().await;
        });
        RefreshAck::Accepted
    }

    /// Stop the scheduler: signal the ticker to exit between cycles, then
    /// wait (up to 5 seconds) for it and for any in-flight computation to
    /// finish before declaring stopped. Idempotent; if the drain bound
    /// elapses, shutdown proceeds anyway. An in-flight computation is
    /// never cancelled — it runs to completion or failure.
    pub async fn stop(&self) {
        if self
            .state
            .compare_exchange(
                STATE_RUNNING,
                STATE_SHUTTING_DOWN,
                Ordering::SeqCst,
                Ordering::SeqCst,
            )
            .is_err()
        {
            // Already stopped or already shutting down.
            return;
        }

        let deadline = Instant::now() + DRAIN_TIMEOUT;

        let task = self.ticker.lock().expect("ticker lock poisoned").take();
        if let Some(task) = task {
            let _ = task.shutdown.send(true);
            // The ticker exits at the next select point, so this join also
            // drains a tick-triggered computation.
            if tokio::time::timeout_at(deadline, task.handle).await.is_err() {
                tracing::warn!("shutdown drain timed out waiting for the ticker");
            }
        }

        // Forced refreshes and the start-time cycle run outside the ticker
        // task; drain those with a bounded poll.
        while self.engine.is_computing() && Instant::now() < deadline {
            tokio::time::sleep(DRAIN_POLL).await;
        }
        if self.engine.is_computing() {
            tracing::warn!("shutdown drain timed out; proceeding anyway");
        }

        self.state.store(STATE_STOPPED, Ordering::SeqCst);
        tracing::info!("refresh scheduler stopped");
    }
}
