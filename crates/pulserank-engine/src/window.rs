// crates/pulserank-engine/src/window.rs
//
// Trailing-window annotation of raw heartbeats.
//
// Buckets each heartbeat timestamp to its enclosing hour and tags records
// within the recent threshold. Nodes with zero records in the window never
// enter the cycle at all; registry entries without telemetry are therefore
// absent from the ranked list and from stats (a deliberate product decision
// to hide fully-inactive nodes).

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use pulserank_core::{AnnotatedHeartbeat, HeartbeatRecord};

/// Configuration of the trailing aggregation window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    /// Length of the trailing window in days (default: 7).
    #[serde(default = "default_window_days")]
    pub window_days: i64,

    /// Records newer than this many days are tagged "recent" (default: 2).
    #[serde(default = "default_recent_days")]
    pub recent_days: i64,
}

fn default_window_days() -> i64 {
    7
}

fn default_recent_days() -> i64 {
    2
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            window_days: default_window_days(),
            recent_days: default_recent_days(),
        }
    }
}

impl WindowConfig {
    /// The oldest timestamp included in the window: `now - window_days`.
    pub fn window_cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - Duration::days(self.window_days)
    }

    /// The recency threshold: records at or after this are tagged recent.
    pub fn recent_cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - Duration::days(self.recent_days)
    }

    /// Total number of hours covered by the window.
    pub fn window_hours(&self) -> f64 {
        (self.window_days * 24) as f64
    }
}

/// Annotate raw heartbeats with their hour bucket and recency flag.
///
/// Records older than the window cutoff are dropped; the telemetry source
/// is expected to pre-filter, but the window bound is enforced here too so
/// the downstream stages only ever see in-window records.
pub fn annotate_window(
    records: Vec<HeartbeatRecord>,
    config: &WindowConfig,
    now: DateTime<Utc>,
) -> Vec<AnnotatedHeartbeat> {
    let window_cutoff = config.window_cutoff(now);
    let recent_cutoff = config.recent_cutoff(now);

    records
        .into_iter()
        .filter(|r| r.timestamp >= window_cutoff)
        .map(|record| {
            let hour_bucket = truncate_to_hour(record.timestamp);
            let recent = record.timestamp >= recent_cutoff;
            AnnotatedHeartbeat {
                record,
                hour_bucket,
                recent,
            }
        })
        .collect()
}

/// Truncate a timestamp to the start of its enclosing UTC hour.
fn truncate_to_hour(ts: DateTime<Utc>) -> DateTime<Utc> {
    let secs = ts.timestamp();
    let floored = secs - secs.rem_euclid(3600);
    DateTime::<Utc>::from_timestamp(floored, 0).unwrap_or(ts)
}
