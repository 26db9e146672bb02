// crates/pulserank-core/src/heartbeat.rs
//
// Heartbeat telemetry records for PulseRank.
//
// A heartbeat is a periodic telemetry record emitted by a node. Records are
// append-only and owned by the external time-series store; PulseRank only
// ever reads them. Optional metric groups are genuinely optional: a missing
// sample is "no data", never zero.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Network metrics reported in a heartbeat. Both fields are optional
/// samples; absent values are excluded from averaging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkMetrics {
    /// Measured throughput in the network's reference unit.
    pub throughput: Option<f64>,
    /// Measured round-trip latency in milliseconds.
    pub latency_ms: Option<f64>,
}

/// Resource utilization metrics reported in a heartbeat, each as a
/// percentage in [0, 100]. Absent values are excluded from averaging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceMetrics {
    /// CPU utilization percentage.
    pub cpu_pct: Option<f64>,
    /// Memory utilization percentage.
    pub memory_pct: Option<f64>,
    /// Storage utilization percentage.
    pub storage_pct: Option<f64>,
}

/// A single heartbeat telemetry record, as stored by the time-series store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeartbeatRecord {
    /// Identifier of the node that emitted this heartbeat.
    pub node_id: String,
    /// When the heartbeat was emitted.
    pub timestamp: DateTime<Utc>,
    /// Network metrics, if the node reported any.
    pub network: Option<NetworkMetrics>,
    /// Resource utilization metrics, if the node reported any.
    pub resources: Option<ResourceMetrics>,
    /// Continuous-uptime duration at emission time, in seconds.
    pub uptime_seconds: u64,
}

/// A heartbeat annotated by the window reader: the record plus its
/// enclosing hour bucket and a recency flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedHeartbeat {
    /// The underlying heartbeat record.
    pub record: HeartbeatRecord,
    /// The record's timestamp truncated to the enclosing hour.
    pub hour_bucket: DateTime<Utc>,
    /// Whether the record falls within the "recent" threshold of the window.
    pub recent: bool,
}
