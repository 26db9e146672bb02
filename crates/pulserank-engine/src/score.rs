// crates/pulserank-engine/src/score.rs
//
// Four-component weighted scoring for PulseRank.
//
// Converts a node's aggregated window metrics into four sub-scores
// (availability 0-45, network quality 0-30, resource headroom 0-10,
// consistency 0-15) and a composite in [0, 100], rounded to 2 decimals
// before tier assignment. A new-node override seeds grace-eligible nodes
// with too little telemetry at exactly 100.

use chrono::{DateTime, Utc};

use pulserank_core::{MetricSummary, SubScores};

use crate::window::WindowConfig;

/// Maximum availability sub-score.
pub const AVAILABILITY_MAX: f64 = 45.0;
/// Full-availability target in distinct hours per day (~22 h/day; 154
/// distinct hours over a 7-day window).
pub const AVAILABILITY_TARGET_HOURS_PER_DAY: f64 = 22.0;
/// Longest continuous-uptime sample below this yields zero availability.
pub const MIN_UPTIME_SECONDS: u64 = 1_800;

/// Maximum throughput portion of the network sub-score.
pub const THROUGHPUT_MAX: f64 = 20.0;
/// Throughput reference at which the throughput portion saturates.
pub const THROUGHPUT_REFERENCE: f64 = 400.0;
/// Maximum latency portion of the network sub-score.
pub const LATENCY_MAX: f64 = 10.0;
/// Latency reference at which the latency portion decays to zero.
pub const LATENCY_REFERENCE_MS: f64 = 200.0;

/// Maximum CPU portion of the resource sub-score.
pub const CPU_HEADROOM_MAX: f64 = 6.0;
/// Maximum memory portion of the resource sub-score.
pub const MEMORY_HEADROOM_MAX: f64 = 3.0;
/// Maximum storage portion of the resource sub-score.
pub const STORAGE_HEADROOM_MAX: f64 = 1.0;
/// Neutral utilization assumed when a resource metric is entirely absent.
pub const NEUTRAL_UTILIZATION_PCT: f64 = 50.0;

/// Maximum coverage portion of the consistency sub-score.
pub const COVERAGE_MAX: f64 = 12.0;
/// Fraction of the window's hours treated as full coverage.
pub const COVERAGE_TARGET_FRACTION: f64 = 0.8;
/// Maximum recency portion of the consistency sub-score.
pub const RECENCY_MAX: f64 = 3.0;
/// Hours since last seen beyond which the recency portion is zero.
pub const RECENCY_CUTOFF_HOURS: f64 = 72.0;

/// A grace-eligible node with at most this many heartbeats in the window
/// has its composite forced to exactly 100.
pub const GRACE_MAX_HEARTBEATS: u64 = 10;

/// Compute the four sub-scores for a node's aggregated metrics.
pub fn compute_sub_scores(
    metrics: &MetricSummary,
    window: &WindowConfig,
    now: DateTime<Utc>,
) -> SubScores {
    SubScores {
        availability: availability_score(metrics, window.window_days),
        network: network_score(metrics),
        resources: resource_score(metrics),
        consistency: consistency_score(metrics, window, now),
    }
}

/// Availability (0-45): distinct hours linearly scaled against the
/// full-availability target; zero if the longest continuous uptime sample
/// is under 30 minutes.
fn availability_score(metrics: &MetricSummary, window_days: i64) -> f64 {
    if metrics.max_uptime_seconds < MIN_UPTIME_SECONDS {
        return 0.0;
    }
    let target = AVAILABILITY_TARGET_HOURS_PER_DAY * window_days as f64;
    let coverage = (metrics.distinct_hours as f64 / target).clamp(0.0, 1.0);
    coverage * AVAILABILITY_MAX
}

/// Network quality (0-30): 20 points linear in average throughput capped
/// at the 400-unit reference, plus 10 points linear-decaying in average
/// latency against the 200 ms reference (0 ms = full 10, >= 200 ms = 0).
///
/// Absent throughput earns none of its 20 points; absent latency keeps the
/// full 10 (the latency portion is a decay from full, and no samples means
/// no observed penalty).
fn network_score(metrics: &MetricSummary) -> f64 {
    let throughput = metrics
        .avg_throughput
        .map(|t| (t / THROUGHPUT_REFERENCE).clamp(0.0, 1.0) * THROUGHPUT_MAX)
        .unwrap_or(0.0);
    let latency = metrics
        .avg_latency_ms
        .map(|l| (1.0 - l / LATENCY_REFERENCE_MS).clamp(0.0, 1.0) * LATENCY_MAX)
        .unwrap_or(LATENCY_MAX);
    throughput + latency
}

/// Resource headroom (0-10): 6 points from inverse CPU utilization, 3 from
/// inverse memory, 1 from inverse storage, each linear and clamped to its
/// maximum. Entirely-absent metrics fall back to the neutral 50% default.
fn resource_score(metrics: &MetricSummary) -> f64 {
    headroom(metrics.avg_cpu_pct, CPU_HEADROOM_MAX)
        + headroom(metrics.avg_memory_pct, MEMORY_HEADROOM_MAX)
        + headroom(metrics.avg_storage_pct, STORAGE_HEADROOM_MAX)
}

/// Linear inverse-utilization points for one resource metric.
fn headroom(avg_pct: Option<f64>, max_points: f64) -> f64 {
    let pct = avg_pct.unwrap_or(NEUTRAL_UTILIZATION_PCT);
    ((1.0 - pct / 100.0) * max_points).clamp(0.0, max_points)
}

/// Consistency (0-15): 12 points linear in distinct-hour coverage against
/// 80% of the window's hours, plus 3 points linear-decaying in hours since
/// last seen, zero beyond 72 hours.
fn consistency_score(metrics: &MetricSummary, window: &WindowConfig, now: DateTime<Utc>) -> f64 {
    let target_hours = window.window_hours() * COVERAGE_TARGET_FRACTION;
    let coverage = (metrics.distinct_hours as f64 / target_hours).clamp(0.0, 1.0) * COVERAGE_MAX;

    let hours_since_last_seen =
        (now - metrics.last_seen).num_seconds().max(0) as f64 / 3600.0;
    let recency =
        (1.0 - hours_since_last_seen / RECENCY_CUTOFF_HOURS).clamp(0.0, 1.0) * RECENCY_MAX;

    coverage + recency
}

/// The composite score: sum of the four sub-scores, rounded to 2 decimals.
pub fn composite(sub_scores: &SubScores) -> f64 {
    round2(
        sub_scores.availability + sub_scores.network + sub_scores.resources
            + sub_scores.consistency,
    )
}

/// The final composite after the new-node override: a grace-eligible node
/// with at most `GRACE_MAX_HEARTBEATS` heartbeats in the window scores
/// exactly 100 regardless of its computed sub-scores. This seeds brand-new
/// nodes at maximum reputation before enough data exists to judge them.
pub fn final_score(metrics: &MetricSummary, sub_scores: &SubScores, grace_eligible: bool) -> f64 {
    if grace_eligible && metrics.total_heartbeats <= GRACE_MAX_HEARTBEATS {
        return 100.0;
    }
    composite(sub_scores)
}

/// Round to 2 decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
