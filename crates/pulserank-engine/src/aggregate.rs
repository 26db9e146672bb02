// crates/pulserank-engine/src/aggregate.rs
//
// Per-node aggregation of annotated heartbeats.
//
// Folds the annotated window into one MetricSummary per node. Absent metric
// samples are excluded from their averages, never zero-filled; only the
// scoring stage substitutes a neutral default, and only for resource
// metrics. First-encounter order of node ids is preserved as the stable
// tiebreak of last resort for the ranker.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};

use pulserank_core::{AnnotatedHeartbeat, MetricSummary};

/// Cap applied to any single continuous-uptime sample: 24 hours.
pub const MAX_UPTIME_SECONDS: u64 = 86_400;

/// One node's aggregated window metrics, with its first-encounter index.
#[derive(Debug, Clone)]
pub struct NodeAggregate {
    /// Identifier of the node.
    pub node_id: String,
    /// First-encounter index in the heartbeat stream; the stable
    /// last-resort tiebreak for ranking.
    pub order: usize,
    /// The aggregated metrics.
    pub metrics: MetricSummary,
}

/// Running sum/count pair for averaging only the present samples.
#[derive(Debug, Default)]
struct SampleAvg {
    sum: f64,
    count: u64,
}

impl SampleAvg {
    fn push(&mut self, sample: Option<f64>) {
        if let Some(v) = sample {
            self.sum += v;
            self.count += 1;
        }
    }

    /// The average over present samples, or None if there were none.
    fn finish(&self) -> Option<f64> {
        if self.count == 0 {
            None
        } else {
            Some(self.sum / self.count as f64)
        }
    }
}

/// Accumulator for one node's heartbeats.
#[derive(Debug)]
struct NodeAccumulator {
    order: usize,
    hour_buckets: HashSet<i64>,
    total: u64,
    recent: u64,
    throughput: SampleAvg,
    latency: SampleAvg,
    cpu: SampleAvg,
    memory: SampleAvg,
    storage: SampleAvg,
    max_uptime: u64,
    first_seen: DateTime<Utc>,
    last_seen: DateTime<Utc>,
}

impl NodeAccumulator {
    fn new(order: usize, first_ts: DateTime<Utc>) -> Self {
        Self {
            order,
            hour_buckets: HashSet::new(),
            total: 0,
            recent: 0,
            throughput: SampleAvg::default(),
            latency: SampleAvg::default(),
            cpu: SampleAvg::default(),
            memory: SampleAvg::default(),
            storage: SampleAvg::default(),
            max_uptime: 0,
            first_seen: first_ts,
            last_seen: first_ts,
        }
    }

    fn push(&mut self, hb: &AnnotatedHeartbeat) {
        let record = &hb.record;

        self.hour_buckets.insert(hb.hour_bucket.timestamp());
        self.total += 1;
        if hb.recent {
            self.recent += 1;
        }

        if let Some(net) = &record.network {
            self.throughput.push(net.throughput);
            self.latency.push(net.latency_ms);
        }
        if let Some(res) = &record.resources {
            self.cpu.push(res.cpu_pct);
            self.memory.push(res.memory_pct);
            self.storage.push(res.storage_pct);
        }

        let uptime = record.uptime_seconds.min(MAX_UPTIME_SECONDS);
        self.max_uptime = self.max_uptime.max(uptime);

        if record.timestamp < self.first_seen {
            self.first_seen = record.timestamp;
        }
        if record.timestamp > self.last_seen {
            self.last_seen = record.timestamp;
        }
    }

    fn finish(self, node_id: String) -> NodeAggregate {
        NodeAggregate {
            node_id,
            order: self.order,
            metrics: MetricSummary {
                distinct_hours: self.hour_buckets.len() as u32,
                total_heartbeats: self.total,
                recent_heartbeats: self.recent,
                avg_throughput: self.throughput.finish(),
                avg_latency_ms: self.latency.finish(),
                avg_cpu_pct: self.cpu.finish(),
                avg_memory_pct: self.memory.finish(),
                avg_storage_pct: self.storage.finish(),
                max_uptime_seconds: self.max_uptime,
                first_seen: self.first_seen,
                last_seen: self.last_seen,
            },
        }
    }
}

/// Aggregate annotated heartbeats into one NodeAggregate per node, in
/// first-encounter order.
pub fn aggregate_by_node(annotated: &[AnnotatedHeartbeat]) -> Vec<NodeAggregate> {
    let mut accumulators: HashMap<String, NodeAccumulator> = HashMap::new();
    let mut order: Vec<String> = Vec::new();

    for hb in annotated {
        let node_id = &hb.record.node_id;
        if !accumulators.contains_key(node_id) {
            let acc = NodeAccumulator::new(order.len(), hb.record.timestamp);
            accumulators.insert(node_id.clone(), acc);
            order.push(node_id.clone());
        }
        if let Some(acc) = accumulators.get_mut(node_id) {
            acc.push(hb);
        }
    }

    order
        .into_iter()
        .filter_map(|node_id| {
            accumulators
                .remove(&node_id)
                .map(|acc| acc.finish(node_id))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use pulserank_core::{HeartbeatRecord, NetworkMetrics, ResourceMetrics};

    fn annotated(
        node_id: &str,
        timestamp: DateTime<Utc>,
        network: Option<NetworkMetrics>,
        resources: Option<ResourceMetrics>,
        uptime_seconds: u64,
        recent: bool,
    ) -> AnnotatedHeartbeat {
        let secs = timestamp.timestamp();
        let hour_bucket =
            DateTime::<Utc>::from_timestamp(secs - secs.rem_euclid(3600), 0).unwrap();
        AnnotatedHeartbeat {
            record: HeartbeatRecord {
                node_id: node_id.to_string(),
                timestamp,
                network,
                resources,
                uptime_seconds,
            },
            hour_bucket,
            recent,
        }
    }

    fn base_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, 12, 0, 0).unwrap()
    }

    #[test]
    fn counts_distinct_hours_not_heartbeats() {
        let t = base_time();
        let hbs = vec![
            annotated("a", t, None, None, 0, true),
            annotated("a", t + Duration::minutes(10), None, None, 0, true),
            annotated("a", t + Duration::hours(1), None, None, 0, true),
        ];
        let aggs = aggregate_by_node(&hbs);
        assert_eq!(aggs.len(), 1);
        assert_eq!(aggs[0].metrics.distinct_hours, 2);
        assert_eq!(aggs[0].metrics.total_heartbeats, 3);
    }

    #[test]
    fn absent_samples_are_excluded_from_averages() {
        let t = base_time();
        let hbs = vec![
            annotated(
                "a",
                t,
                Some(NetworkMetrics {
                    throughput: Some(100.0),
                    latency_ms: None,
                }),
                None,
                0,
                true,
            ),
            annotated(
                "a",
                t + Duration::minutes(5),
                Some(NetworkMetrics {
                    throughput: Some(300.0),
                    latency_ms: Some(40.0),
                }),
                None,
                0,
                true,
            ),
            annotated("a", t + Duration::minutes(10), None, None, 0, true),
        ];
        let aggs = aggregate_by_node(&hbs);
        let m = &aggs[0].metrics;
        // Average over the two present throughput samples only.
        assert_eq!(m.avg_throughput, Some(200.0));
        // Single present latency sample.
        assert_eq!(m.avg_latency_ms, Some(40.0));
        // No resource samples at all.
        assert!(m.avg_cpu_pct.is_none());
        assert!(m.avg_memory_pct.is_none());
        assert!(m.avg_storage_pct.is_none());
    }

    #[test]
    fn uptime_is_capped_at_24_hours() {
        let t = base_time();
        let hbs = vec![annotated("a", t, None, None, 90_000, true)];
        let aggs = aggregate_by_node(&hbs);
        assert_eq!(aggs[0].metrics.max_uptime_seconds, MAX_UPTIME_SECONDS);
    }

    #[test]
    fn tracks_first_and_last_seen() {
        let t = base_time();
        let hbs = vec![
            annotated("a", t + Duration::hours(2), None, None, 0, true),
            annotated("a", t, None, None, 0, true),
            annotated("a", t + Duration::hours(1), None, None, 0, true),
        ];
        let aggs = aggregate_by_node(&hbs);
        assert_eq!(aggs[0].metrics.first_seen, t);
        assert_eq!(aggs[0].metrics.last_seen, t + Duration::hours(2));
    }

    #[test]
    fn preserves_first_encounter_order() {
        let t = base_time();
        let hbs = vec![
            annotated("charlie", t, None, None, 0, true),
            annotated("alpha", t, None, None, 0, true),
            annotated("charlie", t + Duration::hours(1), None, None, 0, true),
            annotated("bravo", t, None, None, 0, true),
        ];
        let aggs = aggregate_by_node(&hbs);
        let ids: Vec<&str> = aggs.iter().map(|a| a.node_id.as_str()).collect();
        assert_eq!(ids, vec!["charlie", "alpha", "bravo"]);
        assert_eq!(aggs[0].order, 0);
        assert_eq!(aggs[1].order, 1);
        assert_eq!(aggs[2].order, 2);
    }

    #[test]
    fn counts_recent_heartbeats_separately() {
        let t = base_time();
        let hbs = vec![
            annotated("a", t, None, None, 0, false),
            annotated("a", t + Duration::hours(1), None, None, 0, true),
            annotated("a", t + Duration::hours(2), None, None, 0, true),
        ];
        let aggs = aggregate_by_node(&hbs);
        assert_eq!(aggs[0].metrics.total_heartbeats, 3);
        assert_eq!(aggs[0].metrics.recent_heartbeats, 2);
    }

    #[test]
    fn resource_averages_use_present_samples_only() {
        let t = base_time();
        let hbs = vec![
            annotated(
                "a",
                t,
                None,
                Some(ResourceMetrics {
                    cpu_pct: Some(20.0),
                    memory_pct: Some(60.0),
                    storage_pct: None,
                }),
                0,
                true,
            ),
            annotated(
                "a",
                t + Duration::minutes(5),
                None,
                Some(ResourceMetrics {
                    cpu_pct: Some(40.0),
                    memory_pct: None,
                    storage_pct: None,
                }),
                0,
                true,
            ),
        ];
        let aggs = aggregate_by_node(&hbs);
        let m = &aggs[0].metrics;
        assert_eq!(m.avg_cpu_pct, Some(30.0));
        assert_eq!(m.avg_memory_pct, Some(60.0));
        assert!(m.avg_storage_pct.is_none());
    }
}
