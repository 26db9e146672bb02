// crates/pulserank-engine/src/rank.rs
//
// Tier assignment and dense ranking for PulseRank.
//
// Sort order (descending unless noted): composite score, then availability
// sub-score, then ascending hours-since-last-seen (most recent wins ties),
// then the aggregation insertion order as the stable last resort. Ranks are
// a dense permutation 1..N strictly following that order.

use pulserank_core::{MetricSummary, NodeScoreSnapshot, SubScores, Tier};

/// Rounded composite at or above this yields the top tier.
pub const PRIME_THRESHOLD: f64 = 75.0;
/// Rounded composite at or above this yields the second tier.
pub const STRONG_THRESHOLD: f64 = 55.0;
/// Rounded composite at or above this yields the third tier.
pub const STANDARD_THRESHOLD: f64 = 40.0;

/// A scored node awaiting tier assignment and ranking.
#[derive(Debug, Clone)]
pub struct ScoredNode {
    /// Identifier of the node.
    pub node_id: String,
    /// Display name from the registry, if any.
    pub name: Option<String>,
    /// Country code from the registry, if any.
    pub country: Option<String>,
    /// Wallet identifier from the registry, if any.
    pub wallet: Option<String>,
    /// Aggregated window metrics.
    pub metrics: MetricSummary,
    /// The computed sub-scores.
    pub sub_scores: SubScores,
    /// Final composite score (rounded, override applied).
    pub score: f64,
    /// Whether the node is grace-eligible this cycle.
    pub grace_eligible: bool,
    /// Aggregation insertion order, the stable last-resort tiebreak.
    pub order: usize,
}

/// Assign a tier from the rounded composite score.
///
/// Grace clamp: for a grace-eligible node the bottom two thresholds are
/// collapsed, so any score below the second-tier threshold still yields the
/// second tier. The bottom tier is unreachable under grace — inaccurate
/// early telemetry must not sink a protected node.
pub fn assign_tier(score: f64, grace_eligible: bool) -> Tier {
    if score >= PRIME_THRESHOLD {
        Tier::Prime
    } else if score >= STRONG_THRESHOLD || grace_eligible {
        Tier::Strong
    } else if score >= STANDARD_THRESHOLD {
        Tier::Standard
    } else {
        Tier::Probation
    }
}

/// Sort scored nodes and assign tiers and dense ranks.
///
/// Ties in all three sort keys receive distinct consecutive ranks in the
/// stable insertion order of the aggregation.
pub fn rank_nodes(mut scored: Vec<ScoredNode>) -> Vec<NodeScoreSnapshot> {
    scored.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then(b.sub_scores.availability.total_cmp(&a.sub_scores.availability))
            // Later last_seen means fewer hours since last seen.
            .then(b.metrics.last_seen.cmp(&a.metrics.last_seen))
            .then(a.order.cmp(&b.order))
    });

    scored
        .into_iter()
        .enumerate()
        .map(|(i, node)| NodeScoreSnapshot {
            node_id: node.node_id,
            name: node.name,
            country: node.country,
            wallet: node.wallet,
            metrics: node.metrics,
            sub_scores: node.sub_scores,
            score: node.score,
            tier: assign_tier(node.score, node.grace_eligible),
            rank: (i + 1) as u32,
            grace_eligible: node.grace_eligible,
        })
        .collect()
}
