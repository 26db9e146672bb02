// crates/pulserank-core/src/registry.rs
//
// Node registry entries for PulseRank.
//
// The registry is owned externally and joined by node identifier. It
// supplies the creation timestamp and grace-period flags that drive the
// new-node protection policy.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Number of days after registration during which a node is naturally
/// grace-eligible, independent of any manual flag.
pub const NATURAL_GRACE_DAYS: i64 = 7;

/// A node's registry entry, joined to telemetry by `node_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRegistryEntry {
    /// Identifier of the node.
    pub node_id: String,
    /// When the node was registered.
    pub registered_at: DateTime<Utc>,
    /// Manually-set grace-period flag.
    #[serde(default)]
    pub grace_period: bool,
    /// When the manual grace period ends. A set flag with no end timestamp
    /// is treated as an open-ended grace period.
    pub grace_period_end: Option<DateTime<Utc>>,
    /// Display name, if provided.
    pub name: Option<String>,
    /// Country code, if provided.
    pub country: Option<String>,
    /// Wallet identifier, if provided.
    pub wallet: Option<String>,
}

impl NodeRegistryEntry {
    /// Whether this node is grace-eligible at `now`.
    ///
    /// A node is grace-eligible if its manual grace period is still active
    /// (flag set and the end timestamp, when present, lies in the future),
    /// or if its natural age since registration is at most
    /// `NATURAL_GRACE_DAYS` days.
    pub fn grace_eligible(&self, now: DateTime<Utc>) -> bool {
        if self.grace_period {
            match self.grace_period_end {
                Some(end) if end > now => return true,
                None => return true,
                _ => {}
            }
        }
        now - self.registered_at <= Duration::days(NATURAL_GRACE_DAYS)
    }
}
