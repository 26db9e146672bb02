use thiserror::Error;

/// System-wide error types for PulseRank.
#[derive(Debug, Error)]
pub enum PulseRankError {
    /// Telemetry source error (time-series read failed).
    #[error("Telemetry error: {0}")]
    Telemetry(String),

    /// Node registry error (registry lookup failed).
    #[error("Registry error: {0}")]
    Registry(String),

    /// Storage layer error (snapshot cache unreachable or write failed).
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Resource not found. Distinct from a system error: a lookup for an
    /// unknown node id is answered with this, not with `Storage`.
    #[error("Not found: {0}")]
    NotFound(String),
}

impl From<serde_json::Error> for PulseRankError {
    fn from(e: serde_json::Error) -> Self {
        PulseRankError::Serialization(e.to_string())
    }
}
