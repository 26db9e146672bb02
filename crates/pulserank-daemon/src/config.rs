// crates/pulserank-daemon/src/config.rs
//
// Runtime configuration for the PulseRank daemon.
// Loaded from a TOML file or populated with sensible defaults.

use serde::Deserialize;
use std::fs;

use pulserank_engine::EngineConfig;

/// Runtime configuration for the daemon.
#[derive(Debug, Clone, Deserialize)]
pub struct DaemonConfig {
    /// Directory for local data storage (the RocksDB snapshot cache).
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Engine settings: window, refresh cadence, top-N size.
    #[serde(default)]
    pub engine: EngineConfig,

    /// Serialized-snapshot size above which a capacity warning is logged.
    #[serde(default = "default_snapshot_warn_bytes")]
    pub snapshot_warn_bytes: usize,

    /// Seed the in-memory telemetry and registry stores with demo nodes on
    /// startup. Useful until an external time-series adapter is wired in.
    #[serde(default)]
    pub seed_demo_data: bool,
}

fn default_data_dir() -> String {
    "~/.pulserank/data".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_snapshot_warn_bytes() -> usize {
    pulserank_store::rocks::DEFAULT_WARN_BYTES
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
            engine: EngineConfig::default(),
            snapshot_warn_bytes: default_snapshot_warn_bytes(),
            seed_demo_data: false,
        }
    }
}

impl DaemonConfig {
    /// Load configuration from a TOML file at the given path.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(path)?;
        let config: DaemonConfig = toml::from_str(&contents)?;
        Ok(config)
    }
}
