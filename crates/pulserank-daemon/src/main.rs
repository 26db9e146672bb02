// crates/pulserank-daemon/src/main.rs
//
// Binary entrypoint for the PulseRank daemon.
//
// Initializes tracing, parses CLI arguments, loads configuration,
// constructs the store handles and the leaderboard engine, starts the
// refresh scheduler, and drains gracefully on ctrl-c.

use std::sync::Arc;

use clap::Parser;

use pulserank_core::{
    HeartbeatRecord, NetworkMetrics, NodeRegistry, NodeRegistryEntry, ResourceMetrics,
    SnapshotStore, TelemetrySource,
};
use pulserank_daemon::{DaemonConfig, LeaderboardEngine, QueryFacade, RefreshScheduler};
use pulserank_store::{MemoryRegistry, MemorySnapshotStore, MemoryTelemetryStore, RocksSnapshotStore};

/// PulseRank daemon — computes and serves the node reputation leaderboard.
#[derive(Parser, Debug)]
#[command(
    name = "pulserank-daemon",
    version = "0.1.0",
    about = "PulseRank node reputation leaderboard daemon"
)]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = "~/.pulserank/config.toml")]
    config: String,

    /// Override the configured data directory.
    #[arg(long)]
    data_dir: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing subscriber for structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    // Load configuration from TOML file, falling back to defaults if the
    // file is not found.
    let mut config = match DaemonConfig::load(&expand_tilde(&args.config)) {
        Ok(cfg) => {
            tracing::info!("Loaded configuration from {}", args.config);
            cfg
        }
        Err(e) => {
            tracing::warn!(
                "Could not load config from {}: {}. Using defaults.",
                args.config,
                e
            );
            DaemonConfig::default()
        }
    };

    // CLI --data-dir flag overrides the config file value.
    if let Some(data_dir) = args.data_dir {
        config.data_dir = data_dir;
    }

    tracing::info!("PulseRank Daemon v0.1.0");
    tracing::info!("Data directory: {}", config.data_dir);
    tracing::info!(
        "Window: {} days (recent threshold {} days)",
        config.engine.window.window_days,
        config.engine.window.recent_days
    );
    tracing::info!("Refresh interval: {}s", config.engine.refresh_interval_secs);

    // Open the RocksDB snapshot cache. If the store is unreachable the
    // daemon still starts and the facade serves the "not yet computed"
    // sentinel from an in-memory slot until an operator intervenes.
    let data_dir = expand_tilde(&config.data_dir);
    let cache_path = format!("{}/snapshot_rocksdb", data_dir);
    let cache: Arc<dyn SnapshotStore> = match RocksSnapshotStore::open(&cache_path) {
        Ok(store) => {
            tracing::info!("Snapshot cache initialized at {}", cache_path);
            Arc::new(store.with_warn_bytes(config.snapshot_warn_bytes))
        }
        Err(e) => {
            tracing::error!(
                "Failed to open snapshot cache at {}: {}. \
                 Falling back to an in-memory slot.",
                cache_path,
                e
            );
            Arc::new(MemorySnapshotStore::new())
        }
    };

    // Telemetry and registry: in-memory stores, optionally seeded with
    // demo nodes. Production deployments swap in adapters over their
    // time-series and registry backends here.
    let telemetry = Arc::new(MemoryTelemetryStore::new());
    let registry = Arc::new(MemoryRegistry::new());
    if config.seed_demo_data {
        seed_demo_data(&telemetry, &registry)?;
        tracing::info!("Seeded demo telemetry and registry data");
    }

    let telemetry: Arc<dyn TelemetrySource> = telemetry;
    let registry: Arc<dyn NodeRegistry> = registry;

    let engine = Arc::new(LeaderboardEngine::new(
        telemetry,
        registry,
        cache.clone(),
        config.engine.clone(),
    ));
    let scheduler = Arc::new(RefreshScheduler::new(engine));
    scheduler.start().await;

    let facade = QueryFacade::new(cache, scheduler.clone());
    let top = facade.get_top().await?;
    tracing::info!(
        total_nodes = top.total_nodes,
        "Initial leaderboard computed"
    );

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received");

    scheduler.stop().await;
    tracing::info!("PulseRank daemon shut down gracefully");

    Ok(())
}

/// Seed the in-memory stores with a handful of demo nodes so a fresh
/// daemon produces a non-empty leaderboard.
fn seed_demo_data(
    telemetry: &MemoryTelemetryStore,
    registry: &MemoryRegistry,
) -> Result<(), Box<dyn std::error::Error>> {
    let now = chrono::Utc::now();

    let nodes = [
        ("demo-alpha", 150_i64, 380.0, 12.0, 60),
        ("demo-bravo", 96, 220.0, 55.0, 30),
        ("demo-charlie", 40, 90.0, 140.0, 15),
    ];

    for (node_id, hours, throughput, latency, registered_days_ago) in nodes {
        registry.register(NodeRegistryEntry {
            node_id: node_id.to_string(),
            registered_at: now - chrono::Duration::days(registered_days_ago),
            grace_period: false,
            grace_period_end: None,
            name: Some(node_id.to_string()),
            country: None,
            wallet: None,
        })?;

        for h in 0..hours {
            telemetry.push(HeartbeatRecord {
                node_id: node_id.to_string(),
                timestamp: now - chrono::Duration::hours(h),
                network: Some(NetworkMetrics {
                    throughput: Some(throughput),
                    latency_ms: Some(latency),
                }),
                resources: Some(ResourceMetrics {
                    cpu_pct: Some(35.0),
                    memory_pct: Some(50.0),
                    storage_pct: Some(20.0),
                }),
                uptime_seconds: 3_600 * h.min(24) as u64,
            })?;
        }
    }

    // A brand-new node with a handful of heartbeats: exercises the
    // grace-period seeding at score 100.
    registry.register(NodeRegistryEntry {
        node_id: "demo-newcomer".to_string(),
        registered_at: now - chrono::Duration::days(1),
        grace_period: false,
        grace_period_end: None,
        name: Some("demo-newcomer".to_string()),
        country: None,
        wallet: None,
    })?;
    for h in 0..3 {
        telemetry.push(HeartbeatRecord {
            node_id: "demo-newcomer".to_string(),
            timestamp: now - chrono::Duration::hours(h),
            network: None,
            resources: None,
            uptime_seconds: 1_200,
        })?;
    }

    Ok(())
}

/// Expand `~` at the start of a path to the user's home directory.
fn expand_tilde(path: &str) -> String {
    if path.starts_with("~/") {
        if let Some(home) = dirs::home_dir() {
            return format!("{}{}", home.display(), &path[1..]);
        }
    }
    path.to_string()
}
