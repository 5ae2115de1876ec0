// sprawl_world/server/src/operational/monitoring/metrics.rs
use anyhow::{Context, Result};
use metrics::{describe_counter, describe_gauge, describe_histogram, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

pub const CHUNK_CACHE_HITS_TOTAL: &str = "world_chunk_cache_hits_total";
pub const CHUNK_CACHE_MISSES_TOTAL: &str = "world_chunk_cache_misses_total";
pub const CHUNKS_LOADED_TOTAL: &str = "world_chunks_loaded_total";
pub const CHUNKS_GENERATED_TOTAL: &str = "world_chunks_generated_total";
pub const CHUNKS_EVICTED_TOTAL: &str = "world_chunks_evicted_total";
pub const CHUNK_STORAGE_ERRORS_TOTAL: &str = "world_chunk_storage_errors_total";
pub const CACHED_CHUNKS: &str = "world_chunks_cached";
pub const CHUNK_GENERATION_SECONDS: &str = "world_chunk_generation_seconds";
pub const PATHFINDING_SECONDS: &str = "world_pathfinding_seconds";
pub const PATHFINDING_EXPANDED_NODES: &str = "world_pathfinding_expanded_nodes";
pub const PATHFINDING_FAILURES_TOTAL: &str = "world_pathfinding_failures_total";
pub const UPTIME_SECONDS: &str = "world_uptime_seconds";

pub struct MetricsSystem {
    start_time: Instant,
}

impl MetricsSystem {
    /// Installs the Prometheus exporter on `listen_addr` and registers metric descriptions.
    pub fn install(listen_addr: &str) -> Result<Self> {
        let addr: SocketAddr = listen_addr
            .parse()
            .with_context(|| format!("Invalid metrics listen address {}", listen_addr))?;
        PrometheusBuilder::new()
            .with_http_listener(addr)
            .install()
            .context("Failed to install Prometheus exporter")?;
        describe_all();
        Ok(MetricsSystem { start_time: Instant::now() })
    }

    pub fn record_uptime(&self) {
        gauge!(UPTIME_SECONDS).set(self.start_time.elapsed().as_secs_f64());
    }
}

fn describe_all() {
    describe_counter!(CHUNK_CACHE_HITS_TOTAL, "Chunk requests served from the in-memory cache");
    describe_counter!(CHUNK_CACHE_MISSES_TOTAL, "Chunk requests that went to storage or generation");
    describe_counter!(CHUNKS_LOADED_TOTAL, "Chunks read back from storage");
    describe_counter!(CHUNKS_GENERATED_TOTAL, "Chunks produced by the generation pipeline");
    describe_counter!(CHUNKS_EVICTED_TOTAL, "Chunks dropped from the cache after idling");
    describe_counter!(CHUNK_STORAGE_ERRORS_TOTAL, "Failed storage operations, labelled by op");
    describe_gauge!(CACHED_CHUNKS, "Chunks currently resident in memory");
    describe_gauge!(UPTIME_SECONDS, "Seconds since the metrics exporter was installed");
    describe_histogram!(CHUNK_GENERATION_SECONDS, "Time to generate one chunk in seconds");
    describe_histogram!(PATHFINDING_SECONDS, "Time to find a path in seconds");
    describe_histogram!(PATHFINDING_EXPANDED_NODES, "Nodes expanded per path search");
    describe_counter!(PATHFINDING_FAILURES_TOTAL, "Searches that returned no path, labelled by reason");
}

// Logging setup
pub fn init_logging() -> Result<()> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "sprawl_world_core=info,sprawl_world_server=info,warn".into()))
        .with(fmt::layer())
        .try_init()
        .context("Failed to initialize tracing subscriber")?;

    Ok(())
}
