// sprawl_world/server/src/main.rs
use sprawl_world_core::core::config::WorldConfig;
use sprawl_world_core::operational::monitoring::metrics::{init_logging, MetricsSystem};
use sprawl_world_core::server::instance::WorldServer;

use std::sync::atomic::Ordering;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = init_logging() {
        eprintln!("Failed to initialize logging: {:?}", e);
    }

    let config = WorldConfig::load()?;
    info!("Configuration loaded: {:?}", config);

    let metrics = match config.metrics_listen_addr.as_deref() {
        Some(addr) => match MetricsSystem::install(addr) {
            Ok(metrics) => {
                info!("Prometheus exporter listening on {}", addr);
                Some(Arc::new(metrics))
            }
            Err(e) => {
                warn!("Metrics disabled: {:?}", e);
                None
            }
        },
        None => None,
    };

    let server = Arc::new(WorldServer::from_config(config)?);

    let preload_radius = server.config.preload_radius;
    if preload_radius > 0.0 {
        let preload_server = Arc::clone(&server);
        let resident =
            tokio::task::spawn_blocking(move || preload_server.preload_area(0.0, 0.0, preload_radius)).await?;
        info!("Preloaded {} chunks around the origin", resident);
    }

    let stats = server.get_world_stats();
    info!(
        "World stats: {} chunks known, {} cached, by district {:?}",
        stats.total_chunks, stats.cached_chunks, stats.chunks_by_district
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let maintenance = tokio::spawn(Arc::clone(&server).run_maintenance_loop(metrics, shutdown_rx));

    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received."),
        Err(e) => error!("Failed to listen for shutdown signal: {}", e),
    }
    server.is_shutting_down.store(true, Ordering::SeqCst);
    let _ = shutdown_tx.send(true);
    if let Err(e) = maintenance.await {
        error!("Maintenance task ended abnormally: {}", e);
    }

    info!("World server stopped with {} chunks cached.", server.chunk_store.cached_count());
    Ok(())
}
