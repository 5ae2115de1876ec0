// sprawl_world/server/src/server/maintenance_loop.rs
use super::instance::WorldServer;
use crate::operational::monitoring::metrics::MetricsSystem;
use std::sync::atomic::Ordering as AtomicOrdering;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

impl WorldServer {
    /// Periodically evicts idle chunks until `shutdown` flips to true or its sender is dropped.
    pub async fn run_maintenance_loop(
        self: Arc<Self>,
        metrics: Option<Arc<MetricsSystem>>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        let period = self.config.maintenance_interval;
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!("Maintenance loop started. Interval: {:?}", period);

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                    continue;
                }
            }

            let pass_start = Instant::now();
            let store = Arc::clone(&self.chunk_store);
            let evicted = match tokio::task::spawn_blocking(move || store.evict_idle()).await {
                Ok(evicted) => evicted,
                Err(e) => {
                    warn!("Maintenance pass failed: {}", e);
                    continue;
                }
            };
            if let Some(metrics) = &metrics {
                metrics.record_uptime();
            }
            debug!(
                "Maintenance pass: evicted {}, {} cached, took {:?}",
                evicted,
                self.chunk_store.cached_count(),
                pass_start.elapsed()
            );
        }

        self.is_shutting_down.store(true, AtomicOrdering::SeqCst);
        info!("Maintenance loop stopped.");
    }
}
