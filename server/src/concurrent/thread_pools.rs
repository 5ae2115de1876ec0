// sprawl_world/server/src/concurrent/thread_pools.rs
use crate::core::error::{WorldError, WorldResult};
use crate::core::types::{ChunkCoord, WorldChunk};
use crate::world::chunk_store::ChunkStore;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Worker threads for bulk chunk generation, kept apart from the async runtime.
pub struct GenerationPool {
    pool: Arc<ThreadPool>,
    threads: usize,
}

impl GenerationPool {
    pub fn new(threads: usize) -> WorldResult<Self> {
        let threads = if threads == 0 {
            warn!("Generation pool configured with 0 threads. Creating a minimal pool.");
            1
        } else {
            threads
        };
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("chunk-gen-{}", i))
            .build()
            .map_err(|e| WorldError::Internal(format!("Failed to build generation pool: {}", e)))?;
        info!("Generation pool started with {} threads", threads);
        Ok(GenerationPool { pool: Arc::new(pool), threads })
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Materializes every coordinate through the store in parallel and returns those that
    /// succeeded, in input order.
    pub fn materialize(&self, store: &ChunkStore, coords: &[ChunkCoord]) -> Vec<Arc<WorldChunk>> {
        let started = Instant::now();
        let chunks: Vec<Arc<WorldChunk>> =
            self.pool.install(|| coords.par_iter().filter_map(|coord| store.get(*coord)).collect());
        if chunks.len() < coords.len() {
            warn!("Materialized {} of {} requested chunks", chunks.len(), coords.len());
        }
        info!(
            "Materialized {} chunks in {:?} on {} threads",
            chunks.len(),
            started.elapsed(),
            self.threads
        );
        chunks
    }
}
