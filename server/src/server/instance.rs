// sprawl_world/server/src/server/instance.rs
use crate::concurrent::thread_pools::GenerationPool;
use crate::core::config::{StorageConfig, WorldConfig};
use crate::core::error::WorldResult;
use crate::core::types::{ChunkCoord, Point, WorldChunk, WorldStats};
use crate::storage::{ChunkStorage, DirectoryChunkStorage, InMemoryChunkStorage};
use crate::systems::pathfinding::{LoadedRegion, Pathfinder};
use crate::world::chunk_store::ChunkStore;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

/// Builds the storage backend named by the configuration.
pub fn storage_from_config(config: &StorageConfig) -> WorldResult<Arc<dyn ChunkStorage>> {
    match config {
        StorageConfig::Memory => {
            info!("Using in-memory chunk storage; chunks are lost on restart.");
            Ok(Arc::new(InMemoryChunkStorage::new()))
        }
        StorageConfig::Directory { path, compression_level } => {
            Ok(Arc::new(DirectoryChunkStorage::open(path.clone(), *compression_level)?))
        }
    }
}

/// Entry point for collaborators: chunk access, area queries, pathfinding and stats.
pub struct WorldServer {
    pub config: Arc<WorldConfig>,
    pub chunk_store: Arc<ChunkStore>,
    pub pathfinder: Pathfinder,
    pub generation_pool: Arc<GenerationPool>,
    pub is_shutting_down: Arc<AtomicBool>,
}

impl WorldServer {
    pub fn new(config: Arc<WorldConfig>, storage: Arc<dyn ChunkStorage>) -> WorldResult<Self> {
        info!("Initializing WorldServer...");
        config.validate()?;

        let chunk_store = Arc::new(ChunkStore::new(config.chunk_size, &config.cache, storage));
        let generation_pool = Arc::new(GenerationPool::new(config.generation_threads)?);
        let pathfinder = Pathfinder::new(config.pathfinding.max_expanded_nodes);
        info!(
            "WorldServer ready: chunk_size={}, pathfinding budget={} nodes",
            config.chunk_size, config.pathfinding.max_expanded_nodes
        );

        Ok(WorldServer {
            config,
            chunk_store,
            pathfinder,
            generation_pool,
            is_shutting_down: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Builds the configured storage backend and the server on top of it.
    pub fn from_config(config: WorldConfig) -> WorldResult<Self> {
        let storage = storage_from_config(&config.storage)?;
        Self::new(Arc::new(config), storage)
    }

    pub fn get_chunk(&self, x: i32, y: i32) -> Option<Arc<WorldChunk>> {
        self.chunk_store.get(ChunkCoord::new(x, y))
    }

    pub fn get_chunks_in_radius(&self, center_x: f32, center_y: f32, radius: f32) -> Vec<Arc<WorldChunk>> {
        self.chunk_store.get_in_radius(center_x, center_y, radius)
    }

    pub fn unload_chunk(&self, x: i32, y: i32) {
        self.chunk_store.unload(ChunkCoord::new(x, y));
    }

    /// Searches only the given chunks; nothing is loaded or generated.
    pub fn find_path(&self, start: Point, end: Point, chunks: &[Arc<WorldChunk>]) -> Vec<Point> {
        let region = LoadedRegion::from_chunks(self.config.chunk_size, chunks.iter().cloned());
        self.pathfinder.find_path(start, end, &region)
    }

    /// Searches whatever is currently cached.
    pub fn find_path_loaded(&self, start: Point, end: Point) -> Vec<Point> {
        let region = LoadedRegion::from_chunks(self.config.chunk_size, self.chunk_store.cached_chunks());
        self.pathfinder.find_path(start, end, &region)
    }

    pub fn get_world_stats(&self) -> WorldStats {
        self.chunk_store.stats()
    }

    /// Materializes every chunk in the disc on the generation pool. Returns how many are resident.
    /// Does nothing once shutdown has begun.
    pub fn preload_area(&self, center_x: f32, center_y: f32, radius: f32) -> usize {
        if self.is_shutting_down.load(Ordering::SeqCst) {
            warn!("Shutdown in progress, skipping preload around ({}, {})", center_x, center_y);
            return 0;
        }
        let coords = self.chunk_store.partition().chunks_in_radius(center_x, center_y, radius);
        info!(
            "Preloading {} chunks around ({}, {}) radius {}",
            coords.len(),
            center_x,
            center_y,
            radius
        );
        self.generation_pool.materialize(&self.chunk_store, &coords).len()
    }
}
