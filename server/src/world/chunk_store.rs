// sprawl_world/server/src/world/chunk_store.rs
use crate::core::config::CacheConfig;
use crate::core::types::{unix_time_millis, ChunkCoord, WorldChunk, WorldStats};
use crate::operational::monitoring::metrics::{
    CACHED_CHUNKS, CHUNKS_EVICTED_TOTAL, CHUNKS_LOADED_TOTAL, CHUNK_CACHE_HITS_TOTAL, CHUNK_CACHE_MISSES_TOTAL,
    CHUNK_STORAGE_ERRORS_TOTAL,
};
use crate::storage::ChunkStorage;
use crate::world::district::classify;
use crate::world::map_generator::MapGenerator;
use crate::world::partition::WorldPartition;
use dashmap::DashMap;
use metrics::{counter, gauge};
use parking_lot::Mutex;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, trace, warn};

struct CachedChunk {
    chunk: Arc<WorldChunk>,
    last_accessed: Instant,
    last_accessed_millis: u64,
}

/// Resident chunks in front of a [`ChunkStorage`], generating whatever storage does not have.
///
/// Concurrent misses on the same coordinate are serialized so a chunk is generated and
/// persisted at most once per residency.
pub struct ChunkStore {
    generator: MapGenerator,
    partition: WorldPartition,
    storage: Arc<dyn ChunkStorage>,
    cache: DashMap<ChunkCoord, CachedChunk>,
    in_flight: DashMap<ChunkCoord, Arc<Mutex<()>>>,
    max_cached_chunks: usize,
    idle_timeout: Duration,
    last_cleanup: Mutex<Instant>,
}

impl ChunkStore {
    pub fn new(chunk_size: usize, cache: &CacheConfig, storage: Arc<dyn ChunkStorage>) -> Self {
        info!(
            "ChunkStore: chunk_size={}, max_cached_chunks={}, idle_timeout={:?}",
            chunk_size, cache.max_cached_chunks, cache.chunk_idle_timeout
        );
        ChunkStore {
            generator: MapGenerator::new(chunk_size),
            partition: WorldPartition::new(chunk_size),
            storage,
            cache: DashMap::new(),
            in_flight: DashMap::new(),
            max_cached_chunks: cache.max_cached_chunks,
            idle_timeout: cache.chunk_idle_timeout,
            last_cleanup: Mutex::new(Instant::now()),
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.generator.chunk_size()
    }

    pub fn partition(&self) -> &WorldPartition {
        &self.partition
    }

    /// Cached, then persisted, then freshly generated. `None` when storage fails or the chunk lies
    /// outside the world.
    pub fn get(&self, coord: ChunkCoord) -> Option<Arc<WorldChunk>> {
        if coord.checked_origin(self.chunk_size()).is_none() {
            warn!("[Chunk {}] Outside the world, not materialized", coord);
            return None;
        }
        if let Some(chunk) = self.touch(coord) {
            counter!(CHUNK_CACHE_HITS_TOTAL).increment(1);
            trace!("[Chunk {}] Cache hit", coord);
            return Some(chunk);
        }

        let gate = self.in_flight.entry(coord).or_insert_with(|| Arc::new(Mutex::new(()))).clone();
        let result = {
            let _guard = gate.lock();
            match self.touch(coord) {
                // Another caller materialized it while we waited.
                Some(chunk) => {
                    counter!(CHUNK_CACHE_HITS_TOTAL).increment(1);
                    Some(chunk)
                }
                None => {
                    counter!(CHUNK_CACHE_MISSES_TOTAL).increment(1);
                    self.materialize(coord)
                }
            }
        };
        // The map and this call hold the only references unless someone else is waiting.
        self.in_flight.remove_if(&coord, |_, g| Arc::strong_count(g) <= 2);
        result
    }

    fn touch(&self, coord: ChunkCoord) -> Option<Arc<WorldChunk>> {
        self.cache.get_mut(&coord).map(|mut entry| {
            entry.last_accessed = Instant::now();
            entry.last_accessed_millis = unix_time_millis();
            entry.chunk.clone()
        })
    }

    fn materialize(&self, coord: ChunkCoord) -> Option<Arc<WorldChunk>> {
        let mut chunk = match self.storage.load(coord) {
            Ok(Some(chunk)) => {
                counter!(CHUNKS_LOADED_TOTAL).increment(1);
                debug!("[Chunk {}] Loaded from storage", coord);
                chunk
            }
            Ok(None) => {
                let chunk = match self.generator.generate_chunk(coord) {
                    Ok(chunk) => chunk,
                    Err(e) => {
                        warn!("[Chunk {}] Generation refused: {}", coord, e);
                        return None;
                    }
                };
                if let Err(e) = self.storage.store(&chunk) {
                    counter!(CHUNK_STORAGE_ERRORS_TOTAL, "op" => "store").increment(1);
                    error!("[Chunk {}] Failed to persist generated chunk: {}", coord, e);
                    return None;
                }
                chunk
            }
            Err(e) => {
                counter!(CHUNK_STORAGE_ERRORS_TOTAL, "op" => "load").increment(1);
                error!("[Chunk {}] Failed to load chunk: {}", coord, e);
                return None;
            }
        };
        let now = unix_time_millis();
        chunk.last_accessed = now;
        let chunk = Arc::new(chunk);
        self.insert(coord, chunk.clone(), now);
        Some(chunk)
    }

    fn insert(&self, coord: ChunkCoord, chunk: Arc<WorldChunk>, now_millis: u64) {
        if self.cache.len() >= self.max_cached_chunks {
            self.cleanup_idle();
        }
        self.cache.insert(
            coord,
            CachedChunk { chunk, last_accessed: Instant::now(), last_accessed_millis: now_millis },
        );
        gauge!(CACHED_CHUNKS).set(self.cache.len() as f64);
    }

    /// Drops the cached copy. Storage keeps its copy.
    pub fn unload(&self, coord: ChunkCoord) -> bool {
        let removed = self.cache.remove(&coord).is_some();
        if removed {
            debug!("[Chunk {}] Unloaded", coord);
            gauge!(CACHED_CHUNKS).set(self.cache.len() as f64);
        }
        removed
    }

    /// Chunks overlapping the disc, in row-major coordinate order. Chunks that fail to load are skipped.
    pub fn get_in_radius(&self, center_x: f32, center_y: f32, radius: f32) -> Vec<Arc<WorldChunk>> {
        self.partition
            .chunks_in_radius(center_x, center_y, radius)
            .into_iter()
            .filter_map(|coord| self.get(coord))
            .collect()
    }

    /// Evicts idle chunks, at most once per idle interval. Returns how many were removed.
    pub fn cleanup_idle(&self) -> usize {
        {
            let mut last = self.last_cleanup.lock();
            if last.elapsed() < self.idle_timeout {
                return 0;
            }
            *last = Instant::now();
        }
        self.evict_idle()
    }

    /// Evicts every chunk untouched for longer than the idle interval, ignoring the rate limit.
    pub fn evict_idle(&self) -> usize {
        let now = Instant::now();
        let timeout = self.idle_timeout;
        let mut evicted = 0usize;
        self.cache.retain(|coord, entry| {
            let keep = now.saturating_duration_since(entry.last_accessed) <= timeout;
            if !keep {
                evicted += 1;
                debug!("[Chunk {}] Evicted after {:?} idle", coord, now.saturating_duration_since(entry.last_accessed));
            }
            keep
        });
        if evicted > 0 {
            counter!(CHUNKS_EVICTED_TOTAL).increment(evicted as u64);
            info!("Evicted {} idle chunks, {} remain cached", evicted, self.cache.len());
        }
        gauge!(CACHED_CHUNKS).set(self.cache.len() as f64);
        evicted
    }

    pub fn cached_count(&self) -> usize {
        self.cache.len()
    }

    pub fn is_cached(&self, coord: ChunkCoord) -> bool {
        self.cache.contains_key(&coord)
    }

    pub fn last_accessed(&self, coord: ChunkCoord) -> Option<Instant> {
        self.cache.get(&coord).map(|entry| entry.last_accessed)
    }

    /// Unix milliseconds of the latest `get` that returned this chunk.
    pub fn last_accessed_millis(&self, coord: ChunkCoord) -> Option<u64> {
        self.cache.get(&coord).map(|entry| entry.last_accessed_millis)
    }

    /// Snapshot of the resident chunks, ordered by coordinate.
    pub fn cached_chunks(&self) -> Vec<Arc<WorldChunk>> {
        let mut chunks: Vec<Arc<WorldChunk>> = self.cache.iter().map(|entry| entry.chunk.clone()).collect();
        chunks.sort_by_key(|chunk| chunk.coord);
        chunks
    }

    /// Totals cover every chunk storage knows about plus anything cached. Districts come from the
    /// classifier, so no chunk is loaded to compute them.
    pub fn stats(&self) -> WorldStats {
        let mut coords: BTreeSet<ChunkCoord> = self.cache.iter().map(|entry| *entry.key()).collect();
        let cached_chunks = coords.len();
        match self.storage.stored_coords() {
            Ok(stored) => coords.extend(stored),
            Err(e) => {
                counter!(CHUNK_STORAGE_ERRORS_TOTAL, "op" => "list").increment(1);
                warn!("Could not list stored chunks, stats cover cached chunks only: {}", e);
            }
        }
        let mut chunks_by_district = BTreeMap::new();
        for coord in &coords {
            *chunks_by_district.entry(classify(*coord)).or_insert(0) += 1;
        }
        WorldStats { total_chunks: coords.len(), chunks_by_district, cached_chunks }
    }
}
