// sprawl_world/server/tests/integration/chunk_store.rs

use sprawl_world_core::core::config::{CacheConfig, StorageConfig, WorldConfig};
use sprawl_world_core::core::error::{WorldError, WorldResult};
use sprawl_world_core::core::types::{ChunkCoord, DistrictType, WorldChunk};
use sprawl_world_core::server::instance::WorldServer;
use sprawl_world_core::storage::{ChunkStorage, DirectoryChunkStorage, InMemoryChunkStorage};
use sprawl_world_core::world::chunk_store::ChunkStore;
use sprawl_world_core::world::map_generator::MapGenerator;

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

const CHUNK_SIZE: usize = 32;

/// Wraps a backend and counts calls; can be switched into a failing mode.
#[derive(Default)]
struct CountingStorage {
    inner: InMemoryChunkStorage,
    loads: AtomicUsize,
    stores: AtomicUsize,
    failing: AtomicBool,
}

impl CountingStorage {
    fn fail(&self, on: bool) {
        self.failing.store(on, Ordering::SeqCst);
    }

    fn check(&self) -> WorldResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            Err(WorldError::Storage("backend offline".into()))
        } else {
            Ok(())
        }
    }
}

impl ChunkStorage for CountingStorage {
    fn load(&self, coord: ChunkCoord) -> WorldResult<Option<WorldChunk>> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        self.inner.load(coord)
    }

    fn store(&self, chunk: &WorldChunk) -> WorldResult<()> {
        self.stores.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        self.inner.store(chunk)
    }

    fn stored_coords(&self) -> WorldResult<Vec<ChunkCoord>> {
        self.check()?;
        self.inner.stored_coords()
    }
}

fn cache_config(max_cached_chunks: usize, idle: Duration) -> CacheConfig {
    CacheConfig { max_cached_chunks, chunk_idle_timeout: idle }
}

fn store_with(storage: Arc<CountingStorage>, max_cached_chunks: usize, idle: Duration) -> ChunkStore {
    ChunkStore::new(CHUNK_SIZE, &cache_config(max_cached_chunks, idle), storage)
}

fn temp_dir(tag: &str) -> PathBuf {
    std::env::temp_dir().join(format!("sprawl_world_{}_{}", tag, uuid::Uuid::new_v4()))
}

#[test]
fn test_repeated_get_hits_cache() {
    let storage = Arc::new(CountingStorage::default());
    let store = store_with(storage.clone(), 100, Duration::from_secs(300));
    let coord = ChunkCoord::new(3, -2);

    let first = store.get(coord).expect("chunk");
    let second = store.get(coord).expect("chunk");
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(storage.loads.load(Ordering::SeqCst), 1);
    assert_eq!(storage.stores.load(Ordering::SeqCst), 1);
    assert_eq!(store.cached_count(), 1);
}

#[test]
fn test_get_refreshes_last_accessed() {
    let storage = Arc::new(CountingStorage::default());
    let store = store_with(storage, 100, Duration::from_secs(300));
    let coord = ChunkCoord::new(0, 0);
    let materialized = store.get(coord).expect("chunk");
    let before = store.last_accessed(coord).expect("cached");
    let first_millis = store.last_accessed_millis(coord).expect("cached");
    assert_eq!(first_millis, materialized.last_accessed);
    thread::sleep(Duration::from_millis(5));
    let hit = store.get(coord).expect("chunk");
    assert!(store.last_accessed(coord).expect("cached") > before);
    assert!(store.last_accessed_millis(coord).expect("cached") >= first_millis);
    // The shared copy keeps its materialization time.
    assert_eq!(hit.last_accessed, materialized.last_accessed);
}

#[test]
fn test_chunks_outside_the_world_are_absent() {
    let storage = Arc::new(CountingStorage::default());
    let store = store_with(storage.clone(), 100, Duration::from_secs(300));
    for coord in [ChunkCoord::new(40_000_000, 0), ChunkCoord::new(0, -40_000_000), ChunkCoord::new(i32::MIN, i32::MAX)] {
        assert!(store.get(coord).is_none());
        assert!(!store.is_cached(coord));
    }
    assert_eq!(storage.loads.load(Ordering::SeqCst), 0);
    assert_eq!(storage.stores.load(Ordering::SeqCst), 0);
    // A radius query far outside the world selects chunks but materializes none of them.
    assert!(store.get_in_radius(3.0e9, 0.0, 10.0).is_empty());
    assert_eq!(store.cached_count(), 0);
}

#[test]
fn test_unload_then_get_reads_storage() {
    let storage = Arc::new(CountingStorage::default());
    let store = store_with(storage.clone(), 100, Duration::from_secs(300));
    let coord = ChunkCoord::new(1, 1);

    let generated = store.get(coord).expect("chunk");
    assert!(store.unload(coord));
    assert!(!store.unload(coord));
    assert!(!store.is_cached(coord));

    let reloaded = store.get(coord).expect("chunk");
    assert!(!Arc::ptr_eq(&generated, &reloaded));
    assert_eq!(reloaded.tiles, generated.tiles);
    assert_eq!(reloaded.buildings, generated.buildings);
    assert_eq!(reloaded.generated_at, generated.generated_at);
    assert_eq!(storage.loads.load(Ordering::SeqCst), 2);
    // Loaded chunks are not written back.
    assert_eq!(storage.stores.load(Ordering::SeqCst), 1);
}

#[test]
fn test_cap_triggered_cleanup_evicts_idle_chunks() {
    let storage = Arc::new(CountingStorage::default());
    let store = store_with(storage.clone(), 2, Duration::from_millis(50));

    store.get(ChunkCoord::new(0, 0)).expect("chunk");
    store.get(ChunkCoord::new(0, 1)).expect("chunk");
    assert_eq!(store.cached_count(), 2);

    thread::sleep(Duration::from_millis(80));
    store.get(ChunkCoord::new(0, 2)).expect("chunk");
    assert_eq!(store.cached_count(), 1);
    assert!(store.is_cached(ChunkCoord::new(0, 2)));

    // Evicted chunks come back from storage, not from the generator.
    store.get(ChunkCoord::new(0, 0)).expect("chunk");
    assert_eq!(storage.stores.load(Ordering::SeqCst), 3);
}

#[test]
fn test_cleanup_is_rate_limited() {
    let storage = Arc::new(CountingStorage::default());
    let store = store_with(storage, 1, Duration::from_millis(200));

    // Nothing can be idle yet, and the first window has not elapsed.
    store.get(ChunkCoord::new(0, 0)).expect("chunk");
    store.get(ChunkCoord::new(0, 1)).expect("chunk");
    assert_eq!(store.cleanup_idle(), 0);
    // The cache may exceed its cap when nothing is idle.
    assert_eq!(store.cached_count(), 2);

    thread::sleep(Duration::from_millis(250));
    assert_eq!(store.cleanup_idle(), 2);
    store.get(ChunkCoord::new(0, 2)).expect("chunk");
    store.get(ChunkCoord::new(0, 3)).expect("chunk");
    // Still within the window opened by the previous pass.
    assert_eq!(store.cleanup_idle(), 0);
    assert_eq!(store.cached_count(), 2);
}

#[test]
fn test_evict_idle_ignores_rate_limit_but_not_idleness() {
    let storage = Arc::new(CountingStorage::default());
    let store = store_with(storage, 100, Duration::from_millis(40));
    store.get(ChunkCoord::new(5, 5)).expect("chunk");
    assert_eq!(store.evict_idle(), 0);
    thread::sleep(Duration::from_millis(60));
    store.get(ChunkCoord::new(5, 6)).expect("chunk");
    assert_eq!(store.evict_idle(), 1);
    assert!(store.is_cached(ChunkCoord::new(5, 6)));
}

#[test]
fn test_storage_failures_surface_as_absent() {
    let storage = Arc::new(CountingStorage::default());
    let store = store_with(storage.clone(), 100, Duration::from_secs(300));

    storage.fail(true);
    assert!(store.get(ChunkCoord::new(2, 2)).is_none());
    assert_eq!(store.cached_count(), 0);

    // Stats fall back to the cache when storage cannot be listed.
    let stats = store.stats();
    assert_eq!(stats.total_chunks, 0);

    storage.fail(false);
    assert!(store.get(ChunkCoord::new(2, 2)).is_some());
}

#[test]
fn test_failed_persist_is_not_cached() {
    struct StoreFails(InMemoryChunkStorage);
    impl ChunkStorage for StoreFails {
        fn load(&self, coord: ChunkCoord) -> WorldResult<Option<WorldChunk>> {
            self.0.load(coord)
        }
        fn store(&self, _chunk: &WorldChunk) -> WorldResult<()> {
            Err(WorldError::Storage("disk full".into()))
        }
        fn stored_coords(&self) -> WorldResult<Vec<ChunkCoord>> {
            self.0.stored_coords()
        }
    }

    let store = ChunkStore::new(
        CHUNK_SIZE,
        &cache_config(100, Duration::from_secs(300)),
        Arc::new(StoreFails(InMemoryChunkStorage::new())),
    );
    assert!(store.get(ChunkCoord::new(0, 0)).is_none());
    assert!(!store.is_cached(ChunkCoord::new(0, 0)));
}

#[test]
fn test_get_in_radius_returns_covering_chunks() {
    let storage = Arc::new(CountingStorage::default());
    let store = store_with(storage, 100, Duration::from_secs(300));

    let chunks = store.get_in_radius(16.0, 16.0, 20.0);
    let coords: Vec<ChunkCoord> = chunks.iter().map(|c| c.coord).collect();
    assert_eq!(
        coords,
        vec![ChunkCoord::new(0, -1), ChunkCoord::new(-1, 0), ChunkCoord::new(0, 0), ChunkCoord::new(1, 0), ChunkCoord::new(0, 1)]
    );
    assert_eq!(store.cached_count(), 5);

    // Overlapping query reuses cached chunks.
    let again = store.get_in_radius(16.0, 16.0, 1.0);
    assert_eq!(again.len(), 1);
    assert!(Arc::ptr_eq(&again[0], &chunks[2]));
}

#[test]
fn test_stats_count_stored_and_cached_chunks() {
    let storage = Arc::new(CountingStorage::default());
    let store = store_with(storage, 100, Duration::from_secs(300));

    store.get(ChunkCoord::new(0, 0)).expect("chunk");
    store.get(ChunkCoord::new(1, 0)).expect("chunk");
    store.get(ChunkCoord::new(30, 30)).expect("chunk");
    store.unload(ChunkCoord::new(30, 30));

    let stats = store.stats();
    assert_eq!(stats.total_chunks, 3);
    assert_eq!(stats.cached_chunks, 2);
    assert_eq!(stats.chunks_by_district.get(&DistrictType::Corporate), Some(&2));
    assert_eq!(stats.chunks_by_district.get(&DistrictType::Wasteland), Some(&1));
}

#[test]
fn test_concurrent_misses_generate_once() {
    let storage = Arc::new(CountingStorage::default());
    let store = Arc::new(store_with(storage.clone(), 100, Duration::from_secs(300)));
    let coord = ChunkCoord::new(7, 7);
    let barrier = Arc::new(Barrier::new(8));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let store = Arc::clone(&store);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                store.get(coord).expect("chunk")
            })
        })
        .collect();
    let chunks: Vec<Arc<WorldChunk>> = handles.into_iter().map(|h| h.join().expect("thread")).collect();

    assert_eq!(storage.stores.load(Ordering::SeqCst), 1);
    assert_eq!(storage.loads.load(Ordering::SeqCst), 1);
    assert!(chunks.iter().all(|c| Arc::ptr_eq(c, &chunks[0])));
}

#[test]
fn test_directory_storage_round_trip() {
    let dir = temp_dir("store");
    let storage = DirectoryChunkStorage::open(&dir, 3).expect("open");
    let chunk = MapGenerator::new(CHUNK_SIZE).generate_chunk(ChunkCoord::new(-3, 4)).expect("chunk");

    assert!(storage.load(chunk.coord).expect("load").is_none());
    storage.store(&chunk).expect("store");
    assert_eq!(storage.load(chunk.coord).expect("load"), Some(chunk.clone()));
    assert_eq!(storage.stored_coords().expect("list"), vec![chunk.coord]);

    // A second handle on the same directory sees the chunk.
    let reopened = DirectoryChunkStorage::open(&dir, 3).expect("open");
    assert_eq!(reopened.load(chunk.coord).expect("load").map(|c| c.seed), Some(chunk.seed));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_world_server_survives_restart_with_directory_storage() {
    let dir = temp_dir("server");
    let config = WorldConfig {
        chunk_size: CHUNK_SIZE,
        storage: StorageConfig::Directory { path: dir.clone(), compression_level: 3 },
        ..WorldConfig::default()
    };

    let first = WorldServer::from_config(config.clone()).expect("server");
    let original = first.get_chunk(2, 3).expect("chunk");
    assert_eq!(first.preload_area(0.0, 0.0, 40.0), first.chunk_store.partition().chunks_in_radius(0.0, 0.0, 40.0).len());
    drop(first);

    let second = WorldServer::from_config(config).expect("server");
    let restored = second.get_chunk(2, 3).expect("chunk");
    assert_eq!(restored.generated_at, original.generated_at);
    assert_eq!(restored.npcs, original.npcs);
    assert!(second.get_world_stats().total_chunks > 1);
    assert_eq!(second.get_world_stats().cached_chunks, 1);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_preload_is_skipped_during_shutdown() {
    let config = WorldConfig { chunk_size: CHUNK_SIZE, ..WorldConfig::default() };
    let server = WorldServer::from_config(config).expect("server");
    server.is_shutting_down.store(true, Ordering::SeqCst);
    assert_eq!(server.preload_area(0.0, 0.0, 64.0), 0);
    assert_eq!(server.chunk_store.cached_count(), 0);
    // Reads are still served while shutting down.
    assert!(server.get_chunk(0, 0).is_some());
}

#[tokio::test]
async fn test_maintenance_loop_evicts_and_stops() {
    let config = WorldConfig {
        chunk_size: CHUNK_SIZE,
        cache: cache_config(100, Duration::from_millis(30)),
        maintenance_interval: Duration::from_millis(20),
        ..WorldConfig::default()
    };
    let server = Arc::new(WorldServer::from_config(config).expect("server"));
    server.get_chunk(0, 0).expect("chunk");
    assert_eq!(server.chunk_store.cached_count(), 1);

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let handle = tokio::spawn(Arc::clone(&server).run_maintenance_loop(None, shutdown_rx));

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(server.chunk_store.cached_count(), 0);
    // Still in storage.
    assert_eq!(server.get_world_stats().total_chunks, 1);

    shutdown_tx.send(true).expect("loop is listening");
    handle.await.expect("loop task");
    assert!(server.is_shutting_down.load(Ordering::SeqCst));
}
