// sprawl_world/server/src/storage/memory.rs
use crate::core::error::WorldResult;
use crate::core::types::{ChunkCoord, WorldChunk};
use crate::storage::codec::{decode_chunk, encode_chunk, DEFAULT_COMPRESSION_LEVEL};
use crate::storage::ChunkStorage;
use dashmap::DashMap;

/// Keeps encoded chunks in process memory. Used when no directory is configured and in tests.
pub struct InMemoryChunkStorage {
    chunks: DashMap<ChunkCoord, Vec<u8>>,
    compression_level: i32,
}

impl InMemoryChunkStorage {
    pub fn new() -> Self {
        InMemoryChunkStorage { chunks: DashMap::new(), compression_level: DEFAULT_COMPRESSION_LEVEL }
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn remove(&self, coord: ChunkCoord) -> bool {
        self.chunks.remove(&coord).is_some()
    }
}

impl Default for InMemoryChunkStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl ChunkStorage for InMemoryChunkStorage {
    fn load(&self, coord: ChunkCoord) -> WorldResult<Option<WorldChunk>> {
        match self.chunks.get(&coord) {
            Some(bytes) => Ok(Some(decode_chunk(bytes.value())?)),
            None => Ok(None),
        }
    }

    fn store(&self, chunk: &WorldChunk) -> WorldResult<()> {
        let bytes = encode_chunk(chunk, self.compression_level)?;
        self.chunks.insert(chunk.coord, bytes);
        Ok(())
    }

    fn stored_coords(&self) -> WorldResult<Vec<ChunkCoord>> {
        let mut coords: Vec<ChunkCoord> = self.chunks.iter().map(|entry| *entry.key()).collect();
        coords.sort();
        Ok(coords)
    }
}
