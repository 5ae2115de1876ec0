// sprawl_world/server/src/storage/mod.rs
pub mod codec;
pub mod directory;
pub mod memory;

use crate::core::error::WorldResult;
use crate::core::types::{ChunkCoord, WorldChunk};

pub use directory::DirectoryChunkStorage;
pub use memory::InMemoryChunkStorage;

/// Key-value persistence for generated chunks, keyed by chunk coordinate.
///
/// Implementations are called from generation worker threads and must be safe to share.
pub trait ChunkStorage: Send + Sync {
    /// `Ok(None)` means the chunk was never stored.
    fn load(&self, coord: ChunkCoord) -> WorldResult<Option<WorldChunk>>;

    /// Overwrites any earlier version of the same coordinate.
    fn store(&self, chunk: &WorldChunk) -> WorldResult<()>;

    fn stored_coords(&self) -> WorldResult<Vec<ChunkCoord>>;
}
