// sprawl_world/server/src/storage/codec.rs
use crate::core::error::{WorldError, WorldResult};
use crate::core::types::WorldChunk;

pub const DEFAULT_COMPRESSION_LEVEL: i32 = 3;

/// Persisted form of a chunk: JSON compressed with zstd.
pub fn encode_chunk(chunk: &WorldChunk, compression_level: i32) -> WorldResult<Vec<u8>> {
    let json = serde_json::to_vec(chunk)?;
    zstd::stream::encode_all(json.as_slice(), compression_level).map_err(WorldError::Compression)
}

pub fn decode_chunk(bytes: &[u8]) -> WorldResult<WorldChunk> {
    let json = zstd::stream::decode_all(bytes).map_err(WorldError::Compression)?;
    Ok(serde_json::from_slice(&json)?)
}
