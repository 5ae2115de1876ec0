// sprawl_world/server/src/core/error.rs
use crate::core::types::ChunkCoord;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WorldError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Chunk codec error: {0}")]
    Codec(#[from] serde_json::Error),

    #[error("Chunk compression error: {0}")]
    Compression(std::io::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration parse error: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    #[error("Chunk {0} lies outside the world")]
    CoordinateOutOfRange(ChunkCoord),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type WorldResult<T> = Result<T, WorldError>;
