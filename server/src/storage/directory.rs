// sprawl_world/server/src/storage/directory.rs
use crate::core::error::{WorldError, WorldResult};
use crate::core::types::{ChunkCoord, WorldChunk};
use crate::storage::codec::{decode_chunk, encode_chunk};
use crate::storage::ChunkStorage;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const FILE_PREFIX: &str = "chunk_";
const FILE_SUFFIX: &str = ".json.zst";

/// One compressed file per chunk, named after its coordinate.
pub struct DirectoryChunkStorage {
    root: PathBuf,
    compression_level: i32,
}

impl DirectoryChunkStorage {
    pub fn open(root: impl Into<PathBuf>, compression_level: i32) -> WorldResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        if !(1..=22).contains(&compression_level) {
            return Err(WorldError::Config(format!(
                "compression_level must be between 1 and 22, got {}",
                compression_level
            )));
        }
        info!("Chunk storage directory: {}", root.display());
        Ok(DirectoryChunkStorage { root, compression_level })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn chunk_path(&self, coord: ChunkCoord) -> PathBuf {
        self.root.join(file_name(coord))
    }
}

fn file_name(coord: ChunkCoord) -> String {
    format!("{}{}_{}{}", FILE_PREFIX, coord.x, coord.y, FILE_SUFFIX)
}

fn parse_file_name(name: &str) -> Option<ChunkCoord> {
    let body = name.strip_prefix(FILE_PREFIX)?.strip_suffix(FILE_SUFFIX)?;
    let (x, y) = body.split_once('_')?;
    Some(ChunkCoord::new(x.parse().ok()?, y.parse().ok()?))
}

impl ChunkStorage for DirectoryChunkStorage {
    fn load(&self, coord: ChunkCoord) -> WorldResult<Option<WorldChunk>> {
        let bytes = match fs::read(self.chunk_path(coord)) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let chunk = decode_chunk(&bytes)?;
        if chunk.coord != coord {
            return Err(WorldError::Storage(format!(
                "file for chunk {} holds chunk {}",
                coord, chunk.coord
            )));
        }
        Ok(Some(chunk))
    }

    fn store(&self, chunk: &WorldChunk) -> WorldResult<()> {
        let bytes = encode_chunk(chunk, self.compression_level)?;
        let path = self.chunk_path(chunk.coord);
        // Readers never observe a half-written file.
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, &bytes)?;
        fs::rename(&tmp, &path)?;
        debug!("[Chunk {}] Stored {} bytes at {}", chunk.coord, bytes.len(), path.display());
        Ok(())
    }

    fn stored_coords(&self) -> WorldResult<Vec<ChunkCoord>> {
        let mut coords = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            let name = entry.file_name();
            match name.to_str().and_then(parse_file_name) {
                Some(coord) => coords.push(coord),
                None => {
                    if !name.to_string_lossy().ends_with(".tmp") {
                        warn!("Ignoring unexpected file in chunk storage: {:?}", name);
                    }
                }
            }
        }
        coords.sort();
        Ok(coords)
    }
}
