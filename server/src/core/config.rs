// sprawl_world/server/src/core/config.rs
use crate::core::constants::*;
use crate::core::error::{WorldError, WorldResult};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationMilliSeconds};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

pub const CONFIG_PATH_ENV: &str = "SPRAWL_WORLD_CONFIG";

#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub max_cached_chunks: usize,
    /// Chunks untouched for longer than this are dropped by the next cleanup pass.
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(rename = "chunk_idle_timeout_ms")]
    pub chunk_idle_timeout: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            max_cached_chunks: DEFAULT_MAX_CACHED_CHUNKS,
            chunk_idle_timeout: DEFAULT_CHUNK_IDLE_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StorageConfig {
    Memory,
    Directory {
        path: PathBuf,
        #[serde(default = "default_compression_level")]
        compression_level: i32,
    },
}

fn default_compression_level() -> i32 {
    3
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig::Memory
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathfindingConfig {
    pub max_expanded_nodes: usize,
}

impl Default for PathfindingConfig {
    fn default() -> Self {
        PathfindingConfig { max_expanded_nodes: DEFAULT_MAX_EXPANDED_NODES }
    }
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub chunk_size: usize,
    pub cache: CacheConfig,
    pub storage: StorageConfig,
    pub pathfinding: PathfindingConfig,
    pub generation_threads: usize,
    /// World-space radius preloaded around the origin at startup. Zero disables preloading.
    pub preload_radius: f32,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(rename = "maintenance_interval_ms")]
    pub maintenance_interval: Duration,
    pub metrics_listen_addr: Option<String>,
}

impl Default for WorldConfig {
    fn default() -> Self {
        WorldConfig {
            chunk_size: DEFAULT_CHUNK_SIZE,
            cache: CacheConfig::default(),
            storage: StorageConfig::default(),
            pathfinding: PathfindingConfig::default(),
            generation_threads: DEFAULT_GENERATION_THREADS,
            preload_radius: 0.0,
            maintenance_interval: DEFAULT_MAINTENANCE_INTERVAL,
            metrics_listen_addr: None,
        }
    }
}

impl WorldConfig {
    pub fn from_yaml_str(raw: &str) -> WorldResult<Self> {
        let config: WorldConfig = serde_yaml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> WorldResult<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&raw)
    }

    /// Reads the file named by `SPRAWL_WORLD_CONFIG`, or returns the defaults when it is unset.
    pub fn load() -> WorldResult<Self> {
        match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => {
                info!("Loading world configuration from {}", path);
                Self::from_yaml_file(path)
            }
            Err(_) => {
                info!("{} not set, using default world configuration", CONFIG_PATH_ENV);
                let config = WorldConfig::default();
                config.validate()?;
                Ok(config)
            }
        }
    }

    pub fn validate(&self) -> WorldResult<()> {
        if self.chunk_size < MIN_CHUNK_SIZE {
            return Err(WorldError::Config(format!(
                "chunk_size must be at least {}, got {}",
                MIN_CHUNK_SIZE, self.chunk_size
            )));
        }
        if self.cache.max_cached_chunks == 0 {
            return Err(WorldError::Config("cache.max_cached_chunks must be positive".into()));
        }
        if self.cache.chunk_idle_timeout.is_zero() {
            return Err(WorldError::Config("cache.chunk_idle_timeout_ms must be positive".into()));
        }
        if self.maintenance_interval.is_zero() {
            return Err(WorldError::Config("maintenance_interval_ms must be positive".into()));
        }
        if self.generation_threads == 0 {
            return Err(WorldError::Config("generation_threads must be positive".into()));
        }
        if !self.preload_radius.is_finite() || self.preload_radius < 0.0 {
            return Err(WorldError::Config("preload_radius must be a non-negative finite number".into()));
        }
        Ok(())
    }
}
