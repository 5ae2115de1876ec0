// sprawl_world/server/src/core/constants.rs
use std::time::Duration;

// Chunk constants
pub const DEFAULT_CHUNK_SIZE: usize = 64;
pub const MIN_CHUNK_SIZE: usize = 16;
// World tiles beyond this distance from the origin on either axis are never generated.
pub const MAX_WORLD_EXTENT: i32 = 1 << 30;

// Cache constants
pub const DEFAULT_MAX_CACHED_CHUNKS: usize = 100;
pub const DEFAULT_CHUNK_IDLE_TIMEOUT: Duration = Duration::from_secs(5 * 60);
pub const DEFAULT_MAINTENANCE_INTERVAL: Duration = Duration::from_secs(30);
pub const DEFAULT_GENERATION_THREADS: usize = 4;

// District rings (chunk-grid distance from origin)
pub const CORPORATE_RING_RADIUS: f64 = 3.0;
pub const RESIDENTIAL_RING_RADIUS: f64 = 8.0;
pub const MIXED_RING_RADIUS: f64 = 15.0;
pub const UNDERGROUND_RING_RADIUS: f64 = 25.0;

// Tile heights
pub const TILE_HEIGHT_JITTER: f32 = 0.5;

// Roads
pub const MAIN_ROAD_WIDTH: f32 = 6.0;
pub const SECONDARY_ROAD_WIDTH: f32 = 4.0;
pub const ALLEY_WIDTH: f32 = 2.0;
pub const MAIN_ROAD_CHANCE: f64 = 0.7;
pub const MAIN_ROAD_EDGE_MARGIN: i32 = 16;
pub const ROAD_CONNECTION_THRESHOLD: f32 = 10.0;
pub const ALLEY_MIN_LENGTH: i32 = 8;
pub const ALLEY_MAX_LENGTH: i32 = 16;

// Buildings
pub const BUILDING_SPOT_INTERVAL: f32 = 8.0;
pub const BUILDING_SETBACK: f32 = 6.0;
pub const BUILDING_SIZE_VARIATION: f64 = 0.15;
pub const MIN_BUILDING_DIMENSION: i32 = 3;
pub const BUILDING_BUFFER: i32 = 1;

// Interiors
pub const MIN_INTERIOR_DIMENSION: i32 = 8;
pub const MAX_ROOMS_PER_BUILDING: usize = 12;
pub const MIN_ROOMS_PER_BUILDING: usize = 2;
pub const TILES_PER_ROOM: i32 = 40;
pub const MAX_ROOM_PLACEMENT_ATTEMPTS: usize = 30;
pub const MIN_ROOM_DIMENSION: i32 = 3;
pub const MAX_ROOM_DIMENSION: i32 = 8;
pub const LOBBY_MIN_DIMENSION: i32 = 4;
pub const LOBBY_MAX_DIMENSION: i32 = 6;
pub const CORRIDOR_WIDTH: i32 = 2;
pub const MAX_OBJECTS_PER_ROOM: usize = 4;
pub const TILES_PER_OBJECT: i32 = 8;

// Security
pub const MIN_SECURITY_LEVEL: u8 = 1;
pub const MAX_SECURITY_LEVEL: u8 = 5;

// Population
pub const LOOT_RESPAWN_MIN_SECS: u32 = 300;
pub const LOOT_RESPAWN_MAX_SECS: u32 = 900;
pub const PATROL_RADIUS: i32 = 8;

// Pathfinding
pub const DEFAULT_MAX_EXPANDED_NODES: usize = 20_000;
pub const DIAGONAL_STEP_COST: f32 = std::f32::consts::SQRT_2;
