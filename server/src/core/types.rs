// sprawl_world/server/src/core/types.rs
use crate::core::constants::MAX_WORLD_EXTENT;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

pub type EntityId = Uuid;

pub fn unix_time_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

// --- Coordinates ---

/// Integer chunk-grid coordinate. Identity key of a chunk.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkCoord {
    pub x: i32,
    pub y: i32,
}

impl ChunkCoord {
    pub fn new(x: i32, y: i32) -> Self { ChunkCoord { x, y } }

    /// Chunk containing the world tile `(world_x, world_y)`.
    #[inline]
    pub fn from_world(world_x: i32, world_y: i32, chunk_size: usize) -> Self {
        let size = chunk_size as i32;
        ChunkCoord { x: world_x.div_euclid(size), y: world_y.div_euclid(size) }
    }

    /// World coordinate of local tile (0, 0). Saturates for chunks [`Self::checked_origin`] rejects.
    #[inline]
    pub fn origin(&self, chunk_size: usize) -> Point {
        let size = chunk_size as i32;
        Point::new(self.x.saturating_mul(size), self.y.saturating_mul(size))
    }

    /// Like [`Self::origin`], but `None` unless every tile of the chunk lies within
    /// `±MAX_WORLD_EXTENT`.
    pub fn checked_origin(&self, chunk_size: usize) -> Option<Point> {
        let size = chunk_size as i64;
        let extent = MAX_WORLD_EXTENT as i64;
        let x = self.x as i64 * size;
        let y = self.y as i64 * size;
        let fits = |start: i64| start >= -extent && start + size <= extent;
        if size == 0 || !fits(x) || !fits(y) {
            return None;
        }
        Some(Point::new(x as i32, y as i32))
    }
}

impl fmt::Display for ChunkCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self { Point { x, y } }

    pub fn manhattan(&self, other: Point) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    pub fn offset(&self, dx: i32, dy: i32) -> Point {
        Point::new(self.x + dx, self.y + dy)
    }
}

#[derive(Clone, Debug, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub fn new(x: f32, y: f32) -> Self { Vec2 { x, y } }
    pub fn zero() -> Self { Vec2 { x: 0.0, y: 0.0 } }

    pub fn distance(&self, other: Vec2) -> f32 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub fn new(width: i32, height: i32) -> Self { Size { width, height } }
    pub fn area(&self) -> i32 { self.width * self.height }
}

/// Axis-aligned tile rectangle covering `x..x+width` by `y..y+height`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self { Rect { x, y, width, height } }

    pub fn right(&self) -> i32 { self.x + self.width }
    pub fn bottom(&self) -> i32 { self.y + self.height }
    pub fn area(&self) -> i32 { self.width * self.height }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x as f32 + self.width as f32 / 2.0, self.y as f32 + self.height as f32 / 2.0)
    }

    pub fn expand(&self, by: i32) -> Rect {
        Rect::new(self.x - by, self.y - by, self.width + 2 * by, self.height + 2 * by)
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right() && other.x < self.right() && self.y < other.bottom() && other.y < self.bottom()
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.right() && p.y >= self.y && p.y < self.bottom()
    }
}

// --- Districts & tiles ---

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistrictType {
    Corporate,
    Residential,
    Industrial,
    Underground,
    Wasteland,
}

impl DistrictType {
    pub const ALL: [DistrictType; 5] = [
        DistrictType::Corporate,
        DistrictType::Residential,
        DistrictType::Industrial,
        DistrictType::Underground,
        DistrictType::Wasteland,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DistrictType::Corporate => "corporate",
            DistrictType::Residential => "residential",
            DistrictType::Industrial => "industrial",
            DistrictType::Underground => "underground",
            DistrictType::Wasteland => "wasteland",
        }
    }
}

impl fmt::Display for DistrictType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileType {
    Ground,
    Road,
    Building,
    Water,
    Debris,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    pub world_x: i32,
    pub world_y: i32,
    pub tile_type: TileType,
    pub walkable: bool,
    pub height: f32,
    pub district: DistrictType,
}

/// Dense row-major tile grid addressed by local coordinates.
/// `world = chunk * chunk_size + local` on both axes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TileGrid {
    width: usize,
    height: usize,
    tiles: Vec<Tile>,
}

impl TileGrid {
    pub fn from_fn(width: usize, height: usize, mut make: impl FnMut(usize, usize) -> Tile) -> Self {
        let mut tiles = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                tiles.push(make(x, y));
            }
        }
        TileGrid { width, height, tiles }
    }

    pub fn width(&self) -> usize { self.width }
    pub fn height(&self) -> usize { self.height }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<&Tile> {
        if x < self.width && y < self.height { self.tiles.get(y * self.width + x) } else { None }
    }

    #[inline]
    pub fn get_mut(&mut self, x: usize, y: usize) -> Option<&mut Tile> {
        if x < self.width && y < self.height { self.tiles.get_mut(y * self.width + x) } else { None }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter()
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Tile]> {
        self.tiles.chunks(self.width.max(1))
    }
}

// --- Roads ---

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoadType {
    Main,
    Secondary,
    Alley,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Road {
    pub id: EntityId,
    pub road_type: RoadType,
    /// World-space polyline.
    pub polyline: Vec<Vec2>,
    pub width: f32,
    pub connections: BTreeSet<EntityId>,
}

impl Road {
    pub fn endpoints(&self) -> Option<(Vec2, Vec2)> {
        match (self.polyline.first(), self.polyline.last()) {
            (Some(a), Some(b)) => Some((*a, *b)),
            _ => None,
        }
    }
}

// --- Buildings ---

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildingType {
    CorporateTower,
    Office,
    DataCenter,
    Apartment,
    Shop,
    Clinic,
    Club,
    Warehouse,
    Factory,
    PowerPlant,
    Bunker,
    Ruin,
    Shack,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Building {
    pub id: EntityId,
    pub building_type: BuildingType,
    /// World coordinate of the footprint's top-left tile.
    pub position: Point,
    /// Footprint size after rotation.
    pub size: Size,
    /// Degrees, a multiple of 90.
    pub rotation: u16,
    pub hackable: bool,
    pub security_level: u8,
    /// World coordinates of entrance tiles, all on the footprint edge.
    pub entrances: Vec<Point>,
    pub interior: Option<BuildingInterior>,
}

impl Building {
    pub fn footprint(&self) -> Rect {
        Rect::new(self.position.x, self.position.y, self.size.width, self.size.height)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildingInterior {
    pub rooms: Vec<Room>,
    pub corridors: Vec<Corridor>,
    pub hackable_objects: Vec<HackableObject>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomType {
    Lobby,
    Office,
    ServerRoom,
    Security,
    MeetingRoom,
    Vault,
    Storage,
    Maintenance,
    Lab,
    Living,
    Bar,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: EntityId,
    pub room_type: RoomType,
    /// Building-local bounds.
    pub bounds: Rect,
    pub connections: Vec<EntityId>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Corridor {
    pub id: EntityId,
    pub from_room: EntityId,
    pub to_room: EntityId,
    pub start: Point,
    pub end: Point,
    pub width: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HackableObjectType {
    Terminal,
    Camera,
    DoorLock,
    Safe,
    ServerRack,
    AlarmPanel,
}

/// Type-specific payload of a hackable object. Every variant carries an encryption level.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HackableData {
    Terminal {
        encryption_level: u8,
        access_level: u8,
        connected_systems: Vec<String>,
        has_admin_access: bool,
    },
    Camera {
        encryption_level: u8,
        recording_duration_secs: u32,
        has_motion_detection: bool,
    },
    DoorLock {
        encryption_level: u8,
        is_biometric: bool,
        auto_relock_secs: u32,
    },
    Safe {
        encryption_level: u8,
        credits: u32,
        has_time_lock: bool,
    },
    ServerRack {
        encryption_level: u8,
        data_value: u32,
        firewall_strength: u8,
    },
    AlarmPanel {
        encryption_level: u8,
        response_time_secs: u32,
        linked_cameras: u8,
    },
}

impl HackableData {
    pub fn encryption_level(&self) -> u8 {
        match self {
            HackableData::Terminal { encryption_level, .. }
            | HackableData::Camera { encryption_level, .. }
            | HackableData::DoorLock { encryption_level, .. }
            | HackableData::Safe { encryption_level, .. }
            | HackableData::ServerRack { encryption_level, .. }
            | HackableData::AlarmPanel { encryption_level, .. } => *encryption_level,
        }
    }

    pub fn object_type(&self) -> HackableObjectType {
        match self {
            HackableData::Terminal { .. } => HackableObjectType::Terminal,
            HackableData::Camera { .. } => HackableObjectType::Camera,
            HackableData::DoorLock { .. } => HackableObjectType::DoorLock,
            HackableData::Safe { .. } => HackableObjectType::Safe,
            HackableData::ServerRack { .. } => HackableObjectType::ServerRack,
            HackableData::AlarmPanel { .. } => HackableObjectType::AlarmPanel,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HackableObject {
    pub id: EntityId,
    pub object_type: HackableObjectType,
    pub room_id: EntityId,
    /// Building-local position on a room wall.
    pub position: Point,
    pub security_level: u8,
    pub data: HackableData,
}

// --- Population ---

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LootSpawn {
    pub id: EntityId,
    pub position: Point,
    pub loot_table_id: String,
    pub respawn_time_secs: u32,
    pub last_spawned: Option<u64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NpcType {
    Civilian,
    CorporateGuard,
    SecurityDrone,
    Merchant,
    GangMember,
    Netrunner,
    Worker,
    Scavenger,
    Mutant,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NpcBehavior {
    Idle,
    Wander,
    Patrol,
    Guard,
    Trade,
    Hostile,
}

impl NpcBehavior {
    pub fn has_patrol_route(&self) -> bool {
        matches!(self, NpcBehavior::Patrol | NpcBehavior::Guard)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Faction {
    Corporate,
    Civilian,
    Gang,
    Netrunners,
    Scavengers,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Npc {
    pub id: EntityId,
    pub npc_type: NpcType,
    pub position: Point,
    pub behavior: NpcBehavior,
    pub faction: Faction,
    pub health: u32,
    pub level: u8,
    pub patrol_route: Option<Vec<Point>>,
}

// --- Chunks ---

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldChunk {
    pub coord: ChunkCoord,
    pub district: DistrictType,
    pub tiles: TileGrid,
    pub buildings: Vec<Building>,
    pub roads: Vec<Road>,
    pub loot_spawns: Vec<LootSpawn>,
    pub npcs: Vec<Npc>,
    pub seed: u64,
    /// Unix milliseconds.
    pub generated_at: u64,
    /// Unix milliseconds at which this copy was materialized. Cache hits share the copy and leave
    /// it untouched; the live clock is `ChunkStore::last_accessed_millis`.
    pub last_accessed: u64,
}

impl WorldChunk {
    pub fn chunk_size(&self) -> usize {
        self.tiles.width()
    }

    pub fn tile_at_world(&self, world_x: i32, world_y: i32) -> Option<&Tile> {
        let origin = self.coord.origin(self.chunk_size());
        let local_x = world_x - origin.x;
        let local_y = world_y - origin.y;
        if local_x < 0 || local_y < 0 {
            return None;
        }
        self.tiles.get(local_x as usize, local_y as usize)
    }

    pub fn is_walkable_world(&self, world_x: i32, world_y: i32) -> bool {
        self.tile_at_world(world_x, world_y).map_or(false, |t| t.walkable)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldStats {
    pub total_chunks: usize,
    pub chunks_by_district: BTreeMap<DistrictType, usize>,
    pub cached_chunks: usize,
}
