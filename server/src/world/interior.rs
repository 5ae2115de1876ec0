// sprawl_world/server/src/world/interior.rs
//! Room, corridor and hackable-object layout for large hackable buildings.
//!
//! Rooms are rejection-sampled onto a building-local occupancy grid. The first room is a lobby
//! centred on the first entrance. Rooms are joined by a greedy nearest-unconnected spanning
//! structure plus up to `rooms / 3` random extra edges, and each corridor leaves a room through
//! the side facing the other room.

use crate::core::constants::*;
use crate::core::types::{
    Building, BuildingInterior, Corridor, DistrictType, HackableData, HackableObject, HackableObjectType, Point,
    Rect, Room, RoomType,
};
use crate::world::buildings::{clamp_security, district_security_modifier};
use crate::world::rng::{IdAllocator, SeededRandom};
use tracing::trace;

const CONNECTED_SYSTEMS: [&str; 7] = [
    "door_control",
    "camera_feed",
    "alarm_grid",
    "elevator",
    "payroll",
    "mail_server",
    "turret_control",
];

pub fn is_interior_eligible(building: &Building) -> bool {
    building.hackable
        && building.size.width >= MIN_INTERIOR_DIMENSION
        && building.size.height >= MIN_INTERIOR_DIMENSION
}

/// An interior is valid when it has at least one room, every room has positive area,
/// and more than one room implies at least one corridor.
pub fn validate_interior(interior: &BuildingInterior) -> bool {
    !interior.rooms.is_empty()
        && interior.rooms.iter().all(|r| r.bounds.width > 0 && r.bounds.height > 0)
        && (interior.rooms.len() == 1 || !interior.corridors.is_empty())
}

/// Boolean grid used to test room placements before committing them.
pub struct OccupancyGrid {
    width: i32,
    height: i32,
    cells: Vec<bool>,
}

impl OccupancyGrid {
    pub fn new(width: i32, height: i32) -> Self {
        OccupancyGrid { width, height, cells: vec![false; (width.max(0) * height.max(0)) as usize] }
    }

    fn cell(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.width && y < self.height && self.cells[(y * self.width + x) as usize]
    }

    /// True if any occupied cell lies within `buffer` tiles of `rect`.
    pub fn collides(&self, rect: &Rect, buffer: i32) -> bool {
        let grown = rect.expand(buffer);
        (grown.y..grown.bottom()).any(|y| (grown.x..grown.right()).any(|x| self.cell(x, y)))
    }

    pub fn mark(&mut self, rect: &Rect) {
        for y in rect.y.max(0)..rect.bottom().min(self.height) {
            for x in rect.x.max(0)..rect.right().min(self.width) {
                self.cells[(y * self.width + x) as usize] = true;
            }
        }
    }
}

fn room_table(district: DistrictType) -> &'static [RoomType] {
    use RoomType::*;
    match district {
        DistrictType::Corporate => &[Office, Office, ServerRoom, Security, MeetingRoom, Vault],
        DistrictType::Residential => &[Living, Living, Storage, Maintenance, Office],
        DistrictType::Industrial => &[Storage, Maintenance, Lab, Security, Office],
        DistrictType::Underground => &[ServerRoom, Bar, Storage, Vault, Lab],
        DistrictType::Wasteland => &[Storage, Maintenance, Living],
    }
}

fn object_catalog(room_type: RoomType, district: DistrictType) -> Vec<HackableObjectType> {
    use HackableObjectType::*;
    let mut catalog: Vec<HackableObjectType> = match room_type {
        RoomType::Lobby => vec![Camera, Terminal, DoorLock],
        RoomType::Office | RoomType::MeetingRoom => vec![Terminal, Terminal, Safe, Camera],
        RoomType::ServerRoom => vec![ServerRack, ServerRack, Terminal, Camera],
        RoomType::Security => vec![Camera, AlarmPanel, Terminal, DoorLock],
        RoomType::Vault => vec![Safe, DoorLock, AlarmPanel],
        RoomType::Lab => vec![Terminal, ServerRack, Camera],
        RoomType::Storage | RoomType::Maintenance => vec![DoorLock, Terminal, AlarmPanel],
        RoomType::Living | RoomType::Bar => vec![Terminal, Camera, Safe],
    };
    match district {
        DistrictType::Corporate => catalog.push(Camera),
        DistrictType::Underground => catalog.push(ServerRack),
        DistrictType::Industrial => catalog.push(AlarmPanel),
        DistrictType::Residential | DistrictType::Wasteland => {}
    }
    catalog
}

fn base_object_security(object_type: HackableObjectType) -> i32 {
    match object_type {
        HackableObjectType::Camera => 1,
        HackableObjectType::Terminal | HackableObjectType::DoorLock => 2,
        HackableObjectType::Safe | HackableObjectType::AlarmPanel => 3,
        HackableObjectType::ServerRack => 4,
    }
}

fn object_payload(object_type: HackableObjectType, security_level: u8, rng: &mut SeededRandom) -> HackableData {
    let security = security_level as i32;
    let encryption_level = clamp_security(security + rng.range_i32(-1, 1));
    match object_type {
        HackableObjectType::Terminal => {
            let access_level = rng.range_i32(1, security) as u8;
            let system_count = rng.range_usize(1, 3);
            let mut connected_systems = Vec::with_capacity(system_count);
            for _ in 0..system_count {
                let system = rng.pick(&CONNECTED_SYSTEMS).to_string();
                if !connected_systems.contains(&system) {
                    connected_systems.push(system);
                }
            }
            HackableData::Terminal {
                encryption_level,
                access_level,
                connected_systems,
                has_admin_access: rng.chance(0.15 * security as f64),
            }
        }
        HackableObjectType::Camera => HackableData::Camera {
            encryption_level,
            recording_duration_secs: rng.range_i32(60, 600) as u32,
            has_motion_detection: rng.chance(0.5),
        },
        HackableObjectType::DoorLock => HackableData::DoorLock {
            encryption_level,
            is_biometric: rng.chance(0.15 * security as f64),
            auto_relock_secs: rng.range_i32(5, 30) as u32,
        },
        HackableObjectType::Safe => HackableData::Safe {
            encryption_level,
            credits: rng.range_i32(100, 1000) as u32 * security_level as u32,
            has_time_lock: rng.chance(0.3),
        },
        HackableObjectType::ServerRack => HackableData::ServerRack {
            encryption_level,
            data_value: rng.range_i32(500, 5000) as u32,
            firewall_strength: clamp_security(security + rng.range_i32(0, 1)),
        },
        HackableObjectType::AlarmPanel => HackableData::AlarmPanel {
            encryption_level,
            response_time_secs: rng.range_i32(30, 180) as u32,
            linked_cameras: rng.range_i32(1, 6) as u8,
        },
    }
}

/// Tiles touching a room wall, corners excluded. Fixed order: top, bottom, left, right.
pub fn wall_slots(bounds: &Rect) -> Vec<Point> {
    let mut slots = Vec::new();
    for i in 1..bounds.width - 1 {
        slots.push(Point::new(bounds.x + i, bounds.y));
        slots.push(Point::new(bounds.x + i, bounds.bottom() - 1));
    }
    for j in 1..bounds.height - 1 {
        slots.push(Point::new(bounds.x, bounds.y + j));
        slots.push(Point::new(bounds.right() - 1, bounds.y + j));
    }
    slots
}

/// The tile just outside `from` on the side facing `toward`'s centre.
fn door_point(from: &Rect, toward: &Rect) -> Point {
    let a = from.center();
    let b = toward.center();
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let mid_x = from.x + from.width / 2;
    let mid_y = from.y + from.height / 2;
    if dx.abs() >= dy.abs() {
        if dx >= 0.0 { Point::new(from.right(), mid_y) } else { Point::new(from.x - 1, mid_y) }
    } else if dy >= 0.0 {
        Point::new(mid_x, from.bottom())
    } else {
        Point::new(mid_x, from.y - 1)
    }
}

fn place_lobby(
    building: &Building,
    grid: &mut OccupancyGrid,
    rng: &mut SeededRandom,
    ids: &mut IdAllocator,
) -> Option<Room> {
    let (bw, bh) = (building.size.width, building.size.height);
    let entrance = building.entrances.first()?;
    let local = Point::new(entrance.x - building.position.x, entrance.y - building.position.y);

    let width = rng.range_i32(LOBBY_MIN_DIMENSION, LOBBY_MAX_DIMENSION).min(bw - 2);
    let height = rng.range_i32(LOBBY_MIN_DIMENSION, LOBBY_MAX_DIMENSION).min(bh - 2);
    let x = (local.x - width / 2).clamp(1, (bw - 1 - width).max(1));
    let y = (local.y - height / 2).clamp(1, (bh - 1 - height).max(1));
    let bounds = Rect::new(x, y, width, height);

    if grid.collides(&bounds, 1) {
        return None;
    }
    grid.mark(&bounds);
    Some(Room { id: ids.next_id(), room_type: RoomType::Lobby, bounds, connections: Vec::new() })
}

fn place_room(
    building: &Building,
    district: DistrictType,
    grid: &mut OccupancyGrid,
    rng: &mut SeededRandom,
    ids: &mut IdAllocator,
) -> Option<Room> {
    let (bw, bh) = (building.size.width, building.size.height);
    let max_w = MAX_ROOM_DIMENSION.min(bw - 2);
    let max_h = MAX_ROOM_DIMENSION.min(bh - 2);

    for _ in 0..MAX_ROOM_PLACEMENT_ATTEMPTS {
        let width = rng.range_i32(MIN_ROOM_DIMENSION, max_w);
        let height = rng.range_i32(MIN_ROOM_DIMENSION, max_h);
        let x = rng.range_i32(1, bw - 1 - width);
        let y = rng.range_i32(1, bh - 1 - height);
        let bounds = Rect::new(x, y, width, height);
        if grid.collides(&bounds, 1) {
            continue;
        }
        grid.mark(&bounds);
        let room_type = *rng.pick(room_table(district));
        return Some(Room { id: ids.next_id(), room_type, bounds, connections: Vec::new() });
    }
    None
}

/// Spanning edges (nearest unconnected room to any connected room) followed by extra random edges.
fn corridor_edges(rooms: &[Room], rng: &mut SeededRandom) -> Vec<(usize, usize)> {
    let n = rooms.len();
    let mut edges: Vec<(usize, usize)> = Vec::new();
    if n < 2 {
        return edges;
    }

    let centers: Vec<_> = rooms.iter().map(|r| r.bounds.center()).collect();
    let mut connected = vec![false; n];
    connected[0] = true;
    for _ in 1..n {
        let mut best: Option<(usize, usize, f32)> = None;
        for i in (0..n).filter(|&i| connected[i]) {
            for j in (0..n).filter(|&j| !connected[j]) {
                let d = centers[i].distance(centers[j]);
                if best.map_or(true, |(_, _, bd)| d < bd) {
                    best = Some((i, j, d));
                }
            }
        }
        if let Some((i, j, _)) = best {
            connected[j] = true;
            edges.push((i, j));
        }
    }

    let extra = rng.range_usize(0, n / 3);
    for _ in 0..extra {
        let a = rng.range_usize(0, n - 1);
        let b = rng.range_usize(0, n - 1);
        let duplicate = edges.iter().any(|&(i, j)| (i == a && j == b) || (i == b && j == a));
        if a != b && !duplicate {
            edges.push((a, b));
        }
    }
    edges
}

/// Builds the interior of an eligible building. Returns `None` when the layout does not validate.
pub fn generate_interior(
    building: &Building,
    district: DistrictType,
    rng: &mut SeededRandom,
    ids: &mut IdAllocator,
) -> Option<BuildingInterior> {
    let (bw, bh) = (building.size.width, building.size.height);
    let room_count = ((bw * bh / TILES_PER_ROOM) as usize).clamp(MIN_ROOMS_PER_BUILDING, MAX_ROOMS_PER_BUILDING);
    let mut grid = OccupancyGrid::new(bw, bh);
    let mut rooms = Vec::with_capacity(room_count);

    if let Some(lobby) = place_lobby(building, &mut grid, rng, ids) {
        rooms.push(lobby);
    }
    for _ in 1..room_count {
        if let Some(room) = place_room(building, district, &mut grid, rng, ids) {
            rooms.push(room);
        }
    }

    let mut corridors = Vec::new();
    for (a, b) in corridor_edges(&rooms, rng) {
        let (id_a, id_b) = (rooms[a].id, rooms[b].id);
        corridors.push(Corridor {
            id: ids.next_id(),
            from_room: id_a,
            to_room: id_b,
            start: door_point(&rooms[a].bounds, &rooms[b].bounds),
            end: door_point(&rooms[b].bounds, &rooms[a].bounds),
            width: CORRIDOR_WIDTH,
        });
        rooms[a].connections.push(id_b);
        rooms[b].connections.push(id_a);
    }

    let modifier = district_security_modifier(district);
    let mut hackable_objects = Vec::new();
    for room in &rooms {
        let max_objects = ((room.bounds.area() / TILES_PER_OBJECT) as usize).clamp(1, MAX_OBJECTS_PER_ROOM);
        let count = rng.range_usize(1, max_objects);
        let catalog = object_catalog(room.room_type, district);
        let mut slots = wall_slots(&room.bounds);
        for _ in 0..count {
            if slots.is_empty() {
                break;
            }
            let position = slots.remove(rng.range_usize(0, slots.len() - 1));
            let object_type = *rng.pick(&catalog);
            let security_level = clamp_security(base_object_security(object_type) + modifier + rng.range_i32(-1, 1));
            let data = object_payload(object_type, security_level, rng);
            hackable_objects.push(HackableObject {
                id: ids.next_id(),
                object_type,
                room_id: room.id,
                position,
                security_level,
                data,
            });
        }
    }

    trace!(
        "Interior for building {}: {} rooms (target {}), {} corridors, {} objects",
        building.id,
        rooms.len(),
        room_count,
        corridors.len(),
        hackable_objects.len()
    );

    let interior = BuildingInterior { rooms, corridors, hackable_objects };
    validate_interior(&interior).then_some(interior)
}
