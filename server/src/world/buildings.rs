// sprawl_world/server/src/world/buildings.rs
use crate::core::constants::*;
use crate::core::types::{Building, BuildingType, DistrictType, Point, Rect, Road, Size, TileGrid, TileType, Vec2};
use crate::world::footprint_index::FootprintIndex;
use crate::world::map_generator::ChunkContext;
use crate::world::rng::{IdAllocator, SeededRandom};
use tracing::{debug, trace};

/// Buildings per 1000 tiles.
fn building_density(district: DistrictType) -> f64 {
    match district {
        DistrictType::Corporate => 2.5,
        DistrictType::Residential => 3.0,
        DistrictType::Industrial => 1.5,
        DistrictType::Underground => 2.0,
        DistrictType::Wasteland => 0.5,
    }
}

fn building_table(district: DistrictType) -> &'static [BuildingType] {
    use BuildingType::*;
    match district {
        DistrictType::Corporate => &[CorporateTower, Office, Office, DataCenter, Shop],
        DistrictType::Residential => &[Apartment, Apartment, Shop, Clinic, Club],
        DistrictType::Industrial => &[Warehouse, Factory, PowerPlant, Office],
        DistrictType::Underground => &[Bunker, Club, Shop, DataCenter],
        DistrictType::Wasteland => &[Ruin, Shack, Warehouse],
    }
}

fn base_size(building_type: BuildingType) -> (i32, i32) {
    match building_type {
        BuildingType::CorporateTower => (16, 16),
        BuildingType::Office => (12, 10),
        BuildingType::DataCenter => (14, 12),
        BuildingType::Apartment => (10, 12),
        BuildingType::Shop => (6, 6),
        BuildingType::Clinic => (8, 8),
        BuildingType::Club => (10, 8),
        BuildingType::Warehouse => (14, 10),
        BuildingType::Factory => (16, 12),
        BuildingType::PowerPlant => (14, 14),
        BuildingType::Bunker => (10, 10),
        BuildingType::Ruin => (8, 6),
        BuildingType::Shack => (5, 5),
    }
}

fn hackable_chance(building_type: BuildingType) -> f64 {
    match building_type {
        BuildingType::CorporateTower | BuildingType::DataCenter => 0.9,
        BuildingType::Office | BuildingType::Bunker => 0.7,
        BuildingType::PowerPlant | BuildingType::Clinic => 0.6,
        BuildingType::Factory | BuildingType::Warehouse | BuildingType::Club => 0.4,
        BuildingType::Apartment | BuildingType::Shop => 0.3,
        BuildingType::Ruin | BuildingType::Shack => 0.1,
    }
}

fn base_security(building_type: BuildingType) -> i32 {
    match building_type {
        BuildingType::CorporateTower | BuildingType::DataCenter => 4,
        BuildingType::Bunker | BuildingType::PowerPlant => 3,
        BuildingType::Office | BuildingType::Clinic | BuildingType::Factory => 2,
        BuildingType::Warehouse | BuildingType::Club | BuildingType::Shop | BuildingType::Apartment => 2,
        BuildingType::Ruin | BuildingType::Shack => 1,
    }
}

pub(crate) fn district_security_modifier(district: DistrictType) -> i32 {
    match district {
        DistrictType::Corporate | DistrictType::Underground => 1,
        DistrictType::Industrial => 0,
        DistrictType::Residential | DistrictType::Wasteland => -1,
    }
}

pub(crate) fn clamp_security(level: i32) -> u8 {
    level.clamp(MIN_SECURITY_LEVEL as i32, MAX_SECURITY_LEVEL as i32) as u8
}

fn vary_dimension(base: i32, rng: &mut SeededRandom) -> i32 {
    let factor = 1.0 - BUILDING_SIZE_VARIATION + rng.next_f64() * 2.0 * BUILDING_SIZE_VARIATION;
    ((base as f64 * factor).round() as i32).max(MIN_BUILDING_DIMENSION)
}

/// A place to put a building beside a road.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BuildingSpot {
    /// Local tile on the setback line.
    pub anchor: Point,
    /// Unit step pointing away from the road along the dominant axis.
    pub away: Point,
}

impl BuildingSpot {
    /// Footprint whose near edge sits on the anchor and which grows away from the road.
    pub fn footprint(&self, width: i32, height: i32) -> Rect {
        let x = match self.away.x {
            1 => self.anchor.x,
            -1 => self.anchor.x - width + 1,
            _ => self.anchor.x - width / 2,
        };
        let y = match self.away.y {
            1 => self.anchor.y,
            -1 => self.anchor.y - height + 1,
            _ => self.anchor.y - height / 2,
        };
        Rect::new(x, y, width, height)
    }
}

fn away_step(dx: f32, dy: f32) -> Point {
    if dx.abs() >= dy.abs() {
        Point::new(if dx >= 0.0 { 1 } else { -1 }, 0)
    } else {
        Point::new(0, if dy >= 0.0 { 1 } else { -1 })
    }
}

/// Two spots per sampling step, one on each side of the road, set back from its edge.
/// Returned in local chunk coordinates; spots outside the chunk are dropped.
pub fn candidate_spots(roads: &[Road], ctx: &ChunkContext) -> Vec<BuildingSpot> {
    let mut spots = Vec::new();
    for road in roads {
        let offset = road.width / 2.0 + BUILDING_SETBACK;
        for segment in road.polyline.windows(2) {
            let (a, b) = (segment[0], segment[1]);
            let length = a.distance(b);
            if length < f32::EPSILON {
                continue;
            }
            let dir = Vec2::new((b.x - a.x) / length, (b.y - a.y) / length);
            let perp = Vec2::new(-dir.y, dir.x);
            let mut travelled = 0.0;
            while travelled <= length {
                let p = Vec2::new(a.x + dir.x * travelled, a.y + dir.y * travelled);
                for side in [1.0f32, -1.0] {
                    let world_x = (p.x + perp.x * offset * side).round() as i32;
                    let world_y = (p.y + perp.y * offset * side).round() as i32;
                    if let Some((lx, ly)) = ctx.to_local(world_x, world_y) {
                        spots.push(BuildingSpot {
                            anchor: Point::new(lx as i32, ly as i32),
                            away: away_step(perp.x * side, perp.y * side),
                        });
                    }
                }
                travelled += BUILDING_SPOT_INTERVAL;
            }
        }
    }
    spots
}

fn covers_road(grid: &TileGrid, local: &Rect) -> bool {
    (local.y..local.bottom()).any(|y| {
        (local.x..local.right()).any(|x| {
            x >= 0 && y >= 0 && grid.get(x as usize, y as usize).map_or(false, |t| t.tile_type == TileType::Road)
        })
    })
}

fn entrance_on_edge(rect: &Rect, rng: &mut SeededRandom) -> Point {
    match rng.range_i32(0, 3) {
        0 => Point::new(rect.x + rng.range_i32(1, rect.width - 2), rect.y),
        1 => Point::new(rect.x + rng.range_i32(1, rect.width - 2), rect.bottom() - 1),
        2 => Point::new(rect.x, rect.y + rng.range_i32(1, rect.height - 2)),
        _ => Point::new(rect.right() - 1, rect.y + rng.range_i32(1, rect.height - 2)),
    }
}

/// Rejection-samples buildings onto candidate spots along the roads.
///
/// `grid` must already carry the painted roads; footprints covering a road tile are rejected.
/// Every drawn spot leaves the pool whether or not the building fits, so the loop ends after at
/// most `spots.len()` attempts. Fewer buildings than the density target is a normal outcome.
pub fn place_buildings(
    ctx: &ChunkContext,
    roads: &[Road],
    grid: &TileGrid,
    rng: &mut SeededRandom,
    ids: &mut IdAllocator,
) -> Vec<Building> {
    let size = ctx.size();
    let mut spots = candidate_spots(roads, ctx);
    let total_spots = spots.len();
    let target = ((size * size) as f64 / 1000.0 * building_density(ctx.district)).floor() as usize;

    let mut index = FootprintIndex::new();
    let mut buildings = Vec::new();
    let mut rejected = 0usize;

    while buildings.len() < target && !spots.is_empty() {
        let spot = spots.remove(rng.range_usize(0, spots.len() - 1));

        let building_type = *rng.pick(building_table(ctx.district));
        let (base_w, base_h) = base_size(building_type);
        let width = vary_dimension(base_w, rng);
        let height = vary_dimension(base_h, rng);
        let rotation = rng.range_i32(0, 3) as u16 * 90;
        let (width, height) = if rotation % 180 == 90 { (height, width) } else { (width, height) };
        let hackable = rng.chance(hackable_chance(building_type));
        let security_level = clamp_security(
            base_security(building_type) + district_security_modifier(ctx.district) + rng.range_i32(-1, 1),
        );

        let local = spot.footprint(width, height);
        let entrance_count = rng.range_i32(1, 2);
        let mut entrances: Vec<Point> = Vec::with_capacity(entrance_count as usize);
        for _ in 0..entrance_count {
            let entrance = entrance_on_edge(&local, rng);
            if !entrances.contains(&entrance) {
                entrances.push(entrance);
            }
        }

        let in_bounds = local.x >= 0 && local.y >= 0 && local.right() <= size && local.bottom() <= size;
        if !in_bounds || index.collides(&local, BUILDING_BUFFER) || covers_road(grid, &local) {
            rejected += 1;
            trace!("[Chunk {}] Rejected {:?} footprint at {:?}", ctx.coord, building_type, local);
            continue;
        }

        let id = ids.next_id();
        index.insert(id, local);
        buildings.push(Building {
            id,
            building_type,
            position: ctx.origin.offset(local.x, local.y),
            size: Size::new(width, height),
            rotation,
            hackable,
            security_level,
            entrances: entrances.into_iter().map(|e| ctx.origin.offset(e.x, e.y)).collect(),
            interior: None,
        });
    }

    debug!(
        "[Chunk {}] Placed {}/{} buildings ({} candidate spots, {} rejected)",
        ctx.coord,
        buildings.len(),
        target,
        total_spots,
        rejected
    );
    buildings
}

/// Footprints become solid building tiles; entrance tiles stay walkable.
pub fn paint_buildings(buildings: &[Building], ctx: &ChunkContext, grid: &mut TileGrid) {
    for building in buildings {
        let footprint = building.footprint();
        for wy in footprint.y..footprint.bottom() {
            for wx in footprint.x..footprint.right() {
                if let Some((lx, ly)) = ctx.to_local(wx, wy) {
                    if let Some(tile) = grid.get_mut(lx, ly) {
                        tile.tile_type = TileType::Building;
                        tile.walkable = false;
                    }
                }
            }
        }
        for entrance in &building.entrances {
            if let Some((lx, ly)) = ctx.to_local(entrance.x, entrance.y) {
                if let Some(tile) = grid.get_mut(lx, ly) {
                    tile.walkable = true;
                }
            }
        }
    }
}
