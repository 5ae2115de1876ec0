// sprawl_world/server/src/world/roads.rs
use crate::core::constants::*;
use crate::core::types::{DistrictType, Road, RoadType, TileGrid, TileType, Vec2};
use crate::world::map_generator::ChunkContext;
use crate::world::rng::{IdAllocator, SeededRandom};
use std::collections::BTreeSet;

fn secondary_road_range(district: DistrictType) -> (i32, i32) {
    match district {
        DistrictType::Corporate => (2, 4),
        DistrictType::Residential => (2, 3),
        DistrictType::Industrial => (1, 3),
        DistrictType::Underground => (1, 2),
        DistrictType::Wasteland => (1, 2),
    }
}

fn has_alleys(district: DistrictType) -> bool {
    matches!(district, DistrictType::Residential | DistrictType::Underground)
}

fn new_road(ids: &mut IdAllocator, road_type: RoadType, polyline: Vec<Vec2>) -> Road {
    let width = match road_type {
        RoadType::Main => MAIN_ROAD_WIDTH,
        RoadType::Secondary => SECONDARY_ROAD_WIDTH,
        RoadType::Alley => ALLEY_WIDTH,
    };
    Road { id: ids.next_id(), road_type, polyline, width, connections: BTreeSet::new() }
}

/// Main roads, then secondary roads, then alleys; endpoints closer than the connection
/// threshold are linked both ways.
pub fn generate_roads(ctx: &ChunkContext, rng: &mut SeededRandom, ids: &mut IdAllocator) -> Vec<Road> {
    let size = ctx.size();
    let origin = ctx.origin;
    let last = (size - 1) as f32;
    let margin = MAIN_ROAD_EDGE_MARGIN.min(size / 4);
    let mut roads = Vec::new();

    if rng.chance(MAIN_ROAD_CHANCE) {
        let x = (origin.x + rng.range_i32(margin, size - 1 - margin)) as f32;
        roads.push(new_road(
            ids,
            RoadType::Main,
            vec![Vec2::new(x, origin.y as f32), Vec2::new(x, origin.y as f32 + last)],
        ));
    }
    if rng.chance(MAIN_ROAD_CHANCE) {
        let y = (origin.y + rng.range_i32(margin, size - 1 - margin)) as f32;
        roads.push(new_road(
            ids,
            RoadType::Main,
            vec![Vec2::new(origin.x as f32, y), Vec2::new(origin.x as f32 + last, y)],
        ));
    }

    let (min_secondary, max_secondary) = secondary_road_range(ctx.district);
    let secondary_count = rng.range_i32(min_secondary, max_secondary);
    for _ in 0..secondary_count {
        let start = Vec2::new(
            (origin.x + rng.range_i32(0, size - 1)) as f32,
            (origin.y + rng.range_i32(0, size - 1)) as f32,
        );
        let end = Vec2::new(
            (origin.x + rng.range_i32(0, size - 1)) as f32,
            (origin.y + rng.range_i32(0, size - 1)) as f32,
        );
        roads.push(new_road(ids, RoadType::Secondary, vec![start, end]));
    }

    if has_alleys(ctx.district) {
        let alley_count = rng.range_i32(1, 3);
        for _ in 0..alley_count {
            let x = rng.range_i32(0, size - 1);
            let y = rng.range_i32(0, size - 1);
            let horizontal = rng.chance(0.5);
            let length = rng.range_i32(ALLEY_MIN_LENGTH, ALLEY_MAX_LENGTH);
            let (end_x, end_y) = if horizontal {
                ((x + length).min(size - 1), y)
            } else {
                (x, (y + length).min(size - 1))
            };
            roads.push(new_road(
                ids,
                RoadType::Alley,
                vec![
                    Vec2::new((origin.x + x) as f32, (origin.y + y) as f32),
                    Vec2::new((origin.x + end_x) as f32, (origin.y + end_y) as f32),
                ],
            ));
        }
    }

    connect_roads(&mut roads, ROAD_CONNECTION_THRESHOLD);
    roads
}

/// Links every pair of roads with an endpoint of one within `threshold` of an endpoint of the other.
pub fn connect_roads(roads: &mut [Road], threshold: f32) {
    let mut links = Vec::new();
    for i in 0..roads.len() {
        for j in (i + 1)..roads.len() {
            let (Some((a0, a1)), Some((b0, b1))) = (roads[i].endpoints(), roads[j].endpoints()) else {
                continue;
            };
            let close = [a0, a1]
                .iter()
                .any(|a| [b0, b1].iter().any(|b| a.distance(*b) <= threshold));
            if close {
                links.push((i, j));
            }
        }
    }
    for (i, j) in links {
        let (id_i, id_j) = (roads[i].id, roads[j].id);
        roads[i].connections.insert(id_j);
        roads[j].connections.insert(id_i);
    }
}

/// Marks every tile within `width / 2` of a sampled polyline point as walkable road.
/// Points outside this chunk are skipped.
pub fn paint_roads(roads: &[Road], ctx: &ChunkContext, grid: &mut TileGrid) {
    for road in roads {
        let radius = road.width / 2.0;
        for segment in road.polyline.windows(2) {
            let (a, b) = (segment[0], segment[1]);
            let steps = a.distance(b).ceil().max(1.0) as usize;
            for step in 0..=steps {
                let t = step as f32 / steps as f32;
                let p = Vec2::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t);
                paint_disc(p, radius, ctx, grid);
            }
        }
        if road.polyline.len() == 1 {
            paint_disc(road.polyline[0], radius, ctx, grid);
        }
    }
}

fn paint_disc(center: Vec2, radius: f32, ctx: &ChunkContext, grid: &mut TileGrid) {
    let reach = radius.ceil() as i32;
    let cx = center.x.round() as i32;
    let cy = center.y.round() as i32;
    for dy in -reach..=reach {
        for dx in -reach..=reach {
            if ((dx * dx + dy * dy) as f32) > radius * radius {
                continue;
            }
            if let Some((lx, ly)) = ctx.to_local(cx + dx, cy + dy) {
                if let Some(tile) = grid.get_mut(lx, ly) {
                    tile.tile_type = TileType::Road;
                    tile.walkable = true;
                }
            }
        }
    }
}
