// sprawl_world/server/tests/integration/generation.rs

use sprawl_world_core::core::types::{BuildingInterior, ChunkCoord, DistrictType, Rect, TileType, WorldChunk};
use sprawl_world_core::world::district::classify;
use sprawl_world_core::world::interior::{is_interior_eligible, validate_interior};
use sprawl_world_core::world::map_generator::{ChunkContext, MapGenerator};
use sprawl_world_core::world::rng::{chunk_seed, SeededRandom};
use sprawl_world_core::world::roads::paint_roads;
use sprawl_world_core::world::tiles::build_tile_grid;

use proptest::prelude::*;
use std::collections::{HashMap, HashSet};

const CHUNK_SIZE: usize = 64;

fn sample_coords() -> Vec<ChunkCoord> {
    // Origin ring, every district ring, negative quadrants.
    vec![
        ChunkCoord::new(0, 0),
        ChunkCoord::new(1, -1),
        ChunkCoord::new(-4, 3),
        ChunkCoord::new(6, 2),
        ChunkCoord::new(-10, -1),
        ChunkCoord::new(1, -10),
        ChunkCoord::new(12, 9),
        ChunkCoord::new(18, 0),
        ChunkCoord::new(-17, -7),
        ChunkCoord::new(30, 30),
    ]
}

/// Every chunk of the 13x13 block around the origin: corporate core, residential belt and part of the mixed belt.
fn block_coords() -> Vec<ChunkCoord> {
    (-6..=6).flat_map(|y| (-6..=6).map(move |x| ChunkCoord::new(x, y))).collect()
}

fn generate(coord: ChunkCoord) -> WorldChunk {
    MapGenerator::new(CHUNK_SIZE).generate_chunk(coord).expect("chunk inside the world")
}

fn reachable_rooms(interior: &BuildingInterior) -> usize {
    let mut adjacency: HashMap<_, Vec<_>> = HashMap::new();
    for corridor in &interior.corridors {
        adjacency.entry(corridor.from_room).or_default().push(corridor.to_room);
        adjacency.entry(corridor.to_room).or_default().push(corridor.from_room);
    }
    let mut seen = HashSet::new();
    let mut stack = vec![interior.rooms[0].id];
    while let Some(room) = stack.pop() {
        if seen.insert(room) {
            stack.extend(adjacency.get(&room).into_iter().flatten().copied());
        }
    }
    seen.len()
}

#[test]
fn test_district_scenarios() {
    assert_eq!(classify(ChunkCoord::new(0, 0)), DistrictType::Corporate);
    assert_eq!(classify(ChunkCoord::new(30, 30)), DistrictType::Wasteland);
    for coord in sample_coords() {
        assert_eq!(classify(coord), classify(coord));
    }
}

#[test]
fn test_seed_scenarios() {
    let first = generate(ChunkCoord::new(10, 10));
    let second = generate(ChunkCoord::new(10, 10));
    assert_eq!(first.seed, second.seed);
    assert_eq!(first.district, second.district);
    assert_eq!(first.seed, chunk_seed(ChunkCoord::new(10, 10)));

    assert_ne!(chunk_seed(ChunkCoord::new(0, 0)), chunk_seed(ChunkCoord::new(1, 1)));
    assert_ne!(chunk_seed(ChunkCoord::new(1, 2)), chunk_seed(ChunkCoord::new(2, 1)));
}

#[test]
fn test_grid_shape_and_world_mapping() {
    for coord in sample_coords() {
        let chunk = generate(coord);
        assert_eq!(chunk.tiles.width(), CHUNK_SIZE);
        assert_eq!(chunk.tiles.height(), CHUNK_SIZE);
        assert_eq!(chunk.tiles.rows().count(), CHUNK_SIZE);
        let origin = coord.origin(CHUNK_SIZE);
        for (y, row) in chunk.tiles.rows().enumerate() {
            assert_eq!(row.len(), CHUNK_SIZE);
            for (x, tile) in row.iter().enumerate() {
                assert_eq!(tile.world_x, origin.x + x as i32);
                assert_eq!(tile.world_y, origin.y + y as i32);
                assert_eq!(tile.district, chunk.district);
                if matches!(tile.tile_type, TileType::Road | TileType::Ground) {
                    assert!(tile.walkable);
                }
            }
        }
    }
}

#[test]
fn test_underground_sits_below_ground() {
    let coord = ChunkCoord::new(18, 0);
    assert_eq!(classify(coord), DistrictType::Underground);
    let chunk = generate(coord);
    assert!(chunk.tiles.iter().all(|t| t.height < 0.0));
}

#[test]
fn test_buildings_do_not_overlap_and_stay_in_chunk() {
    for coord in sample_coords() {
        let chunk = generate(coord);
        let bounds = Rect::new(coord.origin(CHUNK_SIZE).x, coord.origin(CHUNK_SIZE).y, CHUNK_SIZE as i32, CHUNK_SIZE as i32);
        for (i, a) in chunk.buildings.iter().enumerate() {
            let fp = a.footprint();
            assert!(fp.x >= bounds.x && fp.y >= bounds.y && fp.right() <= bounds.right() && fp.bottom() <= bounds.bottom());
            assert!(!a.entrances.is_empty() && a.entrances.len() <= 2);
            for entrance in &a.entrances {
                assert!(fp.contains(*entrance));
                assert!(chunk.is_walkable_world(entrance.x, entrance.y), "entrance {:?} blocked", entrance);
            }
            let blocked = (fp.y..fp.bottom())
                .flat_map(|y| (fp.x..fp.right()).map(move |x| (x, y)))
                .filter(|&(x, y)| !chunk.is_walkable_world(x, y))
                .count();
            assert_eq!(blocked as i32, fp.area() - a.entrances.len() as i32);
            for b in chunk.buildings.iter().skip(i + 1) {
                assert!(!fp.expand(1).intersects(&b.footprint()), "{:?} crowds {:?}", a.id, b.id);
            }
        }
    }
}

#[test]
fn test_buildings_leave_roads_walkable() {
    for coord in block_coords() {
        let chunk = generate(coord);
        let ctx = ChunkContext::new(coord, CHUNK_SIZE, chunk.district);
        let mut roads_only = build_tile_grid(coord, CHUNK_SIZE, chunk.district, &mut SeededRandom::new(0));
        paint_roads(&chunk.roads, &ctx, &mut roads_only);

        let mut road_tiles = 0;
        for (painted, generated) in roads_only.iter().zip(chunk.tiles.iter()) {
            if painted.tile_type != TileType::Road {
                continue;
            }
            road_tiles += 1;
            assert_eq!(
                (generated.tile_type, generated.walkable),
                (TileType::Road, true),
                "chunk {} lost road tile ({}, {})",
                coord,
                generated.world_x,
                generated.world_y
            );
        }
        assert_eq!(road_tiles > 0, !chunk.roads.is_empty(), "chunk {}", coord);
    }
}

#[test]
fn test_road_connections_are_symmetric() {
    for coord in sample_coords() {
        let chunk = generate(coord);
        for road in &chunk.roads {
            assert!(road.polyline.len() >= 2);
            for other_id in &road.connections {
                let other = chunk.roads.iter().find(|r| r.id == *other_id).expect("connected road exists");
                assert!(other.connections.contains(&road.id));
            }
        }
    }
}

#[test]
fn test_interiors_are_connected_and_secure() {
    let mut interiors_seen = 0;
    for coord in sample_coords().into_iter().chain(block_coords()) {
        let chunk = generate(coord);
        for building in &chunk.buildings {
            let Some(interior) = &building.interior else { continue };
            interiors_seen += 1;
            assert!(is_interior_eligible(building));
            assert!(validate_interior(interior));
            assert_eq!(reachable_rooms(interior), interior.rooms.len());
            for room in &interior.rooms {
                let b = room.bounds;
                assert!(b.x >= 0 && b.y >= 0, "{:?}", b);
                assert!(b.right() <= building.size.width && b.bottom() <= building.size.height, "{:?}", b);
            }
            for object in &interior.hackable_objects {
                assert!((1..=5).contains(&object.security_level));
                assert!(interior.rooms.iter().any(|r| r.id == object.room_id));
            }
        }
        for building in &chunk.buildings {
            assert!((1..=5).contains(&building.security_level));
        }
    }
    assert!(interiors_seen > 0, "sample chunks produced no interiors");
}

#[test]
fn test_entity_ids_are_unique_within_chunk() {
    for coord in sample_coords() {
        let chunk = generate(coord);
        let mut ids = HashSet::new();
        for road in &chunk.roads {
            assert!(ids.insert(road.id));
        }
        for building in &chunk.buildings {
            assert!(ids.insert(building.id));
            if let Some(interior) = &building.interior {
                interior.rooms.iter().for_each(|r| assert!(ids.insert(r.id)));
                interior.corridors.iter().for_each(|c| assert!(ids.insert(c.id)));
                interior.hackable_objects.iter().for_each(|o| assert!(ids.insert(o.id)));
            }
        }
        chunk.loot_spawns.iter().for_each(|l| assert!(ids.insert(l.id)));
        chunk.npcs.iter().for_each(|n| assert!(ids.insert(n.id)));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn prop_generation_is_deterministic(x in -40i32..40, y in -40i32..40) {
        let coord = ChunkCoord::new(x, y);
        let a = MapGenerator::new(32).generate_chunk(coord).expect("chunk");
        let b = MapGenerator::new(32).generate_chunk(coord).expect("chunk");
        prop_assert_eq!(a.seed, b.seed);
        prop_assert_eq!(a.district, b.district);
        prop_assert_eq!(&a.tiles, &b.tiles);
        prop_assert_eq!(&a.roads, &b.roads);
        prop_assert_eq!(&a.buildings, &b.buildings);
        prop_assert_eq!(&a.loot_spawns, &b.loot_spawns);
        prop_assert_eq!(&a.npcs, &b.npcs);
    }

    #[test]
    fn prop_classify_is_total(x in any::<i32>(), y in any::<i32>()) {
        let coord = ChunkCoord::new(x, y);
        prop_assert_eq!(classify(coord), classify(coord));
    }
}
