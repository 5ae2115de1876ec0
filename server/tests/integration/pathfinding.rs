// sprawl_world/server/tests/integration/pathfinding.rs

use sprawl_world_core::core::config::WorldConfig;
use sprawl_world_core::core::types::{ChunkCoord, DistrictType, Point, Tile, TileGrid, TileType, WorldChunk};
use sprawl_world_core::server::instance::WorldServer;
use sprawl_world_core::systems::pathfinding::{LoadedRegion, Pathfinder};

use std::sync::Arc;

fn chunk_with(coord: ChunkCoord, size: usize, walkable: impl Fn(i32, i32) -> bool) -> Arc<WorldChunk> {
    let origin = coord.origin(size);
    let tiles = TileGrid::from_fn(size, size, |x, y| {
        let (world_x, world_y) = (origin.x + x as i32, origin.y + y as i32);
        let open = walkable(world_x, world_y);
        Tile {
            world_x,
            world_y,
            tile_type: if open { TileType::Ground } else { TileType::Building },
            walkable: open,
            height: 0.0,
            district: DistrictType::Residential,
        }
    });
    Arc::new(WorldChunk {
        coord,
        district: DistrictType::Residential,
        tiles,
        buildings: Vec::new(),
        roads: Vec::new(),
        loot_spawns: Vec::new(),
        npcs: Vec::new(),
        seed: 0,
        generated_at: 0,
        last_accessed: 0,
    })
}

fn within_one(a: Point, b: Point) -> bool {
    (a.x - b.x).abs() <= 1 && (a.y - b.y).abs() <= 1
}

fn assert_valid_path(path: &[Point], start: Point, end: Point, region: &LoadedRegion) {
    assert_eq!(path.first(), Some(&start));
    assert!(within_one(*path.last().expect("non-empty"), end));
    for step in path.windows(2) {
        assert!(within_one(step[0], step[1]) && step[0] != step[1]);
        assert!(region.is_walkable(step[1]), "{:?} is blocked", step[1]);
    }
}

#[test]
fn test_open_region_finds_path() {
    let region = LoadedRegion::from_chunks(8, [chunk_with(ChunkCoord::new(0, 0), 8, |_, _| true)]);
    let (start, end) = (Point::new(0, 0), Point::new(5, 5));
    let path = Pathfinder::default().find_path(start, end, &region);
    assert!(!path.is_empty());
    assert_valid_path(&path, start, end, &region);
    // Diagonal steps straight down the diagonal.
    assert_eq!(path.len(), 5);
}

#[test]
fn test_blocked_region_has_no_path() {
    let region = LoadedRegion::from_chunks(8, [chunk_with(ChunkCoord::new(0, 0), 8, |_, _| false)]);
    assert!(Pathfinder::default().find_path(Point::new(0, 0), Point::new(5, 5), &region).is_empty());
}

#[test]
fn test_walled_off_goal_has_no_path() {
    // Ring of blocked tiles around (5,5) at Chebyshev distance 2.
    let chunk = chunk_with(ChunkCoord::new(0, 0), 8, |x, y| (x - 5).abs().max((y - 5).abs()) != 2);
    let region = LoadedRegion::from_chunks(8, [chunk]);
    assert!(Pathfinder::default().find_path(Point::new(0, 0), Point::new(5, 5), &region).is_empty());
}

#[test]
fn test_path_crosses_chunk_boundaries() {
    let chunks = [
        chunk_with(ChunkCoord::new(0, 0), 8, |_, _| true),
        chunk_with(ChunkCoord::new(1, 0), 8, |x, _| x != 10),
        chunk_with(ChunkCoord::new(1, 1), 8, |_, _| true),
        chunk_with(ChunkCoord::new(-1, 0), 8, |_, _| true),
    ];
    let region = LoadedRegion::from_chunks(8, chunks);
    let (start, end) = (Point::new(-6, 2), Point::new(14, 3));
    let path = Pathfinder::default().find_path(start, end, &region);
    assert_valid_path(&path, start, end, &region);
    // The wall at x=10 only opens through chunk (1,1).
    assert!(path.iter().any(|p| p.x == 10 && p.y >= 8));
}

#[test]
fn test_unloaded_chunks_block_the_search() {
    // Chunk (1,0) missing: nothing east of x=7 is reachable.
    let region = LoadedRegion::from_chunks(8, [chunk_with(ChunkCoord::new(0, 0), 8, |_, _| true)]);
    assert!(Pathfinder::default().find_path(Point::new(0, 0), Point::new(12, 2), &region).is_empty());
}

#[test]
fn test_server_paths_over_generated_chunks() {
    let config = WorldConfig { chunk_size: 32, ..WorldConfig::default() };
    let server = WorldServer::from_config(config).expect("server");
    let chunks = server.get_chunks_in_radius(16.0, 16.0, 8.0);
    assert_eq!(chunks.len(), 1);
    let chunk = &chunks[0];

    let walkable: Vec<Point> = chunk
        .tiles
        .iter()
        .filter(|t| t.walkable)
        .map(|t| Point::new(t.world_x, t.world_y))
        .collect();
    let start = walkable[0];
    let path = server.find_path(start, start, &chunks);
    assert_eq!(path, vec![start]);

    // The cached view agrees with the explicit chunk list.
    let end = *walkable.last().expect("walkable tile");
    assert_eq!(server.find_path(start, end, &chunks), server.find_path_loaded(start, end));
}
