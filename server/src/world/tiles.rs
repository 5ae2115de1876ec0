// sprawl_world/server/src/world/tiles.rs
use crate::core::constants::TILE_HEIGHT_JITTER;
use crate::core::types::{ChunkCoord, DistrictType, Tile, TileGrid, TileType};
use crate::world::rng::SeededRandom;

fn baseline_height(district: DistrictType) -> f32 {
    match district {
        DistrictType::Corporate => 2.0,
        DistrictType::Residential => 1.0,
        DistrictType::Industrial => 0.5,
        DistrictType::Underground => -3.0,
        DistrictType::Wasteland => 0.0,
    }
}

/// Allocates the base grid: every tile walkable ground, height jittered around the district baseline.
/// Consumes one value per tile, row-major.
pub fn build_tile_grid(coord: ChunkCoord, chunk_size: usize, district: DistrictType, rng: &mut SeededRandom) -> TileGrid {
    let origin = coord.origin(chunk_size);
    let baseline = baseline_height(district);

    TileGrid::from_fn(chunk_size, chunk_size, |x, y| Tile {
        world_x: origin.x + x as i32,
        world_y: origin.y + y as i32,
        tile_type: TileType::Ground,
        walkable: true,
        height: baseline + (rng.next_f32() - 0.5) * TILE_HEIGHT_JITTER,
        district,
    })
}
