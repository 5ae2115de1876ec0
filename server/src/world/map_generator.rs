// sprawl_world/server/src/world/map_generator.rs
use crate::core::error::{WorldError, WorldResult};
use crate::core::types::{unix_time_millis, ChunkCoord, DistrictType, Point, WorldChunk};
use crate::operational::monitoring::metrics::{CHUNKS_GENERATED_TOTAL, CHUNK_GENERATION_SECONDS};
use crate::world::buildings::{paint_buildings, place_buildings};
use crate::world::district::classify;
use crate::world::interior::{generate_interior, is_interior_eligible};
use crate::world::population::{generate_loot_spawns, generate_npcs};
use crate::world::rng::{chunk_seed, IdAllocator, SeededRandom};
use crate::world::roads::{generate_roads, paint_roads};
use crate::world::tiles::build_tile_grid;
use metrics::{counter, histogram};
use std::time::Instant;
use tracing::debug;

/// Per-chunk facts shared by every generation stage.
#[derive(Clone, Copy, Debug)]
pub struct ChunkContext {
    pub coord: ChunkCoord,
    pub district: DistrictType,
    pub chunk_size: usize,
    pub origin: Point,
}

impl ChunkContext {
    pub fn new(coord: ChunkCoord, chunk_size: usize, district: DistrictType) -> Self {
        ChunkContext { coord, district, chunk_size, origin: coord.origin(chunk_size) }
    }

    #[inline]
    pub fn size(&self) -> i32 {
        self.chunk_size as i32
    }

    /// Local grid coordinate of a world tile, or `None` when the tile belongs to another chunk.
    #[inline]
    pub fn to_local(&self, world_x: i32, world_y: i32) -> Option<(usize, usize)> {
        if ChunkCoord::from_world(world_x, world_y, self.chunk_size) != self.coord {
            return None;
        }
        let size = self.size();
        Some((world_x.rem_euclid(size) as usize, world_y.rem_euclid(size) as usize))
    }
}

/// Runs the generation pipeline. Holds no state besides the chunk size and never touches storage.
#[derive(Clone, Debug)]
pub struct MapGenerator {
    chunk_size: usize,
}

impl MapGenerator {
    pub fn new(chunk_size: usize) -> Self {
        MapGenerator { chunk_size }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Tiles, roads, buildings, interiors, then loot and NPCs, all from one stream seeded by the coordinate.
    /// Fails only for chunks whose tiles would fall outside the world.
    pub fn generate_chunk(&self, coord: ChunkCoord) -> WorldResult<WorldChunk> {
        if coord.checked_origin(self.chunk_size).is_none() {
            return Err(WorldError::CoordinateOutOfRange(coord));
        }
        let started = Instant::now();
        let district = classify(coord);
        let seed = chunk_seed(coord);
        let ctx = ChunkContext::new(coord, self.chunk_size, district);
        let mut rng = SeededRandom::new(seed);
        let mut ids = IdAllocator::new(seed);

        let mut tiles = build_tile_grid(coord, self.chunk_size, district, &mut rng);

        let roads = generate_roads(&ctx, &mut rng, &mut ids);
        paint_roads(&roads, &ctx, &mut tiles);

        let mut buildings = place_buildings(&ctx, &roads, &tiles, &mut rng, &mut ids);
        paint_buildings(&buildings, &ctx, &mut tiles);

        for building in buildings.iter_mut() {
            if is_interior_eligible(building) {
                building.interior = generate_interior(building, district, &mut rng, &mut ids);
            }
        }

        let loot_spawns = generate_loot_spawns(&ctx, &mut rng, &mut ids);
        let npcs = generate_npcs(&ctx, &mut rng, &mut ids);

        let elapsed = started.elapsed();
        histogram!(CHUNK_GENERATION_SECONDS).record(elapsed.as_secs_f64());
        counter!(CHUNKS_GENERATED_TOTAL).increment(1);
        debug!(
            "[Chunk {}] Generated {} district: {} roads, {} buildings ({} with interiors), {} loot, {} npcs, {} draws in {:?}",
            coord,
            district,
            roads.len(),
            buildings.len(),
            buildings.iter().filter(|b| b.interior.is_some()).count(),
            loot_spawns.len(),
            npcs.len(),
            rng.draws(),
            elapsed
        );

        let now = unix_time_millis();
        Ok(WorldChunk {
            coord,
            district,
            tiles,
            buildings,
            roads,
            loot_spawns,
            npcs,
            seed,
            generated_at: now,
            last_accessed: now,
        })
    }
}
