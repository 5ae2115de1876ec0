// sprawl_world/server/src/world/partition.rs
use crate::core::types::{ChunkCoord, Point, Rect};

/// Maps world space onto the chunk grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WorldPartition {
    chunk_size: usize,
}

impl WorldPartition {
    pub fn new(chunk_size: usize) -> Self {
        WorldPartition { chunk_size }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_for_tile(&self, tile: Point) -> ChunkCoord {
        ChunkCoord::from_world(tile.x, tile.y, self.chunk_size)
    }

    pub fn chunk_for_point(&self, x: f32, y: f32) -> ChunkCoord {
        let size = self.chunk_size as f64;
        ChunkCoord::new((x as f64 / size).floor() as i32, (y as f64 / size).floor() as i32)
    }

    /// World-space tiles covered by `coord`.
    pub fn chunk_bounds(&self, coord: ChunkCoord) -> Rect {
        let origin = coord.origin(self.chunk_size);
        let size = self.chunk_size as i32;
        Rect::new(origin.x, origin.y, size, size)
    }

    /// Every chunk whose square touches the disc, in row-major order. A negative or non-finite
    /// radius selects nothing.
    pub fn chunks_in_radius(&self, center_x: f32, center_y: f32, radius: f32) -> Vec<ChunkCoord> {
        if !radius.is_finite() || radius < 0.0 || !center_x.is_finite() || !center_y.is_finite() {
            return Vec::new();
        }
        let size = self.chunk_size as f64;
        let (cx, cy, r) = (center_x as f64, center_y as f64, radius as f64);
        let min = self.chunk_for_point((cx - r) as f32, (cy - r) as f32);
        let max = self.chunk_for_point((cx + r) as f32, (cy + r) as f32);

        let mut coords = Vec::new();
        for chunk_y in min.y..=max.y {
            for chunk_x in min.x..=max.x {
                let left = chunk_x as f64 * size;
                let top = chunk_y as f64 * size;
                let nearest_x = cx.clamp(left, left + size);
                let nearest_y = cy.clamp(top, top + size);
                let (dx, dy) = (cx - nearest_x, cy - nearest_y);
                if dx * dx + dy * dy <= r * r {
                    coords.push(ChunkCoord::new(chunk_x, chunk_y));
                }
            }
        }
        coords
    }
}
