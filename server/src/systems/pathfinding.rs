// sprawl_world/server/src/systems/pathfinding.rs
use crate::core::constants::{DEFAULT_MAX_EXPANDED_NODES, DIAGONAL_STEP_COST};
use crate::core::types::{ChunkCoord, Point, WorldChunk};
use crate::operational::monitoring::metrics::{PATHFINDING_EXPANDED_NODES, PATHFINDING_FAILURES_TOTAL, PATHFINDING_SECONDS};
use ahash::{AHashMap, AHashSet};
use metrics::{counter, histogram};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

const NEIGHBOUR_OFFSETS: [(i32, i32); 8] = [
    (-1, -1), (0, -1), (1, -1),
    (-1, 0),           (1, 0),
    (-1, 1),  (0, 1),  (1, 1),
];

/// Chunks a search may read. Tiles outside them are treated as blocked.
#[derive(Clone, Debug)]
pub struct LoadedRegion {
    chunk_size: usize,
    chunks: AHashMap<ChunkCoord, Arc<WorldChunk>>,
}

impl LoadedRegion {
    pub fn new(chunk_size: usize) -> Self {
        LoadedRegion { chunk_size, chunks: AHashMap::new() }
    }

    pub fn from_chunks(chunk_size: usize, chunks: impl IntoIterator<Item = Arc<WorldChunk>>) -> Self {
        let mut region = Self::new(chunk_size);
        for chunk in chunks {
            region.insert(chunk);
        }
        region
    }

    /// Returns false and skips the chunk when its grid does not match the region's chunk size.
    pub fn insert(&mut self, chunk: Arc<WorldChunk>) -> bool {
        if chunk.chunk_size() != self.chunk_size {
            warn!(
                "[Chunk {}] Grid is {} wide, region expects {}; not used for pathfinding",
                chunk.coord,
                chunk.chunk_size(),
                self.chunk_size
            );
            return false;
        }
        self.chunks.insert(chunk.coord, chunk);
        true
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn contains_tile(&self, tile: Point) -> bool {
        self.chunks.contains_key(&ChunkCoord::from_world(tile.x, tile.y, self.chunk_size))
    }

    pub fn is_walkable(&self, tile: Point) -> bool {
        self.chunks
            .get(&ChunkCoord::from_world(tile.x, tile.y, self.chunk_size))
            .map_or(false, |chunk| chunk.is_walkable_world(tile.x, tile.y))
    }
}

/// Search record for one tile. Lives only for the duration of a single search.
#[derive(Clone, Copy, Debug)]
pub struct PathNode {
    pub position: Point,
    pub g: f32,
    pub h: f32,
    pub f: f32,
    /// Index of the parent in the search arena.
    pub parent: Option<usize>,
}

impl PathNode {
    fn new(position: Point, g: f32, h: f32, parent: Option<usize>) -> Self {
        PathNode { position, g, h, f: g + h, parent }
    }
}

#[derive(Clone, Debug)]
pub struct Pathfinder {
    max_expanded_nodes: usize,
}

impl Default for Pathfinder {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_EXPANDED_NODES)
    }
}

impl Pathfinder {
    pub fn new(max_expanded_nodes: usize) -> Self {
        Pathfinder { max_expanded_nodes }
    }

    /// 8-connected A* over the region's walkable tiles.
    ///
    /// The returned path starts at `start` and ends on the first expanded tile within one step of
    /// `end` on both axes. An empty path means there is none: `start` lies outside the region,
    /// the open set ran dry, or the expansion budget was spent.
    pub fn find_path(&self, start: Point, end: Point, region: &LoadedRegion) -> Vec<Point> {
        let started = Instant::now();
        if !region.contains_tile(start) {
            counter!(PATHFINDING_FAILURES_TOTAL, "reason" => "start_not_loaded").increment(1);
            debug!("No path from {:?}: start is not in a loaded chunk", start);
            return Vec::new();
        }

        let heuristic = |p: Point| p.manhattan(end) as f32;
        let mut nodes = vec![PathNode::new(start, 0.0, heuristic(start), None)];
        let mut open: Vec<usize> = vec![0];
        let mut index: AHashMap<Point, usize> = AHashMap::new();
        index.insert(start, 0);
        let mut closed: AHashSet<Point> = AHashSet::new();
        let mut expanded = 0usize;

        while !open.is_empty() {
            // Linear scan; the earliest entry wins ties.
            let mut best = 0;
            for (slot, &node) in open.iter().enumerate().skip(1) {
                if nodes[node].f < nodes[open[best]].f {
                    best = slot;
                }
            }
            let current = open.remove(best);
            let position = nodes[current].position;
            closed.insert(position);

            if (position.x - end.x).abs() <= 1 && (position.y - end.y).abs() <= 1 {
                let path = reconstruct(&nodes, current);
                histogram!(PATHFINDING_SECONDS).record(started.elapsed().as_secs_f64());
                histogram!(PATHFINDING_EXPANDED_NODES).record(expanded as f64);
                debug!("Path {:?} -> {:?}: {} steps, {} nodes expanded", start, end, path.len(), expanded);
                return path;
            }

            expanded += 1;
            if expanded > self.max_expanded_nodes {
                counter!(PATHFINDING_FAILURES_TOTAL, "reason" => "budget").increment(1);
                histogram!(PATHFINDING_EXPANDED_NODES).record(expanded as f64);
                warn!(
                    "Path {:?} -> {:?} abandoned after expanding {} nodes",
                    start, end, self.max_expanded_nodes
                );
                return Vec::new();
            }

            for (dx, dy) in NEIGHBOUR_OFFSETS {
                let next = position.offset(dx, dy);
                if closed.contains(&next) || !region.is_walkable(next) {
                    continue;
                }
                let step = if dx != 0 && dy != 0 { DIAGONAL_STEP_COST } else { 1.0 };
                let g = nodes[current].g + step;
                match index.get(&next) {
                    Some(&existing) => {
                        let node = &mut nodes[existing];
                        if g < node.g {
                            node.g = g;
                            node.f = g + node.h;
                            node.parent = Some(current);
                        }
                    }
                    None => {
                        let slot = nodes.len();
                        nodes.push(PathNode::new(next, g, heuristic(next), Some(current)));
                        index.insert(next, slot);
                        open.push(slot);
                    }
                }
            }
        }

        counter!(PATHFINDING_FAILURES_TOTAL, "reason" => "unreachable").increment(1);
        histogram!(PATHFINDING_EXPANDED_NODES).record(expanded as f64);
        debug!("No path {:?} -> {:?} after expanding {} nodes", start, end, expanded);
        Vec::new()
    }
}

fn reconstruct(nodes: &[PathNode], last: usize) -> Vec<Point> {
    let mut path = Vec::new();
    let mut cursor = Some(last);
    while let Some(i) = cursor {
        path.push(nodes[i].position);
        cursor = nodes[i].parent;
    }
    path.reverse();
    path
}
