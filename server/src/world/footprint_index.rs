// sprawl_world/server/src/world/footprint_index.rs
use crate::core::types::{EntityId, Rect};
use rstar::{RTree, RTreeObject, AABB};
use tracing::trace;

#[derive(Clone, Debug)]
struct SpatialFootprint {
    id: EntityId,
    rect: Rect,
}

impl RTreeObject for SpatialFootprint {
    type Envelope = AABB<[i32; 2]>;

    // Inclusive tile corners.
    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(
            [self.rect.x, self.rect.y],
            [self.rect.right() - 1, self.rect.bottom() - 1],
        )
    }
}

/// Building footprints placed so far in one chunk.
pub struct FootprintIndex {
    rtree: RTree<SpatialFootprint>,
}

impl FootprintIndex {
    pub fn new() -> Self {
        FootprintIndex { rtree: RTree::new() }
    }

    pub fn insert(&mut self, id: EntityId, rect: Rect) {
        self.rtree.insert(SpatialFootprint { id, rect });
        trace!("Footprint {} indexed at {:?}", id, rect);
    }

    /// True when `rect`, grown by `buffer` tiles on every side, touches an indexed footprint.
    pub fn collides(&self, rect: &Rect, buffer: i32) -> bool {
        let grown = rect.expand(buffer);
        if grown.width <= 0 || grown.height <= 0 {
            return false;
        }
        let query = AABB::from_corners([grown.x, grown.y], [grown.right() - 1, grown.bottom() - 1]);
        self.rtree.locate_in_envelope_intersecting(&query).next().is_some()
    }

    pub fn size(&self) -> usize {
        self.rtree.size()
    }
}

impl Default for FootprintIndex {
    fn default() -> Self {
        Self::new()
    }
}
