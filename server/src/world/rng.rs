// sprawl_world/server/src/world/rng.rs
//! Deterministic random stream for chunk generation.
//!
//! Every value is derived from `ChaCha8Rng::next_u64`, whose output is fixed for a given seed
//! on every platform. The distribution helpers below are implemented here rather than taken from
//! `rand` so that a `rand` upgrade can never change generated content.

use crate::core::types::{ChunkCoord, EntityId};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use uuid::Uuid;

/// Seed of a chunk: seahash of the little-endian coordinate bytes.
pub fn chunk_seed(coord: ChunkCoord) -> u64 {
    let mut bytes = [0u8; 8];
    bytes[..4].copy_from_slice(&coord.x.to_le_bytes());
    bytes[4..].copy_from_slice(&coord.y.to_le_bytes());
    seahash::hash(&bytes)
}

pub struct SeededRandom {
    rng: ChaCha8Rng,
    draws: u64,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        SeededRandom { rng: ChaCha8Rng::seed_from_u64(seed), draws: 0 }
    }

    pub fn for_chunk(coord: ChunkCoord) -> Self {
        Self::new(chunk_seed(coord))
    }

    /// Number of values pulled so far.
    pub fn draws(&self) -> u64 {
        self.draws
    }

    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        self.draws += 1;
        self.rng.next_u64()
    }

    /// Uniform in `[0, 1)` with 53 bits of precision.
    #[inline]
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    #[inline]
    pub fn next_f32(&mut self) -> f32 {
        self.next_f64() as f32
    }

    /// Uniform integer in `[min, max]`. Returns `min` when the range is empty.
    pub fn range_i32(&mut self, min: i32, max: i32) -> i32 {
        if max <= min {
            // Still consume a value so stream position does not depend on the bounds.
            self.next_u64();
            return min;
        }
        let span = (max as i64 - min as i64) + 1;
        let offset = (self.next_f64() * span as f64).floor() as i64;
        (min as i64 + offset.min(span - 1)) as i32
    }

    pub fn range_usize(&mut self, min: usize, max: usize) -> usize {
        if max <= min {
            self.next_u64();
            return min;
        }
        let span = (max - min) as u64 + 1;
        let offset = (self.next_f64() * span as f64).floor() as u64;
        min + offset.min(span - 1) as usize
    }

    pub fn range_f32(&mut self, min: f32, max: f32) -> f32 {
        min + self.next_f32() * (max - min)
    }

    pub fn chance(&mut self, probability: f64) -> bool {
        self.next_f64() < probability
    }

    /// Picks one element. `items` must be non-empty.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        let idx = self.range_usize(0, items.len().saturating_sub(1));
        &items[idx]
    }
}

/// Hands out entity ids derived from the chunk seed and a running counter.
/// Ids never consume the random stream.
pub struct IdAllocator {
    seed: u64,
    next: u64,
}

impl IdAllocator {
    pub fn new(seed: u64) -> Self {
        IdAllocator { seed, next: 0 }
    }

    pub fn next_id(&mut self) -> EntityId {
        let id = Uuid::from_u64_pair(self.seed, self.next);
        self.next += 1;
        id
    }
}
