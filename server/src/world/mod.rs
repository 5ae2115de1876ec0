// sprawl_world/server/src/world/mod.rs
pub mod buildings;
pub mod chunk_store;
pub mod district;
pub mod footprint_index;
pub mod interior;
pub mod map_generator;
pub mod partition;
pub mod population;
pub mod rng;
pub mod roads;
pub mod tiles;
