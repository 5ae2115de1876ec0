// sprawl_world/server/src/systems/mod.rs
pub mod pathfinding;
