// sprawl_world/server/src/server/mod.rs
pub mod instance;
pub mod maintenance_loop;
