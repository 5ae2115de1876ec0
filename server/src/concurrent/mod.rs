// sprawl_world/server/src/concurrent/mod.rs
pub mod thread_pools;
