// sprawl_world/server/src/lib.rs
pub mod concurrent;
pub mod core;
pub mod operational;
pub mod server;
pub mod storage;
pub mod systems;
pub mod world;

pub use crate::core::config::WorldConfig;
pub use crate::core::error::{WorldError, WorldResult};
pub use crate::server::instance::WorldServer;
