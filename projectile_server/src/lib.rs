//! `projectile_server`
//!
//! Server-side systems:
//! - Fixed-rate tick scheduler owning the live projectile set
//! - Removal of closed projectiles after each pass
//! - Explosion impulses, save and restore of in-flight projectiles
//! - A flat demo world implementing the world services

pub mod flat_world;
pub mod server;

pub use flat_world::FlatWorld;
pub use server::TickScheduler;
