//! `projectile_shared`
//!
//! Projectile simulation core shared by the server and tests.
//!
//! Design goals:
//! - One integration-and-collision step per tick, no I/O.
//! - Spatial state behind a single synchronized wrapper.
//! - Effects injected per projectile class; the integrator stays generic.
//! - No `unsafe`.

pub mod config;
pub mod ecs;
pub mod entity;
pub mod impact;
pub mod math;
pub mod physics;
pub mod record;
pub mod transform;
pub mod world;

pub mod prelude {
    //! Commonly used exports.

    pub use crate::config::*;
    pub use crate::ecs::*;
    pub use crate::entity::*;
    pub use crate::math::*;
    pub use crate::physics::*;
    pub use crate::transform::*;
    pub use crate::world::*;
}
