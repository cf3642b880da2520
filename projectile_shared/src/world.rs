//! World abstraction.
//!
//! Projectiles do not own any spatial index. They ask the world to trace the
//! segment they are about to travel and to produce effects on impact.
//! Implementations handle their own synchronization; every method takes
//! `&self` so a world can be shared by concurrently ticking entities.

use serde::{Deserialize, Serialize};

use crate::{
    ecs::EntityId,
    math::{BlockPos, Vec3},
};

/// What a swept trace ran into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HitTarget {
    Block(BlockPos),
    Entity(EntityId),
}

/// First intersection along a traced segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TraceResult {
    /// Point of contact.
    pub position: Vec3,
    pub target: HitTarget,
}

impl TraceResult {
    pub fn entity(&self) -> Option<EntityId> {
        match self.target {
            HitTarget::Entity(id) => Some(id),
            HitTarget::Block(_) => None,
        }
    }
}

/// Visual effects a projectile can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Particle {
    EggSmash,
    SnowballPoof,
    Critical,
}

/// Services a projectile consumes from the world it flies through.
pub trait World: Send + Sync {
    /// Traces `from..to` against blocks and entities, ignoring `exclude`.
    fn trace(&self, from: Vec3, to: Vec3, exclude: EntityId) -> Option<TraceResult>;

    fn add_particle(&self, position: Vec3, particle: Particle);

    /// Deals damage to an entity. Worlds without living entities may ignore it.
    fn hurt_entity(&self, _target: EntityId, _damage: f64, _source: Option<EntityId>) {}

    /// Hatches a chick at the given position.
    fn spawn_chick(&self, _position: Vec3) {}
}

/// A world with nothing in it.
#[derive(Default)]
pub struct EmptyWorld;

impl World for EmptyWorld {
    fn trace(&self, _from: Vec3, _to: Vec3, _exclude: EntityId) -> Option<TraceResult> {
        None
    }

    fn add_particle(&self, _position: Vec3, _particle: Particle) {}
}
