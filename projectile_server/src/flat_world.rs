//! A flat demo world.
//!
//! An infinite ground plane plus a set of boxed target entities. Effects
//! requested by projectiles are queued as [`WorldEvent`]s and drained by the
//! owner of the world.

use std::{
    collections::HashMap,
    sync::{Mutex, PoisonError, RwLock},
};

use projectile_shared::{
    ecs::EntityId,
    math::{Aabb, BlockPos, Vec3},
    world::{HitTarget, Particle, TraceResult, World},
};
use tracing::{debug, info};

/// Effects produced inside the world since the last drain.
#[derive(Debug, Clone, PartialEq)]
pub enum WorldEvent {
    Particle {
        position: Vec3,
        particle: Particle,
    },
    Hurt {
        target: EntityId,
        damage: f64,
        source: Option<EntityId>,
    },
    Killed {
        target: EntityId,
        source: Option<EntityId>,
    },
    ChickHatched {
        position: Vec3,
    },
}

#[derive(Debug, Clone, Copy)]
struct Target {
    bbox: Aabb,
    health: f64,
}

/// Ground plane at `ground_y` with hittable targets.
#[derive(Debug)]
pub struct FlatWorld {
    ground_y: f64,
    targets: RwLock<HashMap<EntityId, Target>>,
    events: Mutex<Vec<WorldEvent>>,
}

impl FlatWorld {
    pub fn new(ground_y: f64) -> Self {
        Self {
            ground_y,
            targets: RwLock::new(HashMap::new()),
            events: Mutex::new(Vec::new()),
        }
    }

    pub fn ground_y(&self) -> f64 {
        self.ground_y
    }

    /// Adds a target occupying `bbox` (world space).
    pub fn add_target(&self, id: EntityId, bbox: Aabb, health: f64) {
        self.targets
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, Target { bbox, health });
    }

    /// Remaining health, or `None` once the target is gone.
    pub fn target_health(&self, id: EntityId) -> Option<f64> {
        self.targets
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .map(|t| t.health)
    }

    /// Takes all queued events.
    pub fn drain_events(&self) -> Vec<WorldEvent> {
        std::mem::take(&mut *self.events.lock().unwrap_or_else(PoisonError::into_inner))
    }

    fn push(&self, event: WorldEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }

    /// Fraction along `from..to` where the segment crosses the ground downwards.
    fn ground_hit(&self, from: Vec3, to: Vec3) -> Option<f64> {
        if from.y >= self.ground_y && to.y < self.ground_y {
            Some((from.y - self.ground_y) / (from.y - to.y))
        } else {
            None
        }
    }
}

impl World for FlatWorld {
    fn trace(&self, from: Vec3, to: Vec3, exclude: EntityId) -> Option<TraceResult> {
        let mut best: Option<(f64, HitTarget)> = None;

        if let Some(t) = self.ground_hit(from, to) {
            let p = from.lerp(to, t);
            let block = BlockPos::containing(Vec3::new(p.x, self.ground_y - 0.5, p.z));
            best = Some((t, HitTarget::Block(block)));
        }

        let targets = self.targets.read().unwrap_or_else(PoisonError::into_inner);
        for (id, target) in targets.iter() {
            if *id == exclude {
                continue;
            }
            if let Some(t) = target.bbox.segment_hit(from, to) {
                if best.map_or(true, |(bt, _)| t < bt) {
                    best = Some((t, HitTarget::Entity(*id)));
                }
            }
        }

        best.map(|(t, target)| TraceResult {
            position: from.lerp(to, t),
            target,
        })
    }

    fn add_particle(&self, position: Vec3, particle: Particle) {
        self.push(WorldEvent::Particle { position, particle });
    }

    fn hurt_entity(&self, target: EntityId, damage: f64, source: Option<EntityId>) {
        let killed = {
            let mut targets = self.targets.write().unwrap_or_else(PoisonError::into_inner);
            let Some(t) = targets.get_mut(&target) else {
                debug!(%target, "hurt ignored, target gone");
                return;
            };
            t.health -= damage;
            if t.health <= 0.0 {
                targets.remove(&target);
                true
            } else {
                false
            }
        };

        self.push(WorldEvent::Hurt {
            target,
            damage,
            source,
        });
        if killed {
            info!(%target, ?source, "target destroyed");
            self.push(WorldEvent::Killed { target, source });
        }
    }

    fn spawn_chick(&self, position: Vec3) {
        self.push(WorldEvent::ChickHatched { position });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trace_stops_at_ground() {
        let w = FlatWorld::new(0.0);
        let hit = w
            .trace(
                Vec3::new(0.5, 1.0, 0.5),
                Vec3::new(1.5, -1.0, 0.5),
                EntityId::new_unique(),
            )
            .unwrap();
        assert_eq!(hit.position, Vec3::new(1.0, 0.0, 0.5));
        assert_eq!(hit.target, HitTarget::Block(BlockPos::new(1, -1, 0)));
    }

    #[test]
    fn trace_above_ground_misses() {
        let w = FlatWorld::new(0.0);
        assert!(w
            .trace(Vec3::new(0.0, 5.0, 0.0), Vec3::new(3.0, 4.0, 0.0), EntityId::new_unique())
            .is_none());
    }

    #[test]
    fn nearest_target_wins_and_exclusion_applies() {
        let w = FlatWorld::new(-100.0);
        let near = EntityId::new_unique();
        let far = EntityId::new_unique();
        w.add_target(
            far,
            Aabb::new(Vec3::new(4.0, -1.0, -1.0), Vec3::new(5.0, 1.0, 1.0)),
            10.0,
        );
        w.add_target(
            near,
            Aabb::new(Vec3::new(2.0, -1.0, -1.0), Vec3::new(3.0, 1.0, 1.0)),
            10.0,
        );

        let from = Vec3::ZERO;
        let to = Vec3::new(10.0, 0.0, 0.0);
        let hit = w.trace(from, to, EntityId::new_unique()).unwrap();
        assert_eq!(hit.target, HitTarget::Entity(near));
        assert_eq!(hit.position, Vec3::new(2.0, 0.0, 0.0));

        let hit = w.trace(from, to, near).unwrap();
        assert_eq!(hit.target, HitTarget::Entity(far));
    }

    #[test]
    fn lethal_damage_removes_target() {
        let w = FlatWorld::new(0.0);
        let id = EntityId::new_unique();
        let shooter = EntityId::new_unique();
        w.add_target(id, Aabb::new(Vec3::ZERO, Vec3::new(1.0, 2.0, 1.0)), 3.0);

        w.hurt_entity(id, 2.0, Some(shooter));
        assert_eq!(w.target_health(id), Some(1.0));
        w.hurt_entity(id, 2.0, Some(shooter));
        assert_eq!(w.target_health(id), None);
        w.hurt_entity(id, 2.0, Some(shooter));

        let events = w.drain_events();
        assert_eq!(events.len(), 3);
        assert_eq!(
            events[2],
            WorldEvent::Killed {
                target: id,
                source: Some(shooter)
            }
        );
        assert!(w.drain_events().is_empty());
    }
}
