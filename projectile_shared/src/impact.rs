//! Impact effects for the built-in projectile kinds.

use rand::Rng;
use tracing::debug;

use crate::{
    ecs::EntityId,
    physics::ImpactHandler,
    world::{Particle, TraceResult, World},
};

/// Number of particles a breaking egg or snowball bursts into.
pub const SPLASH_PARTICLES: usize = 6;

/// Smashes into egg particles and occasionally hatches a chick.
#[derive(Debug, Clone, Copy)]
pub struct EggSmash {
    /// Probability in `[0, 1]` that a chick hatches at the impact point.
    pub hatch_chance: f64,
}

impl Default for EggSmash {
    fn default() -> Self {
        Self { hatch_chance: 0.125 }
    }
}

impl ImpactHandler for EggSmash {
    fn on_impact(&self, hit: &TraceResult, world: &dyn World, _owner: Option<EntityId>) {
        for _ in 0..SPLASH_PARTICLES {
            world.add_particle(hit.position, Particle::EggSmash);
        }
        if rand::thread_rng().gen_bool(self.hatch_chance.clamp(0.0, 1.0)) {
            debug!(x = hit.position.x, y = hit.position.y, z = hit.position.z, "egg hatched");
            world.spawn_chick(hit.position);
        }
    }
}

/// Bursts into snow.
#[derive(Debug, Default, Clone, Copy)]
pub struct SnowballPoof;

impl ImpactHandler for SnowballPoof {
    fn on_impact(&self, hit: &TraceResult, world: &dyn World, _owner: Option<EntityId>) {
        for _ in 0..SPLASH_PARTICLES {
            world.add_particle(hit.position, Particle::SnowballPoof);
        }
    }
}

/// Damages the entity it hits, credited to the shooter.
#[derive(Debug, Clone, Copy)]
pub struct PiercingHit {
    pub damage: f64,
}

impl ImpactHandler for PiercingHit {
    fn on_impact(&self, hit: &TraceResult, world: &dyn World, owner: Option<EntityId>) {
        if let Some(target) = hit.entity() {
            world.hurt_entity(target, self.damage, owner);
            world.add_particle(hit.position, Particle::Critical);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::math::{BlockPos, Vec3};
    use crate::world::HitTarget;

    #[derive(Default)]
    struct Recorder {
        particles: Mutex<Vec<(Vec3, Particle)>>,
        hurts: Mutex<Vec<(EntityId, f64, Option<EntityId>)>>,
        chicks: Mutex<Vec<Vec3>>,
    }

    impl World for Recorder {
        fn trace(&self, _from: Vec3, _to: Vec3, _exclude: EntityId) -> Option<TraceResult> {
            None
        }

        fn add_particle(&self, position: Vec3, particle: Particle) {
            self.particles.lock().unwrap().push((position, particle));
        }

        fn hurt_entity(&self, target: EntityId, damage: f64, source: Option<EntityId>) {
            self.hurts.lock().unwrap().push((target, damage, source));
        }

        fn spawn_chick(&self, position: Vec3) {
            self.chicks.lock().unwrap().push(position);
        }
    }

    fn block_hit(at: Vec3) -> TraceResult {
        TraceResult {
            position: at,
            target: HitTarget::Block(BlockPos::containing(at)),
        }
    }

    #[test]
    fn egg_spawns_six_smash_particles() {
        let world = Recorder::default();
        let at = Vec3::new(1.0, 2.0, 3.0);
        EggSmash { hatch_chance: 0.0 }.on_impact(&block_hit(at), &world, None);

        let particles = world.particles.lock().unwrap();
        assert_eq!(particles.len(), SPLASH_PARTICLES);
        assert!(particles.iter().all(|p| *p == (at, Particle::EggSmash)));
        assert!(world.chicks.lock().unwrap().is_empty());
    }

    #[test]
    fn egg_always_hatches_at_full_chance() {
        let world = Recorder::default();
        let at = Vec3::new(0.0, 64.0, 0.0);
        EggSmash { hatch_chance: 1.0 }.on_impact(&block_hit(at), &world, None);
        assert_eq!(*world.chicks.lock().unwrap(), vec![at]);
    }

    #[test]
    fn arrow_only_hurts_entities() {
        let world = Recorder::default();
        let shooter = EntityId::new_unique();
        let victim = EntityId::new_unique();
        let arrow = PiercingHit { damage: 2.0 };

        arrow.on_impact(&block_hit(Vec3::ZERO), &world, Some(shooter));
        assert!(world.hurts.lock().unwrap().is_empty());

        let hit = TraceResult {
            position: Vec3::new(0.0, 1.0, 0.0),
            target: HitTarget::Entity(victim),
        };
        arrow.on_impact(&hit, &world, Some(shooter));
        assert_eq!(*world.hurts.lock().unwrap(), vec![(victim, 2.0, Some(shooter))]);
        assert_eq!(world.particles.lock().unwrap().len(), 1);
    }
}
