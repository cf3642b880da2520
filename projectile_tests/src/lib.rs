//! Test worlds for integration tests.
//!
//! - [`OpenSkyWorld`]: nothing to hit; counts traces.
//! - [`ScriptedWorld`]: reports a hit on a chosen trace call and records
//!   every effect it is asked to produce.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Mutex,
};

use projectile_shared::{
    ecs::EntityId,
    math::{BlockPos, Vec3},
    world::{HitTarget, Particle, TraceResult, World},
};

/// Installs a test-friendly tracing subscriber once per process.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("debug")
        .with_test_writer()
        .try_init();
}

/// Empty world that counts how often it was traced.
#[derive(Default)]
pub struct OpenSkyWorld {
    traces: AtomicUsize,
}

impl OpenSkyWorld {
    pub fn traces(&self) -> usize {
        self.traces.load(Ordering::SeqCst)
    }
}

impl World for OpenSkyWorld {
    fn trace(&self, _from: Vec3, _to: Vec3, _exclude: EntityId) -> Option<TraceResult> {
        self.traces.fetch_add(1, Ordering::SeqCst);
        None
    }

    fn add_particle(&self, _position: Vec3, _particle: Particle) {}
}

/// Everything a [`ScriptedWorld`] was asked to do.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Effects {
    pub particles: Vec<(Vec3, Particle)>,
    pub hurts: Vec<(EntityId, f64, Option<EntityId>)>,
    pub chicks: Vec<Vec3>,
}

/// Reports a hit at `at` on the `hit_on`-th trace (1-based) and misses otherwise.
pub struct ScriptedWorld {
    hit_on: usize,
    at: Vec3,
    target: HitTarget,
    traces: AtomicUsize,
    excluded: Mutex<Vec<EntityId>>,
    effects: Mutex<Effects>,
}

impl ScriptedWorld {
    pub fn block_hit(hit_on: usize, at: Vec3) -> Self {
        Self::new(hit_on, at, HitTarget::Block(BlockPos::containing(at)))
    }

    pub fn entity_hit(hit_on: usize, at: Vec3, entity: EntityId) -> Self {
        Self::new(hit_on, at, HitTarget::Entity(entity))
    }

    fn new(hit_on: usize, at: Vec3, target: HitTarget) -> Self {
        Self {
            hit_on,
            at,
            target,
            traces: AtomicUsize::new(0),
            excluded: Mutex::new(Vec::new()),
            effects: Mutex::new(Effects::default()),
        }
    }

    pub fn traces(&self) -> usize {
        self.traces.load(Ordering::SeqCst)
    }

    /// Entity passed as `exclude` on each trace.
    pub fn excluded(&self) -> Vec<EntityId> {
        self.excluded.lock().unwrap().clone()
    }

    pub fn effects(&self) -> Effects {
        self.effects.lock().unwrap().clone()
    }
}

impl World for ScriptedWorld {
    fn trace(&self, _from: Vec3, _to: Vec3, exclude: EntityId) -> Option<TraceResult> {
        self.excluded.lock().unwrap().push(exclude);
        let n = self.traces.fetch_add(1, Ordering::SeqCst) + 1;
        (n == self.hit_on).then_some(TraceResult {
            position: self.at,
            target: self.target,
        })
    }

    fn add_particle(&self, position: Vec3, particle: Particle) {
        self.effects.lock().unwrap().particles.push((position, particle));
    }

    fn hurt_entity(&self, target: EntityId, damage: f64, source: Option<EntityId>) {
        self.effects.lock().unwrap().hurts.push((target, damage, source));
    }

    fn spawn_chick(&self, position: Vec3) {
        self.effects.lock().unwrap().chicks.push(position);
    }
}
