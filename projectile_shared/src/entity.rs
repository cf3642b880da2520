//! Projectile entities.
//!
//! A [`Projectile`] composes its synchronized transform, a non-owning handle
//! to whoever launched it, its [`ProjectileKind`] and the simulator that
//! moves it. Entities are meant to be shared as `Arc<Projectile>`: ticking and
//! impulses both take `&self`.

use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use serde::{Deserialize, Serialize};

use crate::{
    ecs::EntityId,
    impact::{EggSmash, PiercingHit, SnowballPoof},
    math::{Aabb, Vec3},
    physics::{Lifecycle, MotionProfile, ProjectileSimulator},
    record::{self, Record},
    transform::{Motion, SyncPosition},
    world::World,
};

/// Lifetime of the built-in projectiles: one minute at 20 ticks per second.
pub const DEFAULT_MAX_AGE: u32 = 1200;

const ARROW_DAMAGE: f64 = 2.0;

/// Per-class descriptor used by registries and save files.
pub trait EntityType {
    /// Stable namespaced identifier, e.g. `minecraft:egg`.
    fn network_id(&self) -> &'static str;

    /// Collision box relative to the entity position.
    fn bbox(&self) -> Aabb;

    fn encode_record(&self, entity: &Projectile) -> Record;

    /// Builds a fresh, unowned projectile from a record.
    fn decode_record(&self, record: &Record) -> Projectile;
}

/// Built-in projectile classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectileKind {
    Egg,
    Snowball,
    Arrow,
}

impl ProjectileKind {
    pub const ALL: [ProjectileKind; 3] = [
        ProjectileKind::Egg,
        ProjectileKind::Snowball,
        ProjectileKind::Arrow,
    ];

    pub fn from_network_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.network_id() == id)
    }

    /// Shared motion profile of this class.
    pub fn profile(self) -> Arc<MotionProfile> {
        static EGG: OnceLock<Arc<MotionProfile>> = OnceLock::new();
        static SNOWBALL: OnceLock<Arc<MotionProfile>> = OnceLock::new();
        static ARROW: OnceLock<Arc<MotionProfile>> = OnceLock::new();

        let cell = match self {
            ProjectileKind::Egg => &EGG,
            ProjectileKind::Snowball => &SNOWBALL,
            ProjectileKind::Arrow => &ARROW,
        };
        Arc::clone(cell.get_or_init(|| Arc::new(self.build_profile())))
    }

    fn build_profile(self) -> MotionProfile {
        let profile = match self {
            ProjectileKind::Egg => {
                MotionProfile::new(0.03, 0.01, 0.0, DEFAULT_MAX_AGE, EggSmash::default())
            }
            ProjectileKind::Snowball => {
                MotionProfile::new(0.03, 0.01, 0.0, DEFAULT_MAX_AGE, SnowballPoof)
            }
            ProjectileKind::Arrow => MotionProfile::new(
                0.05,
                0.01,
                ARROW_DAMAGE,
                DEFAULT_MAX_AGE,
                PiercingHit {
                    damage: ARROW_DAMAGE,
                },
            ),
        };
        profile.expect("built-in profile constants are valid")
    }
}

impl EntityType for ProjectileKind {
    fn network_id(&self) -> &'static str {
        match self {
            ProjectileKind::Egg => "minecraft:egg",
            ProjectileKind::Snowball => "minecraft:snowball",
            ProjectileKind::Arrow => "minecraft:arrow",
        }
    }

    fn bbox(&self) -> Aabb {
        match self {
            ProjectileKind::Egg | ProjectileKind::Snowball => Aabb::new(
                Vec3::new(-0.125, 0.0, -0.125),
                Vec3::new(0.125, 0.25, 0.125),
            ),
            ProjectileKind::Arrow => {
                Aabb::new(Vec3::new(-0.25, 0.0, -0.25), Vec3::new(0.25, 0.5, 0.25))
            }
        }
    }

    fn encode_record(&self, entity: &Projectile) -> Record {
        let m = entity.transform.snapshot();
        let mut rec = Record::new();
        record::put_vec3(&mut rec, record::POS, m.position);
        record::put_vec3(&mut rec, record::MOTION, m.velocity);
        record::put_f32s(&mut rec, record::ROTATION, &[m.yaw as f32, m.pitch as f32]);
        rec
    }

    fn decode_record(&self, rec: &Record) -> Projectile {
        let [yaw, pitch] = record::f32s::<2>(rec, record::ROTATION)
            .filter(|r| r.iter().all(|v| v.is_finite()))
            .unwrap_or_default();
        let motion = Motion {
            position: record::vec3_or_zero(rec, record::POS),
            velocity: record::vec3_or_zero(rec, record::MOTION),
            yaw: yaw as f64,
            pitch: pitch as f64,
        };
        Projectile::build(*self, self.profile(), motion, None)
    }
}

/// A thrown or shot object in flight.
#[derive(Debug)]
pub struct Projectile {
    id: EntityId,
    kind: ProjectileKind,
    transform: SyncPosition,
    owner: Option<EntityId>,
    simulator: Mutex<ProjectileSimulator>,
}

impl Projectile {
    /// Creates an active projectile. It is not inserted into any world.
    pub fn spawn(
        kind: ProjectileKind,
        position: Vec3,
        velocity: Vec3,
        owner: Option<EntityId>,
    ) -> Self {
        Self::with_profile(kind, kind.profile(), position, velocity, owner)
    }

    /// Like [`Projectile::spawn`] with a custom motion profile.
    pub fn with_profile(
        kind: ProjectileKind,
        profile: Arc<MotionProfile>,
        position: Vec3,
        velocity: Vec3,
        owner: Option<EntityId>,
    ) -> Self {
        let motion = Motion {
            position,
            velocity,
            ..Default::default()
        };
        Self::build(kind, profile, motion, owner)
    }

    fn build(
        kind: ProjectileKind,
        profile: Arc<MotionProfile>,
        motion: Motion,
        owner: Option<EntityId>,
    ) -> Self {
        Self {
            id: EntityId::new_unique(),
            kind,
            transform: SyncPosition::from_motion(motion),
            owner,
            simulator: Mutex::new(ProjectileSimulator::new(profile)),
        }
    }

    /// Decodes a record saved under a network identifier.
    pub fn decode(network_id: &str, rec: &Record) -> Option<Self> {
        ProjectileKind::from_network_id(network_id).map(|kind| kind.decode_record(rec))
    }

    pub fn encode(&self) -> Record {
        self.kind.encode_record(self)
    }

    fn simulator(&self) -> MutexGuard<'_, ProjectileSimulator> {
        self.simulator.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs one simulation step. Does nothing once closed.
    ///
    /// The simulator stays locked for the whole step, so the world and impact
    /// handler must not query this projectile's lifecycle from inside it.
    pub fn tick(&self, world: &dyn World, current_tick: u64) {
        self.simulator()
            .step(self.id, self.owner, &self.transform, world, current_tick);
    }

    /// Pushes the projectile away from `source` with the given force.
    pub fn apply_impulse(&self, source: Vec3, force: f64) {
        self.transform.update(|m| {
            m.velocity += (m.position - source).normalize_or_zero() * force;
        });
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn kind(&self) -> ProjectileKind {
        self.kind
    }

    /// Whoever launched the projectile. The handle may outlive that entity.
    pub fn owner(&self) -> Option<EntityId> {
        self.owner
    }

    pub fn position(&self) -> Vec3 {
        self.transform.position()
    }

    pub fn velocity(&self) -> Vec3 {
        self.transform.velocity()
    }

    /// `(yaw, pitch)` in degrees.
    pub fn rotation(&self) -> (f64, f64) {
        self.transform.rotation()
    }

    /// Collision box placed at the current position.
    pub fn world_bbox(&self) -> Aabb {
        self.kind.bbox().translate(self.position())
    }

    pub fn age(&self) -> u32 {
        self.simulator().age()
    }

    pub fn state(&self) -> Lifecycle {
        self.simulator().state()
    }

    pub fn is_closed(&self) -> bool {
        self.simulator().is_closed()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::*;
    use crate::world::EmptyWorld;

    #[test]
    fn network_ids_round_trip() {
        for kind in ProjectileKind::ALL {
            assert_eq!(ProjectileKind::from_network_id(kind.network_id()), Some(kind));
        }
        assert_eq!(ProjectileKind::Egg.network_id(), "minecraft:egg");
        assert_eq!(ProjectileKind::from_network_id("minecraft:pig"), None);
    }

    #[test]
    fn egg_box_is_a_quarter_block() {
        let b = ProjectileKind::Egg.bbox();
        assert_eq!(b.width(), 0.25);
        assert_eq!(b.height(), 0.25);
        assert_eq!(b.min, Vec3::new(-0.125, 0.0, -0.125));

        let e = Projectile::spawn(ProjectileKind::Egg, Vec3::new(10.0, 5.0, 0.0), Vec3::ZERO, None);
        assert_eq!(e.world_bbox().min, Vec3::new(9.875, 5.0, -0.125));
    }

    #[test]
    fn builtin_profiles_are_shared() {
        let a = ProjectileKind::Egg.profile();
        let b = ProjectileKind::Egg.profile();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.gravity(), 0.03);
        assert_eq!(a.drag(), 0.01);
        assert_eq!(ProjectileKind::Arrow.profile().base_damage(), 2.0);
    }

    #[test]
    fn spawn_starts_active() {
        let owner = EntityId::new_unique();
        let p = Projectile::spawn(
            ProjectileKind::Snowball,
            Vec3::new(0.0, 70.0, 0.0),
            Vec3::new(0.0, 0.0, 1.5),
            Some(owner),
        );
        assert_eq!(p.state(), Lifecycle::Active);
        assert_eq!(p.age(), 0);
        assert!(!p.is_closed());
        assert_eq!(p.owner(), Some(owner));
        assert_eq!(p.kind(), ProjectileKind::Snowball);
    }

    #[test]
    fn impulse_pushes_away_from_source() {
        let p = Projectile::spawn(ProjectileKind::Egg, Vec3::new(0.0, 0.0, 2.0), Vec3::ZERO, None);
        p.apply_impulse(Vec3::ZERO, 0.5);
        p.apply_impulse(Vec3::ZERO, 0.25);
        assert_eq!(p.velocity(), Vec3::new(0.0, 0.0, 0.75));

        p.apply_impulse(Vec3::new(0.0, 0.0, 2.0), 10.0);
        assert_eq!(p.velocity(), Vec3::new(0.0, 0.0, 0.75));
    }

    #[test]
    fn record_round_trips_within_f32_precision() {
        let p = Projectile::spawn(
            ProjectileKind::Arrow,
            Vec3::new(123.456789, 64.1, -9876.54321),
            Vec3::new(0.1, -0.333333333, 1.0e-3),
            Some(EntityId::new_unique()),
        );
        p.tick(&EmptyWorld, 1);
        let rec = p.encode();
        let back = Projectile::decode("minecraft:arrow", &rec).unwrap();

        assert_eq!(back.kind(), ProjectileKind::Arrow);
        assert_eq!(back.owner(), None);
        assert_ne!(back.id(), p.id());
        for (a, b) in [(p.position(), back.position()), (p.velocity(), back.velocity())] {
            for (x, y) in [(a.x, b.x), (a.y, b.y), (a.z, b.z)] {
                assert_eq!(x as f32, y as f32);
                assert!((x - y).abs() <= x.abs() * f32::EPSILON as f64);
            }
        }
        let (yaw, pitch) = p.rotation();
        assert_eq!(back.rotation(), (yaw as f32 as f64, pitch as f32 as f64));
    }

    #[test]
    fn corrupt_record_decodes_to_rest() {
        let Value::Object(rec) = json!({ "Pos": "nowhere", "Motion": [1.0, 2.0, null] }) else {
            unreachable!()
        };
        let p = ProjectileKind::Egg.decode_record(&rec);
        assert_eq!(p.position(), Vec3::ZERO);
        assert_eq!(p.velocity(), Vec3::ZERO);
        assert_eq!(p.rotation(), (0.0, 0.0));
        assert_eq!(p.state(), Lifecycle::Active);
    }

    #[test]
    fn unknown_record_type_is_rejected() {
        assert!(Projectile::decode("minecraft:trident", &Record::new()).is_none());
    }
}
