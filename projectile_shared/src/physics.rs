//! Projectile physics.
//!
//! One [`ProjectileSimulator::step`] per tick:
//! - gravity is subtracted from vertical velocity, then drag scales the whole
//!   velocity by `1 - drag`;
//! - the world traces the segment from the current position to
//!   `position + velocity`;
//! - a hit moves the projectile to the contact point, runs the profile's
//!   impact handler and closes the simulator;
//! - a miss commits the new state and ages the projectile, which expires
//!   silently once it reaches its lifetime.
//!
//! Effects live entirely in [`ImpactHandler`]s so the integrator never
//! branches on what kind of projectile it is moving.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::{
    ecs::EntityId,
    transform::SyncPosition,
    world::{TraceResult, World},
};

/// Side effects triggered when a projectile hits something.
pub trait ImpactHandler: Send + Sync {
    fn on_impact(&self, hit: &TraceResult, world: &dyn World, owner: Option<EntityId>);
}

impl<F> ImpactHandler for F
where
    F: Fn(&TraceResult, &dyn World, Option<EntityId>) + Send + Sync,
{
    fn on_impact(&self, hit: &TraceResult, world: &dyn World, owner: Option<EntityId>) {
        self(hit, world, owner)
    }
}

/// Impact handler that does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoImpact;

impl ImpactHandler for NoImpact {
    fn on_impact(&self, _hit: &TraceResult, _world: &dyn World, _owner: Option<EntityId>) {}
}

/// Rejected profile parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProfileError {
    InvalidGravity(f64),
    InvalidDrag(f64),
    InvalidDamage(f64),
    ZeroLifetime,
}

impl fmt::Display for ProfileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfileError::InvalidGravity(g) => {
                write!(f, "gravity must be finite and non-negative, got {g}")
            }
            ProfileError::InvalidDrag(d) => write!(f, "drag must be in [0, 1), got {d}"),
            ProfileError::InvalidDamage(d) => {
                write!(f, "base damage must be finite and non-negative, got {d}")
            }
            ProfileError::ZeroLifetime => write!(f, "max age must be at least one tick"),
        }
    }
}

impl std::error::Error for ProfileError {}

/// Physics parameters shared by every projectile of one class.
#[derive(Clone)]
pub struct MotionProfile {
    gravity: f64,
    drag: f64,
    base_damage: f64,
    max_age: u32,
    impact: Arc<dyn ImpactHandler>,
}

impl MotionProfile {
    /// Validates and builds a profile.
    ///
    /// `gravity` is blocks/tick² subtracted from vertical velocity, `drag` is
    /// the fraction of velocity lost per tick and `max_age` the lifetime in
    /// ticks.
    pub fn new(
        gravity: f64,
        drag: f64,
        base_damage: f64,
        max_age: u32,
        impact: impl ImpactHandler + 'static,
    ) -> Result<Self, ProfileError> {
        if !gravity.is_finite() || gravity < 0.0 {
            return Err(ProfileError::InvalidGravity(gravity));
        }
        if !(0.0..1.0).contains(&drag) {
            return Err(ProfileError::InvalidDrag(drag));
        }
        if !base_damage.is_finite() || base_damage < 0.0 {
            return Err(ProfileError::InvalidDamage(base_damage));
        }
        if max_age == 0 {
            return Err(ProfileError::ZeroLifetime);
        }
        Ok(Self {
            gravity,
            drag,
            base_damage,
            max_age,
            impact: Arc::new(impact),
        })
    }

    pub fn gravity(&self) -> f64 {
        self.gravity
    }

    pub fn drag(&self) -> f64 {
        self.drag
    }

    pub fn base_damage(&self) -> f64 {
        self.base_damage
    }

    pub fn max_age(&self) -> u32 {
        self.max_age
    }
}

impl fmt::Debug for MotionProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MotionProfile")
            .field("gravity", &self.gravity)
            .field("drag", &self.drag)
            .field("base_damage", &self.base_damage)
            .field("max_age", &self.max_age)
            .finish_non_exhaustive()
    }
}

/// Why a projectile stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// The swept trace hit a block or entity.
    Impacted,
    /// Lifetime ran out without hitting anything.
    Expired,
}

/// Lifecycle of a projectile. `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Active,
    Closed(CloseReason),
}

/// Per-projectile integrator state.
#[derive(Debug)]
pub struct ProjectileSimulator {
    profile: Arc<MotionProfile>,
    age: u32,
    state: Lifecycle,
}

impl ProjectileSimulator {
    pub fn new(profile: Arc<MotionProfile>) -> Self {
        Self {
            profile,
            age: 0,
            state: Lifecycle::Active,
        }
    }

    pub fn profile(&self) -> &MotionProfile {
        &self.profile
    }

    /// Ticks survived without hitting anything.
    pub fn age(&self) -> u32 {
        self.age
    }

    pub fn state(&self) -> Lifecycle {
        self.state
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.state, Lifecycle::Closed(_))
    }

    /// Advances the projectile by one tick.
    ///
    /// `World::trace` runs exactly once, without the transform locked.
    /// Whatever other threads did to the transform during the trace is kept:
    /// on a miss their position and velocity deltas are added on top of the
    /// integrated state, so concurrent impulses are never overwritten.
    ///
    /// On a hit only the position moves, to the contact point. The velocity
    /// is not integrated: it stays at the value it had when the step began
    /// (plus any impulse that landed during the trace), so `velocity()` after
    /// an impact reports the pre-gravity, pre-drag velocity of the last tick.
    pub fn step(
        &mut self,
        entity: EntityId,
        owner: Option<EntityId>,
        transform: &SyncPosition,
        world: &dyn World,
        current_tick: u64,
    ) {
        if self.is_closed() {
            return;
        }

        let (pos, start_vel) = transform.get();
        let mut vel = start_vel;
        vel.y -= self.profile.gravity;
        vel *= 1.0 - self.profile.drag;
        let candidate = pos + vel;

        let hit = world.trace(pos, candidate, entity);

        let changed = transform.update(|m| {
            let changed = m.position != pos || m.velocity != start_vel;
            match hit {
                Some(res) => m.position = res.position,
                None => {
                    m.position = candidate + (m.position - pos);
                    m.velocity = vel + (m.velocity - start_vel);
                    if m.velocity.len_sq() > 0.0 {
                        (m.yaw, m.pitch) = m.velocity.yaw_pitch();
                    }
                }
            }
            changed
        });
        if changed {
            trace!(%entity, tick = current_tick, "transform changed during trace, merged");
        }

        match hit {
            Some(res) => {
                self.profile.impact.on_impact(&res, world, owner);
                self.state = Lifecycle::Closed(CloseReason::Impacted);
                debug!(
                    %entity,
                    tick = current_tick,
                    x = res.position.x,
                    y = res.position.y,
                    z = res.position.z,
                    target = ?res.target,
                    "projectile impacted"
                );
            }
            None => {
                self.age += 1;
                if self.age >= self.profile.max_age {
                    self.state = Lifecycle::Closed(CloseReason::Expired);
                    debug!(%entity, tick = current_tick, age = self.age, "projectile expired");
                }
            }
        }
    }
}
