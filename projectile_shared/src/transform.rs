//! Synchronized spatial state.
//!
//! [`SyncPosition`] is the only mutable state a projectile shares between the
//! tick loop and other subsystems (explosions, commands). Every access goes
//! through its lock; the raw fields are never handed out.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::math::Vec3;

/// Position, velocity and orientation of a moving entity.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Motion {
    pub position: Vec3,
    pub velocity: Vec3,
    /// Degrees.
    pub yaw: f64,
    /// Degrees.
    pub pitch: f64,
}

impl Motion {
    fn debug_check(&self) {
        debug_assert!(self.position.is_finite(), "non-finite position");
        debug_assert!(self.velocity.is_finite(), "non-finite velocity");
        debug_assert!(
            self.yaw.is_finite() && self.pitch.is_finite(),
            "non-finite rotation"
        );
    }
}

/// Mutex-guarded [`Motion`].
#[derive(Debug, Default)]
pub struct SyncPosition {
    inner: Mutex<Motion>,
}

impl SyncPosition {
    pub fn new(position: Vec3, velocity: Vec3) -> Self {
        Self::from_motion(Motion {
            position,
            velocity,
            ..Default::default()
        })
    }

    pub fn from_motion(motion: Motion) -> Self {
        motion.debug_check();
        Self {
            inner: Mutex::new(motion),
        }
    }

    // Motion is plain data and each write replaces it whole, so a panic in
    // another holder cannot leave it half-updated.
    fn lock(&self) -> MutexGuard<'_, Motion> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Consistent `(position, velocity)` pair.
    pub fn get(&self) -> (Vec3, Vec3) {
        let m = self.lock();
        (m.position, m.velocity)
    }

    pub fn set(&self, position: Vec3, velocity: Vec3) {
        let mut m = self.lock();
        m.position = position;
        m.velocity = velocity;
        m.debug_check();
    }

    pub fn snapshot(&self) -> Motion {
        *self.lock()
    }

    pub fn position(&self) -> Vec3 {
        self.lock().position
    }

    pub fn velocity(&self) -> Vec3 {
        self.lock().velocity
    }

    /// `(yaw, pitch)` in degrees.
    pub fn rotation(&self) -> (f64, f64) {
        let m = self.lock();
        (m.yaw, m.pitch)
    }

    pub fn set_rotation(&self, yaw: f64, pitch: f64) {
        let mut m = self.lock();
        m.yaw = yaw;
        m.pitch = pitch;
        m.debug_check();
    }

    /// Runs a read-modify-write under a single lock acquisition.
    pub fn update<R>(&self, f: impl FnOnce(&mut Motion) -> R) -> R {
        let mut m = self.lock();
        let out = f(&mut m);
        m.debug_check();
        out
    }
}
