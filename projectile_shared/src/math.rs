//! Math types.
//!
//! This module intentionally stays small and deterministic.
//! Simulation runs in `f64`; persisted records narrow to `f32`.

use std::ops::{Add, AddAssign, Mul, MulAssign, Sub};

use serde::{Deserialize, Serialize};

/// 3D vector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn dot(self, rhs: Self) -> f64 {
        self.x * rhs.x + self.y * rhs.y + self.z * rhs.z
    }

    pub fn len_sq(self) -> f64 {
        self.dot(self)
    }

    pub fn len(self) -> f64 {
        self.len_sq().sqrt()
    }

    /// Unit vector in the same direction, or zero for a zero-length vector.
    pub fn normalize_or_zero(self) -> Self {
        let len = self.len();
        if len > 0.0 && len.is_finite() {
            self * (1.0 / len)
        } else {
            Self::ZERO
        }
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    pub fn lerp(self, to: Self, t: f64) -> Self {
        let t = t.clamp(0.0, 1.0);
        Self::new(
            self.x + (to.x - self.x) * t,
            self.y + (to.y - self.y) * t,
            self.z + (to.z - self.z) * t,
        )
    }

    /// Yaw and pitch in degrees of something travelling along this vector.
    ///
    /// Yaw 0 faces +Z and grows towards -X; positive pitch looks down.
    pub fn yaw_pitch(self) -> (f64, f64) {
        let horizontal = (self.x * self.x + self.z * self.z).sqrt();
        let yaw = (-self.x).atan2(self.z).to_degrees();
        let pitch = (-self.y).atan2(horizontal).to_degrees();
        (yaw, pitch)
    }

    pub fn to_f32_array(self) -> [f32; 3] {
        [self.x as f32, self.y as f32, self.z as f32]
    }
}

impl Add for Vec3 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for Vec3 {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Vec3 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl MulAssign<f64> for Vec3 {
    fn mul_assign(&mut self, rhs: f64) {
        *self = *self * rhs;
    }
}

impl From<[f32; 3]> for Vec3 {
    fn from(v: [f32; 3]) -> Self {
        Self::new(v[0] as f64, v[1] as f64, v[2] as f64)
    }
}

/// Integer block coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Block containing the given point.
    pub fn containing(p: Vec3) -> Self {
        Self::new(p.x.floor() as i32, p.y.floor() as i32, p.z.floor() as i32)
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Builds a box from two corners, ordering each axis.
    pub fn new(a: Vec3, b: Vec3) -> Self {
        Self {
            min: Vec3::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: Vec3::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn translate(&self, by: Vec3) -> Self {
        Self {
            min: self.min + by,
            max: self.max + by,
        }
    }

    /// Intersects the segment `from..to` with this box (slab test).
    ///
    /// Returns the fraction along the segment of the first contact, in `[0,1]`.
    pub fn segment_hit(&self, from: Vec3, to: Vec3) -> Option<f64> {
        let dir = to - from;
        let mut t_min = 0.0f64;
        let mut t_max = 1.0f64;

        for (o, d, lo, hi) in [
            (from.x, dir.x, self.min.x, self.max.x),
            (from.y, dir.y, self.min.y, self.max.y),
            (from.z, dir.z, self.min.z, self.max.z),
        ] {
            if d.abs() < f64::EPSILON {
                if o < lo || o > hi {
                    return None;
                }
                continue;
            }
            let inv = 1.0 / d;
            let (mut t0, mut t1) = ((lo - o) * inv, (hi - o) * inv);
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_min = t_min.max(t0);
            t_max = t_max.min(t1);
            if t_min > t_max {
                return None;
            }
        }
        Some(t_min)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vec3_lerp_midpoint() {
        let a = Vec3::new(0.0, 0.0, 0.0);
        let b = Vec3::new(2.0, 4.0, 6.0);
        let mid = a.lerp(b, 0.5);
        assert_eq!(mid, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn normalize_zero_stays_finite() {
        assert_eq!(Vec3::ZERO.normalize_or_zero(), Vec3::ZERO);
        let n = Vec3::new(3.0, 0.0, 4.0).normalize_or_zero();
        assert!((n.len() - 1.0).abs() < 1e-12);
        assert!((n.x - 0.6).abs() < 1e-12);
    }

    #[test]
    fn yaw_pitch_of_straight_down() {
        let (_, pitch) = Vec3::new(0.0, -1.0, 0.0).yaw_pitch();
        assert!((pitch - 90.0).abs() < 1e-9);
        let (yaw, pitch) = Vec3::new(0.0, 0.0, 1.0).yaw_pitch();
        assert!(yaw.abs() < 1e-9);
        assert!(pitch.abs() < 1e-9);
    }

    #[test]
    fn segment_hits_box_at_entry_face() {
        let b = Aabb::new(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0));
        let t = b
            .segment_hit(Vec3::new(-3.0, 0.0, 0.0), Vec3::new(3.0, 0.0, 0.0))
            .unwrap();
        assert!((t - 1.0 / 3.0).abs() < 1e-12);
        assert!(b
            .segment_hit(Vec3::new(-3.0, 2.0, 0.0), Vec3::new(3.0, 2.0, 0.0))
            .is_none());
        assert!(b
            .segment_hit(Vec3::new(-3.0, 0.0, 0.0), Vec3::new(-2.0, 0.0, 0.0))
            .is_none());
    }
}
