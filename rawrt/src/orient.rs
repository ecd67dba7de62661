//! Camera orientation math on top of the fast trig in [`crate::math`].
//!
//! Quaternions are stored `(x, y, z, w)` with `w` the scalar part.

use core::ops::{Add, Mul, Neg, Sub};

use crate::math;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3::new(0.0, 0.0, 0.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Vec3 { x, y, z }
    }

    pub fn scale(self, s: f32) -> Vec3 {
        Vec3::new(self.x * s, self.y * s, self.z * s)
    }

    pub fn dot(self, o: Vec3) -> f32 {
        self.x * o.x + self.y * o.y + self.z * o.z
    }
}

impl Add for Vec3 {
    type Output = Vec3;

    fn add(self, o: Vec3) -> Vec3 {
        Vec3::new(self.x + o.x, self.y + o.y, self.z + o.z)
    }
}

impl Sub for Vec3 {
    type Output = Vec3;

    fn sub(self, o: Vec3) -> Vec3 {
        Vec3::new(self.x - o.x, self.y - o.y, self.z - o.z)
    }
}

impl Neg for Vec3 {
    type Output = Vec3;

    fn neg(self) -> Vec3 {
        Vec3::new(-self.x, -self.y, -self.z)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quat {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Quat {
    pub const IDENTITY: Quat = Quat::new(0.0, 0.0, 0.0, 1.0);

    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Quat { x, y, z, w }
    }

    /// Rotation of `degrees` about the unit vector `axis`.
    pub fn from_axis_deg(axis: Vec3, degrees: f32) -> Quat {
        let s = sin_half_deg(degrees);
        Quat::new(axis.x * s, axis.y * s, axis.z * s, cos_half_deg(degrees))
    }

    /// Conjugate. Equal to the inverse for unit quaternions.
    pub fn inverse(self) -> Quat {
        Quat::new(-self.x, -self.y, -self.z, self.w)
    }

    /// Rotate `p` by this (unit) quaternion: `q * p * q⁻¹`.
    pub fn rotate(self, p: Vec3) -> Vec3 {
        let r = self * Quat::new(p.x, p.y, p.z, 0.0) * self.inverse();
        Vec3::new(r.x, r.y, r.z)
    }

    pub fn norm_squared(self) -> f32 {
        self.x * self.x + self.y * self.y + self.z * self.z + self.w * self.w
    }
}

impl Default for Quat {
    fn default() -> Self {
        Quat::IDENTITY
    }
}

impl Mul for Quat {
    type Output = Quat;

    /// Hamilton product.
    fn mul(self, b: Quat) -> Quat {
        let a = self;
        Quat::new(
            a.x * b.w + b.x * a.w + (a.y * b.z - b.y * a.z),
            a.y * b.w + b.y * a.w + (a.z * b.x - b.z * a.x),
            a.z * b.w + b.z * a.w + (a.x * b.y - b.x * a.y),
            a.w * b.w - (a.x * b.x + a.y * b.y + a.z * b.z),
        )
    }
}

fn half_rad(degrees: f32) -> f32 {
    (degrees as f64 * (core::f64::consts::PI / 180.0) / 2.0) as f32
}

/// `sin(degrees / 2)` in radians, through [`math::sin`].
pub fn sin_half_deg(degrees: f32) -> f32 {
    math::sin(half_rad(degrees))
}

/// `cos(degrees / 2)` in radians, through [`math::cos`].
pub fn cos_half_deg(degrees: f32) -> f32 {
    math::cos(half_rad(degrees))
}

/// `tan(degrees / 2)`, e.g. for a perspective projection's half field of view.
pub fn tan_half_deg(degrees: f32) -> f32 {
    math::tan(half_rad(degrees))
}
