//! Core math types for the 2D simulation.
//!
//! Screen-space conventions:
//! - X grows to the right
//! - Y grows downward (gravity is a positive Y acceleration)
//! - Angles are in radians; a positive angle rotates X toward Y
//!
//! Units are whatever the host uses for positions (pixels in a canvas host);
//! the engine only assumes they are consistent.

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

// =============================================================================
// Vec2 - 2D Vector
// =============================================================================

/// A 2D vector used for positions, velocities, forces and normals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared length (avoids sqrt for comparisons)
    pub fn length_squared(&self) -> f64 {
        self.x * self.x + self.y * self.y
    }

    pub fn length(&self) -> f64 {
        self.length_squared().sqrt()
    }

    /// Returns a unit vector in the same direction, or zero if the length is ~0.
    ///
    /// The zero fallback matters for friction: a contact with no tangential
    /// motion has no tangent direction.
    pub fn normalized(&self) -> Self {
        let len = self.length();
        if len > constants::EPSILON {
            *self / len
        } else {
            Self::ZERO
        }
    }

    pub fn dot(&self, other: &Self) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// 2D cross product (z component of the 3D cross product).
    pub fn cross(&self, other: &Self) -> f64 {
        self.x * other.y - self.y * other.x
    }

    /// `self × s`, treating `s` as a vector along +Z.
    pub fn cross_scalar(&self, s: f64) -> Self {
        Self::new(s * self.y, -s * self.x)
    }

    /// `s × v`, treating `s` as an angular velocity along +Z.
    pub fn scalar_cross(s: f64, v: &Self) -> Self {
        Self::new(-s * v.y, s * v.x)
    }

    pub fn distance_squared(&self, other: &Self) -> f64 {
        (*self - *other).length_squared()
    }
}

impl Add for Vec2 {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, other: Self) {
        self.x += other.x;
        self.y += other.y;
    }
}

impl Sub for Vec2 {
    type Output = Self;
    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }
}

impl SubAssign for Vec2 {
    fn sub_assign(&mut self, other: Self) {
        self.x -= other.x;
        self.y -= other.y;
    }
}

impl Mul<f64> for Vec2 {
    type Output = Self;
    fn mul(self, scalar: f64) -> Self {
        Self::new(self.x * scalar, self.y * scalar)
    }
}

impl Div<f64> for Vec2 {
    type Output = Self;
    fn div(self, scalar: f64) -> Self {
        Self::new(self.x / scalar, self.y / scalar)
    }
}

impl Neg for Vec2 {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

impl Default for Vec2 {
    fn default() -> Self {
        Self::ZERO
    }
}

impl From<(f64, f64)> for Vec2 {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

// =============================================================================
// Mat2 - 2x2 rotation matrix
// =============================================================================

/// Orientation of a shape, mapping model space to world space.
///
/// ```text
/// | m00 m01 |   | cos θ  -sin θ |
/// | m10 m11 | = | sin θ   cos θ |
/// ```
///
/// Only ever built from an angle, so it stays orthonormal and its transpose
/// is its inverse.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Mat2 {
    pub m00: f64,
    pub m01: f64,
    pub m10: f64,
    pub m11: f64,
}

impl Mat2 {
    pub const IDENTITY: Mat2 = Mat2 {
        m00: 1.0,
        m01: 0.0,
        m10: 0.0,
        m11: 1.0,
    };

    pub fn from_angle(radians: f64) -> Self {
        let mut m = Self::IDENTITY;
        m.set(radians);
        m
    }

    /// Reset to the absolute rotation `radians`.
    pub fn set(&mut self, radians: f64) {
        let (s, c) = radians.sin_cos();
        self.m00 = c;
        self.m01 = -s;
        self.m10 = s;
        self.m11 = c;
    }

    /// Element-wise absolute value.
    pub fn abs(&self) -> Self {
        Self {
            m00: self.m00.abs(),
            m01: self.m01.abs(),
            m10: self.m10.abs(),
            m11: self.m11.abs(),
        }
    }

    pub fn axis_x(&self) -> Vec2 {
        Vec2::new(self.m00, self.m10)
    }

    pub fn axis_y(&self) -> Vec2 {
        Vec2::new(self.m01, self.m11)
    }

    pub fn transpose(&self) -> Self {
        Self {
            m00: self.m00,
            m01: self.m10,
            m10: self.m01,
            m11: self.m11,
        }
    }

    pub fn mul_vec(&self, v: Vec2) -> Vec2 {
        Vec2::new(
            self.m00 * v.x + self.m01 * v.y,
            self.m10 * v.x + self.m11 * v.y,
        )
    }

    pub fn mul_mat(&self, rhs: &Mat2) -> Mat2 {
        Mat2 {
            m00: self.m00 * rhs.m00 + self.m01 * rhs.m10,
            m01: self.m00 * rhs.m01 + self.m01 * rhs.m11,
            m10: self.m10 * rhs.m00 + self.m11 * rhs.m10,
            m11: self.m10 * rhs.m01 + self.m11 * rhs.m11,
        }
    }
}

impl Mul<Vec2> for Mat2 {
    type Output = Vec2;
    fn mul(self, v: Vec2) -> Vec2 {
        self.mul_vec(v)
    }
}

impl Mul for Mat2 {
    type Output = Mat2;
    fn mul(self, rhs: Mat2) -> Mat2 {
        self.mul_mat(&rhs)
    }
}

impl Default for Mat2 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

// =============================================================================
// Aabb - axis-aligned bounding box
// =============================================================================

/// World-space axis-aligned bounds of a shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Rectangle from a corner and a size, as canvas hosts describe them.
    pub fn from_rect(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(Vec2::new(x, y), Vec2::new(x + width, y + height))
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn contains_point(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// True if `other` lies entirely inside `self`.
    pub fn contains(&self, other: &Aabb) -> bool {
        self.contains_point(other.min) && self.contains_point(other.max)
    }
}

// =============================================================================
// Physical Constants
// =============================================================================

/// Constants shared by the detection and resolution code.
pub mod constants {
    /// Small value for floating-point comparisons
    pub const EPSILON: f64 = 1e-4;

    /// Scale applied to the base gravity of 10 units/s²
    pub const GRAVITY_SCALE: f64 = 5.0;

    /// Default downward acceleration (Y grows downward)
    pub const GRAVITY: f64 = 10.0 * GRAVITY_SCALE;

    /// Default fixed timestep (60 Hz)
    pub const DEFAULT_DT: f64 = 1.0 / 60.0;

    /// Default number of solver passes per step
    pub const DEFAULT_ITERATIONS: usize = 10;

    /// Default density used to derive mass from shape area
    pub const DEFAULT_DENSITY: f64 = 1.0;

    /// Penetration allowed before positional correction kicks in
    pub const PENETRATION_SLOP: f64 = 0.05;

    /// Fraction of the remaining penetration corrected each step
    pub const CORRECTION_PERCENT: f64 = 0.4;

    /// Reference-face selection keeps face A unless B is clearly deeper
    pub const BIAS_RELATIVE: f64 = 0.95;
    pub const BIAS_ABSOLUTE: f64 = 0.01;

    /// Upper bound on polygon vertex count
    pub const MAX_POLY_VERTEX_COUNT: usize = 64;
}

// =============================================================================
// Tests
// =============================================================================
