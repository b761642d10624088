//! Rigid bodies and their surface materials.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, PhysicsError};
use crate::shape::{MassData, Shape};
use crate::types::{Aabb, Vec2};

// =============================================================================
// Material
// =============================================================================

/// Contact coefficients of a body's surface.
///
/// Pairs are mixed in the solver: restitution takes the minimum of the two
/// bodies, friction the geometric mean.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub static_friction: f64,
    pub dynamic_friction: f64,
    /// Bounciness in [0, 1]
    pub restitution: f64,
}

impl Material {
    pub const fn new(static_friction: f64, dynamic_friction: f64, restitution: f64) -> Self {
        Self {
            static_friction,
            dynamic_friction,
            restitution,
        }
    }

    /// Coefficients given to every new body.
    pub const fn standard() -> Self {
        Self::new(0.5, 0.3, 0.2)
    }

    /// Slightly slicker surface used for loose polygon debris.
    pub const fn debris() -> Self {
        Self::new(0.4, 0.2, 0.2)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.restitution) {
            return Err(ConfigError::Invalid(format!(
                "restitution must be in [0, 1], got {}",
                self.restitution
            )));
        }
        if self.static_friction < 0.0 || self.dynamic_friction < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "friction must be non-negative, got static={} dynamic={}",
                self.static_friction, self.dynamic_friction
            )));
        }
        Ok(())
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::standard()
    }
}

// =============================================================================
// Body
// =============================================================================

/// A rigid body owning exactly one shape.
///
/// `inv_mass == 0` marks the body as static: integration skips it and the
/// solver treats it as immovable.
#[derive(Debug, Clone)]
pub struct Body {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Radians per second
    pub angular_velocity: f64,
    /// Absolute orientation in radians, mirrored into `shape`'s matrix
    orient: f64,
    pub force: Vec2,
    pub torque: f64,

    pub mass: f64,
    pub inv_mass: f64,
    pub inertia: f64,
    pub inv_inertia: f64,

    pub material: Material,
    shape: Shape,
}

impl Body {
    /// Wrap `shape` in a body at `position`.
    ///
    /// Mass data is derived from the shape and `density`; polygons are
    /// recentered on their centroid in the process.
    pub fn new(
        mut shape: Shape,
        position: Vec2,
        orient: f64,
        density: f64,
    ) -> Result<Self, PhysicsError> {
        let MassData {
            mass,
            inv_mass,
            inertia,
            inv_inertia,
        } = shape.compute_mass(density)?;
        shape.set_orient(orient);

        Ok(Self {
            position,
            velocity: Vec2::ZERO,
            angular_velocity: 0.0,
            orient,
            force: Vec2::ZERO,
            torque: 0.0,
            mass,
            inv_mass,
            inertia,
            inv_inertia,
            material: Material::default(),
            shape,
        })
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn orient(&self) -> f64 {
        self.orient
    }

    /// Only [`set_static`](Self::set_static) makes a body static; heavy
    /// dynamic bodies have a small but non-zero `inv_mass`.
    pub fn is_static(&self) -> bool {
        self.inv_mass == 0.0
    }

    pub fn apply_force(&mut self, f: Vec2) -> &mut Self {
        self.force += f;
        self
    }

    pub fn apply_torque(&mut self, t: f64) -> &mut Self {
        self.torque += t;
        self
    }

    /// Apply `impulse` at `contact_vector` (offset from the center of mass).
    pub fn apply_impulse(&mut self, impulse: Vec2, contact_vector: Vec2) -> &mut Self {
        self.velocity += impulse * self.inv_mass;
        self.angular_velocity += self.inv_inertia * contact_vector.cross(&impulse);
        self
    }

    /// Give the body infinite mass and inertia.
    pub fn set_static(&mut self) -> &mut Self {
        self.mass = 0.0;
        self.inv_mass = 0.0;
        self.inertia = 0.0;
        self.inv_inertia = 0.0;
        self
    }

    /// Set the absolute orientation, keeping the shape's matrix in sync.
    pub fn set_orient(&mut self, radians: f64) -> &mut Self {
        self.orient = radians;
        self.shape.set_orient(radians);
        self
    }

    pub fn set_material(&mut self, material: Material) -> &mut Self {
        self.material = material;
        self
    }

    pub fn clear_forces(&mut self) {
        self.force = Vec2::ZERO;
        self.torque = 0.0;
    }

    pub fn aabb(&self) -> Aabb {
        self.shape.aabb(self.position)
    }

    /// World-space polygon outline; empty for circles.
    pub fn world_vertices(&self) -> Vec<Vec2> {
        self.shape.world_vertices(self.position)
    }

    /// True while the center is inside `bounds` or the whole shape is.
    /// A body only leaves once its center has left.
    pub fn is_within(&self, bounds: &Aabb) -> bool {
        bounds.contains_point(self.position) || bounds.contains(&self.aabb())
    }
}

// =============================================================================
// Tests
// =============================================================================
