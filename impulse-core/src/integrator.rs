//! Time integration for rigid bodies.
//!
//! Semi-implicit (symplectic) Euler, split into two half-steps of force
//! integration around the position update:
//!
//! ```text
//! 1. v += (F·im + g) · dt/2      ω += τ·iI · dt/2      integrate_forces
//!    ... contact impulses ...
//! 2. x += v·dt                   θ += ω·dt             integrate_velocity
//! 3. v += (F·im + g) · dt/2      ω += τ·iI · dt/2      (second half)
//! ```
//!
//! Static bodies (`im == 0`) are skipped entirely, gravity included.

use crate::body::Body;
use crate::types::{constants, Vec2};

/// Semi-implicit Euler integrator.
pub struct SymplecticEuler;

impl SymplecticEuler {
    /// Half-step of accumulated force, torque and gravity into velocity.
    pub fn integrate_forces(body: &mut Body, gravity: Vec2, dt: f64) {
        if body.is_static() {
            return;
        }

        let half_dt = dt / 2.0;
        body.velocity += (body.force * body.inv_mass + gravity) * half_dt;
        body.angular_velocity += body.torque * body.inv_inertia * half_dt;
    }

    /// Full step of velocity into position and orientation, followed by the
    /// second force half-step.
    pub fn integrate_velocity(body: &mut Body, gravity: Vec2, dt: f64) {
        if body.is_static() {
            return;
        }

        body.position += body.velocity * dt;
        let orient = body.orient() + body.angular_velocity * dt;
        body.set_orient(orient);

        Self::integrate_forces(body, gravity, dt);
    }
}

/// Default downward gravity (y grows downward).
pub fn default_gravity() -> Vec2 {
    Vec2::new(0.0, constants::GRAVITY)
}

// =============================================================================
// Tests
// =============================================================================
