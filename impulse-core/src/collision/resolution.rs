//! Contact resolution: the sequential-impulse solver.
//!
//! ## Per step
//!
//! 1. [`Manifold::initialize`] mixes the pair's materials and decides
//!    whether the contact is resting.
//! 2. [`Manifold::apply_impulse`] runs once per solver iteration. Each pass
//!    removes approaching velocity along the normal, then applies Coulomb
//!    friction along the tangent.
//! 3. [`Manifold::positional_correction`] nudges positions apart once, after
//!    velocities have been integrated.
//!
//! ```text
//!          n
//!          ^        ra = contact - A.position
//!     A    |        rb = contact - B.position
//!   ---*---+---     rv = vB + ωB × rb - vA - ωA × ra
//!          |
//!     B    v  impulse  j·n  on B, -j·n on A
//! ```
//!
//! Manifolds hold body indices, so every routine takes the world's body
//! slice and borrows the two bodies it needs.

use tracing::warn;

use crate::body::Body;
use crate::collision::manifold::Manifold;
use crate::types::{constants, Vec2};

/// Mutable borrows of two distinct bodies, `a < b`.
fn pair_mut(bodies: &mut [Body], a: usize, b: usize) -> (&mut Body, &mut Body) {
    assert!(a < b, "manifold indices out of order: {a} >= {b}");
    let (left, right) = bodies.split_at_mut(b);
    (&mut left[a], &mut right[0])
}

/// Velocity of B relative to A at the given lever arms.
fn relative_velocity(a: &Body, b: &Body, ra: Vec2, rb: Vec2) -> Vec2 {
    b.velocity + Vec2::scalar_cross(b.angular_velocity, &rb)
        - a.velocity
        - Vec2::scalar_cross(a.angular_velocity, &ra)
}

impl Manifold {
    /// Mix materials and detect resting contact.
    ///
    /// Restitution is dropped to zero when the relative speed at any contact
    /// is no more than what one step of gravity would produce.
    pub fn initialize(&mut self, bodies: &[Body], gravity: Vec2, dt: f64) {
        let a = &bodies[self.a];
        let b = &bodies[self.b];

        self.e = a.material.restitution.min(b.material.restitution);
        self.sf = (a.material.static_friction * b.material.static_friction).sqrt();
        self.df = (a.material.dynamic_friction * b.material.dynamic_friction).sqrt();

        let resting_threshold = (gravity * dt).length_squared() + constants::EPSILON;
        let resting = self.active_contacts().iter().any(|&contact| {
            let rv = relative_velocity(a, b, contact - a.position, contact - b.position);
            rv.length_squared() < resting_threshold
        });
        if resting {
            self.e = 0.0;
        }
    }

    /// One solver pass over this manifold's contacts.
    pub fn apply_impulse(&mut self, bodies: &mut [Body]) {
        if bodies[self.a].is_static() && bodies[self.b].is_static() {
            warn!(a = self.a, b = self.b, "solving a contact between two static bodies");
            self.infinite_mass_correction(bodies);
            return;
        }

        let (a, b) = pair_mut(bodies, self.a, self.b);

        let count = self.contact_count as f64;
        let normal = self.normal;

        for i in 0..self.contact_count {
            let contact = self.contacts[i];
            let ra = contact - a.position;
            let rb = contact - b.position;

            let rv = relative_velocity(a, b, ra, rb);
            let contact_vel = rv.dot(&normal);

            // Already separating
            if contact_vel > 0.0 {
                continue;
            }

            let ra_cross_n = ra.cross(&normal);
            let rb_cross_n = rb.cross(&normal);
            let inv_mass_sum = a.inv_mass
                + b.inv_mass
                + ra_cross_n * ra_cross_n * a.inv_inertia
                + rb_cross_n * rb_cross_n * b.inv_inertia;

            // Normal impulse, shared evenly between the contacts
            let j = -(1.0 + self.e) * contact_vel / inv_mass_sum / count;
            let impulse = normal * j;
            a.apply_impulse(-impulse, ra);
            b.apply_impulse(impulse, rb);

            // Friction
            let rv = relative_velocity(a, b, ra, rb);
            let tangent = (rv - normal * rv.dot(&normal)).normalized();

            let jt = -rv.dot(&tangent) / inv_mass_sum / count;
            if jt.abs() <= constants::EPSILON {
                continue;
            }

            // Coulomb: stick inside the static cone, slide outside it
            let tangent_impulse = if jt.abs() < j * self.sf {
                tangent * jt
            } else {
                tangent * (-j * self.df)
            };

            a.apply_impulse(-tangent_impulse, ra);
            b.apply_impulse(tangent_impulse, rb);
        }
    }

    /// Push the bodies apart along the normal in proportion to how far the
    /// penetration exceeds `slop`, weighted by inverse mass.
    pub fn positional_correction(&self, bodies: &mut [Body], slop: f64, percent: f64) {
        let (a, b) = pair_mut(bodies, self.a, self.b);

        let inv_mass_sum = a.inv_mass + b.inv_mass;
        if inv_mass_sum == 0.0 {
            return;
        }

        let correction =
            self.normal * ((self.penetration - slop).max(0.0) / inv_mass_sum * percent);
        a.position -= correction * a.inv_mass;
        b.position += correction * b.inv_mass;
    }

    /// Stop both bodies outright.
    pub fn infinite_mass_correction(&self, bodies: &mut [Body]) {
        let (a, b) = pair_mut(bodies, self.a, self.b);
        a.velocity = Vec2::ZERO;
        b.velocity = Vec2::ZERO;
    }
}

// =============================================================================
// Tests
// =============================================================================
