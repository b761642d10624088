//! The simulation world: owns the bodies and advances them one fixed tick
//! at a time.
//!
//! ## Step pipeline
//!
//! ```text
//! 1. contacts   all pairs (i < j) with a dynamic body -> dispatch -> keep touching
//! 2. forces     v += (F·im + g)·dt/2
//! 3. initialize mix materials, detect resting contacts
//! 4. solve      `iterations` passes of apply_impulse over every manifold
//! 5. velocity   x += v·dt, θ += ω·dt, then the second force half-step
//! 6. correct    positional correction on every manifold
//! 7. clear      zero accumulated force and torque
//! ```
//!
//! The pair loop is brute force. Manifolds are rebuilt from scratch every
//! step and always visited in the same order, so a world built the same way
//! replays bit for bit.

use std::f64::consts::PI;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, instrument, trace};

use crate::body::Body;
use crate::collision::Manifold;
use crate::config::WorldConfig;
use crate::error::{ConfigError, PhysicsError};
use crate::integrator::SymplecticEuler;
use crate::shape::Shape;
use crate::types::Vec2;

pub struct World {
    config: WorldConfig,
    bodies: Vec<Body>,
    contacts: Vec<Manifold>,
    rng: StdRng,
}

impl World {
    /// Default world with the given timestep and solver iteration count.
    pub fn new(dt: f64, iterations: usize) -> Result<Self, ConfigError> {
        Self::with_config(WorldConfig::with_timestep(dt, iterations))
    }

    pub fn with_config(config: WorldConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            rng: StdRng::seed_from_u64(config.seed),
            config,
            bodies: Vec::new(),
            contacts: Vec::new(),
        })
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn gravity(&self) -> Vec2 {
        self.config.gravity
    }

    /// Create a body for `shape` at `(x, y)` and hand it back for further
    /// setup (material, static flag, orientation).
    ///
    /// The body starts with a random orientation drawn from the world's
    /// seeded generator.
    pub fn add(&mut self, shape: Shape, x: f64, y: f64) -> Result<&mut Body, PhysicsError> {
        let orient = self.rng.gen_range(-PI..PI);
        let shape_type = shape.shape_type();
        let body = Body::new(shape, Vec2::new(x, y), orient, self.config.density)?;

        let index = self.bodies.len();
        debug!(index, ?shape_type, mass = body.mass, "added body");
        self.bodies.push(body);
        Ok(&mut self.bodies[index])
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn body(&self, index: usize) -> Option<&Body> {
        self.bodies.get(index)
    }

    pub fn body_mut(&mut self, index: usize) -> Option<&mut Body> {
        self.bodies.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Manifolds from the last step, for drawing contact points and normals.
    pub fn contacts(&self) -> &[Manifold] {
        &self.contacts
    }

    /// Keep only the bodies matching `keep`. Contacts from the last step
    /// are dropped since their indices no longer hold.
    pub fn retain<F>(&mut self, keep: F)
    where
        F: FnMut(&Body) -> bool,
    {
        self.bodies.retain(keep);
        self.contacts.clear();
    }

    pub fn clear(&mut self) {
        self.bodies.clear();
        self.contacts.clear();
    }

    /// Advance the simulation by one fixed timestep.
    #[instrument(level = "trace", skip(self), fields(bodies = self.bodies.len()))]
    pub fn step(&mut self) {
        let dt = self.config.dt;
        let gravity = self.config.gravity;

        self.generate_contacts();

        for body in &mut self.bodies {
            SymplecticEuler::integrate_forces(body, gravity, dt);
        }

        for manifold in &mut self.contacts {
            manifold.initialize(&self.bodies, gravity, dt);
        }

        for _ in 0..self.config.iterations {
            for manifold in &mut self.contacts {
                manifold.apply_impulse(&mut self.bodies);
            }
        }

        for body in &mut self.bodies {
            SymplecticEuler::integrate_velocity(body, gravity, dt);
        }

        for manifold in &self.contacts {
            manifold.positional_correction(
                &mut self.bodies,
                self.config.slop,
                self.config.correction_percent,
            );
        }

        for body in &mut self.bodies {
            body.clear_forces();
        }

        trace!(contacts = self.contacts.len(), "step complete");
    }

    fn generate_contacts(&mut self) {
        self.contacts.clear();

        for (i, a) in self.bodies.iter().enumerate() {
            for (j, b) in self.bodies.iter().enumerate().skip(i + 1) {
                if a.is_static() && b.is_static() {
                    continue;
                }

                let mut manifold = Manifold::new(i, j);
                manifold.solve(a, b);
                if manifold.is_touching() {
                    self.contacts.push(manifold);
                }
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::constants;

    fn world() -> World {
        World::new(constants::DEFAULT_DT, constants::DEFAULT_ITERATIONS).unwrap()
    }

    #[test]
    fn test_new_rejects_bad_timestep() {
        assert!(World::new(0.0, 10).is_err());
        assert!(World::new(1.0 / 60.0, 0).is_err());
    }

    #[test]
    fn test_add_returns_configurable_body() {
        let mut world = world();
        let body = world.add(Shape::circle(5.0), 10.0, 20.0).unwrap();
        assert_eq!(body.position, Vec2::new(10.0, 20.0));
        assert!(
            (-PI..PI).contains(&body.orient()),
            "orientation {} out of range",
            body.orient()
        );

        body.set_static().set_orient(0.0);
        assert!(world.bodies()[0].is_static());
        assert_eq!(world.body(0).unwrap().orient(), 0.0);
        assert_eq!(world.len(), 1);
    }

    #[test]
    fn test_add_invalid_shape_leaves_world_unchanged() {
        let mut world = world();
        let result = world.add(Shape::circle(0.0), 0.0, 0.0);
        assert!(matches!(result, Err(PhysicsError::InvalidRadius(_))));
        assert!(world.is_empty());
    }

    #[test]
    fn test_free_fall_under_gravity() {
        let mut world = world();
        world.add(Shape::circle(1.0), 0.0, 0.0).unwrap();
        for _ in 0..60 {
            world.step();
        }

        let body = &world.bodies()[0];
        assert!(
            (body.velocity.y - constants::GRAVITY).abs() < 1e-9,
            "Expected vy={}, got {}",
            constants::GRAVITY,
            body.velocity.y
        );
        assert!(body.position.y > 0.0, "y grows downward");
        assert!(world.contacts().is_empty());
    }

    #[test]
    fn test_heavy_box_falls() {
        let mut world = world();
        world.add(Shape::rect(60.0, 60.0), 400.0, 100.0).unwrap().set_orient(0.0);
        assert!(world.bodies()[0].mass > 10_000.0);

        for _ in 0..60 {
            world.step();
        }

        let body = &world.bodies()[0];
        assert!(!body.is_static());
        assert!(
            body.position.y > 120.0,
            "heavy box should fall under gravity, at {:?}",
            body.position
        );
    }

    #[test]
    fn test_heavy_boxes_collide() {
        let mut world = world();
        world.add(Shape::rect(60.0, 60.0), 400.0, 100.0).unwrap().set_orient(0.0);
        world
            .add(Shape::rect(60.0, 60.0), 500.0, 100.0)
            .unwrap()
            .set_orient(0.0)
            .velocity = Vec2::new(-100.0, 0.0);

        world.step();

        assert_eq!(world.contacts().len(), 1, "overlapping heavy boxes must touch");
        assert!(
            world.bodies()[1].velocity.x > -100.0,
            "moving box should be slowed, got {:?}",
            world.bodies()[1].velocity
        );
        assert!(world.bodies()[0].velocity.x < 0.0);
    }

    #[test]
    fn test_static_pair_never_moves() {
        let mut world = world();
        world.add(Shape::rect(10.0, 10.0), 0.0, 0.0).unwrap().set_static();
        world.add(Shape::rect(10.0, 10.0), 5.0, 5.0).unwrap().set_static();
        let before: Vec<Vec2> = world.bodies().iter().map(|b| b.position).collect();

        for _ in 0..100 {
            world.step();
        }

        let after: Vec<Vec2> = world.bodies().iter().map(|b| b.position).collect();
        assert_eq!(before, after);
        assert!(world.contacts().is_empty(), "static pairs are not tested");
    }

    #[test]
    fn test_overlapping_bodies_produce_contact() {
        let mut world = world();
        world.add(Shape::circle(5.0), 0.0, 0.0).unwrap();
        world.add(Shape::circle(5.0), 8.0, 0.0).unwrap();
        world.step();

        assert_eq!(world.contacts().len(), 1);
        let m = &world.contacts()[0];
        assert_eq!((m.a, m.b), (0, 1));
        assert!(world.bodies()[0].position.x < 0.0, "pushed apart");
        assert!(world.bodies()[1].position.x > 8.0, "pushed apart");
    }

    #[test]
    fn test_forces_cleared_after_step() {
        let mut world = world();
        world
            .add(Shape::circle(1.0), 0.0, 0.0)
            .unwrap()
            .apply_force(Vec2::new(100.0, 0.0))
            .apply_torque(5.0);
        world.step();

        let body = &world.bodies()[0];
        assert_eq!(body.force, Vec2::ZERO);
        assert_eq!(body.torque, 0.0);
        assert!(body.velocity.x > 0.0);
    }

    #[test]
    fn test_same_seed_same_orientations() {
        let mut a = world();
        let mut b = world();
        for i in 0..5 {
            let x = i as f64 * 10.0;
            let oa = a.add(Shape::rect(1.0, 1.0), x, 0.0).unwrap().orient();
            let ob = b.add(Shape::rect(1.0, 1.0), x, 0.0).unwrap().orient();
            assert_eq!(oa, ob);
        }

        let config = WorldConfig {
            seed: 99,
            ..WorldConfig::default()
        };
        let mut c = World::with_config(config).unwrap();
        let oc = c.add(Shape::rect(1.0, 1.0), 0.0, 0.0).unwrap().orient();
        assert_ne!(oc, a.bodies()[0].orient(), "different seed, different draw");
    }

    #[test]
    fn test_retain_and_clear() {
        let mut world = world();
        world.add(Shape::circle(1.0), 0.0, 0.0).unwrap();
        world.add(Shape::circle(1.0), 1.0, 0.0).unwrap();
        world.add(Shape::circle(1.0), 500.0, 0.0).unwrap();
        world.step();
        assert!(!world.contacts().is_empty());

        world.retain(|b| b.position.x < 100.0);
        assert_eq!(world.len(), 2);
        assert!(world.contacts().is_empty());

        world.clear();
        assert!(world.is_empty());
        assert!(world.body_mut(0).is_none());
    }
}
