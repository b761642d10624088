//! Per-pair contact record.

use crate::body::Body;
use crate::collision::detection;
use crate::types::Vec2;

/// Contact between bodies `a` and `b` (indices into the world's body list).
///
/// Rebuilt from scratch every step. The normal points from A to B.
#[derive(Debug, Clone, PartialEq)]
pub struct Manifold {
    pub a: usize,
    pub b: usize,
    pub penetration: f64,
    pub normal: Vec2,
    pub contacts: [Vec2; 2],
    pub contact_count: usize,
    /// Mixed restitution
    pub e: f64,
    /// Mixed dynamic friction
    pub df: f64,
    /// Mixed static friction
    pub sf: f64,
}

impl Manifold {
    pub fn new(a: usize, b: usize) -> Self {
        Self {
            a,
            b,
            penetration: 0.0,
            normal: Vec2::ZERO,
            contacts: [Vec2::ZERO; 2],
            contact_count: 0,
            e: 0.0,
            df: 0.0,
            sf: 0.0,
        }
    }

    /// Run narrow-phase detection for the pair and fill in the geometry.
    pub fn solve(&mut self, body_a: &Body, body_b: &Body) -> &mut Self {
        let handler = detection::dispatch(body_a.shape().shape_type(), body_b.shape().shape_type());
        handler(self, body_a, body_b);
        self
    }

    pub fn is_touching(&self) -> bool {
        self.contact_count > 0
    }

    /// The contact points actually in use.
    pub fn active_contacts(&self) -> &[Vec2] {
        &self.contacts[..self.contact_count]
    }
}
