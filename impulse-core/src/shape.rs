//! Collision shapes: circles and convex polygons.
//!
//! A shape only knows its model-space geometry and its orientation `u`.
//! Anything that depends on where the shape is in the world (AABB, world
//! vertices) takes the owning body's position as an argument.
//!
//! ## Polygon winding
//!
//! Polygons are stored counter-clockwise (in a Y-up frame) with one outward
//! unit normal per edge `i -> i+1`:
//!
//! ```text
//!   v3 ─────── v2
//!   │    n2↑    │
//!   │←n3   n1→  │
//!   │    n0↓    │
//!   v0 ─────── v1
//! ```

use serde::{Deserialize, Serialize};

use crate::error::PhysicsError;
use crate::types::{constants, Aabb, Mat2, Vec2};

/// Discriminant used by the collision dispatch table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeType {
    Circle,
    Polygon,
}

/// Mass and rotational inertia derived from a shape and a density.
///
/// Inverses are zero when the quantity itself is zero, so a massless
/// shape behaves like an immovable one instead of producing infinities.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MassData {
    pub mass: f64,
    pub inv_mass: f64,
    pub inertia: f64,
    pub inv_inertia: f64,
}

impl MassData {
    pub fn new(mass: f64, inertia: f64) -> Self {
        Self {
            mass,
            inv_mass: if mass != 0.0 { 1.0 / mass } else { 0.0 },
            inertia,
            inv_inertia: if inertia != 0.0 { 1.0 / inertia } else { 0.0 },
        }
    }
}

fn check_density(density: f64) -> Result<(), PhysicsError> {
    if density > 0.0 && density.is_finite() {
        Ok(())
    } else {
        Err(PhysicsError::InvalidDensity(density))
    }
}

// =============================================================================
// Circle
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Circle {
    pub radius: f64,
    /// Orientation; circles only use it to draw a spoke.
    pub u: Mat2,
}

impl Circle {
    pub fn new(radius: f64) -> Self {
        Self {
            radius,
            u: Mat2::IDENTITY,
        }
    }

    /// `m = π·r²·ρ`, `I = m·r²`.
    pub fn compute_mass(&self, density: f64) -> Result<MassData, PhysicsError> {
        if !(self.radius > 0.0 && self.radius.is_finite()) {
            return Err(PhysicsError::InvalidRadius(self.radius));
        }
        check_density(density)?;
        let r2 = self.radius * self.radius;
        let mass = std::f64::consts::PI * r2 * density;
        Ok(MassData::new(mass, mass * r2))
    }

    pub fn aabb(&self, position: Vec2) -> Aabb {
        let r = Vec2::new(self.radius, self.radius);
        Aabb::new(position - r, position + r)
    }

    /// Point on the rim marking the circle's current rotation.
    pub fn orientation_marker(&self, position: Vec2) -> Vec2 {
        position + self.u * Vec2::new(self.radius, 0.0)
    }
}

// =============================================================================
// Polygon
// =============================================================================

/// Convex polygon in model space.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Polygon {
    vertices: Vec<Vec2>,
    normals: Vec<Vec2>,
    pub u: Mat2,
}

impl Polygon {
    /// An empty polygon; give it geometry with [`set`](Self::set) or
    /// [`set_box`](Self::set_box).
    pub fn new() -> Self {
        Self::default()
    }

    /// Axis-aligned box with the given half extents.
    pub fn from_box(half_width: f64, half_height: f64) -> Self {
        let mut poly = Self::new();
        poly.set_box(half_width, half_height);
        poly
    }

    /// Convex hull of an arbitrary point set.
    pub fn from_points(points: &[Vec2]) -> Result<Self, PhysicsError> {
        let mut poly = Self::new();
        poly.set(points)?;
        Ok(poly)
    }

    pub fn vertices(&self) -> &[Vec2] {
        &self.vertices
    }

    pub fn normals(&self) -> &[Vec2] {
        &self.normals
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Axis-aligned box; the sign of the extents is ignored so the fixed
    /// normals always point outward.
    pub fn set_box(&mut self, half_width: f64, half_height: f64) -> &mut Self {
        let (hw, hh) = (half_width.abs(), half_height.abs());
        self.vertices = vec![
            Vec2::new(-hw, -hh),
            Vec2::new(hw, -hh),
            Vec2::new(hw, hh),
            Vec2::new(-hw, hh),
        ];
        self.normals = vec![
            Vec2::new(0.0, -1.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(0.0, 1.0),
            Vec2::new(-1.0, 0.0),
        ];
        self
    }

    /// Replace the geometry with the convex hull of `points` (gift wrapping).
    ///
    /// Interior points are dropped, and so are points in the middle of a
    /// colinear run: the wrap always prefers the farther of two colinear
    /// candidates.
    pub fn set(&mut self, points: &[Vec2]) -> Result<&mut Self, PhysicsError> {
        let count = points.len();
        if count < 3 {
            return Err(PhysicsError::TooFewVertices(count));
        }
        if count > constants::MAX_POLY_VERTEX_COUNT {
            return Err(PhysicsError::TooManyVertices(count));
        }

        // Rightmost point, lowest Y on ties
        let mut right_most = 0;
        let mut highest_x = points[0].x;
        for (i, p) in points.iter().enumerate().skip(1) {
            if p.x > highest_x {
                highest_x = p.x;
                right_most = i;
            } else if (p.x - highest_x).abs() <= constants::EPSILON && p.y < points[right_most].y {
                right_most = i;
            }
        }

        let mut hull: Vec<usize> = Vec::with_capacity(count);
        let mut index_hull = right_most;
        loop {
            hull.push(index_hull);
            // Duplicated points can make the wrap miss its start
            if hull.len() > count {
                return Err(PhysicsError::DegenerateHull(hull.len()));
            }

            let origin = points[index_hull];
            let mut next = 0;
            for i in 1..count {
                // Need three distinct indices for a cross product
                if next == index_hull {
                    next = i;
                    continue;
                }
                let e1 = points[next] - origin;
                let e2 = points[i] - origin;
                let c = e1.cross(&e2);
                if c < 0.0 {
                    next = i;
                }
                // Colinear: keep the farther point
                if c.abs() <= constants::EPSILON && e2.length_squared() > e1.length_squared() {
                    next = i;
                }
            }

            index_hull = next;
            if next == right_most {
                break;
            }
        }

        if hull.len() < 3 {
            return Err(PhysicsError::DegenerateHull(hull.len()));
        }

        let vertices: Vec<Vec2> = hull.iter().map(|&i| points[i]).collect();
        let mut normals = Vec::with_capacity(vertices.len());
        for i1 in 0..vertices.len() {
            let i2 = (i1 + 1) % vertices.len();
            let face = vertices[i2] - vertices[i1];
            let length_sq = face.length_squared();
            if length_sq <= constants::EPSILON * constants::EPSILON {
                return Err(PhysicsError::DegenerateEdge { index: i1, length_sq });
            }
            normals.push(Vec2::new(face.y, -face.x).normalized());
        }

        self.vertices = vertices;
        self.normals = normals;
        Ok(self)
    }

    /// Vertex (model space) with the largest projection onto `dir`.
    /// Ties go to the first vertex found.
    pub fn support(&self, dir: Vec2) -> Vec2 {
        let mut best_projection = f64::NEG_INFINITY;
        let mut best_vertex = Vec2::ZERO;
        for v in &self.vertices {
            let projection = v.dot(&dir);
            if projection > best_projection {
                best_vertex = *v;
                best_projection = projection;
            }
        }
        best_vertex
    }

    /// Area-weighted centroid and mass data, computed by fanning triangles
    /// from the model-space origin.
    pub fn mass_properties(&self, density: f64) -> Result<(Vec2, MassData), PhysicsError> {
        check_density(density)?;
        let n = self.vertices.len();
        if n < 3 {
            return Err(PhysicsError::TooFewVertices(n));
        }

        const INV3: f64 = 1.0 / 3.0;
        let mut centroid = Vec2::ZERO;
        let mut area = 0.0;
        let mut inertia = 0.0;

        for i1 in 0..n {
            let p1 = self.vertices[i1];
            let p2 = self.vertices[(i1 + 1) % n];

            let d = p1.cross(&p2);
            let triangle_area = 0.5 * d;
            area += triangle_area;

            centroid += (p1 + p2) * (triangle_area * INV3);

            let intx2 = p1.x * p1.x + p2.x * p1.x + p2.x * p2.x;
            let inty2 = p1.y * p1.y + p2.y * p1.y + p2.y * p2.y;
            inertia += (0.25 * INV3 * d) * (intx2 + inty2);
        }

        if area.abs() <= constants::EPSILON {
            return Err(PhysicsError::DegenerateArea(area));
        }

        centroid = centroid / area;
        Ok((centroid, MassData::new(density * area, density * inertia)))
    }

    /// One-time normalization done when the polygon is attached to a body:
    /// computes mass data, then moves the vertices so the centroid sits at
    /// the model-space origin.
    pub fn finalize(&mut self, density: f64) -> Result<MassData, PhysicsError> {
        let (centroid, mass) = self.mass_properties(density)?;
        for v in &mut self.vertices {
            *v -= centroid;
        }
        Ok(mass)
    }

    pub fn world_vertices(&self, position: Vec2) -> Vec<Vec2> {
        self.vertices
            .iter()
            .map(|v| position + self.u * *v)
            .collect()
    }

    /// Recomputed from the world vertices on every call.
    pub fn aabb(&self, position: Vec2) -> Aabb {
        let mut min = Vec2::new(f64::INFINITY, f64::INFINITY);
        let mut max = Vec2::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
        for p in self.world_vertices(position) {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        Aabb::new(min, max)
    }
}

// =============================================================================
// Shape
// =============================================================================

/// Closed set of collision shapes a body can own.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Circle(Circle),
    Polygon(Polygon),
}

impl Shape {
    pub fn circle(radius: f64) -> Self {
        Shape::Circle(Circle::new(radius))
    }

    pub fn rect(half_width: f64, half_height: f64) -> Self {
        Shape::Polygon(Polygon::from_box(half_width, half_height))
    }

    pub fn polygon(points: &[Vec2]) -> Result<Self, PhysicsError> {
        Ok(Shape::Polygon(Polygon::from_points(points)?))
    }

    pub fn shape_type(&self) -> ShapeType {
        match self {
            Shape::Circle(_) => ShapeType::Circle,
            Shape::Polygon(_) => ShapeType::Polygon,
        }
    }

    pub fn is_circular(&self) -> bool {
        matches!(self, Shape::Circle(_))
    }

    pub fn as_circle(&self) -> Option<&Circle> {
        match self {
            Shape::Circle(c) => Some(c),
            Shape::Polygon(_) => None,
        }
    }

    pub fn as_polygon(&self) -> Option<&Polygon> {
        match self {
            Shape::Polygon(p) => Some(p),
            Shape::Circle(_) => None,
        }
    }

    pub fn orientation(&self) -> &Mat2 {
        match self {
            Shape::Circle(c) => &c.u,
            Shape::Polygon(p) => &p.u,
        }
    }

    /// Set the rotation from an absolute angle (not a delta).
    pub fn set_orient(&mut self, radians: f64) -> &mut Self {
        match self {
            Shape::Circle(c) => c.u.set(radians),
            Shape::Polygon(p) => p.u.set(radians),
        }
        self
    }

    /// Mass data for `density`. Polygons are recentered on their centroid
    /// as part of this call, see [`Polygon::finalize`].
    pub fn compute_mass(&mut self, density: f64) -> Result<MassData, PhysicsError> {
        match self {
            Shape::Circle(c) => c.compute_mass(density),
            Shape::Polygon(p) => p.finalize(density),
        }
    }

    pub fn aabb(&self, position: Vec2) -> Aabb {
        match self {
            Shape::Circle(c) => c.aabb(position),
            Shape::Polygon(p) => p.aabb(position),
        }
    }

    /// Polygon outline in world space; circles have none.
    pub fn world_vertices(&self, position: Vec2) -> Vec<Vec2> {
        match self {
            Shape::Circle(_) => Vec::new(),
            Shape::Polygon(p) => p.world_vertices(position),
        }
    }
}

impl From<Circle> for Shape {
    fn from(c: Circle) -> Self {
        Shape::Circle(c)
    }
}

impl From<Polygon> for Shape {
    fn from(p: Polygon) -> Self {
        Shape::Polygon(p)
    }
}

// =============================================================================
// Tests
// =============================================================================
