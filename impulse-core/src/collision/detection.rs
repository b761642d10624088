//! Narrow-phase collision detection.
//!
//! Each routine looks at one pair of bodies and writes the contact geometry
//! into a [`Manifold`]. A pair that does not touch ends with
//! `contact_count == 0`; that is the normal outcome, not an error.
//!
//! ## Polygon vs polygon
//!
//! Separating-axis test over the face normals of both polygons, then the
//! incident edge of one polygon is clipped against the side planes of the
//! reference face of the other:
//!
//! ```text
//!         y
//!         ^  ->n       ^
//!       +---c ------posPlane--
//!   x < | i |\
//!       +---+ c-----negPlane--
//!              \       v
//!               r
//!
//!   r : reference face
//!   i : incident polygon
//!   c : clipped point
//!   n : incident normal
//! ```

use tracing::trace;

use crate::body::Body;
use crate::collision::manifold::Manifold;
use crate::shape::{Circle, Polygon, ShapeType};
use crate::types::{constants, Vec2};

/// Signature shared by every pairwise routine.
pub type CollisionHandler = fn(&mut Manifold, &Body, &Body);

/// Pick the routine for a pair of shape types.
pub fn dispatch(a: ShapeType, b: ShapeType) -> CollisionHandler {
    match (a, b) {
        (ShapeType::Circle, ShapeType::Circle) => circle_circle,
        (ShapeType::Circle, ShapeType::Polygon) => circle_polygon,
        (ShapeType::Polygon, ShapeType::Circle) => polygon_circle,
        (ShapeType::Polygon, ShapeType::Polygon) => polygon_polygon,
    }
}

/// Biased `a >= b`: near ties go to `b`.
pub fn bias_greater_than(a: f64, b: f64) -> bool {
    a >= b * constants::BIAS_RELATIVE + a * constants::BIAS_ABSOLUTE
}

// =============================================================================
// Circle pairs
// =============================================================================

pub fn circle_circle(m: &mut Manifold, a: &Body, b: &Body) {
    m.contact_count = 0;
    let (Some(ca), Some(cb)) = (a.shape().as_circle(), b.shape().as_circle()) else {
        return;
    };

    let normal = b.position - a.position;
    let dist_sqr = normal.length_squared();
    let radius = ca.radius + cb.radius;

    if dist_sqr >= radius * radius {
        return;
    }

    let distance = dist_sqr.sqrt();
    m.contact_count = 1;

    if distance.abs() <= constants::EPSILON {
        // Concentric: any direction will do
        m.penetration = ca.radius;
        m.normal = Vec2::new(1.0, 0.0);
        m.contacts[0] = a.position;
    } else {
        m.penetration = radius - distance;
        m.normal = normal / distance;
        m.contacts[0] = m.normal * ca.radius + a.position;
    }
}

/// `a` is the circle, `b` the polygon.
pub fn circle_polygon(m: &mut Manifold, a: &Body, b: &Body) {
    m.contact_count = 0;
    let (Some(circle), Some(poly)) = (a.shape().as_circle(), b.shape().as_polygon()) else {
        return;
    };
    circle_against_polygon(m, circle, a.position, poly, b.position);
}

/// `a` is the polygon, `b` the circle. The normal is flipped so it still
/// points from A to B.
pub fn polygon_circle(m: &mut Manifold, a: &Body, b: &Body) {
    circle_polygon(m, b, a);
    m.normal = -m.normal;
}

fn circle_against_polygon(
    m: &mut Manifold,
    circle: &Circle,
    circle_pos: Vec2,
    poly: &Polygon,
    poly_pos: Vec2,
) {
    let radius = circle.radius;
    let verts = poly.vertices();
    let normals = poly.normals();
    let n = verts.len();

    // Circle center in the polygon's model space
    let center = poly.u.transpose() * (circle_pos - poly_pos);

    // Face of least penetration
    let mut separation = f64::NEG_INFINITY;
    let mut face_normal = 0;
    for i in 0..n {
        let s = normals[i].dot(&(center - verts[i]));
        if s > radius {
            return;
        }
        if s > separation {
            separation = s;
            face_normal = i;
        }
    }

    let v1 = verts[face_normal];
    let v2 = verts[(face_normal + 1) % n];

    // Center inside the polygon
    if separation < constants::EPSILON {
        m.contact_count = 1;
        m.normal = -(poly.u * normals[face_normal]);
        m.contacts[0] = m.normal * radius + circle_pos;
        m.penetration = radius;
        return;
    }

    // Voronoi region of the face the center falls in
    let dot1 = (center - v1).dot(&(v2 - v1));
    let dot2 = (center - v2).dot(&(v1 - v2));
    m.penetration = radius - separation;

    if dot1 <= 0.0 {
        // Closest to v1
        if center.distance_squared(&v1) > radius * radius {
            return;
        }
        m.contact_count = 1;
        m.normal = (poly.u * (v1 - center)).normalized();
        m.contacts[0] = poly.u * v1 + poly_pos;
    } else if dot2 <= 0.0 {
        // Closest to v2
        if center.distance_squared(&v2) > radius * radius {
            return;
        }
        m.contact_count = 1;
        m.normal = (poly.u * (v2 - center)).normalized();
        m.contacts[0] = poly.u * v2 + poly_pos;
    } else {
        // Closest to the face
        let face = normals[face_normal];
        if (center - v1).dot(&face) > radius {
            return;
        }
        m.contact_count = 1;
        m.normal = -(poly.u * face);
        m.contacts[0] = m.normal * radius + circle_pos;
    }
}

// =============================================================================
// Polygon pairs
// =============================================================================

/// Face of `a` whose plane is least penetrated by `b`, with its signed
/// distance. A non-negative distance means `a`'s face separates the pair.
pub fn find_axis_least_penetration(
    a: &Polygon,
    a_pos: Vec2,
    b: &Polygon,
    b_pos: Vec2,
) -> (f64, usize) {
    let mut best_distance = f64::NEG_INFINITY;
    let mut best_index = 0;
    let bu_t = b.u.transpose();

    for (i, (normal, vertex)) in a.normals().iter().zip(a.vertices()).enumerate() {
        // Face normal in B's model space
        let n = bu_t * (a.u * *normal);

        // Deepest point of B along -n
        let s = b.support(-n);

        // Face vertex in B's model space
        let v = bu_t * (a.u * *vertex + a_pos - b_pos);

        let d = n.dot(&(s - v));
        if d > best_distance {
            best_distance = d;
            best_index = i;
        }
    }

    (best_distance, best_index)
}

/// World-space endpoints of the incident polygon's edge most anti-parallel
/// to the reference face.
pub fn find_incident_face(
    reference: &Polygon,
    incident: &Polygon,
    incident_pos: Vec2,
    reference_index: usize,
) -> [Vec2; 2] {
    // Reference normal in the incident polygon's frame
    let ref_normal = incident.u.transpose() * (reference.u * reference.normals()[reference_index]);

    let mut incident_face = 0;
    let mut min_dot = f64::INFINITY;
    for (i, normal) in incident.normals().iter().enumerate() {
        let dot = ref_normal.dot(normal);
        if dot < min_dot {
            min_dot = dot;
            incident_face = i;
        }
    }

    let verts = incident.vertices();
    let next = (incident_face + 1) % verts.len();
    [
        incident.u * verts[incident_face] + incident_pos,
        incident.u * verts[next] + incident_pos,
    ]
}

/// Clip segment `face` against the half-plane `n·x <= c`.
///
/// Returns how many points survive; when the segment straddles the plane
/// the crossing point replaces the outside endpoint.
pub fn clip(n: Vec2, c: f64, face: &mut [Vec2; 2]) -> usize {
    let mut out = [face[0], face[1], Vec2::ZERO];
    let mut sp = 0;

    // Signed distance of each endpoint to the line: d = ax + by - c
    let d1 = n.dot(&face[0]) - c;
    let d2 = n.dot(&face[1]) - c;

    if d1 <= 0.0 {
        out[sp] = face[0];
        sp += 1;
    }
    if d2 <= 0.0 {
        out[sp] = face[1];
        sp += 1;
    }

    // Strict comparison so -0.0 does not count as a crossing
    if d1 * d2 < 0.0 {
        let alpha = d1 / (d1 - d2);
        out[sp] = face[0] + (face[1] - face[0]) * alpha;
        sp += 1;
    }

    assert!(sp != 3, "clipping a segment produced three points");
    face[0] = out[0];
    face[1] = out[1];
    sp
}

pub fn polygon_polygon(m: &mut Manifold, a: &Body, b: &Body) {
    m.contact_count = 0;
    let (Some(pa), Some(pb)) = (a.shape().as_polygon(), b.shape().as_polygon()) else {
        return;
    };

    // Separating axis among A's faces
    let (penetration_a, face_a) = find_axis_least_penetration(pa, a.position, pb, b.position);
    if penetration_a >= 0.0 {
        return;
    }

    // Separating axis among B's faces
    let (penetration_b, face_b) = find_axis_least_penetration(pb, b.position, pa, a.position);
    if penetration_b >= 0.0 {
        return;
    }

    // Reference face owner; `flip` keeps the normal pointing from A to B
    let (ref_poly, ref_pos, inc_poly, inc_pos, ref_index, flip) =
        if bias_greater_than(penetration_a, penetration_b) {
            (pa, a.position, pb, b.position, face_a, false)
        } else {
            (pb, b.position, pa, a.position, face_b, true)
        };

    let mut incident_face = find_incident_face(ref_poly, inc_poly, inc_pos, ref_index);

    // Reference face in world space
    let ref_verts = ref_poly.vertices();
    let v1 = ref_poly.u * ref_verts[ref_index] + ref_pos;
    let v2 = ref_poly.u * ref_verts[(ref_index + 1) % ref_verts.len()] + ref_pos;

    let side_plane_normal = (v2 - v1).normalized();
    let ref_face_normal = Vec2::new(side_plane_normal.y, -side_plane_normal.x);

    // ax + by = c, c being the distance from the origin
    let ref_c = ref_face_normal.dot(&v1);
    let neg_side = -side_plane_normal.dot(&v1);
    let pos_side = side_plane_normal.dot(&v2);

    // Floating point error can leave fewer than two points
    if clip(-side_plane_normal, neg_side, &mut incident_face) < 2 {
        trace!("incident edge clipped away on the negative side plane");
        return;
    }
    if clip(side_plane_normal, pos_side, &mut incident_face) < 2 {
        trace!("incident edge clipped away on the positive side plane");
        return;
    }

    m.normal = if flip { -ref_face_normal } else { ref_face_normal };

    // Keep only points behind the reference face
    let mut cp = 0;
    let separation = ref_face_normal.dot(&incident_face[0]) - ref_c;
    if separation <= 0.0 {
        m.contacts[cp] = incident_face[0];
        m.penetration = -separation;
        cp += 1;
    } else {
        m.penetration = 0.0;
    }

    let separation = ref_face_normal.dot(&incident_face[1]) - ref_c;
    if separation <= 0.0 {
        m.contacts[cp] = incident_face[1];
        m.penetration += -separation;
        cp += 1;
        // Average over the points kept so far
        m.penetration /= cp as f64;
    }

    m.contact_count = cp;
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::Shape;
    use proptest::prelude::*;
    use std::f64::consts::{FRAC_1_SQRT_2, FRAC_PI_4, SQRT_2};

    fn body(shape: Shape, x: f64, y: f64) -> Body {
        Body::new(shape, Vec2::new(x, y), 0.0, 1.0).unwrap()
    }

    fn collide(a: &Body, b: &Body) -> Manifold {
        let mut m = Manifold::new(0, 1);
        m.solve(a, b);
        m
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_dispatch_table() {
        let circle = body(Shape::circle(1.0), 0.0, 0.0);
        let boxed = body(Shape::rect(1.0, 1.0), 1.5, 0.0);

        // Same geometry either way round, normal reversed
        let cp = collide(&circle, &boxed);
        let pc = collide(&boxed, &circle);
        assert_eq!(cp.contact_count, 1);
        assert_eq!(pc.contact_count, 1);
        assert_eq!(cp.normal, -pc.normal);
        assert_eq!(cp.penetration, pc.penetration);
    }

    #[test]
    fn test_circle_circle_separated() {
        let a = body(Shape::circle(1.0), 0.0, 0.0);
        let b = body(Shape::circle(1.0), 2.0, 0.0); // exactly touching
        assert_eq!(collide(&a, &b).contact_count, 0);
    }

    #[test]
    fn test_circle_circle_overlap() {
        let a = body(Shape::circle(1.0), 0.0, 0.0);
        let b = body(Shape::circle(2.0), 0.0, 2.5);
        let m = collide(&a, &b);
        assert_eq!(m.contact_count, 1);
        assert!(close(m.penetration, 0.5));
        assert_eq!(m.normal, Vec2::new(0.0, 1.0));
        assert_eq!(m.contacts[0], Vec2::new(0.0, 1.0));
    }

    #[test]
    fn test_circle_circle_concentric() {
        let a = body(Shape::circle(2.0), 3.0, 3.0);
        let b = body(Shape::circle(2.0), 3.0, 3.0);
        let m = collide(&a, &b);
        assert_eq!(m.contact_count, 1);
        assert_eq!(m.penetration, 2.0);
        assert!(close(m.normal.length(), 1.0));
        assert!(!m.normal.x.is_nan() && !m.normal.y.is_nan());
        assert_eq!(m.contacts[0], Vec2::new(3.0, 3.0));
    }

    #[test]
    fn test_circle_polygon_face_region() {
        let circle = body(Shape::circle(1.0), 0.0, 1.5);
        let boxed = body(Shape::rect(1.0, 1.0), 0.0, 0.0);
        let m = collide(&circle, &boxed);
        assert_eq!(m.contact_count, 1);
        assert!(close(m.penetration, 0.5));
        assert_eq!(m.normal, Vec2::new(0.0, -1.0));
        assert_eq!(m.contacts[0], Vec2::new(0.0, 0.5));
    }

    #[test]
    fn test_circle_polygon_vertex_region() {
        let circle = body(Shape::circle(1.0), 1.5, 1.5);
        let boxed = body(Shape::rect(1.0, 1.0), 0.0, 0.0);
        let m = collide(&circle, &boxed);
        assert_eq!(m.contact_count, 1);
        assert!(close(m.normal.x, -FRAC_1_SQRT_2));
        assert!(close(m.normal.y, -FRAC_1_SQRT_2));
        assert_eq!(m.contacts[0], Vec2::new(1.0, 1.0));
    }

    #[test]
    fn test_circle_polygon_vertex_region_miss() {
        // Within reach of both face planes but not of the corner
        let circle = body(Shape::circle(1.0), 1.8, 1.8);
        let boxed = body(Shape::rect(1.0, 1.0), 0.0, 0.0);
        assert_eq!(collide(&circle, &boxed).contact_count, 0);
    }

    #[test]
    fn test_circle_center_inside_polygon() {
        let circle = body(Shape::circle(0.5), 0.0, 0.2);
        let boxed = body(Shape::rect(1.0, 1.0), 0.0, 0.0);
        let m = collide(&circle, &boxed);
        assert_eq!(m.contact_count, 1);
        assert_eq!(m.penetration, 0.5);
        assert_eq!(m.normal, Vec2::new(0.0, -1.0));
    }

    #[test]
    fn test_circle_polygon_rotated() {
        // Diamond: the box rotated a quarter-pi, corner pointing at +Y
        let circle = body(Shape::circle(1.0), 0.0, SQRT_2 + 0.5);
        let mut diamond = body(Shape::rect(1.0, 1.0), 0.0, 0.0);
        diamond.set_orient(FRAC_PI_4);
        let m = collide(&circle, &diamond);
        assert_eq!(m.contact_count, 1);
        assert!(close(m.normal.x, 0.0) && close(m.normal.y, -1.0), "normal {:?}", m.normal);
    }

    #[test]
    fn test_polygon_circle_flips_normal() {
        let boxed = body(Shape::rect(1.0, 1.0), 0.0, 0.0);
        let circle = body(Shape::circle(1.0), 0.0, 1.5);
        let m = collide(&boxed, &circle);
        assert_eq!(m.contact_count, 1);
        assert_eq!(m.normal, Vec2::new(0.0, 1.0));
    }

    #[test]
    fn test_polygon_polygon_separated() {
        let a = body(Shape::rect(1.0, 1.0), 0.0, 0.0);
        let b = body(Shape::rect(1.0, 1.0), 2.5, 0.0);
        assert_eq!(collide(&a, &b).contact_count, 0);

        let c = body(Shape::rect(1.0, 1.0), 0.0, -2.01);
        assert_eq!(collide(&a, &c).contact_count, 0);
    }

    #[test]
    fn test_polygon_polygon_overlap_x() {
        let a = body(Shape::rect(1.0, 1.0), 0.0, 0.0);
        let b = body(Shape::rect(1.0, 1.0), 1.5, 0.0);
        let m = collide(&a, &b);
        assert_eq!(m.contact_count, 2);
        assert!(close(m.penetration, 0.5), "penetration {}", m.penetration);
        assert!(close(m.normal.x, 1.0) && close(m.normal.y, 0.0));
    }

    #[test]
    fn test_polygon_polygon_overlap_y() {
        let a = body(Shape::rect(1.0, 1.0), 0.0, 0.0);
        let b = body(Shape::rect(1.0, 1.0), 0.0, 1.8);
        let m = collide(&a, &b);
        assert_eq!(m.contact_count, 2);
        assert!(close(m.penetration, 0.2), "penetration {}", m.penetration);
        assert!(close(m.normal.x, 0.0) && close(m.normal.y, 1.0));
    }

    #[test]
    fn test_polygon_polygon_corner_contact() {
        let a = body(Shape::rect(1.0, 1.0), 0.0, 0.0);
        let mut b = body(Shape::rect(1.0, 1.0), 0.0, 2.2);
        b.set_orient(FRAC_PI_4);
        let m = collide(&a, &b);
        assert_eq!(m.contact_count, 1);
        assert!(close(m.penetration, SQRT_2 - 1.2), "penetration {}", m.penetration);
        assert!(close(m.normal.y, 1.0));
        assert!(close(m.contacts[0].x, 0.0));
    }

    #[test]
    fn test_clip_keeps_inside_and_crossing() {
        let mut face = [Vec2::new(0.0, 0.0), Vec2::new(2.0, 0.0)];
        let kept = clip(Vec2::new(1.0, 0.0), 1.0, &mut face);
        assert_eq!(kept, 2);
        assert_eq!(face[0], Vec2::new(0.0, 0.0));
        assert_eq!(face[1], Vec2::new(1.0, 0.0));

        let mut outside = [Vec2::new(2.0, 0.0), Vec2::new(3.0, 0.0)];
        assert_eq!(clip(Vec2::new(1.0, 0.0), 1.0, &mut outside), 0);
    }

    #[test]
    fn test_bias_prefers_first_axis_only_when_clearly_deeper() {
        assert!(bias_greater_than(-0.1, -0.5));
        assert!(!bias_greater_than(-0.5, -0.1));
        // A near tie goes to B
        assert!(!bias_greater_than(-0.5, -0.5));
    }

    proptest! {
        #[test]
        fn prop_separated_circles_never_touch(
            r1 in 0.1f64..10.0,
            r2 in 0.1f64..10.0,
            angle in 0.0f64..std::f64::consts::TAU,
            gap in 0.0f64..50.0,
        ) {
            let a = body(Shape::circle(r1), 0.0, 0.0);
            let dist = r1 + r2 + gap + 1e-6;
            let b = body(Shape::circle(r2), dist * angle.cos(), dist * angle.sin());
            prop_assert_eq!(collide(&a, &b).contact_count, 0);
        }

        #[test]
        fn prop_overlapping_circles_report_unit_normal(
            r1 in 0.5f64..10.0,
            r2 in 0.5f64..10.0,
            angle in 0.0f64..std::f64::consts::TAU,
            frac in 0.0f64..0.99,
        ) {
            let a = body(Shape::circle(r1), 0.0, 0.0);
            let dist = (r1 + r2) * frac;
            let b = body(Shape::circle(r2), dist * angle.cos(), dist * angle.sin());
            let m = collide(&a, &b);
            prop_assert_eq!(m.contact_count, 1);
            prop_assert!((m.normal.length() - 1.0).abs() < 1e-9);
            prop_assert!(m.penetration >= 0.0);
        }
    }
}
