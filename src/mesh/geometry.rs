//! Geometric operations on triangles

use crate::mesh::types::{Point, Vec3};

/// Triangles with an area below this are treated as degenerate
pub const DEGENERATE_AREA: f64 = 1e-14;

/// The part of a triangle a closest point lies on
///
/// Vertex and edge indices are local to the triangle: vertex `k` is corner
/// `k`, edge `k` joins corner `k` and corner `(k + 1) % 3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriangleFeature {
    /// Closest point is a corner
    Vertex(usize),
    /// Closest point is in the interior of an edge
    Edge(usize),
    /// Closest point is in the interior of the face
    Face,
}

/// Un-normalized normal (cross product of the two edges from `a`)
/// Its length is twice the triangle area
pub fn triangle_cross(a: &Point, b: &Point, c: &Point) -> Vec3 {
    (b - a).cross(&(c - a))
}

/// Compute the area of a triangle
pub fn triangle_area(a: &Point, b: &Point, c: &Point) -> f64 {
    triangle_cross(a, b, c).norm() / 2.0
}

/// Compute the unit normal of a triangle following its winding
/// Returns `None` for degenerate (zero-area) triangles
pub fn triangle_normal(a: &Point, b: &Point, c: &Point) -> Option<Vec3> {
    let cross = triangle_cross(a, b, c);
    let norm = cross.norm();

    if norm / 2.0 < DEGENERATE_AREA || !norm.is_finite() {
        return None;
    }

    Some(cross / norm)
}

/// Interior angle of the triangle at corner `a`
pub fn corner_angle(a: &Point, b: &Point, c: &Point) -> f64 {
    let u = b - a;
    let v = c - a;
    let norm_product = u.norm() * v.norm();

    if norm_product < 1e-24 {
        return 0.0;
    }

    (u.dot(&v) / norm_product).clamp(-1.0, 1.0).acos()
}

/// Closest point on triangle `(a, b, c)` to `point`, with the feature it lies on
///
/// Voronoi-region walk from "Real-Time Collision Detection" (Ericson, 5.1.5).
/// Degenerate triangles fall through to one of the vertex/edge regions.
pub fn closest_point_on_triangle(
    point: &Point,
    a: &Point,
    b: &Point,
    c: &Point,
) -> (Point, TriangleFeature) {
    let ab = b - a;
    let ac = c - a;
    let ap = point - a;

    let d1 = ab.dot(&ap);
    let d2 = ac.dot(&ap);
    if d1 <= 0.0 && d2 <= 0.0 {
        return (*a, TriangleFeature::Vertex(0));
    }

    let bp = point - b;
    let d3 = ab.dot(&bp);
    let d4 = ac.dot(&bp);
    if d3 >= 0.0 && d4 <= d3 {
        return (*b, TriangleFeature::Vertex(1));
    }

    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        let v = d1 / (d1 - d3);
        return (a + ab * v, TriangleFeature::Edge(0));
    }

    let cp = point - c;
    let d5 = ab.dot(&cp);
    let d6 = ac.dot(&cp);
    if d6 >= 0.0 && d5 <= d6 {
        return (*c, TriangleFeature::Vertex(2));
    }

    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        let w = d2 / (d2 - d6);
        return (a + ac * w, TriangleFeature::Edge(2));
    }

    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
        return (b + (c - b) * w, TriangleFeature::Edge(1));
    }

    let denom = va + vb + vc;
    if denom.abs() < f64::MIN_POSITIVE {
        // Collinear corners that escaped every region test
        return (*a, TriangleFeature::Vertex(0));
    }

    let v = vb / denom;
    let w = vc / denom;
    (a + ab * v + ac * w, TriangleFeature::Face)
}

/// Squared distance from a point to an axis-aligned box (zero inside)
pub fn distance_squared_to_box(point: &Point, min: &Point, max: &Point) -> f64 {
    (0..3)
        .map(|axis| {
            let d = if point[axis] < min[axis] {
                min[axis] - point[axis]
            } else if point[axis] > max[axis] {
                point[axis] - max[axis]
            } else {
                0.0
            };
            d * d
        })
        .sum()
}
