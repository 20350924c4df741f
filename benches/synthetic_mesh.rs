//! Synthetic mesh generation utilities for benchmarking
//!
//! Closed triangulated surfaces of controllable size, so the comparison can be
//! measured at scales well beyond the hand-written test shapes.

use mesh_compare::mesh::types::{Face, Mesh, Point, Vec3};
use std::f64::consts::PI;

/// Generate a closed UV sphere
///
/// # Arguments
/// * `center` - Sphere centre
/// * `radius` - Sphere radius
/// * `rings` - Number of latitude bands (at least 2)
/// * `segments` - Number of longitude segments (at least 3)
///
/// # Returns
/// An outward-oriented mesh with `2 * segments * (rings - 1)` triangles
pub fn generate_uv_sphere(center: Point, radius: f64, rings: usize, segments: usize) -> Mesh {
    let rings = rings.max(2);
    let segments = segments.max(3);

    let mut vertices = Vec::with_capacity(2 + (rings - 1) * segments);
    vertices.push(center + Vec3::new(0.0, 0.0, radius)); // north pole

    for r in 1..rings {
        let theta = PI * r as f64 / rings as f64;
        for s in 0..segments {
            let phi = 2.0 * PI * s as f64 / segments as f64;
            vertices.push(Point::new(
                center.x + radius * theta.sin() * phi.cos(),
                center.y + radius * theta.sin() * phi.sin(),
                center.z + radius * theta.cos(),
            ));
        }
    }

    let south = vertices.len();
    vertices.push(center + Vec3::new(0.0, 0.0, -radius));

    let ring_vertex = |r: usize, s: usize| 1 + (r - 1) * segments + (s % segments);
    let mut faces: Vec<Face> = Vec::with_capacity(2 * segments * (rings - 1));

    for s in 0..segments {
        faces.push([0, ring_vertex(1, s), ring_vertex(1, s + 1)]);
    }

    for r in 1..rings - 1 {
        for s in 0..segments {
            let a = ring_vertex(r, s);
            let b = ring_vertex(r + 1, s);
            let c = ring_vertex(r + 1, s + 1);
            let d = ring_vertex(r, s + 1);
            faces.push([a, b, c]);
            faces.push([a, c, d]);
        }
    }

    for s in 0..segments {
        faces.push([south, ring_vertex(rings - 1, s + 1), ring_vertex(rings - 1, s)]);
    }

    Mesh::new(vertices, faces).expect("sphere topology is valid by construction")
}

/// Generate a closed box with each face subdivided into an `n x n` grid
///
/// # Returns
/// An outward-oriented mesh with `12 * n * n` triangles; vertices along the
/// box edges are repeated per side
pub fn generate_subdivided_box(min: Point, max: Point, n: usize) -> Mesh {
    let n = n.max(1);
    let mut vertices = Vec::new();
    let mut faces: Vec<Face> = Vec::new();

    // (fixed axis, fixed at max?, u axis, v axis) with u x v pointing outward
    let sides = [
        (0, false, 2, 1),
        (0, true, 1, 2),
        (1, false, 0, 2),
        (1, true, 2, 0),
        (2, false, 1, 0),
        (2, true, 0, 1),
    ];

    for (axis, at_max, u_axis, v_axis) in sides {
        let base = vertices.len();
        for j in 0..=n {
            for i in 0..=n {
                let mut p = min;
                p[axis] = if at_max { max[axis] } else { min[axis] };
                p[u_axis] = min[u_axis] + (max[u_axis] - min[u_axis]) * i as f64 / n as f64;
                p[v_axis] = min[v_axis] + (max[v_axis] - min[v_axis]) * j as f64 / n as f64;
                vertices.push(p);
            }
        }

        let id = |i: usize, j: usize| base + j * (n + 1) + i;
        for j in 0..n {
            for i in 0..n {
                faces.push([id(i, j), id(i + 1, j), id(i + 1, j + 1)]);
                faces.push([id(i, j), id(i + 1, j + 1), id(i, j + 1)]);
            }
        }
    }

    Mesh::new(vertices, faces).expect("box topology is valid by construction")
}

/// Sphere resolution giving roughly `target_faces` triangles
///
/// Returns (rings, segments) with twice as many segments as rings
pub fn calculate_sphere_resolution(target_faces: usize) -> (usize, usize) {
    // faces = 2 * segments * (rings - 1) ~= 4 * rings^2
    let rings = ((target_faces as f64 / 4.0).sqrt().round() as usize).max(2);
    (rings, 2 * rings)
}

#[cfg(test)]
mod tests {
    use super::{calculate_sphere_resolution, generate_subdivided_box, generate_uv_sphere};
    use mesh_compare::mesh::types::Point;

    #[test]
    fn test_sphere_is_closed_and_outward() {
        let mesh = generate_uv_sphere(Point::origin(), 1.0, 16, 32);
        assert_eq!(mesh.num_faces(), 2 * 32 * 15);
        assert_eq!(mesh_compare::mesh::count_open_edges(&mesh), 0);
        // Inscribed polyhedron, slightly smaller than 4/3 pi
        let volume = mesh.signed_volume();
        assert!(volume > 3.9 && volume < 4.0 * std::f64::consts::PI / 3.0);
    }

    #[test]
    fn test_subdivided_box_volume() {
        let mesh = generate_subdivided_box(Point::new(0.0, 0.0, 0.0), Point::new(2.0, 1.0, 1.0), 4);
        assert_eq!(mesh.num_faces(), 12 * 16);
        assert!((mesh.signed_volume() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_sphere_resolution() {
        let (rings, segments) = calculate_sphere_resolution(10_000);
        let actual = 2 * segments * (rings - 1);
        assert!((actual as f64 - 10_000.0).abs() / 10_000.0 < 0.1);
    }
}
