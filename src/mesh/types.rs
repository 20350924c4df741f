//! Core mesh data structures

use crate::error::{MeshCompareError, Result};
use nalgebra::{Point3, Vector3};

/// 3D point type
pub type Point = Point3<f64>;

/// 3D vector type
pub type Vec3 = Vector3<f64>;

/// Triangle as three vertex indices (0-based)
pub type Face = [usize; 3];

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    /// Minimum corner
    pub min: Point,

    /// Maximum corner
    pub max: Point,
}

impl Bounds {
    /// Create bounds from two corners
    pub fn new(min: Point, max: Point) -> Self {
        Self { min, max }
    }

    /// Compute the bounds of a set of points
    /// Returns `None` for an empty slice
    pub fn from_points(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let mut min = *first;
        let mut max = *first;

        for p in &points[1..] {
            for axis in 0..3 {
                min[axis] = min[axis].min(p[axis]);
                max[axis] = max[axis].max(p[axis]);
            }
        }

        Some(Self { min, max })
    }

    /// Size along each axis
    pub fn extent(&self) -> Vec3 {
        self.max - self.min
    }

    /// Length of the min-max diagonal
    pub fn diagonal(&self) -> f64 {
        self.extent().norm()
    }

    /// Smallest box containing both boxes
    pub fn union(&self, other: &Bounds) -> Bounds {
        let mut min = self.min;
        let mut max = self.max;
        for axis in 0..3 {
            min[axis] = min[axis].min(other.min[axis]);
            max[axis] = max[axis].max(other.max[axis]);
        }
        Bounds { min, max }
    }

    /// Check whether two boxes intersect (touching counts)
    pub fn overlaps(&self, other: &Bounds) -> bool {
        (0..3).all(|axis| self.min[axis] <= other.max[axis] && other.min[axis] <= self.max[axis])
    }
}

/// Triangulated surface mesh
///
/// Faces index into `vertices`; the indices are checked once at construction
/// so the comparison engine can address vertices directly.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    vertices: Vec<Point>,
    faces: Vec<Face>,
    bounds: Option<Bounds>,
}

impl Mesh {
    /// Create a mesh, validating that every face index is in range
    pub fn new(vertices: Vec<Point>, faces: Vec<Face>) -> Result<Self> {
        let num_vertices = vertices.len();
        for (face_idx, face) in faces.iter().enumerate() {
            if let Some(&bad) = face.iter().find(|&&v| v >= num_vertices) {
                return Err(MeshCompareError::InvalidMeshTopology(format!(
                    "face {} references vertex {} but the mesh has {} vertices",
                    face_idx, bad, num_vertices
                )));
            }
        }

        let bounds = Bounds::from_points(&vertices);

        Ok(Self {
            vertices,
            faces,
            bounds,
        })
    }

    /// All vertices
    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    /// All faces
    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    /// Get total number of vertices
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Get total number of faces
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// A mesh without vertices or without faces cannot be compared
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.faces.is_empty()
    }

    /// Bounding box of the vertices, `None` when there are no vertices
    pub fn bounds(&self) -> Option<Bounds> {
        self.bounds
    }

    /// Corner positions of face `index`
    pub fn triangle(&self, index: usize) -> [Point; 3] {
        let [a, b, c] = self.faces[index];
        [self.vertices[a], self.vertices[b], self.vertices[c]]
    }

    /// Iterate over the corner positions of every face
    pub fn triangles(&self) -> impl Iterator<Item = [Point; 3]> + '_ {
        (0..self.faces.len()).map(move |i| self.triangle(i))
    }

    /// Total surface area
    pub fn surface_area(&self) -> f64 {
        self.triangles()
            .map(|[a, b, c]| super::geometry::triangle_area(&a, &b, &c))
            .sum()
    }

    /// Enclosed volume by the divergence theorem
    /// Positive for a closed, outward-oriented surface
    pub fn signed_volume(&self) -> f64 {
        self.triangles()
            .map(|[a, b, c]| a.coords.dot(&b.coords.cross(&c.coords)) / 6.0)
            .sum()
    }

    /// Fail with [`MeshCompareError::InvalidMesh`] when the mesh is empty
    pub fn ensure_not_empty(&self, label: &str) -> Result<()> {
        if self.vertices.is_empty() {
            return Err(MeshCompareError::InvalidMesh(format!(
                "{} has no vertices",
                label
            )));
        }
        if self.faces.is_empty() {
            return Err(MeshCompareError::InvalidMesh(format!(
                "{} has no faces",
                label
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_tetrahedron() -> Mesh {
        Mesh::new(
            vec![
                Point::new(0.0, 0.0, 0.0),
                Point::new(1.0, 0.0, 0.0),
                Point::new(0.0, 1.0, 0.0),
                Point::new(0.0, 0.0, 1.0),
            ],
            // Outward-facing orientation
            vec![[0, 2, 1], [0, 1, 3], [0, 3, 2], [1, 2, 3]],
        )
        .unwrap()
    }

    #[test]
    fn test_mesh_creation() {
        let mesh = unit_tetrahedron();
        assert_eq!(mesh.num_vertices(), 4);
        assert_eq!(mesh.num_faces(), 4);
        assert!(!mesh.is_empty());
    }

    #[test]
    fn test_mesh_rejects_out_of_range_index() {
        let result = Mesh::new(vec![Point::origin(), Point::new(1.0, 0.0, 0.0)], vec![[0, 1, 2]]);
        assert!(matches!(
            result,
            Err(MeshCompareError::InvalidMeshTopology(_))
        ));
    }

    #[test]
    fn test_empty_mesh() {
        let mesh = Mesh::default();
        assert!(mesh.is_empty());
        assert!(mesh.bounds().is_none());
        assert!(matches!(
            mesh.ensure_not_empty("mesh1"),
            Err(MeshCompareError::InvalidMesh(_))
        ));

        let no_faces = Mesh::new(vec![Point::origin()], vec![]).unwrap();
        assert!(no_faces.is_empty());
    }

    #[test]
    fn test_bounds() {
        let mesh = unit_tetrahedron();
        let bounds = mesh.bounds().unwrap();
        assert_eq!(bounds.min, Point::new(0.0, 0.0, 0.0));
        assert_eq!(bounds.max, Point::new(1.0, 1.0, 1.0));
        assert_relative_eq!(bounds.diagonal(), 3.0_f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_bounds_union_and_overlap() {
        let a = Bounds::new(Point::new(0.0, 0.0, 0.0), Point::new(1.0, 1.0, 1.0));
        let b = Bounds::new(Point::new(2.0, 0.0, 0.0), Point::new(3.0, 1.0, 1.0));
        let c = Bounds::new(Point::new(0.5, 0.5, 0.5), Point::new(1.5, 1.5, 1.5));

        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&c));

        let u = a.union(&b);
        assert_eq!(u.min, Point::new(0.0, 0.0, 0.0));
        assert_eq!(u.max, Point::new(3.0, 1.0, 1.0));
    }

    #[test]
    fn test_volume_and_area() {
        let mesh = unit_tetrahedron();
        assert_relative_eq!(mesh.signed_volume(), 1.0 / 6.0, epsilon = 1e-12);

        let expected_area = 1.5 + 3.0_f64.sqrt() / 2.0;
        assert_relative_eq!(mesh.surface_area(), expected_area, epsilon = 1e-12);
    }
}
