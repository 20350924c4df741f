//! Surface closure checks
//!
//! The volume comparison is only meaningful for (nearly) watertight surfaces.
//! These checks never reject a mesh; they report how far it is from closed.

use crate::mesh::types::Mesh;
use std::collections::HashMap;

/// Build a map from undirected edges to the number of faces using them
fn edge_use_counts(mesh: &Mesh) -> HashMap<(usize, usize), usize> {
    let mut edge_count: HashMap<(usize, usize), usize> = HashMap::new();

    for face in mesh.faces() {
        for k in 0..3 {
            let (n1, n2) = (face[k], face[(k + 1) % 3]);
            // Use canonical form (smaller node first) for consistent edge representation
            let edge = if n1 < n2 { (n1, n2) } else { (n2, n1) };
            *edge_count.entry(edge).or_insert(0) += 1;
        }
    }

    edge_count
}

/// Number of edges used by exactly one face (holes in the surface)
pub fn count_open_edges(mesh: &Mesh) -> usize {
    edge_use_counts(mesh).values().filter(|&&c| c == 1).count()
}

/// Number of edges shared by more than two faces
pub fn count_non_manifold_edges(mesh: &Mesh) -> usize {
    edge_use_counts(mesh).values().filter(|&&c| c > 2).count()
}

/// Check that every edge is shared by exactly two faces, logging a warning if not
pub fn validate_surface_closure(mesh: &Mesh, label: &str) -> bool {
    let counts = edge_use_counts(mesh);
    let open = counts.values().filter(|&&c| c == 1).count();
    let non_manifold = counts.values().filter(|&&c| c > 2).count();

    let is_closed = open == 0 && non_manifold == 0;

    if !is_closed {
        log::warn!(
            "Surface '{}' is not closed: {} open edges, {} non-manifold edges; volume overlap may be unreliable",
            label,
            open,
            non_manifold
        );
    }

    is_closed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::types::Point;

    fn tetrahedron(faces: Vec<[usize; 3]>) -> Mesh {
        Mesh::new(
            vec![
                Point::new(0.0, 0.0, 0.0),
                Point::new(1.0, 0.0, 0.0),
                Point::new(0.0, 1.0, 0.0),
                Point::new(0.0, 0.0, 1.0),
            ],
            faces,
        )
        .unwrap()
    }

    #[test]
    fn test_closed_tetrahedron() {
        let mesh = tetrahedron(vec![[0, 2, 1], [0, 1, 3], [0, 3, 2], [1, 2, 3]]);
        assert_eq!(count_open_edges(&mesh), 0);
        assert_eq!(count_non_manifold_edges(&mesh), 0);
        assert!(validate_surface_closure(&mesh, "tetra"));
    }

    #[test]
    fn test_open_tetrahedron() {
        // Missing the slanted face leaves three open edges
        let mesh = tetrahedron(vec![[0, 2, 1], [0, 1, 3], [0, 3, 2]]);
        assert_eq!(count_open_edges(&mesh), 3);
        assert!(!validate_surface_closure(&mesh, "open"));
    }

    #[test]
    fn test_non_manifold_edge() {
        let mesh = tetrahedron(vec![[0, 1, 2], [0, 1, 3], [1, 0, 2]]);
        assert_eq!(count_non_manifold_edges(&mesh), 1);
        assert!(!validate_surface_closure(&mesh, "fin"));
    }
}
