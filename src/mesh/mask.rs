//! Binary voxel mask and its conversion to a closed triangle surface
//!
//! Every foreground voxel is treated as a hexahedral element. A voxel face is
//! on the boundary ("skin") when the neighbouring voxel across it is
//! background or outside the grid; boundary faces are split into two
//! triangles and share vertices through the corner lattice, so the result is
//! closed and outward-oriented.
//!
//! Positions follow the usual image convention: `origin` is the centre of
//! voxel `(0, 0, 0)`, so voxel `(i, j, k)` spans
//! `origin + (i - 0.5, j - 0.5, k - 0.5) * spacing` to
//! `origin + (i + 0.5, j + 0.5, k + 0.5) * spacing`.

use crate::error::{MeshCompareError, Result};
use crate::mesh::types::{Face, Mesh, Point};

/// Labelled voxels reduced to foreground/background
#[derive(Debug, Clone)]
pub struct BinaryMask {
    dims: [usize; 3],
    spacing: [f64; 3],
    origin: [f64; 3],
    /// x-fastest voxel occupancy
    voxels: Vec<bool>,
}

/// Corner offsets of a voxel, in hexahedron node order
/// Bottom face (z-): 0,1,2,3; top face (z+): 4,5,6,7
const HEX_CORNERS: [[usize; 3]; 8] = [
    [0, 0, 0],
    [1, 0, 0],
    [1, 1, 0],
    [0, 1, 0],
    [0, 0, 1],
    [1, 0, 1],
    [1, 1, 1],
    [0, 1, 1],
];

/// The 6 quad faces of a hexahedron, counter-clockwise seen from outside,
/// each with the offset to the voxel across it
const HEX_FACES: [([usize; 4], [i64; 3]); 6] = [
    ([0, 3, 2, 1], [0, 0, -1]), // bottom (z-)
    ([4, 5, 6, 7], [0, 0, 1]),  // top (z+)
    ([0, 1, 5, 4], [0, -1, 0]), // front (y-)
    ([1, 2, 6, 5], [1, 0, 0]),  // right (x+)
    ([2, 3, 7, 6], [0, 1, 0]),  // back (y+)
    ([3, 0, 4, 7], [-1, 0, 0]), // left (x-)
];

impl BinaryMask {
    /// Create a mask from occupancy values in x-fastest order
    pub fn new(
        dims: [usize; 3],
        spacing: [f64; 3],
        origin: [f64; 3],
        voxels: Vec<bool>,
    ) -> Result<Self> {
        let expected = dims[0]
            .checked_mul(dims[1])
            .and_then(|n| n.checked_mul(dims[2]))
            .ok_or_else(|| MeshCompareError::MaskError(format!("dimensions {:?} overflow", dims)))?;

        if voxels.len() != expected {
            return Err(MeshCompareError::MaskError(format!(
                "dimensions {:?} need {} voxels, got {}",
                dims,
                expected,
                voxels.len()
            )));
        }

        if spacing.iter().any(|s| !s.is_finite() || *s <= 0.0) {
            return Err(MeshCompareError::MaskError(format!(
                "spacing must be positive, got {:?}",
                spacing
            )));
        }

        if origin.iter().any(|o| !o.is_finite()) {
            return Err(MeshCompareError::MaskError(format!(
                "origin must be finite, got {:?}",
                origin
            )));
        }

        Ok(Self {
            dims,
            spacing,
            origin,
            voxels,
        })
    }

    /// Threshold a label image: a voxel is foreground when it equals `label`,
    /// or when it is non-zero if no label is given
    pub fn from_labels(
        dims: [usize; 3],
        spacing: [f64; 3],
        origin: [f64; 3],
        labels: &[f64],
        label: Option<f64>,
    ) -> Result<Self> {
        let voxels = labels
            .iter()
            .map(|&v| match label {
                Some(l) => v == l,
                None => v != 0.0,
            })
            .collect();

        Self::new(dims, spacing, origin, voxels)
    }

    /// Grid dimensions (voxels per axis)
    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    /// Voxel size per axis
    pub fn spacing(&self) -> [f64; 3] {
        self.spacing
    }

    /// Centre of voxel (0, 0, 0)
    pub fn origin(&self) -> [f64; 3] {
        self.origin
    }

    /// Number of foreground voxels
    pub fn count_foreground(&self) -> usize {
        self.voxels.iter().filter(|&&v| v).count()
    }

    /// Enclosed volume of the foreground
    pub fn foreground_volume(&self) -> f64 {
        self.count_foreground() as f64 * self.spacing.iter().product::<f64>()
    }

    /// Occupancy of voxel `(i, j, k)`; anything outside the grid is background
    pub fn is_set(&self, i: i64, j: i64, k: i64) -> bool {
        let [nx, ny, nz] = self.dims;
        if i < 0 || j < 0 || k < 0 || i as usize >= nx || j as usize >= ny || k as usize >= nz {
            return false;
        }
        self.voxels[(k as usize * ny + j as usize) * nx + i as usize]
    }
}

/// Extract the closed boundary surface of the mask's foreground
pub fn mask_to_mesh(mask: &BinaryMask) -> Result<Mesh> {
    let [nx, ny, nz] = mask.dims;
    let foreground = mask.count_foreground();

    log::info!(
        "Converting mask {}x{}x{} with {} foreground voxels to a surface",
        nx,
        ny,
        nz,
        foreground
    );

    if foreground == 0 {
        return Err(MeshCompareError::MaskError(
            "mask has no foreground voxels, the surface would be empty".to_string(),
        ));
    }

    // Corner lattice has one more node than voxels along each axis
    let (cx, cy) = (nx + 1, ny + 1);
    let corner_id = |i: usize, j: usize, k: usize| (k * cy + j) * cx + i;

    let mut corner_to_vertex = vec![usize::MAX; cx * cy * (nz + 1)];
    let mut vertices: Vec<Point> = Vec::new();
    let mut faces: Vec<Face> = Vec::new();

    let mut vertex_for = |i: usize, j: usize, k: usize, vertices: &mut Vec<Point>| {
        let id = corner_id(i, j, k);
        if corner_to_vertex[id] == usize::MAX {
            corner_to_vertex[id] = vertices.len();
            vertices.push(Point::new(
                mask.origin[0] + (i as f64 - 0.5) * mask.spacing[0],
                mask.origin[1] + (j as f64 - 0.5) * mask.spacing[1],
                mask.origin[2] + (k as f64 - 0.5) * mask.spacing[2],
            ));
        }
        corner_to_vertex[id]
    };

    for k in 0..nz {
        for j in 0..ny {
            for i in 0..nx {
                let (ii, jj, kk) = (i as i64, j as i64, k as i64);
                if !mask.is_set(ii, jj, kk) {
                    continue;
                }

                for (quad, [di, dj, dk]) in HEX_FACES {
                    if mask.is_set(ii + di, jj + dj, kk + dk) {
                        continue;
                    }

                    let ids = quad.map(|corner| {
                        let [oi, oj, ok] = HEX_CORNERS[corner];
                        vertex_for(i + oi, j + oj, k + ok, &mut vertices)
                    });

                    faces.push([ids[0], ids[1], ids[2]]);
                    faces.push([ids[0], ids[2], ids[3]]);
                }
            }
        }
    }

    log::info!(
        "Mask surface has {} vertices and {} triangles",
        vertices.len(),
        faces.len()
    );

    Mesh::new(vertices, faces)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::surface::count_open_edges;
    use approx::assert_relative_eq;

    fn block_mask(dims: [usize; 3], lo: [usize; 3], hi: [usize; 3]) -> BinaryMask {
        let mut voxels = vec![false; dims[0] * dims[1] * dims[2]];
        for k in lo[2]..hi[2] {
            for j in lo[1]..hi[1] {
                for i in lo[0]..hi[0] {
                    voxels[(k * dims[1] + j) * dims[0] + i] = true;
                }
            }
        }
        BinaryMask::new(dims, [1.0, 1.0, 1.0], [0.0, 0.0, 0.0], voxels).unwrap()
    }

    #[test]
    fn test_single_voxel_surface() {
        let mask = block_mask([3, 3, 3], [1, 1, 1], [2, 2, 2]);
        let mesh = mask_to_mesh(&mask).unwrap();

        assert_eq!(mesh.num_vertices(), 8);
        assert_eq!(mesh.num_faces(), 12); // 6 quads, 2 triangles each
        assert_relative_eq!(mesh.signed_volume(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(mesh.surface_area(), 6.0, epsilon = 1e-12);

        // Voxel (1,1,1) is centred on (1,1,1)
        let bounds = mesh.bounds().unwrap();
        assert_eq!(bounds.min, Point::new(0.5, 0.5, 0.5));
        assert_eq!(bounds.max, Point::new(1.5, 1.5, 1.5));
    }

    #[test]
    fn test_block_surface_is_closed() {
        let mask = block_mask([4, 5, 6], [0, 1, 1], [4, 4, 5]);
        let mesh = mask_to_mesh(&mask).unwrap();

        assert_eq!(count_open_edges(&mesh), 0);
        assert_relative_eq!(mesh.signed_volume(), mask.foreground_volume(), epsilon = 1e-9);
        // Only the skin: interior faces between two foreground voxels are dropped
        let expected_quads = 2 * (4 * 3 + 3 * 4 + 4 * 4);
        assert_eq!(mesh.num_faces(), 2 * expected_quads);
    }

    #[test]
    fn test_two_voxels_sharing_a_face() {
        let mask = block_mask([2, 1, 1], [0, 0, 0], [2, 1, 1]);
        let mesh = mask_to_mesh(&mask).unwrap();

        // 12 faces - 2 shared = 10 boundary quads
        assert_eq!(mesh.num_faces(), 20);
        assert_eq!(mesh.num_vertices(), 12);
        assert_relative_eq!(mesh.signed_volume(), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_anisotropic_spacing() {
        let voxels = vec![true];
        let mask = BinaryMask::new([1, 1, 1], [0.5, 2.0, 3.0], [10.0, 0.0, 0.0], voxels).unwrap();
        let mesh = mask_to_mesh(&mask).unwrap();

        assert_relative_eq!(mesh.signed_volume(), 3.0, epsilon = 1e-12);
        assert_relative_eq!(mask.foreground_volume(), 3.0, epsilon = 1e-12);
        let bounds = mesh.bounds().unwrap();
        assert_relative_eq!(bounds.min.x, 9.75, epsilon = 1e-12);
        assert_relative_eq!(bounds.max.z, 1.5, epsilon = 1e-12);
    }

    #[test]
    fn test_from_labels() {
        let labels = [0.0, 1.0, 2.0, 1.0];
        let any = BinaryMask::from_labels([4, 1, 1], [1.0; 3], [0.0; 3], &labels, None).unwrap();
        assert_eq!(any.count_foreground(), 3);

        let only_one = BinaryMask::from_labels([4, 1, 1], [1.0; 3], [0.0; 3], &labels, Some(1.0)).unwrap();
        assert_eq!(only_one.count_foreground(), 2);
        assert!(only_one.is_set(1, 0, 0));
        assert!(!only_one.is_set(2, 0, 0));
        assert!(!only_one.is_set(-1, 0, 0));
    }

    #[test]
    fn test_invalid_masks() {
        assert!(BinaryMask::new([2, 2, 2], [1.0; 3], [0.0; 3], vec![true; 7]).is_err());
        assert!(BinaryMask::new([1, 1, 1], [1.0, 0.0, 1.0], [0.0; 3], vec![true]).is_err());

        let empty = BinaryMask::new([2, 2, 2], [1.0; 3], [0.0; 3], vec![false; 8]).unwrap();
        assert!(matches!(
            mask_to_mesh(&empty),
            Err(MeshCompareError::MaskError(_))
        ));
    }
}
