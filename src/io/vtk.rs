//! VTK surface reader and writer (legacy `.vtk`, XML `.vtp` / `.vtu`)

use crate::error::{MeshCompareError, Result};
use crate::io::lowercase_extension;
use crate::mesh::types::{Face, Mesh, Point};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use vtkio::model::*;

/// Default VTK file format version (2.2 for broad compatibility)
/// This version is compatible with ParaView 6.0.1 and most VTK-based tools
pub const DEFAULT_VTK_VERSION: (u8, u8) = (2, 2);

/// Read a triangulated surface from a VTK file
///
/// Polydata `polys` and `strips` are triangulated (fans for polygons); verts
/// and lines are ignored. Unstructured grids contribute their triangle, quad,
/// polygon and strip cells.
pub fn read_vtk_mesh(path: &Path) -> Result<Mesh> {
    let vtk = Vtk::import(path)
        .map_err(|e| MeshCompareError::VtkError(format!("Failed to read {:?}: {}", path, e)))?;

    let mut builder = SurfaceBuilder::default();

    match vtk.data {
        DataSet::PolyData { pieces, .. } => {
            for piece in pieces {
                let piece = inline_piece(piece, path)?;
                let base = builder.add_points(&piece.points)?;

                if let Some(polys) = piece.polys {
                    for cell in cell_lists(polys)? {
                        builder.add_polygon(base, &cell);
                    }
                }
                if let Some(strips) = piece.strips {
                    for cell in cell_lists(strips)? {
                        builder.add_strip(base, &cell);
                    }
                }
            }
        }
        DataSet::UnstructuredGrid { pieces, .. } => {
            for piece in pieces {
                let piece = inline_piece(piece, path)?;
                let base = builder.add_points(&piece.points)?;
                let types = piece.cells.types;

                for (cell, cell_type) in cell_lists(piece.cells.cell_verts)?.into_iter().zip(types) {
                    match cell_type {
                        CellType::Triangle | CellType::Quad | CellType::Polygon => {
                            builder.add_polygon(base, &cell)
                        }
                        CellType::TriangleStrip => builder.add_strip(base, &cell),
                        _ => builder.skipped_cells += 1,
                    }
                }
            }
        }
        _ => {
            return Err(MeshCompareError::UnsupportedFormat(format!(
                "{:?} holds neither polydata nor an unstructured grid",
                path
            )))
        }
    }

    if builder.skipped_cells > 0 {
        log::warn!(
            "Ignored {} non-surface cells while reading {:?}",
            builder.skipped_cells,
            path
        );
    }

    log::info!(
        "Read {} vertices and {} triangles from {:?}",
        builder.vertices.len(),
        builder.faces.len(),
        path
    );

    Mesh::new(builder.vertices, builder.faces)
}

/// Write a mesh as VTK polydata; the format (legacy or XML) follows the
/// file extension
pub fn write_vtk_mesh(mesh: &Mesh, output_path: &Path, vtk_version: Option<(u8, u8)>) -> Result<()> {
    let version = vtk_version.unwrap_or(DEFAULT_VTK_VERSION);
    log::info!(
        "Writing mesh with {} triangles to {:?} (VTK version {}.{})",
        mesh.num_faces(),
        output_path,
        version.0,
        version.1
    );

    let points: Vec<f64> = mesh
        .vertices()
        .iter()
        .flat_map(|p| [p.x, p.y, p.z])
        .collect();

    let is_legacy = lowercase_extension(output_path).as_deref() == Some("vtk");
    let polys = if is_legacy {
        VertexNumbers::Legacy {
            num_cells: mesh.num_faces() as u32,
            vertices: mesh
                .faces()
                .iter()
                .flat_map(|f| [3, f[0] as u32, f[1] as u32, f[2] as u32])
                .collect(),
        }
    } else {
        VertexNumbers::XML {
            connectivity: mesh
                .faces()
                .iter()
                .flat_map(|f| f.map(|id| id as u64))
                .collect(),
            offsets: (0..mesh.num_faces()).map(|i| ((i + 1) * 3) as u64).collect(),
        }
    };

    let piece = PolyDataPiece {
        points: IOBuffer::F64(points),
        verts: None,
        lines: None,
        polys: Some(polys),
        strips: None,
        data: Attributes::new(),
    };

    let vtk = Vtk {
        version: Version::new(version),
        title: "Triangulated surface".to_string(),
        byte_order: ByteOrder::LittleEndian,
        data: DataSet::PolyData {
            meta: None,
            pieces: vec![Piece::Inline(Box::new(piece))],
        },
        file_path: None,
    };

    let writer = BufWriter::new(File::create(output_path)?);
    let written = if is_legacy {
        vtk.write_legacy(writer)
    } else {
        vtk.write_xml(writer)
    };
    written.map_err(|e| MeshCompareError::VtkError(format!("Failed to write VTK file: {}", e)))?;

    log::info!("Successfully wrote VTK file to {:?}", output_path);

    Ok(())
}

fn inline_piece<P>(piece: Piece<P>, path: &Path) -> Result<P> {
    match piece {
        Piece::Inline(data) => Ok(*data),
        _ => Err(MeshCompareError::UnsupportedFormat(format!(
            "{:?} references external pieces",
            path
        ))),
    }
}

/// Split VTK connectivity into per-cell vertex lists
fn cell_lists(numbers: VertexNumbers) -> Result<Vec<Vec<usize>>> {
    let malformed = || MeshCompareError::InvalidMeshTopology("malformed VTK cell connectivity".to_string());

    match numbers {
        VertexNumbers::Legacy { num_cells, vertices } => {
            let mut cells = Vec::with_capacity(num_cells as usize);
            let mut pos = 0;
            while pos < vertices.len() {
                let n = vertices[pos] as usize;
                let ids = vertices.get(pos + 1..pos + 1 + n).ok_or_else(malformed)?;
                cells.push(ids.iter().map(|&id| id as usize).collect());
                pos += n + 1;
            }
            Ok(cells)
        }
        VertexNumbers::XML {
            connectivity,
            offsets,
        } => {
            let mut cells = Vec::with_capacity(offsets.len());
            let mut start = 0usize;
            for &end in &offsets {
                let end = end as usize;
                let ids = connectivity.get(start..end).ok_or_else(malformed)?;
                cells.push(ids.iter().map(|&id| id as usize).collect());
                start = end;
            }
            Ok(cells)
        }
    }
}

/// Accumulates the triangles of all pieces into one vertex array
#[derive(Default)]
struct SurfaceBuilder {
    vertices: Vec<Point>,
    faces: Vec<Face>,
    skipped_cells: usize,
}

impl SurfaceBuilder {
    /// Append a piece's points, returning the index offset of its first point
    fn add_points(&mut self, points: &IOBuffer) -> Result<usize> {
        let coords: Vec<f64> = points.clone().cast_into::<f64>().ok_or_else(|| {
            MeshCompareError::VtkError("point coordinates are not numeric".to_string())
        })?;

        if coords.len() % 3 != 0 {
            return Err(MeshCompareError::VtkError(format!(
                "point buffer length {} is not a multiple of 3",
                coords.len()
            )));
        }

        let base = self.vertices.len();
        self.vertices
            .extend(coords.chunks_exact(3).map(|c| Point::new(c[0], c[1], c[2])));
        Ok(base)
    }

    fn add_polygon(&mut self, base: usize, cell: &[usize]) {
        if cell.len() < 3 {
            self.skipped_cells += 1;
            return;
        }
        for k in 1..cell.len() - 1 {
            self.faces
                .push([base + cell[0], base + cell[k], base + cell[k + 1]]);
        }
    }

    fn add_strip(&mut self, base: usize, cell: &[usize]) {
        if cell.len() < 3 {
            self.skipped_cells += 1;
            return;
        }
        for k in 0..cell.len() - 2 {
            // Every other triangle is flipped to keep a consistent orientation
            let face = if k % 2 == 0 {
                [cell[k], cell[k + 1], cell[k + 2]]
            } else {
                [cell[k + 1], cell[k], cell[k + 2]]
            };
            self.faces.push(face.map(|id| base + id));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tetrahedron() -> Mesh {
        Mesh::new(
            vec![
                Point::new(0.0, 0.0, 0.0),
                Point::new(1.0, 0.0, 0.0),
                Point::new(0.0, 1.0, 0.0),
                Point::new(0.0, 0.0, 1.0),
            ],
            vec![[0, 2, 1], [0, 1, 3], [0, 3, 2], [1, 2, 3]],
        )
        .unwrap()
    }

    #[test]
    fn test_cell_lists_legacy() {
        let cells = cell_lists(VertexNumbers::Legacy {
            num_cells: 2,
            vertices: vec![3, 0, 1, 2, 4, 0, 2, 3, 4],
        })
        .unwrap();
        assert_eq!(cells, vec![vec![0, 1, 2], vec![0, 2, 3, 4]]);

        let truncated = cell_lists(VertexNumbers::Legacy {
            num_cells: 1,
            vertices: vec![4, 0, 1],
        });
        assert!(truncated.is_err());
    }

    #[test]
    fn test_cell_lists_xml() {
        let cells = cell_lists(VertexNumbers::XML {
            connectivity: vec![0, 1, 2, 2, 3, 0, 1],
            offsets: vec![3, 7],
        })
        .unwrap();
        assert_eq!(cells, vec![vec![0, 1, 2], vec![2, 3, 0, 1]]);
    }

    #[test]
    fn test_fan_and_strip_triangulation() {
        let mut builder = SurfaceBuilder::default();
        builder.add_polygon(10, &[0, 1, 2, 3]);
        assert_eq!(builder.faces, vec![[10, 11, 12], [10, 12, 13]]);

        let mut builder = SurfaceBuilder::default();
        builder.add_strip(0, &[0, 1, 2, 3]);
        assert_eq!(builder.faces, vec![[0, 1, 2], [2, 1, 3]]);

        builder.add_polygon(0, &[0, 1]);
        assert_eq!(builder.skipped_cells, 1);
    }

    #[test]
    fn test_vtk_roundtrip_legacy_and_xml() {
        let mesh = tetrahedron();
        let dir = tempfile::tempdir().unwrap();

        for name in ["tetra.vtk", "tetra.vtp"] {
            let path = dir.path().join(name);
            write_vtk_mesh(&mesh, &path, None).unwrap();
            let loaded = read_vtk_mesh(&path).unwrap();

            assert_eq!(loaded.num_vertices(), 4);
            assert_eq!(loaded.faces(), mesh.faces());
            assert_eq!(loaded.vertices()[3], Point::new(0.0, 0.0, 1.0));
        }
    }
}
