//! I/O module for reading and writing meshes, masks and results

pub mod json;
pub mod metadata;
pub mod results;
pub mod vtk;

pub use json::{read_json_mask, read_json_mesh, write_json_mesh};
pub use metadata::{ComparisonReport, MeshSummary};
pub use results::{append_results, format_results, results_header};
pub use vtk::{read_vtk_mesh, write_vtk_mesh};

use crate::error::{MeshCompareError, Result};
use crate::mesh::{BinaryMask, Mesh};
use std::path::Path;

/// Supported mesh file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshFormat {
    Json,
    Vtk,
}

impl MeshFormat {
    /// Detect the format from the file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        match lowercase_extension(path).as_deref() {
            Some("json") => Ok(Self::Json),
            Some("vtk") | Some("vtp") | Some("vtu") => Ok(Self::Vtk),
            _ => Err(MeshCompareError::UnsupportedFormat(format!(
                "{:?} (expected .json, .vtk, .vtp or .vtu)",
                path
            ))),
        }
    }
}

/// File extension in lower case, so `A.VTK` and `a.vtk` are treated alike
pub(crate) fn lowercase_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_ascii_lowercase())
}

/// Read a mesh, choosing the reader by file extension
pub fn read_mesh(path: &Path) -> Result<Mesh> {
    match MeshFormat::from_path(path)? {
        MeshFormat::Json => read_json_mesh(path),
        MeshFormat::Vtk => read_vtk_mesh(path),
    }
}

/// Write a mesh, choosing the writer by file extension
///
/// Surfaces are written as polydata, so `.vtu` is not a valid target.
pub fn write_mesh(mesh: &Mesh, path: &Path) -> Result<()> {
    if lowercase_extension(path).as_deref() == Some("vtu") {
        return Err(MeshCompareError::UnsupportedFormat(format!(
            "{:?} (write surfaces as .json, .vtk or .vtp)",
            path
        )));
    }

    match MeshFormat::from_path(path)? {
        MeshFormat::Json => write_json_mesh(mesh, path),
        MeshFormat::Vtk => write_vtk_mesh(mesh, path, None),
    }
}

/// Read a binary mask (JSON label volume)
pub fn read_mask(path: &Path, label: Option<f64>) -> Result<BinaryMask> {
    match lowercase_extension(path).as_deref() {
        Some("json") => read_json_mask(path, label),
        _ => Err(MeshCompareError::UnsupportedFormat(format!(
            "{:?} (masks are read from .json label volumes)",
            path
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_detection() {
        assert_eq!(MeshFormat::from_path(Path::new("a.json")).unwrap(), MeshFormat::Json);
        assert_eq!(MeshFormat::from_path(Path::new("a.VTP")).unwrap(), MeshFormat::Vtk);
        assert_eq!(MeshFormat::from_path(Path::new("dir/a.vtk")).unwrap(), MeshFormat::Vtk);
        assert!(matches!(
            MeshFormat::from_path(Path::new("a.stl")),
            Err(MeshCompareError::UnsupportedFormat(_))
        ));
        assert!(MeshFormat::from_path(Path::new("noext")).is_err());
    }

    #[test]
    fn test_write_mesh_extension_case() {
        let mesh = Mesh::new(
            vec![
                crate::mesh::Point::new(0.0, 0.0, 0.0),
                crate::mesh::Point::new(1.0, 0.0, 0.0),
                crate::mesh::Point::new(0.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2]],
        )
        .unwrap();
        let dir = tempfile::tempdir().unwrap();

        let vtu = dir.path().join("out.VTU");
        assert!(matches!(
            write_mesh(&mesh, &vtu),
            Err(MeshCompareError::UnsupportedFormat(_))
        ));
        assert!(!vtu.exists());

        // Upper-case .VTK still gets the legacy format
        let legacy = dir.path().join("out.VTK");
        write_mesh(&mesh, &legacy).unwrap();
        let bytes = std::fs::read(&legacy).unwrap();
        assert!(bytes.starts_with(b"# vtk DataFile"));
    }

    #[test]
    fn test_read_mask_rejects_other_formats() {
        assert!(matches!(
            read_mask(Path::new("mask.nii"), None),
            Err(MeshCompareError::UnsupportedFormat(_))
        ));
    }
}
