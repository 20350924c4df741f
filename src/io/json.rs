//! JSON triangle meshes and label volumes

use crate::error::{MeshCompareError, Result};
use crate::mesh::{BinaryMask, Mesh, Point};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

#[derive(Debug, Serialize, Deserialize)]
struct JsonMesh {
    vertices: Vec<[f64; 3]>,
    faces: Vec<[usize; 3]>,
}

/// Label volume with x-fastest `data`
#[derive(Debug, Serialize, Deserialize)]
struct JsonVolume {
    dims: [usize; 3],
    #[serde(default = "unit_spacing")]
    spacing: [f64; 3],
    #[serde(default)]
    origin: [f64; 3],
    data: Vec<f64>,
}

fn unit_spacing() -> [f64; 3] {
    [1.0, 1.0, 1.0]
}

pub fn read_json_mesh<P: AsRef<Path>>(path: P) -> Result<Mesh> {
    let file = File::open(path.as_ref())?;

    let reader = BufReader::new(file);
    let json_mesh: JsonMesh = serde_json::from_reader(reader).map_err(|e| {
        MeshCompareError::JsonError(format!("Failed to parse JSON mesh: {}", e))
    })?;

    let vertices = json_mesh
        .vertices
        .into_iter()
        .map(|[x, y, z]| Point::new(x, y, z))
        .collect();

    Mesh::new(vertices, json_mesh.faces)
}

pub fn write_json_mesh<P: AsRef<Path>>(mesh: &Mesh, path: P) -> Result<()> {
    let json_mesh = JsonMesh {
        vertices: mesh.vertices().iter().map(|p| [p.x, p.y, p.z]).collect(),
        faces: mesh.faces().to_vec(),
    };

    let file = File::create(path.as_ref())?;
    serde_json::to_writer_pretty(BufWriter::new(file), &json_mesh).map_err(|e| {
        MeshCompareError::JsonError(format!("Failed to write JSON mesh: {}", e))
    })?;

    Ok(())
}

/// Read a JSON label volume and threshold it into a binary mask
///
/// With `label`, only voxels equal to it are foreground; otherwise every
/// non-zero voxel is.
pub fn read_json_mask<P: AsRef<Path>>(path: P, label: Option<f64>) -> Result<BinaryMask> {
    let file = File::open(path.as_ref())?;

    let reader = BufReader::new(file);
    let volume: JsonVolume = serde_json::from_reader(reader).map_err(|e| {
        MeshCompareError::JsonError(format!("Failed to parse JSON mask: {}", e))
    })?;

    let mask = BinaryMask::from_labels(
        volume.dims,
        volume.spacing,
        volume.origin,
        &volume.data,
        label,
    )?;

    log::info!(
        "Read mask {}x{}x{} ({} foreground voxels) from {:?}",
        volume.dims[0],
        volume.dims[1],
        volume.dims[2],
        mask.count_foreground(),
        path.as_ref()
    );

    Ok(mask)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_roundtrip() {
        let mesh = Mesh::new(
            vec![
                Point::new(0.0, 0.0, 0.0),
                Point::new(1.0, 0.0, 0.0),
                Point::new(0.0, 1.0, 0.0),
                Point::new(0.0, 0.0, 1.0),
            ],
            vec![[0, 2, 1], [0, 1, 3], [0, 3, 2], [1, 2, 3]],
        )
        .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tetra.json");
        write_json_mesh(&mesh, &path).unwrap();
        let loaded = read_json_mesh(&path).unwrap();

        assert_eq!(loaded.num_vertices(), 4);
        assert_eq!(loaded.num_faces(), 4);
        assert_eq!(loaded.faces(), mesh.faces());
    }

    #[test]
    fn test_out_of_range_face_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, r#"{"vertices": [[0,0,0],[1,0,0],[0,1,0]], "faces": [[0,1,3]]}"#)
            .unwrap();

        assert!(matches!(
            read_json_mesh(&path),
            Err(MeshCompareError::InvalidMeshTopology(_))
        ));
    }

    #[test]
    fn test_read_mask_with_label() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mask.json");
        std::fs::write(
            &path,
            r#"{"dims": [2, 2, 1], "spacing": [0.5, 0.5, 2.0], "data": [0, 1, 2, 1]}"#,
        )
        .unwrap();

        let any = read_json_mask(&path, None).unwrap();
        assert_eq!(any.count_foreground(), 3);
        assert_eq!(any.origin(), [0.0, 0.0, 0.0]);

        let label_two = read_json_mask(&path, Some(2.0)).unwrap();
        assert_eq!(label_two.count_foreground(), 1);
        assert!(label_two.is_set(0, 1, 0));
    }

    #[test]
    fn test_mask_size_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("short.json");
        std::fs::write(&path, r#"{"dims": [2, 2, 2], "data": [1, 1]}"#).unwrap();

        assert!(matches!(
            read_json_mask(&path, None),
            Err(MeshCompareError::MaskError(_))
        ));
    }
}
