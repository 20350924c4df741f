//! JSON report export for mesh comparisons

use crate::compare::MeshDifferences;
use crate::config::ComparisonConfig;
use crate::error::{MeshCompareError, Result};
use crate::mesh::{count_open_edges, Mesh};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Complete record of one comparison
#[derive(Debug, Serialize, Deserialize)]
pub struct ComparisonReport {
    /// Timestamp when the comparison was performed
    pub timestamp: String,

    /// Settings used
    pub config: ComparisonConfig,

    /// First mesh (the ground truth for mask comparisons)
    pub mesh1: MeshSummary,

    /// Second mesh
    pub mesh2: MeshSummary,

    /// Comparison results
    pub results: MeshDifferences,
}

/// Size and shape summary of one input mesh
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeshSummary {
    pub source: String,
    pub num_vertices: usize,
    pub num_faces: usize,
    pub surface_area: f64,
    pub enclosed_volume: f64,
    pub open_edges: usize,
    pub bounds_min: [f64; 3],
    pub bounds_max: [f64; 3],
}

impl MeshSummary {
    pub fn new(source: impl Into<String>, mesh: &Mesh) -> Self {
        let (bounds_min, bounds_max) = match mesh.bounds() {
            Some(b) => (
                [b.min.x, b.min.y, b.min.z],
                [b.max.x, b.max.y, b.max.z],
            ),
            None => ([0.0; 3], [0.0; 3]),
        };

        Self {
            source: source.into(),
            num_vertices: mesh.num_vertices(),
            num_faces: mesh.num_faces(),
            surface_area: mesh.surface_area(),
            enclosed_volume: mesh.signed_volume(),
            open_edges: count_open_edges(mesh),
            bounds_min,
            bounds_max,
        }
    }
}

impl ComparisonReport {
    /// Create a report stamped with the current time
    pub fn new(
        mesh1: MeshSummary,
        mesh2: MeshSummary,
        config: &ComparisonConfig,
        results: &MeshDifferences,
    ) -> Self {
        Self {
            timestamp: chrono::Utc::now().to_rfc3339(),
            config: *config,
            mesh1,
            mesh2,
            results: *results,
        }
    }

    /// Export report to JSON file
    pub fn export<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = std::fs::File::create(path.as_ref())?;
        serde_json::to_writer_pretty(file, self).map_err(|e| {
            MeshCompareError::JsonError(format!("Failed to write JSON report: {}", e))
        })?;
        Ok(())
    }
}
