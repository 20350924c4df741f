//! Mesh comparison: symmetric surface distances and volume overlap

pub mod aggregate;
pub mod sampling;
pub mod types;
pub mod volume;

pub use aggregate::{combine, symmetric_distance};
pub use sampling::directional_distance;
pub use types::*;
pub use volume::{robust_volume_overlap, volume_overlap, FlatTriangulation};

use crate::config::ComparisonConfig;
use crate::error::Result;
use crate::mesh::surface::validate_surface_closure;
use crate::mesh::types::Mesh;

/// Compare two meshes with the default configuration
pub fn compare(first: &Mesh, second: &Mesh) -> Result<MeshDifferences> {
    compare_with_config(first, second, &ComparisonConfig::default())
}

/// Compare two meshes
///
/// Runs the two directional distance passes and the volume overlap
/// estimate, then merges them into one [`MeshDifferences`]. Both meshes must
/// have at least one vertex and one face. Open surfaces are accepted with a
/// warning; their volume figures are unreliable.
pub fn compare_with_config(
    first: &Mesh,
    second: &Mesh,
    config: &ComparisonConfig,
) -> Result<MeshDifferences> {
    config.validate()?;
    first.ensure_not_empty("mesh1")?;
    second.ensure_not_empty("mesh2")?;

    log::info!(
        "Comparing mesh1 ({} vertices, {} faces) with mesh2 ({} vertices, {} faces)",
        first.num_vertices(),
        first.num_faces(),
        second.num_vertices(),
        second.num_faces()
    );

    validate_surface_closure(first, "mesh1");
    validate_surface_closure(second, "mesh2");

    #[cfg(feature = "parallel")]
    let (distance, overlap) = rayon::join(
        || symmetric_distance(first, second, &config.sampling),
        || volume_overlap(first, second, &config.volume),
    );

    #[cfg(not(feature = "parallel"))]
    let (distance, overlap) = (
        symmetric_distance(first, second, &config.sampling),
        volume_overlap(first, second, &config.volume),
    );

    let differences = MeshDifferences::new(&distance?, &overlap?);
    log::info!(
        "Comparison complete: mean |d| {:.6}, max |d| {:.6}, dice {:.6}",
        differences.abs_mean_dist,
        differences.abs_max_dist,
        differences.volume_overlap
    );

    Ok(differences)
}
