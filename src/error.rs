//! Error types for the mesh comparison engine
//!
//! This module defines all error types that can occur while loading meshes and
//! masks, validating them, and comparing them.

use thiserror::Error;

/// Error types for mesh comparison operations
///
/// Numerical degeneracies found while sampling or voxelising (zero-area
/// triangles, duplicate vertices) are not represented here: they are skipped,
/// counted and logged, never returned.
#[derive(Error, Debug)]
pub enum MeshCompareError {
    /// A mesh passed to the comparison engine is empty
    ///
    /// Raised at the engine boundary, before any sampling begins, when a mesh
    /// has no vertices or no faces.
    #[error("Invalid mesh: {0}")]
    InvalidMesh(String),

    /// Mesh topology is invalid or corrupted
    ///
    /// This error occurs when a face references a vertex index outside the
    /// vertex array, or when an input file describes an unusable cell layout.
    #[error("Invalid mesh topology: {0}")]
    InvalidMeshTopology(String),

    /// File I/O error
    ///
    /// Wraps standard I/O errors from file operations.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON mesh, mask or report (de)serialization error
    #[error("JSON error: {0}")]
    JsonError(String),

    /// VTK file reading or writing error
    #[error("VTK error: {0}")]
    VtkError(String),

    /// Configuration error
    ///
    /// Invalid configuration file format, missing required fields,
    /// or invalid parameter values.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Binary mask error
    ///
    /// Dimension/data mismatches, non-positive spacing, or a mask without any
    /// foreground voxel.
    #[error("Mask error: {0}")]
    MaskError(String),

    /// The input file type is not recognised
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),
}

/// Convenience type alias for Results with [`MeshCompareError`]
///
/// # Example
/// ```
/// use mesh_compare::Result;
///
/// fn my_function() -> Result<()> {
///     Ok(())
/// }
/// ```
pub type Result<T> = std::result::Result<T, MeshCompareError>;
