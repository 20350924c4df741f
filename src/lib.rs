//! Mesh Compare Library
//!
//! Symmetric surface-distance and volume-overlap comparison of two triangulated
//! surfaces, e.g. a segmentation result against its ground truth.

pub mod compare;
pub mod config;
pub mod error;
pub mod io;
pub mod mesh;

pub use compare::{compare, compare_with_config, MeshDifferences};
pub use config::ComparisonConfig;
pub use error::{MeshCompareError, Result};
pub use mesh::Mesh;
