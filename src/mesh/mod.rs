//! Mesh data structures and operations

pub mod geometry;
pub mod mask;
pub mod spatial;
pub mod surface;
pub mod types;

pub use geometry::*;
pub use mask::{mask_to_mesh, BinaryMask};
pub use spatial::{SurfaceIndex, SurfacePoint};
pub use surface::{count_non_manifold_edges, count_open_edges, validate_surface_closure};
pub use types::*;
