//! Symmetric combination of the two directional distance passes

use crate::compare::sampling::directional_distance;
use crate::compare::types::{DistanceStats, SymmetricDistance};
use crate::config::SamplingConfig;
use crate::error::Result;
use crate::mesh::types::Mesh;

/// Combine the `first → second` and `second → first` passes
///
/// Extremes take the min/max over both passes, `mean_dist` is the plain
/// average of the two signed means, and the absolute mean and RMS are
/// weighted by each pass's sample count. Swapping the arguments gives the
/// same result.
pub fn combine(forward: &DistanceStats, backward: &DistanceStats) -> SymmetricDistance {
    let n1 = forward.sample_count as f64;
    let n2 = backward.sample_count as f64;
    let total = n1 + n2;

    let (abs_mean_dist, rms_dist) = if total > 0.0 {
        (
            (forward.mean_abs * n1 + backward.mean_abs * n2) / total,
            ((forward.rms * forward.rms * n1 + backward.rms * backward.rms * n2) / total).sqrt(),
        )
    } else {
        (0.0, 0.0)
    };

    SymmetricDistance {
        min_dist: forward.min_signed.min(backward.min_signed),
        max_dist: forward.max_signed.max(backward.max_signed),
        abs_min_dist: forward.min_abs.min(backward.min_abs),
        abs_max_dist: forward.max_abs.max(backward.max_abs),
        mean_dist: (forward.mean_signed + backward.mean_signed) / 2.0,
        abs_mean_dist,
        rms_dist,
    }
}

/// Sample both directions and combine them
pub fn symmetric_distance(
    first: &Mesh,
    second: &Mesh,
    config: &SamplingConfig,
) -> Result<SymmetricDistance> {
    #[cfg(feature = "parallel")]
    let (forward, backward) = rayon::join(
        || directional_distance(first, second, config),
        || directional_distance(second, first, config),
    );

    #[cfg(not(feature = "parallel"))]
    let (forward, backward) = (
        directional_distance(first, second, config),
        directional_distance(second, first, config),
    );

    let (forward, backward) = (forward?, backward?);
    log::info!(
        "Distance samples: {} (first -> second), {} (second -> first)",
        forward.sample_count,
        backward.sample_count
    );

    Ok(combine(&forward, &backward))
}
