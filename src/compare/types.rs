//! Comparison result types

use serde::{Deserialize, Serialize};

/// Names of the nine result fields, in interchange order
pub const RESULT_FIELD_NAMES: [&str; 9] = [
    "min_dist",
    "max_dist",
    "min_abs_dist",
    "max_abs_dist",
    "mean_dist",
    "mean_abs_dist",
    "rms_dist",
    "volume_overlap",
    "int_over_union",
];

/// Summary of the signed distances measured in one direction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistanceStats {
    /// Most negative signed distance
    pub min_signed: f64,

    /// Most positive signed distance
    pub max_signed: f64,

    /// Smallest absolute distance
    pub min_abs: f64,

    /// Largest absolute distance
    pub max_abs: f64,

    /// Mean of the signed distances
    pub mean_signed: f64,

    /// Mean of the absolute distances
    pub mean_abs: f64,

    /// Root mean square of the signed distances
    pub rms: f64,

    /// Number of distance evaluations
    pub sample_count: usize,
}

/// Running sums for [`DistanceStats`]
///
/// Partial accumulators (one per face, per thread, ...) combine with
/// [`DistanceAccumulator::merge`] in any grouping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceAccumulator {
    count: usize,
    sum: f64,
    sum_abs: f64,
    sum_squares: f64,
    min_signed: f64,
    max_signed: f64,
    min_abs: f64,
    max_abs: f64,
}

impl Default for DistanceAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl DistanceAccumulator {
    /// Empty accumulator
    pub fn new() -> Self {
        Self {
            count: 0,
            sum: 0.0,
            sum_abs: 0.0,
            sum_squares: 0.0,
            min_signed: f64::INFINITY,
            max_signed: f64::NEG_INFINITY,
            min_abs: f64::INFINITY,
            max_abs: f64::NEG_INFINITY,
        }
    }

    /// Record one signed distance
    pub fn add(&mut self, distance: f64) {
        let abs = distance.abs();
        self.count += 1;
        self.sum += distance;
        self.sum_abs += abs;
        self.sum_squares += distance * distance;
        self.min_signed = self.min_signed.min(distance);
        self.max_signed = self.max_signed.max(distance);
        self.min_abs = self.min_abs.min(abs);
        self.max_abs = self.max_abs.max(abs);
    }

    /// Combine two partial accumulators
    pub fn merge(self, other: Self) -> Self {
        Self {
            count: self.count + other.count,
            sum: self.sum + other.sum,
            sum_abs: self.sum_abs + other.sum_abs,
            sum_squares: self.sum_squares + other.sum_squares,
            min_signed: self.min_signed.min(other.min_signed),
            max_signed: self.max_signed.max(other.max_signed),
            min_abs: self.min_abs.min(other.min_abs),
            max_abs: self.max_abs.max(other.max_abs),
        }
    }

    /// Number of distances recorded
    pub fn count(&self) -> usize {
        self.count
    }

    /// Final statistics; all zero when nothing was recorded
    pub fn finish(&self) -> DistanceStats {
        if self.count == 0 {
            return DistanceStats {
                min_signed: 0.0,
                max_signed: 0.0,
                min_abs: 0.0,
                max_abs: 0.0,
                mean_signed: 0.0,
                mean_abs: 0.0,
                rms: 0.0,
                sample_count: 0,
            };
        }

        let n = self.count as f64;
        DistanceStats {
            min_signed: self.min_signed,
            max_signed: self.max_signed,
            min_abs: self.min_abs,
            max_abs: self.max_abs,
            mean_signed: self.sum / n,
            mean_abs: self.sum_abs / n,
            rms: (self.sum_squares / n).sqrt(),
            sample_count: self.count,
        }
    }
}

/// Order-independent distance profile of two surfaces
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SymmetricDistance {
    pub min_dist: f64,
    pub max_dist: f64,
    pub abs_min_dist: f64,
    pub abs_max_dist: f64,
    pub mean_dist: f64,
    pub abs_mean_dist: f64,
    pub rms_dist: f64,
}

/// Volumetric comparison of two enclosed regions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverlapReport {
    /// Dice coefficient: 2|A∩B| / (|A| + |B|)
    pub volume_overlap: f64,

    /// |A∩B| / |A∪B|
    pub intersection_over_union: f64,

    /// Voxels inside the first surface
    pub voxels_first: u64,

    /// Voxels inside the second surface
    pub voxels_second: u64,

    /// Voxels inside both
    pub voxels_intersection: u64,

    /// Voxel edge lengths along x, y and z
    pub voxel_size: [f64; 3],

    /// Triangles ignored as degenerate (zero area, repeated or non-finite corners)
    pub skipped_triangles: usize,
}

impl OverlapReport {
    /// Ratios from voxel counts; either is 0 when its denominator is 0
    pub fn from_counts(
        voxels_first: u64,
        voxels_second: u64,
        voxels_intersection: u64,
        voxel_size: [f64; 3],
        skipped_triangles: usize,
    ) -> Self {
        let total = voxels_first + voxels_second;
        let union = total - voxels_intersection;

        let volume_overlap = if total > 0 {
            (2.0 * voxels_intersection as f64 / total as f64).clamp(0.0, 1.0)
        } else {
            0.0
        };

        let intersection_over_union = if union > 0 {
            (voxels_intersection as f64 / union as f64).clamp(0.0, 1.0)
        } else {
            0.0
        };

        Self {
            volume_overlap,
            intersection_over_union,
            voxels_first,
            voxels_second,
            voxels_intersection,
            voxel_size,
            skipped_triangles,
        }
    }

    /// Volume of one voxel
    pub fn voxel_volume(&self) -> f64 {
        self.voxel_size.iter().product()
    }

    /// Volume enclosed by the first surface, in model units
    pub fn volume_first(&self) -> f64 {
        self.voxels_first as f64 * self.voxel_volume()
    }

    /// Volume enclosed by the second surface, in model units
    pub fn volume_second(&self) -> f64 {
        self.voxels_second as f64 * self.voxel_volume()
    }
}

/// Symmetric comparison of two meshes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeshDifferences {
    pub min_dist: f64,
    pub max_dist: f64,
    pub abs_min_dist: f64,
    pub abs_max_dist: f64,
    pub mean_dist: f64,
    pub abs_mean_dist: f64,
    pub rms_dist: f64,
    pub volume_overlap: f64,
    pub intersection_over_union: f64,
}

impl MeshDifferences {
    /// Merge the distance profile and the volume ratios
    pub fn new(distance: &SymmetricDistance, overlap: &OverlapReport) -> Self {
        Self {
            min_dist: distance.min_dist,
            max_dist: distance.max_dist,
            abs_min_dist: distance.abs_min_dist,
            abs_max_dist: distance.abs_max_dist,
            mean_dist: distance.mean_dist,
            abs_mean_dist: distance.abs_mean_dist,
            rms_dist: distance.rms_dist,
            volume_overlap: overlap.volume_overlap,
            intersection_over_union: overlap.intersection_over_union,
        }
    }

    /// Values in interchange order (see [`RESULT_FIELD_NAMES`])
    pub fn values(&self) -> [f64; 9] {
        [
            self.min_dist,
            self.max_dist,
            self.abs_min_dist,
            self.abs_max_dist,
            self.mean_dist,
            self.abs_mean_dist,
            self.rms_dist,
            self.volume_overlap,
            self.intersection_over_union,
        ]
    }

    /// Print summary statistics
    pub fn print_summary(&self) {
        println!("\n{}", "=".repeat(60));
        println!("MESH COMPARISON RESULTS");
        println!("{}", "=".repeat(60));
        println!();
        println!("  Signed Distance:");
        println!("    Min:       {:.6}", self.min_dist);
        println!("    Max:       {:.6}", self.max_dist);
        println!("    Mean:      {:.6}", self.mean_dist);
        println!("    RMS:       {:.6}", self.rms_dist);
        println!();
        println!("  Absolute Distance:");
        println!("    Min:       {:.6}", self.abs_min_dist);
        println!("    Max:       {:.6}", self.abs_max_dist);
        println!("    Mean:      {:.6}", self.abs_mean_dist);
        println!();
        println!("  Volume:");
        println!("    Overlap (Dice):       {:.6}", self.volume_overlap);
        println!("    Intersection/Union:   {:.6}", self.intersection_over_union);
        println!();
        println!("{}", "=".repeat(60));
    }
}
