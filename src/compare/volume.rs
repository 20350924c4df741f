//! Volume overlap of two closed surfaces
//!
//! Both surfaces are voxelised on one shared isotropic grid spanning their
//! combined bounding box. For each (y, z) column a ray is cast along +x
//! through the voxel centres; the ray's crossings with each surface decide
//! which centres are inside. Crossing tests use exact-sign-consistent edge
//! functions with a top-left tie rule, so a ray through an edge or vertex
//! shared by several triangles is counted exactly once.

use crate::compare::types::OverlapReport;
use crate::config::{FillRule, VolumeConfig};
use crate::error::{MeshCompareError, Result};
use crate::mesh::geometry::{triangle_area, DEGENERATE_AREA};
use crate::mesh::types::{Bounds, Mesh, Point};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Flat, 1-based triangulation buffers
///
/// `coordinates` holds `x, y, z` per vertex; `triangles` holds three
/// 1-based vertex indices per triangle. This is the exchange layout used by
/// the volume estimator; the buffers are owned by the value and released
/// with it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlatTriangulation {
    coordinates: Vec<f64>,
    triangles: Vec<usize>,
}

impl FlatTriangulation {
    /// Wrap flat buffers, checking their lengths and index range
    pub fn new(coordinates: Vec<f64>, triangles: Vec<usize>) -> Result<Self> {
        if coordinates.len() % 3 != 0 {
            return Err(MeshCompareError::InvalidMesh(format!(
                "coordinate buffer length {} is not a multiple of 3",
                coordinates.len()
            )));
        }
        if triangles.len() % 3 != 0 {
            return Err(MeshCompareError::InvalidMesh(format!(
                "triangle buffer length {} is not a multiple of 3",
                triangles.len()
            )));
        }

        let num_vertices = coordinates.len() / 3;
        if let Some(&bad) = triangles.iter().find(|&&i| i == 0 || i > num_vertices) {
            return Err(MeshCompareError::InvalidMeshTopology(format!(
                "1-based vertex index {} outside 1..={}",
                bad, num_vertices
            )));
        }

        Ok(Self {
            coordinates,
            triangles,
        })
    }

    /// Flatten a mesh (0-based faces) into 1-based buffers
    pub fn from_mesh(mesh: &Mesh) -> Self {
        let coordinates = mesh
            .vertices()
            .iter()
            .flat_map(|p| [p.x, p.y, p.z])
            .collect();
        let triangles = mesh
            .faces()
            .iter()
            .flat_map(|f| [f[0] + 1, f[1] + 1, f[2] + 1])
            .collect();

        Self {
            coordinates,
            triangles,
        }
    }

    pub fn num_vertices(&self) -> usize {
        self.coordinates.len() / 3
    }

    pub fn num_triangles(&self) -> usize {
        self.triangles.len() / 3
    }

    pub fn coordinates(&self) -> &[f64] {
        &self.coordinates
    }

    pub fn triangles(&self) -> &[usize] {
        &self.triangles
    }

    /// Vertex by 1-based index
    pub fn vertex(&self, index: usize) -> Point {
        let base = (index - 1) * 3;
        Point::new(
            self.coordinates[base],
            self.coordinates[base + 1],
            self.coordinates[base + 2],
        )
    }

    /// 1-based corner indices of triangle `t` (0-based triangle number)
    pub fn triangle_indices(&self, t: usize) -> [usize; 3] {
        [
            self.triangles[3 * t],
            self.triangles[3 * t + 1],
            self.triangles[3 * t + 2],
        ]
    }

    /// Bounds of the finite vertices referenced by triangles
    pub fn bounds(&self) -> Option<Bounds> {
        let points: Vec<Point> = self
            .triangles
            .iter()
            .map(|&i| self.vertex(i))
            .filter(|p| p.iter().all(|c| c.is_finite()))
            .collect();
        Bounds::from_points(&points)
    }
}

/// One ray/triangle crossing within a column
#[derive(Debug, Clone, Copy)]
struct Crossing {
    x: f64,
    /// +1 entering (normal against the ray), -1 leaving
    winding: i32,
}

/// Shared voxel grid
///
/// Voxels are cubes of `longest extent / resolution` unless that leaves an
/// axis with fewer than `min_axis_cells` voxels; such an axis is split into
/// exactly `min_axis_cells` thinner voxels instead.
#[derive(Debug, Clone, Copy)]
struct Grid {
    origin: Point,
    voxel_size: [f64; 3],
    dims: [usize; 3],
}

impl Grid {
    fn around(bounds: &Bounds, resolution: usize, min_axis_cells: usize) -> Option<Self> {
        let extent = bounds.extent();
        let longest = extent.x.max(extent.y).max(extent.z);
        if !(longest > 0.0 && longest.is_finite()) {
            return None;
        }

        let cube = longest / resolution as f64;
        let axis = |length: f64| {
            let cells = ((length / cube - 1e-9).ceil() as usize).max(1);
            if length > 0.0 && cells < min_axis_cells {
                (min_axis_cells, length / min_axis_cells as f64)
            } else {
                (cells, cube)
            }
        };

        let (nx, sx) = axis(extent.x);
        let (ny, sy) = axis(extent.y);
        let (nz, sz) = axis(extent.z);

        Some(Self {
            origin: bounds.min,
            voxel_size: [sx, sy, sz],
            dims: [nx, ny, nz],
        })
    }

    fn num_columns(&self) -> usize {
        self.dims[1] * self.dims[2]
    }

    fn centre(&self, axis: usize, i: usize) -> f64 {
        self.origin[axis] + (i as f64 + 0.5) * self.voxel_size[axis]
    }

    /// Index range of voxel centres within `[lo, hi]` along `axis`
    fn centre_range(&self, axis: usize, lo: f64, hi: f64) -> Option<(usize, usize)> {
        let first = ((lo - self.origin[axis]) / self.voxel_size[axis] - 0.5).ceil();
        let last = ((hi - self.origin[axis]) / self.voxel_size[axis] - 0.5).floor();
        let max = (self.dims[axis] - 1) as f64;

        let first = first.max(0.0);
        let last = last.min(max);
        if first > last {
            None
        } else {
            Some((first as usize, last as usize))
        }
    }
}

/// Volume overlap of two meshes
///
/// Both meshes must be non-empty; open or self-intersecting surfaces still
/// produce a result but it is only meaningful for closed ones.
pub fn volume_overlap(first: &Mesh, second: &Mesh, config: &VolumeConfig) -> Result<OverlapReport> {
    first.ensure_not_empty("first mesh")?;
    second.ensure_not_empty("second mesh")?;

    let a = FlatTriangulation::from_mesh(first);
    let b = FlatTriangulation::from_mesh(second);
    Ok(robust_volume_overlap(&a, &b, config))
}

/// Volume overlap of two flat triangulations
///
/// Returns the Dice coefficient and intersection-over-union of the enclosed
/// regions. Degenerate triangles are skipped and reported; a pair with no
/// enclosed volume yields zero for both ratios.
pub fn robust_volume_overlap(
    a: &FlatTriangulation,
    b: &FlatTriangulation,
    config: &VolumeConfig,
) -> OverlapReport {
    let bounds = match (a.bounds(), b.bounds()) {
        (Some(ba), Some(bb)) => ba.union(&bb),
        (Some(ba), None) => ba,
        (None, Some(bb)) => bb,
        (None, None) => return OverlapReport::from_counts(0, 0, 0, [0.0; 3], 0),
    };

    let grid = match Grid::around(&bounds, config.resolution.max(1), config.min_axis_cells) {
        Some(grid) => grid,
        None => {
            log::warn!("Surfaces enclose no volume (zero-size bounding box)");
            return OverlapReport::from_counts(0, 0, 0, [0.0; 3], 0);
        }
    };

    log::debug!(
        "Voxel grid {}x{}x{} with voxel size {:.6} x {:.6} x {:.6}",
        grid.dims[0],
        grid.dims[1],
        grid.dims[2],
        grid.voxel_size[0],
        grid.voxel_size[1],
        grid.voxel_size[2]
    );

    let (columns_a, skipped_a) = bin_crossings(a, &grid);
    let (columns_b, skipped_b) = bin_crossings(b, &grid);
    let skipped = skipped_a + skipped_b;

    if skipped > 0 {
        log::warn!(
            "Skipped {} degenerate triangles ({} in first, {} in second)",
            skipped,
            skipped_a,
            skipped_b
        );
    }

    let fill_rule = config.fill_rule;
    let count = |column: usize| count_column(&columns_a[column], &columns_b[column], &grid, fill_rule);

    #[cfg(feature = "parallel")]
    let (in_a, in_b, in_both) = (0..grid.num_columns())
        .into_par_iter()
        .map(count)
        .reduce(|| (0, 0, 0), add_counts);

    #[cfg(not(feature = "parallel"))]
    let (in_a, in_b, in_both) = (0..grid.num_columns())
        .map(count)
        .fold((0, 0, 0), add_counts);

    let report = OverlapReport::from_counts(in_a, in_b, in_both, grid.voxel_size, skipped);
    log::info!(
        "Volume overlap: {} / {} voxels, {} shared (dice {:.6}, IoU {:.6})",
        in_a,
        in_b,
        in_both,
        report.volume_overlap,
        report.intersection_over_union
    );

    report
}

fn add_counts(l: (u64, u64, u64), r: (u64, u64, u64)) -> (u64, u64, u64) {
    (l.0 + r.0, l.1 + r.1, l.2 + r.2)
}

/// Distribute every triangle's ray crossings into the columns it covers
fn bin_crossings(tri: &FlatTriangulation, grid: &Grid) -> (Vec<Vec<Crossing>>, usize) {
    let mut columns: Vec<Vec<Crossing>> = vec![Vec::new(); grid.num_columns()];
    let mut skipped = 0;

    for t in 0..tri.num_triangles() {
        let ids = tri.triangle_indices(t);
        let [p0, p1, p2] = ids.map(|i| tri.vertex(i));

        let finite = [p0, p1, p2]
            .iter()
            .all(|p| p.iter().all(|c| c.is_finite()));
        let repeated = ids[0] == ids[1] || ids[1] == ids[2] || ids[0] == ids[2];
        if !finite || repeated || triangle_area(&p0, &p1, &p2) <= DEGENERATE_AREA {
            skipped += 1;
            continue;
        }

        add_triangle_crossings(&mut columns, grid, [p0, p1, p2]);
    }

    (columns, skipped)
}

/// 2D position in the (y, z) plane
type Yz = (f64, f64);

/// Edge function of `p` against the directed edge `a → b`
///
/// Evaluated in a canonical vertex order and negated for the opposite
/// direction, so two triangles sharing an edge see exactly opposite values.
fn edge_function(a: Yz, b: Yz, p: Yz) -> f64 {
    let (lo, hi, sign) = if a <= b { (a, b, 1.0) } else { (b, a, -1.0) };
    sign * ((hi.0 - lo.0) * (p.1 - lo.1) - (hi.1 - lo.1) * (p.0 - lo.0))
}

/// Top-left rule for a counter-clockwise triangle in (y, z)
fn is_top_left(a: Yz, b: Yz) -> bool {
    let (dy, dz) = (b.0 - a.0, b.1 - a.1);
    dz < 0.0 || (dz == 0.0 && dy < 0.0)
}

fn covers(w: f64, a: Yz, b: Yz) -> bool {
    w > 0.0 || (w == 0.0 && is_top_left(a, b))
}

fn add_triangle_crossings(columns: &mut [Vec<Crossing>], grid: &Grid, corners: [Point; 3]) {
    let mut q: [Yz; 3] = corners.map(|p| (p.y, p.z));
    let mut x = corners.map(|p| p.x);

    let area2 = edge_function(q[0], q[1], q[2]);
    if area2 == 0.0 {
        // Parallel to the rays
        return;
    }

    // Normal x-component has the sign of area2; facing +x means leaving
    let winding = if area2 > 0.0 { -1 } else { 1 };
    if area2 < 0.0 {
        q.swap(1, 2);
        x.swap(1, 2);
    }
    let area2 = area2.abs();

    let y_lo = q[0].0.min(q[1].0).min(q[2].0);
    let y_hi = q[0].0.max(q[1].0).max(q[2].0);
    let z_lo = q[0].1.min(q[1].1).min(q[2].1);
    let z_hi = q[0].1.max(q[1].1).max(q[2].1);

    let (Some((j0, j1)), Some((k0, k1))) = (
        grid.centre_range(1, y_lo, y_hi),
        grid.centre_range(2, z_lo, z_hi),
    ) else {
        return;
    };

    for k in k0..=k1 {
        let zc = grid.centre(2, k);
        for j in j0..=j1 {
            let p = (grid.centre(1, j), zc);

            let w0 = edge_function(q[1], q[2], p);
            let w1 = edge_function(q[2], q[0], p);
            let w2 = edge_function(q[0], q[1], p);

            if covers(w0, q[1], q[2]) && covers(w1, q[2], q[0]) && covers(w2, q[0], q[1]) {
                let hit = (w0 * x[0] + w1 * x[1] + w2 * x[2]) / area2;
                columns[k * grid.dims[1] + j].push(Crossing { x: hit, winding });
            }
        }
    }
}

/// Inside-voxel counts of one column: (first, second, both)
fn count_column(
    crossings_a: &[Crossing],
    crossings_b: &[Crossing],
    grid: &Grid,
    fill_rule: FillRule,
) -> (u64, u64, u64) {
    if crossings_a.is_empty() && crossings_b.is_empty() {
        return (0, 0, 0);
    }

    let mut sorted_a = crossings_a.to_vec();
    let mut sorted_b = crossings_b.to_vec();
    sorted_a.sort_by(|l, r| l.x.total_cmp(&r.x));
    sorted_b.sort_by(|l, r| l.x.total_cmp(&r.x));

    let mut walker_a = RayWalker::new(&sorted_a, fill_rule);
    let mut walker_b = RayWalker::new(&sorted_b, fill_rule);
    let mut counts = (0, 0, 0);

    for i in 0..grid.dims[0] {
        let xc = grid.centre(0, i);
        let inside_a = walker_a.advance_to(xc);
        let inside_b = walker_b.advance_to(xc);

        counts.0 += inside_a as u64;
        counts.1 += inside_b as u64;
        counts.2 += (inside_a && inside_b) as u64;
    }

    counts
}

/// Inside/outside state along a ray with sorted crossings
struct RayWalker<'a> {
    crossings: &'a [Crossing],
    next: usize,
    winding: i32,
    parity: bool,
    fill_rule: FillRule,
}

impl<'a> RayWalker<'a> {
    fn new(crossings: &'a [Crossing], fill_rule: FillRule) -> Self {
        Self {
            crossings,
            next: 0,
            winding: 0,
            parity: false,
            fill_rule,
        }
    }

    /// Apply all crossings before `x` and report whether `x` is inside
    fn advance_to(&mut self, x: f64) -> bool {
        while let Some(c) = self.crossings.get(self.next) {
            if c.x >= x {
                break;
            }
            self.winding += c.winding;
            self.parity = !self.parity;
            self.next += 1;
        }

        match self.fill_rule {
            FillRule::NonZero => self.winding != 0,
            FillRule::EvenOdd => self.parity,
        }
    }
}
