//! Spatial index for exact point-to-surface queries
//!
//! Answers "closest point on this mesh" with a bounding volume hierarchy over
//! the triangles. A k-d tree over the referenced vertices supplies the initial
//! search radius: the nearest vertex is always on the surface, so its distance
//! bounds the answer and prunes most of the hierarchy before any triangle test.
//!
//! The sign of a distance comes from the angle-weighted pseudo-normal of the
//! closest feature (Bærentzen & Aanæs, 2005), which classifies inside/outside
//! correctly for closed, consistently oriented surfaces even when the closest
//! point lies on an edge or a vertex.

use crate::mesh::geometry::{
    closest_point_on_triangle, corner_angle, distance_squared_to_box, triangle_normal,
    TriangleFeature,
};
use crate::mesh::types::{Bounds, Mesh, Point, Vec3};
use kiddo::{ImmutableKdTree, SquaredEuclidean};
use std::collections::HashMap;

/// Maximum number of triangles in a BVH leaf
const LEAF_SIZE: usize = 4;

/// Result of a closest-point query
#[derive(Debug, Clone, Copy)]
pub struct SurfacePoint {
    /// Closest point on the surface
    pub point: Point,

    /// Squared distance from the query to `point`
    pub distance_squared: f64,

    /// Face containing `point`
    pub face: usize,

    /// Feature of `face` that `point` lies on
    pub feature: TriangleFeature,
}

#[derive(Debug, Clone)]
enum NodeKind {
    Leaf { start: usize, count: usize },
    Inner { left: usize, right: usize },
}

#[derive(Debug, Clone)]
struct BvhNode {
    bounds: Bounds,
    kind: NodeKind,
}

/// Acceleration structure and pseudo-normals for one reference mesh
///
/// Borrows the mesh; it lives only as long as the comparison that built it.
/// Signs follow the face winding, so a closed surface whose triangles all
/// face inward reports every distance with the opposite sign.
pub struct SurfaceIndex<'a> {
    mesh: &'a Mesh,
    nodes: Vec<BvhNode>,
    /// Face indices, permuted so each leaf owns a contiguous range
    face_order: Vec<usize>,
    vertex_tree: Option<ImmutableKdTree<f64, 3>>,
    face_normals: Vec<Vec3>,
    edge_normals: HashMap<(usize, usize), Vec3>,
    vertex_normals: Vec<Vec3>,
    inward: bool,
}

impl<'a> SurfaceIndex<'a> {
    /// Build the index for a non-empty mesh
    pub fn build(mesh: &'a Mesh) -> Self {
        let (face_normals, edge_normals, vertex_normals) = compute_pseudo_normals(mesh);

        let referenced: Vec<[f64; 3]> = referenced_vertices(mesh)
            .into_iter()
            .map(|p| [p.x, p.y, p.z])
            .collect();
        let vertex_tree = (!referenced.is_empty()).then(|| ImmutableKdTree::new_from_slice(&referenced));

        let face_bounds: Vec<Bounds> = mesh
            .triangles()
            .map(|tri| Bounds::from_points(&tri).unwrap_or(Bounds::new(tri[0], tri[0])))
            .collect();

        let mut face_order: Vec<usize> = (0..mesh.num_faces()).collect();
        let mut nodes = Vec::with_capacity(2 * mesh.num_faces() / LEAF_SIZE + 1);
        if !face_order.is_empty() {
            build_node(&mut nodes, &mut face_order, 0, &face_bounds);
        }

        log::debug!(
            "Built surface index: {} faces, {} BVH nodes, {} indexed vertices",
            mesh.num_faces(),
            nodes.len(),
            referenced.len()
        );

        let inward = mesh.signed_volume() < 0.0;
        if inward {
            log::warn!(
                "Reference surface encloses negative volume ({:.6}); its triangles face inward and distance signs will be reversed",
                mesh.signed_volume()
            );
        }

        Self {
            mesh,
            nodes,
            face_order,
            vertex_tree,
            face_normals,
            edge_normals,
            vertex_normals,
            inward,
        }
    }

    /// Whether the indexed surface is wound inward (negative enclosed volume)
    pub fn is_inward_oriented(&self) -> bool {
        self.inward
    }

    /// Find the closest point on the surface
    /// Returns `None` only for a mesh without faces
    pub fn closest_point(&self, query: &Point) -> Option<SurfacePoint> {
        let tree = self.vertex_tree.as_ref()?;
        if self.nodes.is_empty() {
            return None;
        }

        // Any referenced vertex lies on the surface, so the nearest one bounds
        // the search. The slack keeps its own triangle from being pruned.
        let nearest = tree.nearest_one::<SquaredEuclidean>(&[query.x, query.y, query.z]);
        let mut best_d2 = nearest.distance * (1.0 + 1e-9) + f64::MIN_POSITIVE;
        let mut best: Option<SurfacePoint> = None;

        let mut stack: Vec<usize> = Vec::with_capacity(64);
        stack.push(0);

        while let Some(node_idx) = stack.pop() {
            let node = &self.nodes[node_idx];
            if distance_squared_to_box(query, &node.bounds.min, &node.bounds.max) > best_d2 {
                continue;
            }

            match node.kind {
                NodeKind::Leaf { start, count } => {
                    for &face in &self.face_order[start..start + count] {
                        let [a, b, c] = self.mesh.triangle(face);
                        let (point, feature) = closest_point_on_triangle(query, &a, &b, &c);
                        let d2 = (query - point).norm_squared();
                        if d2 < best_d2 || (best.is_none() && d2 <= best_d2) {
                            best_d2 = d2;
                            best = Some(SurfacePoint {
                                point,
                                distance_squared: d2,
                                face,
                                feature,
                            });
                        }
                    }
                }
                NodeKind::Inner { left, right } => {
                    // Visit the nearer child first: push it last
                    let dl = {
                        let b = &self.nodes[left].bounds;
                        distance_squared_to_box(query, &b.min, &b.max)
                    };
                    let dr = {
                        let b = &self.nodes[right].bounds;
                        distance_squared_to_box(query, &b.min, &b.max)
                    };
                    if dl <= dr {
                        stack.push(right);
                        stack.push(left);
                    } else {
                        stack.push(left);
                        stack.push(right);
                    }
                }
            }
        }

        best.or_else(|| self.closest_point_exhaustive(query))
    }

    /// Linear scan over every face; fallback when pruning found nothing
    fn closest_point_exhaustive(&self, query: &Point) -> Option<SurfacePoint> {
        (0..self.mesh.num_faces())
            .map(|face| {
                let [a, b, c] = self.mesh.triangle(face);
                let (point, feature) = closest_point_on_triangle(query, &a, &b, &c);
                SurfacePoint {
                    point,
                    distance_squared: (query - point).norm_squared(),
                    face,
                    feature,
                }
            })
            .min_by(|x, y| x.distance_squared.total_cmp(&y.distance_squared))
    }

    /// Signed distance to the surface: positive outside, negative inside
    pub fn signed_distance(&self, query: &Point) -> Option<f64> {
        let hit = self.closest_point(query)?;
        let distance = hit.distance_squared.sqrt();

        if distance == 0.0 {
            return Some(0.0);
        }

        let normal = self.pseudo_normal(hit.face, hit.feature);
        if (query - hit.point).dot(&normal) < 0.0 {
            Some(-distance)
        } else {
            Some(distance)
        }
    }

    /// Angle-weighted pseudo-normal of a feature of `face`
    fn pseudo_normal(&self, face: usize, feature: TriangleFeature) -> Vec3 {
        let [v0, v1, v2] = self.mesh.faces()[face];
        let corners = [v0, v1, v2];
        match feature {
            TriangleFeature::Face => self.face_normals[face],
            TriangleFeature::Edge(k) => {
                let key = edge_key(corners[k], corners[(k + 1) % 3]);
                self.edge_normals
                    .get(&key)
                    .copied()
                    .unwrap_or(self.face_normals[face])
            }
            TriangleFeature::Vertex(k) => self.vertex_normals[corners[k]],
        }
    }
}

/// Positions of the vertices used by at least one face
fn referenced_vertices(mesh: &Mesh) -> Vec<Point> {
    let mut used = vec![false; mesh.num_vertices()];
    for face in mesh.faces() {
        for &v in face {
            used[v] = true;
        }
    }

    mesh.vertices()
        .iter()
        .zip(used)
        .filter_map(|(p, u)| u.then_some(*p))
        .collect()
}

/// Undirected edge key (smaller vertex first)
fn edge_key(a: usize, b: usize) -> (usize, usize) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Face normals, edge pseudo-normals and angle-weighted vertex pseudo-normals
/// Degenerate faces get a zero normal and contribute nothing
fn compute_pseudo_normals(mesh: &Mesh) -> (Vec<Vec3>, HashMap<(usize, usize), Vec3>, Vec<Vec3>) {
    let mut face_normals = Vec::with_capacity(mesh.num_faces());
    let mut edge_normals: HashMap<(usize, usize), Vec3> = HashMap::new();
    let mut vertex_normals = vec![Vec3::zeros(); mesh.num_vertices()];

    for (face_idx, face) in mesh.faces().iter().enumerate() {
        let [a, b, c] = mesh.triangle(face_idx);
        let normal = triangle_normal(&a, &b, &c).unwrap_or_else(Vec3::zeros);
        face_normals.push(normal);

        for k in 0..3 {
            *edge_normals
                .entry(edge_key(face[k], face[(k + 1) % 3]))
                .or_insert_with(Vec3::zeros) += normal;
        }

        vertex_normals[face[0]] += normal * corner_angle(&a, &b, &c);
        vertex_normals[face[1]] += normal * corner_angle(&b, &c, &a);
        vertex_normals[face[2]] += normal * corner_angle(&c, &a, &b);
    }

    (face_normals, edge_normals, vertex_normals)
}

/// Recursively build the BVH over `faces`, returning the node index
fn build_node(
    nodes: &mut Vec<BvhNode>,
    faces: &mut [usize],
    offset: usize,
    face_bounds: &[Bounds],
) -> usize {
    let bounds = faces
        .iter()
        .map(|&f| face_bounds[f])
        .reduce(|acc, b| acc.union(&b))
        .unwrap_or(face_bounds[faces[0]]);

    let node_idx = nodes.len();
    nodes.push(BvhNode {
        bounds,
        kind: NodeKind::Leaf {
            start: offset,
            count: faces.len(),
        },
    });

    if faces.len() <= LEAF_SIZE {
        return node_idx;
    }

    // Median split along the longest axis of the box centres
    let centre = |f: usize| {
        let b = &face_bounds[f];
        (b.min.coords + b.max.coords) / 2.0
    };
    let centre_points: Vec<Point> = faces.iter().map(|&f| Point::from(centre(f))).collect();
    let centre_bounds = Bounds::from_points(&centre_points).unwrap_or(bounds);
    let extent = centre_bounds.extent();
    let axis = if extent.x >= extent.y && extent.x >= extent.z {
        0
    } else if extent.y >= extent.z {
        1
    } else {
        2
    };

    let mid = faces.len() / 2;
    faces.select_nth_unstable_by(mid, |&a, &b| centre(a)[axis].total_cmp(&centre(b)[axis]));

    let (left_faces, right_faces) = faces.split_at_mut(mid);
    let left = build_node(nodes, left_faces, offset, face_bounds);
    let right = build_node(nodes, right_faces, offset + mid, face_bounds);
    nodes[node_idx].kind = NodeKind::Inner { left, right };

    node_idx
}
