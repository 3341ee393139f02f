//! Target mesh arena for relaxation
//!
//! Vertices, edges and faces live in flat vectors addressed by stable `u32`
//! ids. Per-vertex adjacency (`link_edges`, `link_faces`) is kept as id lists
//! built once at construction, so the solver only needs read access to
//! topology and write access to positions.

mod construction;
mod topology;
mod types;
mod validation;

use std::collections::HashMap;

pub use types::{Edge, EdgeId, Face, FaceId, MeshError, Vertex, VertexId};

/// Polygon mesh being retopologized.
#[derive(Debug, Clone)]
pub struct TargetMesh {
    pub(crate) vertices: Vec<Vertex>,
    pub(crate) edges: Vec<Edge>,
    pub(crate) faces: Vec<Face>,
    /// Edges incident to each vertex, indexed by vertex id
    pub(crate) link_edges: Vec<Vec<EdgeId>>,
    /// Faces incident to each vertex, indexed by vertex id
    pub(crate) link_faces: Vec<Vec<FaceId>>,
    /// Map from sorted vertex pair to edge
    pub(crate) edge_map: HashMap<(VertexId, VertexId), EdgeId>,
    /// Set when positions change; cleared by the host after it resyncs
    pub(crate) dirty: bool,
}

/// Key for the edge map, independent of endpoint order.
pub(crate) fn edge_key(a: VertexId, b: VertexId) -> (VertexId, VertexId) {
    if a <= b { (a, b) } else { (b, a) }
}

#[cfg(test)]
pub(crate) mod test_meshes {
    use super::*;
    use glam::Vec3;

    /// Regular grid of `n × n` vertices in the XY plane with unit spacing,
    /// split into quads. Vertex `(x, y)` has id `y * n + x`.
    pub fn grid(n: u32) -> TargetMesh {
        let mut positions = Vec::new();
        for y in 0..n {
            for x in 0..n {
                positions.push(Vec3::new(x as f32, y as f32, 0.0));
            }
        }
        let mut quads = Vec::new();
        for y in 0..n - 1 {
            for x in 0..n - 1 {
                let i = y * n + x;
                quads.push(vec![i, i + 1, i + n + 1, i + n]);
            }
        }
        TargetMesh::from_polygons(&positions, &quads).unwrap()
    }

    /// Grid like [`grid`] with every vertex nudged in XY by up to `amount`.
    /// The offsets are deterministic.
    pub fn jittered_grid(n: u32, amount: f32) -> TargetMesh {
        let mut mesh = grid(n);
        for k in 0..n * n {
            let offset = Vec3::new(
                (k as f32 * 1.7 + 0.3).sin() * amount,
                (k as f32 * 2.3 + 0.1).cos() * amount,
                0.0,
            );
            let id = VertexId(k);
            if let Some(p) = mesh.position(id) {
                mesh.set_vertex_position(id, p + offset);
            }
        }
        mesh.recalculate_normals();
        mesh.take_dirty();
        mesh
    }

    /// Hexagonal triangle patch with `rings` rings around the origin and unit
    /// edge length.
    pub fn hex_patch(rings: i32) -> TargetMesh {
        let mut index = HashMap::new();
        let mut positions = Vec::new();
        for q in -rings..=rings {
            for r in -rings..=rings {
                if (q + r).abs() <= rings {
                    index.insert((q, r), positions.len() as u32);
                    positions.push(Vec3::new(
                        q as f32 + 0.5 * r as f32,
                        r as f32 * 3.0_f32.sqrt() / 2.0,
                        0.0,
                    ));
                }
            }
        }
        let mut triangles = Vec::new();
        for q in -rings..=rings {
            for r in -rings..=rings {
                let Some(&i) = index.get(&(q, r)) else {
                    continue;
                };
                let a = index.get(&(q + 1, r));
                let b = index.get(&(q, r + 1));
                let c = index.get(&(q - 1, r + 1));
                if let (Some(&a), Some(&b)) = (a, b) {
                    triangles.push(vec![i, a, b]);
                }
                if let (Some(&b), Some(&c)) = (b, c) {
                    triangles.push(vec![i, b, c]);
                }
            }
        }
        TargetMesh::from_polygons(&positions, &triangles).unwrap()
    }

    /// Id of the vertex closest to `point`.
    pub fn closest_vertex(mesh: &TargetMesh, point: Vec3) -> VertexId {
        mesh.vertices()
            .iter()
            .min_by(|a, b| {
                a.position
                    .distance_squared(point)
                    .total_cmp(&b.position.distance_squared(point))
            })
            .map(|v| v.id)
            .unwrap()
    }
}
