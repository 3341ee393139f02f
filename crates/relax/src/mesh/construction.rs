//! Construction methods for TargetMesh.

use glam::Vec3;
use std::collections::HashMap;

use super::types::{Edge, EdgeId, Face, FaceId, MeshError, Vertex, VertexId};
use super::{TargetMesh, edge_key};

impl TargetMesh {
    /// Build a mesh from vertex positions and polygon index lists.
    ///
    /// Every polygon needs at least three distinct vertices. Edges are shared
    /// between polygons that reference the same vertex pair. Vertices touching
    /// an edge that is not used by exactly two faces are flagged as boundary.
    pub fn from_polygons<P: AsRef<[u32]>>(
        positions: &[Vec3],
        polygons: &[P],
    ) -> Result<Self, MeshError> {
        let vertex_count = positions.len();

        let vertices: Vec<Vertex> = positions
            .iter()
            .enumerate()
            .map(|(i, &position)| Vertex {
                id: VertexId(i as u32),
                position,
                normal: Vec3::Y,
                selected: false,
                is_boundary: false,
            })
            .collect();

        let mut edges: Vec<Edge> = Vec::new();
        let mut faces: Vec<Face> = Vec::with_capacity(polygons.len());
        let mut link_edges: Vec<Vec<EdgeId>> = vec![Vec::new(); vertex_count];
        let mut link_faces: Vec<Vec<FaceId>> = vec![Vec::new(); vertex_count];
        let mut edge_map: HashMap<(VertexId, VertexId), EdgeId> = HashMap::new();
        let mut edge_face_count: Vec<u32> = Vec::new();

        for (face_index, polygon) in polygons.iter().enumerate() {
            let indices = polygon.as_ref();
            if indices.len() < 3 {
                return Err(MeshError::DegenerateFace {
                    face: face_index,
                    count: indices.len(),
                });
            }

            for (k, &index) in indices.iter().enumerate() {
                if index as usize >= vertex_count {
                    return Err(MeshError::VertexOutOfRange {
                        index,
                        count: vertex_count,
                    });
                }
                if indices[..k].contains(&index) {
                    return Err(MeshError::RepeatedVertex {
                        face: face_index,
                        vertex: index,
                    });
                }
            }

            let face_id = FaceId(faces.len() as u32);
            let face_vertices: Vec<VertexId> = indices.iter().map(|&i| VertexId(i)).collect();

            for k in 0..face_vertices.len() {
                let a = face_vertices[k];
                let b = face_vertices[(k + 1) % face_vertices.len()];
                let key = edge_key(a, b);

                let edge_id = *edge_map.entry(key).or_insert_with(|| {
                    let id = EdgeId(edges.len() as u32);
                    edges.push(Edge {
                        id,
                        vertices: [a, b],
                    });
                    edge_face_count.push(0);
                    link_edges[a.0 as usize].push(id);
                    link_edges[b.0 as usize].push(id);
                    id
                });
                edge_face_count[edge_id.0 as usize] += 1;

                link_faces[a.0 as usize].push(face_id);
            }

            faces.push(Face {
                id: face_id,
                vertices: face_vertices,
                normal: Vec3::ZERO,
            });
        }

        let mut mesh = Self {
            vertices,
            edges,
            faces,
            link_edges,
            link_faces,
            edge_map,
            dirty: false,
        };

        // Border (one face) and non-manifold (three or more) edges
        let mut boundary_count = 0;
        for (edge_index, &count) in edge_face_count.iter().enumerate() {
            if count != 2 {
                let [a, b] = mesh.edges[edge_index].vertices;
                mesh.vertices[a.0 as usize].is_boundary = true;
                mesh.vertices[b.0 as usize].is_boundary = true;
                boundary_count += 1;
            }
        }

        mesh.recalculate_normals();

        tracing::debug!(
            "from_polygons: {} vertices, {} edges ({} boundary), {} faces",
            mesh.vertices.len(),
            mesh.edges.len(),
            boundary_count,
            mesh.faces.len()
        );

        Ok(mesh)
    }

    /// Build a mesh from a flat triangle index list.
    pub fn from_triangles(positions: &[Vec3], indices: &[u32]) -> Result<Self, MeshError> {
        if indices.len() % 3 != 0 {
            return Err(MeshError::InvalidTopology(
                "Index count not divisible by 3".to_string(),
            ));
        }
        let triangles: Vec<&[u32]> = indices.chunks(3).collect();
        Self::from_polygons(positions, &triangles)
    }
}
