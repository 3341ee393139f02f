//! Accessors, adjacency queries, selection and normals for TargetMesh.

use glam::Vec3;
use std::collections::HashSet;

use super::types::{Edge, EdgeId, Face, FaceId, Vertex, VertexId};
use super::{TargetMesh, edge_key};

impl TargetMesh {
    // ========================================================================
    // Accessors
    // ========================================================================

    /// Get vertex by ID
    pub fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.vertices.get(id.0 as usize)
    }

    /// Get mutable vertex by ID
    pub fn vertex_mut(&mut self, id: VertexId) -> Option<&mut Vertex> {
        self.vertices.get_mut(id.0 as usize)
    }

    /// Get edge by ID
    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id.0 as usize)
    }

    /// Get face by ID
    pub fn face(&self, id: FaceId) -> Option<&Face> {
        self.faces.get(id.0 as usize)
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Current position of a vertex
    pub fn position(&self, id: VertexId) -> Option<Vec3> {
        self.vertex(id).map(|v| v.position)
    }

    /// Set a vertex position. Returns false if the vertex does not exist.
    pub fn set_vertex_position(&mut self, id: VertexId, position: Vec3) -> bool {
        match self.vertex_mut(id) {
            Some(vertex) => {
                vertex.position = position;
                true
            }
            None => false,
        }
    }

    /// Copy of every vertex position, indexed by vertex id.
    pub fn positions(&self) -> Vec<Vec3> {
        self.vertices.iter().map(|v| v.position).collect()
    }

    // ========================================================================
    // Adjacency
    // ========================================================================

    /// Edges incident to a vertex (empty for unknown ids)
    pub fn link_edges(&self, id: VertexId) -> &[EdgeId] {
        self.link_edges
            .get(id.0 as usize)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Faces incident to a vertex (empty for unknown ids)
    pub fn link_faces(&self, id: VertexId) -> &[FaceId] {
        self.link_faces
            .get(id.0 as usize)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Find the edge joining two vertices, in either order
    pub fn find_edge(&self, a: VertexId, b: VertexId) -> Option<EdgeId> {
        self.edge_map.get(&edge_key(a, b)).copied()
    }

    /// Faces that use an edge
    pub fn edge_faces(&self, id: EdgeId) -> Vec<FaceId> {
        let Some(edge) = self.edge(id) else {
            return Vec::new();
        };
        let [a, b] = edge.vertices;
        self.link_faces(a)
            .iter()
            .copied()
            .filter(|&f| {
                self.face(f).is_some_and(|face| {
                    let n = face.vertices.len();
                    (0..n).any(|k| {
                        let (u, v) = (face.vertices[k], face.vertices[(k + 1) % n]);
                        (u == a && v == b) || (u == b && v == a)
                    })
                })
            })
            .collect()
    }

    /// Vertices sharing an edge with `id`
    pub fn adjacent_vertices(&self, id: VertexId) -> Vec<VertexId> {
        self.link_edges(id)
            .iter()
            .filter_map(|&e| self.edge(e).and_then(|edge| edge.other_vertex(id)))
            .collect()
    }

    /// Euclidean length of an edge
    pub fn edge_length(&self, id: EdgeId) -> Option<f32> {
        let [a, b] = self.edge(id)?.vertices;
        Some(self.position(a)?.distance(self.position(b)?))
    }

    /// Average of a face's vertex positions
    pub fn face_centroid(&self, id: FaceId) -> Option<Vec3> {
        let face = self.face(id)?;
        let mut sum = Vec3::ZERO;
        for &v in &face.vertices {
            sum += self.position(v)?;
        }
        Some(sum / face.vertices.len() as f32)
    }

    // ========================================================================
    // Selection
    // ========================================================================

    pub fn set_selected(&mut self, id: VertexId, selected: bool) {
        if let Some(vertex) = self.vertex_mut(id) {
            vertex.selected = selected;
        }
    }

    pub fn select_vertices(&mut self, ids: impl IntoIterator<Item = VertexId>) {
        for id in ids {
            self.set_selected(id, true);
        }
    }

    pub fn clear_selection(&mut self) {
        for vertex in &mut self.vertices {
            vertex.selected = false;
        }
    }

    /// Selected vertices in id order
    pub fn selected_vertices(&self) -> Vec<VertexId> {
        self.vertices
            .iter()
            .filter(|v| v.selected)
            .map(|v| v.id)
            .collect()
    }

    /// Edges whose endpoints are both selected
    pub fn selected_edges(&self) -> Vec<EdgeId> {
        self.edges
            .iter()
            .filter(|e| e.vertices.iter().all(|&v| self.is_selected(v)))
            .map(|e| e.id)
            .collect()
    }

    /// Faces whose vertices are all selected
    pub fn selected_faces(&self) -> Vec<FaceId> {
        self.faces
            .iter()
            .filter(|f| f.vertices.iter().all(|&v| self.is_selected(v)))
            .map(|f| f.id)
            .collect()
    }

    fn is_selected(&self, id: VertexId) -> bool {
        self.vertex(id).is_some_and(|v| v.selected)
    }

    // ========================================================================
    // Normals
    // ========================================================================

    /// Recompute every face normal and vertex normal.
    pub fn recalculate_normals(&mut self) {
        let all: Vec<VertexId> = self.vertices.iter().map(|v| v.id).collect();
        self.recalculate_normals_around(all);
    }

    /// Recompute normals of the faces touching `ids` and of every vertex on
    /// those faces. Vertex normals are area weighted; a vertex without faces
    /// keeps its current normal.
    pub fn recalculate_normals_around(&mut self, ids: impl IntoIterator<Item = VertexId>) {
        let mut faces: HashSet<FaceId> = HashSet::new();
        for id in ids {
            faces.extend(self.link_faces(id).iter().copied());
        }

        let mut vertices: HashSet<VertexId> = HashSet::new();
        for &face_id in &faces {
            let area_normal = self.face_area_normal(face_id);
            if let Some(face) = self.faces.get_mut(face_id.0 as usize) {
                face.normal = area_normal.normalize_or_zero();
                vertices.extend(face.vertices.iter().copied());
            }
        }

        for vertex_id in vertices {
            let sum: Vec3 = self
                .link_faces(vertex_id)
                .iter()
                .map(|&f| self.face_area_normal(f))
                .sum();
            let normal = sum.normalize_or_zero();
            if normal != Vec3::ZERO {
                if let Some(vertex) = self.vertex_mut(vertex_id) {
                    vertex.normal = normal;
                }
            }
        }
    }

    /// Newell normal of a polygon, with length equal to twice its area.
    fn face_area_normal(&self, id: FaceId) -> Vec3 {
        let Some(face) = self.face(id) else {
            return Vec3::ZERO;
        };
        let n = face.vertices.len();
        let mut normal = Vec3::ZERO;
        for k in 0..n {
            let (Some(a), Some(b)) = (
                self.position(face.vertices[k]),
                self.position(face.vertices[(k + 1) % n]),
            ) else {
                return Vec3::ZERO;
            };
            normal += a.cross(b);
        }
        normal
    }

    // ========================================================================
    // Dirty tracking
    // ========================================================================

    /// Signal the host that positions changed.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Read and clear the dirty flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::test_meshes::grid;

    #[test]
    fn test_edge_queries() {
        let mesh = grid(3);
        let edge = mesh.find_edge(VertexId(4), VertexId(1)).unwrap();
        assert_eq!(mesh.find_edge(VertexId(1), VertexId(4)), Some(edge));
        assert!((mesh.edge_length(edge).unwrap() - 1.0).abs() < 1e-6);
        assert_eq!(mesh.edge_faces(edge).len(), 2);
        assert_eq!(mesh.find_edge(VertexId(0), VertexId(8)), None);

        let mut neighbors = mesh.adjacent_vertices(VertexId(4));
        neighbors.sort();
        assert_eq!(
            neighbors,
            vec![VertexId(1), VertexId(3), VertexId(5), VertexId(7)]
        );
    }

    #[test]
    fn test_face_centroid() {
        let mesh = grid(2);
        let centroid = mesh.face_centroid(FaceId(0)).unwrap();
        assert!((centroid - Vec3::new(0.5, 0.5, 0.0)).length() < 1e-6);
        assert!(mesh.face_centroid(FaceId(9)).is_none());
    }

    #[test]
    fn test_selection_flush() {
        let mut mesh = grid(3);
        mesh.select_vertices([VertexId(0), VertexId(1), VertexId(3), VertexId(4)]);

        assert_eq!(mesh.selected_vertices().len(), 4);
        // Bottom-left quad is fully selected
        assert_eq!(mesh.selected_faces(), vec![FaceId(0)]);
        // Its four sides
        assert_eq!(mesh.selected_edges().len(), 4);

        mesh.clear_selection();
        assert!(mesh.selected_vertices().is_empty());
        assert!(mesh.selected_edges().is_empty());
    }

    #[test]
    fn test_unknown_ids_are_empty() {
        let mesh = grid(2);
        assert!(mesh.link_edges(VertexId(99)).is_empty());
        assert!(mesh.link_faces(VertexId(99)).is_empty());
        assert!(mesh.edge_faces(EdgeId(99)).is_empty());
        assert!(mesh.position(VertexId(99)).is_none());
    }

    #[test]
    fn test_normals_follow_positions() {
        let mut mesh = grid(2);
        // Tilt the quad so it faces +X
        for v in 0..4 {
            let p = mesh.position(VertexId(v)).unwrap();
            mesh.set_vertex_position(VertexId(v), Vec3::new(0.0, p.x, p.y));
        }
        mesh.recalculate_normals_around([VertexId(0)]);
        for v in mesh.vertices() {
            assert!((v.normal - Vec3::X).length() < 1e-5, "{:?}", v.normal);
        }
    }

    #[test]
    fn test_dirty_flag() {
        let mut mesh = grid(2);
        assert!(!mesh.is_dirty());
        mesh.mark_dirty();
        assert!(mesh.is_dirty());
        assert!(mesh.take_dirty());
        assert!(!mesh.is_dirty());
    }
}
