//! Working sets: the vertices, edges and faces one relaxation step touches.

use std::collections::HashSet;

use crate::brush::{BrushHit, StrengthMap, strength_map};
use crate::mesh::{EdgeId, FaceId, TargetMesh, VertexId};

/// Seed vertices plus the edges and faces whose terms the step evaluates.
///
/// Vertex order is the order the solver visits seeds in, which decides the
/// endpoint an edge or face term is attributed to. Duplicates are dropped on
/// construction.
#[derive(Debug, Clone, Default)]
pub struct WorkingSet {
    vertices: Vec<VertexId>,
    edges: Vec<EdgeId>,
    faces: Vec<FaceId>,
    vertex_set: HashSet<VertexId>,
    edge_set: HashSet<EdgeId>,
    face_set: HashSet<FaceId>,
}

fn dedup<T: Copy + Eq + std::hash::Hash>(items: impl IntoIterator<Item = T>) -> (Vec<T>, HashSet<T>) {
    let mut seen = HashSet::new();
    let ordered = items.into_iter().filter(|item| seen.insert(*item)).collect();
    (ordered, seen)
}

impl WorkingSet {
    pub fn new(
        vertices: impl IntoIterator<Item = VertexId>,
        edges: impl IntoIterator<Item = EdgeId>,
        faces: impl IntoIterator<Item = FaceId>,
    ) -> Self {
        let (vertices, vertex_set) = dedup(vertices);
        let (edges, edge_set) = dedup(edges);
        let (faces, face_set) = dedup(faces);
        Self {
            vertices,
            edges,
            faces,
            vertex_set,
            edge_set,
            face_set,
        }
    }

    /// Seed vertices with every edge and face linked to them.
    pub fn around_vertices(mesh: &TargetMesh, seeds: impl IntoIterator<Item = VertexId>) -> Self {
        let (vertices, _) = dedup(seeds);
        let edges: Vec<EdgeId> = vertices
            .iter()
            .flat_map(|&v| mesh.link_edges(v).iter().copied())
            .collect();
        let faces: Vec<FaceId> = vertices
            .iter()
            .flat_map(|&v| mesh.link_faces(v).iter().copied())
            .collect();
        Self::new(vertices, edges, faces)
    }

    /// Working set for a brush dab, nearest vertex first, and its strengths.
    pub fn from_brush(mesh: &TargetMesh, hits: &[BrushHit]) -> (Self, StrengthMap) {
        let set = Self::around_vertices(mesh, hits.iter().map(|hit| hit.vertex_id));
        (set, strength_map(hits))
    }

    /// Working set from the current selection: selected vertices, edges with
    /// both endpoints selected, and fully selected faces.
    pub fn from_selection(mesh: &TargetMesh) -> Self {
        Self::new(
            mesh.selected_vertices(),
            mesh.selected_edges(),
            mesh.selected_faces(),
        )
    }

    pub fn vertices(&self) -> &[VertexId] {
        &self.vertices
    }

    pub fn edges(&self) -> &[EdgeId] {
        &self.edges
    }

    pub fn faces(&self) -> &[FaceId] {
        &self.faces
    }

    pub fn contains_vertex(&self, id: VertexId) -> bool {
        self.vertex_set.contains(&id)
    }

    pub fn contains_edge(&self, id: EdgeId) -> bool {
        self.edge_set.contains(&id)
    }

    pub fn contains_face(&self, id: FaceId) -> bool {
        self.face_set.contains(&id)
    }

    /// True when a step over this set would be a no-op.
    pub fn is_inert(&self) -> bool {
        self.vertices.is_empty() || self.edges.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brush::{BrushQueryEngine, FalloffCurve};
    use crate::mesh::test_meshes::grid;
    use glam::Vec3;

    #[test]
    fn test_new_deduplicates_in_order() {
        let set = WorkingSet::new(
            [VertexId(3), VertexId(1), VertexId(3)],
            [EdgeId(0), EdgeId(0)],
            [],
        );
        assert_eq!(set.vertices(), &[VertexId(3), VertexId(1)]);
        assert_eq!(set.edges(), &[EdgeId(0)]);
        assert!(set.faces().is_empty());
        assert!(set.contains_vertex(VertexId(1)));
        assert!(!set.contains_vertex(VertexId(2)));
        assert!(!set.is_inert());
    }

    #[test]
    fn test_around_vertex_collects_star() {
        let mesh = grid(3);
        let set = WorkingSet::around_vertices(&mesh, [VertexId(4)]);
        assert_eq!(set.vertices(), &[VertexId(4)]);
        assert_eq!(set.edges().len(), 4);
        assert_eq!(set.faces().len(), 4);
    }

    #[test]
    fn test_from_brush() {
        let mesh = grid(5);
        let engine = BrushQueryEngine::new(&mesh);
        let hits = engine.query(Some(Vec3::new(2.0, 2.0, 0.0)), 1.0, FalloffCurve::Linear);
        let (set, strengths) = WorkingSet::from_brush(&mesh, &hits);

        assert_eq!(set.vertices().len(), 5);
        assert_eq!(set.vertices()[0], VertexId(12));
        // Star of the plus shape: 4 inner edges + 3 more per arm
        assert_eq!(set.edges().len(), 16);
        assert_eq!(set.faces().len(), 12);
        assert_eq!(strengths.len(), 5);
    }

    #[test]
    fn test_from_selection() {
        let mut mesh = grid(3);
        assert!(WorkingSet::from_selection(&mesh).is_inert());

        mesh.select_vertices([VertexId(0), VertexId(1), VertexId(3), VertexId(4)]);
        let set = WorkingSet::from_selection(&mesh);
        assert_eq!(set.vertices().len(), 4);
        assert_eq!(set.edges().len(), 4);
        assert_eq!(set.faces().len(), 1);

        // A lone selected vertex has no selected edges
        mesh.clear_selection();
        mesh.select_vertices([VertexId(4)]);
        assert!(WorkingSet::from_selection(&mesh).is_inert());
    }
}
