//! Type definitions for the target mesh arena.

use glam::Vec3;

/// Type-safe vertex identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexId(pub u32);

/// Type-safe edge identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(pub u32);

/// Type-safe face identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FaceId(pub u32);

/// A vertex of the target mesh
#[derive(Debug, Clone)]
pub struct Vertex {
    pub id: VertexId,
    pub position: Vec3,
    pub normal: Vec3,
    pub selected: bool,
    /// Lies on a border or non-manifold edge
    pub is_boundary: bool,
}

/// An unordered edge between two vertices
#[derive(Debug, Clone)]
pub struct Edge {
    pub id: EdgeId,
    pub vertices: [VertexId; 2],
}

impl Edge {
    /// The endpoint opposite `vertex`, or `None` if `vertex` is not on this edge.
    pub fn other_vertex(&self, vertex: VertexId) -> Option<VertexId> {
        match self.vertices {
            [a, b] if a == vertex => Some(b),
            [a, b] if b == vertex => Some(a),
            _ => None,
        }
    }

    pub fn contains(&self, vertex: VertexId) -> bool {
        self.vertices.contains(&vertex)
    }
}

/// A polygon face, stored as an ordered vertex cycle
#[derive(Debug, Clone)]
pub struct Face {
    pub id: FaceId,
    pub vertices: Vec<VertexId>,
    /// Cached face normal
    pub normal: Vec3,
}

/// Errors that can occur while building or validating a target mesh
#[derive(Debug, thiserror::Error)]
pub enum MeshError {
    #[error("Vertex index {index} out of range ({count} vertices)")]
    VertexOutOfRange { index: u32, count: usize },
    #[error("Face {face} has {count} vertices, at least 3 required")]
    DegenerateFace { face: usize, count: usize },
    #[error("Face {face} repeats vertex {vertex}")]
    RepeatedVertex { face: usize, vertex: u32 },
    #[error("Invalid mesh topology: {0}")]
    InvalidTopology(String),
}
