//! Validation methods for TargetMesh.
//!
//! Construction already rejects malformed input, so these checks exist for
//! hosts that edit the arena directly and want to verify it before handing
//! it to the solver.

use super::types::{EdgeId, FaceId, MeshError, VertexId};
use super::{TargetMesh, edge_key};

impl TargetMesh {
    pub fn contains_vertex(&self, id: VertexId) -> bool {
        (id.0 as usize) < self.vertices.len()
    }

    pub fn contains_edge(&self, id: EdgeId) -> bool {
        (id.0 as usize) < self.edges.len()
    }

    pub fn contains_face(&self, id: FaceId) -> bool {
        (id.0 as usize) < self.faces.len()
    }

    /// Check that every id stored in the arena refers to an existing element
    /// and that adjacency lists agree with edges and faces.
    pub fn validate(&self) -> Result<(), MeshError> {
        let count = self.vertices.len();
        let check = |v: VertexId| -> Result<(), MeshError> {
            if self.contains_vertex(v) {
                Ok(())
            } else {
                Err(MeshError::VertexOutOfRange { index: v.0, count })
            }
        };

        for (i, vertex) in self.vertices.iter().enumerate() {
            if vertex.id.0 as usize != i {
                return Err(MeshError::InvalidTopology(format!(
                    "Vertex slot {} holds id {:?}",
                    i, vertex.id
                )));
            }
        }

        for (i, edge) in self.edges.iter().enumerate() {
            if edge.id.0 as usize != i {
                return Err(MeshError::InvalidTopology(format!(
                    "Edge slot {} holds id {:?}",
                    i, edge.id
                )));
            }
            let [a, b] = edge.vertices;
            check(a)?;
            check(b)?;
            if self.edge_map.get(&edge_key(a, b)) != Some(&edge.id) {
                return Err(MeshError::InvalidTopology(format!(
                    "Edge {:?} missing from edge map",
                    edge.id
                )));
            }
            if !self.link_edges(a).contains(&edge.id) || !self.link_edges(b).contains(&edge.id) {
                return Err(MeshError::InvalidTopology(format!(
                    "Edge {:?} missing from vertex links",
                    edge.id
                )));
            }
        }

        for (i, face) in self.faces.iter().enumerate() {
            if face.id.0 as usize != i {
                return Err(MeshError::InvalidTopology(format!(
                    "Face slot {} holds id {:?}",
                    i, face.id
                )));
            }
            if face.vertices.len() < 3 {
                return Err(MeshError::DegenerateFace {
                    face: i,
                    count: face.vertices.len(),
                });
            }
            for &v in &face.vertices {
                check(v)?;
                if !self.link_faces(v).contains(&face.id) {
                    return Err(MeshError::InvalidTopology(format!(
                        "Face {:?} missing from links of {:?}",
                        face.id, v
                    )));
                }
            }
        }

        for links in &self.link_edges {
            if let Some(e) = links.iter().find(|e| !self.contains_edge(**e)) {
                return Err(MeshError::InvalidTopology(format!(
                    "Link to missing edge {:?}",
                    e
                )));
            }
        }
        for links in &self.link_faces {
            if let Some(f) = links.iter().find(|f| !self.contains_face(**f)) {
                return Err(MeshError::InvalidTopology(format!(
                    "Link to missing face {:?}",
                    f
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::test_meshes::{grid, hex_patch};

    #[test]
    fn test_valid_meshes() {
        assert!(grid(4).validate().is_ok());
        assert!(hex_patch(2).validate().is_ok());
    }

    #[test]
    fn test_detects_dangling_face_vertex() {
        let mut mesh = grid(2);
        mesh.faces[0].vertices[0] = VertexId(42);
        assert!(matches!(
            mesh.validate(),
            Err(MeshError::VertexOutOfRange { index: 42, .. })
        ));
    }

    #[test]
    fn test_detects_missing_link() {
        let mut mesh = grid(2);
        mesh.link_edges[0].clear();
        assert!(matches!(
            mesh.validate(),
            Err(MeshError::InvalidTopology(_))
        ));
    }
}
