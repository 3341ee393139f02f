//! Host buffer synchronization for relaxed vertices.
//!
//! The relax tool records which vertices each step moved. When the host
//! resyncs its vertex buffer it asks for upload records covering just those
//! vertices instead of re-uploading the whole mesh.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::mesh::{TargetMesh, VertexId};

/// Tracks which vertices have been moved since the last sync.
#[derive(Debug, Default)]
pub struct DirtyVertices {
    /// Set of vertex IDs that have been modified
    pub modified: HashSet<VertexId>,
}

impl DirtyVertices {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a vertex as modified.
    pub fn mark(&mut self, vertex_id: VertexId) {
        self.modified.insert(vertex_id);
    }

    /// Mark multiple vertices as modified.
    pub fn mark_all(&mut self, vertices: impl IntoIterator<Item = VertexId>) {
        self.modified.extend(vertices);
    }

    pub fn clear(&mut self) {
        self.modified.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.modified.is_empty()
    }

    pub fn len(&self) -> usize {
        self.modified.len()
    }
}

/// One vertex record in the host's vertex buffer layout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct VertexUpload {
    /// Vertex index in the buffer
    pub index: u32,
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

/// Upload records for every dirty vertex, in index order.
///
/// Clears the tracker. Ids no longer in the mesh are dropped.
pub fn take_uploads(mesh: &TargetMesh, dirty: &mut DirtyVertices) -> Vec<VertexUpload> {
    let mut uploads: Vec<VertexUpload> = dirty
        .modified
        .drain()
        .filter_map(|id| mesh.vertex(id))
        .map(|v| VertexUpload {
            index: v.id.0,
            position: v.position.to_array(),
            normal: v.normal.to_array(),
        })
        .collect();
    uploads.sort_by_key(|u| u.index);
    uploads
}

/// Raw bytes of upload records, ready to copy into a mapped buffer.
pub fn as_bytes(uploads: &[VertexUpload]) -> &[u8] {
    bytemuck::cast_slice(uploads)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::test_meshes::grid;
    use glam::Vec3;

    #[test]
    fn test_dirty_tracking() {
        let mut dirty = DirtyVertices::new();
        assert!(dirty.is_empty());
        dirty.mark(VertexId(3));
        dirty.mark_all([VertexId(1), VertexId(3)]);
        assert_eq!(dirty.len(), 2);
        dirty.clear();
        assert!(dirty.is_empty());
    }

    #[test]
    fn test_take_uploads() {
        let mut mesh = grid(3);
        mesh.set_vertex_position(VertexId(4), Vec3::new(1.0, 1.0, 0.5));

        let mut dirty = DirtyVertices::new();
        dirty.mark_all([VertexId(4), VertexId(0), VertexId(99)]);

        let uploads = take_uploads(&mesh, &mut dirty);
        assert!(dirty.is_empty());
        assert_eq!(uploads.len(), 2);
        assert_eq!(uploads[0].index, 0);
        assert_eq!(uploads[1].index, 4);
        assert_eq!(uploads[1].position, [1.0, 1.0, 0.5]);
        assert_eq!(uploads[0].normal, [0.0, 0.0, 1.0]);

        let bytes = as_bytes(&uploads);
        assert_eq!(bytes.len(), 2 * std::mem::size_of::<VertexUpload>());
        assert_eq!(std::mem::size_of::<VertexUpload>(), 28);
    }
}
