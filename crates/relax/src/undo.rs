//! Undo checkpoints for relax gestures
//!
//! A checkpoint captures every vertex position before a gesture starts
//! modifying the mesh. Cancelling the gesture restores that capture; undo
//! does the same for the most recent finished gesture.

use std::collections::VecDeque;

use glam::Vec3;
use tracing::debug;

use crate::mesh::{TargetMesh, VertexId};

/// Default number of checkpoints kept before the oldest is dropped
pub const DEFAULT_UNDO_DEPTH: usize = 32;

/// Position snapshot taken before a gesture.
#[derive(Debug, Clone)]
pub struct UndoEntry {
    /// Label shown to the user, e.g. "relax"
    pub label: String,
    /// Positions indexed by vertex id
    pub positions: Vec<Vec3>,
}

/// Outcome of rolling back to a checkpoint.
#[derive(Debug, Clone)]
pub struct Restored {
    pub label: String,
    /// Vertices whose position was changed back
    pub changed: Vec<VertexId>,
}

/// Bounded stack of gesture checkpoints.
#[derive(Debug, Clone)]
pub struct UndoStack {
    entries: VecDeque<UndoEntry>,
    max_depth: usize,
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new(DEFAULT_UNDO_DEPTH)
    }
}

impl UndoStack {
    /// Create a stack holding at most `max_depth` checkpoints (at least one).
    pub fn new(max_depth: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            max_depth: max_depth.max(1),
        }
    }

    /// Capture the mesh before a gesture modifies it.
    pub fn push_checkpoint(&mut self, label: impl Into<String>, mesh: &TargetMesh) {
        let entry = UndoEntry {
            label: label.into(),
            positions: mesh.positions(),
        };
        debug!(
            "Undo checkpoint '{}' ({} vertices)",
            entry.label,
            entry.positions.len()
        );
        if self.entries.len() == self.max_depth {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    /// Roll back the gesture in progress to its checkpoint.
    ///
    /// Returns `None` when there is no checkpoint to return to.
    pub fn cancel_to_checkpoint(&mut self, mesh: &mut TargetMesh) -> Option<Restored> {
        let entry = self.entries.pop_back()?;
        debug!("Cancelling to checkpoint '{}'", entry.label);
        let changed = restore(mesh, &entry.positions);
        Some(Restored {
            label: entry.label,
            changed,
        })
    }

    /// Undo the last finished gesture.
    ///
    /// Returns `None` if no undo is available.
    pub fn undo(&mut self, mesh: &mut TargetMesh) -> Option<Restored> {
        let Some(entry) = self.entries.pop_back() else {
            debug!("Undo: no entries available");
            return None;
        };
        debug!("Undoing '{}'", entry.label);
        let changed = restore(mesh, &entry.positions);
        Some(Restored {
            label: entry.label,
            changed,
        })
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        !self.entries.is_empty()
    }

    /// Get the number of undo levels available
    pub fn undo_count(&self) -> usize {
        self.entries.len()
    }

    /// Label of the most recent checkpoint
    pub fn last_label(&self) -> Option<&str> {
        self.entries.back().map(|e| e.label.as_str())
    }
}

/// Write captured positions back and refresh normals.
fn restore(mesh: &mut TargetMesh, positions: &[Vec3]) -> Vec<VertexId> {
    let mut changed = Vec::new();
    for (index, &position) in positions.iter().enumerate() {
        let id = VertexId(index as u32);
        if mesh.position(id).is_some_and(|p| p != position) {
            mesh.set_vertex_position(id, position);
            changed.push(id);
        }
    }
    if !changed.is_empty() {
        mesh.recalculate_normals_around(changed.iter().copied());
        mesh.mark_dirty();
    }
    changed
}
