//! Relax tool gesture state machine
//!
//! Drives the solver across a gesture:
//! - `begin` pushes one undo checkpoint and enters the gesture state
//! - `tick` runs exactly one relaxation step per fired timer
//! - `end` keeps the result, `cancel` rolls back to the checkpoint
//!
//! Brush gestures re-query the brush every tick since the hit point moves.
//! Selection gestures capture their working set once at `begin` and reuse it.

use glam::Vec3;
use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::brush::BrushQueryEngine;
use crate::mesh::TargetMesh;
use crate::oracle::{ProjectionOracle, VisibilityOracle};
use crate::relax::{RelaxContext, RelaxError, RelaxStats, relax_step};
use crate::sync::{DirtyVertices, VertexUpload, take_uploads};
use crate::undo::UndoStack;
use crate::working_set::WorkingSet;

use retopo_config::RelaxOptions;

/// Which working set a gesture relaxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelaxMode {
    /// Vertices under the brush, weighted by falloff
    Brush,
    /// The selection captured at gesture start, unweighted
    Selected,
}

impl RelaxMode {
    fn undo_label(self) -> &'static str {
        match self {
            RelaxMode::Brush => "relax",
            RelaxMode::Selected => "relax selected",
        }
    }
}

/// State captured when a selection gesture begins.
#[derive(Debug, Clone)]
pub struct SelectionGesture {
    pub working_set: WorkingSet,
}

/// Tool state.
#[derive(Debug, Clone, Default)]
pub enum ToolState {
    #[default]
    Idle,
    Brushing,
    RelaxingSelected(SelectionGesture),
}

impl ToolState {
    pub fn mode(&self) -> Option<RelaxMode> {
        match self {
            ToolState::Idle => None,
            ToolState::Brushing => Some(RelaxMode::Brush),
            ToolState::RelaxingSelected(_) => Some(RelaxMode::Selected),
        }
    }
}

/// Per-tick input from the host's timer and hit test.
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    pub timer_fired: bool,
    /// Seconds since the previous tick
    pub time_delta: f32,
    /// Brush hit point on the target mesh, if any
    pub hit: Option<Vec3>,
}

/// Gesture lifecycle errors.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("A relax gesture is already active")]
    GestureActive,
    #[error("No relax gesture is active")]
    NoActiveGesture,
    #[error(transparent)]
    Relax(#[from] RelaxError),
}

/// Result of ending a gesture.
#[derive(Debug, Clone, Copy, Default)]
pub struct GestureEndResult {
    /// Ticks that ran a relaxation step
    pub ticks: usize,
    /// Vertex commits summed over those ticks
    pub commits: usize,
}

/// Interactive relax tool.
#[derive(Debug, Default)]
pub struct RelaxTool {
    /// Options read by every tick
    pub options: RelaxOptions,
    state: ToolState,
    /// Built when a brush gesture begins
    brush: Option<BrushQueryEngine>,
    undo: UndoStack,
    dirty: DirtyVertices,
    gesture: GestureEndResult,
}

impl RelaxTool {
    pub fn new(options: RelaxOptions) -> Self {
        Self {
            options,
            ..Default::default()
        }
    }

    pub fn state(&self) -> &ToolState {
        &self.state
    }

    /// Check if a gesture is currently active.
    pub fn is_active(&self) -> bool {
        !matches!(self.state, ToolState::Idle)
    }

    pub fn undo_stack(&self) -> &UndoStack {
        &self.undo
    }

    /// Begin a gesture.
    pub fn begin(&mut self, mode: RelaxMode, mesh: &TargetMesh) -> Result<(), ToolError> {
        if self.is_active() {
            warn!("relax begin({:?}) rejected: gesture already active", mode);
            return Err(ToolError::GestureActive);
        }

        self.undo.push_checkpoint(mode.undo_label(), mesh);
        self.gesture = GestureEndResult::default();
        self.state = match mode {
            RelaxMode::Brush => {
                self.brush = Some(BrushQueryEngine::new(mesh));
                ToolState::Brushing
            }
            RelaxMode::Selected => {
                let working_set = WorkingSet::from_selection(mesh);
                debug!(
                    "relax selected: captured {} verts, {} edges, {} faces",
                    working_set.vertices().len(),
                    working_set.edges().len(),
                    working_set.faces().len()
                );
                ToolState::RelaxingSelected(SelectionGesture { working_set })
            }
        };

        debug!("relax gesture begin: {:?}", mode);
        Ok(())
    }

    /// Run one tick of the active gesture.
    ///
    /// A tick whose timer did not fire, or a brush tick without a hit point,
    /// is skipped.
    pub fn tick(
        &mut self,
        mesh: &mut TargetMesh,
        input: TickInput,
        projection: &dyn ProjectionOracle,
        visibility: &dyn VisibilityOracle,
    ) -> Result<RelaxStats, ToolError> {
        if !self.is_active() {
            return Err(ToolError::NoActiveGesture);
        }
        if !input.timer_fired {
            return Ok(RelaxStats::skipped());
        }

        let ctx = RelaxContext {
            options: &self.options,
            time_delta: input.time_delta,
            projection,
            visibility,
        };

        let stats = match &self.state {
            ToolState::Idle => return Err(ToolError::NoActiveGesture),
            ToolState::Brushing => {
                let Some(engine) = self.brush.as_ref() else {
                    return Err(ToolError::NoActiveGesture);
                };
                let hits = engine.query(input.hit, self.options.brush_radius, self.options.falloff);
                trace!("relax tick: {} brush hits", hits.len());
                let (set, strengths) = WorkingSet::from_brush(mesh, &hits);
                relax_step(mesh, &set, Some(&strengths), &ctx)?
            }
            ToolState::RelaxingSelected(gesture) => {
                relax_step(mesh, &gesture.working_set, None, &ctx)?
            }
        };

        if stats.skipped {
            return Ok(stats);
        }
        if !stats.moves.is_empty() {
            if let Some(engine) = self.brush.as_mut() {
                engine.apply_moves(mesh, &stats.moves);
            }
            mesh.recalculate_normals_around(stats.moved_vertices());
            self.dirty.mark_all(stats.moved_vertices());
        }
        self.gesture.ticks += 1;
        self.gesture.commits += stats.committed;
        Ok(stats)
    }

    /// End the gesture, keeping its changes.
    pub fn end(&mut self) -> Result<GestureEndResult, ToolError> {
        if !self.is_active() {
            return Err(ToolError::NoActiveGesture);
        }
        self.state = ToolState::Idle;
        self.brush = None;
        let result = std::mem::take(&mut self.gesture);
        debug!(
            "relax gesture end: {} ticks, {} commits",
            result.ticks, result.commits
        );
        Ok(result)
    }

    /// Cancel the gesture and restore the mesh to its checkpoint.
    pub fn cancel(&mut self, mesh: &mut TargetMesh) -> Result<(), ToolError> {
        if !self.is_active() {
            return Err(ToolError::NoActiveGesture);
        }
        self.state = ToolState::Idle;
        self.brush = None;
        self.gesture = GestureEndResult::default();
        if let Some(restored) = self.undo.cancel_to_checkpoint(mesh) {
            debug!(
                "relax gesture cancelled: restored {} vertices",
                restored.changed.len()
            );
            self.dirty.mark_all(restored.changed);
        }
        Ok(())
    }

    /// Undo the last finished gesture. Ignored while a gesture is active.
    pub fn undo(&mut self, mesh: &mut TargetMesh) -> bool {
        if self.is_active() {
            return false;
        }
        match self.undo.undo(mesh) {
            Some(restored) => {
                self.dirty.mark_all(restored.changed);
                true
            }
            None => false,
        }
    }

    /// Upload records for vertices moved since the last call.
    pub fn take_uploads(&mut self, mesh: &TargetMesh) -> Vec<VertexUpload> {
        take_uploads(mesh, &mut self.dirty)
    }
}
