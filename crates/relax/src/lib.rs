//! Retopology relax core.
//!
//! This crate relaxes a low-density target mesh so its edges become uniform
//! in length and its faces regular, while every moved vertex is snapped back
//! onto the dense source surfaces it is being retopologized onto.
//!
//! # Architecture
//!
//! Relaxation is interactive: each timer tick while a gesture is held runs
//! exactly one damped step, and convergence emerges over many ticks.
//!
//! ## Key Components
//!
//! - **Mesh**: Arena of vertices, edges and faces with per-vertex adjacency
//! - **Spatial**: Octree over target vertices for radius queries
//! - **Brush**: Falloff-weighted vertex query around a hit point
//! - **Working set**: Vertices, edges and faces one step touches
//! - **Relax**: The solver step and its movement constraints
//! - **Oracles / Source**: Projection onto source surfaces and visibility
//! - **Tool**: Gesture state machine with undo checkpoints and host sync

pub mod brush;
pub mod mesh;
pub mod oracle;
pub mod relax;
pub mod source;
pub mod spatial;
pub mod symmetry;
pub mod sync;
pub mod tool;
pub mod undo;
pub mod working_set;

pub use brush::{BrushHit, BrushQueryEngine, FalloffCurve, StrengthMap};
pub use mesh::{EdgeId, FaceId, MeshError, TargetMesh, VertexId};
pub use oracle::{
    AlwaysVisible, FacingView, IdentityProjection, PlaneProjection, ProjectionOracle,
    VisibilityOracle,
};
pub use relax::{RelaxContext, RelaxError, RelaxStats, VertexMove, relax_step};
pub use source::{SourceMesh, SourceSurfaces};
pub use tool::{RelaxMode, RelaxTool, TickInput, ToolError, ToolState};
pub use undo::UndoStack;
pub use working_set::WorkingSet;

pub use retopo_config::{RelaxOptions, SymmetryAxes};
