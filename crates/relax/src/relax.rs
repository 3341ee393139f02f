//! Relaxation solver
//!
//! One call to [`relax_step`] performs a single damped relaxation step over a
//! working set. It is never iterated internally: convergence comes from the
//! host calling it once per tick while a gesture is held.
//!
//! The step is split like a two-pass deformation:
//! 1. Read every touched position into a snapshot and accumulate the
//!    edge-length and face-regularity terms against that snapshot
//! 2. Commit the accumulated positions of seed vertices that pass the
//!    movement constraints, each one projected onto the source surfaces
//!
//! No term observes another term's write within the same step.

use std::collections::{HashMap, HashSet};

use glam::Vec3;
use thiserror::Error;
use tracing::{debug, trace};

use crate::brush::StrengthMap;
use crate::mesh::{EdgeId, FaceId, TargetMesh, VertexId};
use crate::oracle::{ProjectionOracle, VisibilityOracle};
use crate::symmetry::apply_symmetry;
use crate::working_set::WorkingSet;

use retopo_config::RelaxOptions;

/// Scale applied to brush strength and elapsed time
const STRENGTH_SCALE: f32 = 100.0;

/// Damping of the edge-length term relative to the face term
const EDGE_TERM_DAMPING: f32 = 0.1;

/// A working set that references geometry absent from the mesh.
///
/// This is an internal consistency failure on the host side; nothing is
/// mutated when it is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RelaxError {
    #[error("Working set references missing vertex {0:?}")]
    MissingVertex(VertexId),
    #[error("Working set references missing edge {0:?}")]
    MissingEdge(EdgeId),
    #[error("Working set references missing face {0:?}")]
    MissingFace(FaceId),
}

/// A committed position change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexMove {
    pub vertex_id: VertexId,
    pub from: Vec3,
    pub to: Vec3,
}

/// What one step did.
#[derive(Debug, Clone, Default)]
pub struct RelaxStats {
    /// The step was a no-op guard (empty set or unusable radius)
    pub skipped: bool,
    pub average_edge_length: f32,
    /// Edges whose length term was evaluated
    pub edges_applied: usize,
    /// Faces whose regularity term was evaluated
    pub faces_applied: usize,
    /// Seed vertices whose position was written
    pub committed: usize,
    pub rejected_selection: usize,
    pub rejected_boundary: usize,
    pub rejected_hidden: usize,
    pub moves: Vec<VertexMove>,
}

impl RelaxStats {
    pub(crate) fn skipped() -> Self {
        Self {
            skipped: true,
            ..Default::default()
        }
    }

    /// Ids of every committed vertex.
    pub fn moved_vertices(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.moves.iter().map(|mv| mv.vertex_id)
    }
}

/// Everything a step reads besides the mesh and working set.
#[derive(Clone, Copy)]
pub struct RelaxContext<'a> {
    pub options: &'a RelaxOptions,
    /// Seconds since the previous tick
    pub time_delta: f32,
    pub projection: &'a dyn ProjectionOracle,
    pub visibility: &'a dyn VisibilityOracle,
}

impl RelaxContext<'_> {
    fn strength_scale(&self) -> f32 {
        STRENGTH_SCALE * self.options.brush_strength * self.time_delta
    }
}

/// Why a seed vertex was left in place.
enum Rejection {
    Selection,
    Boundary,
    Hidden,
}

/// Run one relaxation step.
///
/// `strengths` is the brush strength map; without one every seed is
/// weighted fully. Positions are written only for seed vertices of `set`.
pub fn relax_step(
    mesh: &mut TargetMesh,
    set: &WorkingSet,
    strengths: Option<&StrengthMap>,
    ctx: &RelaxContext<'_>,
) -> Result<RelaxStats, RelaxError> {
    if set.is_inert() {
        trace!(
            "relax_step: inert working set ({} verts, {} edges)",
            set.vertices().len(),
            set.edges().len()
        );
        return Ok(RelaxStats::skipped());
    }
    if !ctx.options.has_valid_radius() {
        trace!("relax_step: unusable radius {}", ctx.options.brush_radius);
        return Ok(RelaxStats::skipped());
    }

    let snapshot = snapshot_positions(mesh, set)?;
    let mut accumulated = snapshot.clone();
    let mut stats = RelaxStats::default();

    let mut total_length = 0.0;
    for &edge_id in set.edges() {
        let edge = mesh.edge(edge_id).ok_or(RelaxError::MissingEdge(edge_id))?;
        let [a, b] = edge.vertices;
        total_length += snapshot_position(&snapshot, b)?.distance(snapshot_position(&snapshot, a)?);
    }
    let average_length = total_length / set.edges().len() as f32;
    stats.average_edge_length = average_length;

    let radius_factor = 1.0 / ctx.options.brush_radius;
    let scale = ctx.strength_scale();

    let mut touched_edges: HashSet<EdgeId> = HashSet::new();
    let mut touched_faces: HashSet<FaceId> = HashSet::new();

    for &seed in set.vertices() {
        let link_edges = mesh.link_edges(seed);
        if link_edges.is_empty() {
            continue;
        }
        let weight = strengths.map_or(1.0, |s| 1.0 - s.get(&seed).copied().unwrap_or(1.0));

        for &edge_id in link_edges {
            if !set.contains_edge(edge_id) || !touched_edges.insert(edge_id) {
                continue;
            }
            let edge = mesh.edge(edge_id).ok_or(RelaxError::MissingEdge(edge_id))?;
            let [v0, v1] = edge.vertices;
            let diff = snapshot_position(&snapshot, v1)? - snapshot_position(&snapshot, v0)?;
            let m = (average_length - diff.length()) * weight * EDGE_TERM_DAMPING * radius_factor;
            let delta = diff * m * scale;
            nudge(&mut accumulated, v1, delta);
            nudge(&mut accumulated, v0, -delta);
            stats.edges_applied += 1;
        }

        for &face_id in mesh.link_faces(seed) {
            if !set.contains_face(face_id) || !touched_faces.insert(face_id) {
                continue;
            }
            let face = mesh.face(face_id).ok_or(RelaxError::MissingFace(face_id))?;
            let points = face
                .vertices
                .iter()
                .map(|&v| snapshot_position(&snapshot, v).map(|p| (v, p)))
                .collect::<Result<Vec<_>, _>>()?;
            let count = points.len() as f32;
            let center = points.iter().map(|&(_, p)| p).sum::<Vec3>() / count;
            let spread = points.iter().map(|&(_, p)| p.distance(center)).sum::<f32>() / count;
            for (v, p) in points {
                let diff = p - center;
                let m = (spread - diff.length()) * weight / count * radius_factor;
                nudge(&mut accumulated, v, diff * m * scale);
            }
            stats.faces_applied += 1;
        }
    }

    for &seed in set.vertices() {
        let Some(vertex) = mesh.vertex(seed) else {
            continue;
        };
        let rejection = if ctx.options.move_selected_only && !vertex.selected {
            Some(Rejection::Selection)
        } else if !ctx.options.move_boundary && vertex.is_boundary {
            Some(Rejection::Boundary)
        } else if !ctx.options.move_hidden
            && !ctx.visibility.is_visible(vertex.position, vertex.normal)
        {
            Some(Rejection::Hidden)
        } else {
            None
        };

        match rejection {
            Some(Rejection::Selection) => stats.rejected_selection += 1,
            Some(Rejection::Boundary) => stats.rejected_boundary += 1,
            Some(Rejection::Hidden) => stats.rejected_hidden += 1,
            None => {
                let from = vertex.position;
                let target = snapshot_position(&accumulated, seed)?;
                let projected = ctx.projection.nearest_point(target);
                let to = apply_symmetry(
                    ctx.options.symmetry,
                    ctx.options.symmetry_threshold,
                    from,
                    projected,
                );
                mesh.set_vertex_position(seed, to);
                stats.moves.push(VertexMove {
                    vertex_id: seed,
                    from,
                    to,
                });
                stats.committed += 1;
            }
        }
    }

    mesh.mark_dirty();

    debug!(
        "relax_step: avg_len={:.4} edges={} faces={} committed={} rejected(sel={}, boundary={}, hidden={})",
        stats.average_edge_length,
        stats.edges_applied,
        stats.faces_applied,
        stats.committed,
        stats.rejected_selection,
        stats.rejected_boundary,
        stats.rejected_hidden
    );

    Ok(stats)
}

/// Positions of every seed, every edge endpoint and every face vertex.
fn snapshot_positions(
    mesh: &TargetMesh,
    set: &WorkingSet,
) -> Result<HashMap<VertexId, Vec3>, RelaxError> {
    let mut snapshot = HashMap::new();
    let mut record = |id: VertexId| -> Result<(), RelaxError> {
        let position = mesh.position(id).ok_or(RelaxError::MissingVertex(id))?;
        snapshot.insert(id, position);
        Ok(())
    };

    for &v in set.vertices() {
        record(v)?;
    }
    for &edge_id in set.edges() {
        let edge = mesh.edge(edge_id).ok_or(RelaxError::MissingEdge(edge_id))?;
        for v in edge.vertices {
            record(v)?;
        }
    }
    for &face_id in set.faces() {
        let face = mesh.face(face_id).ok_or(RelaxError::MissingFace(face_id))?;
        for &v in &face.vertices {
            record(v)?;
        }
    }
    Ok(snapshot)
}

fn snapshot_position(snapshot: &HashMap<VertexId, Vec3>, id: VertexId) -> Result<Vec3, RelaxError> {
    snapshot.get(&id).copied().ok_or(RelaxError::MissingVertex(id))
}

fn nudge(accumulated: &mut HashMap<VertexId, Vec3>, id: VertexId, delta: Vec3) {
    if let Some(position) = accumulated.get_mut(&id) {
        *position += delta;
    }
}
