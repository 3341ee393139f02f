//! Brush query engine.
//!
//! Finds the target vertices under the brush and weights each one by the
//! falloff curve. The octree is built once per gesture and kept in step with
//! committed moves, so queries stay exact while the brush sweeps.

use glam::Vec3;
use std::collections::HashMap;

use crate::mesh::{TargetMesh, VertexId};
use crate::relax::VertexMove;
use crate::spatial::VertexOctree;

pub use retopo_config::FalloffCurve;

/// Per-vertex brush strength in [0, 1].
pub type StrengthMap = HashMap<VertexId, f32>;

/// A vertex found under the brush.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrushHit {
    pub vertex_id: VertexId,
    /// Distance from the brush center
    pub distance: f32,
    /// Falloff-weighted strength
    pub strength: f32,
}

/// Collect brush hits into a strength map.
pub fn strength_map(hits: &[BrushHit]) -> StrengthMap {
    hits.iter().map(|hit| (hit.vertex_id, hit.strength)).collect()
}

/// Radius query over target vertices.
#[derive(Debug)]
pub struct BrushQueryEngine {
    octree: VertexOctree,
}

impl BrushQueryEngine {
    /// Index every vertex of `mesh`.
    pub fn new(mesh: &TargetMesh) -> Self {
        Self {
            octree: Self::build_octree(mesh),
        }
    }

    fn build_octree(mesh: &TargetMesh) -> VertexOctree {
        VertexOctree::from_vertices(mesh.vertices().iter().map(|v| (v.id, v.position)))
    }

    /// Re-index from scratch, e.g. after the host edited the mesh.
    pub fn rebuild(&mut self, mesh: &TargetMesh) {
        self.octree = Self::build_octree(mesh);
    }

    /// Number of indexed vertices.
    pub fn len(&self) -> usize {
        self.octree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.octree.is_empty()
    }

    /// Vertices within `radius` of `center`, nearest first.
    ///
    /// A missing hit point or a non-positive radius yields no hits.
    pub fn query(&self, center: Option<Vec3>, radius: f32, falloff: FalloffCurve) -> Vec<BrushHit> {
        let Some(center) = center else {
            return Vec::new();
        };
        if !(radius > 0.0) {
            return Vec::new();
        }

        let mut hits: Vec<BrushHit> = self
            .octree
            .query_sphere(center, radius)
            .into_iter()
            .map(|(vertex_id, distance)| BrushHit {
                vertex_id,
                distance,
                strength: falloff.evaluate(distance / radius).clamp(0.0, 1.0),
            })
            .collect();

        hits.sort_by(|a, b| {
            a.distance
                .total_cmp(&b.distance)
                .then(a.vertex_id.cmp(&b.vertex_id))
        });
        hits
    }

    /// Keep the index in step with committed moves.
    ///
    /// Falls back to a full rebuild when a vertex left the indexed bounds.
    pub fn apply_moves(&mut self, mesh: &TargetMesh, moves: &[VertexMove]) {
        for mv in moves {
            if !self.octree.update(mv.vertex_id, mv.from, mv.to) {
                tracing::trace!("brush index: {:?} left bounds, rebuilding", mv.vertex_id);
                self.rebuild(mesh);
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::test_meshes::grid;

    #[test]
    fn test_missing_hit_is_empty() {
        let mesh = grid(3);
        let engine = BrushQueryEngine::new(&mesh);
        assert_eq!(engine.len(), 9);
        assert!(engine.query(None, 1.0, FalloffCurve::Linear).is_empty());
        assert!(engine.query(Some(Vec3::ONE), 0.0, FalloffCurve::Linear).is_empty());
        assert!(engine.query(Some(Vec3::ONE), -1.0, FalloffCurve::Linear).is_empty());
    }

    #[test]
    fn test_exact_radius_containment() {
        let mesh = grid(5);
        let engine = BrushQueryEngine::new(&mesh);
        let center = Vec3::new(2.0, 2.0, 0.0);

        // Radius exactly reaches the four axis neighbours
        let hits = engine.query(Some(center), 1.0, FalloffCurve::Linear);
        assert_eq!(hits.len(), 5);
        assert_eq!(hits[0].vertex_id, VertexId(12));

        let hits = engine.query(Some(center), 1.5, FalloffCurve::Linear);
        assert_eq!(hits.len(), 9);
        for hit in &hits {
            let p = mesh.position(hit.vertex_id).unwrap();
            assert!(p.distance(center) <= 1.5);
        }
    }

    #[test]
    fn test_strength_from_falloff() {
        let mesh = grid(5);
        let engine = BrushQueryEngine::new(&mesh);
        let hits = engine.query(Some(Vec3::new(2.0, 2.0, 0.0)), 2.0, FalloffCurve::Linear);

        // Nearest first, so strength never increases along the list
        for pair in hits.windows(2) {
            assert!(pair[0].distance <= pair[1].distance);
            assert!(pair[0].strength >= pair[1].strength);
        }

        let center = hits[0];
        assert!((center.strength - 1.0).abs() < 1e-6);
        let rim = hits.iter().find(|h| h.vertex_id == VertexId(14)).unwrap();
        assert!((rim.strength - 0.0).abs() < 1e-6);
        let mid = hits.iter().find(|h| h.vertex_id == VertexId(13)).unwrap();
        assert!((mid.strength - 0.5).abs() < 1e-6);

        let map = strength_map(&hits);
        assert_eq!(map.len(), hits.len());
        assert!((map[&VertexId(13)] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_apply_moves_tracks_positions() {
        let mut mesh = grid(3);
        let mut engine = BrushQueryEngine::new(&mesh);

        let from = mesh.position(VertexId(0)).unwrap();
        let to = Vec3::new(1.9, 1.9, 0.0);
        mesh.set_vertex_position(VertexId(0), to);
        engine.apply_moves(
            &mesh,
            &[VertexMove {
                vertex_id: VertexId(0),
                from,
                to,
            }],
        );

        let hits = engine.query(Some(Vec3::new(2.0, 2.0, 0.0)), 0.2, FalloffCurve::Linear);
        let ids: Vec<VertexId> = hits.iter().map(|h| h.vertex_id).collect();
        assert_eq!(ids, vec![VertexId(8), VertexId(0)]);

        // A move far outside the index forces a rebuild
        let from = to;
        let to = Vec3::splat(50.0);
        mesh.set_vertex_position(VertexId(0), to);
        engine.apply_moves(
            &mesh,
            &[VertexMove {
                vertex_id: VertexId(0),
                from,
                to,
            }],
        );
        assert_eq!(engine.len(), 9);
        let hits = engine.query(Some(to), 0.1, FalloffCurve::Linear);
        assert_eq!(hits.len(), 1);
    }
}
