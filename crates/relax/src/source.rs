//! Source surfaces: the dense geometry the target mesh is snapped onto.
//!
//! Each source is a triangle soup. Projection walks every triangle of every
//! source, skipping sources whose bounds are already farther away than the
//! best candidate.

use glam::Vec3;

use crate::mesh::MeshError;
use crate::oracle::ProjectionOracle;
use crate::spatial::Aabb;

/// Triangle mesh data for one source surface.
#[derive(Debug, Clone)]
pub struct SourceMesh {
    positions: Vec<Vec3>,
    indices: Vec<u32>,
    bounds: Aabb,
}

impl SourceMesh {
    /// Create a source from positions and triangle indices (3 per triangle).
    pub fn new(positions: Vec<Vec3>, indices: Vec<u32>) -> Result<Self, MeshError> {
        if indices.len() % 3 != 0 {
            return Err(MeshError::InvalidTopology(
                "Index count not divisible by 3".to_string(),
            ));
        }
        if let Some(&index) = indices.iter().find(|&&i| i as usize >= positions.len()) {
            return Err(MeshError::VertexOutOfRange {
                index,
                count: positions.len(),
            });
        }

        let mut bounds = Aabb::empty();
        for &p in &positions {
            bounds.include_point(p);
        }

        Ok(Self {
            positions,
            indices,
            bounds,
        })
    }

    /// Get the number of triangles in the mesh
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Get the vertex positions for a triangle
    pub fn triangle_positions(&self, tri_index: usize) -> (Vec3, Vec3, Vec3) {
        let base = tri_index * 3;
        (
            self.positions[self.indices[base] as usize],
            self.positions[self.indices[base + 1] as usize],
            self.positions[self.indices[base + 2] as usize],
        )
    }

    pub fn bounds(&self) -> &Aabb {
        &self.bounds
    }

    /// Closest point on this source, with its squared distance.
    ///
    /// Triangles are only tested while they could beat `best_distance_sq`.
    fn nearest_point_within(&self, point: Vec3, best_distance_sq: f32) -> Option<(Vec3, f32)> {
        if self.bounds.is_empty() || self.bounds.distance_squared(point) > best_distance_sq {
            return None;
        }

        let mut best: Option<(Vec3, f32)> = None;
        let mut limit = best_distance_sq;
        for tri in 0..self.triangle_count() {
            let (a, b, c) = self.triangle_positions(tri);
            let candidate = closest_point_on_triangle(point, a, b, c);
            let distance_sq = candidate.distance_squared(point);
            if distance_sq < limit {
                limit = distance_sq;
                best = Some((candidate, distance_sq));
            }
        }
        best
    }
}

/// Closest point to `p` on triangle `abc`, by Voronoi region classification.
pub fn closest_point_on_triangle(p: Vec3, a: Vec3, b: Vec3, c: Vec3) -> Vec3 {
    let ab = b - a;
    let ac = c - a;
    let ap = p - a;

    let d1 = ab.dot(ap);
    let d2 = ac.dot(ap);
    if d1 <= 0.0 && d2 <= 0.0 {
        return a;
    }

    let bp = p - b;
    let d3 = ab.dot(bp);
    let d4 = ac.dot(bp);
    if d3 >= 0.0 && d4 <= d3 {
        return b;
    }

    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        let v = d1 / (d1 - d3);
        return a + ab * v;
    }

    let cp = p - c;
    let d5 = ab.dot(cp);
    let d6 = ac.dot(cp);
    if d6 >= 0.0 && d5 <= d6 {
        return c;
    }

    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        let w = d2 / (d2 - d6);
        return a + ac * w;
    }

    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
        return b + (c - b) * w;
    }

    let denom = 1.0 / (va + vb + vc);
    let v = vb * denom;
    let w = vc * denom;
    a + ab * v + ac * w
}

/// The set of source surfaces a target mesh is retopologized onto.
#[derive(Debug, Clone, Default)]
pub struct SourceSurfaces {
    sources: Vec<SourceMesh>,
}

impl SourceSurfaces {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, source: SourceMesh) {
        self.sources.push(source);
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Closest point over all sources, or `None` if there is no geometry.
    pub fn try_nearest_point(&self, point: Vec3) -> Option<Vec3> {
        let mut best: Option<(Vec3, f32)> = None;
        for source in &self.sources {
            let limit = best.map_or(f32::INFINITY, |(_, d)| d);
            if let Some(candidate) = source.nearest_point_within(point, limit) {
                best = Some(candidate);
            }
        }
        best.map(|(p, _)| p)
    }
}

impl FromIterator<SourceMesh> for SourceSurfaces {
    fn from_iter<I: IntoIterator<Item = SourceMesh>>(iter: I) -> Self {
        Self {
            sources: iter.into_iter().collect(),
        }
    }
}

impl ProjectionOracle for SourceSurfaces {
    /// Points stay put when there are no source triangles.
    fn nearest_point(&self, point: Vec3) -> Vec3 {
        self.try_nearest_point(point).unwrap_or(point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square(z: f32) -> SourceMesh {
        SourceMesh::new(
            vec![
                Vec3::new(0.0, 0.0, z),
                Vec3::new(1.0, 0.0, z),
                Vec3::new(1.0, 1.0, z),
                Vec3::new(0.0, 1.0, z),
            ],
            vec![0, 1, 2, 0, 2, 3],
        )
        .unwrap()
    }

    #[test]
    fn test_closest_point_regions() {
        let a = Vec3::ZERO;
        let b = Vec3::X;
        let c = Vec3::Y;

        // Face interior
        let p = closest_point_on_triangle(Vec3::new(0.2, 0.2, 3.0), a, b, c);
        assert!((p - Vec3::new(0.2, 0.2, 0.0)).length() < 1e-6);
        // Vertex regions
        assert_eq!(closest_point_on_triangle(Vec3::new(-1.0, -1.0, 0.0), a, b, c), a);
        assert_eq!(closest_point_on_triangle(Vec3::new(2.0, -0.5, 0.0), a, b, c), b);
        assert_eq!(closest_point_on_triangle(Vec3::new(-0.5, 2.0, 0.0), a, b, c), c);
        // Edge regions
        let p = closest_point_on_triangle(Vec3::new(0.5, -1.0, 0.0), a, b, c);
        assert!((p - Vec3::new(0.5, 0.0, 0.0)).length() < 1e-6);
        let p = closest_point_on_triangle(Vec3::new(1.0, 1.0, 0.0), a, b, c);
        assert!((p - Vec3::new(0.5, 0.5, 0.0)).length() < 1e-6);
    }

    #[test]
    fn test_nearest_over_multiple_sources() {
        let surfaces: SourceSurfaces = [unit_square(0.0), unit_square(1.0)].into_iter().collect();
        assert_eq!(surfaces.len(), 2);

        let low = surfaces.nearest_point(Vec3::new(0.5, 0.5, 0.3));
        assert!((low - Vec3::new(0.5, 0.5, 0.0)).length() < 1e-6);

        let high = surfaces.nearest_point(Vec3::new(0.5, 0.5, 0.7));
        assert!((high - Vec3::new(0.5, 0.5, 1.0)).length() < 1e-6);

        let outside = surfaces.nearest_point(Vec3::new(2.0, 0.5, -1.0));
        assert!((outside - Vec3::new(1.0, 0.5, 0.0)).length() < 1e-6);
    }

    #[test]
    fn test_empty_sources_leave_point() {
        let surfaces = SourceSurfaces::new();
        assert!(surfaces.try_nearest_point(Vec3::ONE).is_none());
        assert_eq!(surfaces.nearest_point(Vec3::ONE), Vec3::ONE);
    }

    #[test]
    fn test_invalid_source() {
        assert!(SourceMesh::new(vec![Vec3::ZERO], vec![0, 0]).is_err());
        assert!(matches!(
            SourceMesh::new(vec![Vec3::ZERO], vec![0, 0, 3]),
            Err(MeshError::VertexOutOfRange { index: 3, .. })
        ));
    }
}
