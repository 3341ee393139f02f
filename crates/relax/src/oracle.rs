//! Host collaborators consulted during a relaxation step.
//!
//! The solver never looks at source geometry or the view directly. It asks a
//! [`ProjectionOracle`] where a moved vertex lands on the source surfaces and
//! a [`VisibilityOracle`] whether a vertex may be touched at all.

use glam::Vec3;

/// Snaps a point onto the source surfaces.
pub trait ProjectionOracle {
    /// Nearest point on the source surfaces to `point`.
    fn nearest_point(&self, point: Vec3) -> Vec3;
}

/// Decides whether a vertex is visible in the current view.
pub trait VisibilityOracle {
    fn is_visible(&self, position: Vec3, normal: Vec3) -> bool;
}

impl<F: Fn(Vec3) -> Vec3> ProjectionOracle for F {
    fn nearest_point(&self, point: Vec3) -> Vec3 {
        self(point)
    }
}

/// Leaves points where they are.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityProjection;

impl ProjectionOracle for IdentityProjection {
    fn nearest_point(&self, point: Vec3) -> Vec3 {
        point
    }
}

/// Orthogonal projection onto an infinite plane.
#[derive(Debug, Clone, Copy)]
pub struct PlaneProjection {
    pub origin: Vec3,
    pub normal: Vec3,
}

impl PlaneProjection {
    pub fn new(origin: Vec3, normal: Vec3) -> Self {
        Self {
            origin,
            normal: normal.normalize_or(Vec3::Z),
        }
    }
}

impl ProjectionOracle for PlaneProjection {
    fn nearest_point(&self, point: Vec3) -> Vec3 {
        point - self.normal * (point - self.origin).dot(self.normal)
    }
}

/// Every vertex is visible.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysVisible;

impl VisibilityOracle for AlwaysVisible {
    fn is_visible(&self, _position: Vec3, _normal: Vec3) -> bool {
        true
    }
}

/// Visible when the vertex normal faces the eye point.
#[derive(Debug, Clone, Copy)]
pub struct FacingView {
    pub eye: Vec3,
}

impl VisibilityOracle for FacingView {
    fn is_visible(&self, position: Vec3, normal: Vec3) -> bool {
        normal.dot(self.eye - position) > 0.0
    }
}
