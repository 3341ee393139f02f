//! Shared configuration for the retopology relax tool
//!
//! This crate is the single source of truth for the options the relax core
//! reads every tick: brush size and strength, the falloff curve, movement
//! constraints and mirror symmetry. Nothing here is persisted; the host owns
//! the values and hands a snapshot to each relaxation step.

use serde::{Deserialize, Serialize};

#[cfg(feature = "bevy")]
use bevy::prelude::Resource;

/// Default brush radius in target-mesh units
pub const DEFAULT_BRUSH_RADIUS: f32 = 0.25;

/// Default brush strength (0.0 to 1.0)
pub const DEFAULT_BRUSH_STRENGTH: f32 = 0.5;

/// Distance from a mirror plane under which a vertex counts as lying on it
pub const DEFAULT_SYMMETRY_THRESHOLD: f32 = 0.001;

/// Falloff curve for brush influence.
///
/// Maps normalized distance from the brush center (0.0 = center, 1.0 = rim)
/// to a strength in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum FalloffCurve {
    /// Linear falloff: strength = 1 - distance/radius
    Linear = 0,
    /// Smooth falloff: hermite interpolation
    #[default]
    Smooth = 1,
    /// Sharp falloff: quadratic decay
    Sharp = 2,
    /// Constant: full strength within radius
    Constant = 3,
    /// Sphere: spherical falloff (sqrt-based)
    Sphere = 4,
}

impl FalloffCurve {
    /// Calculate falloff strength at a given normalized distance (0.0 = center, 1.0 = edge).
    pub fn evaluate(&self, normalized_distance: f32) -> f32 {
        let d = normalized_distance.clamp(0.0, 1.0);
        match self {
            FalloffCurve::Linear => 1.0 - d,
            FalloffCurve::Smooth => {
                let t = 1.0 - d;
                t * t * (3.0 - 2.0 * t)
            }
            FalloffCurve::Sharp => {
                let t = 1.0 - d;
                t * t
            }
            FalloffCurve::Constant => 1.0,
            FalloffCurve::Sphere => (1.0 - d * d).max(0.0).sqrt(),
        }
    }
}

/// Mirror planes through the target-mesh origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SymmetryAxes {
    /// Mirror across the YZ plane (x = 0)
    pub x: bool,
    /// Mirror across the XZ plane (y = 0)
    pub y: bool,
    /// Mirror across the XY plane (z = 0)
    pub z: bool,
}

impl SymmetryAxes {
    /// No mirror planes.
    pub const NONE: Self = Self {
        x: false,
        y: false,
        z: false,
    };

    /// Whether any mirror plane is enabled.
    pub fn any(&self) -> bool {
        self.x || self.y || self.z
    }

    /// Enabled flags in x, y, z order.
    pub fn as_array(&self) -> [bool; 3] {
        [self.x, self.y, self.z]
    }
}

/// Options read by every relaxation step.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "bevy", derive(Resource))]
pub struct RelaxOptions {
    /// Allow vertices on a border or non-manifold edge to move
    pub move_boundary: bool,
    /// Allow vertices that fail the visibility test to move
    pub move_hidden: bool,
    /// Only move vertices that are selected
    pub move_selected_only: bool,
    /// Brush strength (0.0 to 1.0)
    pub brush_strength: f32,
    /// Brush radius, already scaled to target-mesh units by the host
    pub brush_radius: f32,
    /// Falloff curve used to weight brushed vertices
    pub falloff: FalloffCurve,
    /// Mirror planes that seam vertices must stay on
    pub symmetry: SymmetryAxes,
    /// Distance under which a vertex is treated as lying on a mirror plane
    pub symmetry_threshold: f32,
}

impl Default for RelaxOptions {
    fn default() -> Self {
        Self {
            move_boundary: false,
            move_hidden: false,
            move_selected_only: false,
            brush_strength: DEFAULT_BRUSH_STRENGTH,
            brush_radius: DEFAULT_BRUSH_RADIUS,
            falloff: FalloffCurve::default(),
            symmetry: SymmetryAxes::NONE,
            symmetry_threshold: DEFAULT_SYMMETRY_THRESHOLD,
        }
    }
}

impl RelaxOptions {
    /// Options with the given brush radius and strength and default constraints.
    pub fn with_brush(radius: f32, strength: f32) -> Self {
        Self {
            brush_radius: radius,
            brush_strength: strength.clamp(0.0, 1.0),
            ..Default::default()
        }
    }

    /// Options that let every vertex move (boundary and hidden included).
    pub fn unconstrained() -> Self {
        Self {
            move_boundary: true,
            move_hidden: true,
            ..Default::default()
        }
    }

    /// Whether the brush radius is usable as a divisor.
    pub fn has_valid_radius(&self) -> bool {
        self.brush_radius.is_finite() && self.brush_radius > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = RelaxOptions::default();
        assert!(!options.move_boundary);
        assert!(!options.move_hidden);
        assert!(!options.move_selected_only);
        assert_eq!(options.brush_radius, DEFAULT_BRUSH_RADIUS);
        assert_eq!(options.brush_strength, DEFAULT_BRUSH_STRENGTH);
        assert_eq!(options.falloff, FalloffCurve::Smooth);
        assert!(!options.symmetry.any());
    }

    #[test]
    fn test_falloff_curves() {
        for curve in [
            FalloffCurve::Linear,
            FalloffCurve::Smooth,
            FalloffCurve::Sharp,
            FalloffCurve::Sphere,
        ] {
            assert!((curve.evaluate(0.0) - 1.0).abs() < 0.001);
            assert!(curve.evaluate(1.0).abs() < 0.001);
        }
        assert!((FalloffCurve::Constant.evaluate(1.0) - 1.0).abs() < 0.001);

        // Out-of-range input is clamped
        assert!((FalloffCurve::Linear.evaluate(-1.0) - 1.0).abs() < 0.001);
        assert!(FalloffCurve::Linear.evaluate(2.0).abs() < 0.001);
    }

    #[test]
    fn test_falloff_monotonic() {
        for curve in [
            FalloffCurve::Linear,
            FalloffCurve::Smooth,
            FalloffCurve::Sharp,
            FalloffCurve::Sphere,
        ] {
            let mut previous = curve.evaluate(0.0);
            for step in 1..=20 {
                let value = curve.evaluate(step as f32 / 20.0);
                assert!(value <= previous + 1e-6, "{:?} not monotonic", curve);
                previous = value;
            }
        }
    }

    #[test]
    fn test_with_brush_clamps_strength() {
        let options = RelaxOptions::with_brush(2.0, 3.0);
        assert_eq!(options.brush_radius, 2.0);
        assert_eq!(options.brush_strength, 1.0);
        assert!(options.has_valid_radius());

        let options = RelaxOptions::with_brush(0.0, 0.5);
        assert!(!options.has_valid_radius());
    }

    #[test]
    fn test_symmetry_axes() {
        let axes = SymmetryAxes {
            x: true,
            ..Default::default()
        };
        assert!(axes.any());
        assert_eq!(axes.as_array(), [true, false, false]);
        assert!(!SymmetryAxes::NONE.any());
    }
}
