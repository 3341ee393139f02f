//! Mirror-plane clamping for committed positions.

use glam::Vec3;
use retopo_config::SymmetryAxes;

/// Keep a committed position on the enabled mirror planes.
///
/// For each enabled axis, a vertex that started on the plane (within
/// `threshold`) or crossed it during the step is put back at 0 on that axis.
pub fn apply_symmetry(axes: SymmetryAxes, threshold: f32, before: Vec3, after: Vec3) -> Vec3 {
    if !axes.any() {
        return after;
    }

    let mut clamped = after;
    for (axis, enabled) in axes.as_array().into_iter().enumerate() {
        if !enabled {
            continue;
        }
        let was = before[axis];
        let now = after[axis];
        if was.abs() <= threshold || was * now < 0.0 {
            clamped[axis] = 0.0;
        }
    }
    clamped
}
