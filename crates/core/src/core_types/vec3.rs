//! Vector type alias for 3D positions and directions.

use nalgebra::Vector3;

/// 3D vector type for positions, probe directions and hit points.
///
/// This is a simple alias for `nalgebra::Vector3<f32>`. The world is Y-up:
/// `y` is the vertical coordinate that snapping replaces, `x` and `z` span the
/// ground plane.
pub type Vec3 = Vector3<f32>;

/// World down axis, the direction of alignment probes.
#[inline]
pub fn down() -> Vec3 {
    Vec3::new(0.0, -1.0, 0.0)
}
