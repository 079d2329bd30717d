//! Axis-aligned box colliders.

use crate::core_types::Vec3;
use serde::{Deserialize, Serialize};

/// Solid or trigger box that is never classified as terrain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxCollider {
    /// Minimum corner.
    pub min: Vec3,
    /// Maximum corner.
    pub max: Vec3,
    /// Collision layer (0-31).
    #[serde(default)]
    pub layer: u8,
    /// Trigger volumes are skipped by default probe filters.
    #[serde(default)]
    pub is_trigger: bool,
}

impl BoxCollider {
    /// Box spanning two corners in any order.
    pub fn from_corners(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.inf(&b),
            max: a.sup(&b),
            layer: 0,
            is_trigger: false,
        }
    }

    /// Box centred on `center` with the given half-extents.
    pub fn centered(center: Vec3, half_extents: Vec3) -> Self {
        let half = half_extents.abs();
        Self::from_corners(center - half, center + half)
    }

    /// Put the box on a collision layer.
    pub fn on_layer(mut self, layer: u8) -> Self {
        self.layer = layer;
        self
    }

    /// Mark the box as a trigger volume.
    pub fn as_trigger(mut self) -> Self {
        self.is_trigger = true;
        self
    }

    /// Distance along the ray to where it enters the box.
    ///
    /// Rays that start inside the box, miss it, or enter beyond
    /// `max_distance` return `None`.
    pub fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<f32> {
        let mut t_enter = f32::NEG_INFINITY;
        let mut t_exit = f32::INFINITY;

        for axis in 0..3 {
            let o = origin[axis];
            let d = direction[axis];
            let (lo, hi) = (self.min[axis], self.max[axis]);

            if d.abs() < 1e-12 {
                // Parallel to this slab: must already be inside it.
                if o < lo || o > hi {
                    return None;
                }
                continue;
            }

            let t0 = (lo - o) / d;
            let t1 = (hi - o) / d;
            let (near, far) = if t0 <= t1 { (t0, t1) } else { (t1, t0) };
            t_enter = t_enter.max(near);
            t_exit = t_exit.min(far);

            if t_enter > t_exit {
                return None;
            }
        }

        (0.0..=max_distance).contains(&t_enter).then_some(t_enter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn down() -> Vec3 {
        Vec3::new(0.0, -1.0, 0.0)
    }

    #[test]
    fn vertical_ray_hits_top_face() {
        let b = BoxCollider::centered(Vec3::new(0.0, 5.0, 0.0), Vec3::new(1.0, 1.0, 1.0));
        let t = b.raycast(Vec3::new(0.5, 20.0, -0.5), down(), 100.0).unwrap();
        assert_eq!(t, 14.0);
    }

    #[test]
    fn misses_and_inside_starts() {
        let b = BoxCollider::from_corners(Vec3::new(1.0, 1.0, 1.0), Vec3::new(-1.0, -1.0, -1.0));
        assert!(b.raycast(Vec3::new(3.0, 20.0, 0.0), down(), 100.0).is_none());
        assert!(b.raycast(Vec3::zeros(), down(), 100.0).is_none());
        assert!(b.raycast(Vec3::new(0.0, 20.0, 0.0), down(), 10.0).is_none());
    }

    #[test]
    fn oblique_entry() {
        let b = BoxCollider::from_corners(Vec3::new(4.0, -1.0, -1.0), Vec3::new(6.0, 1.0, 1.0));
        let t = b
            .raycast(Vec3::zeros(), Vec3::new(1.0, 0.0, 0.0), 10.0)
            .unwrap();
        assert_eq!(t, 4.0);
    }
}
