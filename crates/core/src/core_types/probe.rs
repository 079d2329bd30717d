//! Probe segments used to query an environment for surface intersections.

use super::vec3::{down, Vec3};
use serde::{Deserialize, Serialize};

/// Layer mask that matches every collider layer.
pub const ALL_LAYERS: u32 = u32::MAX;

/// How a probe treats trigger volumes (colliders that report overlaps but
/// have no solid surface).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TriggerInteraction {
    /// Trigger volumes are skipped.
    #[default]
    Ignore,
    /// Trigger volumes are reported like solid colliders.
    Collide,
}

/// Which colliders a probe is allowed to report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryFilter {
    /// Bit `n` set means colliders on layer `n` are tested.
    pub layer_mask: u32,
    /// Trigger volume handling.
    pub triggers: TriggerInteraction,
}

impl Default for QueryFilter {
    fn default() -> Self {
        Self {
            layer_mask: ALL_LAYERS,
            triggers: TriggerInteraction::Ignore,
        }
    }
}

impl QueryFilter {
    /// Whether a collider on `layer` with the given trigger flag passes the filter.
    ///
    /// Layers outside `0..32` never match.
    pub fn accepts(&self, layer: u8, is_trigger: bool) -> bool {
        if is_trigger && self.triggers == TriggerInteraction::Ignore {
            return false;
        }
        1u32.checked_shl(u32::from(layer))
            .is_some_and(|bit| self.layer_mask & bit != 0)
    }
}

/// A directed line segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Probe {
    /// Start of the segment.
    pub origin: Vec3,
    /// Unit direction.
    pub direction: Vec3,
    /// Segment length along `direction`.
    pub length: f32,
    /// Collider filter applied by the probe provider.
    pub filter: QueryFilter,
}

impl Probe {
    /// Create a probe. `direction` is normalized; a zero direction yields NaN
    /// components, which providers treat as "no hits".
    pub fn new(origin: Vec3, direction: Vec3, length: f32) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
            length,
            filter: QueryFilter::default(),
        }
    }

    /// Vertical probe centred on `position`: starts `half_extent` above it,
    /// points down and is `2 * half_extent` long.
    pub fn vertical_through(position: Vec3, half_extent: f32) -> Self {
        let origin = Vec3::new(position.x, position.y + half_extent, position.z);
        Self::new(origin, down(), half_extent * 2.0)
    }

    /// Origin, direction and length are usable numbers.
    pub fn is_valid(&self) -> bool {
        self.origin.iter().all(|c| c.is_finite())
            && self.direction.iter().all(|c| c.is_finite())
            && self.length.is_finite()
            && self.length >= 0.0
    }

    /// Replace the collider filter.
    pub fn with_filter(mut self, filter: QueryFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Point at distance `t` along the probe.
    #[inline]
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// End point of the segment.
    pub fn end(&self) -> Vec3 {
        self.point_at(self.length)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn vertical_probe_is_centred() {
        let probe = Probe::vertical_through(Vec3::new(3.0, 10.0, -2.0), 100.0);
        assert_eq!(probe.origin, Vec3::new(3.0, 110.0, -2.0));
        assert_eq!(probe.direction, down());
        assert_eq!(probe.length, 200.0);
        assert_relative_eq!(probe.end().y, -90.0);
    }

    #[test]
    fn degenerate_probe_is_invalid() {
        assert!(Probe::new(Vec3::zeros(), down(), 1.0).is_valid());
        assert!(!Probe::new(Vec3::zeros(), Vec3::zeros(), 1.0).is_valid());
        assert!(!Probe::new(Vec3::zeros(), down(), f32::NAN).is_valid());
    }

    #[test]
    fn default_filter_skips_triggers() {
        let filter = QueryFilter::default();
        assert!(filter.accepts(0, false));
        assert!(filter.accepts(31, false));
        assert!(!filter.accepts(4, true));
        assert!(!filter.accepts(40, false));
    }

    #[test]
    fn layer_mask_selects_layers() {
        let filter = QueryFilter {
            layer_mask: 0b101,
            triggers: TriggerInteraction::Collide,
        };
        assert!(filter.accepts(0, false));
        assert!(!filter.accepts(1, false));
        assert!(filter.accepts(2, true));
    }
}
