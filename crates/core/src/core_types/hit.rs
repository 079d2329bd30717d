//! Candidate intersections reported along a probe.

use super::vec3::Vec3;
use serde::{Deserialize, Serialize};

/// Identifier of the collider that produced a hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct ColliderId(pub u32);

/// Surface classification of a hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SurfaceKind {
    /// Ground geometry (heightfield terrain).
    Terrain,
    /// Any other collidable geometry.
    Other,
}

impl SurfaceKind {
    /// Convert from u8 for FFI compatibility
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(SurfaceKind::Other),
            1 => Some(SurfaceKind::Terrain),
            _ => None,
        }
    }

    /// Convert to u8 for FFI compatibility
    pub fn as_u8(self) -> u8 {
        match self {
            SurfaceKind::Other => 0,
            SurfaceKind::Terrain => 1,
        }
    }
}

/// One intersection along a probe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandidateHit {
    /// World-space intersection point.
    pub point: Vec3,
    /// Surface classification.
    pub surface: SurfaceKind,
    /// Distance from the probe origin to `point`.
    pub distance: f32,
    /// Collider that was hit.
    pub collider: ColliderId,
}

impl CandidateHit {
    /// Hit on terrain geometry.
    pub fn terrain(point: Vec3, distance: f32) -> Self {
        Self {
            point,
            surface: SurfaceKind::Terrain,
            distance,
            collider: ColliderId::default(),
        }
    }

    /// Hit on non-terrain geometry.
    pub fn other(point: Vec3, distance: f32) -> Self {
        Self {
            point,
            surface: SurfaceKind::Other,
            distance,
            collider: ColliderId::default(),
        }
    }

    /// Tag the hit with the collider that produced it.
    pub fn with_collider(mut self, collider: ColliderId) -> Self {
        self.collider = collider;
        self
    }

    /// Whether the hit is classified as terrain.
    #[inline]
    pub fn is_terrain(&self) -> bool {
        self.surface == SurfaceKind::Terrain
    }

    /// Point and distance are usable numbers.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.distance.is_finite()
            && self.point.x.is_finite()
            && self.point.y.is_finite()
            && self.point.z.is_finite()
    }
}
