//! Terrain snap selection.
//!
//! Maps a world position to a ground height using the hits reported along a
//! vertical probe. The probe starts `max_vertical_distance` above the position
//! and is twice that long, so one query searches both up and down.
//!
//! Selection rules:
//! - only terrain hits count
//! - a hit further than `max_vertical_distance` vertically from the original
//!   position is rejected (the bound is inclusive)
//! - among the survivors the smallest probe distance wins, i.e. the highest
//!   terrain surface inside the search window
//!
//! Only the vertical coordinate changes; `x` and `z` are copied unchanged.

pub mod config;

pub use config::{SnapConfig, TieBreak, ALIGN_UNDO_LABEL, DEFAULT_MAX_VERTICAL_DISTANCE};

use crate::core_types::{CandidateHit, Probe, Vec3};
use crate::error::SnapResult;
use crate::host::ProbeProvider;
use config::is_valid_max_distance;

/// The hit chosen for a snap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapMatch {
    /// Index of the chosen hit in the candidate slice.
    pub index: usize,
    /// Vertical coordinate of the chosen hit.
    pub height: f32,
    /// Probe distance of the chosen hit.
    pub distance: f32,
    /// `|height - original.y|`.
    pub vertical_offset: f32,
}

impl SnapMatch {
    /// `original` with its vertical coordinate replaced by the match height.
    #[inline]
    pub fn apply_to(&self, original: Vec3) -> Vec3 {
        Vec3::new(original.x, self.height, original.z)
    }

    fn beats(&self, current: &SnapMatch, tie_break: TieBreak) -> bool {
        if self.distance < current.distance {
            return true;
        }
        self.distance == current.distance
            && tie_break == TieBreak::SmallestVerticalOffset
            && self.vertical_offset < current.vertical_offset
    }
}

/// Pick the terrain hit to snap to, if any.
///
/// Hits with a non-finite point or distance are ignored, as is everything when
/// `original` itself is not finite.
pub fn select_hit(
    original: Vec3,
    max_vertical_distance: f32,
    hits: &[CandidateHit],
    tie_break: TieBreak,
) -> Option<SnapMatch> {
    if !(original.x.is_finite() && original.y.is_finite() && original.z.is_finite()) {
        return None;
    }

    let mut best: Option<SnapMatch> = None;
    for (index, hit) in hits.iter().enumerate() {
        if !hit.is_terrain() || !hit.is_finite() {
            continue;
        }

        let vertical_offset = (hit.point.y - original.y).abs();
        if vertical_offset > max_vertical_distance {
            continue;
        }

        let candidate = SnapMatch {
            index,
            height: hit.point.y,
            distance: hit.distance,
            vertical_offset,
        };
        if best.is_none_or(|current| candidate.beats(&current, tie_break)) {
            best = Some(candidate);
        }
    }
    best
}

/// Snap `original` onto the closest qualifying terrain hit.
///
/// Returns `None` when no terrain hit lies within `max_vertical_distance`
/// vertically. `max_vertical_distance` must be finite and positive; other
/// values trip a debug assertion and produce `None` in release builds.
pub fn try_snap(original: Vec3, max_vertical_distance: f32, hits: &[CandidateHit]) -> Option<Vec3> {
    debug_assert!(
        is_valid_max_distance(max_vertical_distance),
        "max_vertical_distance must be finite and positive, got {max_vertical_distance}"
    );
    if !is_valid_max_distance(max_vertical_distance) {
        return None;
    }
    select_hit(original, max_vertical_distance, hits, TieBreak::InputOrder)
        .map(|m| m.apply_to(original))
}

/// Stateless snapper bound to a validated [`SnapConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TerrainSnapper {
    config: SnapConfig,
}

impl TerrainSnapper {
    /// Create a snapper.
    ///
    /// # Errors
    /// Returns [`crate::SnapError::InvalidMaxDistance`] if the config's search
    /// distance is not finite and positive.
    pub fn new(config: SnapConfig) -> SnapResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Active configuration.
    pub fn config(&self) -> &SnapConfig {
        &self.config
    }

    /// Maximum vertical search distance.
    pub fn max_vertical_distance(&self) -> f32 {
        self.config.max_vertical_distance
    }

    /// Vertical probe centred on `position` covering the whole search window.
    pub fn probe_for(&self, position: Vec3) -> Probe {
        Probe::vertical_through(position, self.config.max_vertical_distance)
            .with_filter(self.config.filter)
    }

    /// Chosen hit for `original`, if any.
    pub fn select(&self, original: Vec3, hits: &[CandidateHit]) -> Option<SnapMatch> {
        select_hit(
            original,
            self.config.max_vertical_distance,
            hits,
            self.config.tie_break,
        )
    }

    /// Corrected position for `original`, if terrain was found.
    pub fn try_snap(&self, original: Vec3, hits: &[CandidateHit]) -> Option<Vec3> {
        self.select(original, hits).map(|m| m.apply_to(original))
    }

    /// Issue the probe for `position` on `provider` and snap against its hits.
    pub fn snap_with<P>(&self, provider: &P, position: Vec3) -> Option<Vec3>
    where
        P: ProbeProvider + ?Sized,
    {
        let probe = self.probe_for(position);
        let hits = provider.cast(&probe);
        let snapped = self.try_snap(position, &hits);
        tracing::trace!(
            hits = hits.len(),
            found = snapped.is_some(),
            "probed ({:.2}, {:.2}, {:.2})",
            position.x,
            position.y,
            position.z
        );
        snapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn p(x: f32, y: f32, z: f32) -> Vec3 {
        Vec3::new(x, y, z)
    }

    #[test]
    fn non_terrain_is_ignored_even_when_closer() {
        let hits = [
            CandidateHit::terrain(p(0.0, 10.0, 0.0), 40.0),
            CandidateHit::other(p(0.0, 49.0, 0.0), 1.0),
        ];
        assert_eq!(try_snap(p(0.0, 50.0, 0.0), 100.0, &hits), Some(p(0.0, 10.0, 0.0)));
    }

    #[test]
    fn smallest_probe_distance_wins() {
        let hits = [
            CandidateHit::terrain(p(5.0, -4.0, 5.0), 30.0),
            CandidateHit::terrain(p(5.0, 7.5, 5.0), 20.0),
        ];
        let snapped = try_snap(p(5.0, 0.0, 5.0), 100.0, &hits).unwrap();
        assert_eq!(snapped.x, 5.0);
        assert_eq!(snapped.z, 5.0);
        assert_relative_eq!(snapped.y, 7.5);
    }

    #[test]
    fn out_of_range_and_empty_are_no_match() {
        let hits = [CandidateHit::terrain(p(0.0, 150.0, 0.0), 10.0)];
        assert_eq!(try_snap(Vec3::zeros(), 100.0, &hits), None);
        assert_eq!(try_snap(Vec3::zeros(), 100.0, &[]), None);
    }

    #[test]
    fn bound_is_inclusive() {
        let hits = [CandidateHit::terrain(p(0.0, -100.0, 0.0), 200.0)];
        assert_eq!(try_snap(Vec3::zeros(), 100.0, &hits), Some(p(0.0, -100.0, 0.0)));
    }

    #[test]
    fn non_finite_hits_are_skipped() {
        let hits = [
            CandidateHit::terrain(p(0.0, 3.0, 0.0), f32::NAN),
            CandidateHit::terrain(p(0.0, f32::INFINITY, 0.0), 1.0),
            CandidateHit::terrain(p(0.0, -2.0, 0.0), 50.0),
        ];
        let m = TerrainSnapper::default().select(Vec3::zeros(), &hits).unwrap();
        assert_eq!(m.index, 2);
    }

    #[test]
    fn tie_break_policies() {
        let hits = [
            CandidateHit::terrain(p(0.0, 8.0, 0.0), 25.0),
            CandidateHit::terrain(p(0.0, 1.0, 0.0), 25.0),
        ];

        let first = TerrainSnapper::default().select(Vec3::zeros(), &hits).unwrap();
        assert_eq!(first.index, 0);

        let nearest = TerrainSnapper::new(
            SnapConfig::default().with_tie_break(TieBreak::SmallestVerticalOffset),
        )
        .unwrap()
        .select(Vec3::zeros(), &hits)
        .unwrap();
        assert_eq!(nearest.index, 1);
        assert_relative_eq!(nearest.vertical_offset, 1.0);
    }

    #[test]
    fn hits_are_not_mutated() {
        let hits = vec![
            CandidateHit::other(p(0.0, 1.0, 0.0), 2.0),
            CandidateHit::terrain(p(0.0, 0.5, 0.0), 3.0),
        ];
        let before = hits.clone();
        let _ = try_snap(Vec3::zeros(), 10.0, &hits);
        assert_eq!(hits, before);
    }

    #[test]
    fn new_rejects_invalid_config() {
        assert!(TerrainSnapper::new(SnapConfig::with_max_distance(-1.0)).is_err());
    }

    #[test]
    fn probe_uses_configured_distance() {
        let snapper = TerrainSnapper::new(SnapConfig::with_max_distance(25.0)).unwrap();
        let probe = snapper.probe_for(p(1.0, 2.0, 3.0));
        assert_eq!(probe.origin, p(1.0, 27.0, 3.0));
        assert_eq!(probe.length, 50.0);
    }
}
