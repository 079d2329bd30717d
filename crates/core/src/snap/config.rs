//! Snap configuration.

use crate::core_types::QueryFilter;
use crate::error::{SnapError, SnapResult};
use serde::{Deserialize, Serialize};

/// Default maximum vertical search distance in world units.
pub const DEFAULT_MAX_VERTICAL_DISTANCE: f32 = 100.0;

/// Undo label recorded for alignment mutations.
pub const ALIGN_UNDO_LABEL: &str = "Align To Terrain";

/// How to choose between terrain hits with identical probe distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TieBreak {
    /// First hit in input order wins.
    #[default]
    InputOrder,
    /// Hit with the smallest vertical offset from the original position wins,
    /// falling back to input order.
    SmallestVerticalOffset,
}

/// Parameters of the terrain search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapConfig {
    /// Half-length of the vertical probe and the largest accepted vertical
    /// offset between the original position and a terrain hit.
    pub max_vertical_distance: f32,
    /// Tie-break between equally distant hits.
    pub tie_break: TieBreak,
    /// Collider filter forwarded to the probe provider.
    pub filter: QueryFilter,
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self {
            max_vertical_distance: DEFAULT_MAX_VERTICAL_DISTANCE,
            tie_break: TieBreak::InputOrder,
            filter: QueryFilter::default(),
        }
    }
}

impl SnapConfig {
    /// Config with the given search distance and default everything else.
    pub fn with_max_distance(max_vertical_distance: f32) -> Self {
        Self {
            max_vertical_distance,
            ..Self::default()
        }
    }

    /// Replace the tie-break policy.
    pub fn with_tie_break(mut self, tie_break: TieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }

    /// Check preconditions.
    ///
    /// # Errors
    /// Returns [`SnapError::InvalidMaxDistance`] if the search distance is not
    /// finite and positive.
    pub fn validate(&self) -> SnapResult<()> {
        if is_valid_max_distance(self.max_vertical_distance) {
            Ok(())
        } else {
            Err(SnapError::InvalidMaxDistance(self.max_vertical_distance))
        }
    }
}

/// Search distances must be finite and strictly positive.
#[inline]
pub(crate) fn is_valid_max_distance(value: f32) -> bool {
    value.is_finite() && value > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_editor_tool() {
        let config = SnapConfig::default();
        assert_eq!(config.max_vertical_distance, 100.0);
        assert_eq!(config.tie_break, TieBreak::InputOrder);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_bad_distances() {
        for bad in [0.0, -5.0, f32::NAN, f32::INFINITY] {
            assert!(SnapConfig::with_max_distance(bad).validate().is_err());
        }
    }

    #[test]
    fn partial_json_uses_defaults() {
        let config: SnapConfig =
            serde_json::from_str(r#"{ "tie_break": "smallest-vertical-offset" }"#).unwrap();
        assert_eq!(config.max_vertical_distance, 100.0);
        assert_eq!(config.tie_break, TieBreak::SmallestVerticalOffset);
    }
}
