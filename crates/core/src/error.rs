//! Error types for configuration, scene loading and snapping preconditions.
//!
//! "No object selected" and "no terrain found" are not errors; they are
//! reported through [`crate::align::AlignOutcome`] and `Option` results.

use thiserror::Error;

/// Result type alias for snapping setup.
pub type SnapResult<T> = Result<T, SnapError>;

/// Precondition violations in snap or trigger parameters.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SnapError {
    /// Maximum vertical search distance is not a finite positive number.
    #[error("max vertical distance must be finite and positive, got {0}")]
    InvalidMaxDistance(f32),

    /// Trigger delay range is empty, negative or not finite.
    #[error("invalid delay range [{min}, {max}]: bounds must be finite with 0 <= min <= max")]
    InvalidDelayRange {
        /// Lower bound in seconds.
        min: f32,
        /// Upper bound in seconds.
        max: f32,
    },

    /// Trigger name is empty.
    #[error("trigger name cannot be empty")]
    EmptyTriggerName,
}

/// Errors raised while loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read or write the file.
    #[error("config file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse or serialize the JSON.
    #[error("config JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Parsed values violate a precondition.
    #[error("invalid config: {0}")]
    Invalid(#[from] SnapError),
}

/// Errors raised while building or loading a scene.
#[derive(Debug, Error)]
pub enum SceneError {
    /// Failed to read the file.
    #[error("failed to read scene: {0}")]
    Read(#[from] std::io::Error),

    /// Failed to parse the file contents.
    #[error("failed to parse scene: {0}")]
    Parse(#[from] serde_json::Error),

    /// Heightfield dimensions or extents are unusable.
    #[error("invalid heightfield: {0}")]
    InvalidHeightfield(String),

    /// Two objects share an id.
    #[error("duplicate object id {0}")]
    DuplicateObject(u32),

    /// Selection references an object that does not exist.
    #[error("selection references unknown object {0}")]
    UnknownSelection(u32),
}

impl SceneError {
    /// Create an invalid heightfield error.
    pub fn invalid_heightfield(details: impl Into<String>) -> Self {
        Self::InvalidHeightfield(details.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SnapError::InvalidMaxDistance(-1.0);
        assert!(format!("{err}").contains("-1"));

        let err = SnapError::InvalidDelayRange { min: 3.0, max: 1.0 };
        assert!(format!("{err}").contains("[3, 1]"));

        let err = SceneError::invalid_heightfield("nx must be at least 2");
        assert!(format!("{err}").contains("nx must be at least 2"));

        let err = ConfigError::from(SnapError::EmptyTriggerName);
        assert!(format!("{err}").contains("trigger name"));
    }
}
