//! Tool configuration loaded from JSON.
//!
//! ```json
//! {
//!   "snap": { "max_vertical_distance": 100.0, "tie_break": "input-order" },
//!   "trigger": { "min_delay": 0.0, "max_delay": 3.0, "trigger_name": "Start" }
//! }
//! ```
//!
//! Every field is optional and falls back to its default.

use crate::error::ConfigError;
use crate::snap::SnapConfig;
use crate::trigger::TriggerConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Combined configuration for alignment and start triggers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    /// Terrain search parameters.
    pub snap: SnapConfig,
    /// Start trigger parameters.
    pub trigger: TriggerConfig,
}

impl ToolConfig {
    /// Parse and validate a JSON string.
    ///
    /// # Errors
    /// Returns [`ConfigError::Json`] for malformed JSON and
    /// [`ConfigError::Invalid`] when a value violates a precondition.
    pub fn from_json(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON file.
    ///
    /// # Errors
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise as
    /// [`ToolConfig::from_json`].
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Write the configuration as pretty JSON.
    ///
    /// # Errors
    /// Returns [`ConfigError::Io`] if the file cannot be written.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Validate both sections.
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] with the first violated precondition.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.snap.validate()?;
        self.trigger.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snap::TieBreak;

    #[test]
    fn empty_object_is_default() {
        let config = ToolConfig::from_json("{}").unwrap();
        assert_eq!(config, ToolConfig::default());
    }

    #[test]
    fn overrides_are_applied() {
        let config = ToolConfig::from_json(
            r#"{ "snap": { "max_vertical_distance": 25, "tie_break": "smallest-vertical-offset" },
                 "trigger": { "max_delay": 1.5, "trigger_name": "Wake" } }"#,
        )
        .unwrap();
        assert_eq!(config.snap.max_vertical_distance, 25.0);
        assert_eq!(config.snap.tie_break, TieBreak::SmallestVerticalOffset);
        assert_eq!(config.trigger.max_delay, 1.5);
        assert_eq!(config.trigger.min_delay, 0.0);
        assert_eq!(config.trigger.trigger_name, "Wake");
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = ToolConfig::from_json(r#"{ "snap": { "max_vertical_distance": -3 } }"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = ToolConfig::from_json("{ nope").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn missing_file_is_read_error() {
        let err = ToolConfig::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn save_then_load() {
        let path = std::env::temp_dir().join(format!("terrain-snap-config-{}.json", std::process::id()));
        let mut config = ToolConfig::default();
        config.snap.max_vertical_distance = 12.5;
        config.save(&path).unwrap();

        let loaded = ToolConfig::load(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(loaded, config);
    }
}
