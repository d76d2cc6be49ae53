//! Rotator configuration.
//!
//! Every field has a default, so an empty object (or no object at all) is a
//! valid configuration. Field names are camelCase on the wire so the config
//! can be passed straight from JavaScript.

use log::LevelFilter;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How successive adjustments combine into the stored pending angle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnglePolicy {
    /// Keep the raw sum of every delta (90, 180, 270, 360, 450, ...).
    #[default]
    Accumulate,
    /// Reduce the sum into `0..360`.
    Wrap,
}

impl AnglePolicy {
    /// Combine the previous angle with a delta.
    ///
    /// Accumulation saturates at the `i32` bounds.
    pub fn apply(self, previous: i32, delta: i32) -> i32 {
        match self {
            AnglePolicy::Accumulate => previous.saturating_add(delta),
            AnglePolicy::Wrap => (i64::from(previous) + i64::from(delta)).rem_euclid(360) as i32,
        }
    }
}

/// Element ids of the rotation controls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ControlIds {
    pub clockwise: String,
    pub anticlockwise: String,
    pub save: String,
    pub cancel: String,
}

impl Default for ControlIds {
    fn default() -> Self {
        Self {
            clockwise: "rotate-clockwise".to_string(),
            anticlockwise: "rotate-anticlockwise".to_string(),
            save: "save-btn".to_string(),
            cancel: "cancel-btn".to_string(),
        }
    }
}

/// Configuration for a rotator instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RotatorConfig {
    /// Backend rotation endpoint (POST, form fields `filename` and `degrees`)
    pub endpoint: String,
    /// Class identifying thumbnail `<img>` elements
    pub thumbnail_class: String,
    /// Class added to selected thumbnails
    pub selected_class: String,
    /// Attribute carrying the server filename
    pub filename_attribute: String,
    /// Control element ids
    pub controls: ControlIds,
    /// Degrees applied by one clockwise click (anticlockwise uses the negation)
    pub step_degrees: i32,
    /// Accumulate or wrap pending angles
    pub angle_policy: AnglePolicy,
    /// CSS outline applied to selected thumbnails
    pub outline: String,
    /// CSS transition used for the rotation preview
    pub transition: String,
    /// Query parameter used to invalidate a cached thumbnail after a commit
    pub cache_bust_param: String,
    /// Maximum log level forwarded to the console
    pub log_level: LevelFilter,
}

impl Default for RotatorConfig {
    fn default() -> Self {
        Self {
            endpoint: "/image/rotate".to_string(),
            thumbnail_class: "allocation-thumbnail".to_string(),
            selected_class: "selected-for-rotation".to_string(),
            filename_attribute: "data-image-filename".to_string(),
            controls: ControlIds::default(),
            step_degrees: 90,
            angle_policy: AnglePolicy::default(),
            outline: "6px solid #007fad".to_string(),
            transition: "transform 0.5s ease".to_string(),
            cache_bust_param: "v".to_string(),
            log_level: LevelFilter::Info,
        }
    }
}

impl RotatorConfig {
    /// Check the values the engine relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.endpoint.trim().is_empty() {
            return Err(ConfigError::EmptyEndpoint);
        }
        if self.thumbnail_class.trim().is_empty() {
            return Err(ConfigError::EmptyThumbnailClass);
        }
        if self.step_degrees == 0 || self.step_degrees % 90 != 0 {
            return Err(ConfigError::InvalidStep(self.step_degrees));
        }
        Ok(())
    }
}

/// Error types for configuration validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// No endpoint to send rotation requests to.
    #[error("Rotation endpoint must not be empty")]
    EmptyEndpoint,

    /// No class to find thumbnails by.
    #[error("Thumbnail class must not be empty")]
    EmptyThumbnailClass,

    /// Step is zero or not a quarter turn multiple.
    #[error("Rotation step must be a non-zero multiple of 90 degrees, got {0}")]
    InvalidStep(i32),
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(RotatorConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: RotatorConfig =
            serde_json::from_str(r#"{"endpoint": "/api/rotate", "anglePolicy": "wrap"}"#).unwrap();
        assert_eq!(config.endpoint, "/api/rotate");
        assert_eq!(config.angle_policy, AnglePolicy::Wrap);
        assert_eq!(config.thumbnail_class, "allocation-thumbnail");
        assert_eq!(config.controls.save, "save-btn");
        assert_eq!(config.step_degrees, 90);
    }

    #[test]
    fn test_nested_controls_partial() {
        let config: RotatorConfig =
            serde_json::from_str(r#"{"controls": {"save": "rotate-save-btn"}}"#).unwrap();
        assert_eq!(config.controls.save, "rotate-save-btn");
        assert_eq!(config.controls.cancel, "cancel-btn");
    }

    #[test]
    fn test_log_level_from_string() {
        let config: RotatorConfig = serde_json::from_str(r#"{"logLevel": "debug"}"#).unwrap();
        assert_eq!(config.log_level, LevelFilter::Debug);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = RotatorConfig::default();
        config.endpoint = "  ".into();
        assert_eq!(config.validate(), Err(ConfigError::EmptyEndpoint));

        let mut config = RotatorConfig::default();
        config.thumbnail_class = String::new();
        assert_eq!(config.validate(), Err(ConfigError::EmptyThumbnailClass));

        let mut config = RotatorConfig::default();
        config.step_degrees = 45;
        assert_eq!(config.validate(), Err(ConfigError::InvalidStep(45)));

        config.step_degrees = 0;
        assert_eq!(config.validate(), Err(ConfigError::InvalidStep(0)));

        config.step_degrees = -180;
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_accumulate_does_not_wrap() {
        let policy = AnglePolicy::Accumulate;
        let angle = [90, 90, 90, 90, 90].iter().fold(0, |a, d| policy.apply(a, *d));
        assert_eq!(angle, 450);
        assert_eq!(policy.apply(0, -90), -90);
    }

    #[test]
    fn test_accumulate_saturates() {
        assert_eq!(AnglePolicy::Accumulate.apply(i32::MAX - 10, 90), i32::MAX);
    }

    #[test]
    fn test_wrap_examples() {
        let policy = AnglePolicy::Wrap;
        assert_eq!(policy.apply(270, 90), 0);
        assert_eq!(policy.apply(0, -90), 270);
        assert_eq!(policy.apply(90, 90), 180);
    }

    proptest! {
        /// Property: wrapped angles always land in 0..360.
        #[test]
        fn prop_wrap_in_range(prev in any::<i32>(), delta in -1080i32..=1080) {
            let angle = AnglePolicy::Wrap.apply(prev, delta);
            prop_assert!((0..360).contains(&angle));
        }

        /// Property: wrap agrees with accumulate modulo 360.
        #[test]
        fn prop_wrap_matches_accumulate_mod_360(
            deltas in proptest::collection::vec(prop_oneof![Just(90), Just(-90)], 0..50),
        ) {
            let acc = deltas.iter().fold(0, |a, d| AnglePolicy::Accumulate.apply(a, *d));
            let wrapped = deltas.iter().fold(0, |a, d| AnglePolicy::Wrap.apply(a, *d));
            prop_assert_eq!(acc.rem_euclid(360), wrapped);
        }
    }
}
