//! Tracker configuration
//!
//! Every field has a default matching the stock page behavior, so an empty
//! JSON object is a valid configuration.

use crate::processing::geometry::{threshold_steps, RootMargin};
use crate::theme::ThemePreference;
use crate::tracker::channel::{TrackerError, TrackerResult};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Scroll progress sampling settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScrollConfig {
    /// Multiplier turning px/ms into the normalized velocity
    pub velocity_scale: f64,
    /// Register the scroll listener as passive
    pub passive: bool,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            velocity_scale: 10.0,
            passive: true,
        }
    }
}

/// Section observation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SectionConfig {
    /// A section must exceed this ratio to become active
    pub active_threshold: f64,
    pub root_margin: RootMargin,
    /// Number of equal threshold steps between 0 and 1
    pub threshold_steps: usize,
}

impl Default for SectionConfig {
    fn default() -> Self {
        Self {
            active_threshold: 0.2,
            root_margin: RootMargin::default(),
            threshold_steps: 10,
        }
    }
}

impl SectionConfig {
    pub fn thresholds(&self) -> Vec<f64> {
        threshold_steps(self.threshold_steps)
    }
}

/// Pointer follower settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PointerConfig {
    /// Fraction of the remaining distance covered each frame
    pub blend: f64,
    /// Viewports narrower than this are treated as touch devices
    pub breakpoint_px: f64,
}

impl Default for PointerConfig {
    fn default() -> Self {
        Self {
            blend: 0.15,
            breakpoint_px: 768.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ThemeConfig {
    /// Preference used when nothing has been stored yet
    pub default_preference: ThemePreference,
    /// Storage key for the persisted preference
    pub storage_key: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            default_preference: ThemePreference::System,
            storage_key: "theme".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChromeConfig {
    pub scroll: ScrollConfig,
    pub sections: SectionConfig,
    pub pointer: PointerConfig,
    pub theme: ThemeConfig,
}

impl ChromeConfig {
    /// Parse and validate a JSON configuration
    pub fn from_json_str(json: &str) -> TrackerResult<Self> {
        let config: ChromeConfig = serde_json::from_str(json)
            .map_err(|e| TrackerError::ConfigurationError(format!("invalid config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON configuration file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::from_json_str(&content)
            .with_context(|| format!("Failed to load config from {}", path.display()))?;
        tracing::info!("Loaded chrome config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> TrackerResult<()> {
        let fail = |msg: &str| Err(TrackerError::ConfigurationError(msg.to_string()));

        if !(self.scroll.velocity_scale.is_finite() && self.scroll.velocity_scale > 0.0) {
            return fail("scroll.velocityScale must be a positive number");
        }
        if !(0.0..1.0).contains(&self.sections.active_threshold) {
            return fail("sections.activeThreshold must be in [0, 1)");
        }
        if self.sections.threshold_steps == 0 {
            return fail("sections.thresholdSteps must be at least 1");
        }
        if !(self.pointer.blend > 0.0 && self.pointer.blend <= 1.0) {
            return fail("pointer.blend must be in (0, 1]");
        }
        if self.pointer.breakpoint_px.is_nan() || self.pointer.breakpoint_px < 0.0 {
            return fail("pointer.breakpointPx must not be negative");
        }
        if self.theme.storage_key.is_empty() {
            return fail("theme.storageKey must not be empty");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_object_uses_defaults() {
        let config = ChromeConfig::from_json_str("{}").unwrap();
        assert_eq!(config, ChromeConfig::default());
        assert_eq!(config.pointer.blend, 0.15);
        assert_eq!(config.pointer.breakpoint_px, 768.0);
        assert_eq!(config.sections.active_threshold, 0.2);
        assert_eq!(config.sections.thresholds().len(), 11);
    }

    #[test]
    fn test_partial_override() {
        let config =
            ChromeConfig::from_json_str(r#"{"pointer":{"blend":0.3},"scroll":{"passive":false}}"#)
                .unwrap();
        assert_eq!(config.pointer.blend, 0.3);
        assert_eq!(config.pointer.breakpoint_px, 768.0);
        assert!(!config.scroll.passive);
        assert_eq!(config.scroll.velocity_scale, 10.0);
    }

    #[test]
    fn test_rejects_invalid_blend() {
        let err = ChromeConfig::from_json_str(r#"{"pointer":{"blend":1.5}}"#).unwrap_err();
        assert!(matches!(err, TrackerError::ConfigurationError(_)));
    }

    #[test]
    fn test_rejects_negative_or_nan_breakpoint() {
        let mut config = ChromeConfig::default();
        config.pointer.breakpoint_px = -1.0;
        assert!(matches!(config.validate(), Err(TrackerError::ConfigurationError(_))));

        config.pointer.breakpoint_px = f64::NAN;
        assert!(matches!(config.validate(), Err(TrackerError::ConfigurationError(_))));

        config.pointer.breakpoint_px = 0.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_malformed_json() {
        let err = ChromeConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, TrackerError::ConfigurationError(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"sections":{{"activeThreshold":0.4}}}}"#).unwrap();

        let config = ChromeConfig::load(file.path()).unwrap();
        assert_eq!(config.sections.active_threshold, 0.4);
    }

    #[test]
    fn test_load_missing_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.json");
        let err = ChromeConfig::load(&path).unwrap_err();
        assert!(
            format!("{:#}", err).contains("missing.json"),
            "error should mention the path: {:#}",
            err
        );
    }
}
