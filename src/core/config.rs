use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::errors::{FormError, Result};

pub const DEFAULT_QUIT_CONFIRMATION: &str =
    "There are unsaved changes. Do you really want to leave this page ?";

/// Top-level configuration for the form coordination layer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditFormConfig {
    pub guard: GuardConfig,
    pub coordinator: CoordinatorConfig,
    pub logging: LoggingConfig,
}

/// Unsaved-changes policy applied by every guard unless a form overrides it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardConfig {
    /// Save silently instead of prompting when the form loses focus
    pub save_on_lost_focus: bool,
    /// Text of the leave-anyway prompt and of the unload warning
    pub quit_confirmation_message: String,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            save_on_lost_focus: false,
            quit_confirmation_message: DEFAULT_QUIT_CONFIRMATION.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinatorConfig {
    /// Log a warning when several forms are visible at once
    pub warn_on_multiple_active: bool,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            warn_on_multiple_active: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// One of trace, debug, info, warn, error
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl EditFormConfig {
    /// Parse a YAML document. Missing sections take their defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| FormError::io(format!("read {}", path.display()), e))?;
        Self::from_yaml_str(&contents)
    }

    pub fn validate(&self) -> Result<()> {
        if self.guard.quit_confirmation_message.trim().is_empty() {
            return Err(FormError::configuration_field(
                "quit confirmation message must not be empty",
                "guard.quit_confirmation_message",
            ));
        }
        self.logging.level.parse::<tracing::Level>().map_err(|_| {
            FormError::configuration_field(
                format!("unknown log level '{}'", self.logging.level),
                "logging.level",
            )
        })?;
        Ok(())
    }

    pub fn builder() -> EditFormConfigBuilder {
        EditFormConfigBuilder::new()
    }
}

/// Builder for EditFormConfig
pub struct EditFormConfigBuilder {
    config: EditFormConfig,
}

impl EditFormConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: EditFormConfig::default(),
        }
    }

    pub fn save_on_lost_focus(mut self, enabled: bool) -> Self {
        self.config.guard.save_on_lost_focus = enabled;
        self
    }

    pub fn quit_confirmation_message(mut self, message: impl Into<String>) -> Self {
        self.config.guard.quit_confirmation_message = message.into();
        self
    }

    pub fn warn_on_multiple_active(mut self, enabled: bool) -> Self {
        self.config.coordinator.warn_on_multiple_active = enabled;
        self
    }

    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<EditFormConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for EditFormConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EditFormConfig::default();
        assert!(config.validate().is_ok());
        assert!(!config.guard.save_on_lost_focus);
        assert!(config.coordinator.warn_on_multiple_active);
    }

    #[test]
    fn test_partial_yaml() {
        let config = EditFormConfig::from_yaml_str(
            "guard:\n  save_on_lost_focus: true\nlogging:\n  level: debug\n",
        )
        .unwrap();
        assert!(config.guard.save_on_lost_focus);
        assert_eq!(config.guard.quit_confirmation_message, DEFAULT_QUIT_CONFIRMATION);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_validation_errors() {
        let err = EditFormConfig::builder()
            .quit_confirmation_message("  ")
            .build()
            .unwrap_err();
        assert_eq!(err.category(), "configuration");

        let err = EditFormConfig::builder().log_level("loud").build().unwrap_err();
        assert!(matches!(err, FormError::Configuration { field: Some(ref f), .. } if f == "logging.level"));
    }

    #[test]
    fn test_bad_yaml() {
        let err = EditFormConfig::from_yaml_str("guard: [1, 2").unwrap_err();
        assert_eq!(err.category(), "serialization");
    }

    #[test]
    fn test_missing_file() {
        let err = EditFormConfig::from_yaml_file("/nonexistent/editform.yaml").unwrap_err();
        assert_eq!(err.category(), "io");
    }

    #[test]
    fn test_builder() {
        let config = EditFormConfig::builder()
            .save_on_lost_focus(true)
            .warn_on_multiple_active(false)
            .quit_confirmation_message("Leave?")
            .build()
            .unwrap();
        assert!(config.guard.save_on_lost_focus);
        assert!(!config.coordinator.warn_on_multiple_active);
        assert_eq!(config.guard.quit_confirmation_message, "Leave?");
    }
}
