use thiserror::Error;

use crate::coord::types::{ActionKind, FormId};

/// Unified error type for the editform library
#[derive(Debug, Error)]
pub enum FormError {
    /// No active form, or the active form has no callback for the action
    #[error("No registered '{action}' action on {}", form_label(.form))]
    UnregisteredFormAction {
        action: ActionKind,
        form: Option<FormId>,
    },

    /// More than one registered form is visible at the same time
    #[error("{visible} forms are visible at once, only {chosen} is managed")]
    MultipleActiveForms { visible: usize, chosen: FormId },

    /// Action name outside of the edit/cancel/save/delete vocabulary
    #[error("Unknown form action: {name}")]
    UnknownAction { name: String },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        field: Option<String>,
    },

    /// IO errors while reading configuration
    #[error("IO operation failed: {operation}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    /// Serialization errors
    #[error("Serialization failed: {format}")]
    Serialization {
        format: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Index rebuild request failed
    #[error("Index rebuild failed: {message}")]
    IndexRebuild { message: String },
}

impl FormError {
    /// Create an unregistered-action error
    pub fn unregistered(action: ActionKind, form: Option<FormId>) -> Self {
        Self::UnregisteredFormAction { action, form }
    }

    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
            field: None,
        }
    }

    /// Create a configuration error pointing at a field
    pub fn configuration_field<S: Into<String>, F: Into<String>>(message: S, field: F) -> Self {
        Self::Configuration {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create an IO error
    pub fn io<S: Into<String>>(operation: S, source: std::io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            source,
        }
    }

    /// Create a serialization error
    pub fn serialization<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
        format: S,
        source: E,
    ) -> Self {
        Self::Serialization {
            format: format.into(),
            source: Box::new(source),
        }
    }

    /// Check if error is recoverable
    ///
    /// Actions are user-triggered; a missing action is recovered from by the
    /// user picking another form or action, never by retrying here.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::UnregisteredFormAction { .. } | Self::MultipleActiveForms { .. } => true,
            Self::IndexRebuild { .. } | Self::Io { .. } => true,
            Self::UnknownAction { .. } | Self::Configuration { .. } => false,
            Self::Serialization { .. } => false,
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            Self::UnregisteredFormAction { .. } => "action",
            Self::MultipleActiveForms { .. } => "anomaly",
            Self::UnknownAction { .. } => "vocabulary",
            Self::Configuration { .. } => "configuration",
            Self::Io { .. } => "io",
            Self::Serialization { .. } => "serialization",
            Self::IndexRebuild { .. } => "index",
        }
    }
}

fn form_label(form: &Option<FormId>) -> String {
    match form {
        Some(form) => format!("form {form}"),
        None => "any active form".to_string(),
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, FormError>;

impl From<std::io::Error> for FormError {
    fn from(err: std::io::Error) -> Self {
        Self::io("io_operation", err)
    }
}

impl From<serde_yaml::Error> for FormError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::serialization("yaml", err)
    }
}

impl From<serde_json::Error> for FormError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization("json", err)
    }
}

impl From<anyhow::Error> for FormError {
    fn from(err: anyhow::Error) -> Self {
        Self::IndexRebuild {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unregistered_without_form() {
        let err = FormError::unregistered(ActionKind::Save, None);
        assert_eq!(err.to_string(), "No registered 'save' action on any active form");
        assert_eq!(err.category(), "action");
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_unregistered_with_form() {
        let form = FormId::new();
        let err = FormError::unregistered(ActionKind::Delete, Some(form));
        assert_eq!(
            err.to_string(),
            format!("No registered 'delete' action on form {form}")
        );
    }

    #[test]
    fn test_error_recoverability() {
        assert!(!FormError::configuration("bad").is_recoverable());
        assert!(!FormError::UnknownAction { name: "print".into() }.is_recoverable());
        assert!(FormError::from(anyhow::anyhow!("503")).is_recoverable());
    }

    #[test]
    fn test_configuration_field() {
        let err = FormError::configuration_field("must not be empty", "guard.quit_confirmation_message");
        match err {
            FormError::Configuration { field, .. } => {
                assert_eq!(field.as_deref(), Some("guard.quit_confirmation_message"));
            }
            other => panic!("Expected configuration error, got {other:?}"),
        }
    }
}
