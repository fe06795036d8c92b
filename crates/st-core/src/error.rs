//! Core error types for SiteTrack
//!
//! Everything here is recoverable from the embedding form's point of view:
//! a failed save leaves the pending state in memory, an expired session
//! hands control to the expiry callback.

use std::collections::HashMap;
use thiserror::Error;

/// Core error type for cross-crate operations
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    /// A create/update request against the external API failed. The pending
    /// entity state (including registered attachments) stays in client
    /// memory so the user can retry the save without re-uploading.
    #[error("API request failed with status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Session expired")]
    SessionExpired,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Whether the user can retry the triggering action without losing state.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, CoreError::Internal(_) | CoreError::Config(_))
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            CoreError::Validation(_) => "validation_failed",
            CoreError::Api { .. } => "api_error",
            CoreError::SessionExpired => "session_expired",
            CoreError::Config(_) => "configuration_error",
            CoreError::Internal(_) => "internal_error",
        }
    }
}

/// Validation errors collection, keyed by field
#[derive(Error, Debug, Default, Clone)]
#[error("Validation errors: {errors:?}")]
pub struct ValidationErrors {
    /// Field-specific errors: field_name -> Vec<error_messages>
    pub errors: HashMap<String, Vec<String>>,
    /// Base errors not tied to a specific field
    pub base_errors: Vec<String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    pub fn add_base(&mut self, message: impl Into<String>) {
        self.base_errors.push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty() && self.base_errors.is_empty()
    }

    /// Check if there are errors for a specific field
    pub fn has_error(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    /// Get errors for a specific field
    pub fn get(&self, field: &str) -> Option<&Vec<String>> {
        self.errors.get(field)
    }

    pub fn merge(&mut self, other: ValidationErrors) {
        for (field, messages) in other.errors {
            self.errors.entry(field).or_default().extend(messages);
        }
        self.base_errors.extend(other.base_errors);
    }

    pub fn full_messages(&self) -> Vec<String> {
        let mut messages = self.base_errors.clone();
        for (field, field_messages) in &self.errors {
            for msg in field_messages {
                messages.push(format!("{} {}", field, msg));
            }
        }
        messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_accumulate() {
        let mut errors = ValidationErrors::new();
        assert!(errors.is_empty());

        errors.add("name", "must not be blank");
        errors.add("name", "is too long");
        errors.add_base("entity is read-only");

        assert!(!errors.is_empty());
        assert!(errors.has_error("name"));
        assert_eq!(errors.get("name").map(|v| v.len()), Some(2));
        assert_eq!(errors.full_messages().len(), 3);
    }

    #[test]
    fn test_validation_errors_merge() {
        let mut a = ValidationErrors::new();
        a.add("name", "must not be blank");

        let mut b = ValidationErrors::new();
        b.add("name", "is reserved");
        b.add("date", "is in the past");

        a.merge(b);
        assert_eq!(a.get("name").map(|v| v.len()), Some(2));
        assert!(a.has_error("date"));
    }

    #[test]
    fn test_recoverability() {
        let api = CoreError::Api {
            status: 500,
            message: "boom".into(),
        };
        assert!(api.is_recoverable());
        assert!(!CoreError::Internal("bug".into()).is_recoverable());
        assert_eq!(CoreError::SessionExpired.error_code(), "session_expired");
    }
}
