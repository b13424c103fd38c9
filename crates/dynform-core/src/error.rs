//! Core error types for the dynform engine.
//!
//! This module provides [`ValidationError`], a single failed validation rule
//! attached to a form control, and [`FormError`], the error enum returned by
//! the engine's programmatic API, settings loading, and file handling.
//!
//! Validation failures are never raised by the engine itself; they are stored
//! on the failing control. `FormError::Validation` exists for callers that
//! want to turn a failed rule into a hard error.

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

/// A single failed validation rule.
///
/// The `code` identifies the rule that failed and is the key callers use to
/// look up user-facing messages (`required`, `minlength`, `maxlength`, `min`,
/// `max`, `pattern`, `email`). `params` carries the values needed to explain
/// the failure, such as the required length and the actual length.
///
/// # Examples
///
/// ```
/// use dynform_core::error::ValidationError;
///
/// let err = ValidationError::new("This field is required.", "required");
/// assert_eq!(err.code, "required");
///
/// let err = ValidationError::new("Too long.", "maxlength")
///     .with_param("requiredLength", "10")
///     .with_param("actualLength", "19");
/// assert_eq!(err.params["actualLength"], "19");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// The default message for this failure.
    pub message: String,
    /// The code of the rule that failed.
    pub code: String,
    /// Additional parameters describing the failure.
    pub params: BTreeMap<String, String>,
}

impl ValidationError {
    /// Creates a new `ValidationError` with a message and code.
    pub fn new(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: code.into(),
            params: BTreeMap::new(),
        }
    }

    /// Adds a parameter to this validation error.
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ValidationError {}

/// The primary error type for the dynform engine.
#[derive(Error, Debug)]
pub enum FormError {
    // ── Schema ───────────────────────────────────────────────────────

    /// The form schema could not be parsed or is structurally unusable.
    #[error("Schema error: {0}")]
    Schema(String),

    /// An operation named a field that does not exist in the form.
    #[error("Unknown field: {0}")]
    UnknownField(String),

    // ── Validation ───────────────────────────────────────────────────

    /// A validation rule failed.
    #[error("Validation error: {0}")]
    Validation(ValidationError),

    // ── Configuration ────────────────────────────────────────────────

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Configuration(String),

    // ── Serialization ────────────────────────────────────────────────

    /// An error occurred during serialization or deserialization.
    #[error("Serialization error: {0}")]
    Serialization(String),

    // ── IO ───────────────────────────────────────────────────────────

    /// An I/O error occurred.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A file could not be prepared for upload.
    #[error("Upload error: {0}")]
    Upload(String),
}

impl FormError {
    /// Returns `true` if this error was caused by the caller's input
    /// (schema, field name, or validation) rather than the environment.
    pub const fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Self::Schema(_) | Self::UnknownField(_) | Self::Validation(_)
        )
    }
}

impl From<ValidationError> for FormError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err)
    }
}

impl From<serde_json::Error> for FormError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// A convenience result type for engine operations.
pub type FormResult<T> = Result<T, FormError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::new("This field is required.", "required");
        assert_eq!(err.to_string(), "This field is required.");
    }

    #[test]
    fn test_validation_error_with_param() {
        let err = ValidationError::new("Too short.", "minlength").with_param("requiredLength", "8");
        assert_eq!(err.params.get("requiredLength").unwrap(), "8");
    }

    #[test]
    fn test_form_error_display() {
        let err = FormError::UnknownField("email".into());
        assert_eq!(err.to_string(), "Unknown field: email");
    }

    #[test]
    fn test_caller_errors() {
        assert!(FormError::Schema("x".into()).is_caller_error());
        assert!(FormError::UnknownField("x".into()).is_caller_error());
        assert!(FormError::from(ValidationError::new("x", "required")).is_caller_error());
        assert!(!FormError::Upload("x".into()).is_caller_error());
        assert!(!FormError::Configuration("x".into()).is_caller_error());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: FormError = io_err.into();
        assert!(!err.is_caller_error());
        assert!(err.to_string().contains("file missing"));
    }

    #[test]
    fn test_serde_error_conversion() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: FormError = parse_err.into();
        assert!(matches!(err, FormError::Serialization(_)));
    }
}
