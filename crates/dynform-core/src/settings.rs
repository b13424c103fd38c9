//! Settings for the dynform engine.
//!
//! This module provides the [`Settings`] struct, which holds engine-wide
//! configuration with sensible defaults. Settings are plain values: the
//! engine receives them explicitly rather than reading a global.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Default maximum size for files read into a control (5 MiB).
pub const DEFAULT_MAX_UPLOAD_SIZE: usize = 5 * 1024 * 1024;

/// The complete set of engine settings.
///
/// # Examples
///
/// ```
/// use dynform_core::settings::Settings;
///
/// let settings = Settings::default();
/// assert!(settings.debug);
/// assert_eq!(settings.date_format, "%Y-%m-%d");
/// assert!(!settings.readonly);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    // ── Core ─────────────────────────────────────────────────────────

    /// Whether debug mode is enabled (pretty logs instead of JSON).
    pub debug: bool,

    // ── Logging ──────────────────────────────────────────────────────

    /// The log level (e.g. "info", "debug", "warn").
    pub log_level: String,

    // ── Forms ────────────────────────────────────────────────────────

    /// `chrono` format used to parse date strings in schemas and input data.
    pub date_format: String,
    /// Whether forms are built read-only unless told otherwise.
    pub readonly: bool,
    /// Default user-facing messages keyed by validator code.
    ///
    /// These override the built-in defaults but are themselves overridden
    /// by a field's own `errorMessage` map.
    pub error_messages: HashMap<String, String>,

    // ── Uploads ──────────────────────────────────────────────────────

    /// Maximum size in bytes of a file read into a control.
    pub max_upload_size: usize,

    // ── Escape hatch ─────────────────────────────────────────────────

    /// Custom settings that don't fit into the above categories.
    pub extra: HashMap<String, serde_json::Value>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            // Core
            debug: true,

            // Logging
            log_level: "info".to_string(),

            // Forms
            date_format: "%Y-%m-%d".to_string(),
            readonly: false,
            error_messages: HashMap::new(),

            // Uploads
            max_upload_size: DEFAULT_MAX_UPLOAD_SIZE,

            // Extra
            extra: HashMap::new(),
        }
    }
}

impl Settings {
    /// Returns the configured default message for a validator code, if any.
    pub fn error_message(&self, code: &str) -> Option<&str> {
        self.error_messages.get(code).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let s = Settings::default();
        assert!(s.debug);
        assert_eq!(s.log_level, "info");
        assert_eq!(s.max_upload_size, DEFAULT_MAX_UPLOAD_SIZE);
        assert!(s.error_messages.is_empty());
        assert!(s.extra.is_empty());
    }

    #[test]
    fn test_error_message_lookup() {
        let mut s = Settings::default();
        s.error_messages
            .insert("required".to_string(), "Please fill this in".to_string());
        assert_eq!(s.error_message("required"), Some("Please fill this in"));
        assert_eq!(s.error_message("email"), None);
    }

    #[test]
    fn test_settings_serialize_roundtrip() {
        let s = Settings::default();
        let json = serde_json::to_string(&s).unwrap();
        let back: Settings = serde_json::from_str(&json).unwrap();
        assert_eq!(back.date_format, s.date_format);
        assert_eq!(back.max_upload_size, s.max_upload_size);
    }
}
