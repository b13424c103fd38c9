//! Loading [`Settings`] from TOML or JSON and from `DYNFORM_*` variables.
//!
//! A configuration document only needs the keys it changes: it is converted
//! to JSON and deep-merged over the serialized defaults before being
//! deserialized. Environment variables are applied on top of whatever the
//! file produced.
//!
//! | Variable | Setting |
//! |---|---|
//! | `DYNFORM_DEBUG` | `debug` |
//! | `DYNFORM_LOG_LEVEL` | `log_level` |
//! | `DYNFORM_DATE_FORMAT` | `date_format` |
//! | `DYNFORM_READONLY` | `readonly` |
//! | `DYNFORM_MAX_UPLOAD_SIZE` | `max_upload_size` |
//!
//! ```rust,no_run
//! use dynform_core::settings_loader;
//!
//! let settings = settings_loader::from_file_with_env("dynform.toml").unwrap();
//! assert!(!settings.date_format.is_empty());
//! ```

use std::fmt;
use std::path::Path;

use serde_json::{Map, Value};

use crate::error::FormError;
use crate::settings::Settings;

/// The document formats a settings file may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Json,
}

impl ConfigFormat {
    /// Picks the format from a file extension: `.json` (any case) is JSON,
    /// anything else is TOML.
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Toml,
        }
    }

    /// Parses `source` into a JSON tree.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::Configuration`] on a syntax error.
    pub fn parse(self, source: &str) -> Result<Value, FormError> {
        match self {
            Self::Toml => source
                .parse::<toml::Table>()
                .map(|table| toml_to_json(toml::Value::Table(table)))
                .map_err(|e| FormError::Configuration(format!("invalid {self} settings: {e}"))),
            Self::Json => serde_json::from_str(source)
                .map_err(|e| FormError::Configuration(format!("invalid {self} settings: {e}"))),
        }
    }

    /// Parses `source` and overlays it on the default settings.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::Configuration`] on a syntax error or when a key
    /// has the wrong type.
    pub fn load_str(self, source: &str) -> Result<Settings, FormError> {
        let overlay = self.parse(source)?;
        let defaults = serde_json::to_value(Settings::default())?;
        serde_json::from_value(overlay_json(defaults, overlay))
            .map_err(|e| FormError::Configuration(format!("bad {self} settings: {e}")))
    }
}

impl fmt::Display for ConfigFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Toml => "TOML",
            Self::Json => "JSON",
        })
    }
}

/// Settings from a TOML document; missing keys keep their defaults.
///
/// # Errors
///
/// See [`ConfigFormat::load_str`].
pub fn from_toml_str(source: &str) -> Result<Settings, FormError> {
    ConfigFormat::Toml.load_str(source)
}

/// Settings from a JSON document; missing keys keep their defaults.
///
/// # Errors
///
/// See [`ConfigFormat::load_str`].
pub fn from_json_str(source: &str) -> Result<Settings, FormError> {
    ConfigFormat::Json.load_str(source)
}

/// Settings from a file, format chosen by [`ConfigFormat::for_path`].
///
/// # Errors
///
/// Returns [`FormError::Configuration`] if the file cannot be read or parsed.
pub fn from_file(path: impl AsRef<Path>) -> Result<Settings, FormError> {
    let path = path.as_ref();
    let format = ConfigFormat::for_path(path);
    let source = std::fs::read_to_string(path).map_err(|e| {
        FormError::Configuration(format!("cannot read settings '{}': {e}", path.display()))
    })?;
    tracing::debug!(path = %path.display(), %format, "loading settings");
    format.load_str(&source)
}

/// [`from_file`] followed by [`apply_env_overrides`].
///
/// # Errors
///
/// See [`from_file`].
pub fn from_file_with_env(path: impl AsRef<Path>) -> Result<Settings, FormError> {
    let mut settings = from_file(path)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// The defaults with `DYNFORM_*` overrides applied.
pub fn from_env() -> Settings {
    let mut settings = Settings::default();
    apply_env_overrides(&mut settings);
    settings
}

/// Overwrites settings from any `DYNFORM_*` variables that are set.
///
/// Flags accept `true`, `1` or `yes` in any case; every other value means
/// off. An unparsable `DYNFORM_MAX_UPLOAD_SIZE` is ignored.
pub fn apply_env_overrides(settings: &mut Settings) {
    let var = |name: &str| std::env::var(format!("DYNFORM_{name}")).ok();

    if let Some(v) = var("DEBUG") {
        settings.debug = is_truthy(&v);
    }
    if let Some(v) = var("LOG_LEVEL") {
        settings.log_level = v;
    }
    if let Some(v) = var("DATE_FORMAT") {
        settings.date_format = v;
    }
    if let Some(v) = var("READONLY") {
        settings.readonly = is_truthy(&v);
    }
    match var("MAX_UPLOAD_SIZE").map(|v| v.trim().parse::<usize>()) {
        Some(Ok(size)) => settings.max_upload_size = size,
        Some(Err(e)) => tracing::warn!(error = %e, "ignoring DYNFORM_MAX_UPLOAD_SIZE"),
        None => {}
    }
}

fn is_truthy(val: &str) -> bool {
    ["true", "1", "yes"]
        .iter()
        .any(|t| val.trim().eq_ignore_ascii_case(t))
}

fn toml_to_json(value: toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::from(i),
        toml::Value::Float(f) => Value::from(f),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => items.into_iter().map(toml_to_json).collect(),
        toml::Value::Table(table) => Value::Object(
            table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect::<Map<_, _>>(),
        ),
    }
}

/// Writes `overlay` onto `base`. Objects merge key by key; any other value
/// (arrays included) replaces what was there.
fn overlay_json(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut target), Value::Object(source)) => {
            for (key, value) in source {
                let merged = match target.remove(&key) {
                    Some(existing) => overlay_json(existing, value),
                    None => value,
                };
                target.insert(key, merged);
            }
            Value::Object(target)
        }
        (_, overlay) => overlay,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    fn settings_file(suffix: &str, body: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(body.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let settings = from_toml_str("log_level = \"warn\"\ndate_format = \"%d/%m/%Y\"").unwrap();
        assert_eq!(settings.log_level, "warn");
        assert_eq!(settings.date_format, "%d/%m/%Y");
        assert!(!settings.readonly);
        assert!(settings.debug);
    }

    #[test]
    fn test_toml_error_message_table() {
        let settings = from_toml_str(
            "[error_messages]\nrequired = \"Please fill this in\"\nemail = \"Not an email\"",
        )
        .unwrap();
        assert_eq!(settings.error_messages.len(), 2);
        assert_eq!(settings.error_message("required"), Some("Please fill this in"));
    }

    #[test]
    fn test_empty_documents_are_defaults() {
        assert_eq!(from_toml_str("").unwrap().date_format, "%Y-%m-%d");
        assert!(from_json_str("{}").unwrap().debug);
    }

    #[test]
    fn test_syntax_and_type_errors() {
        assert!(matches!(
            from_toml_str("[[broken"),
            Err(FormError::Configuration(_))
        ));
        assert!(matches!(
            from_toml_str("max_upload_size = \"lots\""),
            Err(FormError::Configuration(_))
        ));
        assert!(from_json_str("{not json").is_err());
    }

    #[test]
    fn test_json_overlay() {
        let settings = from_json_str(r#"{"readonly": true, "max_upload_size": 1024}"#).unwrap();
        assert!(settings.readonly);
        assert_eq!(settings.max_upload_size, 1024);
        assert_eq!(settings.log_level, "info");
    }

    #[test]
    fn test_format_for_path() {
        assert_eq!(ConfigFormat::for_path(Path::new("a.JSON")), ConfigFormat::Json);
        assert_eq!(ConfigFormat::for_path(Path::new("a.toml")), ConfigFormat::Toml);
        assert_eq!(ConfigFormat::for_path(Path::new("dynform")), ConfigFormat::Toml);
    }

    #[test]
    fn test_from_file_by_extension() {
        let toml = settings_file(".toml", "log_level = \"debug\"");
        assert_eq!(from_file(toml.path()).unwrap().log_level, "debug");

        let json = settings_file(".json", r#"{"date_format": "%m/%d/%Y"}"#);
        assert_eq!(from_file(json.path()).unwrap().date_format, "%m/%d/%Y");
    }

    #[test]
    fn test_from_file_missing() {
        assert!(matches!(
            from_file("/nonexistent/dynform.toml"),
            Err(FormError::Configuration(_))
        ));
    }

    // Each env test owns one variable so parallel tests do not interfere.

    #[test]
    fn test_env_log_level() {
        std::env::set_var("DYNFORM_LOG_LEVEL", "trace");
        assert_eq!(from_env().log_level, "trace");
        std::env::remove_var("DYNFORM_LOG_LEVEL");
    }

    #[test]
    fn test_env_readonly() {
        let mut settings = Settings::default();
        std::env::set_var("DYNFORM_READONLY", "YES");
        apply_env_overrides(&mut settings);
        assert!(settings.readonly);
        std::env::remove_var("DYNFORM_READONLY");
    }

    #[test]
    fn test_env_bad_upload_size_ignored() {
        let mut settings = Settings::default();
        std::env::set_var("DYNFORM_MAX_UPLOAD_SIZE", "huge");
        apply_env_overrides(&mut settings);
        assert_eq!(settings.max_upload_size, crate::settings::DEFAULT_MAX_UPLOAD_SIZE);
        std::env::remove_var("DYNFORM_MAX_UPLOAD_SIZE");
    }

    #[test]
    fn test_env_wins_over_file() {
        let file = settings_file(".toml", "date_format = \"%Y-%m-%d\"");
        std::env::set_var("DYNFORM_DATE_FORMAT", "%d.%m.%Y");
        let settings = from_file_with_env(file.path()).unwrap();
        std::env::remove_var("DYNFORM_DATE_FORMAT");
        assert_eq!(settings.date_format, "%d.%m.%Y");
    }

    #[test]
    fn test_is_truthy() {
        assert!(is_truthy("true"));
        assert!(is_truthy("1"));
        assert!(is_truthy(" Yes "));
        assert!(!is_truthy("off"));
        assert!(!is_truthy(""));
    }

    #[test]
    fn test_overlay_merges_objects_replaces_arrays() {
        let merged = overlay_json(
            json!({"outer": {"a": 1, "b": 2}, "list": [1, 2, 3]}),
            json!({"outer": {"b": 3}, "list": [4]}),
        );
        assert_eq!(merged, json!({"outer": {"a": 1, "b": 3}, "list": [4]}));
    }

    #[test]
    fn test_toml_to_json_nested() {
        let json = ConfigFormat::Toml
            .parse("name = \"x\"\ncount = 42\nitems = [1, 2]\n[nested]\nkey = \"v\"")
            .unwrap();
        assert_eq!(json, json!({"name": "x", "count": 42, "items": [1, 2], "nested": {"key": "v"}}));
    }
}
