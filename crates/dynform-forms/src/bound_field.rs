//! Bound fields: a field definition paired with its live control state.
//!
//! A [`BoundField`] is a render-neutral snapshot of one field: presentation
//! hints from the schema, the control's value and flags, and the
//! user-facing error messages. Whatever draws the form iterates over these.

use dynform_core::{Settings, ValidationError};

use crate::control::FormControl;
use crate::schema::{FieldOption, FieldSchema, FieldType};

/// A field bound to its control.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundField {
    /// The field name.
    pub name: String,
    /// Human-readable label.
    pub label: String,
    /// Placeholder text.
    pub placeholder: String,
    /// Layout hint.
    pub position: String,
    /// Styling hint.
    pub class: String,
    /// The current field type (password fields may be showing as text).
    pub field_type: FieldType,
    /// Sorted options of select-like fields.
    pub options: Vec<FieldOption>,
    /// Whether the field is shown.
    pub visible: bool,
    /// Whether the control is disabled.
    pub disabled: bool,
    /// Whether a rule makes the field mandatory.
    pub required: bool,
    /// Whether the control has been visited.
    pub touched: bool,
    /// Whether to show the password visibility icon.
    pub show_password_icon: bool,
    /// The current value as JSON.
    pub value: serde_json::Value,
    /// User-facing error messages.
    pub errors: Vec<String>,
}

impl BoundField {
    /// Pairs a field with its control.
    pub fn new(field: &FieldSchema, control: &FormControl, settings: &Settings) -> Self {
        Self {
            name: field.name.clone(),
            label: field.label.clone(),
            placeholder: field.placeholder.clone(),
            position: field.position.clone(),
            class: field.class.clone(),
            field_type: field.field_type.clone(),
            options: field.options.clone(),
            visible: field.show_field,
            disabled: control.is_disabled(),
            required: control.is_required(),
            touched: control.is_touched(),
            show_password_icon: field.show_password_icon,
            value: control.value().to_json(),
            errors: control
                .errors()
                .iter()
                .map(|e| resolve_message(field, settings, e))
                .collect(),
        }
    }

    /// Returns `true` if this field has any errors.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Whether errors should be shown: the field has errors and was visited.
    pub fn show_errors(&self) -> bool {
        self.touched && self.has_errors()
    }
}

/// Picks the user-facing message for a failed rule.
///
/// The field's own `errorMessage` entry wins, then the configured default
/// for the code, then the rule's built-in message.
pub fn resolve_message(field: &FieldSchema, settings: &Settings, error: &ValidationError) -> String {
    field
        .error_message
        .get(&error.code)
        .map(String::as_str)
        .or_else(|| settings.error_message(&error.code))
        .unwrap_or(&error.message)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build_control;

    fn required_field() -> FieldSchema {
        FieldSchema::new("firstName", FieldType::Text).validator("required", true)
    }

    #[test]
    fn test_bound_field_snapshot() {
        let field = required_field().value("Asha");
        let settings = Settings::default();
        let control = build_control(&field, false, &settings);
        let bf = BoundField::new(&field, &control, &settings);
        assert_eq!(bf.name, "firstName");
        assert_eq!(bf.value, serde_json::json!("Asha"));
        assert!(bf.required);
        assert!(bf.visible);
        assert!(!bf.has_errors());
    }

    #[test]
    fn test_message_from_field_wins() {
        let field = required_field().error_message("required", "First name is required");
        let mut settings = Settings::default();
        settings
            .error_messages
            .insert("required".into(), "Required".into());
        let control = build_control(&field, false, &settings);
        let bf = BoundField::new(&field, &control, &settings);
        assert_eq!(bf.errors, vec!["First name is required".to_string()]);
    }

    #[test]
    fn test_message_from_settings_then_builtin() {
        let field = required_field();
        let err = ValidationError::new("This field is required.", "required");

        let mut settings = Settings::default();
        assert_eq!(resolve_message(&field, &settings, &err), "This field is required.");

        settings
            .error_messages
            .insert("required".into(), "Required".into());
        assert_eq!(resolve_message(&field, &settings, &err), "Required");
    }

    #[test]
    fn test_errors_hidden_until_touched() {
        let field = required_field();
        let settings = Settings::default();
        let mut control = build_control(&field, false, &settings);
        assert!(!BoundField::new(&field, &control, &settings).show_errors());
        control.mark_as_touched();
        assert!(BoundField::new(&field, &control, &settings).show_errors());
    }
}
