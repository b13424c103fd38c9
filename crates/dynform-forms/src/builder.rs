//! The control builder.
//!
//! Turns a list of [`FieldSchema`]s into a [`FormModel`]: options are sorted
//! by label, each field's rules are compiled, and its initial value is
//! normalised according to its type before the control is created.
//!
//! Initial value normalisation, by type:
//!
//! | Type | `null` | `{label, value}` | array | other |
//! |---|---|---|---|---|
//! | select | `""`, or `[]` if `multiple` | `value` | each item unwrapped to `value` | as-is |
//! | radio | `null` | `value` | as-is | as-is |
//! | text-like | `null` | `label` | as-is | as-is |
//! | date | `null` | as-is | as-is | strings parsed as dates |
//! | everything else | as-is | as-is | as-is | as-is |

use std::collections::HashMap;

use chrono::NaiveDate;
use dynform_core::Settings;

use crate::control::{FormControl, FormModel};
use crate::schema::{FieldOption, FieldSchema, FieldType};
use crate::validators::compile_validators;
use crate::value::Value;

/// Returns the options sorted ascending by label (case-sensitive, stable).
///
/// The input is left untouched; sorting an already sorted list yields the
/// same order.
pub fn sort_options(options: &[FieldOption]) -> Vec<FieldOption> {
    let mut sorted = options.to_vec();
    sorted.sort_by(|a, b| a.label.cmp(&b.label));
    sorted
}

/// Returns the fields with every option list sorted by label.
///
/// Duplicate names collapse to one field: the later definition replaces the
/// earlier one at the earlier position, the same way [`FormModel::insert`]
/// treats their controls.
pub fn prepare_fields(fields: Vec<FieldSchema>) -> Vec<FieldSchema> {
    let mut prepared: Vec<FieldSchema> = Vec::with_capacity(fields.len());
    let mut positions: HashMap<String, usize> = HashMap::new();

    for mut field in fields {
        if !field.options.is_empty() {
            field.options = sort_options(&field.options);
        }
        if let Some(&i) = positions.get(&field.name) {
            tracing::warn!(field = %field.name, "duplicate field name, earlier definition dropped");
            prepared[i] = field;
        } else {
            positions.insert(field.name.clone(), prepared.len());
            prepared.push(field);
        }
    }
    prepared
}

/// Parses a date string with the configured format.
///
/// Falls back to RFC 3339 and ISO-8601 date-times (keeping the date part),
/// since date pickers commonly hand back full timestamps.
pub fn parse_date(s: &str, date_format: &str) -> Option<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, date_format)
        .ok()
        .or_else(|| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
        .or_else(|| {
            chrono::DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|dt| dt.date_naive())
        })
        .or_else(|| {
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|dt| dt.date())
        })
}

fn option_part<'a>(value: &'a serde_json::Value, key: &str) -> Option<&'a serde_json::Value> {
    value.as_object().and_then(|obj| obj.get(key))
}

fn unwrap_to_value(value: &serde_json::Value) -> serde_json::Value {
    option_part(value, "value").unwrap_or(value).clone()
}

/// Normalises a field's schema value into its control's initial value.
pub fn normalize_initial(field: &FieldSchema, date_format: &str) -> Value {
    let raw = &field.value;
    match &field.field_type {
        FieldType::Select => match raw {
            serde_json::Value::Null if field.multiple => Value::List(Vec::new()),
            serde_json::Value::Null => Value::from(""),
            serde_json::Value::Array(items) => {
                Value::List(items.iter().map(|i| Value::from(unwrap_to_value(i))).collect())
            }
            other => Value::from(unwrap_to_value(other)),
        },
        FieldType::Radio => Value::from(unwrap_to_value(raw)),
        FieldType::Text
        | FieldType::Password
        | FieldType::Textarea
        | FieldType::Email
        | FieldType::Search => Value::from(option_part(raw, "label").unwrap_or(raw).clone()),
        FieldType::Date => match raw {
            serde_json::Value::String(s) => {
                parse_date(s, date_format).map_or_else(|| Value::from(s.as_str()), Value::Date)
            }
            other => Value::from(other.clone()),
        },
        FieldType::Time
        | FieldType::Number
        | FieldType::Checkbox
        | FieldType::File
        | FieldType::Unsupported(_) => Value::from(raw.clone()),
    }
}

/// Replaces a `{label, value}` option object with one of its parts.
fn unwrap_option(value: Value, key: &str) -> Value {
    match value {
        Value::Json(obj) => match option_part(&obj, key) {
            Some(part) => Value::from(part.clone()),
            None => Value::Json(obj),
        },
        other => other,
    }
}

/// Converts a value arriving from input to the control's representation.
///
/// Option objects are unwrapped the way initial values are (selects and
/// radios keep `value`, text-like fields keep `label`, select lists unwrap
/// each item) and date strings become [`Value::Date`]. Anything else is
/// stored as given and left to the rules.
pub fn coerce_input(field: &FieldSchema, value: Value, date_format: &str) -> Value {
    match (&field.field_type, value) {
        (FieldType::Date, Value::String(s)) => {
            parse_date(&s, date_format).map_or(Value::String(s), Value::Date)
        }
        (FieldType::Select, Value::List(items)) => Value::List(
            items
                .into_iter()
                .map(|item| unwrap_option(item, "value"))
                .collect(),
        ),
        (FieldType::Select | FieldType::Radio, value) => unwrap_option(value, "value"),
        (
            FieldType::Text
            | FieldType::Password
            | FieldType::Textarea
            | FieldType::Email
            | FieldType::Search,
            value,
        ) => unwrap_option(value, "label"),
        (_, value) => value,
    }
}

/// Builds the control for one field.
pub fn build_control(field: &FieldSchema, readonly: bool, settings: &Settings) -> FormControl {
    let rules = compile_validators(&field.validators, &field.field_type);
    let initial = normalize_initial(field, &settings.date_format);
    FormControl::new(field.name.clone(), initial, rules, readonly || field.disabled)
}

/// Builds the control tree for a list of fields.
///
/// `readonly` disables every control regardless of per-field `disabled`.
pub fn build_model(fields: &[FieldSchema], readonly: bool, settings: &Settings) -> FormModel {
    let mut model = FormModel::new();
    for field in fields {
        model.insert(build_control(field, readonly, settings));
    }
    tracing::debug!(controls = model.len(), readonly, "built form model");
    model
}
