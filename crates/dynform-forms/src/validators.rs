//! The validator compiler.
//!
//! A field's declarative `validators` map (`{"required": true, "maxLength": 10}`)
//! is compiled once into an ordered list of [`Rule`]s. Each rule checks one
//! constraint against a control's [`Value`] and reports a
//! [`ValidationError`] carrying the rule's code.
//!
//! Length, bound, pattern and email rules accept empty values; only
//! `required` and `requiredTrue` reject them. Rules that make no sense for a
//! value's shape (a `min` bound on text, a length on a number) pass.

use std::collections::BTreeMap;

use dynform_core::ValidationError;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::schema::FieldType;
use crate::value::Value;

/// Local part and domain of an email address, checked after the overall
/// length limits (254 total, 64 for the local part).
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[a-zA-Z0-9!#$%&'*+/=?^_`{|}~-]+)*@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .expect("valid regex")
});

/// One compiled validation constraint.
#[derive(Debug, Clone)]
pub enum Rule {
    /// The value must not be empty.
    Required,
    /// The value must be boolean `true`.
    RequiredTrue,
    /// Strings and lists must have at least this many characters/items.
    MinLength(usize),
    /// Strings and lists must have at most this many characters/items.
    MaxLength(usize),
    /// Numeric readings must be at least this.
    Min(f64),
    /// Numeric readings must be at most this.
    Max(f64),
    /// The string form must match the whole pattern.
    Pattern {
        /// The pattern as written in the schema.
        source: String,
        /// The anchored, compiled pattern.
        regex: Regex,
    },
    /// The value must look like an email address.
    Email,
    /// Always passes; marks a field as explicitly unvalidated.
    Null,
}

impl Rule {
    /// Returns the error code this rule reports.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Required | Self::RequiredTrue => "required",
            Self::MinLength(_) => "minlength",
            Self::MaxLength(_) => "maxlength",
            Self::Min(_) => "min",
            Self::Max(_) => "max",
            Self::Pattern { .. } => "pattern",
            Self::Email => "email",
            Self::Null => "null",
        }
    }

    /// Returns `true` if this rule makes the field mandatory.
    pub const fn is_required(&self) -> bool {
        matches!(self, Self::Required | Self::RequiredTrue)
    }

    /// Checks a value against this rule.
    pub fn check(&self, value: &Value) -> Result<(), ValidationError> {
        match self {
            Self::Required => {
                if value.is_empty() {
                    return Err(ValidationError::new("This field is required.", "required"));
                }
            }
            Self::RequiredTrue => {
                if value.as_bool() != Some(true) {
                    return Err(ValidationError::new("This field must be checked.", "required"));
                }
            }
            Self::MinLength(min) => {
                if value.is_empty() {
                    return Ok(());
                }
                if let Some(len) = value.length() {
                    if len < *min {
                        return Err(ValidationError::new(
                            format!("Ensure this value has at least {min} characters (it has {len})."),
                            "minlength",
                        )
                        .with_param("requiredLength", min.to_string())
                        .with_param("actualLength", len.to_string()));
                    }
                }
            }
            Self::MaxLength(max) => {
                if let Some(len) = value.length() {
                    if len > *max {
                        return Err(ValidationError::new(
                            format!("Ensure this value has at most {max} characters (it has {len})."),
                            "maxlength",
                        )
                        .with_param("requiredLength", max.to_string())
                        .with_param("actualLength", len.to_string()));
                    }
                }
            }
            Self::Min(min) => {
                if let Some(n) = numeric_reading(value) {
                    if n < *min {
                        return Err(ValidationError::new(
                            format!("Ensure this value is greater than or equal to {min}."),
                            "min",
                        )
                        .with_param("min", min.to_string())
                        .with_param("actual", n.to_string()));
                    }
                }
            }
            Self::Max(max) => {
                if let Some(n) = numeric_reading(value) {
                    if n > *max {
                        return Err(ValidationError::new(
                            format!("Ensure this value is less than or equal to {max}."),
                            "max",
                        )
                        .with_param("max", max.to_string())
                        .with_param("actual", n.to_string()));
                    }
                }
            }
            Self::Pattern { source, regex } => {
                if value.is_empty() {
                    return Ok(());
                }
                let text = value.to_string();
                if !regex.is_match(&text) {
                    return Err(ValidationError::new("Enter a valid value.", "pattern")
                        .with_param("requiredPattern", source.clone())
                        .with_param("actualValue", text));
                }
            }
            Self::Email => {
                if value.is_empty() {
                    return Ok(());
                }
                if !is_valid_email(&value.to_string()) {
                    return Err(ValidationError::new("Enter a valid email address.", "email"));
                }
            }
            Self::Null => {}
        }
        Ok(())
    }
}

fn numeric_reading(value: &Value) -> Option<f64> {
    if value.is_empty() {
        None
    } else {
        value.as_number()
    }
}

/// Returns `true` if `s` is a syntactically valid email address.
pub fn is_valid_email(s: &str) -> bool {
    let Some((local, _)) = s.split_once('@') else {
        return false;
    };
    s.len() <= 254 && !local.is_empty() && local.len() <= 64 && EMAIL_RE.is_match(s)
}

/// Anchors a schema pattern so it must match the whole value.
///
/// The pattern is grouped before anchoring so alternations apply to the
/// whole value; anchors already in the pattern still hold inside the group.
fn anchor_pattern(pattern: &str) -> String {
    format!("^(?:{pattern})$")
}

/// Reads a boolean flag parameter. Anything other than a boolean or the
/// strings "true"/"false" is rejected.
fn flag_param(param: &serde_json::Value) -> Result<bool, String> {
    match param {
        serde_json::Value::Bool(b) => Ok(*b),
        serde_json::Value::String(s) if s == "true" => Ok(true),
        serde_json::Value::String(s) if s == "false" => Ok(false),
        serde_json::Value::Null => Ok(false),
        other => Err(format!("expected a boolean, got {other}")),
    }
}

fn number_param(param: &serde_json::Value) -> Result<f64, String> {
    match param {
        serde_json::Value::Number(n) => n.as_f64().ok_or_else(|| format!("unusable number {n}")),
        serde_json::Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| format!("expected a number, got \"{s}\"")),
        other => Err(format!("expected a number, got {other}")),
    }
}

fn length_param(param: &serde_json::Value) -> Result<usize, String> {
    let n = number_param(param)?;
    if n < 0.0 || n.fract() != 0.0 {
        return Err(format!("expected a non-negative whole number, got {n}"));
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let len = n as usize;
    Ok(len)
}

/// Compiles one validator entry.
///
/// Returns `Ok(None)` for keys the compiler does not recognise and for flags
/// set to `false`, and `Err` with a reason when the parameter is unusable.
pub fn compile_rule(key: &str, param: &serde_json::Value) -> Result<Option<Rule>, String> {
    let rule = match key {
        "required" => flag_param(param)?.then_some(Rule::Required),
        "requiredTrue" => flag_param(param)?.then_some(Rule::RequiredTrue),
        "email" => flag_param(param)?.then_some(Rule::Email),
        "nullValidator" => flag_param(param)?.then_some(Rule::Null),
        "minLength" => Some(Rule::MinLength(length_param(param)?)),
        "maxLength" => Some(Rule::MaxLength(length_param(param)?)),
        "min" => Some(Rule::Min(number_param(param)?)),
        "max" => Some(Rule::Max(number_param(param)?)),
        "pattern" => {
            let source = match param {
                serde_json::Value::String(s) => s.clone(),
                other => return Err(format!("expected a pattern string, got {other}")),
            };
            let regex = Regex::new(&anchor_pattern(&source))
                .map_err(|e| format!("invalid pattern: {e}"))?;
            Some(Rule::Pattern { source, regex })
        }
        _ => None,
    };
    Ok(rule)
}

/// Compiles a field's validator map into rules.
///
/// Unrecognised keys are skipped; unusable parameters are skipped with a
/// warning. Numeric bounds on non-numeric field types are compiled anyway.
pub fn compile_validators(
    validators: &BTreeMap<String, serde_json::Value>,
    field_type: &FieldType,
) -> Vec<Rule> {
    let mut rules = Vec::with_capacity(validators.len());
    for (key, param) in validators {
        match compile_rule(key, param) {
            Ok(Some(rule)) => {
                if matches!(rule, Rule::Min(_) | Rule::Max(_)) && !field_type.is_numeric() {
                    tracing::debug!(
                        validator = key.as_str(),
                        field_type = %field_type,
                        "numeric bound on non-numeric field"
                    );
                }
                rules.push(rule);
            }
            Ok(None) => {}
            Err(reason) => {
                tracing::warn!(validator = key.as_str(), %reason, "ignoring validator");
            }
        }
    }
    rules
}

/// Runs every rule against a value and collects all failures.
pub fn run_rules(rules: &[Rule], value: &Value) -> Vec<ValidationError> {
    rules.iter().filter_map(|rule| rule.check(value).err()).collect()
}
