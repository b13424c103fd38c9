//! Control values.
//!
//! The [`Value`] enum is the type every form control holds. Schema values
//! arrive as JSON; the builder turns them into `Value`s (parsing dates for
//! date fields) and [`Value::to_json`] turns them back for submission.

use std::fmt;

use chrono::NaiveDate;

/// The current value of a form control.
///
/// # Examples
///
/// ```
/// use dynform_forms::value::Value;
///
/// let v = Value::from(42_i64);
/// assert_eq!(v, Value::Int(42));
///
/// let v = Value::from(serde_json::json!(["a", "b"]));
/// assert_eq!(v, Value::List(vec![Value::from("a"), Value::from("b")]));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// No value.
    Null,
    /// A boolean value (checkboxes, switches).
    Bool(bool),
    /// A whole number.
    Int(i64),
    /// A floating-point number.
    Float(f64),
    /// A string (text inputs, single selects, data URLs).
    String(String),
    /// A calendar date.
    Date(NaiveDate),
    /// A list of values (multiple selects).
    List(Vec<Value>),
    /// A JSON object kept as-is (values the engine does not interpret).
    Json(serde_json::Value),
}

impl fmt::Display for Value {
    /// Formats the value the way it is matched against `pattern` rules:
    /// null is empty, lists are comma-joined, dates are ISO-8601.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::String(s) => write!(f, "{s}"),
            Self::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Self::Json(j) => write!(f, "{j}"),
            Self::List(vals) => {
                for (i, v) in vals.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{v}")?;
                }
                Ok(())
            }
        }
    }
}

// ── From implementations ───────────────────────────────────────────────

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Self::Date(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Self::List(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(inner) => inner.into(),
            None => Self::Null,
        }
    }
}

impl From<serde_json::Value> for Value {
    /// Converts JSON structurally. Objects are kept whole as [`Value::Json`];
    /// date strings stay strings (only the builder knows a field is a date).
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map_or_else(|| Self::Float(n.as_f64().unwrap_or(f64::NAN)), Self::Int),
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => {
                Self::List(items.into_iter().map(Self::from).collect())
            }
            obj @ serde_json::Value::Object(_) => Self::Json(obj),
        }
    }
}

impl Value {
    /// Returns `true` if this value is `Null`.
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns `true` if the value counts as "not filled in":
    /// null, an empty string, or an empty list.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Null => true,
            Self::String(s) => s.is_empty(),
            Self::List(items) => items.is_empty(),
            _ => false,
        }
    }

    /// Returns the length used by `minLength`/`maxLength` rules.
    ///
    /// Strings are measured in characters, lists in items. Other values have
    /// no length and are never rejected by length rules.
    pub fn length(&self) -> Option<usize> {
        match self {
            Self::String(s) => Some(s.chars().count()),
            Self::List(items) => Some(items.len()),
            _ => None,
        }
    }

    /// Returns the numeric reading used by `min`/`max` rules.
    ///
    /// Numbers are used directly; strings are parsed after trimming.
    /// Anything else (or a string that is not a number) yields `None`.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            #[allow(clippy::cast_precision_loss)]
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) if !f.is_nan() => Some(*f),
            Self::String(s) => s.trim().parse::<f64>().ok().filter(|f| !f.is_nan()),
            _ => None,
        }
    }

    /// Attempts to extract a boolean value.
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Attempts to extract a string reference.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Attempts to extract a date.
    pub const fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// Converts the value to JSON for submission. Dates become ISO-8601 strings.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Null => serde_json::Value::Null,
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Int(i) => serde_json::json!(i),
            Self::Float(f) => serde_json::Number::from_f64(*f)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
            Self::String(s) => serde_json::Value::String(s.clone()),
            Self::Date(d) => serde_json::Value::String(d.format("%Y-%m-%d").to_string()),
            Self::List(items) => serde_json::Value::Array(items.iter().map(Self::to_json).collect()),
            Self::Json(j) => j.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_scalars() {
        assert_eq!(Value::from(json!(null)), Value::Null);
        assert_eq!(Value::from(json!(true)), Value::Bool(true));
        assert_eq!(Value::from(json!(7)), Value::Int(7));
        assert_eq!(Value::from(json!(2.5)), Value::Float(2.5));
        assert_eq!(Value::from(json!("x")), Value::from("x"));
    }

    #[test]
    fn test_from_json_object_kept_whole() {
        let obj = json!({"label": "Admin", "value": "a"});
        assert_eq!(Value::from(obj.clone()), Value::Json(obj));
    }

    #[test]
    fn test_is_empty() {
        assert!(Value::Null.is_empty());
        assert!(Value::from("").is_empty());
        assert!(Value::List(vec![]).is_empty());
        assert!(!Value::from(" ").is_empty());
        assert!(!Value::Bool(false).is_empty());
        assert!(!Value::Int(0).is_empty());
    }

    #[test]
    fn test_length_counts_chars() {
        assert_eq!(Value::from("héllo").length(), Some(5));
        assert_eq!(Value::List(vec![Value::Int(1)]).length(), Some(1));
        assert_eq!(Value::Int(12345).length(), None);
    }

    #[test]
    fn test_as_number() {
        assert_eq!(Value::Int(3).as_number(), Some(3.0));
        assert_eq!(Value::from(" 4.5 ").as_number(), Some(4.5));
        assert_eq!(Value::from("abc").as_number(), None);
        assert_eq!(Value::Bool(true).as_number(), None);
    }

    #[test]
    fn test_display_for_pattern_matching() {
        assert_eq!(Value::Null.to_string(), "");
        assert_eq!(Value::Float(5.0).to_string(), "5");
        let list = Value::List(vec![Value::from("a"), Value::Int(2)]);
        assert_eq!(list.to_string(), "a,2");
        let d = NaiveDate::from_ymd_opt(2020, 1, 2).unwrap();
        assert_eq!(Value::Date(d).to_string(), "2020-01-02");
    }

    #[test]
    fn test_to_json_dates_as_strings() {
        let d = NaiveDate::from_ymd_opt(2021, 12, 31).unwrap();
        assert_eq!(Value::Date(d).to_json(), json!("2021-12-31"));
        assert_eq!(
            Value::List(vec![Value::Int(1), Value::Null]).to_json(),
            json!([1, null])
        );
    }

    #[test]
    fn test_from_option() {
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some("x")), Value::from("x"));
    }
}
