//! The declarative form schema.
//!
//! A form is described by a [`FormSchema`]: a list of [`FieldSchema`]
//! entries deserialized from JSON (`{"controls": [...]}`). Field keys use the
//! camelCase names of the wire format (`dependedChild`, `showField`,
//! `errorMessage`, ...).
//!
//! [`check_schema`] inspects a schema for caller mistakes without failing;
//! the engine itself tolerates all of them.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

/// The kind of a field.
///
/// The wire format is an open set of strings; types the engine does not know
/// are preserved in [`FieldType::Unsupported`] so they round-trip and can be
/// reported, while every place that branches on the type has to say what
/// happens to them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    /// Single-line text input.
    #[default]
    Text,
    /// Masked text input.
    Password,
    /// Multi-line text input.
    Textarea,
    /// Choice from `options` (one or many, see `multiple`).
    Select,
    /// Single choice rendered as radio buttons.
    Radio,
    /// Calendar date picker.
    Date,
    /// Time-of-day picker.
    Time,
    /// Numeric input.
    Number,
    /// Boolean checkbox.
    Checkbox,
    /// Email address input.
    Email,
    /// File or photo upload.
    File,
    /// Search box backed by an external picker.
    Search,
    /// Any type string the engine does not interpret.
    Unsupported(String),
}

impl FieldType {
    /// Returns the wire name of this type.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Text => "text",
            Self::Password => "password",
            Self::Textarea => "textarea",
            Self::Select => "select",
            Self::Radio => "radio",
            Self::Date => "date",
            Self::Time => "time",
            Self::Number => "number",
            Self::Checkbox => "checkbox",
            Self::Email => "email",
            Self::File => "file",
            Self::Search => "search",
            Self::Unsupported(other) => other,
        }
    }

    /// Returns `true` for types whose control displays free text.
    pub const fn is_text_like(&self) -> bool {
        matches!(
            self,
            Self::Text | Self::Password | Self::Textarea | Self::Email | Self::Search
        )
    }

    /// Returns `true` for types whose control holds one of `options`.
    pub const fn is_choice(&self) -> bool {
        matches!(self, Self::Select | Self::Radio)
    }

    /// Returns `true` for types where numeric bounds are meaningful.
    pub const fn is_numeric(&self) -> bool {
        matches!(self, Self::Number)
    }
}

impl From<String> for FieldType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "text" => Self::Text,
            "password" => Self::Password,
            "textarea" => Self::Textarea,
            "select" => Self::Select,
            "radio" => Self::Radio,
            "date" => Self::Date,
            "time" => Self::Time,
            "number" => Self::Number,
            "checkbox" => Self::Checkbox,
            "email" => Self::Email,
            "file" => Self::File,
            "search" => Self::Search,
            _ => Self::Unsupported(s),
        }
    }
}

impl From<FieldType> for String {
    fn from(t: FieldType) -> Self {
        match t {
            FieldType::Unsupported(other) => other,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `{label, value}` entry of a select-like field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldOption {
    /// Display text; options are ordered by this.
    pub label: String,
    /// The value stored in the control when this option is chosen.
    #[serde(default)]
    pub value: serde_json::Value,
}

impl FieldOption {
    /// Creates an option.
    pub fn new(label: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

const fn default_true() -> bool {
    true
}

/// One entry in a form's declarative definition.
///
/// # Examples
///
/// ```
/// use dynform_forms::schema::{FieldSchema, FieldType};
///
/// let field: FieldSchema = serde_json::from_value(serde_json::json!({
///     "name": "firstName",
///     "label": "First name",
///     "type": "text",
///     "validators": {"required": true, "maxLength": 10}
/// })).unwrap();
/// assert_eq!(field.field_type, FieldType::Text);
/// assert!(field.show_field);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSchema {
    /// Unique key within the form.
    pub name: String,
    /// Human-readable label.
    #[serde(default)]
    pub label: String,
    /// Placeholder text.
    #[serde(default)]
    pub placeholder: String,
    /// Layout hint, not interpreted.
    #[serde(default)]
    pub position: String,
    /// Styling hint, not interpreted.
    #[serde(default)]
    pub class: String,
    /// The field kind.
    #[serde(rename = "type", default)]
    pub field_type: FieldType,
    /// Initial value; its shape depends on the type.
    #[serde(default)]
    pub value: serde_json::Value,
    /// Validator name to parameter.
    #[serde(default)]
    pub validators: BTreeMap<String, serde_json::Value>,
    /// Choices for select-like fields.
    #[serde(default)]
    pub options: Vec<FieldOption>,
    /// Whether a select accepts several values.
    #[serde(default)]
    pub multiple: bool,
    /// Name of the field whose date must not precede this one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depended_child: Option<String>,
    /// Name of the field whose date this one must not precede.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depended_parent: Option<String>,
    /// Whether the control starts disabled.
    #[serde(default)]
    pub disabled: bool,
    /// Whether the field is shown. Hidden fields stay in the form.
    #[serde(default = "default_true")]
    pub show_field: bool,
    /// User-facing messages keyed by validator code.
    #[serde(default)]
    pub error_message: BTreeMap<String, String>,
    /// Correlation id for search events; defaults to `name`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Set once the password visibility toggle has been used.
    #[serde(default)]
    pub show_password_icon: bool,
}

impl FieldSchema {
    /// Creates a field with the given name and type and everything else
    /// defaulted.
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        let name = name.into();
        Self {
            label: name.clone(),
            name,
            placeholder: String::new(),
            position: String::new(),
            class: String::new(),
            field_type,
            value: serde_json::Value::Null,
            validators: BTreeMap::new(),
            options: Vec::new(),
            multiple: false,
            depended_child: None,
            depended_parent: None,
            disabled: false,
            show_field: true,
            error_message: BTreeMap::new(),
            id: None,
            show_password_icon: false,
        }
    }

    /// Sets the initial value.
    #[must_use]
    pub fn value(mut self, value: impl Into<serde_json::Value>) -> Self {
        self.value = value.into();
        self
    }

    /// Adds a validator.
    #[must_use]
    pub fn validator(mut self, name: impl Into<String>, param: impl Into<serde_json::Value>) -> Self {
        self.validators.insert(name.into(), param.into());
        self
    }

    /// Adds an option.
    #[must_use]
    pub fn option(mut self, label: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.options.push(FieldOption::new(label, value));
        self
    }

    /// Sets whether a select accepts several values.
    #[must_use]
    pub const fn multiple(mut self, multiple: bool) -> Self {
        self.multiple = multiple;
        self
    }

    /// Links a dependent end-date field.
    #[must_use]
    pub fn depended_child(mut self, child: impl Into<String>) -> Self {
        self.depended_child = Some(child.into());
        self
    }

    /// Links the start-date field this one depends on.
    #[must_use]
    pub fn depended_parent(mut self, parent: impl Into<String>) -> Self {
        self.depended_parent = Some(parent.into());
        self
    }

    /// Sets whether the control starts disabled.
    #[must_use]
    pub const fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Sets a user-facing message for a validator code.
    #[must_use]
    pub fn error_message(mut self, code: impl Into<String>, msg: impl Into<String>) -> Self {
        self.error_message.insert(code.into(), msg.into());
        self
    }

    /// Sets the search correlation id.
    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Returns the id search events are matched against.
    pub fn search_id(&self) -> &str {
        self.id.as_deref().unwrap_or(&self.name)
    }
}

/// A complete form definition: the `jsonFormData` input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormSchema {
    /// The fields, in display order.
    #[serde(default)]
    pub controls: Vec<FieldSchema>,
}

impl FormSchema {
    /// Creates a schema from a list of fields.
    pub const fn new(controls: Vec<FieldSchema>) -> Self {
        Self { controls }
    }

    /// Parses a schema from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::Schema`](dynform_core::FormError::Schema) if the
    /// JSON is malformed or does not describe a form.
    pub fn from_json_str(json: &str) -> dynform_core::FormResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| dynform_core::FormError::Schema(format!("Invalid form schema: {e}")))
    }

    /// Returns the field with the given name.
    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.controls.iter().find(|f| f.name == name)
    }
}

// ── Schema checks ───────────────────────────────────────────────────

/// Severity of a schema issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum IssueLevel {
    /// The form still works but something is probably wrong.
    Warning,
    /// The form cannot work as described.
    Error,
}

impl fmt::Display for IssueLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warning => write!(f, "WARNING"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

/// A problem found by [`check_schema`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaIssue {
    /// The severity of the issue.
    pub level: IssueLevel,
    /// The field the issue belongs to (empty for unnamed fields).
    pub field: String,
    /// A human-readable description.
    pub message: String,
    /// A stable identifier (e.g. "schema.W001").
    pub id: &'static str,
}

impl fmt::Display for SchemaIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}) {}: {}", self.level, self.id, self.field, self.message)
    }
}

/// Inspects a schema for caller mistakes.
///
/// The engine builds every schema it is given; this reports what it will
/// silently tolerate:
///
/// - `schema.E001` a field with an empty name
/// - `schema.E002` two fields with the same name
/// - `schema.W001` `dependedChild` naming a field that does not exist
/// - `schema.W002` `dependedParent` naming a field that does not exist
/// - `schema.W003` date dependencies forming a cycle
/// - `schema.W004` a field type the engine does not interpret
/// - `schema.W005` a validator the compiler cannot use (bad parameter or regex)
pub fn check_schema(schema: &FormSchema) -> Vec<SchemaIssue> {
    let mut issues = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();
    let names: HashSet<&str> = schema.controls.iter().map(|f| f.name.as_str()).collect();

    for field in &schema.controls {
        if field.name.is_empty() {
            issues.push(SchemaIssue {
                level: IssueLevel::Error,
                field: String::new(),
                message: format!("a '{}' field has an empty name", field.field_type),
                id: "schema.E001",
            });
        } else if !seen.insert(field.name.as_str()) {
            issues.push(SchemaIssue {
                level: IssueLevel::Error,
                field: field.name.clone(),
                message: "duplicate field name; later fields shadow earlier ones".to_string(),
                id: "schema.E002",
            });
        }

        if let Some(child) = &field.depended_child {
            if !names.contains(child.as_str()) {
                issues.push(SchemaIssue {
                    level: IssueLevel::Warning,
                    field: field.name.clone(),
                    message: format!("dependedChild '{child}' does not exist"),
                    id: "schema.W001",
                });
            }
        }
        if let Some(parent) = &field.depended_parent {
            if !names.contains(parent.as_str()) {
                issues.push(SchemaIssue {
                    level: IssueLevel::Warning,
                    field: field.name.clone(),
                    message: format!("dependedParent '{parent}' does not exist"),
                    id: "schema.W002",
                });
            }
        }

        if let FieldType::Unsupported(other) = &field.field_type {
            issues.push(SchemaIssue {
                level: IssueLevel::Warning,
                field: field.name.clone(),
                message: format!("field type '{other}' is not interpreted by the engine"),
                id: "schema.W004",
            });
        }

        for (key, param) in &field.validators {
            if let Err(reason) = crate::validators::compile_rule(key, param) {
                issues.push(SchemaIssue {
                    level: IssueLevel::Warning,
                    field: field.name.clone(),
                    message: format!("validator '{key}' ignored: {reason}"),
                    id: "schema.W005",
                });
            }
        }
    }

    if let Some(cycle_at) = find_dependency_cycle(&schema.controls) {
        issues.push(SchemaIssue {
            level: IssueLevel::Warning,
            field: cycle_at,
            message: "date dependencies form a cycle".to_string(),
            id: "schema.W003",
        });
    }

    issues
}

/// Returns a field that lies on a dependency cycle, if any.
fn find_dependency_cycle(fields: &[FieldSchema]) -> Option<String> {
    // false = visiting, true = done
    fn visit<'a>(
        node: &'a str,
        graph: &'a crate::dependency::DependencyGraph,
        state: &mut HashMap<&'a str, bool>,
    ) -> Option<String> {
        match state.get(node) {
            Some(false) => return Some(node.to_string()),
            Some(true) => return None,
            None => {}
        }
        state.insert(node, false);
        for child in graph.children(node) {
            if let Some(found) = visit(child, graph, state) {
                return Some(found);
            }
        }
        state.insert(node, true);
        None
    }

    let graph = crate::dependency::DependencyGraph::from_fields(fields);
    let mut state: HashMap<&str, bool> = HashMap::new();

    for field in fields {
        if let Some(found) = visit(&field.name, &graph, &mut state) {
            return Some(found);
        }
    }
    None
}
