//! Form controls and the control tree.
//!
//! A [`FormControl`] is the runtime unit for one field: its current value,
//! the rules compiled from the field's validators, the errors those rules
//! produced, and interaction flags. A [`FormModel`] holds one control per
//! field in schema order and derives the overall [`FormStatus`].
//!
//! Disabled controls carry no errors and do not count towards validity.

use std::collections::{BTreeMap, HashMap};

use dynform_core::ValidationError;

use crate::validators::{run_rules, Rule};
use crate::value::Value;

/// Validation status of a control or of a whole form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormStatus {
    /// Every enabled control passes its rules.
    Valid,
    /// At least one enabled control fails a rule.
    Invalid,
    /// The control is disabled, or every control in the form is.
    Disabled,
}

/// The live state of one field.
#[derive(Debug, Clone)]
pub struct FormControl {
    name: String,
    value: Value,
    initial: Value,
    rules: Vec<Rule>,
    errors: Vec<ValidationError>,
    disabled: bool,
    dirty: bool,
    touched: bool,
}

impl FormControl {
    /// Creates a control and validates its initial value.
    pub fn new(name: impl Into<String>, initial: Value, rules: Vec<Rule>, disabled: bool) -> Self {
        let mut control = Self {
            name: name.into(),
            value: initial.clone(),
            initial,
            rules,
            errors: Vec::new(),
            disabled,
            dirty: false,
            touched: false,
        };
        control.validate();
        control
    }

    /// Re-runs the rules against the current value.
    pub fn validate(&mut self) {
        self.errors = if self.disabled {
            Vec::new()
        } else {
            run_rules(&self.rules, &self.value)
        };
    }

    /// Replaces the value without marking the control dirty.
    pub fn set_value(&mut self, value: Value) {
        self.value = value;
        self.validate();
    }

    /// Replaces the value as user input: the control becomes dirty.
    pub fn input(&mut self, value: Value) {
        self.dirty = true;
        self.set_value(value);
    }

    /// Restores the initial value and clears the dirty and touched flags.
    pub fn reset(&mut self) {
        self.value = self.initial.clone();
        self.dirty = false;
        self.touched = false;
        self.validate();
    }

    /// Marks the control as visited.
    pub fn mark_as_touched(&mut self) {
        self.touched = true;
    }

    /// Disables the control; its errors are cleared.
    pub fn disable(&mut self) {
        self.disabled = true;
        self.validate();
    }

    /// Enables the control and re-validates it.
    pub fn enable(&mut self) {
        self.disabled = false;
        self.validate();
    }

    /// The field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The current value.
    pub const fn value(&self) -> &Value {
        &self.value
    }

    /// The value the control was built with.
    pub const fn initial(&self) -> &Value {
        &self.initial
    }

    /// The compiled rules.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// The current validation errors.
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Returns the error with the given code, if present.
    pub fn error(&self, code: &str) -> Option<&ValidationError> {
        self.errors.iter().find(|e| e.code == code)
    }

    /// Returns `true` if an error with the given code is present.
    pub fn has_error(&self, code: &str) -> bool {
        self.error(code).is_some()
    }

    /// Returns `true` if any rule makes this control mandatory.
    pub fn is_required(&self) -> bool {
        self.rules.iter().any(Rule::is_required)
    }

    /// Whether the control is disabled.
    pub const fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Whether the user has changed the value.
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Whether the control has been visited.
    pub const fn is_touched(&self) -> bool {
        self.touched
    }

    /// The control's own status.
    pub fn status(&self) -> FormStatus {
        if self.disabled {
            FormStatus::Disabled
        } else if self.errors.is_empty() {
            FormStatus::Valid
        } else {
            FormStatus::Invalid
        }
    }
}

/// The control tree of a form, in schema order.
#[derive(Debug, Clone, Default)]
pub struct FormModel {
    controls: Vec<FormControl>,
    index: HashMap<String, usize>,
}

impl FormModel {
    /// Creates an empty model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a control. A control with the same name replaces the earlier one
    /// in place.
    pub fn insert(&mut self, control: FormControl) {
        if let Some(&i) = self.index.get(control.name()) {
            self.controls[i] = control;
        } else {
            self.index.insert(control.name().to_string(), self.controls.len());
            self.controls.push(control);
        }
    }

    /// Returns the control with the given name.
    pub fn get(&self, name: &str) -> Option<&FormControl> {
        self.index.get(name).map(|&i| &self.controls[i])
    }

    /// Returns the control with the given name mutably.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut FormControl> {
        self.index.get(name).map(|&i| &mut self.controls[i])
    }

    /// Returns `true` if a control with the given name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Iterates over controls in schema order.
    pub fn iter(&self) -> impl Iterator<Item = &FormControl> {
        self.controls.iter()
    }

    /// Iterates mutably over controls in schema order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut FormControl> {
        self.controls.iter_mut()
    }

    /// The number of controls.
    pub fn len(&self) -> usize {
        self.controls.len()
    }

    /// Returns `true` if the model has no controls.
    pub fn is_empty(&self) -> bool {
        self.controls.is_empty()
    }

    /// The overall status.
    ///
    /// A model whose every control is disabled is `Disabled`, not `Valid`;
    /// an empty model is `Valid`.
    pub fn status(&self) -> FormStatus {
        if !self.controls.is_empty() && self.controls.iter().all(FormControl::is_disabled) {
            FormStatus::Disabled
        } else if self.controls.iter().all(|c| c.errors().is_empty()) {
            FormStatus::Valid
        } else {
            FormStatus::Invalid
        }
    }

    /// Returns `true` if the overall status is `Valid`.
    pub fn is_valid(&self) -> bool {
        self.status() == FormStatus::Valid
    }

    /// Errors of every failing control, keyed by field name.
    pub fn errors(&self) -> BTreeMap<String, Vec<ValidationError>> {
        self.controls
            .iter()
            .filter(|c| !c.errors().is_empty())
            .map(|c| (c.name().to_string(), c.errors().to_vec()))
            .collect()
    }

    /// Values of enabled controls as a JSON object.
    pub fn value(&self) -> serde_json::Map<String, serde_json::Value> {
        self.controls
            .iter()
            .filter(|c| !c.is_disabled())
            .map(|c| (c.name().to_string(), c.value().to_json()))
            .collect()
    }

    /// Values of all controls, disabled ones included.
    pub fn raw_value(&self) -> serde_json::Map<String, serde_json::Value> {
        self.controls
            .iter()
            .map(|c| (c.name().to_string(), c.value().to_json()))
            .collect()
    }
}
