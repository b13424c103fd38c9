//! The dynamic form engine.
//!
//! A [`DynamicForm`] owns the field definitions of one form, the control
//! tree built from them and the date dependency graph. Every interaction
//! goes through its methods; the owner learns what happened by connecting
//! to [`DynamicForm::events`].
//!
//! All handlers run synchronously to completion. The only asynchronous
//! operation is [`DynamicForm::read_file`].
//!
//! # Examples
//!
//! ```
//! use dynform_core::Settings;
//! use dynform_forms::form::{DynamicForm, FormEvent};
//! use dynform_forms::schema::FormSchema;
//!
//! let schema = FormSchema::from_json_str(r#"{"controls": [
//!     {"name": "firstName", "type": "text", "validators": {"required": true}}
//! ]}"#).unwrap();
//!
//! let mut form = DynamicForm::new(Settings::default());
//! let events = form.events().record("example");
//! form.set_schema(schema);
//! assert!(!form.is_valid());
//!
//! form.input("firstName", "Asha").unwrap();
//! assert!(form.enter_pressed());
//! assert!(matches!(events.take().last(), Some(FormEvent::SubmitRequested(_))));
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use chrono::NaiveDate;
use dynform_core::{FormError, FormResult, Settings, ValidationError};
use dynform_signals::Signal;

use crate::bound_field::BoundField;
use crate::builder::{build_model, coerce_input, prepare_fields};
use crate::control::{FormControl, FormModel, FormStatus};
use crate::dependency::{apply_date_pick, DatePick, DependencyGraph};
use crate::interaction::{self, BridgedSearchEvent, PhotoAction, SearchEvent};
use crate::schema::{FieldSchema, FormSchema};
use crate::upload::{self, UploadRequest, UploadedFile};
use crate::validation;
use crate::value::Value;

/// A notification sent by a [`DynamicForm`].
#[derive(Debug, Clone, PartialEq)]
pub enum FormEvent {
    /// Overall validity after a build or a value change.
    ValidityChanged(bool),
    /// A field's value was changed by an explicit selection.
    ValueChanged(FieldSchema),
    /// The form was submitted while valid; carries the enabled values.
    SubmitRequested(serde_json::Map<String, serde_json::Value>),
    /// A photo was removed from a control.
    PhotoRemoved {
        /// The control that was cleared.
        control: String,
    },
    /// The owner should open a file picker for a control.
    FilePickerRequested {
        /// The control the file is for.
        control: String,
        /// Whether the picker should prefer the camera.
        capture: bool,
    },
    /// The owner should open its picker modal for a field.
    DynamicSelectOpened(FieldSchema),
    /// A search event was matched to a control.
    SearchBridged(BridgedSearchEvent),
}

/// A live, schema-driven form.
#[derive(Debug)]
pub struct DynamicForm {
    id: String,
    fields: Vec<FieldSchema>,
    model: FormModel,
    graph: DependencyGraph,
    readonly: bool,
    settings: Settings,
    events: Signal<FormEvent>,
}

impl DynamicForm {
    /// Creates a form with no fields. Its readonly flag starts from
    /// `settings.readonly`.
    pub fn new(settings: Settings) -> Self {
        Self {
            id: "form".to_string(),
            fields: Vec::new(),
            model: FormModel::new(),
            graph: DependencyGraph::default(),
            readonly: settings.readonly,
            settings,
            events: Signal::new(),
        }
    }

    /// Creates a form and builds it from `schema`.
    pub fn from_schema(schema: FormSchema, settings: Settings) -> Self {
        let mut form = Self::new(settings);
        form.set_schema(schema);
        form
    }

    /// Sets the identifier used in log entries.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// The identifier used in log entries.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The notification channel.
    pub const fn events(&self) -> &Signal<FormEvent> {
        &self.events
    }

    /// Replaces the schema and rebuilds the whole control tree.
    ///
    /// Options are sorted by label, rules compiled, initial values
    /// normalised and the dependency graph recomputed. Emits
    /// [`FormEvent::ValidityChanged`].
    pub fn set_schema(&mut self, schema: FormSchema) {
        self.fields = prepare_fields(schema.controls);
        self.graph = DependencyGraph::from_fields(&self.fields);
        self.model = build_model(&self.fields, self.readonly, &self.settings);
        tracing::debug!(form = %self.id, fields = self.fields.len(), "schema assigned");
        self.emit_validity();
    }

    /// Sets the whole-form readonly flag.
    ///
    /// While set, every control is disabled. Clearing it re-enables the
    /// controls whose field is not itself `disabled`.
    pub fn set_readonly(&mut self, readonly: bool) {
        self.readonly = readonly;
        for field in &self.fields {
            if let Some(control) = self.model.get_mut(&field.name) {
                if readonly || field.disabled {
                    control.disable();
                } else {
                    control.enable();
                }
            }
        }
        tracing::debug!(form = %self.id, readonly, "readonly changed");
        self.emit_validity();
    }

    /// Whether the whole form is readonly.
    pub const fn is_readonly(&self) -> bool {
        self.readonly
    }

    /// The settings the form was created with.
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The field definitions, options sorted.
    pub fn fields(&self) -> &[FieldSchema] {
        &self.fields
    }

    /// Returns the field with the given name.
    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Returns the control with the given name.
    pub fn control(&self, name: &str) -> Option<&FormControl> {
        self.model.get(name)
    }

    /// The control tree.
    pub const fn model(&self) -> &FormModel {
        &self.model
    }

    /// The date dependency graph.
    pub const fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    /// The overall status.
    pub fn status(&self) -> FormStatus {
        self.model.status()
    }

    /// Returns `true` if the form is valid.
    pub fn is_valid(&self) -> bool {
        self.model.is_valid()
    }

    /// Errors of every failing control.
    pub fn errors(&self) -> BTreeMap<String, Vec<ValidationError>> {
        self.model.errors()
    }

    /// Values of enabled controls.
    pub fn value(&self) -> serde_json::Map<String, serde_json::Value> {
        self.model.value()
    }

    /// Values of all controls.
    pub fn raw_value(&self) -> serde_json::Map<String, serde_json::Value> {
        self.model.raw_value()
    }

    /// Render-neutral snapshots of every field, in schema order.
    pub fn bound_fields(&self) -> Vec<BoundField> {
        self.fields
            .iter()
            .filter_map(|field| {
                let control = self.model.get(&field.name)?;
                Some(BoundField::new(field, control, &self.settings))
            })
            .collect()
    }

    // ── Value changes ───────────────────────────────────────────────

    /// Sets a control's value programmatically (the control stays pristine).
    ///
    /// # Errors
    ///
    /// Returns [`FormError::UnknownField`] if there is no such control.
    pub fn set_value(&mut self, name: &str, value: impl Into<Value>) -> FormResult<()> {
        self.change(name, value.into(), false)
    }

    /// Sets a control's value as user input (the control becomes dirty).
    ///
    /// # Errors
    ///
    /// Returns [`FormError::UnknownField`] if there is no such control.
    pub fn input(&mut self, name: &str, value: impl Into<Value>) -> FormResult<()> {
        self.change(name, value.into(), true)
    }

    /// Applies an explicit selection from a select-like field and emits
    /// [`FormEvent::ValueChanged`] with the field.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::UnknownField`] if there is no such control.
    pub fn select(&mut self, name: &str, value: impl Into<Value>) -> FormResult<()> {
        self.change(name, value.into(), true)?;
        if let Some(field) = self.field(name) {
            self.events.send(&FormEvent::ValueChanged(field.clone()));
        }
        Ok(())
    }

    fn change(&mut self, name: &str, value: Value, user: bool) -> FormResult<()> {
        let field = self
            .fields
            .iter()
            .find(|f| f.name == name)
            .ok_or_else(|| FormError::UnknownField(name.to_string()))?;
        let value = coerce_input(field, value, &self.settings.date_format);
        let control = self
            .model
            .get_mut(name)
            .ok_or_else(|| FormError::UnknownField(name.to_string()))?;

        if user {
            control.input(value);
        } else {
            control.set_value(value);
        }
        tracing::debug!(form = %self.id, field = name, user, "value changed");
        self.emit_validity();
        Ok(())
    }

    /// Marks a control as visited.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::UnknownField`] if there is no such control.
    pub fn touch(&mut self, name: &str) -> FormResult<()> {
        self.model
            .get_mut(name)
            .ok_or_else(|| FormError::UnknownField(name.to_string()))?
            .mark_as_touched();
        Ok(())
    }

    /// Handles a confirmed date pick.
    ///
    /// A pick earlier than `floor` is clamped to it; direct dependents whose
    /// date precedes the accepted date are pushed forward to it.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::UnknownField`] if there is no such control.
    pub fn pick_date(
        &mut self,
        name: &str,
        picked: NaiveDate,
        floor: Option<NaiveDate>,
    ) -> FormResult<DatePick> {
        let pick = apply_date_pick(&mut self.model, &self.graph, name, picked, floor)
            .ok_or_else(|| FormError::UnknownField(name.to_string()))?;
        tracing::debug!(
            form = %self.id,
            field = name,
            accepted = %pick.accepted,
            clamped = pick.clamped,
            propagated = pick.propagated.len(),
            "date picked"
        );
        self.emit_validity();
        Ok(pick)
    }

    /// Resets every control to the value it was built with.
    pub fn reset(&mut self) {
        for control in self.model.iter_mut() {
            control.reset();
        }
        tracing::debug!(form = %self.id, "form reset");
        self.emit_validity();
    }

    // ── Interactions ────────────────────────────────────────────────

    /// Flips a password field between masked and plain text.
    ///
    /// Returns `false` unless the field is a password or a revealed password.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::UnknownField`] if there is no such field.
    pub fn toggle_password(&mut self, name: &str) -> FormResult<bool> {
        let field = self
            .fields
            .iter_mut()
            .find(|f| f.name == name)
            .ok_or_else(|| FormError::UnknownField(name.to_string()))?;
        Ok(interaction::toggle_password(field))
    }

    /// Handles a photo action identified by its source tag.
    ///
    /// `ADD_PHOTO` and `CAMERA` ask the owner to open a file picker;
    /// `REMOVE_PHOTO` clears the control to `""` and emits
    /// [`FormEvent::PhotoRemoved`]. Unknown tags and fields are ignored.
    /// Returns the recognized action.
    pub fn photo_action(&mut self, name: &str, tag: &str) -> Option<PhotoAction> {
        let action = PhotoAction::from_tag(tag)?;
        if !self.model.contains(name) {
            return None;
        }
        match action {
            PhotoAction::AddPhoto | PhotoAction::Camera => {
                self.events.send(&FormEvent::FilePickerRequested {
                    control: name.to_string(),
                    capture: action.capture(),
                });
            }
            PhotoAction::RemovePhoto => {
                if let Some(control) = self.model.get_mut(name) {
                    control.input(Value::from(""));
                }
                self.events.send(&FormEvent::PhotoRemoved {
                    control: name.to_string(),
                });
                self.emit_validity();
            }
        }
        Some(action)
    }

    /// Reads a file into a control as a `data:` URL.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::UnknownField`] if there is no such control, and
    /// the read error otherwise; the control is unchanged on failure.
    pub async fn read_file(&mut self, name: &str, path: impl AsRef<Path> + Send) -> FormResult<()> {
        if !self.model.contains(name) {
            return Err(FormError::UnknownField(name.to_string()));
        }
        let data_url = upload::read_as_data_url(path, self.settings.max_upload_size).await?;
        self.change(name, Value::String(data_url), true)
    }

    /// Describes the upload of `file` for the control `name`.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::UnknownField`] if there is no such control.
    pub fn upload_request(
        &self,
        name: &str,
        file: UploadedFile,
        destination_url: impl Into<String>,
    ) -> FormResult<UploadRequest> {
        if !self.model.contains(name) {
            return Err(FormError::UnknownField(name.to_string()));
        }
        Ok(UploadRequest::new(name, file, destination_url))
    }

    /// Asks the owner to open its picker modal for a field.
    ///
    /// Returns `false` if there is no such field.
    pub fn open_dynamic_select(&self, name: &str) -> bool {
        let Some(field) = self.field(name) else {
            return false;
        };
        self.events
            .send(&FormEvent::DynamicSelectOpened(field.clone()));
        true
    }

    /// Routes a search event to the control it is addressed to and forwards
    /// it to the owner.
    ///
    /// Events whose id matches no live control are dropped.
    pub fn bridge_search_event(&self, event: SearchEvent) -> Option<BridgedSearchEvent> {
        let target = interaction::find_search_target(&self.fields, &event.id)
            .and_then(|field| self.model.get(&field.name));
        let Some(control) = target else {
            tracing::warn!(form = %self.id, id = %event.id, "search event for unknown control dropped");
            return None;
        };

        let bridged = BridgedSearchEvent {
            id: event.id,
            data: event.data,
            form_control: control.name().to_string(),
            value: control.value().to_json(),
        };
        self.events.send(&FormEvent::SearchBridged(bridged.clone()));
        Some(bridged)
    }

    // ── Submission ──────────────────────────────────────────────────

    /// Handles a key press; only `Enter` does anything.
    pub fn key_pressed(&self, key: &str) -> bool {
        key == "Enter" && self.enter_pressed()
    }

    /// Emits [`FormEvent::SubmitRequested`] if the form is valid.
    ///
    /// Returns whether the submit was requested. An invalid form is
    /// suppressed silently.
    pub fn enter_pressed(&self) -> bool {
        if !self.is_valid() {
            tracing::debug!(form = %self.id, "enter suppressed on invalid form");
            return false;
        }
        self.events.send(&FormEvent::SubmitRequested(self.value()));
        true
    }

    /// Submits the form.
    ///
    /// Every control is marked touched so errors become visible. When the
    /// form is valid, emits [`FormEvent::SubmitRequested`] and returns the
    /// values. Otherwise returns the failing fields with their messages;
    /// a form whose every control is disabled returns an empty list.
    ///
    /// # Errors
    ///
    /// Returns `(field_name, error_messages)` tuples for failing fields.
    pub fn submit(
        &mut self,
    ) -> Result<serde_json::Map<String, serde_json::Value>, Vec<(String, Vec<String>)>> {
        for control in self.model.iter_mut() {
            control.mark_as_touched();
        }
        let values = validation::full_clean(&self.fields, &mut self.model, &self.settings)?;
        if self.status() == FormStatus::Disabled {
            return Err(Vec::new());
        }
        self.events.send(&FormEvent::SubmitRequested(values.clone()));
        Ok(values)
    }

    fn emit_validity(&self) {
        let valid = self.is_valid();
        let notified = self.events.send(&FormEvent::ValidityChanged(valid));
        tracing::debug!(form = %self.id, valid, notified, "validity emitted");
    }
}
