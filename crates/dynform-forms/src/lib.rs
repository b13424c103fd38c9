//! # dynform-forms
//!
//! The dynamic form engine. A JSON schema describing fields (type,
//! validators, options, dependency links) becomes a live, validated control
//! tree with special handling for date ranges, photo and file uploads,
//! password visibility and search integration.
//!
//! ## Modules
//!
//! - [`schema`] - Field and form definitions, schema checks
//! - [`value`] - Control values
//! - [`validators`] - Compiling validator maps into rules
//! - [`control`] - Controls and the control tree
//! - [`builder`] - Building the control tree from a schema
//! - [`dependency`] - Date-range dependencies and propagation
//! - [`interaction`] - Password toggle, photo actions, search events
//! - [`upload`] - Reading files into controls, the upload contract
//! - [`bound_field`] - Render-neutral field snapshots
//! - [`validation`] - Whole-form validation
//! - [`form`] - The [`DynamicForm`] engine and its events

pub mod bound_field;
pub mod builder;
pub mod control;
pub mod dependency;
pub mod form;
pub mod interaction;
pub mod schema;
pub mod upload;
pub mod validation;
pub mod validators;
pub mod value;

pub use control::{FormControl, FormModel, FormStatus};
pub use form::{DynamicForm, FormEvent};
pub use schema::{FieldOption, FieldSchema, FieldType, FormSchema};
pub use value::Value;
