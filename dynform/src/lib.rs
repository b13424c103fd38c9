//! # dynform
//!
//! A schema-driven dynamic form engine.
//!
//! This is the meta-crate that re-exports the sub-crates for convenient
//! access. You can depend on `dynform` to get everything, or depend on
//! individual crates for finer-grained control.
//!
//! ```
//! use dynform::prelude::*;
//!
//! let schema = FormSchema::from_json_str(r#"{"controls": [
//!     {"name": "password", "type": "password", "validators": {"minLength": 8}}
//! ]}"#).unwrap();
//! let mut form = DynamicForm::from_schema(schema, Settings::default());
//!
//! form.toggle_password("password").unwrap();
//! assert!(form.field("password").unwrap().show_password_icon);
//! ```

/// Error types, settings, settings loading and logging.
pub use dynform_core as core;

/// The form engine: schema, validators, controls, dependencies, interactions.
#[cfg(feature = "forms")]
pub use dynform_forms as forms;

/// Notification dispatcher used for form events.
#[cfg(feature = "signals")]
pub use dynform_signals as signals;

/// The `dynform` command-line tool.
#[cfg(feature = "cli")]
pub use dynform_cli as cli;

/// The types most users need.
pub mod prelude {
    pub use dynform_core::{FormError, FormResult, Settings, ValidationError};

    #[cfg(feature = "forms")]
    pub use dynform_forms::{
        DynamicForm, FieldOption, FieldSchema, FieldType, FormEvent, FormSchema, FormStatus, Value,
    };

    #[cfg(feature = "signals")]
    pub use dynform_signals::Signal;
}
