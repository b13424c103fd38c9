//! Per-field interaction primitives.
//!
//! These are the pieces of the interaction handlers that do not need the
//! whole form: flipping password visibility on a field, decoding photo
//! source tags, and the payloads of search-bridge events. The form-level
//! orchestration lives on [`DynamicForm`](crate::form::DynamicForm).

use serde::{Deserialize, Serialize};

use crate::schema::{FieldSchema, FieldType};

/// Flips a field between masked and plain text.
///
/// `password` becomes `text`, and a revealed password (a `text` field with
/// `show_password_icon` set) becomes `password` again. The first toggle sets
/// `show_password_icon`, which then stays set. Returns `false` (and changes
/// nothing) for every other field, plain text fields included.
pub fn toggle_password(field: &mut FieldSchema) -> bool {
    field.field_type = match field.field_type {
        FieldType::Password => FieldType::Text,
        FieldType::Text if field.show_password_icon => FieldType::Password,
        _ => return false,
    };
    field.show_password_icon = true;
    true
}

/// Source tag of a photo action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhotoAction {
    /// Open the file picker.
    AddPhoto,
    /// Open the file picker with the camera capture hint.
    Camera,
    /// Clear the photo.
    RemovePhoto,
}

impl PhotoAction {
    /// Decodes a source tag. Unrecognized tags yield `None`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "ADD_PHOTO" => Some(Self::AddPhoto),
            "CAMERA" => Some(Self::Camera),
            "REMOVE_PHOTO" => Some(Self::RemovePhoto),
            _ => None,
        }
    }

    /// The wire tag.
    pub const fn as_tag(self) -> &'static str {
        match self {
            Self::AddPhoto => "ADD_PHOTO",
            Self::Camera => "CAMERA",
            Self::RemovePhoto => "REMOVE_PHOTO",
        }
    }

    /// Whether the picker should prefer the device camera.
    pub const fn capture(self) -> bool {
        matches!(self, Self::Camera)
    }
}

/// A selection made in an external search component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchEvent {
    /// Correlation id of the search sub-component.
    pub id: String,
    /// Whatever the search component produced.
    #[serde(default)]
    pub data: serde_json::Value,
}

impl SearchEvent {
    /// Creates a search event.
    pub fn new(id: impl Into<String>, data: impl Into<serde_json::Value>) -> Self {
        Self {
            id: id.into(),
            data: data.into(),
        }
    }
}

/// A search event matched to a live control, forwarded to the owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgedSearchEvent {
    /// Correlation id the event arrived with.
    pub id: String,
    /// The search payload, untouched.
    pub data: serde_json::Value,
    /// Name of the matched control.
    pub form_control: String,
    /// The matched control's current value.
    pub value: serde_json::Value,
}

/// Finds the field a search event is addressed to.
pub fn find_search_target<'a>(fields: &'a [FieldSchema], id: &str) -> Option<&'a FieldSchema> {
    fields.iter().find(|f| f.search_id() == id)
}
