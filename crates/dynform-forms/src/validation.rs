//! Whole-form validation.
//!
//! Controls validate themselves on every change; this module runs the rules
//! over a whole model at once and collects the outcome. Errors accumulate
//! rather than short-circuiting, so every failing field is reported.

use dynform_core::Settings;

use crate::bound_field::resolve_message;
use crate::control::FormModel;
use crate::schema::FieldSchema;

/// Re-validates every control and returns the names of failing ones.
pub fn validate_controls(model: &mut FormModel) -> Vec<String> {
    let mut failing = Vec::new();
    for control in model.iter_mut() {
        control.validate();
        if !control.errors().is_empty() {
            failing.push(control.name().to_string());
        }
    }
    failing
}

/// Validates the whole form.
///
/// # Returns
///
/// - `Ok(values)` with the values of enabled controls if every rule passes
/// - `Err(errors)` with a list of `(field_name, error_messages)` tuples,
///   messages resolved through the fields' `errorMessage` maps
pub fn full_clean(
    fields: &[FieldSchema],
    model: &mut FormModel,
    settings: &Settings,
) -> Result<serde_json::Map<String, serde_json::Value>, Vec<(String, Vec<String>)>> {
    let failing = validate_controls(model);
    if failing.is_empty() {
        return Ok(model.value());
    }

    let errors = failing
        .into_iter()
        .filter_map(|name| {
            let control = model.get(&name)?;
            let messages = match fields.iter().find(|f| f.name == name) {
                Some(field) => control
                    .errors()
                    .iter()
                    .map(|e| resolve_message(field, settings, e))
                    .collect(),
                None => control.errors().iter().map(|e| e.message.clone()).collect(),
            };
            Some((name, messages))
        })
        .collect();
    Err(errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build_model;
    use crate::schema::FieldType;
    use crate::value::Value;

    fn fields() -> Vec<FieldSchema> {
        vec![
            FieldSchema::new("name", FieldType::Text).validator("required", true),
            FieldSchema::new("email", FieldType::Email)
                .validator("required", true)
                .validator("email", true)
                .error_message("email", "Enter a valid email"),
        ]
    }

    #[test]
    fn test_errors_accumulate() {
        let fields = fields();
        let settings = Settings::default();
        let mut model = build_model(&fields, false, &settings);
        let failing = validate_controls(&mut model);
        assert_eq!(failing, vec!["name".to_string(), "email".to_string()]);
    }

    #[test]
    fn test_full_clean_valid() {
        let fields = fields();
        let settings = Settings::default();
        let mut model = build_model(&fields, false, &settings);
        model.get_mut("name").unwrap().set_value(Value::from("Asha"));
        model.get_mut("email").unwrap().set_value(Value::from("asha@example.com"));
        let values = full_clean(&fields, &mut model, &settings).unwrap();
        assert_eq!(values["email"], "asha@example.com");
    }

    #[test]
    fn test_full_clean_resolves_messages() {
        let fields = fields();
        let settings = Settings::default();
        let mut model = build_model(&fields, false, &settings);
        model.get_mut("name").unwrap().set_value(Value::from("Asha"));
        model.get_mut("email").unwrap().set_value(Value::from("not-an-email"));
        let errors = full_clean(&fields, &mut model, &settings).unwrap_err();
        assert_eq!(
            errors,
            vec![("email".to_string(), vec!["Enter a valid email".to_string()])]
        );
    }

    #[test]
    fn test_disabled_controls_skipped() {
        let fields = vec![FieldSchema::new("name", FieldType::Text)
            .validator("required", true)
            .disabled(true)];
        let settings = Settings::default();
        let mut model = build_model(&fields, false, &settings);
        assert!(full_clean(&fields, &mut model, &settings).unwrap().is_empty());
    }
}
