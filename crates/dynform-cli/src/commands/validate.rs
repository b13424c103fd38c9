//! The `validate` command.
//!
//! Builds a form from a schema, feeds it a JSON object of values as user
//! input and prints the outcome of a submit as JSON: overall status, the
//! submitted values and the user-facing errors per field.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::Serialize;

use dynform_core::{FormError, Settings};
use dynform_forms::form::DynamicForm;
use dynform_forms::schema::FormSchema;
use dynform_forms::value::Value;
use dynform_forms::FormStatus;

use crate::command::Command;
use crate::commands::check::load_schema;

/// Validates a set of values against a schema.
pub struct ValidateCommand;

/// The outcome of validating values against a schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    /// Whether the form would submit.
    pub valid: bool,
    /// `VALID`, `INVALID` or `DISABLED`.
    pub status: String,
    /// Values of enabled controls.
    pub values: serde_json::Map<String, serde_json::Value>,
    /// User-facing messages of failing fields.
    pub errors: BTreeMap<String, Vec<String>>,
    /// Keys in the data that match no field.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ignored: Vec<String>,
}

/// Builds the form, applies `data` as user input and submits it.
///
/// # Errors
///
/// Returns [`FormError::Schema`] if `data` is not a JSON object.
pub fn validate_values(
    schema: FormSchema,
    data: &serde_json::Value,
    readonly: bool,
    settings: &Settings,
) -> Result<ValidationReport, FormError> {
    let object = data
        .as_object()
        .ok_or_else(|| FormError::Schema("values must be a JSON object".to_string()))?;

    let mut form = DynamicForm::new(settings.clone()).with_id("cli");
    form.set_readonly(readonly || settings.readonly);
    form.set_schema(schema);

    let mut ignored = Vec::new();
    for (name, value) in object {
        match form.input(name, Value::from(value.clone())) {
            Ok(()) => {}
            Err(FormError::UnknownField(_)) => {
                tracing::warn!(field = %name, "no such field, value ignored");
                ignored.push(name.clone());
            }
            Err(e) => return Err(e),
        }
    }

    let (values, errors) = match form.submit() {
        Ok(values) => (values, BTreeMap::new()),
        Err(errors) => (form.value(), errors.into_iter().collect()),
    };
    let status = match form.status() {
        FormStatus::Valid => "VALID",
        FormStatus::Invalid => "INVALID",
        FormStatus::Disabled => "DISABLED",
    };

    Ok(ValidationReport {
        valid: form.is_valid(),
        status: status.to_string(),
        values,
        errors,
        ignored,
    })
}

#[async_trait]
impl Command for ValidateCommand {
    fn name(&self) -> &'static str {
        "validate"
    }

    fn help(&self) -> &'static str {
        "Validate values against a form schema"
    }

    fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
        cmd.arg(
            clap::Arg::new("schema")
                .required(true)
                .help("Path to the schema JSON file"),
        )
        .arg(
            clap::Arg::new("data")
                .long("data")
                .short('d')
                .required(true)
                .help("Path to a JSON object of field values"),
        )
        .arg(
            clap::Arg::new("readonly")
                .long("readonly")
                .action(clap::ArgAction::SetTrue)
                .help("Build the form readonly"),
        )
    }

    async fn handle(
        &self,
        matches: &clap::ArgMatches,
        settings: &Settings,
    ) -> Result<(), FormError> {
        let schema_path = matches
            .get_one::<String>("schema")
            .ok_or_else(|| FormError::Configuration("No schema file given".to_string()))?;
        let data_path = matches
            .get_one::<String>("data")
            .ok_or_else(|| FormError::Configuration("No data file given".to_string()))?;

        let schema = load_schema(schema_path).await?;
        let data: serde_json::Value =
            serde_json::from_str(&tokio::fs::read_to_string(data_path).await?)?;

        let report = validate_values(schema, &data, matches.get_flag("readonly"), settings)?;
        println!("{}", serde_json::to_string_pretty(&report)?);
        tracing::info!(status = %report.status, errors = report.errors.len(), "validation finished");
        Ok(())
    }
}
