//! The `check` command.
//!
//! Reads a form schema and reports caller mistakes: empty or duplicate
//! names, dangling or cyclic date dependencies, unknown field types and
//! unusable validator parameters. Fails only when an error-level issue is
//! found; the engine itself tolerates warnings.

use std::path::Path;

use async_trait::async_trait;
use dynform_core::{FormError, Settings};
use dynform_forms::schema::{check_schema, FormSchema, IssueLevel, SchemaIssue};

use crate::command::Command;

/// Checks a schema file for problems.
pub struct CheckCommand;

/// Loads a schema file and returns its issues.
pub async fn check_schema_file(path: impl AsRef<Path>) -> Result<Vec<SchemaIssue>, FormError> {
    let schema = load_schema(path).await?;
    Ok(check_schema(&schema))
}

/// Reads and parses a schema file.
pub async fn load_schema(path: impl AsRef<Path>) -> Result<FormSchema, FormError> {
    let text = tokio::fs::read_to_string(path.as_ref()).await?;
    FormSchema::from_json_str(&text)
}

#[async_trait]
impl Command for CheckCommand {
    fn name(&self) -> &'static str {
        "check"
    }

    fn help(&self) -> &'static str {
        "Check a form schema for problems"
    }

    fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
        cmd.arg(
            clap::Arg::new("schema")
                .required(true)
                .help("Path to the schema JSON file"),
        )
    }

    async fn handle(
        &self,
        matches: &clap::ArgMatches,
        _settings: &Settings,
    ) -> Result<(), FormError> {
        let path = matches
            .get_one::<String>("schema")
            .ok_or_else(|| FormError::Configuration("No schema file given".to_string()))?;
        let issues = check_schema_file(path).await?;

        if issues.is_empty() {
            println!("Schema check identified no issues");
            return Ok(());
        }

        let errors = issues.iter().filter(|i| i.level == IssueLevel::Error).count();
        let warnings = issues.len() - errors;

        for issue in &issues {
            println!("{} ({}) {}: {}", issue.level, issue.id, issue.field, issue.message);
        }
        tracing::info!(
            "Schema check identified {} issue(s) ({} error(s), {} warning(s))",
            issues.len(),
            errors,
            warnings
        );

        if errors > 0 {
            return Err(FormError::Schema(format!(
                "Schema check found {errors} error(s)"
            )));
        }
        Ok(())
    }
}
