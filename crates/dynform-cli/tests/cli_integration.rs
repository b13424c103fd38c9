//! Integration tests for the command registry and built-in commands.
//!
//! Each test parses a full `dynform` argument list, dispatches it through
//! the registry and checks the outcome.

use std::io::Write;

use dynform_cli::command::CommandRegistry;
use dynform_cli::commands::register_builtin_commands;
use dynform_core::{FormError, Settings};

fn registry() -> CommandRegistry {
    let mut registry = CommandRegistry::new();
    register_builtin_commands(&mut registry);
    registry
}

fn json_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

async fn run(args: &[&str]) -> Result<(), FormError> {
    let registry = registry();
    let matches = registry.build_cli().try_get_matches_from(args).unwrap();
    registry.execute(&matches, &Settings::default()).await
}

const SCHEMA: &str = r#"{"controls": [
    {"name": "firstName", "type": "text", "validators": {"required": true}},
    {"name": "startDate", "type": "date", "dependedChild": "endDate"},
    {"name": "endDate", "type": "date"}
]}"#;

#[tokio::test]
async fn test_check_clean_schema() {
    let schema = json_file(SCHEMA);
    assert!(run(&["dynform", "check", schema.path().to_str().unwrap()]).await.is_ok());
}

#[tokio::test]
async fn test_check_missing_file() {
    let result = run(&["dynform", "check", "/no/such/schema.json"]).await;
    assert!(matches!(result, Err(FormError::Io(_))));
}

#[tokio::test]
async fn test_validate_reports_without_failing() {
    let schema = json_file(SCHEMA);
    let data = json_file(r#"{"firstName": ""}"#);
    let result = run(&[
        "dynform",
        "validate",
        schema.path().to_str().unwrap(),
        "--data",
        data.path().to_str().unwrap(),
    ])
    .await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_validate_malformed_data() {
    let schema = json_file(SCHEMA);
    let data = json_file("{oops");
    let result = run(&[
        "dynform",
        "validate",
        schema.path().to_str().unwrap(),
        "--data",
        data.path().to_str().unwrap(),
    ])
    .await;
    assert!(matches!(result, Err(FormError::Serialization(_))));
}

#[test]
fn test_unknown_subcommand_rejected_by_parser() {
    let result = registry()
        .build_cli()
        .try_get_matches_from(["dynform", "runserver"]);
    assert!(result.is_err());
}
