//! The `dynform` binary.
//!
//! ```bash
//! dynform check schema.json
//! dynform validate schema.json --data values.json --readonly
//! dynform encode photo.png --settings dynform.toml
//! ```

use std::process::ExitCode;

use tracing::Instrument;

use dynform_cli::command::CommandRegistry;
use dynform_cli::commands::register_builtin_commands;
use dynform_cli::load_settings;
use dynform_core::logging::{form_span, setup_logging};

#[tokio::main]
async fn main() -> ExitCode {
    let mut registry = CommandRegistry::new();
    register_builtin_commands(&mut registry);

    let matches = registry.build_cli().get_matches();

    let settings = match load_settings(matches.get_one::<String>("settings").map(String::as_str)) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };
    setup_logging(&settings);

    let span = form_span(matches.subcommand_name().unwrap_or("dynform"));

    match registry.execute(&matches, &settings).instrument(span).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
