//! Command framework for the `dynform` tool.
//!
//! A subcommand implements [`Command`]; a [`CommandRegistry`] collects them,
//! builds the clap parser, resolves the global `--settings` flag and
//! dispatches to the chosen command.
//!
//! ## Defining a Custom Command
//!
//! ```rust,no_run
//! use async_trait::async_trait;
//! use dynform_cli::command::Command;
//! use dynform_core::{FormError, Settings};
//!
//! struct StatsCommand;
//!
//! #[async_trait]
//! impl Command for StatsCommand {
//!     fn name(&self) -> &'static str { "stats" }
//!     fn help(&self) -> &'static str { "Count fields in a schema" }
//!
//!     async fn handle(
//!         &self,
//!         _matches: &clap::ArgMatches,
//!         _settings: &Settings,
//!     ) -> Result<(), FormError> {
//!         println!("0 fields");
//!         Ok(())
//!     }
//! }
//! ```

use std::collections::BTreeMap;
use std::ffi::OsString;

use async_trait::async_trait;
use dynform_core::{FormError, Settings};

/// A subcommand of the `dynform` tool.
#[async_trait]
pub trait Command: Send + Sync {
    /// The subcommand name.
    fn name(&self) -> &'static str;

    /// One-line description shown in `--help`.
    fn help(&self) -> &'static str;

    /// Declares the subcommand's arguments. Defaults to none.
    fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
        cmd
    }

    /// Runs the subcommand. Results go to stdout, progress to `tracing`.
    async fn handle(&self, matches: &clap::ArgMatches, settings: &Settings)
        -> Result<(), FormError>;
}

/// The set of subcommands, ordered by name.
#[derive(Default)]
pub struct CommandRegistry {
    commands: BTreeMap<&'static str, Box<dyn Command>>,
}

impl CommandRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a command, replacing any command with the same name.
    pub fn register(&mut self, command: Box<dyn Command>) {
        self.commands.insert(command.name(), command);
    }

    /// Returns the command with the given name.
    pub fn get(&self, name: &str) -> Option<&dyn Command> {
        self.commands.get(name).map(AsRef::as_ref)
    }

    /// Registered command names, sorted.
    pub fn list_commands(&self) -> Vec<&str> {
        self.commands.keys().copied().collect()
    }

    /// The number of registered commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Builds the clap parser: one subcommand per registered command plus
    /// the global `--settings` option.
    pub fn build_cli(&self) -> clap::Command {
        let app = clap::Command::new("dynform")
            .about("Check, validate, and feed dynamic form schemas")
            .subcommand_required(true)
            .arg(
                clap::Arg::new("settings")
                    .long("settings")
                    .global(true)
                    .help("Settings file (.toml or .json)"),
            );

        self.commands.values().fold(app, |app, cmd| {
            app.subcommand(cmd.add_arguments(clap::Command::new(cmd.name()).about(cmd.help())))
        })
    }

    /// Dispatches parsed arguments to the chosen subcommand.
    pub async fn execute(
        &self,
        matches: &clap::ArgMatches,
        settings: &Settings,
    ) -> Result<(), FormError> {
        let (name, sub_matches) = matches
            .subcommand()
            .ok_or_else(|| FormError::Configuration("No subcommand specified".to_string()))?;
        let cmd = self
            .get(name)
            .ok_or_else(|| FormError::Configuration(format!("Unknown command: {name}")))?;

        tracing::debug!(command = name, "dispatching");
        cmd.handle(sub_matches, settings).await
    }

    /// Parses `args`, loads the settings named by `--settings` and runs the
    /// chosen subcommand.
    ///
    /// # Errors
    ///
    /// Argument errors are reported as [`FormError::Configuration`] carrying
    /// clap's rendered message.
    pub async fn run_from<I, T>(&self, args: I) -> Result<(), FormError>
    where
        I: IntoIterator<Item = T> + Send,
        T: Into<OsString> + Clone + Send,
    {
        let matches = self
            .build_cli()
            .try_get_matches_from(args)
            .map_err(|e| FormError::Configuration(e.to_string()))?;
        let settings =
            crate::load_settings(matches.get_one::<String>("settings").map(String::as_str))?;
        self.execute(&matches, &settings).await
    }
}
