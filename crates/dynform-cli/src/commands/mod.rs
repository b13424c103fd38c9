//! Built-in commands.
//!
//! Each command implements the [`Command`](crate::command::Command) trait.

pub mod check;
pub mod encode;
pub mod validate;

pub use check::CheckCommand;
pub use encode::EncodeCommand;
pub use validate::ValidateCommand;

use crate::command::CommandRegistry;

/// Registers all built-in commands into the given registry.
pub fn register_builtin_commands(registry: &mut CommandRegistry) {
    registry.register(Box::new(CheckCommand));
    registry.register(Box::new(ValidateCommand));
    registry.register(Box::new(EncodeCommand));
}
