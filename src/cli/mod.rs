//! CLI command handlers
//!
//! Argument structures live in [`args`], dispatch in [`router`] and one
//! module per subcommand in [`commands`].

pub mod args;
pub mod commands;
pub mod router;

pub use args::{Cli, Commands, GlobalArgs, RunArgs};
pub use router::execute_command;
