//! course-steps CLI library
//!
//! Inspection commands for the course editing step vocabulary: list the
//! registered sentences, resolve a sentence to its definition, and check a
//! YAML configuration file.

#![warn(missing_docs)]

mod commands;
mod error;
pub mod handlers;
pub mod logging;

pub use commands::{Cli, ColorArg, Commands, ConfigArgs, ConfigSubcommand, ListArgs, MatchArgs};
pub use error::{CliError, CliResult};
