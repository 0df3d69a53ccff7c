//! CLI command definitions using clap

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// course-steps: inspect the course editing step vocabulary
#[derive(Parser, Debug)]
#[command(name = "course-steps")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the registered step definitions
    List(ListArgs),

    /// Show which definition a sentence matches and what it captures
    Match(MatchArgs),

    /// Inspect step configuration
    Config(ConfigArgs),
}

/// Arguments for the list command
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Only definitions whose name or pattern contains this text
    #[arg(short, long)]
    pub filter: Option<String>,
}

/// Arguments for the match command
#[derive(Parser, Debug)]
pub struct MatchArgs {
    /// Sentence without its Given/When/Then keyword
    pub sentence: String,

    /// Strip a leading Given/When/Then/And/But keyword
    #[arg(long)]
    pub strip_keyword: bool,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub subcommand: ConfigSubcommand,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigSubcommand {
    /// Print the default configuration as YAML
    Show,

    /// Validate a YAML configuration file and print the effective values
    Check {
        /// Path to the configuration file
        path: PathBuf,

        /// YAML caption overrides (`component -> key -> text`) to validate
        #[arg(long)]
        strings: Option<PathBuf>,
    },
}

/// Color argument for CLI
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorArg {
    /// Auto-detect
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl ColorArg {
    /// Resolve against the terminal
    #[must_use]
    pub fn should_color(self) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Auto => console::Term::stdout().features().colors_supported(),
        }
    }
}
