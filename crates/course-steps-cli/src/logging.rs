//! Log output for the CLI.
//!
//! `RUST_LOG` wins when set; otherwise `-v` counts pick the level for the
//! step library.

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Level selected by `-q` and `-v` flags
#[must_use]
pub const fn level_for(verbose: u8, quiet: bool) -> Level {
    if quiet {
        return Level::ERROR;
    }
    match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Filter directive for the given flags
#[must_use]
pub fn default_directive(verbose: u8, quiet: bool) -> String {
    let level = level_for(verbose, quiet).to_string().to_ascii_lowercase();
    format!("course_steps={level},course_steps_cli={level}")
}

/// Install the global subscriber on stderr
pub fn init(verbose: u8, quiet: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose, quiet)));
    // A subscriber may already be installed when embedded; keep that one.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
