//! course-steps CLI
//!
//! ## Usage
//!
//! ```bash
//! course-steps list --filter section        # Sentences about sections
//! course-steps match 'I hide section "2"'   # Which definition, which captures
//! course-steps config check steps.yaml      # Validate delays and limits
//! ```

use clap::Parser;
use course_steps::StepRegistry;
use course_steps_cli::{
    handlers, logging, Cli, CliResult, Commands, ConfigArgs, ConfigSubcommand,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.quiet);

    let output = match cli.command {
        Commands::List(args) => {
            let registry = StepRegistry::new()?;
            handlers::list_definitions(&registry, args.filter.as_deref(), cli.color.should_color())?
        }
        Commands::Match(args) => {
            let registry = StepRegistry::new()?;
            let sentence = if args.strip_keyword {
                handlers::strip_keyword(&args.sentence)
            } else {
                args.sentence.as_str()
            };
            handlers::match_sentence(&registry, sentence)?
        }
        Commands::Config(ConfigArgs { subcommand }) => match subcommand {
            ConfigSubcommand::Show => handlers::config_show()?,
            ConfigSubcommand::Check { path, strings } => {
                handlers::config_check(&path, strings.as_deref())?
            }
        },
    };
    if !cli.quiet {
        print!("{output}");
    }
    Ok(())
}
