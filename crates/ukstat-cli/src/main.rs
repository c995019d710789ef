//! UK area statistics CLI.

use clap::Parser;
use std::io::IsTerminal;
use ukstat_cli::logging::{LogConfig, LogFormat, init_logging};

mod cli;
mod commands;

use crate::cli::{Cli, Command, LogFormatArg};
use crate::commands::{run_census, run_classify, run_lookup, run_population, run_resolve};

fn main() {
    let cli = Cli::parse();
    init_logging(&log_config_from_cli(&cli));

    let result = match &cli.command {
        Command::Classify(args) => run_classify(args),
        Command::Resolve(args) => run_resolve(args),
        Command::Population(args) => run_population(args),
        Command::Census(args) => run_census(args),
        Command::Lookup(args) => run_lookup(args),
    };
    if let Err(error) = result {
        eprintln!("error: {error:#}");
        std::process::exit(1);
    }
}

fn log_config_from_cli(cli: &Cli) -> LogConfig {
    LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        use_env_filter: !cli.verbosity.is_present(),
        format: match cli.log_format {
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Compact => LogFormat::Compact,
            LogFormatArg::Json => LogFormat::Json,
        },
        with_ansi: std::io::stderr().is_terminal(),
    }
}
