//! Linecov CLI: replay line-execution traces into coverage
//!
//! ## Usage
//!
//! ```bash
//! linecov replay trace.txt --root /proj/src --mode lines
//! linecov tests trace.txt --root /proj --suite unit
//! ```

use clap::Parser;
use linecov_cli::{handlers, Cli, CliConfig, CliResult, Commands, Verbosity};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbosity: Verbosity) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.log_directive()));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();
    let config = CliConfig::new().with_verbosity(Verbosity::from_flags(cli.quiet, cli.verbose));
    init_tracing(config.verbosity);

    match cli.command {
        Commands::Replay(args) => handlers::execute_replay(&config, &args),
        Commands::Tests(args) => handlers::execute_tests(&config, &args),
    }
}
