//! CLI command definitions using clap

use clap::{Args, Parser, Subcommand, ValueEnum};
use linecov::CoverageMode;
use std::path::PathBuf;

/// Linecov: replay line-execution traces into coverage snapshots
#[derive(Parser, Debug)]
#[command(name = "linecov")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replay a trace through one collector and print the snapshot
    Replay(ReplayArgs),

    /// Replay a trace with @test markers and print one coverage event per test
    Tests(TestsArgs),
}

/// Coverage mode argument
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModeArg {
    /// Record covered files
    Files,
    /// Record covered lines per file
    Lines,
}

impl From<ModeArg> for CoverageMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Files => Self::Files,
            ModeArg::Lines => Self::Lines,
        }
    }
}

/// Collector options shared by every subcommand
#[derive(Args, Debug, Clone, Default)]
pub struct CollectorArgs {
    /// Source root prefix; only files starting with it are recorded
    #[arg(short, long, env = "LINECOV_ROOT")]
    pub root: Option<String>,

    /// Coverage granularity
    #[arg(short, long, value_enum)]
    pub mode: Option<ModeArg>,

    /// YAML or JSON file with `root` and `mode`; flags override it
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Arguments for the replay command
#[derive(Parser, Debug)]
pub struct ReplayArgs {
    /// Trace file (`path:line` per line), or `-` for stdin
    pub trace: PathBuf,

    /// Collector options
    #[command(flatten)]
    pub collector: CollectorArgs,

    /// Write the snapshot here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Print file and line counts to stderr
    #[arg(long)]
    pub summary: bool,
}

/// Arguments for the tests command
#[derive(Parser, Debug)]
pub struct TestsArgs {
    /// Trace file with `@test <id> [source]` and `@end` markers, or `-` for stdin
    pub trace: PathBuf,

    /// Collector options
    #[command(flatten)]
    pub collector: CollectorArgs,

    /// Suite id attached to every event
    #[arg(long, default_value = "default")]
    pub suite: String,

    /// Session id attached to every event (random if omitted)
    #[arg(long)]
    pub session: Option<String>,

    /// JSON settings response with `itr_enabled` and `code_coverage` flags
    /// (both on if omitted)
    #[arg(long)]
    pub settings: Option<PathBuf>,

    /// Write events here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_replay() {
        let cli = Cli::parse_from([
            "linecov", "replay", "trace.txt", "--root", "/proj", "--mode", "lines",
        ]);
        match cli.command {
            Commands::Replay(args) => {
                assert_eq!(args.collector.root.as_deref(), Some("/proj"));
                assert_eq!(args.collector.mode, Some(ModeArg::Lines));
                assert_eq!(args.trace, PathBuf::from("trace.txt"));
            }
            Commands::Tests(_) => panic!("expected replay"),
        }
    }

    #[test]
    fn test_parse_tests_defaults() {
        let cli = Cli::parse_from(["linecov", "-vv", "tests", "-", "--root", "/p"]);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Tests(args) => {
                assert_eq!(args.suite, "default");
                assert!(args.session.is_none());
            }
            Commands::Replay(_) => panic!("expected tests"),
        }
    }

    #[test]
    fn test_mode_arg_maps_to_mode() {
        assert_eq!(CoverageMode::from(ModeArg::Lines), CoverageMode::Lines);
        assert_eq!(CoverageMode::from(ModeArg::Files), CoverageMode::Files);
    }
}
