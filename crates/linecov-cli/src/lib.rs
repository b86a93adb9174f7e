//! Linecov CLI Library
//!
//! Replays recorded line-execution traces through the `linecov` collector.

#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

mod commands;
mod config;
mod error;
pub mod handlers;
pub mod trace;

pub use commands::{Cli, CollectorArgs, Commands, ModeArg, ReplayArgs, TestsArgs};
pub use config::{CliConfig, Verbosity};
pub use error::{CliError, CliResult};
pub use trace::{parse_trace, read_trace, TraceRecord};
