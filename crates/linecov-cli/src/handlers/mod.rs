//! Command handlers - extracted from main.rs for testability

pub mod replay;
pub mod session;

pub use replay::{execute_replay, replay_records};
pub use session::{execute_tests, run_session, SessionReport};

use crate::commands::CollectorArgs;
use crate::error::{CliError, CliResult};
use linecov::{CollectorOptions, CoverageMode};
use std::io::Write;
use std::path::Path;

/// Merge the optional config file with command-line flags; flags win
pub fn resolve_options(args: &CollectorArgs) -> CliResult<CollectorOptions> {
    let base = match &args.config {
        Some(path) => CollectorOptions::from_file(path)
            .map_err(|e| CliError::config(format!("{}: {e}", path.display())))?,
        None => CollectorOptions::new(),
    };
    let mut flags = CollectorOptions::new();
    flags.root.clone_from(&args.root);
    flags.mode = args.mode.map(|m| CoverageMode::from(m).as_str().to_string());
    Ok(base.merge(flags))
}

/// Write `text` to `output`, or stdout when no path is given
pub fn write_output(output: Option<&Path>, text: &str) -> CliResult<()> {
    match output {
        Some(path) => std::fs::write(path, text)?,
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(text.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}
