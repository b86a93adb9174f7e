//! Replay command handler

use super::{resolve_options, write_output};
use crate::commands::ReplayArgs;
use crate::config::CliConfig;
use crate::error::CliResult;
use crate::trace::{read_trace, TraceRecord};
use linecov::{Collector, CoverageConfig, CoverageSnapshot, ThreadTracer};

/// Drive `records` through a collector on the calling thread
#[must_use]
pub fn replay_records(config: CoverageConfig, records: &[TraceRecord]) -> CoverageSnapshot {
    let tracer = ThreadTracer::new();
    let mut collector = Collector::with_tracer(config, ThreadTracer::new());
    let _ = collector.start();
    for record in records {
        match record.as_event() {
            Some(event) => {
                let _ = tracer.emit(&event);
            }
            None => tracing::debug!(?record, "ignoring test marker during replay"),
        }
    }
    collector.stop()
}

/// Execute the replay command
pub fn execute_replay(config: &CliConfig, args: &ReplayArgs) -> CliResult<()> {
    let coverage = resolve_options(&args.collector)?.validate()?;
    let records = read_trace(&args.trace)?;
    tracing::info!(
        records = records.len(),
        root = coverage.root(),
        mode = %coverage.mode(),
        "replaying trace"
    );

    let snapshot = replay_records(coverage, &records);
    if args.summary && !config.verbosity.is_quiet() {
        let summary = snapshot.summary();
        eprintln!("{} files, {} lines", summary.files, summary.lines);
    }

    let mut json = serde_json::to_string_pretty(&snapshot)?;
    json.push('\n');
    write_output(args.output.as_deref(), &json)
}
