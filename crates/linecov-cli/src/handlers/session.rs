//! Tests command handler
//!
//! Replays a trace with `@test`/`@end` markers through a [`CoverageRunner`],
//! producing one coverage event per test as a JSON line.

use super::{resolve_options, write_output};
use crate::commands::TestsArgs;
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::trace::{read_trace, TraceRecord};
use linecov::coverage::{CoverageMetrics, MemoryWriter, RunnerSettings, TestIdentity};
use linecov::{CollectorOptions, CoverageEvent, CoverageRunner, ThreadTracer};
use std::path::Path;

/// Outcome of a replayed test session
#[derive(Debug)]
pub struct SessionReport {
    /// One event per finished test, in trace order
    pub events: Vec<CoverageEvent>,
    /// Runner counters
    pub metrics: CoverageMetrics,
}

/// Load runner settings from a JSON file
fn load_settings(path: &Path) -> CliResult<RunnerSettings> {
    let text = std::fs::read_to_string(path)?;
    let value: serde_json::Value = serde_json::from_str(&text)?;
    RunnerSettings::from_remote(&value)
        .map_err(|e| CliError::config(format!("{}: {e}", path.display())))
}

/// Run every test in `records` under a coverage runner
#[must_use]
pub fn run_session(
    options: CollectorOptions,
    settings: RunnerSettings,
    suite: &str,
    session: &str,
    records: &[TraceRecord],
) -> SessionReport {
    let tracer = ThreadTracer::new();
    let mut runner = CoverageRunner::new(options, Some(MemoryWriter::new()));
    runner.configure(settings);

    let mut current: Option<TestIdentity> = None;
    for record in records {
        match record {
            TraceRecord::TestStart { id, source } => {
                if let Some(open) = current.take() {
                    tracing::warn!(test_id = %open.test_id, "test not closed with @end");
                    let _ = runner.stop_coverage(&open);
                }
                let mut test = TestIdentity::new(id.as_str(), suite, session);
                if let Some(source) = source {
                    test = test.with_source_file(source.as_str());
                }
                runner.start_coverage();
                current = Some(test);
            }
            TraceRecord::TestEnd => match current.take() {
                Some(test) => {
                    let _ = runner.stop_coverage(&test);
                }
                None => tracing::warn!("@end outside of a test"),
            },
            TraceRecord::Event { .. } => {
                if let Some(event) = record.as_event() {
                    let _ = tracer.emit(&event);
                }
            }
        }
    }
    if let Some(open) = current.take() {
        tracing::warn!(test_id = %open.test_id, "trace ended inside a test");
        let _ = runner.stop_coverage(&open);
    }
    runner.shutdown();

    SessionReport {
        events: runner
            .writer()
            .map(|writer| writer.events().to_vec())
            .unwrap_or_default(),
        metrics: runner.metrics(),
    }
}

/// Execute the tests command
pub fn execute_tests(config: &CliConfig, args: &TestsArgs) -> CliResult<()> {
    let options = resolve_options(&args.collector)?;
    // Surface bad options as errors here; the runner would only log them.
    let _ = options.validate()?;
    let settings = match &args.settings {
        Some(path) => load_settings(path)?,
        None => RunnerSettings::collecting(),
    };
    let session = args
        .session
        .clone()
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let records = read_trace(&args.trace)?;
    tracing::info!(%session, suite = %args.suite, records = records.len(), "running test session");

    let report = run_session(options, settings, &args.suite, &session, &records);
    if config.verbosity.is_verbose() {
        let m = report.metrics;
        eprintln!(
            "{} tests, {} empty, {} files, {} errors",
            m.finished, m.empty, m.files, m.errors
        );
    }

    let mut out = String::new();
    for event in &report.events {
        out.push_str(&serde_json::to_string(event)?);
        out.push('\n');
    }
    write_output(args.output.as_deref(), &out)
}
