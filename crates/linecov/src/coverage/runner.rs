//! Per-Test Coverage Runner
//!
//! Wraps a [`Collector`] for test-impact analysis: coverage is collected
//! around each test, tagged with the test's identity and handed to a
//! [`CoverageWriter`]. Collection only happens when the backend settings turn
//! on both the runner and code coverage.

use super::{Collector, CollectorOptions, CoverageSnapshot};
use crate::result::{CoverageError, CoverageResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Settings key enabling the runner
pub const SETTINGS_ENABLED_KEY: &str = "itr_enabled";
/// Settings key enabling per-test code coverage
pub const SETTINGS_CODE_COVERAGE_KEY: &str = "code_coverage";

/// Interpret a loosely typed settings flag
fn flag(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s.eq_ignore_ascii_case("true") || s == "1",
        Some(Value::Number(n)) => n.as_u64() == Some(1),
        _ => false,
    }
}

/// Nest `source` under `root` with exactly one separator between them.
///
/// A leading separator on `source` does not make it escape the root.
fn join_under_root(root: &str, source: &str) -> String {
    let root = root.trim_end_matches('/');
    let source = source.trim_start_matches('/');
    if root.is_empty() {
        format!("/{source}")
    } else {
        format!("{root}/{source}")
    }
}

/// Feature flags controlling the runner
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunnerSettings {
    /// Runner enabled at all
    pub enabled: bool,
    /// Collect coverage per test (only honored when `enabled`)
    pub code_coverage: bool,
}

impl RunnerSettings {
    /// Both flags on
    #[must_use]
    pub const fn collecting() -> Self {
        Self {
            enabled: true,
            code_coverage: true,
        }
    }

    /// Read settings from a backend response.
    ///
    /// Accepts either the attributes object itself or the full
    /// `{"data": {"attributes": {...}}}` envelope.
    pub fn from_remote(value: &Value) -> CoverageResult<Self> {
        let attributes = value
            .pointer("/data/attributes")
            .unwrap_or(value)
            .as_object()
            .ok_or_else(|| CoverageError::invalid_settings("settings must be a JSON object"))?;

        let enabled = flag(attributes.get(SETTINGS_ENABLED_KEY));
        let code_coverage = enabled && flag(attributes.get(SETTINGS_CODE_COVERAGE_KEY));
        Ok(Self {
            enabled,
            code_coverage,
        })
    }

    /// Whether coverage should be collected
    #[must_use]
    pub const fn collects_coverage(&self) -> bool {
        self.enabled && self.code_coverage
    }
}

/// Identity of the test whose coverage is being collected
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestIdentity {
    /// Test id
    pub test_id: String,
    /// Owning suite id
    pub test_suite_id: String,
    /// Owning session id
    pub test_session_id: String,
    /// Test's own source file, relative to the root
    pub source_file: Option<String>,
}

impl TestIdentity {
    /// Create an identity without a source file
    #[must_use]
    pub fn new(
        test_id: impl Into<String>,
        test_suite_id: impl Into<String>,
        test_session_id: impl Into<String>,
    ) -> Self {
        Self {
            test_id: test_id.into(),
            test_suite_id: test_suite_id.into(),
            test_session_id: test_session_id.into(),
            source_file: None,
        }
    }

    /// Set the test's source file
    #[must_use]
    pub fn with_source_file(mut self, source_file: impl Into<String>) -> Self {
        self.source_file = Some(source_file.into());
        self
    }
}

/// Coverage collected for one test
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageEvent {
    /// Test id
    pub test_id: String,
    /// Owning suite id
    pub test_suite_id: String,
    /// Owning session id
    pub test_session_id: String,
    /// Files (and lines) the test executed
    pub coverage: CoverageSnapshot,
}

/// Sink for per-test coverage events
pub trait CoverageWriter {
    /// Accept one event
    fn write(&mut self, event: CoverageEvent);

    /// Flush and release resources
    fn stop(&mut self) {}
}

/// Writer that keeps events in memory
#[derive(Debug, Default)]
pub struct MemoryWriter {
    events: Vec<CoverageEvent>,
    stopped: bool,
}

impl MemoryWriter {
    /// Create an empty writer
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Events written so far
    #[must_use]
    pub fn events(&self) -> &[CoverageEvent] {
        &self.events
    }

    /// Whether `stop` was called
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }
}

impl CoverageWriter for MemoryWriter {
    fn write(&mut self, event: CoverageEvent) {
        self.events.push(event);
    }

    fn stop(&mut self) {
        self.stopped = true;
    }
}

/// Counters describing the runner's coverage activity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CoverageMetrics {
    /// Collections started
    pub started: u64,
    /// Collections finished
    pub finished: u64,
    /// Finished collections that recorded nothing
    pub empty: u64,
    /// Files reported across all events
    pub files: u64,
    /// Collector construction failures
    pub errors: u64,
}

/// Per-test coverage orchestration
#[derive(Debug)]
pub struct CoverageRunner<W: CoverageWriter> {
    options: CollectorOptions,
    settings: RunnerSettings,
    collector: Option<Collector>,
    writer: Option<W>,
    metrics: CoverageMetrics,
}

impl<W: CoverageWriter> CoverageRunner<W> {
    /// Create a runner. Coverage stays off until settings enable it.
    #[must_use]
    pub fn new(options: CollectorOptions, writer: Option<W>) -> Self {
        tracing::debug!("coverage runner initialized");
        Self {
            options,
            settings: RunnerSettings::default(),
            collector: None,
            writer,
            metrics: CoverageMetrics::default(),
        }
    }

    /// Apply settings, typically fetched from the backend
    pub fn configure(&mut self, settings: RunnerSettings) {
        self.settings = RunnerSettings {
            enabled: settings.enabled,
            code_coverage: settings.collects_coverage(),
        };
        tracing::debug!(
            enabled = self.settings.enabled,
            code_coverage = self.settings.code_coverage,
            "coverage runner configured"
        );
    }

    /// Whether the runner is enabled
    #[must_use]
    pub fn enabled(&self) -> bool {
        self.settings.enabled
    }

    /// Whether per-test coverage is collected
    #[must_use]
    pub fn code_coverage(&self) -> bool {
        self.settings.collects_coverage()
    }

    /// Begin collecting for the next test
    pub fn start_coverage(&mut self) {
        if !self.code_coverage() {
            return;
        }
        if self.collector.is_none() {
            match Collector::new(self.options.clone()) {
                Ok(collector) => self.collector = Some(collector),
                Err(err) => {
                    tracing::error!(
                        error = %err,
                        "failed to create coverage collector, code coverage will not be collected"
                    );
                    self.metrics.errors += 1;
                    self.settings.code_coverage = false;
                    return;
                }
            }
        }
        if let Some(collector) = self.collector.as_mut() {
            let _ = collector.start();
            self.metrics.started += 1;
        }
    }

    /// Finish collecting for `test` and write the resulting event
    pub fn stop_coverage(&mut self, test: &TestIdentity) -> Option<CoverageEvent> {
        if !self.code_coverage() {
            return None;
        }
        let collector = self.collector.as_mut()?;
        let mut coverage = collector.stop();
        self.metrics.finished += 1;
        if coverage.is_empty() {
            self.metrics.empty += 1;
        }

        if let Some(source) = test.source_file.as_deref() {
            let _ = coverage.insert_file(join_under_root(collector.root(), source));
        }
        self.metrics.files += coverage.len() as u64;

        let event = CoverageEvent {
            test_id: test.test_id.clone(),
            test_suite_id: test.test_suite_id.clone(),
            test_session_id: test.test_session_id.clone(),
            coverage,
        };
        tracing::debug!(test_id = %event.test_id, files = event.coverage.len(), "writing coverage event");

        if let Some(writer) = self.writer.as_mut() {
            writer.write(event.clone());
        }
        Some(event)
    }

    /// Stop the writer
    pub fn shutdown(&mut self) {
        if let Some(writer) = self.writer.as_mut() {
            writer.stop();
        }
    }

    /// Activity counters
    #[must_use]
    pub fn metrics(&self) -> CoverageMetrics {
        self.metrics
    }

    /// The writer, if one is configured
    #[must_use]
    pub fn writer(&self) -> Option<&W> {
        self.writer.as_ref()
    }
}
