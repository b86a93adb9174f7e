//! Coverage Collector
//!
//! Owns one live store and drives the hook lifecycle:
//!
//! ```text
//! Idle --start()--> Running --stop()--> Idle      (repeatable)
//! ```
//!
//! `start()` while running is a no-op (the hook is registered once).
//! `stop()` while idle returns an empty snapshot. Both are logged at debug
//! level and never fail.

use super::hook::EventHook;
use super::memory::StoreCell;
use super::thread_local::ThreadTracer;
use super::tracer::{EventKind, HookHandle, LineTracer};
use super::{CoverageSnapshot, PathFilter};
use crate::result::{CoverageError, CoverageResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::rc::Rc;
use std::str::FromStr;

/// Coverage granularity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoverageMode {
    /// Record which files executed
    #[default]
    Files,
    /// Record which lines of each file executed
    Lines,
}

impl CoverageMode {
    /// Option value naming this mode
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Files => "files",
            Self::Lines => "lines",
        }
    }
}

impl fmt::Display for CoverageMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CoverageMode {
    type Err = CoverageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "files" => Ok(Self::Files),
            "lines" => Ok(Self::Lines),
            other => Err(CoverageError::invalid_mode(other)),
        }
    }
}

/// Unvalidated collector options, as read from a config file or an embedder.
///
/// Only `root` and `mode` are read; other keys are ignored so a shared
/// settings map can be passed through unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectorOptions {
    /// Absolute path prefix of the measured sources (required)
    pub root: Option<String>,
    /// `files` (default) or `lines`
    pub mode: Option<String>,
}

impl CollectorOptions {
    /// Empty options
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the root prefix
    #[must_use]
    pub fn root(mut self, root: impl Into<String>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// Set the mode by name
    #[must_use]
    pub fn mode(mut self, mode: impl Into<String>) -> Self {
        self.mode = Some(mode.into());
        self
    }

    /// Parse options from YAML
    pub fn from_yaml_str(yaml: &str) -> CoverageResult<Self> {
        Ok(serde_yaml_ng::from_str(yaml)?)
    }

    /// Parse options from JSON
    pub fn from_json_str(json: &str) -> CoverageResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load options from a YAML (or JSON, which YAML accepts) file
    pub fn from_file(path: impl AsRef<Path>) -> CoverageResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    /// Overlay `other` on top of these options; set fields in `other` win
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        Self {
            root: other.root.or(self.root),
            mode: other.mode.or(self.mode),
        }
    }

    /// Validate into a collector configuration
    pub fn validate(&self) -> CoverageResult<CoverageConfig> {
        let root = self.root.clone().ok_or(CoverageError::MissingRoot)?;
        let mode = self
            .mode
            .as_deref()
            .map_or(Ok(CoverageMode::Files), CoverageMode::from_str)?;
        Ok(CoverageConfig { root, mode })
    }
}

/// Validated collector configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoverageConfig {
    root: String,
    mode: CoverageMode,
}

impl CoverageConfig {
    /// Create a builder for coverage config
    #[must_use]
    pub fn builder() -> CoverageConfigBuilder {
        CoverageConfigBuilder::default()
    }

    /// Root prefix
    #[must_use]
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Coverage granularity
    #[must_use]
    pub fn mode(&self) -> CoverageMode {
        self.mode
    }
}

impl TryFrom<CollectorOptions> for CoverageConfig {
    type Error = CoverageError;

    fn try_from(options: CollectorOptions) -> Result<Self, Self::Error> {
        options.validate()
    }
}

/// Builder for coverage configuration
#[derive(Debug, Default)]
pub struct CoverageConfigBuilder {
    root: Option<String>,
    mode: CoverageMode,
}

impl CoverageConfigBuilder {
    /// Set the root prefix
    #[must_use]
    pub fn root(mut self, root: impl Into<String>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// Set the coverage granularity
    #[must_use]
    pub fn mode(mut self, mode: CoverageMode) -> Self {
        self.mode = mode;
        self
    }

    /// Build the configuration
    pub fn build(self) -> CoverageResult<CoverageConfig> {
        Ok(CoverageConfig {
            root: self.root.ok_or(CoverageError::MissingRoot)?,
            mode: self.mode,
        })
    }
}

/// Coverage collector for one measurement session at a time
///
/// Generic over the host tracer; [`ThreadTracer`] is the default adapter.
/// The collector is not `Send`: its hook is bound to the thread that called
/// [`start`](Self::start).
pub struct Collector<T: LineTracer = ThreadTracer> {
    config: CoverageConfig,
    filter: PathFilter,
    store: Rc<StoreCell>,
    tracer: T,
    handle: Option<HookHandle>,
}

impl Collector<ThreadTracer> {
    /// Create a collector on the thread-local tracer
    pub fn new(options: CollectorOptions) -> CoverageResult<Self> {
        Ok(Self::with_tracer(options.validate()?, ThreadTracer::new()))
    }
}

impl<T: LineTracer> Collector<T> {
    /// Create a collector that registers with `tracer`
    #[must_use]
    pub fn with_tracer(config: CoverageConfig, tracer: T) -> Self {
        Self {
            filter: PathFilter::new(config.root()),
            config,
            store: StoreCell::new_owned(),
            tracer,
            handle: None,
        }
    }

    /// Begin collecting on the calling thread
    pub fn start(&mut self) -> &mut Self {
        if let Some(handle) = self.handle {
            tracing::debug!(%handle, "coverage collector already running");
            return self;
        }
        let hook = EventHook::new(
            self.filter.clone(),
            self.config.mode(),
            StoreCell::observer(&self.store),
        );
        let handle = self.tracer.subscribe(EventKind::Line, hook.into_callback());
        tracing::debug!(%handle, root = self.config.root(), mode = %self.config.mode(), "coverage started");
        self.handle = Some(handle);
        self
    }

    /// Stop collecting and hand back everything recorded since `start`.
    ///
    /// The collector is left idle with an empty store.
    pub fn stop(&mut self) -> CoverageSnapshot {
        match self.handle.take() {
            Some(handle) => {
                if !self.tracer.unsubscribe(handle) {
                    tracing::debug!(%handle, "coverage hook was already removed");
                }
            }
            None => tracing::debug!("coverage stop called while idle"),
        }
        let snapshot = self.store.take().into_snapshot();
        tracing::debug!(files = snapshot.len(), "coverage stopped");
        snapshot
    }

    /// Whether the hook is registered
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// Configured root prefix
    #[must_use]
    pub fn root(&self) -> &str {
        self.config.root()
    }

    /// Configured granularity
    #[must_use]
    pub fn mode(&self) -> CoverageMode {
        self.config.mode()
    }

    /// Validated configuration
    #[must_use]
    pub fn config(&self) -> &CoverageConfig {
        &self.config
    }

    /// Approximate bytes held by the live store
    #[must_use]
    pub fn footprint(&self) -> usize {
        self.store.footprint()
    }

    /// Files recorded since the last `stop`
    #[must_use]
    pub fn pending_files(&self) -> usize {
        self.store.file_count()
    }
}

impl<T: LineTracer> Drop for Collector<T> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = self.tracer.unsubscribe(handle);
        }
    }
}

impl<T: LineTracer> fmt::Debug for Collector<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collector")
            .field("config", &self.config)
            .field("handle", &self.handle)
            .field("pending_files", &self.pending_files())
            .finish_non_exhaustive()
    }
}
