//! Line Coverage Collection
//!
//! Exact, in-memory coverage for one logical run, fed by a host runtime's
//! per-thread line tracer.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │  LINECOV COLLECTION PIPELINE                                     │
//! ├──────────────────────────────────────────────────────────────────┤
//! │  Host tracer ──LineEvent──► EventHook ──► PathFilter             │
//! │       ▲                        │                                 │
//! │       │ subscribe/unsubscribe  ▼                                 │
//! │   Collector ──owns──► StoreCell ──► CoverageStore                │
//! │       │                                                          │
//! │       └──stop()──► CoverageSnapshot (owned by the caller)        │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The hook is the hot path: it runs inline on the observed thread for every
//! executed line and must never block, log or fail.

mod collector;
mod filter;
mod hook;
mod memory;
mod report;
mod runner;
mod store;
mod thread_local;
mod tracer;

pub use collector::{Collector, CollectorOptions, CoverageConfig, CoverageConfigBuilder, CoverageMode};
pub use filter::{is_in_scope, PathFilter};
pub use hook::EventHook;
pub use memory::StoreCell;
pub use report::{CoverageSnapshot, CoverageSummary, FileCoverage};
pub use runner::{
    CoverageEvent, CoverageMetrics, CoverageRunner, CoverageWriter, MemoryWriter, RunnerSettings,
    TestIdentity, SETTINGS_CODE_COVERAGE_KEY, SETTINGS_ENABLED_KEY,
};
pub use store::CoverageStore;
pub use thread_local::ThreadTracer;
pub use tracer::{EventKind, HookFn, HookHandle, LineEvent, LineTracer};
