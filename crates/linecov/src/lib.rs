//! Linecov: Runtime Line Coverage Collection
//!
//! Linecov attaches to a language runtime's line-execution tracer, watches
//! every executed source line during a measurement window, and accumulates
//! which files (or which file and line pairs) under a source root were
//! touched. An embedding test tool starts a [`Collector`] before a unit of
//! work and stops it afterwards to obtain a [`CoverageSnapshot`].
//!
//! ```
//! use linecov::prelude::*;
//!
//! let mut collector = Collector::new(CollectorOptions::new().root("/proj/src").mode("lines"))?;
//! collector.start();
//!
//! let tracer = ThreadTracer::new();
//! tracer.emit_line("/proj/src/a.rb", 1);
//! tracer.emit_line("/proj/src/a.rb", 2);
//! tracer.emit_line("/other/b.rb", 5);
//!
//! let snapshot = collector.stop();
//! assert_eq!(serde_json::to_string(&snapshot)?, r#"{"/proj/src/a.rb":[1,2]}"#);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]

/// Coverage collection engine: tracer seam, hook, store and lifecycle
pub mod coverage;

mod result;

pub use coverage::{
    Collector, CollectorOptions, CoverageConfig, CoverageEvent, CoverageMode, CoverageRunner,
    CoverageSnapshot, CoverageStore, FileCoverage, LineEvent, LineTracer, ThreadTracer,
};
pub use result::{CoverageError, CoverageResult};

/// Prelude for convenient imports
pub mod prelude {
    pub use super::coverage::{
        Collector, CollectorOptions, CoverageConfig, CoverageMode, CoverageSnapshot, EventKind,
        FileCoverage, LineEvent, LineTracer, ThreadTracer,
    };
    pub use super::result::{CoverageError, CoverageResult};
}
