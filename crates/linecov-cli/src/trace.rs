//! Trace File Parsing
//!
//! A trace is a plain-text recording of host tracer events, one per line:
//!
//! ```text
//! # comment
//! /proj/src/a.rb:12        line event
//! ?:3                      line event with an unresolved file
//! @call /proj/src/a.rb:10  call event
//! @return /proj/src/a.rb:14
//! @test spec-1 spec/a_spec.rb
//! @end
//! ```
//!
//! The line number is taken after the last `:` so paths may contain colons.

use crate::error::{CliError, CliResult};
use linecov::coverage::EventKind;
use linecov::LineEvent;
use std::io::Read;
use std::path::Path;

/// One parsed trace entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceRecord {
    /// An execution event
    Event {
        /// Event kind
        kind: EventKind,
        /// Source file, `None` when unresolved
        file: Option<String>,
        /// Line number
        line: u32,
    },
    /// Start of a test
    TestStart {
        /// Test id
        id: String,
        /// Test source file relative to the root
        source: Option<String>,
    },
    /// End of the current test
    TestEnd,
}

impl TraceRecord {
    /// Borrow an execution record as a tracer event
    #[must_use]
    pub fn as_event(&self) -> Option<LineEvent<'_>> {
        match self {
            Self::Event { kind, file, line } => Some(LineEvent {
                kind: *kind,
                file: file.as_deref(),
                line: *line,
            }),
            Self::TestStart { .. } | Self::TestEnd => None,
        }
    }
}

fn parse_location(text: &str, lineno: usize) -> CliResult<(Option<String>, u32)> {
    let (file, line) = text
        .rsplit_once(':')
        .ok_or_else(|| CliError::trace(lineno, format!("expected <path>:<line>, got {text:?}")))?;
    let line = line
        .trim()
        .parse::<u32>()
        .map_err(|e| CliError::trace(lineno, format!("bad line number {line:?}: {e}")))?;
    let file = match file.trim() {
        "?" => None,
        "" => return Err(CliError::trace(lineno, "empty path")),
        path => Some(path.to_string()),
    };
    Ok((file, line))
}

/// Parse trace text into records
pub fn parse_trace(text: &str) -> CliResult<Vec<TraceRecord>> {
    let mut records = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        let lineno = idx + 1;
        let entry = raw.trim();
        if entry.is_empty() || entry.starts_with('#') {
            continue;
        }

        let record = if let Some(rest) = entry.strip_prefix('@').map(str::trim_start) {
            let mut parts = rest.split_whitespace();
            match parts.next() {
                Some("test") => {
                    let id = parts
                        .next()
                        .ok_or_else(|| CliError::trace(lineno, "@test needs an id"))?;
                    TraceRecord::TestStart {
                        id: id.to_string(),
                        source: parts.next().map(str::to_string),
                    }
                }
                Some("end") => TraceRecord::TestEnd,
                Some(directive @ ("call" | "return")) => {
                    let location = rest[directive.len()..].trim();
                    let (file, line) = parse_location(location, lineno)?;
                    let kind = if directive == "call" {
                        EventKind::Call
                    } else {
                        EventKind::Return
                    };
                    TraceRecord::Event { kind, file, line }
                }
                other => {
                    return Err(CliError::trace(
                        lineno,
                        format!("unknown directive @{}", other.unwrap_or_default()),
                    ))
                }
            }
        } else {
            let (file, line) = parse_location(entry, lineno)?;
            TraceRecord::Event {
                kind: EventKind::Line,
                file,
                line,
            }
        };
        records.push(record);
    }
    Ok(records)
}

/// Read a trace from a file, or from stdin when the path is `-`
pub fn read_trace(path: &Path) -> CliResult<Vec<TraceRecord>> {
    let text = if path.as_os_str() == "-" {
        let mut buf = String::new();
        let _ = std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(path)?
    };
    parse_trace(&text)
}
