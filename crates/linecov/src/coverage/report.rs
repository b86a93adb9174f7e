//! Coverage Snapshots
//!
//! The owned value handed to the caller by [`Collector::stop`]. Serializes to
//! the same shape consumers expect from the collector: a map from file path to
//! `true` (files mode) or to an ascending array of line numbers (lines mode).
//!
//! [`Collector::stop`]: super::Collector::stop

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Coverage recorded for one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "FileCoverageRepr", into = "FileCoverageRepr")]
pub enum FileCoverage {
    /// The file executed at least one line (files mode)
    Touched,
    /// The distinct lines that executed (lines mode)
    Lines(BTreeSet<u32>),
}

impl FileCoverage {
    /// Line numbers, if this entry carries per-line detail
    #[must_use]
    pub fn lines(&self) -> Option<&BTreeSet<u32>> {
        match self {
            Self::Touched => None,
            Self::Lines(lines) => Some(lines),
        }
    }

    /// Number of distinct lines (zero for a bare file marker)
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.lines().map_or(0, BTreeSet::len)
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum FileCoverageRepr {
    Flag(bool),
    Lines(BTreeSet<u32>),
}

impl TryFrom<FileCoverageRepr> for FileCoverage {
    type Error = String;

    fn try_from(repr: FileCoverageRepr) -> Result<Self, Self::Error> {
        match repr {
            FileCoverageRepr::Flag(true) => Ok(Self::Touched),
            FileCoverageRepr::Flag(false) => {
                Err("uncovered files are not part of a snapshot".to_string())
            }
            FileCoverageRepr::Lines(lines) if lines.is_empty() => {
                Err("line coverage must name at least one line".to_string())
            }
            FileCoverageRepr::Lines(lines) => Ok(Self::Lines(lines)),
        }
    }
}

impl From<FileCoverage> for FileCoverageRepr {
    fn from(coverage: FileCoverage) -> Self {
        match coverage {
            FileCoverage::Touched => Self::Flag(true),
            FileCoverage::Lines(lines) => Self::Lines(lines),
        }
    }
}

/// Summary counts for a snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageSummary {
    /// Number of covered files
    pub files: usize,
    /// Number of distinct covered lines across all files
    pub lines: usize,
}

/// Coverage gathered during one start/stop session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CoverageSnapshot {
    files: BTreeMap<String, FileCoverage>,
}

impl CoverageSnapshot {
    /// Create an empty snapshot
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_files(files: BTreeMap<String, FileCoverage>) -> Self {
        Self { files }
    }

    /// Whether no file was covered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Number of covered files
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether the given path was covered
    #[must_use]
    pub fn contains_file(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    /// Coverage entry for a path
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&FileCoverage> {
        self.files.get(path)
    }

    /// Covered lines for a path (lines mode only)
    #[must_use]
    pub fn lines(&self, path: &str) -> Option<&BTreeSet<u32>> {
        self.get(path).and_then(FileCoverage::lines)
    }

    /// Iterate over covered files in path order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FileCoverage)> {
        self.files.iter().map(|(path, cov)| (path.as_str(), cov))
    }

    /// Covered paths in order
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    /// Mark a file as covered unless it already has an entry.
    ///
    /// Returns `true` if the file was added.
    pub fn insert_file(&mut self, path: impl Into<String>) -> bool {
        let path = path.into();
        if self.files.contains_key(&path) {
            return false;
        }
        let _ = self.files.insert(path, FileCoverage::Touched);
        true
    }

    /// File and line counts
    #[must_use]
    pub fn summary(&self) -> CoverageSummary {
        CoverageSummary {
            files: self.files.len(),
            lines: self.files.values().map(FileCoverage::line_count).sum(),
        }
    }

    /// Take the underlying path map
    #[must_use]
    pub fn into_files(self) -> BTreeMap<String, FileCoverage> {
        self.files
    }
}

impl<'a> IntoIterator for &'a CoverageSnapshot {
    type Item = (&'a String, &'a FileCoverage);
    type IntoIter = std::collections::btree_map::Iter<'a, String, FileCoverage>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.iter()
    }
}
