//! Coverage Accumulator
//!
//! The mutable map written by the event hook. Keys are interned once, on
//! first sight, and every later hit for the same file is a lookup by `&str`
//! with no allocation. Both record operations are idempotent: the same file
//! or the same line arriving again leaves the store unchanged.

use super::{CoverageMode, CoverageSnapshot, FileCoverage};
use std::collections::{BTreeSet, HashMap};

/// Live coverage accumulator
#[derive(Debug, Default)]
pub struct CoverageStore {
    files: HashMap<Box<str>, FileCoverage>,
}

impl CoverageStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a file as covered. No-op if the file already has an entry.
    #[inline]
    pub fn record_file(&mut self, path: &str) {
        if !self.files.contains_key(path) {
            let _ = self.files.insert(Box::from(path), FileCoverage::Touched);
        }
    }

    /// Add a line to a file's line set, creating the set on first sight.
    ///
    /// A bare file marker for the same path is upgraded to a line set.
    #[inline]
    pub fn record_line(&mut self, path: &str, line: u32) {
        if let Some(entry) = self.files.get_mut(path) {
            match entry {
                FileCoverage::Lines(lines) => {
                    let _ = lines.insert(line);
                }
                FileCoverage::Touched => *entry = FileCoverage::Lines(BTreeSet::from([line])),
            }
            return;
        }
        let _ = self
            .files
            .insert(Box::from(path), FileCoverage::Lines(BTreeSet::from([line])));
    }

    /// Record one in-scope hit with the granularity of `mode`
    #[inline]
    pub fn record(&mut self, mode: CoverageMode, path: &str, line: u32) {
        match mode {
            CoverageMode::Files => self.record_file(path),
            CoverageMode::Lines => self.record_line(path, line),
        }
    }

    /// Return the accumulated contents and leave this store empty
    #[must_use]
    pub fn snapshot_and_reset(&mut self) -> Self {
        std::mem::take(self)
    }

    /// Whether nothing has been recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Number of files recorded
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Whether a file has an entry
    #[must_use]
    pub fn contains_file(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    /// Entry for a file
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&FileCoverage> {
        self.files.get(path)
    }

    /// Approximate heap bytes held by keys and line sets
    #[must_use]
    pub fn heap_size(&self) -> usize {
        let entry = std::mem::size_of::<(Box<str>, FileCoverage)>();
        self.files
            .iter()
            .map(|(path, cov)| entry + path.len() + cov.line_count() * std::mem::size_of::<u32>())
            .sum()
    }

    /// Convert into the owned snapshot handed to callers
    #[must_use]
    pub fn into_snapshot(self) -> CoverageSnapshot {
        CoverageSnapshot::from_files(
            self.files
                .into_iter()
                .map(|(path, cov)| (String::from(path), cov))
                .collect(),
        )
    }
}

impl From<CoverageStore> for CoverageSnapshot {
    fn from(store: CoverageStore) -> Self {
        store.into_snapshot()
    }
}
