//! Source Root Scope Filter
//!
//! Decides whether an observed source path belongs to the measured tree.
//! Runs once per line event, so the check is a plain byte-prefix test:
//! no normalization, no symlink resolution, no case folding, and no
//! path-segment awareness (`/a/b` also admits `/a/bc`).

use std::rc::Rc;

/// Returns `true` when `filename` starts with `root` as a literal byte prefix.
///
/// An empty root admits every file.
#[inline]
#[must_use]
pub fn is_in_scope(root: &str, filename: &str) -> bool {
    filename.as_bytes().starts_with(root.as_bytes())
}

/// Prefix filter bound to a collector's root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathFilter {
    root: Rc<str>,
}

impl PathFilter {
    /// Create a filter for the given root prefix
    #[must_use]
    pub fn new(root: &str) -> Self {
        Self { root: Rc::from(root) }
    }

    /// Check an event's file against the root.
    ///
    /// An unresolved file (`None`) is never in scope.
    #[inline]
    #[must_use]
    pub fn admits(&self, filename: Option<&str>) -> bool {
        filename.is_some_and(|file| is_in_scope(&self.root, file))
    }

    /// The configured root prefix
    #[must_use]
    pub fn root(&self) -> &str {
        &self.root
    }
}
