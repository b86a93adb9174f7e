//! Line Event Hook
//!
//! The callback a collector registers with its tracer. This is the hot path:
//! it runs inline, on the observed program's own stack, once per executed
//! line. It never allocates for a file it has already seen, never logs, and
//! never fails; anything it cannot resolve is dropped as a missed event.

use super::memory::StoreCell;
use super::tracer::{HookFn, LineEvent};
use super::{CoverageMode, PathFilter};
use std::rc::Weak;

/// Event hook bound to one collector's root, mode and store
#[derive(Debug, Clone)]
pub struct EventHook {
    filter: PathFilter,
    mode: CoverageMode,
    store: Weak<StoreCell>,
}

impl EventHook {
    /// Bind a hook to a store it does not own
    #[must_use]
    pub fn new(filter: PathFilter, mode: CoverageMode, store: Weak<StoreCell>) -> Self {
        Self {
            filter,
            mode,
            store,
        }
    }

    /// Handle one event.
    ///
    /// Returns `true` if the event was recorded.
    #[inline]
    pub fn on_event(&self, event: &LineEvent<'_>) -> bool {
        let Some(file) = event.file.filter(|_| self.filter.admits(event.file)) else {
            return false;
        };
        let line = match self.mode {
            CoverageMode::Files => event.line,
            CoverageMode::Lines => match event.line_number() {
                Some(line) => line,
                None => return false,
            },
        };
        let Some(store) = self.store.upgrade() else {
            return false;
        };
        store
            .with_store(|store| store.record(self.mode, file, line))
            .is_some()
    }

    /// Box this hook as a tracer callback
    #[must_use]
    pub fn into_callback(self) -> HookFn {
        Box::new(move |event| {
            let _ = self.on_event(event);
        })
    }

    /// Mode this hook records in
    #[must_use]
    pub fn mode(&self) -> CoverageMode {
        self.mode
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coverage::FileCoverage;
    use std::rc::Rc;

    fn hook(root: &str, mode: CoverageMode) -> (Rc<StoreCell>, EventHook) {
        let cell = StoreCell::new_owned();
        let hook = EventHook::new(PathFilter::new(root), mode, StoreCell::observer(&cell));
        (cell, hook)
    }

    #[test]
    fn test_files_mode_records_presence() {
        let (cell, hook) = hook("/proj/src", CoverageMode::Files);
        assert!(hook.on_event(&LineEvent::line("/proj/src/a.rb", 1)));
        assert!(hook.on_event(&LineEvent::line("/proj/src/a.rb", 2)));

        let store = cell.take();
        assert_eq!(store.file_count(), 1);
        assert_eq!(store.get("/proj/src/a.rb"), Some(&FileCoverage::Touched));
    }

    #[test]
    fn test_lines_mode_records_lines() {
        let (cell, hook) = hook("/proj/src", CoverageMode::Lines);
        let _ = hook.on_event(&LineEvent::line("/proj/src/a.rb", 1));
        let _ = hook.on_event(&LineEvent::line("/proj/src/a.rb", 1));
        let _ = hook.on_event(&LineEvent::line("/proj/src/a.rb", 2));

        let store = cell.take();
        assert_eq!(store.get("/proj/src/a.rb").unwrap().line_count(), 2);
    }

    #[test]
    fn test_out_of_scope_is_ignored() {
        let (cell, hook) = hook("/proj/src", CoverageMode::Lines);
        assert!(!hook.on_event(&LineEvent::line("/other/b.rb", 5)));
        assert!(cell.take().is_empty());
    }

    #[test]
    fn test_unresolved_file_is_ignored() {
        let (cell, hook) = hook("", CoverageMode::Files);
        assert!(!hook.on_event(&LineEvent::unresolved(3)));
        assert!(cell.take().is_empty());
    }

    #[test]
    fn test_unresolved_line_is_ignored_in_lines_mode() {
        let (cell, hook) = hook("/proj", CoverageMode::Lines);
        assert!(!hook.on_event(&LineEvent::line("/proj/a.rb", 0)));
        assert!(cell.take().is_empty());
    }

    #[test]
    fn test_unresolved_line_still_marks_file_in_files_mode() {
        let (cell, hook) = hook("/proj", CoverageMode::Files);
        assert!(hook.on_event(&LineEvent::line("/proj/a.rb", 0)));
        assert!(cell.take().contains_file("/proj/a.rb"));
    }

    #[test]
    fn test_dropped_store_is_a_miss() {
        let (cell, hook) = hook("/proj", CoverageMode::Files);
        drop(cell);
        assert!(!hook.on_event(&LineEvent::line("/proj/a.rb", 1)));
    }

    #[test]
    fn test_callback_forwards_events() {
        let (cell, hook) = hook("/proj", CoverageMode::Lines);
        assert_eq!(hook.mode(), CoverageMode::Lines);
        let mut callback = hook.into_callback();
        callback(&LineEvent::line("/proj/a.rb", 7));
        assert_eq!(cell.take().get("/proj/a.rb").unwrap().line_count(), 1);
    }
}
