//! Store Ownership
//!
//! The live [`CoverageStore`] sits in a [`StoreCell`]. The collector holds the
//! only strong reference; the registered hook holds a [`Weak`] one, so the
//! store's lifetime is the collector's and nothing else can keep it alive or
//! write to it. Heap addresses are stable, so no relocation step is needed
//! between events.
//!
//! Access never panics: a borrow that cannot be taken (a hook re-entering its
//! own store) or a store that has already been dropped turns the event into a
//! miss.

use super::CoverageStore;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Exclusive home of a collector's live store
#[derive(Debug, Default)]
pub struct StoreCell {
    store: RefCell<CoverageStore>,
}

impl StoreCell {
    /// Allocate an empty cell owned by the caller
    #[must_use]
    pub fn new_owned() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Non-owning reference for a hook
    #[must_use]
    pub fn observer(this: &Rc<Self>) -> Weak<Self> {
        Rc::downgrade(this)
    }

    /// Run `f` against the store. Returns `None` if the store is busy.
    #[inline]
    pub fn with_store<R>(&self, f: impl FnOnce(&mut CoverageStore) -> R) -> Option<R> {
        let mut store = self.store.try_borrow_mut().ok()?;
        Some(f(&mut store))
    }

    /// Swap the live store for an empty one and return the old contents.
    ///
    /// Returns an empty store if the cell is borrowed by a running hook.
    #[must_use]
    pub fn take(&self) -> CoverageStore {
        self.with_store(CoverageStore::snapshot_and_reset)
            .unwrap_or_default()
    }

    /// Approximate bytes held by the live store
    #[must_use]
    pub fn footprint(&self) -> usize {
        std::mem::size_of::<Self>()
            + self
                .store
                .try_borrow()
                .map_or(0, |store| store.heap_size())
    }

    /// Number of files recorded so far
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.store.try_borrow().map_or(0, |store| store.file_count())
    }
}
