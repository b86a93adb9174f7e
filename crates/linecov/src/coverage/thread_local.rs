//! Thread-Local Hook Registry
//!
//! [`ThreadTracer`] is the in-process [`LineTracer`] adapter. Hooks live in a
//! `thread_local!` registry, so a registration only ever sees events emitted
//! on the thread that made it. A host runtime binding (or a replay driver)
//! feeds events in with [`ThreadTracer::emit`].
//!
//! Dispatch is synchronous and in registration order. The hook list is moved
//! out of the registry while it runs, which lets a hook subscribe or
//! unsubscribe without re-borrowing; those changes apply once the current
//! event has been delivered. An event emitted from inside a hook is dropped.
//! A hook that panics does not take the registry down with it: the moved-out
//! hooks are put back while the panic unwinds.

use super::tracer::{EventKind, HookFn, HookHandle, LineEvent, LineTracer};
use std::cell::RefCell;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_HOOK_ID: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static REGISTRY: RefCell<HookRegistry> = const { RefCell::new(HookRegistry::new()) };
}

struct Registered {
    id: u64,
    kind: EventKind,
    hook: HookFn,
}

struct HookRegistry {
    /// Idle: every hook. Dispatching: hooks added by the running callbacks.
    hooks: Vec<Registered>,
    /// Ids of the hooks moved out for the running dispatch
    in_flight: Vec<u64>,
    /// In-flight ids removed during the running dispatch
    removed: Vec<u64>,
    dispatching: bool,
}

impl HookRegistry {
    const fn new() -> Self {
        Self {
            hooks: Vec::new(),
            in_flight: Vec::new(),
            removed: Vec::new(),
            dispatching: false,
        }
    }

    fn remove(&mut self, id: u64) -> bool {
        if let Some(pos) = self.hooks.iter().position(|h| h.id == id) {
            let _ = self.hooks.remove(pos);
            return true;
        }
        if self.dispatching && self.in_flight.contains(&id) && !self.removed.contains(&id) {
            self.removed.push(id);
            return true;
        }
        false
    }

    fn live_count(&self) -> usize {
        self.hooks.len() + self.in_flight.len() - self.removed.len()
    }
}

/// Hooks moved out for one dispatch; returned to the registry on drop,
/// including when a hook unwinds.
struct DispatchGuard {
    hooks: Vec<Registered>,
}

impl Drop for DispatchGuard {
    fn drop(&mut self) {
        let mut hooks = std::mem::take(&mut self.hooks);
        let _ = REGISTRY.try_with(|cell| {
            if let Ok(mut registry) = cell.try_borrow_mut() {
                let removed = std::mem::take(&mut registry.removed);
                hooks.retain(|h| !removed.contains(&h.id));
                let added = std::mem::replace(&mut registry.hooks, hooks);
                registry.hooks.extend(added);
                registry.in_flight.clear();
                registry.dispatching = false;
            }
        });
    }
}

/// Tracer backed by a per-thread hook registry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ThreadTracer;

impl ThreadTracer {
    /// Create a tracer handle
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Deliver an event to the hooks subscribed to its kind on this thread.
    ///
    /// Returns how many hooks were invoked. Events emitted while a dispatch
    /// is already running on this thread are dropped and return `0`.
    pub fn emit(&self, event: &LineEvent<'_>) -> usize {
        let taken = REGISTRY.try_with(|cell| {
            let mut registry = cell.try_borrow_mut().ok()?;
            if registry.dispatching || registry.hooks.is_empty() {
                return None;
            }
            let hooks = std::mem::take(&mut registry.hooks);
            registry.in_flight = hooks.iter().map(|h| h.id).collect();
            registry.dispatching = true;
            Some(hooks)
        });
        let Some(hooks) = taken.ok().flatten() else {
            return 0;
        };

        let mut guard = DispatchGuard { hooks };
        let mut invoked = 0;
        for registered in guard.hooks.iter_mut().filter(|h| h.kind == event.kind) {
            (registered.hook)(event);
            invoked += 1;
        }
        invoked
    }

    /// Convenience for a resolved line event
    pub fn emit_line(&self, file: &str, line: u32) -> usize {
        self.emit(&LineEvent::line(file, line))
    }

    /// Number of live registrations on the calling thread
    #[must_use]
    pub fn hook_count(&self) -> usize {
        REGISTRY
            .try_with(|cell| cell.try_borrow().map_or(0, |r| r.live_count()))
            .unwrap_or(0)
    }
}

impl LineTracer for ThreadTracer {
    /// # Panics
    ///
    /// Panics if called while this thread's registry is being torn down.
    fn subscribe(&self, kind: EventKind, hook: HookFn) -> HookHandle {
        let id = NEXT_HOOK_ID.fetch_add(1, Ordering::Relaxed);
        REGISTRY.with(|cell| cell.borrow_mut().hooks.push(Registered { id, kind, hook }));
        HookHandle::new(id, std::thread::current().id())
    }

    fn unsubscribe(&self, handle: HookHandle) -> bool {
        if handle.thread() != std::thread::current().id() {
            return false;
        }
        REGISTRY
            .try_with(|cell| {
                cell.try_borrow_mut()
                    .is_ok_and(|mut registry| registry.remove(handle.id()))
            })
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn counting_hook(counter: &Rc<Cell<usize>>) -> HookFn {
        let counter = Rc::clone(counter);
        Box::new(move |_event| counter.set(counter.get() + 1))
    }

    #[test]
    fn test_emit_without_hooks_is_noop() {
        assert_eq!(ThreadTracer::new().emit_line("/a.rb", 1), 0);
    }

    #[test]
    fn test_subscribe_and_emit() {
        let tracer = ThreadTracer::new();
        let hits = Rc::new(Cell::new(0));
        let handle = tracer.subscribe(EventKind::Line, counting_hook(&hits));

        assert_eq!(tracer.emit_line("/a.rb", 1), 1);
        assert_eq!(tracer.emit_line("/a.rb", 2), 1);
        assert_eq!(hits.get(), 2);

        assert!(tracer.unsubscribe(handle));
        assert_eq!(tracer.emit_line("/a.rb", 3), 0);
        assert_eq!(hits.get(), 2);
    }

    #[test]
    fn test_only_matching_kind_is_dispatched() {
        let tracer = ThreadTracer::new();
        let hits = Rc::new(Cell::new(0));
        let handle = tracer.subscribe(EventKind::Line, counting_hook(&hits));

        let _ = tracer.emit(&LineEvent::line("/a.rb", 1).with_kind(EventKind::Call));
        let _ = tracer.emit(&LineEvent::line("/a.rb", 1).with_kind(EventKind::Return));
        assert_eq!(hits.get(), 0);

        assert!(tracer.unsubscribe(handle));
    }

    #[test]
    fn test_unsubscribe_twice_returns_false() {
        let tracer = ThreadTracer::new();
        let handle = tracer.subscribe(EventKind::Line, Box::new(|_| {}));
        assert!(tracer.unsubscribe(handle));
        assert!(!tracer.unsubscribe(handle));
    }

    #[test]
    fn test_hooks_are_thread_scoped() {
        let tracer = ThreadTracer::new();
        let hits = Rc::new(Cell::new(0));
        let handle = tracer.subscribe(EventKind::Line, counting_hook(&hits));

        let (delivered, remote_count) = std::thread::spawn(|| {
            let tracer = ThreadTracer::new();
            (tracer.emit_line("/a.rb", 1), tracer.hook_count())
        })
        .join()
        .unwrap();

        assert_eq!(delivered, 0);
        assert_eq!(remote_count, 0);
        assert_eq!(hits.get(), 0);
        assert_eq!(tracer.hook_count(), 1);
        assert!(tracer.unsubscribe(handle));
    }

    #[test]
    fn test_unsubscribe_from_other_thread_is_rejected() {
        let tracer = ThreadTracer::new();
        let handle = tracer.subscribe(EventKind::Line, Box::new(|_| {}));

        let removed = std::thread::spawn(move || ThreadTracer::new().unsubscribe(handle))
            .join()
            .unwrap();
        assert!(!removed);
        assert!(tracer.unsubscribe(handle));
    }

    #[test]
    fn test_dispatch_follows_registration_order() {
        let tracer = ThreadTracer::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        let first = {
            let order = Rc::clone(&order);
            tracer.subscribe(EventKind::Line, Box::new(move |_| order.borrow_mut().push(1)))
        };
        let second = {
            let order = Rc::clone(&order);
            tracer.subscribe(EventKind::Line, Box::new(move |_| order.borrow_mut().push(2)))
        };

        let _ = tracer.emit_line("/a.rb", 1);
        assert_eq!(*order.borrow(), vec![1, 2]);

        assert!(tracer.unsubscribe(first));
        assert!(tracer.unsubscribe(second));
    }

    #[test]
    fn test_reentrant_emit_is_dropped() {
        let tracer = ThreadTracer::new();
        let inner = Rc::new(Cell::new(usize::MAX));
        let handle = {
            let inner = Rc::clone(&inner);
            tracer.subscribe(
                EventKind::Line,
                Box::new(move |_| inner.set(ThreadTracer::new().emit_line("/nested.rb", 1))),
            )
        };

        assert_eq!(tracer.emit_line("/a.rb", 1), 1);
        assert_eq!(inner.get(), 0);
        assert!(tracer.unsubscribe(handle));
    }

    #[test]
    fn test_hook_can_unsubscribe_itself() {
        let tracer = ThreadTracer::new();
        let hits = Rc::new(Cell::new(0));
        let slot: Rc<Cell<Option<HookHandle>>> = Rc::new(Cell::new(None));
        let handle = {
            let hits = Rc::clone(&hits);
            let slot = Rc::clone(&slot);
            tracer.subscribe(
                EventKind::Line,
                Box::new(move |_| {
                    hits.set(hits.get() + 1);
                    if let Some(me) = slot.get() {
                        let _ = ThreadTracer::new().unsubscribe(me);
                    }
                }),
            )
        };
        slot.set(Some(handle));

        let _ = tracer.emit_line("/a.rb", 1);
        let _ = tracer.emit_line("/a.rb", 2);
        assert_eq!(hits.get(), 1);
        assert_eq!(tracer.hook_count(), 0);
    }

    #[test]
    fn test_hook_subscribed_during_dispatch_sees_next_event() {
        let tracer = ThreadTracer::new();
        let late_hits = Rc::new(Cell::new(0));
        let late_handle: Rc<Cell<Option<HookHandle>>> = Rc::new(Cell::new(None));
        let handle = {
            let late_hits = Rc::clone(&late_hits);
            let late_handle = Rc::clone(&late_handle);
            tracer.subscribe(
                EventKind::Line,
                Box::new(move |_| {
                    if late_handle.get().is_none() {
                        let h = ThreadTracer::new()
                            .subscribe(EventKind::Line, counting_hook(&late_hits));
                        late_handle.set(Some(h));
                    }
                }),
            )
        };

        assert_eq!(tracer.emit_line("/a.rb", 1), 1);
        assert_eq!(late_hits.get(), 0);
        assert_eq!(tracer.emit_line("/a.rb", 2), 2);
        assert_eq!(late_hits.get(), 1);

        assert!(tracer.unsubscribe(handle));
        assert!(tracer.unsubscribe(late_handle.get().unwrap()));
    }

    #[test]
    fn test_panicking_hook_leaves_registry_usable() {
        let tracer = ThreadTracer::new();
        let hits = Rc::new(Cell::new(0));
        let counter = tracer.subscribe(EventKind::Line, counting_hook(&hits));
        let panicking = tracer.subscribe(
            EventKind::Line,
            Box::new(|event: &LineEvent<'_>| {
                if event.line == 1 {
                    panic!("hook failure");
                }
            }),
        );

        let unwound = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            tracer.emit_line("/a.rb", 1)
        }));
        assert!(unwound.is_err());
        assert_eq!(hits.get(), 1);
        assert_eq!(tracer.hook_count(), 2);

        assert_eq!(tracer.emit_line("/a.rb", 2), 2);
        assert_eq!(hits.get(), 2);

        assert!(tracer.unsubscribe(counter));
        assert!(tracer.unsubscribe(panicking));
        assert_eq!(tracer.hook_count(), 0);
    }
}
