//! Host Tracer Interface
//!
//! The seam between the collector and whatever runtime produces line events.
//! A host adapter implements [`LineTracer`] by registering callbacks against
//! its own per-thread tracing facility; the collector only ever subscribes and
//! unsubscribes through this trait.

use std::fmt;
use std::thread::ThreadId;

/// Kind of execution event a host can report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A source line is about to execute
    Line,
    /// A method or function was entered
    Call,
    /// A method or function returned
    Return,
}

/// One execution event delivered to a hook
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineEvent<'a> {
    /// What happened
    pub kind: EventKind,
    /// Source file of the executing frame, if the host could resolve one
    pub file: Option<&'a str>,
    /// Line number of the executing frame; `0` when unresolved
    pub line: u32,
}

impl<'a> LineEvent<'a> {
    /// A line event for a resolved file
    #[must_use]
    pub const fn line(file: &'a str, line: u32) -> Self {
        Self {
            kind: EventKind::Line,
            file: Some(file),
            line,
        }
    }

    /// A line event whose source file could not be resolved (e.g. eval'd code)
    #[must_use]
    pub const fn unresolved(line: u32) -> Self {
        Self {
            kind: EventKind::Line,
            file: None,
            line,
        }
    }

    /// Same location with a different event kind
    #[must_use]
    pub const fn with_kind(mut self, kind: EventKind) -> Self {
        self.kind = kind;
        self
    }

    /// Line number, or `None` if the host reported none
    #[must_use]
    pub const fn line_number(&self) -> Option<u32> {
        if self.line == 0 {
            None
        } else {
            Some(self.line)
        }
    }
}

/// Callback registered with a tracer
pub type HookFn = Box<dyn FnMut(&LineEvent<'_>)>;

/// Identity of one hook registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HookHandle {
    id: u64,
    thread: ThreadId,
}

impl HookHandle {
    /// Create a handle for a registration on the given thread
    #[must_use]
    pub const fn new(id: u64, thread: ThreadId) -> Self {
        Self { id, thread }
    }

    /// Registration id, unique per tracer
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Thread the hook is bound to
    #[must_use]
    pub const fn thread(&self) -> ThreadId {
        self.thread
    }
}

impl fmt::Display for HookHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "hook#{} on {:?}", self.id, self.thread)
    }
}

/// Per-thread execution tracer provided by the host runtime
pub trait LineTracer {
    /// Register `hook` for events of `kind` on the calling thread
    fn subscribe(&self, kind: EventKind, hook: HookFn) -> HookHandle;

    /// Remove a registration. Returns `false` if the handle is unknown here.
    fn unsubscribe(&self, handle: HookHandle) -> bool;
}

impl<T: LineTracer + ?Sized> LineTracer for &T {
    fn subscribe(&self, kind: EventKind, hook: HookFn) -> HookHandle {
        (**self).subscribe(kind, hook)
    }

    fn unsubscribe(&self, handle: HookHandle) -> bool {
        (**self).unsubscribe(handle)
    }
}

impl<T: LineTracer + ?Sized> LineTracer for std::rc::Rc<T> {
    fn subscribe(&self, kind: EventKind, hook: HookFn) -> HookHandle {
        (**self).subscribe(kind, hook)
    }

    fn unsubscribe(&self, handle: HookHandle) -> bool {
        (**self).unsubscribe(handle)
    }
}
