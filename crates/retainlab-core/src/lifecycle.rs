use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use web_time::Instant;

/// Runs a closure exactly once, when dropped (or earlier, via `run`).
pub struct DropHook(Option<Box<dyn FnOnce()>>);

impl DropHook {
    pub fn new(f: impl FnOnce() + 'static) -> Self {
        Self(Some(Box::new(f)))
    }

    /// Runs at most once (safe to call multiple times).
    pub fn run(&mut self) {
        if let Some(f) = self.0.take() {
            f()
        }
    }
}

impl Drop for DropHook {
    fn drop(&mut self) {
        self.run();
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LifecycleKind {
    Created,
    Loaded,
    Dismissed,
    FrameReported,
    Deinit,
}

impl fmt::Display for LifecycleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LifecycleKind::Created => "created",
            LifecycleKind::Loaded => "loaded",
            LifecycleKind::Dismissed => "dismissed",
            LifecycleKind::FrameReported => "frame-reported",
            LifecycleKind::Deinit => "deinit",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Debug)]
pub struct LifecycleEvent {
    pub subject: u64,
    pub kind: LifecycleKind,
    pub detail: Option<String>,
    pub at: Instant,
}

/// Shared, append-only record of lifecycle events.
///
/// Objects under observation keep a clone and append to it; whoever drives
/// the scenario reads it back. It never holds references to the objects
/// themselves.
#[derive(Clone, Default)]
pub struct LifecycleProbe {
    events: Rc<RefCell<Vec<LifecycleEvent>>>,
}

impl LifecycleProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, subject: u64, kind: LifecycleKind, detail: Option<String>, at: Instant) {
        log::debug!("subject {subject}: {kind}");
        self.events.borrow_mut().push(LifecycleEvent {
            subject,
            kind,
            detail,
            at,
        });
    }

    pub fn events(&self) -> Vec<LifecycleEvent> {
        self.events.borrow().clone()
    }

    pub fn count(&self, subject: u64, kind: &LifecycleKind) -> usize {
        self.events
            .borrow()
            .iter()
            .filter(|e| e.subject == subject && &e.kind == kind)
            .count()
    }

    pub fn first(&self, subject: u64, kind: &LifecycleKind) -> Option<LifecycleEvent> {
        self.events
            .borrow()
            .iter()
            .find(|e| e.subject == subject && &e.kind == kind)
            .cloned()
    }
}

struct Tracked {
    name: String,
    target: Weak<dyn Any>,
}

/// Watches objects through weak references and reports the ones still alive.
#[derive(Clone, Default)]
pub struct LeakTracker {
    tracked: Rc<RefCell<Vec<Tracked>>>,
}

impl LeakTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn track<T: Any>(&self, name: impl Into<String>, target: &Rc<T>) {
        let weak: Weak<T> = Rc::downgrade(target);
        self.tracked.borrow_mut().push(Tracked {
            name: name.into(),
            target: weak,
        });
    }

    /// Names of tracked objects that have not been dropped.
    pub fn live(&self) -> Vec<String> {
        self.tracked
            .borrow()
            .iter()
            .filter(|t| t.target.strong_count() > 0)
            .map(|t| t.name.clone())
            .collect()
    }

    /// Logs a warning per live object and returns how many there were.
    pub fn report(&self) -> usize {
        let live = self.live();
        for name in &live {
            log::warn!("still alive: {name} (possible reference cycle)");
        }
        live.len()
    }
}
