use std::cell::{Cell, RefCell};
use std::rc::Rc;

use slotmap::{SlotMap, new_key_type};
use web_time::{Duration, Instant};

use crate::{DropHook, RunLoopError};

// Run loop clock
pub trait Clock: 'static {
    fn now(&self) -> Instant;
    /// Block (or jump) until `deadline`.
    fn sleep_until(&self, deadline: Instant);
}

pub struct SystemClock;
impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
    fn sleep_until(&self, deadline: Instant) {
        let now = Instant::now();
        if deadline > now {
            std::thread::sleep(deadline - now);
        }
    }
}

/// A virtual clock you can drive deterministically. Clones share the same time.
#[derive(Clone)]
pub struct ManualClock {
    t: Rc<Cell<Instant>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            t: Rc::new(Cell::new(Instant::now())),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.t.set(self.t.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.t.get()
    }
    fn sleep_until(&self, deadline: Instant) {
        if deadline > self.t.get() {
            self.t.set(deadline);
        }
    }
}

new_key_type! {
    pub struct TaskId;
}

struct Deferred {
    due: Instant,
    seq: u64,
    label: &'static str,
    task: Box<dyn FnOnce()>,
}

#[derive(Default)]
struct LoopState {
    tasks: SlotMap<TaskId, Deferred>,
    next_seq: u64,
    draining: bool,
}

/// Single-threaded queue of deferred tasks.
///
/// Cloning gives another handle to the same queue. Nothing here is `Send`;
/// all tasks run on the thread that drains the loop.
#[derive(Clone)]
pub struct RunLoop {
    state: Rc<RefCell<LoopState>>,
    clock: Rc<dyn Clock>,
}

impl RunLoop {
    pub fn new(clock: Rc<dyn Clock>) -> Self {
        Self {
            state: Rc::new(RefCell::new(LoopState::default())),
            clock,
        }
    }

    pub fn system() -> Self {
        Self::new(Rc::new(SystemClock))
    }

    pub fn now(&self) -> Instant {
        self.clock.now()
    }

    /// The clock this loop schedules against. Capture this instead of the
    /// loop itself inside posted tasks.
    pub fn clock(&self) -> Rc<dyn Clock> {
        self.clock.clone()
    }

    /// Runs `task` on the next drain.
    pub fn post(&self, label: &'static str, task: impl FnOnce() + 'static) -> TaskId {
        self.post_after(Duration::ZERO, label, task)
    }

    /// Runs `task` once `delay` has elapsed. Posted tasks cannot be cancelled.
    pub fn post_after(
        &self,
        delay: Duration,
        label: &'static str,
        task: impl FnOnce() + 'static,
    ) -> TaskId {
        let due = self.clock.now() + delay;
        let mut s = self.state.borrow_mut();
        let seq = s.next_seq;
        s.next_seq += 1;
        let id = s.tasks.insert(Deferred {
            due,
            seq,
            label,
            task: Box::new(task),
        });
        log::debug!("posted `{label}` (delay {delay:?})");
        id
    }

    pub fn pending(&self) -> usize {
        self.state.borrow().tasks.len()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.state.borrow().tasks.values().map(|d| d.due).min()
    }

    /// Runs every task whose deadline has passed, earliest first, and returns
    /// how many ran. Tasks posted meanwhile run too if they are already due.
    pub fn run_due(&self) -> Result<usize, RunLoopError> {
        {
            let mut s = self.state.borrow_mut();
            if s.draining {
                return Err(RunLoopError::Reentrant);
            }
            s.draining = true;
        }
        // Cleared even if a task panics, so the loop stays usable.
        let _reset = DropHook::new({
            let state = self.state.clone();
            move || state.borrow_mut().draining = false
        });

        let mut ran = 0;
        while let Some(d) = self.take_next_due() {
            log::debug!("running `{}`", d.label);
            (d.task)();
            ran += 1;
        }
        Ok(ran)
    }

    /// Drains repeatedly, sleeping on the clock between deadlines, until
    /// `window` has passed. Returns the total number of tasks run.
    pub fn run_for(&self, window: Duration) -> Result<usize, RunLoopError> {
        let end = self.clock.now() + window;
        let mut ran = self.run_due()?;
        while let Some(next) = self.next_deadline() {
            if next > end {
                break;
            }
            self.clock.sleep_until(next);
            ran += self.run_due()?;
        }
        self.clock.sleep_until(end);
        Ok(ran)
    }

    fn take_next_due(&self) -> Option<Deferred> {
        let now = self.clock.now();
        let mut s = self.state.borrow_mut();
        let id = s
            .tasks
            .iter()
            .filter(|(_, d)| d.due <= now)
            .min_by_key(|(_, d)| (d.due, d.seq))
            .map(|(id, _)| id)?;
        s.tasks.remove(id)
    }
}
