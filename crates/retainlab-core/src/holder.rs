use std::cell::{Cell, RefCell};
use std::rc::Rc;

pub type Callback = Rc<dyn Fn()>;

/// View-model style callback holder.
///
/// The primary slot runs its callback as soon as it is assigned. The
/// secondary slot only stores. No borrow is held while a callback runs, so
/// a callback may write back into the same holder.
#[derive(Default)]
pub struct ObservableHolder {
    primary: RefCell<Option<Callback>>,
    secondary: RefCell<Option<Callback>>,
    primary_runs: Cell<usize>,
    secondary_runs: Cell<usize>,
}

impl ObservableHolder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `f` and invokes it once before returning.
    pub fn set_primary(&self, f: impl Fn() + 'static) {
        let cb: Callback = Rc::new(f);
        // Anything previously stored is dropped here, outside the borrow.
        let previous = self.primary.replace(Some(cb.clone()));
        drop(previous);

        self.primary_runs.set(self.primary_runs.get() + 1);
        cb();
    }

    /// Stores `f` without invoking it.
    pub fn set_secondary(&self, f: impl Fn() + 'static) {
        let previous = self.secondary.replace(Some(Rc::new(f)));
        drop(previous);
    }

    /// Runs the stored secondary callback. Returns false if the slot is empty.
    pub fn fire_secondary(&self) -> bool {
        let cb = self.secondary.borrow().clone();
        match cb {
            Some(cb) => {
                self.secondary_runs.set(self.secondary_runs.get() + 1);
                cb();
                true
            }
            None => false,
        }
    }

    pub fn has_primary(&self) -> bool {
        self.primary.borrow().is_some()
    }

    pub fn has_secondary(&self) -> bool {
        self.secondary.borrow().is_some()
    }

    pub fn primary_invocations(&self) -> usize {
        self.primary_runs.get()
    }

    pub fn secondary_invocations(&self) -> usize {
        self.secondary_runs.get()
    }

    /// Empties both slots, releasing whatever the callbacks captured.
    pub fn clear(&self) {
        let primary = self.primary.take();
        let secondary = self.secondary.take();
        log::debug!(
            "holder cleared (primary: {}, secondary: {})",
            primary.is_some(),
            secondary.is_some()
        );
        drop((primary, secondary));
    }
}
