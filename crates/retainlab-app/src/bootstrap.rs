use std::cell::{Cell, RefCell};
use std::rc::Rc;

use retainlab_core::{CaptureRef, LeakTracker, LifecycleProbe, RunLoop, WeakRef};
use retainlab_navigation::{Host, NavError, NavStack, Window};

use crate::{LaunchOptions, Screen};

/// App entry: builds the window and navigation shell and presents one screen.
///
/// Holds the screen only weakly; the host is its sole owner.
pub struct Bootstrap {
    options: LaunchOptions,
    run_loop: RunLoop,
    probe: LifecycleProbe,
    tracker: LeakTracker,
    injected: Option<Rc<dyn Host>>,
    window: RefCell<Option<Rc<Window>>>,
    presented: RefCell<Option<WeakRef<Screen>>>,
    presented_id: Cell<Option<u64>>,
}

impl Bootstrap {
    pub fn new(options: LaunchOptions, run_loop: RunLoop) -> Self {
        Self {
            options,
            run_loop,
            probe: LifecycleProbe::new(),
            tracker: LeakTracker::new(),
            injected: None,
            window: RefCell::new(None),
            presented: RefCell::new(None),
            presented_id: Cell::new(None),
        }
    }

    /// Present through `host` instead of a window created at launch.
    pub fn with_host(host: Rc<dyn Host>, options: LaunchOptions, run_loop: RunLoop) -> Self {
        Self {
            injected: Some(host),
            ..Self::new(options, run_loop)
        }
    }

    pub fn did_finish_launching(&self) -> bool {
        let host = match &self.injected {
            Some(h) => h.clone(),
            None => {
                let window = Rc::new(Window::new(self.options.bounds));
                window.set_root(NavStack::new());
                *self.window.borrow_mut() = Some(window.clone());
                window as Rc<dyn Host>
            }
        };

        let screen = Screen::new(&self.options, self.run_loop.clone(), self.probe.clone());
        let id = screen.id();
        self.tracker.track(format!("screen {id}"), &screen);
        *self.presented.borrow_mut() = Some(WeakRef::new(&screen));

        if let Err(err) = host.present(screen) {
            log::error!("failed to present screen {id}: {err}");
            return false;
        }
        self.presented_id.set(Some(id));

        if let Some(window) = self.window.borrow().as_ref() {
            window.make_key_and_visible();
            if let Some(root) = window.root() {
                log::debug!("navigation stack: {}", root.to_json());
            }
        }
        log::info!(
            "launched screen {id} with {:?} binding",
            self.options.binding
        );
        true
    }

    /// Dismisses the presented screen and drops the host's reference to it.
    /// On failure the screen stays presented and `teardown` can be retried.
    pub fn teardown(&self) -> Result<(), NavError> {
        let Some(id) = self.presented_id.get() else {
            return Ok(());
        };
        let host = self.host().ok_or(NavError::NoRoot)?;
        let released = host.dismiss(id)?;
        self.presented_id.set(None);
        drop(released);
        log::info!("screen {id} dismissed");
        Ok(())
    }

    pub fn host(&self) -> Option<Rc<dyn Host>> {
        self.injected.clone().or_else(|| {
            self.window
                .borrow()
                .clone()
                .map(|w| w as Rc<dyn Host>)
        })
    }

    pub fn window(&self) -> Option<Rc<Window>> {
        self.window.borrow().clone()
    }

    /// The presented screen, if it is still alive.
    pub fn screen(&self) -> Option<Rc<Screen>> {
        self.presented.borrow().as_ref().and_then(|w| w.upgrade())
    }

    pub fn probe(&self) -> &LifecycleProbe {
        &self.probe
    }

    pub fn tracker(&self) -> &LeakTracker {
        &self.tracker
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use retainlab_core::ManualClock;
    use retainlab_navigation::{Presentable, ScreenId};

    /// Host whose next dismissal can be made to fail.
    struct RefusingHost {
        stack: NavStack,
        refuse: Cell<bool>,
    }

    impl Host for RefusingHost {
        fn present(&self, screen: Rc<dyn Presentable>) -> Result<(), NavError> {
            self.stack.push(screen)
        }

        fn dismiss(&self, id: ScreenId) -> Result<Rc<dyn Presentable>, NavError> {
            if self.refuse.replace(false) {
                return Err(NavError::NotPresented(id));
            }
            self.stack.remove(id)
        }
    }

    fn manual_loop() -> RunLoop {
        RunLoop::new(Rc::new(ManualClock::new()))
    }

    #[test]
    fn launch_presents_exactly_one_screen() {
        let app = Bootstrap::new(LaunchOptions::default(), manual_loop());
        assert!(app.did_finish_launching());

        let window = app.window().unwrap();
        assert!(window.is_key_and_visible());
        let root = window.root().unwrap();
        assert_eq!(root.len(), 1);
        let screen = app.screen().unwrap();
        assert_eq!(root.top().map(|s| s.screen_id()), Some(screen.id()));
        assert_eq!(screen.view_model().primary_invocations(), 1);
    }

    #[test]
    fn injected_host_receives_the_screen() {
        let stack = NavStack::new();
        let app = Bootstrap::with_host(
            Rc::new(stack.clone()),
            LaunchOptions::default(),
            manual_loop(),
        );
        assert!(app.did_finish_launching());
        assert!(app.window().is_none());
        assert_eq!(stack.len(), 1);

        app.teardown().unwrap();
        assert!(stack.is_empty());
        assert!(app.screen().is_none());
    }

    #[test]
    fn failed_teardown_can_be_retried() {
        let stack = NavStack::new();
        let host = Rc::new(RefusingHost {
            stack: stack.clone(),
            refuse: Cell::new(true),
        });
        let app = Bootstrap::with_host(host, LaunchOptions::default(), manual_loop());
        assert!(app.did_finish_launching());
        let id = app.screen().unwrap().id();

        assert_eq!(app.teardown(), Err(NavError::NotPresented(id)));
        assert_eq!(stack.len(), 1);
        assert!(app.screen().is_some());

        assert_eq!(app.teardown(), Ok(()));
        assert!(stack.is_empty());
        assert!(app.screen().is_none());
    }

    #[test]
    fn teardown_without_launch_is_noop() {
        let app = Bootstrap::new(LaunchOptions::default(), manual_loop());
        assert_eq!(app.teardown(), Ok(()));
    }
}
