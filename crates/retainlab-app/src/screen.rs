use std::cell::Cell;
use std::rc::{Rc, Weak};

use retainlab_core::{
    CaptureRef, Clock, DropHook, LifecycleKind, LifecycleProbe, ObservableHolder, OwningRef,
    Rect, RunLoop, WeakRef,
};
use retainlab_navigation::{Presentable, ScreenId};
use web_time::Duration;

use crate::{Binding, LaunchOptions};

thread_local! {
    static NEXT_SCREEN_ID: Cell<ScreenId> = const { Cell::new(1) };
}

fn next_screen_id() -> ScreenId {
    NEXT_SCREEN_ID.with(|n| {
        let id = n.get();
        n.set(id + 1);
        id
    })
}

/// The demo screen. Owns its view model exclusively.
///
/// Built through `Rc::new_cyclic` so lifecycle hooks, which only get
/// `&self`, can still hand out captures of the screen.
pub struct Screen {
    id: ScreenId,
    title: String,
    frame: Rect,
    binding: Binding,
    deferred_delay: Duration,
    view_model: ObservableHolder,
    run_loop: RunLoop,
    probe: LifecycleProbe,
    this: Weak<Screen>,
    _deinit: DropHook,
}

impl Screen {
    pub fn new(options: &LaunchOptions, run_loop: RunLoop, probe: LifecycleProbe) -> Rc<Self> {
        let id = next_screen_id();
        let clock = run_loop.clock();
        probe.record(id, LifecycleKind::Created, None, clock.now());

        let deinit = {
            let probe = probe.clone();
            DropHook::new(move || {
                log::info!("deinit");
                probe.record(id, LifecycleKind::Deinit, None, clock.now());
            })
        };

        Rc::new_cyclic(|this| Screen {
            id,
            title: options.title.clone(),
            frame: options.bounds,
            binding: options.binding,
            deferred_delay: options.deferred_delay,
            view_model: ObservableHolder::new(),
            run_loop,
            probe,
            this: this.clone(),
            _deinit: deinit,
        })
    }

    pub fn id(&self) -> ScreenId {
        self.id
    }

    pub fn frame(&self) -> Rect {
        self.frame
    }

    pub fn view_model(&self) -> &ObservableHolder {
        &self.view_model
    }

    /// Binds with the configured strategy.
    pub fn bind(&self) {
        match self.binding {
            Binding::Safe => self.bind_safe(),
            Binding::Leaky => self.bind_leaky(),
        }
    }

    /// Both the primary callback and the secondary callback it installs hold
    /// only weak captures of the screen.
    pub fn bind_safe(&self) {
        let screen = WeakRef::from_weak(self.this.clone());
        log::debug!("screen {} binding with {} capture", self.id, screen.kind());
        let report = self.frame_reporter();

        self.view_model.set_primary(move || {
            let Some(this) = screen.upgrade() else {
                return;
            };
            // The inner capture is weak because it is built from a weak handle.
            let inner: WeakRef<Screen> = screen.clone();
            let report = report.clone();
            this.view_model.set_secondary(move || report.emit(inner.upgrade()));
        });
    }

    /// The primary callback holds an owning capture of the screen. It stays
    /// in the view model the screen owns, so the screen can never be freed.
    /// The deferred task it posts only captures weakly, which does not help.
    pub fn bind_leaky(&self) {
        let Some(strong) = self.this.upgrade() else {
            log::warn!("screen {} bound while being dropped", self.id);
            return;
        };
        let screen = OwningRef::new(&strong);
        drop(strong);
        log::debug!("screen {} binding with {} capture", self.id, screen.kind());
        let report = self.frame_reporter();

        self.view_model.set_primary(move || {
            let inner = screen.downgrade();
            let report = report.clone();
            screen
                .run_loop
                .post_after(screen.deferred_delay, "report-frame", move || {
                    report.emit(inner.upgrade())
                });
        });
    }

    /// Drops both view model callbacks, breaking any cycle through them.
    pub fn unbind(&self) {
        log::debug!("screen {} unbinding", self.id);
        self.view_model.clear();
    }

    fn frame_reporter(&self) -> FrameReporter {
        FrameReporter {
            subject: self.id,
            probe: self.probe.clone(),
            clock: self.run_loop.clock(),
        }
    }
}

impl Presentable for Screen {
    fn screen_id(&self) -> ScreenId {
        self.id
    }

    fn title(&self) -> String {
        self.title.clone()
    }

    fn did_load(&self) {
        self.probe
            .record(self.id, LifecycleKind::Loaded, None, self.run_loop.now());
        self.bind();
    }

    fn will_dismiss(&self) {
        self.probe
            .record(self.id, LifecycleKind::Dismissed, None, self.run_loop.now());
    }
}

/// Logs a screen's frame from inside a callback. Holds no reference to the
/// screen; callers pass in whatever their capture upgrades to.
#[derive(Clone)]
struct FrameReporter {
    subject: ScreenId,
    probe: LifecycleProbe,
    clock: Rc<dyn Clock>,
}

impl FrameReporter {
    fn emit(&self, screen: Option<Rc<Screen>>) {
        let frame = screen.map(|s| s.frame().to_string());
        log::info!("{}", frame.as_deref().unwrap_or(""));
        self.probe.record(
            self.subject,
            LifecycleKind::FrameReported,
            frame,
            self.clock.now(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use retainlab_core::ManualClock;

    fn fixture(binding: Binding) -> (Rc<Screen>, RunLoop, ManualClock, LifecycleProbe) {
        let clock = ManualClock::new();
        let rl = RunLoop::new(Rc::new(clock.clone()));
        let probe = LifecycleProbe::new();
        let options = LaunchOptions::default().with_binding(binding);
        let screen = Screen::new(&options, rl.clone(), probe.clone());
        (screen, rl, clock, probe)
    }

    #[test]
    fn safe_bind_installs_secondary_without_running_it() {
        let (screen, rl, _clock, probe) = fixture(Binding::Safe);
        screen.bind();

        let vm = screen.view_model();
        assert_eq!(vm.primary_invocations(), 1);
        assert!(vm.has_secondary());
        assert_eq!(vm.secondary_invocations(), 0);
        assert_eq!(rl.pending(), 0);
        assert_eq!(Rc::strong_count(&screen), 1);
        assert_eq!(probe.count(screen.id(), &LifecycleKind::FrameReported), 0);
    }

    #[test]
    fn safe_secondary_reports_frame_while_alive() {
        let (screen, _rl, _clock, probe) = fixture(Binding::Safe);
        screen.bind_safe();
        assert!(screen.view_model().fire_secondary());

        let ev = probe
            .first(screen.id(), &LifecycleKind::FrameReported)
            .unwrap();
        assert_eq!(ev.detail.as_deref(), Some("(0, 0, 390, 844)"));
    }

    #[test]
    fn leaky_bind_posts_deferred_task_and_holds_itself() {
        let (screen, rl, _clock, _probe) = fixture(Binding::Leaky);
        screen.bind();

        assert_eq!(screen.view_model().primary_invocations(), 1);
        assert!(!screen.view_model().has_secondary());
        assert_eq!(rl.pending(), 1);
        // one external owner plus the capture inside the view model
        assert_eq!(Rc::strong_count(&screen), 2);
        screen.unbind();
        assert_eq!(Rc::strong_count(&screen), 1);
    }

    #[test]
    fn screen_ids_are_unique() {
        let (a, ..) = fixture(Binding::Safe);
        let (b, ..) = fixture(Binding::Safe);
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn lifecycle_hooks_are_recorded() {
        let (screen, _rl, _clock, probe) = fixture(Binding::Safe);
        screen.did_load();
        screen.will_dismiss();
        let kinds: Vec<_> = probe.events().into_iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                LifecycleKind::Created,
                LifecycleKind::Loaded,
                LifecycleKind::Dismissed
            ]
        );
    }
}
