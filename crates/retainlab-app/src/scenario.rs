use anyhow::{Context, bail};
use retainlab_core::{LifecycleKind, RunLoop};
use web_time::Duration;

use crate::{Binding, Bootstrap, LaunchOptions};

/// What one launch, dismiss, wait cycle observed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScenarioReport {
    pub binding: Binding,
    /// The deinit marker was recorded at all.
    pub deinit_logged: bool,
    /// The deinit marker was recorded before any time passed after dismissal.
    pub deinit_immediate: bool,
    /// Frames reported by the deferred callback, in order.
    pub frame_reports: Vec<Option<String>>,
    pub still_alive: usize,
}

impl ScenarioReport {
    pub fn leaked(&self) -> bool {
        self.still_alive > 0
    }
}

/// Launches one screen with `options`, dismisses it, then runs the loop for
/// `window` and reports what happened to the screen.
pub fn run_scenario(
    options: LaunchOptions,
    run_loop: RunLoop,
    window: Duration,
) -> anyhow::Result<ScenarioReport> {
    let binding = options.binding;
    let app = Bootstrap::new(options, run_loop.clone());
    if !app.did_finish_launching() {
        bail!("{binding:?} scenario failed to launch");
    }
    let id = app
        .screen()
        .map(|s| s.id())
        .context("presented screen vanished before dismissal")?;

    app.teardown().context("dismissing the screen")?;
    let deinit_immediate = app.probe().count(id, &LifecycleKind::Deinit) == 1;

    run_loop
        .run_for(window)
        .context("running the observation window")?;

    let probe = app.probe();
    let frame_reports = probe
        .events()
        .into_iter()
        .filter(|e| e.subject == id && e.kind == LifecycleKind::FrameReported)
        .map(|e| e.detail)
        .collect();
    let report = ScenarioReport {
        binding,
        deinit_logged: probe.count(id, &LifecycleKind::Deinit) > 0,
        deinit_immediate,
        frame_reports,
        still_alive: app.tracker().report(),
    };
    log::info!(
        "{:?} binding: deinit {}, {} frame report(s), {} object(s) still alive",
        report.binding,
        if report.deinit_logged { "logged" } else { "missing" },
        report.frame_reports.len(),
        report.still_alive
    );
    Ok(report)
}
