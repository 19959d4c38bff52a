use retainlab_app::{LaunchOptions, run_scenario};
use retainlab_core::RunLoop;
use web_time::Duration;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let observe = Duration::from_secs(3);
    for options in [LaunchOptions::default(), LaunchOptions::leaky()] {
        let report = run_scenario(options, RunLoop::system(), observe)?;
        if report.leaked() {
            log::warn!("{:?} binding leaked its screen", report.binding);
        }
    }
    Ok(())
}
