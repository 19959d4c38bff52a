use retainlab_core::Rect;
use web_time::Duration;

/// Which capture strategy a screen uses when it binds to its view model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Binding {
    /// Weak captures at every level; the screen can be released.
    #[default]
    Safe,
    /// Owning capture in the outer callback; the screen is never released.
    Leaky,
}

#[derive(Clone, Debug)]
pub struct LaunchOptions {
    pub binding: Binding,
    /// Delay before the deferred callback posted by the leaky binding runs.
    pub deferred_delay: Duration,
    pub bounds: Rect,
    pub title: String,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self {
            binding: Binding::Safe,
            deferred_delay: Duration::from_secs(2),
            bounds: Rect::sized(390.0, 844.0),
            title: "Memory Leak Test".into(),
        }
    }
}

impl LaunchOptions {
    pub fn leaky() -> Self {
        Self {
            binding: Binding::Leaky,
            ..Self::default()
        }
    }

    pub fn with_binding(mut self, binding: Binding) -> Self {
        self.binding = binding;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.deferred_delay = delay;
        self
    }
}
