//! Screen, view model binding and app bootstrap.
//!
//! `Screen` owns an `ObservableHolder` and binds to it in one of two ways:
//! `bind_safe` keeps every capture weak; `bind_leaky` captures the screen
//! with an owning reference and leaks it through the holder it owns. The
//! `deinit` log line, written from a `DropHook`, shows which one you ran.

pub mod bootstrap;
pub mod options;
pub mod scenario;
pub mod screen;

pub use bootstrap::*;
pub use options::*;
pub use scenario::*;
pub use screen::*;
