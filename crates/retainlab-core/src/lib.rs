//! # Captures, holders and the run loop
//!
//! retainlab shows how a callback stored on a view model can keep the screen
//! that registered it alive forever. The core crate has the pieces both the
//! leaking and the fixed variants are built from:
//!
//! - `OwningRef<T>` / `WeakRef<T>`: explicit capture handles. Every closure
//!   that reaches back to its owner holds one, so the reference kind is
//!   visible at the capture site.
//! - `ObservableHolder`: a primary slot that runs its callback on
//!   assignment, and a secondary slot that only stores.
//! - `RunLoop`: single-threaded deferred tasks driven by a `Clock`.
//! - `DropHook`, `LifecycleProbe`, `LeakTracker`: observe when (and whether)
//!   objects are destroyed.
//!
//! ```rust
//! use std::rc::Rc;
//! use retainlab_core::*;
//!
//! struct Owner {
//!     holder: ObservableHolder,
//! }
//!
//! let owner = Rc::new(Owner { holder: ObservableHolder::new() });
//! let weak = WeakRef::new(&owner);
//! owner.holder.set_primary(move || {
//!     if let Some(o) = weak.upgrade() {
//!         log::info!("primary ran, secondary set: {}", o.holder.has_secondary());
//!     }
//! });
//!
//! let probe = WeakRef::new(&owner);
//! drop(owner);
//! assert!(!probe.is_alive()); // no cycle: the callback only held a weak ref
//! ```

pub mod capture;
pub mod error;
pub mod geometry;
pub mod holder;
pub mod lifecycle;
pub mod runloop;
mod tests;

pub use capture::*;
pub use error::*;
pub use geometry::*;
pub use holder::*;
pub use lifecycle::*;
pub use runloop::*;
