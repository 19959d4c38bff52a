//! Explicit capture handles.
//!
//! A callback that needs to reach back into the object that registered it
//! has to pick, at the capture site, whether it keeps that object alive.
//! `OwningRef` does; `WeakRef` does not. Nesting a closure inside another
//! never changes the kind: the inner closure gets whatever handle the outer
//! one hands it.

use std::fmt;
use std::rc::{Rc, Weak};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaptureKind {
    Owning,
    Weak,
}

impl fmt::Display for CaptureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureKind::Owning => f.write_str("owning"),
            CaptureKind::Weak => f.write_str("weak"),
        }
    }
}

/// Common surface of both handle kinds.
pub trait CaptureRef<T: ?Sized> {
    fn kind(&self) -> CaptureKind;

    /// Temporary strong access; `None` once the target is gone.
    fn upgrade(&self) -> Option<Rc<T>>;

    fn is_alive(&self) -> bool {
        self.upgrade().is_some()
    }
}

/// Strong capture. Holding one keeps the target alive.
pub struct OwningRef<T: ?Sized>(Rc<T>);

impl<T: ?Sized> OwningRef<T> {
    pub fn new(target: &Rc<T>) -> Self {
        Self(target.clone())
    }

    pub fn downgrade(&self) -> WeakRef<T> {
        WeakRef(Rc::downgrade(&self.0))
    }
}

impl<T: ?Sized> Clone for OwningRef<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T: ?Sized> std::ops::Deref for OwningRef<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T: ?Sized> CaptureRef<T> for OwningRef<T> {
    fn kind(&self) -> CaptureKind {
        CaptureKind::Owning
    }

    fn upgrade(&self) -> Option<Rc<T>> {
        Some(self.0.clone())
    }
}

/// Non-owning capture.
pub struct WeakRef<T: ?Sized>(Weak<T>);

impl<T: ?Sized> WeakRef<T> {
    pub fn new(target: &Rc<T>) -> Self {
        Self(Rc::downgrade(target))
    }

    pub fn from_weak(weak: Weak<T>) -> Self {
        Self(weak)
    }
}

impl<T: ?Sized> Clone for WeakRef<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T: ?Sized> CaptureRef<T> for WeakRef<T> {
    fn kind(&self) -> CaptureKind {
        CaptureKind::Weak
    }

    fn upgrade(&self) -> Option<Rc<T>> {
        self.0.upgrade()
    }
}
