//! Window and navigation stack: the host side of the screen lifecycle.
//!
//! The host owns presented screens. A screen lives as long as the stack (or
//! anyone else) holds an `Rc` to it; `dismiss` hands that `Rc` back so the
//! caller decides when the last owner goes away.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use retainlab_core::Rect;
use serde::Serialize;
use thiserror::Error;

pub type ScreenId = u64;

/// Something the host can put on screen.
pub trait Presentable {
    fn screen_id(&self) -> ScreenId;
    fn title(&self) -> String;
    /// Called once, right after the screen is pushed.
    fn did_load(&self) {}
    /// Called right before the host releases the screen.
    fn will_dismiss(&self) {}
}

/// The UI host boundary.
pub trait Host {
    fn present(&self, screen: Rc<dyn Presentable>) -> Result<(), NavError>;
    fn dismiss(&self, id: ScreenId) -> Result<Rc<dyn Presentable>, NavError>;
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NavError {
    #[error("window has no root navigation stack")]
    NoRoot,
    #[error("screen {0} is already presented")]
    AlreadyPresented(ScreenId),
    #[error("screen {0} is not presented")]
    NotPresented(ScreenId),
}

struct Entry {
    id: u64,
    screen: Rc<dyn Presentable>,
}

#[derive(Default)]
struct StackState {
    entries: Vec<Entry>,
    next_id: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EntrySnapshot {
    pub id: u64,
    pub screen: ScreenId,
    pub title: String,
}

#[derive(Clone, Default)]
pub struct NavStack {
    inner: Rc<RefCell<StackState>>,
}

impl NavStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, id: ScreenId) -> bool {
        self.inner
            .borrow()
            .entries
            .iter()
            .any(|e| e.screen.screen_id() == id)
    }

    pub fn top(&self) -> Option<Rc<dyn Presentable>> {
        self.inner.borrow().entries.last().map(|e| e.screen.clone())
    }

    /// Push a screen and run its `did_load` hook.
    pub fn push(&self, screen: Rc<dyn Presentable>) -> Result<(), NavError> {
        let sid = screen.screen_id();
        if self.contains(sid) {
            return Err(NavError::AlreadyPresented(sid));
        }
        {
            let mut s = self.inner.borrow_mut();
            s.next_id += 1;
            let id = s.next_id;
            s.entries.push(Entry {
                id,
                screen: screen.clone(),
            });
        }
        log::debug!("pushed screen {sid} ({})", screen.title());
        // Hook runs with the stack unborrowed, it may inspect the stack.
        screen.did_load();
        Ok(())
    }

    /// Remove a screen, run its `will_dismiss` hook, and return it.
    pub fn remove(&self, id: ScreenId) -> Result<Rc<dyn Presentable>, NavError> {
        let entry = {
            let mut s = self.inner.borrow_mut();
            let idx = s
                .entries
                .iter()
                .rposition(|e| e.screen.screen_id() == id)
                .ok_or(NavError::NotPresented(id))?;
            s.entries.remove(idx)
        };
        entry.screen.will_dismiss();
        log::debug!("removed screen {id}");
        Ok(entry.screen)
    }

    pub fn snapshot(&self) -> Vec<EntrySnapshot> {
        self.inner
            .borrow()
            .entries
            .iter()
            .map(|e| EntrySnapshot {
                id: e.id,
                screen: e.screen.screen_id(),
                title: e.screen.title(),
            })
            .collect()
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.snapshot()).unwrap_or("[]".into())
    }
}

impl Host for NavStack {
    fn present(&self, screen: Rc<dyn Presentable>) -> Result<(), NavError> {
        self.push(screen)
    }

    fn dismiss(&self, id: ScreenId) -> Result<Rc<dyn Presentable>, NavError> {
        self.remove(id)
    }
}

/// Top-level display surface. Presents through its root stack.
pub struct Window {
    bounds: Rect,
    root: RefCell<Option<NavStack>>,
    key_and_visible: Cell<bool>,
}

impl Window {
    pub fn new(bounds: Rect) -> Self {
        Self {
            bounds,
            root: RefCell::new(None),
            key_and_visible: Cell::new(false),
        }
    }

    pub fn set_root(&self, stack: NavStack) {
        *self.root.borrow_mut() = Some(stack);
    }

    pub fn root(&self) -> Option<NavStack> {
        self.root.borrow().clone()
    }

    pub fn make_key_and_visible(&self) {
        self.key_and_visible.set(true);
        log::info!("window {} is key and visible", self.bounds);
    }

    pub fn is_key_and_visible(&self) -> bool {
        self.key_and_visible.get()
    }
}

impl Host for Window {
    fn present(&self, screen: Rc<dyn Presentable>) -> Result<(), NavError> {
        self.root().ok_or(NavError::NoRoot)?.push(screen)
    }

    fn dismiss(&self, id: ScreenId) -> Result<Rc<dyn Presentable>, NavError> {
        self.root().ok_or(NavError::NoRoot)?.remove(id)
    }
}
