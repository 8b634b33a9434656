//! Host window surface.
//!
//! The dialog layer borrows windows, it never owns them. The shell
//! registers each top-level window here under the id its script wrapper
//! carries, and the bridge resolves that id at the `selectFile` entry
//! point only.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use crate::toolkit::NativeWindowHandle;

/// A shell-owned top-level window, as far as the dialog layer cares.
pub trait HostWindow {
    /// `None` once the underlying native window has been destroyed.
    fn native_window_handle(&self) -> Option<NativeWindowHandle>;
}

/// Table of live shell windows keyed by script-wrapper id.
///
/// Entries are weak; a window that was dropped without being removed
/// still resolves to `None`.
#[derive(Default)]
pub struct WindowRegistry {
    windows: RefCell<HashMap<u32, Weak<dyn HostWindow>>>,
}

impl WindowRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, id: u32, window: &Rc<dyn HostWindow>) {
        self.windows.borrow_mut().insert(id, Rc::downgrade(window));
    }

    pub fn remove(&self, id: u32) {
        self.windows.borrow_mut().remove(&id);
    }

    /// Resolve an id to a still-valid native handle.
    #[must_use]
    pub fn resolve(&self, id: u32) -> Option<NativeWindowHandle> {
        self.windows
            .borrow()
            .get(&id)
            .and_then(Weak::upgrade)
            .and_then(|window| window.native_window_handle())
    }
}
