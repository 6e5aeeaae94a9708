use std::cell::RefCell;
use std::rc::Rc;
use std::sync::{Arc, Mutex, PoisonError};

/// Shared handle to the host state of a wrapped action
///
/// The wrapper needs to read and flip the loading flag while the action is
/// suspended, so the host has to live behind some form of shared interior
/// mutability. Accesses are short: implementations must not be held across an
/// `await` and the closures never re-enter the cell.
pub trait HostCell: Clone {
    type Host;

    fn with_host<R>(&self, f: impl FnOnce(&Self::Host) -> R) -> R;
    fn with_host_mut<R>(&self, f: impl FnOnce(&mut Self::Host) -> R) -> R;

    /// Sets the loading flag unless it is already set, returning whether it did
    ///
    /// The check and the write happen under one access so concurrent callers
    /// cannot both start.
    fn try_start(
        &self,
        get_loading: fn(&Self::Host) -> bool,
        set_loading: fn(&mut Self::Host, bool),
    ) -> bool {
        self.with_host_mut(|h| {
            if get_loading(h) {
                false
            } else {
                set_loading(h, true);
                true
            }
        })
    }
}

impl<H> HostCell for Rc<RefCell<H>> {
    type Host = H;

    fn with_host<R>(&self, f: impl FnOnce(&H) -> R) -> R {
        f(&*self.borrow())
    }
    fn with_host_mut<R>(&self, f: impl FnOnce(&mut H) -> R) -> R {
        f(&mut *self.borrow_mut())
    }
}

// A poisoned host still gets its loading flag reset.
impl<H> HostCell for Arc<Mutex<H>> {
    type Host = H;

    fn with_host<R>(&self, f: impl FnOnce(&H) -> R) -> R {
        f(&*self.lock().unwrap_or_else(PoisonError::into_inner))
    }
    fn with_host_mut<R>(&self, f: impl FnOnce(&mut H) -> R) -> R {
        f(&mut *self.lock().unwrap_or_else(PoisonError::into_inner))
    }
}
