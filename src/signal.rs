use dioxus::prelude::*;

use crate::host::HostCell;

/// Lets a component's [Signal] act as the host of a wrapped action
///
/// Reads go through `with_peek` so probing the loading flag does not
/// subscribe the calling scope, writes go through `with_mut` so components
/// reading the host re-render when the flag or the error field change.
impl<H: 'static> HostCell for Signal<H> {
    type Host = H;

    fn with_host<R>(&self, f: impl FnOnce(&H) -> R) -> R {
        self.with_peek(f)
    }
    fn with_host_mut<R>(&self, f: impl FnOnce(&mut H) -> R) -> R {
        let mut signal = *self;
        signal.with_mut(f)
    }

    // Signals are single-threaded, so peeking first cannot race. It keeps a
    // skipped call from notifying the subscribers of the host.
    fn try_start(&self, get_loading: fn(&H) -> bool, set_loading: fn(&mut H, bool)) -> bool {
        if self.with_peek(get_loading) {
            return false;
        }
        self.with_host_mut(|h| set_loading(h, true));
        true
    }
}
