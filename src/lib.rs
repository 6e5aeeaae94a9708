//! Loading-state and error-state handling around asynchronous UI actions.
//!
//! A [HandleLoading] wraps an action (typically a form submission) so that the
//! host component gets its loading flag toggled for the duration of the action,
//! re-entrant invocations dropped while one is in flight, and failures turned
//! into an [Alert] or handed to a callback instead of being returned.
mod alert;
mod error;
mod handle_loading;
mod host;
mod logger;
#[cfg(feature = "dioxus")]
mod signal;
mod utils;

pub use alert::{next_unique_id, Alert, AlertType};
pub use error::HandleLoadingError;
pub use handle_loading::{
    ErrorCallback, ErrorSetter, ErrorTarget, HandleLoading, LoadingAction, LoadingGetter,
    LoadingSetter, LoadingState, LoggerProbe, Outcome,
};
pub use host::HostCell;
pub use logger::{ActionLogger, LogFacade, NoopLogger};
pub use utils::{log_error, CCStr};

pub mod prelude {
    pub use super::alert::{next_unique_id, Alert, AlertType};
    pub use super::error::HandleLoadingError;
    pub use super::handle_loading::{
        ErrorTarget, HandleLoading, LoadingAction, LoadingState, Outcome,
    };
    pub use super::host::HostCell;
    pub use super::logger::{ActionLogger, LogFacade, NoopLogger};
    pub use super::utils::CCStr;
}
