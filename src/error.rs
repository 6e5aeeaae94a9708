use thiserror::Error;

use crate::utils::CCStr;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HandleLoadingError {
    /// The wrapped action failed but the wrapper has neither an error field
    /// nor an error callback to report it to.
    #[error("{text}")]
    UnboundErrorTarget { text: CCStr },
}
