//! Error types for pledge.
//!
//! These are failures of the library itself, for example a wait that ran out
//! of time. A cell's own failure channel carries the caller's reason type and
//! is never wrapped in [`Error`].

use std::time::Duration;
use thiserror::Error;

/// All pledge runtime errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// An outcome was demanded from a cell that has not settled yet
    #[error("pledge is still pending")]
    Pending,

    /// A blocking wait reached its deadline before the cell settled
    #[error("timed out after {after:?} waiting for settlement")]
    TimedOut {
        /// How long the caller waited
        after: Duration,
    },
}

/// Result type for pledge operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this is a wait timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::TimedOut { .. })
    }

    /// Check if an outcome was demanded from an unsettled cell.
    pub fn is_pending(&self) -> bool {
        matches!(self, Error::Pending)
    }
}
