//! Error types for the task timer

use thiserror::Error;

/// Errors surfaced by [`AppState`](crate::state::AppState) and the HTTP layer
#[derive(Debug, Error)]
pub enum AppError {
    /// A mutex guarding shared state was poisoned by a panicking holder.
    #[error("failed to lock {0} state")]
    LockPoisoned(&'static str),

    /// No completion record with the given id.
    #[error("completion {0} not found")]
    CompletionNotFound(u64),

    /// A request field could not be understood.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The requested control is disabled in the timer's current phase.
    #[error("{0}")]
    Conflict(String),
}

pub type Result<T> = std::result::Result<T, AppError>;
