//! Cross-cutting error types.
//!
//! Domain-specific errors (`DatabaseError`, `RemoteError`, `EngineError`, ...)
//! live in their own crates. The CLI converges everything on `anyhow`.

use thiserror::Error;

/// Errors that can be raised by any lead crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A row status label does not belong to the row's mode.
    #[error("Status '{status}' is not valid in {mode} mode")]
    StatusOutOfMode { mode: String, status: String },

    /// Data failed validation (missing fields, malformed values).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
