//! Error types for lead-engine.

use lead_core::errors::CoreError;
use lead_db::error::DatabaseError;
use lead_remote::RemoteError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Spreadsheet could not be used; the message is shown as-is.
    #[error("{0}")]
    Import(String),

    /// Form-level input problem, e.g. a missing name or email.
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    /// The operation needs a signed-in user and a store.
    #[error("sign in to {0}")]
    NotSignedIn(&'static str),

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("XLSX error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
