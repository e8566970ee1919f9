//! Database error types for lead-db.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Query failed: {0}")]
    Query(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    /// Expected a result row but none was returned.
    #[error("No result returned")]
    NoResult,

    /// A lookup by id found nothing.
    #[error("{entity} '{id}' not found")]
    NotFound { entity: &'static str, id: String },

    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    #[error("JSON column error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
