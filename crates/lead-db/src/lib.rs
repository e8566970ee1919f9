//! # lead-db
//!
//! libSQL persistence for the lead console: user profiles, history entries,
//! the three per-mode result tables that double as the lookup cache, and the
//! webhook sync log.
//!
//! The store is either a local database file or a hosted libSQL database.
//! Statements against a hosted store go through [`LeadDb::execute_with`] /
//! [`LeadDb::query_with`], which retry transient infrastructure errors.

pub mod error;
pub mod helpers;
mod migrations;
pub mod repos;
pub mod retry;
pub mod store;

pub use repos::cache::{CacheHit, CacheKey};
pub use repos::history::StoredHistory;
pub use repos::sync::{SYNC_COLUMNS, SyncRecord};
pub use store::LeadStore;

use error::DatabaseError;
use libsql::Builder;
use libsql::params::IntoParams;
use retry::{RetryConfig, is_transient_error};

/// Raw database handle: connection, ID generation, retrying statements.
pub struct LeadDb {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: libsql::Connection,
    retry: RetryConfig,
}

impl LeadDb {
    /// Open a local database file (or `":memory:"`).
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the file cannot be opened or migrations fail.
    pub async fn open_local(path: &str) -> Result<Self, DatabaseError> {
        let db = Builder::new_local(path).build().await?;
        Self::init(db, RetryConfig::none()).await
    }

    /// Open a hosted libSQL database.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the connection cannot be established or
    /// migrations fail.
    pub async fn open_remote(url: &str, auth_token: &str) -> Result<Self, DatabaseError> {
        let db = Builder::new_remote(url.to_owned(), auth_token.to_owned())
            .build()
            .await?;
        Self::init(db, RetryConfig::default()).await
    }

    async fn init(db: libsql::Database, retry: RetryConfig) -> Result<Self, DatabaseError> {
        let conn = db.connect()?;
        conn.execute("PRAGMA foreign_keys = ON", ())
            .await
            .map_err(|e| DatabaseError::Migration(format!("PRAGMA foreign_keys: {e}")))?;

        let lead_db = Self { db, conn, retry };
        lead_db.run_migrations().await?;
        Ok(lead_db)
    }

    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }

    /// Generate a prefixed ID via libSQL, e.g. `"his-a3f8b2c1"`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails or returns no rows.
    pub async fn generate_id(&self, prefix: &str) -> Result<String, DatabaseError> {
        let mut rows = self
            .query_with(
                &format!("SELECT '{prefix}-' || lower(hex(randomblob(4)))"),
                || (),
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        Ok(row.get::<String>(0)?)
    }

    /// Execute a statement, retrying transient hosted-store errors.
    ///
    /// `make_params` is called once per attempt.
    ///
    /// # Errors
    ///
    /// Returns the last `DatabaseError` once attempts are exhausted, or the
    /// first non-transient error immediately.
    pub async fn execute_with<P, F>(&self, sql: &str, make_params: F) -> Result<u64, DatabaseError>
    where
        P: IntoParams,
        F: Fn() -> P,
    {
        let mut attempt = 1;
        loop {
            match self.conn.execute(sql, make_params()).await {
                Ok(n) => return Ok(n),
                Err(e) if attempt < self.retry.max_attempts && is_transient_error(&e) => {
                    let delay = self.retry.delay_for(attempt);
                    tracing::warn!(attempt, ?delay, error = %e, "transient store error, retrying");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Run a query, retrying transient hosted-store errors.
    ///
    /// # Errors
    ///
    /// Returns the last `DatabaseError` once attempts are exhausted, or the
    /// first non-transient error immediately.
    pub async fn query_with<P, F>(&self, sql: &str, make_params: F) -> Result<libsql::Rows, DatabaseError>
    where
        P: IntoParams,
        F: Fn() -> P,
    {
        let mut attempt = 1;
        loop {
            match self.conn.query(sql, make_params()).await {
                Ok(rows) => return Ok(rows),
                Err(e) if attempt < self.retry.max_attempts && is_transient_error(&e) => {
                    let delay = self.retry.delay_for(attempt);
                    tracing::warn!(attempt, ?delay, error = %e, "transient store error, retrying");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    async fn test_db() -> LeadDb {
        LeadDb::open_local(":memory:").await.unwrap()
    }

    #[tokio::test]
    async fn open_local_creates_schema() {
        let db = test_db().await;
        let tables = [
            "profiles",
            "history",
            "prospect_results",
            "verification_results",
            "linkedin_results",
            "api_sync_results",
        ];
        for table in &tables {
            let mut rows = db
                .conn()
                .query(
                    "SELECT name FROM sqlite_master WHERE type='table' AND name=?1",
                    [*table],
                )
                .await
                .unwrap();
            assert!(rows.next().await.unwrap().is_some(), "table '{table}' should exist");
        }
    }

    #[tokio::test]
    async fn generate_id_correct_format() {
        let db = test_db().await;
        let id = db.generate_id("his").await.unwrap();
        assert!(id.starts_with("his-"), "ID should start with 'his-': {id}");
        assert_eq!(id.len(), 12);
        assert!(lead_core::ids::is_stored_history_id(&id));
    }

    #[tokio::test]
    async fn generate_id_all_prefixes_unique() {
        let db = test_db().await;
        let mut ids = HashSet::new();
        for prefix in lead_core::ids::ALL_PREFIXES {
            for _ in 0..20 {
                let id = db.generate_id(prefix).await.unwrap();
                assert!(id.starts_with(&format!("{prefix}-")));
                assert!(ids.insert(id.clone()), "Duplicate ID generated: {id}");
            }
        }
    }

    #[tokio::test]
    async fn idempotent_migrations() {
        let db = test_db().await;
        db.run_migrations().await.unwrap();
    }

    #[tokio::test]
    async fn sql_error_is_not_retried() {
        let db = test_db().await;
        let err = db
            .execute_with("INSERT INTO nowhere VALUES (1)", || ())
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::LibSql(_)));
    }

    #[tokio::test]
    async fn detail_rows_require_history() {
        let db = test_db().await;
        let result = db
            .execute_with(
                "INSERT INTO prospect_results (id, history_id, user_id, status) VALUES ('prs-1', 'his-missing', 'u1', 'completed')",
                || (),
            )
            .await;
        assert!(result.is_err(), "foreign key should reject orphan detail row");
    }
}
