//! Embedded schema migrations, run on every open.

use crate::LeadDb;
use crate::error::DatabaseError;

/// Profiles, history, the three per-mode result tables, and the sync log.
const MIGRATION_001: &str = include_str!("../migrations/001_initial.sql");

impl LeadDb {
    pub(crate) async fn run_migrations(&self) -> Result<(), DatabaseError> {
        self.conn
            .execute_batch(MIGRATION_001)
            .await
            .map_err(|e| DatabaseError::Migration(format!("001_initial: {e}")))?;
        Ok(())
    }
}
