//! Repository layer over [`LeadDb`].
//!
//! All repo methods are implemented as `impl LeadStore` in `repos/*`.

use crate::LeadDb;
use crate::error::DatabaseError;

/// Default number of stored results scanned per cache lookup.
pub const DEFAULT_CACHE_SCAN_LIMIT: u32 = 50;

pub struct LeadStore {
    db: LeadDb,
    cache_scan_limit: u32,
}

impl LeadStore {
    /// Open a local store (`":memory:"` for tests).
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened.
    pub async fn open_local(path: &str) -> Result<Self, DatabaseError> {
        Ok(Self::from_db(LeadDb::open_local(path).await?))
    }

    /// Open a hosted store.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the connection cannot be established.
    pub async fn open_remote(url: &str, auth_token: &str) -> Result<Self, DatabaseError> {
        Ok(Self::from_db(LeadDb::open_remote(url, auth_token).await?))
    }

    #[must_use]
    pub const fn from_db(db: LeadDb) -> Self {
        Self {
            db,
            cache_scan_limit: DEFAULT_CACHE_SCAN_LIMIT,
        }
    }

    #[must_use]
    pub const fn with_cache_scan_limit(mut self, limit: u32) -> Self {
        self.cache_scan_limit = limit;
        self
    }

    #[must_use]
    pub const fn db(&self) -> &LeadDb {
        &self.db
    }

    #[must_use]
    pub const fn cache_scan_limit(&self) -> u32 {
        self.cache_scan_limit
    }
}
