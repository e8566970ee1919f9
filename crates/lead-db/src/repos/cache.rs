//! Lookup cache over the per-mode detail tables.
//!
//! Stored results from every user are candidates. Among the records matching
//! a key (case-insensitive, trimmed), the oldest one with a cache-success
//! status wins; when none qualifies the most recent record is reused.

use chrono::{DateTime, Utc};

use lead_core::entities::{CacheProvenance, EnrichResult, LinkedinResult, ModeResult, Row, RowUpdate};
use lead_core::enums::{InputKind, Mode, RowStatus};

use crate::error::DatabaseError;
use crate::helpers::parse_datetime;
use crate::repos::results::{StoredResult, results_table, select_columns, stored_row};
use crate::store::LeadStore;

/// Normalized lookup key: trimmed and lowercased.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Person { name: String, company: String },
    Email(String),
}

impl CacheKey {
    #[must_use]
    pub fn person(name: &str, company: &str) -> Self {
        Self::Person {
            name: name.trim().to_lowercase(),
            company: company.trim().to_lowercase(),
        }
    }

    #[must_use]
    pub fn email(email: &str) -> Self {
        Self::Email(email.trim().to_lowercase())
    }

    /// Key for `row` in `mode`; `None` for a verify row without an email.
    #[must_use]
    pub fn for_row(mode: Mode, row: &Row) -> Option<Self> {
        if mode.keyed_by_email() {
            row.email().map(Self::email)
        } else {
            Some(Self::person(&row.name, &row.company))
        }
    }
}

/// A reusable stored result.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheHit {
    pub status: RowStatus,
    pub error: Option<String>,
    pub result: Option<ModeResult>,
    /// When the reused record was stored.
    pub cached_at: DateTime<Utc>,
    pub cached_via: Option<InputKind>,
    pub globally_synced: bool,
    pub history_id: Option<String>,
}

impl CacheHit {
    #[must_use]
    pub fn provenance(&self) -> CacheProvenance {
        CacheProvenance {
            cached_at: self.cached_at,
            cached_via: self.cached_via,
            globally_synced: self.globally_synced,
        }
    }

    /// Row update reproducing the stored outcome.
    #[must_use]
    pub fn to_update(&self) -> RowUpdate {
        RowUpdate {
            status: self.status,
            error: self.error.clone(),
            result: self.result.clone(),
            cache: Some(self.provenance()),
        }
    }

    /// Email carried by an enrich hit.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        match &self.result {
            Some(ModeResult::Enrich(EnrichResult { email })) => email.as_deref(),
            _ => None,
        }
    }

    /// Profile URL carried by a LinkedIn hit.
    #[must_use]
    pub fn linkedin_url(&self) -> Option<&str> {
        match &self.result {
            Some(ModeResult::Linkedin(LinkedinResult { url })) => url.as_deref(),
            _ => None,
        }
    }
}

impl LeadStore {
    /// Look up a prior result for `key` in `mode`'s detail table.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the candidate query fails; callers in the
    /// pipeline treat that as a miss. Provenance lookups that fail are logged
    /// and leave `cached_via`/`globally_synced` unset.
    pub async fn find_cached(
        &self,
        mode: Mode,
        key: &CacheKey,
    ) -> Result<Option<CacheHit>, DatabaseError> {
        let (filter, params) = match key {
            CacheKey::Person { name, company } => (
                "lower(trim(coalesce(name, ''))) = ?1 AND lower(trim(coalesce(company, ''))) = ?2",
                vec![
                    libsql::Value::from(name.as_str()),
                    libsql::Value::from(company.as_str()),
                ],
            ),
            CacheKey::Email(email) => (
                "lower(trim(coalesce(email, ''))) = ?1",
                vec![libsql::Value::from(email.as_str())],
            ),
        };
        let sql = format!(
            "SELECT {} FROM {} WHERE {filter} ORDER BY created_at ASC, rowid ASC LIMIT {}",
            select_columns(mode),
            results_table(mode),
            self.cache_scan_limit()
        );

        let mut rows = self
            .db()
            .query_with(&sql, || libsql::params_from_iter(params.clone()))
            .await?;
        let mut candidates = Vec::new();
        while let Some(row) = rows.next().await? {
            candidates.push(stored_row(mode, &row)?);
        }

        let Some(chosen) = choose(candidates) else {
            tracing::debug!(%mode, ?key, "cache miss");
            return Ok(None);
        };

        // Provenance is best effort; a failed lookup here must not lose the hit.
        let cached_via = match chosen.history_id.as_deref() {
            Some(hid) => match self.history_kind_and_stub(hid).await {
                Ok(found) => found.map(|(kind, stub)| stub.cached_type.unwrap_or(kind)),
                Err(error) => {
                    tracing::warn!(%mode, history_id = hid, %error, "cannot read cache provenance");
                    None
                }
            },
            None => None,
        };
        let globally_synced = self.is_globally_synced(key).await.unwrap_or_else(|error| {
            tracing::warn!(%mode, ?key, %error, "cannot check global sync state");
            false
        });
        let cached_at = parse_datetime(&chosen.created_at)?;

        tracing::debug!(%mode, ?key, status = %chosen.row.status, "cache hit");
        Ok(Some(CacheHit {
            status: chosen.row.status,
            error: chosen.row.error,
            result: chosen.row.result,
            cached_at,
            cached_via,
            globally_synced,
            history_id: chosen.history_id,
        }))
    }
}

/// Oldest cache-success record, else the most recent one.
fn choose(candidates: Vec<StoredResult>) -> Option<StoredResult> {
    let success = candidates
        .iter()
        .position(|c| c.row.status.is_cache_success());
    match success {
        Some(idx) => candidates.into_iter().nth(idx),
        None => candidates.into_iter().last(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lead_core::entities::{HistoryEntry, Record, Snapshot, VerifyResult};
    use pretty_assertions::assert_eq;

    async fn history(store: &LeadStore, mode: Mode, kind: InputKind, via: Option<InputKind>) -> String {
        let entry = HistoryEntry {
            id: "tmp".into(),
            kind,
            mode,
            input: "x".into(),
            result: String::new(),
            status: RowStatus::Completed,
            timestamp: Utc::now(),
            snapshot: Snapshot::Full(vec![]),
            headers: vec![],
            mapping: None,
            has_cached: via.is_some(),
            cached_at: None,
            cached_via: via,
            synced: false,
        };
        store.insert_history("u1", &entry).await.unwrap()
    }

    fn enrich_row(name: &str, company: &str, status: RowStatus, email: Option<&str>) -> Row {
        let mut row = Row::pending("0", name, company, email.map(str::to_owned), Record::new());
        row.status = status;
        if status != RowStatus::Failed {
            row.result = Some(ModeResult::Enrich(EnrichResult {
                email: email.map(str::to_owned),
            }));
        }
        row
    }

    async fn backdate(store: &LeadStore, table: &str, created_at: &str) {
        store
            .db()
            .execute_with(
                &format!("UPDATE {table} SET created_at = ?1 WHERE rowid = (SELECT max(rowid) FROM {table})"),
                || [created_at],
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn miss_when_nothing_stored() {
        let store = LeadStore::open_local(":memory:").await.unwrap();
        let hit = store
            .find_cached(Mode::Enrich, &CacheKey::person("Ada", "Analytical"))
            .await
            .unwrap();
        assert!(hit.is_none());
    }

    #[tokio::test]
    async fn oldest_success_beats_newer_failure() {
        let store = LeadStore::open_local(":memory:").await.unwrap();
        let old = history(&store, Mode::Enrich, InputKind::Bulk, None).await;
        store
            .insert_results(
                Mode::Enrich,
                &old,
                "u1",
                &[enrich_row("Ada", "Analytical", RowStatus::Completed, Some("ada@analytical.io"))],
                None,
            )
            .await
            .unwrap();
        backdate(&store, "prospect_results", "2025-01-01T00:00:00.000000Z").await;

        let newer = history(&store, Mode::Enrich, InputKind::Single, None).await;
        store
            .insert_results(
                Mode::Enrich,
                &newer,
                "u2",
                &[enrich_row("ada", "ANALYTICAL", RowStatus::Failed, None)],
                None,
            )
            .await
            .unwrap();

        let hit = store
            .find_cached(Mode::Enrich, &CacheKey::person(" ADA ", "analytical"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(hit.status, RowStatus::Completed);
        assert_eq!(hit.email(), Some("ada@analytical.io"));
        assert_eq!(hit.cached_via, Some(InputKind::Bulk));
        assert_eq!(hit.history_id.as_deref(), Some(old.as_str()));
        assert!(!hit.globally_synced);
    }

    #[tokio::test]
    async fn falls_back_to_most_recent_without_success() {
        let store = LeadStore::open_local(":memory:").await.unwrap();
        let hid = history(&store, Mode::Enrich, InputKind::Bulk, None).await;
        let mut first = enrich_row("Ada", "Analytical", RowStatus::Failed, None);
        first.error = Some("API Error: 500 first".into());
        let mut second = enrich_row("Ada", "Analytical", RowStatus::Failed, None);
        second.error = Some("API Error: 502 second".into());
        store
            .insert_results(Mode::Enrich, &hid, "u1", &[first, second], None)
            .await
            .unwrap();

        let hit = store
            .find_cached(Mode::Enrich, &CacheKey::person("Ada", "Analytical"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(hit.status, RowStatus::Failed);
        assert_eq!(hit.error.as_deref(), Some("API Error: 502 second"));
    }

    #[tokio::test]
    async fn cached_via_prefers_stub_cached_type() {
        let store = LeadStore::open_local(":memory:").await.unwrap();
        let hid = history(&store, Mode::Linkedin, InputKind::Single, Some(InputKind::Bulk)).await;
        let mut row = Row::pending("0", "Ada", "Analytical", None, Record::new());
        row.status = RowStatus::Found;
        row.linkedin_url = Some("https://www.linkedin.com/in/ada".into());
        row.result = Some(ModeResult::Linkedin(LinkedinResult {
            url: row.linkedin_url.clone(),
        }));
        store
            .insert_results(Mode::Linkedin, &hid, "u1", &[row], None)
            .await
            .unwrap();

        let hit = store
            .find_cached(Mode::Linkedin, &CacheKey::person("Ada", "Analytical"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(hit.cached_via, Some(InputKind::Bulk));
        assert_eq!(hit.linkedin_url(), Some("https://www.linkedin.com/in/ada"));
    }

    #[tokio::test]
    async fn verify_hit_by_email_with_global_sync_flag() {
        let store = LeadStore::open_local(":memory:").await.unwrap();
        let hid = history(&store, Mode::Verify, InputKind::Single, None).await;
        let mut row = Row::pending("0", "", "", Some("A@B.com".into()), Record::new());
        row.status = RowStatus::Deliverable;
        row.result = Some(ModeResult::Verify(VerifyResult {
            verdict: Some("deliverable".into()),
            raw: None,
        }));
        store
            .insert_results(Mode::Verify, &hid, "u1", &[row], None)
            .await
            .unwrap();
        let sync = serde_json::json!({"email_used": "a@b.com"});
        store
            .insert_sync_rows("u9", None, Mode::Verify, &[sync.as_object().unwrap().clone()])
            .await
            .unwrap();

        let hit = store
            .find_cached(Mode::Verify, &CacheKey::email("a@b.com"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(hit.status, RowStatus::Deliverable);
        assert!(hit.globally_synced);
        let update = hit.to_update();
        assert!(update.cache.unwrap().globally_synced);
    }

    #[tokio::test]
    async fn hit_survives_broken_provenance() {
        let store = LeadStore::open_local(":memory:").await.unwrap();
        let hid = history(&store, Mode::Enrich, InputKind::Single, Some(InputKind::Bulk)).await;
        store
            .insert_results(
                Mode::Enrich,
                &hid,
                "u1",
                &[enrich_row("Ada", "Analytical", RowStatus::Completed, Some("ada@analytical.io"))],
                None,
            )
            .await
            .unwrap();
        store
            .db()
            .execute_with("UPDATE history SET data = '{not json' WHERE id = ?1", || [hid.as_str()])
            .await
            .unwrap();
        store
            .db()
            .execute_with("DROP TABLE api_sync_results", || ())
            .await
            .unwrap();

        let hit = store
            .find_cached(Mode::Enrich, &CacheKey::person("Ada", "Analytical"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(hit.status, RowStatus::Completed);
        assert_eq!(hit.email(), Some("ada@analytical.io"));
        assert_eq!(hit.cached_via, None);
        assert!(!hit.globally_synced);
        assert_eq!(hit.history_id.as_deref(), Some(hid.as_str()));
    }

    #[test]
    fn verify_row_without_email_has_no_key() {
        let row = Row::pending("0", "Ada", "Analytical", None, Record::new());
        assert_eq!(CacheKey::for_row(Mode::Verify, &row), None);
        assert_eq!(
            CacheKey::for_row(Mode::Enrich, &row),
            Some(CacheKey::person("ada", "analytical"))
        );
    }
}
