//! History bookkeeping: building entries for finished runs, persisting them
//! for signed-in users, and keeping the per-mode in-memory lists.
//!
//! Lists are most-recent-first and capped. A batch or single entry whose
//! kind and input match an existing entry within the dedup window is
//! dropped before anything is stored. Persistence failures are logged and
//! never fail the run; the entry then keeps its client-side id.

use std::collections::HashSet;

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;

use lead_config::GeneralConfig;
use lead_core::entities::{ColumnMapping, HistoryBuckets, HistoryEntry, Row, Snapshot};
use lead_core::enums::{InputKind, Mode, RowStatus};
use lead_db::{LeadStore, StoredHistory};

use crate::error::EngineError;
use crate::ids;
use crate::legacy;
use crate::processor::{ALREADY_PROCESSED, SingleInput, SingleOutcome};

pub const BULK_SESSION_LABEL: &str = "Bulk Session";
pub const DEFAULT_HEADERS: [&str; 4] = ["Name", "Company", "Email", "Status"];

/// A signed-in user's store handle.
#[derive(Clone, Copy)]
pub struct SignedIn<'a> {
    pub store: &'a LeadStore,
    pub user_id: &'a str,
}

/// What happened to an entry handed to [`HistoryBook::record`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Finalized {
    pub entry: HistoryEntry,
    /// The entry (and its rows) reached the store; `entry.id` is the store id.
    pub stored: bool,
    /// Dropped as a repeat of a recent entry; nothing was stored or listed.
    pub duplicate: bool,
}

/// Entry for a completed batch.
#[must_use]
pub fn batch_entry(
    mode: Mode,
    rows: Vec<Row>,
    headers: Vec<String>,
    mapping: Option<ColumnMapping>,
    source_label: Option<&str>,
    now: DateTime<Utc>,
) -> HistoryEntry {
    let result = format!("{} Records processed", rows.len());
    let mut entry = new_entry(
        ids::bulk_id(now),
        InputKind::Bulk,
        mode,
        source_label.unwrap_or(BULK_SESSION_LABEL).to_owned(),
        result,
        RowStatus::Completed,
        now,
    );
    set_cache_flags(&mut entry, &rows);
    entry.snapshot = Snapshot::Full(rows);
    entry.headers = headers;
    entry.mapping = mapping;
    entry
}

/// Entry for a retry pass; `rows` is the whole batch, `retried` how many
/// rows were looked up again.
#[must_use]
pub fn retry_entry(
    mode: Mode,
    rows: Vec<Row>,
    headers: Vec<String>,
    mapping: Option<ColumnMapping>,
    source_label: Option<&str>,
    retried: usize,
    now: DateTime<Utc>,
) -> HistoryEntry {
    let mut entry = new_entry(
        ids::bulk_retry_id(now),
        InputKind::Bulk,
        mode,
        format!("Retry: {}", source_label.unwrap_or(BULK_SESSION_LABEL)),
        format!("{retried} Failed records retried"),
        RowStatus::Completed,
        now,
    );
    entry.snapshot = Snapshot::Full(rows);
    entry.headers = headers;
    entry.mapping = mapping;
    entry
}

/// Entry for a single lookup (or its retry).
#[must_use]
pub fn single_entry(
    mode: Mode,
    input: &SingleInput,
    outcome: &SingleOutcome,
    retry: bool,
    now: DateTime<Utc>,
) -> HistoryEntry {
    let (id, label) = if retry {
        (ids::single_retry_id(now), format!("Retry: {}", input.label(mode)))
    } else {
        (ids::single_id(now), input.label(mode))
    };
    let mut entry = new_entry(
        id,
        InputKind::Single,
        mode,
        label,
        outcome.result_label(mode),
        outcome.row.status,
        now,
    );
    let rows = vec![outcome.row.clone()];
    set_cache_flags(&mut entry, &rows);
    entry.synced = outcome.row.cache.as_ref().is_some_and(|c| c.globally_synced);
    entry.snapshot = Snapshot::Full(rows);
    entry
}

fn new_entry(
    id: String,
    kind: InputKind,
    mode: Mode,
    input: String,
    result: String,
    status: RowStatus,
    timestamp: DateTime<Utc>,
) -> HistoryEntry {
    HistoryEntry {
        id,
        kind,
        mode,
        input,
        result,
        status,
        timestamp,
        snapshot: Snapshot::Full(Vec::new()),
        headers: Vec::new(),
        mapping: None,
        has_cached: false,
        cached_at: None,
        cached_via: None,
        synced: false,
    }
}

fn set_cache_flags(entry: &mut HistoryEntry, rows: &[Row]) {
    let first = rows.iter().find_map(|row| row.cache.as_ref());
    entry.has_cached = first.is_some();
    entry.cached_at = first.map(|c| c.cached_at);
    entry.cached_via = first.and_then(|c| c.cached_via);
}

/// Per-mode history lists held for the current user.
#[derive(Debug, Clone)]
pub struct HistoryBook {
    buckets: HistoryBuckets,
    cap: usize,
    dedup_window: TimeDelta,
}

impl HistoryBook {
    #[must_use]
    pub fn new(cap: usize, dedup_window_ms: i64) -> Self {
        Self {
            buckets: HistoryBuckets::default(),
            cap,
            dedup_window: TimeDelta::milliseconds(dedup_window_ms),
        }
    }

    #[must_use]
    pub fn from_config(general: &GeneralConfig) -> Self {
        Self::new(general.history_cap, general.dedup_window_ms)
    }

    #[must_use]
    pub const fn buckets(&self) -> &HistoryBuckets {
        &self.buckets
    }

    #[must_use]
    pub fn entries(&self, mode: Mode) -> &[HistoryEntry] {
        self.buckets.get(mode)
    }

    #[must_use]
    pub fn find(&self, id: &str) -> Option<&HistoryEntry> {
        self.buckets.find(id)
    }

    /// Swap in freshly fetched lists, trimmed to the cap.
    pub fn replace(&mut self, mut buckets: HistoryBuckets) {
        for mode in Mode::ALL {
            buckets.get_mut(mode).truncate(self.cap);
        }
        self.buckets = buckets;
    }

    pub fn clear(&mut self) {
        self.buckets.clear();
    }

    /// Same kind and input as an entry less than the dedup window apart.
    #[must_use]
    pub fn is_duplicate(&self, entry: &HistoryEntry) -> bool {
        self.entries(entry.mode).iter().any(|existing| {
            existing.kind == entry.kind
                && existing.input == entry.input
                && (existing.timestamp - entry.timestamp).abs() < self.dedup_window
        })
    }

    pub fn prepend(&mut self, entry: HistoryEntry) {
        let list = self.buckets.get_mut(entry.mode);
        list.insert(0, entry);
        list.truncate(self.cap);
    }

    /// Flag an entry as synced; `false` if it is not listed.
    pub fn mark_synced(&mut self, id: &str) -> bool {
        match self.buckets.find_mut(id) {
            Some(entry) => {
                entry.synced = true;
                if let Snapshot::Minimal(stub) = &mut entry.snapshot {
                    stub.synced = true;
                }
                true
            }
            None => false,
        }
    }

    /// Dedup (when asked), persist for a signed-in user, then list the entry.
    pub async fn record(
        &mut self,
        mut entry: HistoryEntry,
        dedup: bool,
        owner: Option<SignedIn<'_>>,
    ) -> Finalized {
        if dedup && self.is_duplicate(&entry) {
            tracing::debug!(input = %entry.input, mode = %entry.mode, "dropping duplicate history entry");
            return Finalized {
                entry,
                stored: false,
                duplicate: true,
            };
        }
        let stored = match owner {
            Some(owner) => persist(&mut entry, owner).await,
            None => false,
        };
        self.prepend(entry.clone());
        Finalized {
            entry,
            stored,
            duplicate: false,
        }
    }

    pub async fn finalize_batch(
        &mut self,
        mode: Mode,
        rows: Vec<Row>,
        headers: Vec<String>,
        mapping: Option<ColumnMapping>,
        source_label: Option<&str>,
        owner: Option<SignedIn<'_>>,
    ) -> Finalized {
        let entry = batch_entry(mode, rows, headers, mapping, source_label, Utc::now());
        self.record(entry, true, owner).await
    }

    /// Retry entries are always kept, even right after the original.
    #[allow(clippy::too_many_arguments)]
    pub async fn finalize_retry(
        &mut self,
        mode: Mode,
        rows: Vec<Row>,
        headers: Vec<String>,
        mapping: Option<ColumnMapping>,
        source_label: Option<&str>,
        retried: usize,
        owner: Option<SignedIn<'_>>,
    ) -> Finalized {
        let entry = retry_entry(mode, rows, headers, mapping, source_label, retried, Utc::now());
        self.record(entry, false, owner).await
    }

    pub async fn finalize_single(
        &mut self,
        mode: Mode,
        input: &SingleInput,
        outcome: &SingleOutcome,
        retry: bool,
        owner: Option<SignedIn<'_>>,
    ) -> Finalized {
        let entry = single_entry(mode, input, outcome, retry, Utc::now());
        self.record(entry, !retry, owner).await
    }

    /// Reload the lists from the store.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Database` if the history cannot be read.
    pub async fn load(&mut self, owner: SignedIn<'_>, limit: u32) -> Result<(), EngineError> {
        let buckets = fetch_history(owner.store, owner.user_id, limit).await?;
        self.replace(buckets);
        Ok(())
    }
}

async fn persist(entry: &mut HistoryEntry, owner: SignedIn<'_>) -> bool {
    let id = match owner.store.insert_history(owner.user_id, entry).await {
        Ok(id) => id,
        Err(error) => {
            tracing::error!(%error, entry = %entry.id, "failed to store history entry");
            return false;
        }
    };
    if let Some(rows) = entry.rows()
        && let Err(error) = owner
            .store
            .insert_results(entry.mode, &id, owner.user_id, rows, entry.mapping.as_ref())
            .await
    {
        tracing::error!(%error, history_id = %id, "failed to store result rows");
    }
    entry.id = id;
    true
}

/// A user's stored history, newest first, split by mode.
///
/// Untagged legacy rows are bucketed by [`legacy::classify`]. An entry counts
/// as synced when the sync log has records for it or its stub says so.
///
/// # Errors
///
/// Returns `EngineError::Database` if either query fails.
pub async fn fetch_history(
    store: &LeadStore,
    user_id: &str,
    limit: u32,
) -> Result<HistoryBuckets, EngineError> {
    let stored = store.list_history(user_id, limit).await?;
    let synced = store.synced_history_ids(user_id).await?;
    let mut buckets = HistoryBuckets::default();
    for row in stored {
        let entry = entry_from_stored(row, &synced);
        buckets.get_mut(entry.mode).push(entry);
    }
    Ok(buckets)
}

fn entry_from_stored(stored: StoredHistory, synced_ids: &HashSet<String>) -> HistoryEntry {
    let mode = stored.feature.unwrap_or_else(|| {
        legacy::classify(
            stored.kind,
            &stored.input,
            &stored.result,
            stored.first_item.as_ref(),
        )
    });
    let status = stored
        .status
        .as_deref()
        .and_then(RowStatus::parse_stored)
        .unwrap_or(RowStatus::Completed);
    let synced = synced_ids.contains(&stored.id) || stored.stub.synced;
    HistoryEntry {
        id: stored.id,
        kind: stored.kind,
        mode,
        input: stored.input,
        result: stored.result,
        status,
        timestamp: stored.timestamp,
        has_cached: stored.stub.has_cached,
        cached_at: stored.stub.cached_at,
        cached_via: stored.stub.cached_type,
        synced,
        snapshot: Snapshot::Minimal(stored.stub),
        headers: stored.headers,
        mapping: stored.mapping,
    }
}

/// A history entry opened for viewing, export or sync.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionView {
    pub history_id: String,
    pub mode: Mode,
    pub kind: InputKind,
    pub input: String,
    pub headers: Vec<String>,
    pub mapping: Option<ColumnMapping>,
    pub rows: Vec<Row>,
    /// Restored form fields for single entries.
    pub single: Option<SingleInput>,
    pub message: Option<String>,
}

impl SessionView {
    /// Label of the original input, without any `Retry: ` prefix.
    #[must_use]
    pub fn source_label(&self) -> &str {
        self.input.strip_prefix("Retry: ").unwrap_or(&self.input)
    }
}

/// Open a history entry.
///
/// Full snapshots are used as-is; minimal ones are rebuilt from the mode's
/// result table.
///
/// # Errors
///
/// Returns `EngineError::NotSignedIn` for a minimal entry without a store,
/// or `EngineError::Database` if the rows cannot be read.
pub async fn load_session(
    entry: &HistoryEntry,
    store: Option<&LeadStore>,
) -> Result<SessionView, EngineError> {
    let (rows, minimal) = match &entry.snapshot {
        Snapshot::Full(rows) => (rows.clone(), false),
        Snapshot::Minimal(_) => {
            let store = store.ok_or(EngineError::NotSignedIn("open stored sessions"))?;
            (store.results_for_history(entry.mode, &entry.id).await?, true)
        }
    };

    let headers = if entry.headers.is_empty() && minimal {
        DEFAULT_HEADERS.iter().map(|h| (*h).to_owned()).collect()
    } else {
        entry.headers.clone()
    };

    let (single, message) = if entry.kind == InputKind::Single {
        let label = entry.input.strip_prefix("Retry: ").unwrap_or(&entry.input);
        let message = if minimal || rows.first().is_some_and(Row::is_cached) {
            Some(ALREADY_PROCESSED.to_owned())
        } else {
            rows.first().and_then(|row| row.error.clone())
        };
        (Some(SingleInput::from_label(entry.mode, label)), message)
    } else {
        (None, None)
    };

    Ok(SessionView {
        history_id: entry.id.clone(),
        mode: entry.mode,
        kind: entry.kind,
        input: entry.input.clone(),
        headers,
        mapping: entry.mapping.clone(),
        rows,
        single,
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::test_store;
    use lead_core::entities::{CacheProvenance, EnrichResult, ModeResult, Record};
    use pretty_assertions::assert_eq;

    fn rows() -> Vec<Row> {
        let mut ada = Row::pending(
            "0",
            "Ada",
            "Analytical",
            None,
            [("Name", "Ada"), ("Company", "Analytical")].into_iter().collect(),
        );
        ada.status = RowStatus::Completed;
        ada.email = Some("ada@analytical.io".into());
        ada.result = Some(ModeResult::Enrich(EnrichResult {
            email: Some("ada@analytical.io".into()),
        }));
        let mut bob = Row::pending("1", "Bob", "Acme", None, Record::new());
        bob.status = RowStatus::NotFound;
        vec![ada, bob]
    }

    fn headers() -> Vec<String> {
        vec!["Name".into(), "Company".into()]
    }

    #[test]
    fn batch_entry_summarizes_rows() {
        let mut rs = rows();
        let cached_at = Utc::now() - TimeDelta::days(2);
        rs[1].cache = Some(CacheProvenance {
            cached_at,
            cached_via: Some(InputKind::Single),
            globally_synced: false,
        });
        let entry = batch_entry(Mode::Enrich, rs, headers(), None, Some("leads.csv"), Utc::now());
        assert!(entry.id.starts_with("bulk-"));
        assert_eq!(entry.input, "leads.csv");
        assert_eq!(entry.result, "2 Records processed");
        assert_eq!(entry.status, RowStatus::Completed);
        assert!(entry.has_cached);
        assert_eq!(entry.cached_at, Some(cached_at));
        assert_eq!(entry.cached_via, Some(InputKind::Single));
    }

    #[test]
    fn retry_entry_labels() {
        let entry = retry_entry(Mode::Enrich, rows(), headers(), None, None, 1, Utc::now());
        assert!(entry.id.starts_with("bulk-retry-"));
        assert_eq!(entry.input, "Retry: Bulk Session");
        assert_eq!(entry.result, "1 Failed records retried");
    }

    #[tokio::test]
    async fn duplicate_within_window_is_dropped() {
        let mut book = HistoryBook::new(100, 2000);
        let first = book
            .finalize_batch(Mode::Enrich, rows(), headers(), None, Some("leads.csv"), None)
            .await;
        assert!(!first.duplicate);
        let second = book
            .finalize_batch(Mode::Enrich, rows(), headers(), None, Some("leads.csv"), None)
            .await;
        assert!(second.duplicate);
        assert_eq!(book.entries(Mode::Enrich).len(), 1);

        let other = book
            .finalize_batch(Mode::Enrich, rows(), headers(), None, Some("other.csv"), None)
            .await;
        assert!(!other.duplicate);
        assert_eq!(book.entries(Mode::Enrich)[0].input, "other.csv");
    }

    #[tokio::test]
    async fn retry_is_never_deduplicated() {
        let mut book = HistoryBook::new(100, 2000);
        for _ in 0..2 {
            let done = book
                .finalize_retry(Mode::Enrich, rows(), headers(), None, None, 1, None)
                .await;
            assert!(!done.duplicate);
        }
        assert_eq!(book.entries(Mode::Enrich).len(), 2);
    }

    #[test]
    fn prepend_caps_list() {
        let mut book = HistoryBook::new(2, 0);
        for label in ["a", "b", "c"] {
            book.prepend(batch_entry(Mode::Verify, vec![], vec![], None, Some(label), Utc::now()));
        }
        let inputs: Vec<&str> = book.entries(Mode::Verify).iter().map(|e| e.input.as_str()).collect();
        assert_eq!(inputs, vec!["c", "b"]);
    }

    #[tokio::test]
    async fn finalized_batches_never_exceed_default_cap() {
        let mut book = HistoryBook::new(100, 0);
        for i in 0..150 {
            let label = format!("sheet-{i}.csv");
            let done = book
                .finalize_batch(Mode::Enrich, rows(), headers(), None, Some(&label), None)
                .await;
            assert!(!done.duplicate);
            assert!(!done.stored);
        }
        let entries = book.entries(Mode::Enrich);
        assert_eq!(entries.len(), 100);
        assert_eq!(entries[0].input, "sheet-149.csv");
        assert_eq!(entries[99].input, "sheet-50.csv");
        assert!(book.entries(Mode::Verify).is_empty());
    }

    #[tokio::test]
    async fn signed_in_runs_get_store_ids_and_reload() {
        let store = test_store().await;
        let owner = SignedIn {
            store: &store,
            user_id: "u1",
        };
        let mut book = HistoryBook::new(100, 2000);
        let done = book
            .finalize_batch(
                Mode::Enrich,
                rows(),
                headers(),
                Some(ColumnMapping::new(Some("Name"), Some("Company"), None)),
                Some("leads.csv"),
                Some(owner),
            )
            .await;
        assert!(done.stored);
        assert!(lead_core::ids::is_stored_history_id(&done.entry.id));
        assert_eq!(book.entries(Mode::Enrich)[0].id, done.entry.id);

        let mut reloaded = HistoryBook::new(100, 2000);
        reloaded.load(owner, 200).await.unwrap();
        let entry = reloaded.find(&done.entry.id).unwrap().clone();
        assert!(matches!(entry.snapshot, Snapshot::Minimal(_)));
        assert_eq!(entry.mode, Mode::Enrich);

        let view = load_session(&entry, Some(&store)).await.unwrap();
        assert_eq!(view.rows.len(), 2);
        assert_eq!(view.rows[0].email(), Some("ada@analytical.io"));
        assert_eq!(view.headers, headers());
        assert_eq!(view.single, None);
    }

    #[tokio::test]
    async fn minimal_entry_needs_store() {
        let mut entry = batch_entry(Mode::Enrich, vec![], vec![], None, None, Utc::now());
        entry.snapshot = Snapshot::Minimal(lead_core::entities::MinimalStub::default());
        let err = load_session(&entry, None).await.unwrap_err();
        assert!(matches!(err, EngineError::NotSignedIn(_)));
    }

    #[tokio::test]
    async fn single_session_restores_form() {
        let mut row = Row::pending("single-row-1", "Ada", "Analytical", None, Record::new());
        row.status = RowStatus::NotFound;
        row.error = Some("No email found".into());
        let outcome = SingleOutcome {
            row,
            message: Some("No email found".into()),
            cached: false,
        };
        let input = SingleInput::person("Ada", "Analytical");
        let entry = single_entry(Mode::Enrich, &input, &outcome, true, Utc::now());
        assert_eq!(entry.input, "Retry: Ada @ Analytical");
        assert_eq!(entry.result, "not_found");

        let view = load_session(&entry, None).await.unwrap();
        assert_eq!(view.single, Some(input));
        assert_eq!(view.message.as_deref(), Some("No email found"));
        assert_eq!(view.source_label(), "Ada @ Analytical");
    }

    #[test]
    fn stored_rows_are_bucketed() {
        let stored = StoredHistory {
            id: "his-00000001".into(),
            user_id: "u1".into(),
            kind: InputKind::Single,
            feature: None,
            input: "ada@analytical.io".into(),
            result: "valid".into(),
            status: Some("valid".into()),
            timestamp: Utc::now(),
            stub: lead_core::entities::MinimalStub::default(),
            first_item: None,
            headers: vec![],
            mapping: None,
        };
        let synced: HashSet<String> = ["his-00000001".to_owned()].into_iter().collect();
        let entry = entry_from_stored(stored, &synced);
        assert_eq!(entry.mode, Mode::Verify);
        assert_eq!(entry.status, RowStatus::Deliverable);
        assert!(entry.synced);
    }
}
