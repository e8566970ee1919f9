//! Webhook sync of a session's export records, and lookup of stored sync
//! results.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{Map, Value};

use lead_core::enums::{InputKind, Mode};
use lead_core::ids::is_stored_history_id;
use lead_db::{CacheKey, LeadStore, SYNC_COLUMNS};
use lead_remote::WebhookClient;

use crate::error::EngineError;
use crate::export::{self, ExportTable};
use crate::history::{HistoryBook, SessionView, SignedIn};
use crate::processor::SingleOutcome;

pub const BATCH_RESPONSE_FILE: &str = "leads_api_result.json";
pub const SINGLE_RESPONSE_FILE: &str = "leads_single_result.json";

pub const NO_DATA_TO_MATCH: &str = "No data to match.";
pub const NO_API_RESULTS: &str = "No API results found for this entry or session.";

const ENRICHMENT_KEYS: [&str; 2] = ["custom_enrichment", "custom_enrichment_data"];

/// Response keys stored under a different column name.
const COLUMN_ALIASES: &[(&str, &str)] = &[
    ("Name", "name"),
    ("Company", "company"),
    ("Status", "status"),
    ("LinkedIn URL", "linkedin_url"),
    ("Prospect Name", "prospect_name"),
    ("Enriched Email", "enriched_email"),
    ("Prospect Company", "prospect_company"),
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncReport {
    /// Where the raw webhook response was written.
    pub response_file: PathBuf,
    /// Flattened response records; empty when the body was not JSON.
    pub records: Vec<Value>,
    /// Rows written to the sync log.
    pub stored: usize,
    pub synced: bool,
}

/// Hoist a nested enrichment object (and its `checks`) to top-level keys.
///
/// The nested object is `custom_enrichment`, `custom_enrichment_data`, or
/// any object holding both `checks` and `final_confidence`.
#[must_use]
pub fn flatten_enrichment(item: Value) -> Value {
    let Value::Object(mut object) = item else {
        return item;
    };
    let key = object
        .iter()
        .find(|(k, v)| {
            v.as_object().is_some_and(|o| {
                ENRICHMENT_KEYS.contains(&k.as_str())
                    || (o.contains_key("checks") && o.contains_key("final_confidence"))
            })
        })
        .map(|(k, _)| k.clone());

    if let Some(key) = key
        && let Some(Value::Object(enrichment)) = object.remove(&key)
    {
        for (k, v) in enrichment {
            match v {
                Value::Object(checks) if k == "checks" => object.extend(checks),
                other => {
                    object.insert(k, other);
                }
            }
        }
    }
    Value::Object(object)
}

/// Flatten a whole response body: an array of records or a single record.
#[must_use]
pub fn flatten_response(body: Value) -> Vec<Value> {
    match body {
        Value::Array(items) => items.into_iter().map(flatten_enrichment).collect(),
        Value::Null => Vec::new(),
        other => vec![flatten_enrichment(other)],
    }
}

/// Project a flattened record onto the sync-log columns.
#[must_use]
pub fn to_sync_row(item: &Value) -> Map<String, Value> {
    let mut out = Map::new();
    let Some(object) = item.as_object() else {
        return out;
    };
    for (key, value) in object {
        let column = COLUMN_ALIASES
            .iter()
            .find(|(alias, _)| *alias == key.as_str())
            .map_or(key.as_str(), |(_, column)| *column);
        if SYNC_COLUMNS.contains(&column) && !value.is_null() {
            out.insert(column.to_owned(), value.clone());
        }
    }
    out
}

/// Records posted for a session: the batch export, or the single export
/// with its message.
#[must_use]
pub fn sync_payload(view: &SessionView) -> ExportTable {
    match (view.kind, view.rows.first()) {
        (InputKind::Single, Some(row)) => {
            let outcome = SingleOutcome {
                row: row.clone(),
                message: view.message.clone(),
                cached: row.is_cached(),
            };
            export::single_export_record(view.mode, &outcome)
        }
        _ => export::export_records(&view.headers, &view.rows),
    }
}

/// POST the session's records to the webhook and record the response.
///
/// # Errors
///
/// Returns `EngineError::Remote` if the webhook call fails, or
/// `EngineError::Io` if the response file cannot be written.
pub async fn sync_session(
    webhook: &WebhookClient,
    view: &SessionView,
    book: &mut HistoryBook,
    owner: Option<SignedIn<'_>>,
    out_dir: &Path,
) -> Result<SyncReport, EngineError> {
    let payload = Value::Array(sync_payload(view).records());
    tracing::info!(url = webhook.url(), records = view.rows.len(), "syncing session");
    let body = webhook.post_results(&payload).await?;
    record_sync(view, &body, book, owner, out_dir).await
}

/// Write the raw response, then store flattened records and flag the entry
/// as synced for a signed-in user. Store failures are logged.
///
/// # Errors
///
/// Returns `EngineError::Io` if the response file cannot be written.
pub async fn record_sync(
    view: &SessionView,
    body: &[u8],
    book: &mut HistoryBook,
    owner: Option<SignedIn<'_>>,
    out_dir: &Path,
) -> Result<SyncReport, EngineError> {
    let file_name = match view.kind {
        InputKind::Bulk => BATCH_RESPONSE_FILE,
        InputKind::Single => SINGLE_RESPONSE_FILE,
    };
    let response_file = out_dir.join(file_name);
    tokio::fs::write(&response_file, body).await?;

    let records = match serde_json::from_slice::<Value>(body) {
        Ok(json) => flatten_response(json),
        Err(error) => {
            tracing::warn!(%error, "webhook response is not JSON");
            Vec::new()
        }
    };

    let mut report = SyncReport {
        response_file,
        records,
        stored: 0,
        synced: false,
    };
    let Some(owner) = owner else {
        return Ok(report);
    };
    if report.records.is_empty() {
        return Ok(report);
    }

    let rows: Vec<Map<String, Value>> = report.records.iter().map(to_sync_row).collect();
    let history_id = Some(view.history_id.as_str()).filter(|id| is_stored_history_id(id));
    match owner
        .store
        .insert_sync_rows(owner.user_id, history_id, view.mode, &rows)
        .await
    {
        Ok(n) => report.stored = n,
        Err(error) => {
            tracing::error!(%error, history_id = %view.history_id, "failed to store sync results");
            return Ok(report);
        }
    }

    book.mark_synced(&view.history_id);
    report.synced = true;
    if let Some(id) = history_id
        && let Err(error) = owner.store.mark_history_synced(id).await
    {
        tracing::error!(%error, history_id = id, "failed to flag history entry as synced");
    }
    Ok(report)
}

/// Stored sync results for a session: those recorded against its history
/// id, else any user's results matching its inputs.
///
/// # Errors
///
/// Returns `EngineError::NotFound` with [`NO_DATA_TO_MATCH`] when there is
/// nothing to match on, [`NO_API_RESULTS`] when nothing matched, or
/// `EngineError::Database` if a query fails.
pub async fn api_results(
    store: &LeadStore,
    view: &SessionView,
    limit: u32,
) -> Result<Vec<Map<String, Value>>, EngineError> {
    if is_stored_history_id(&view.history_id) {
        let by_history = store.sync_rows_for_history(&view.history_id).await?;
        if !by_history.is_empty() {
            return Ok(by_history.into_iter().map(|r| r.fields).collect());
        }
    }

    let keys = match_keys(view);
    if keys.is_empty() {
        return Err(EngineError::NotFound(NO_DATA_TO_MATCH.into()));
    }

    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for key in keys {
        for record in store.sync_rows_matching(&key, limit).await? {
            if seen.insert(record.id) {
                out.push(record.fields);
            }
        }
    }
    if out.is_empty() {
        return Err(EngineError::NotFound(NO_API_RESULTS.into()));
    }
    Ok(out)
}

fn match_keys(view: &SessionView) -> Vec<CacheKey> {
    let mut keys = Vec::new();
    if let Some(single) = &view.single {
        let key = if view.mode == Mode::Verify {
            Some(single.email.trim())
                .filter(|e| !e.is_empty())
                .map(CacheKey::email)
        } else {
            (!single.name.trim().is_empty() || !single.company.trim().is_empty())
                .then(|| CacheKey::person(&single.name, &single.company))
        };
        keys.extend(key);
    } else {
        for row in &view.rows {
            let key = CacheKey::for_row(view.mode, row).filter(|key| match key {
                CacheKey::Person { name, company } => !name.is_empty() || !company.is_empty(),
                CacheKey::Email(email) => !email.is_empty(),
            });
            if let Some(key) = key
                && !keys.contains(&key)
            {
                keys.push(key);
            }
        }
    }
    keys
}
