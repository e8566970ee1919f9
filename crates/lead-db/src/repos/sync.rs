//! Webhook sync log (`api_sync_results`).
//!
//! One row per record returned by a user's webhook, flattened into a fixed
//! column set. Rows are readable across users: the cache uses them to flag
//! results that anyone has already synced.

use std::collections::HashSet;

use chrono::Utc;
use serde_json::{Map, Value};

use lead_core::enums::Mode;
use lead_core::ids::PREFIX_SYNC_RESULT;

use crate::error::DatabaseError;
use crate::helpers::{fmt_datetime, get_opt_string, opt_text, parse_enum_lenient};
use crate::repos::cache::CacheKey;
use crate::store::LeadStore;

/// Response fields kept from each webhook record.
pub const SYNC_COLUMNS: &[&str] = &[
    "name",
    "company",
    "status",
    "email_used",
    "mx_present",
    "explanation",
    "linkedin_url",
    "risk_signals",
    "syntax_valid",
    "prospect_name",
    "enriched_email",
    "recommendation",
    "local_part_risk",
    "prospect_company",
    "final_confidence",
    "disposable_domain",
    "possible_typo_domain",
];

/// Columns whose values are stored as JSON text rather than plain strings.
const JSON_COLUMNS: &[&str] = &[
    "mx_present",
    "risk_signals",
    "syntax_valid",
    "local_part_risk",
    "final_confidence",
    "disposable_domain",
    "possible_typo_domain",
];

/// One stored webhook record.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncRecord {
    pub id: String,
    pub history_id: Option<String>,
    pub user_id: String,
    pub feature: Option<Mode>,
    /// Non-null [`SYNC_COLUMNS`] values.
    pub fields: Map<String, Value>,
}

fn column_list() -> String {
    format!("id, history_id, user_id, feature, {}", SYNC_COLUMNS.join(", "))
}

fn to_column_value(value: Option<&Value>) -> libsql::Value {
    match value {
        None | Some(Value::Null) => libsql::Value::Null,
        Some(Value::String(s)) => libsql::Value::Text(s.clone()),
        Some(other) => libsql::Value::Text(other.to_string()),
    }
}

fn from_column_value(column: &str, raw: String) -> Value {
    if JSON_COLUMNS.contains(&column)
        && let Ok(value) = serde_json::from_str::<Value>(&raw)
        && !value.is_string()
    {
        return value;
    }
    Value::String(raw)
}

fn row_to_sync(row: &libsql::Row) -> Result<SyncRecord, DatabaseError> {
    let mut fields = Map::new();
    for (offset, column) in SYNC_COLUMNS.iter().enumerate() {
        let idx = i32::try_from(offset + 4).unwrap_or(i32::MAX);
        if let Some(raw) = get_opt_string(row, idx)? {
            fields.insert((*column).to_owned(), from_column_value(column, raw));
        }
    }
    Ok(SyncRecord {
        id: row.get(0)?,
        history_id: get_opt_string(row, 1)?,
        user_id: row.get(2)?,
        feature: parse_enum_lenient(get_opt_string(row, 3)?.as_deref()),
        fields,
    })
}

impl LeadStore {
    /// Store flattened webhook records for a history entry.
    ///
    /// Keys outside [`SYNC_COLUMNS`] are dropped.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` on the first failed insert.
    pub async fn insert_sync_rows(
        &self,
        user_id: &str,
        history_id: Option<&str>,
        mode: Mode,
        items: &[Map<String, Value>],
    ) -> Result<usize, DatabaseError> {
        let placeholders = (1..=SYNC_COLUMNS.len() + 5)
            .map(|i| format!("?{i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "INSERT INTO api_sync_results ({}, created_at) VALUES ({placeholders})",
            column_list()
        );

        for item in items {
            let id = self.db().generate_id(PREFIX_SYNC_RESULT).await?;
            let created_at = fmt_datetime(&Utc::now());
            self.db()
                .execute_with(&sql, || {
                    let mut params = vec![
                        libsql::Value::from(id.as_str()),
                        opt_text(history_id),
                        libsql::Value::from(user_id),
                        libsql::Value::from(mode.as_str()),
                    ];
                    params.extend(SYNC_COLUMNS.iter().map(|c| to_column_value(item.get(*c))));
                    params.push(libsql::Value::from(created_at.as_str()));
                    libsql::params_from_iter(params)
                })
                .await?;
        }
        Ok(items.len())
    }

    /// History ids this user has synced at least one record for.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn synced_history_ids(&self, user_id: &str) -> Result<HashSet<String>, DatabaseError> {
        let mut rows = self
            .db()
            .query_with(
                "SELECT DISTINCT history_id FROM api_sync_results WHERE user_id = ?1 AND history_id IS NOT NULL",
                || [user_id],
            )
            .await?;
        let mut ids = HashSet::new();
        while let Some(row) = rows.next().await? {
            ids.insert(row.get::<String>(0)?);
        }
        Ok(ids)
    }

    /// Sync records stored for a history entry, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn sync_rows_for_history(
        &self,
        history_id: &str,
    ) -> Result<Vec<SyncRecord>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM api_sync_results WHERE history_id = ?1 ORDER BY created_at ASC, rowid ASC",
            column_list()
        );
        let mut rows = self.db().query_with(&sql, || [history_id]).await?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().await? {
            out.push(row_to_sync(&row)?);
        }
        Ok(out)
    }

    /// Sync records from any user matching a lookup key, case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn sync_rows_matching(
        &self,
        key: &CacheKey,
        limit: u32,
    ) -> Result<Vec<SyncRecord>, DatabaseError> {
        let (filter, params) = sync_filter(key);
        let sql = format!(
            "SELECT {} FROM api_sync_results WHERE {filter} ORDER BY created_at DESC, rowid DESC LIMIT {limit}",
            column_list()
        );
        let mut rows = self.db().query_with(&sql, || libsql::params_from_iter(params.clone())).await?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().await? {
            out.push(row_to_sync(&row)?);
        }
        Ok(out)
    }

    /// Whether any user has synced a record matching `key`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn is_globally_synced(&self, key: &CacheKey) -> Result<bool, DatabaseError> {
        let (filter, params) = sync_filter(key);
        let sql = format!("SELECT 1 FROM api_sync_results WHERE {filter} LIMIT 1");
        let mut rows = self.db().query_with(&sql, || libsql::params_from_iter(params.clone())).await?;
        Ok(rows.next().await?.is_some())
    }
}

fn sync_filter(key: &CacheKey) -> (&'static str, Vec<libsql::Value>) {
    match key {
        CacheKey::Person { name, company } => (
            "lower(trim(coalesce(prospect_name, ''))) = ?1 AND lower(trim(coalesce(prospect_company, ''))) = ?2",
            vec![
                libsql::Value::from(name.as_str()),
                libsql::Value::from(company.as_str()),
            ],
        ),
        CacheKey::Email(email) => (
            "lower(trim(coalesce(email_used, ''))) = ?1",
            vec![libsql::Value::from(email.as_str())],
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn item(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => unreachable!("test items are objects"),
        }
    }

    #[tokio::test]
    async fn insert_and_read_back() {
        let store = LeadStore::open_local(":memory:").await.unwrap();
        let items = vec![item(json!({
            "prospect_name": "Ada Lovelace",
            "prospect_company": "Analytical",
            "email_used": "ada@analytical.io",
            "mx_present": true,
            "final_confidence": 0.92,
            "explanation": "mailbox exists",
            "ignored_key": "dropped"
        }))];
        store
            .insert_sync_rows("u1", Some("his-0a1b2c3d"), Mode::Enrich, &items)
            .await
            .unwrap();

        let stored = store.sync_rows_for_history("his-0a1b2c3d").await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].feature, Some(Mode::Enrich));
        assert_eq!(stored[0].fields["mx_present"], json!(true));
        assert_eq!(stored[0].fields["final_confidence"], json!(0.92));
        assert_eq!(stored[0].fields["explanation"], json!("mailbox exists"));
        assert!(!stored[0].fields.contains_key("ignored_key"));

        let ids = store.synced_history_ids("u1").await.unwrap();
        assert!(ids.contains("his-0a1b2c3d"));
        assert!(store.synced_history_ids("u2").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn global_match_is_case_insensitive_and_cross_user() {
        let store = LeadStore::open_local(":memory:").await.unwrap();
        let items = vec![item(json!({
            "prospect_name": "Ada Lovelace",
            "prospect_company": "Analytical",
            "email_used": "Ada@Analytical.io"
        }))];
        store
            .insert_sync_rows("someone-else", None, Mode::Verify, &items)
            .await
            .unwrap();

        let person = CacheKey::person("  ada lovelace ", "ANALYTICAL");
        assert!(store.is_globally_synced(&person).await.unwrap());
        let email = CacheKey::email("ada@analytical.io");
        assert_eq!(store.sync_rows_matching(&email, 10).await.unwrap().len(), 1);
        let other = CacheKey::person("Bob", "Analytical");
        assert!(!store.is_globally_synced(&other).await.unwrap());
    }
}
