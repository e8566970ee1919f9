//! History repository.
//!
//! The `history.data` column holds a one-element JSON array with the minimal
//! stub (`user_id`, `hasCached`, `cachedAt`, `cachedType`, `synced`). Older
//! rows may hold a bare object or the full row array instead, so reads are
//! lenient and keep the first element around for legacy classification.

use chrono::{DateTime, Utc};
use serde_json::Value;

use lead_core::entities::{ColumnMapping, HistoryEntry, MinimalStub};
use lead_core::enums::{InputKind, Mode};
use lead_core::ids::PREFIX_HISTORY;

use crate::error::DatabaseError;
use crate::helpers::{
    fmt_datetime, get_opt_string, get_string_or_empty, json_text, parse_datetime,
    parse_enum_lenient, parse_optional_datetime, parse_optional_json,
};
use crate::store::LeadStore;

const HISTORY_COLUMNS: &str =
    "id, user_id, type, feature, input, result, status, timestamp, data, headers, mapping, created_at";

/// A `history` row as stored, before feature classification.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredHistory {
    pub id: String,
    pub user_id: String,
    pub kind: InputKind,
    /// Explicit feature tag; `None` on legacy rows.
    pub feature: Option<Mode>,
    pub input: String,
    pub result: String,
    pub status: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub stub: MinimalStub,
    /// First element of `data`, as stored.
    pub first_item: Option<Value>,
    pub headers: Vec<String>,
    pub mapping: Option<ColumnMapping>,
}

impl LeadStore {
    /// Insert a history row in minimal form and return its store id.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if serialization or the insert fails.
    pub async fn insert_history(
        &self,
        user_id: &str,
        entry: &HistoryEntry,
    ) -> Result<String, DatabaseError> {
        let id = self.db().generate_id(PREFIX_HISTORY).await?;
        let data = json_text(&[entry.minimal_stub(user_id)])?;
        let headers = json_text(&entry.headers)?;
        let mapping = match &entry.mapping {
            Some(m) => json_text(m)?,
            None => libsql::Value::Null,
        };
        let created_at = fmt_datetime(&Utc::now());

        self.db()
            .execute_with(
                "INSERT INTO history (id, user_id, type, feature, input, result, status, timestamp, data, headers, mapping, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                || {
                    libsql::params_from_iter(vec![
                        libsql::Value::from(id.as_str()),
                        libsql::Value::from(user_id),
                        libsql::Value::from(entry.kind.as_str()),
                        libsql::Value::from(entry.mode.as_str()),
                        libsql::Value::from(entry.input.as_str()),
                        libsql::Value::from(entry.result.as_str()),
                        libsql::Value::from(entry.status.as_str()),
                        libsql::Value::Integer(entry.timestamp.timestamp_millis()),
                        data.clone(),
                        headers.clone(),
                        mapping.clone(),
                        libsql::Value::from(created_at.as_str()),
                    ])
                },
            )
            .await?;

        tracing::debug!(%id, mode = %entry.mode, kind = %entry.kind, "history row stored");
        Ok(id)
    }

    /// A user's history rows, newest first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query or row parsing fails.
    pub async fn list_history(
        &self,
        user_id: &str,
        limit: u32,
    ) -> Result<Vec<StoredHistory>, DatabaseError> {
        let sql = format!(
            "SELECT {HISTORY_COLUMNS} FROM history WHERE user_id = ?1
             ORDER BY created_at DESC, rowid DESC LIMIT ?2"
        );
        let mut rows = self
            .db()
            .query_with(&sql, || {
                libsql::params_from_iter(vec![
                    libsql::Value::from(user_id),
                    libsql::Value::Integer(i64::from(limit)),
                ])
            })
            .await?;

        let mut out = Vec::new();
        while let Some(row) = rows.next().await? {
            out.push(row_to_history(&row)?);
        }
        Ok(out)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if no history row has this id.
    pub async fn get_history(&self, id: &str) -> Result<StoredHistory, DatabaseError> {
        let sql = format!("SELECT {HISTORY_COLUMNS} FROM history WHERE id = ?1");
        let mut rows = self.db().query_with(&sql, || [id]).await?;
        let row = rows.next().await?.ok_or_else(|| DatabaseError::NotFound {
            entity: "history",
            id: id.to_owned(),
        })?;
        row_to_history(&row)
    }

    /// Kind and stub of a history row, `None` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn history_kind_and_stub(
        &self,
        id: &str,
    ) -> Result<Option<(InputKind, MinimalStub)>, DatabaseError> {
        let mut rows = self
            .db()
            .query_with("SELECT type, data FROM history WHERE id = ?1", || [id])
            .await?;
        let Some(row) = rows.next().await? else {
            return Ok(None);
        };
        let kind = parse_kind(get_opt_string(&row, 0)?.as_deref());
        let data = parse_optional_json(get_opt_string(&row, 1)?.as_deref())?;
        let stub = first_item(data.as_ref()).map(stub_from_item).unwrap_or_default();
        Ok(Some((kind, stub)))
    }

    /// Set `synced` in a history row's stub.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if the row does not exist.
    pub async fn mark_history_synced(&self, id: &str) -> Result<(), DatabaseError> {
        let mut rows = self
            .db()
            .query_with("SELECT data FROM history WHERE id = ?1", || [id])
            .await?;
        let row = rows.next().await?.ok_or_else(|| DatabaseError::NotFound {
            entity: "history",
            id: id.to_owned(),
        })?;
        let mut data = parse_optional_json(get_opt_string(&row, 0)?.as_deref())?
            .unwrap_or_else(|| Value::Array(vec![serde_json::json!({})]));

        match &mut data {
            Value::Array(items) if !items.is_empty() => {
                if let Some(obj) = items[0].as_object_mut() {
                    obj.insert("synced".into(), Value::Bool(true));
                }
            }
            Value::Object(obj) => {
                obj.insert("synced".into(), Value::Bool(true));
            }
            _ => data = serde_json::json!([{ "synced": true }]),
        }

        let data = json_text(&data)?;
        self.db()
            .execute_with("UPDATE history SET data = ?1 WHERE id = ?2", || {
                libsql::params_from_iter(vec![data.clone(), libsql::Value::from(id)])
            })
            .await?;
        Ok(())
    }
}

fn parse_kind(raw: Option<&str>) -> InputKind {
    parse_enum_lenient(raw).unwrap_or(InputKind::Single)
}

fn first_item(data: Option<&Value>) -> Option<&Value> {
    let data = data?;
    match data {
        Value::Array(items) => items.first(),
        Value::Object(_) => Some(data),
        _ => None,
    }
}

/// Read stub fields from a stored `data` element, ignoring anything malformed.
fn stub_from_item(item: &Value) -> MinimalStub {
    let text = |key: &str| item.get(key).and_then(Value::as_str);
    MinimalStub {
        user_id: text("user_id").unwrap_or_default().to_owned(),
        has_cached: item.get("hasCached").and_then(Value::as_bool).unwrap_or(false),
        cached_at: parse_optional_datetime(text("cachedAt")).ok().flatten(),
        cached_type: parse_enum_lenient(text("cachedType")),
        synced: item.get("synced").and_then(Value::as_bool).unwrap_or(false),
    }
}

fn row_to_history(row: &libsql::Row) -> Result<StoredHistory, DatabaseError> {
    let created_at = parse_datetime(&row.get::<String>(11)?)?;
    let timestamp = row
        .get::<Option<i64>>(7)?
        .and_then(DateTime::from_timestamp_millis)
        .unwrap_or(created_at);
    let data = parse_optional_json(get_opt_string(row, 8)?.as_deref())?;
    let first = first_item(data.as_ref()).cloned();
    let headers = parse_optional_json(get_opt_string(row, 9)?.as_deref())?
        .and_then(|v| serde_json::from_value(v).ok())
        .unwrap_or_default();
    let mapping = parse_optional_json(get_opt_string(row, 10)?.as_deref())?
        .and_then(|v| serde_json::from_value(v).ok());

    Ok(StoredHistory {
        id: row.get(0)?,
        user_id: row.get(1)?,
        kind: parse_kind(get_opt_string(row, 2)?.as_deref()),
        feature: parse_enum_lenient(get_opt_string(row, 3)?.as_deref()),
        input: get_string_or_empty(row, 4)?,
        result: get_string_or_empty(row, 5)?,
        status: get_opt_string(row, 6)?,
        timestamp,
        stub: first.as_ref().map(stub_from_item).unwrap_or_default(),
        first_item: first,
        headers,
        mapping,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use lead_core::entities::Snapshot;
    use lead_core::enums::RowStatus;
    use pretty_assertions::assert_eq;

    async fn store() -> LeadStore {
        LeadStore::open_local(":memory:").await.unwrap()
    }

    fn entry(input: &str) -> HistoryEntry {
        HistoryEntry {
            id: "bulk-1-abc".into(),
            kind: InputKind::Bulk,
            mode: Mode::Enrich,
            input: input.into(),
            result: "2 Records processed".into(),
            status: RowStatus::Completed,
            timestamp: DateTime::from_timestamp_millis(1_767_225_600_000).unwrap(),
            snapshot: Snapshot::Full(vec![]),
            headers: vec!["Name".into(), "Company".into()],
            mapping: Some(ColumnMapping::new(Some("Name"), Some("Company"), None)),
            has_cached: true,
            cached_at: None,
            cached_via: Some(InputKind::Single),
            synced: false,
        }
    }

    #[tokio::test]
    async fn insert_and_list_round_trip() {
        let store = store().await;
        let id = store.insert_history("u1", &entry("leads.csv")).await.unwrap();
        assert!(lead_core::ids::is_stored_history_id(&id));

        let listed = store.list_history("u1", 200).await.unwrap();
        assert_eq!(listed.len(), 1);
        let stored = &listed[0];
        assert_eq!(stored.id, id);
        assert_eq!(stored.kind, InputKind::Bulk);
        assert_eq!(stored.feature, Some(Mode::Enrich));
        assert_eq!(stored.input, "leads.csv");
        assert_eq!(stored.timestamp.timestamp_millis(), 1_767_225_600_000);
        assert_eq!(stored.headers, vec!["Name".to_string(), "Company".to_string()]);
        assert_eq!(stored.mapping, entry("x").mapping);
        assert_eq!(stored.stub.user_id, "u1");
        assert!(stored.stub.has_cached);
        assert_eq!(stored.stub.cached_type, Some(InputKind::Single));
    }

    #[tokio::test]
    async fn list_is_newest_first_and_limited() {
        let store = store().await;
        for name in ["a.csv", "b.csv", "c.csv"] {
            store.insert_history("u1", &entry(name)).await.unwrap();
        }
        store.insert_history("u2", &entry("other.csv")).await.unwrap();

        let listed = store.list_history("u1", 2).await.unwrap();
        let inputs: Vec<_> = listed.iter().map(|h| h.input.as_str()).collect();
        assert_eq!(inputs, vec!["c.csv", "b.csv"]);
    }

    #[tokio::test]
    async fn file_store_keeps_history_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("leads.db");
        let path = path.to_str().unwrap();

        let id = {
            let store = LeadStore::open_local(path).await.unwrap();
            store.insert_history("u1", &entry("leads.csv")).await.unwrap()
        };

        let reopened = LeadStore::open_local(path).await.unwrap();
        let stored = reopened.get_history(&id).await.unwrap();
        assert_eq!(stored.input, "leads.csv");
        assert_eq!(reopened.list_history("u1", 200).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn mark_synced_updates_stub() {
        let store = store().await;
        let id = store.insert_history("u1", &entry("leads.csv")).await.unwrap();
        store.mark_history_synced(&id).await.unwrap();

        let (kind, stub) = store.history_kind_and_stub(&id).await.unwrap().unwrap();
        assert_eq!(kind, InputKind::Bulk);
        assert!(stub.synced);
        assert!(store.mark_history_synced("his-00000000").await.is_err());
    }

    #[tokio::test]
    async fn legacy_rows_parse_leniently() {
        let store = store().await;
        store
            .db()
            .execute_with(
                "INSERT INTO history (id, user_id, type, input, result, data, created_at)
                 VALUES ('legacy-1', 'u1', 'bulk', 'old.csv', '1 Records processed',
                         '[{\"name\":\"Ada\",\"linkedinUrl\":\"https://linkedin.com/in/ada\",\"synced\":true}]',
                         '2025-01-01 10:00:00')",
                || (),
            )
            .await
            .unwrap();

        let stored = store.get_history("legacy-1").await.unwrap();
        assert_eq!(stored.feature, None);
        assert!(stored.stub.synced);
        assert_eq!(
            stored.first_item.as_ref().and_then(|v| v["linkedinUrl"].as_str()),
            Some("https://linkedin.com/in/ada")
        );
        assert_eq!(stored.timestamp, parse_datetime("2025-01-01 10:00:00").unwrap());
        assert!(stored.headers.is_empty());
    }
}
