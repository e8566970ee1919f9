//! Per-mode detail tables: `prospect_results`, `verification_results`,
//! `linkedin_results`.
//!
//! One row per processed input row, keyed by `history_id` and `position`, so
//! a stored session can be rebuilt in its original order.

use chrono::Utc;

use lead_core::entities::{
    CacheProvenance, ColumnMapping, EnrichResult, LinkedinResult, ModeResult, Record, Row,
    VerifyResult,
};
use lead_core::enums::{Mode, RowStatus};
use lead_core::ids::{PREFIX_LINKEDIN_RESULT, PREFIX_PROSPECT_RESULT, PREFIX_VERIFICATION_RESULT};

use crate::error::DatabaseError;
use crate::helpers::{
    fmt_datetime, get_opt_string, get_string_or_empty, json_text, opt_text, parse_enum_lenient,
    parse_optional_datetime, parse_optional_json,
};
use crate::store::LeadStore;

/// Detail table backing `mode`.
#[must_use]
pub const fn results_table(mode: Mode) -> &'static str {
    match mode {
        Mode::Enrich => "prospect_results",
        Mode::Verify => "verification_results",
        Mode::Linkedin => "linkedin_results",
    }
}

const fn id_prefix(mode: Mode) -> &'static str {
    match mode {
        Mode::Enrich => PREFIX_PROSPECT_RESULT,
        Mode::Verify => PREFIX_VERIFICATION_RESULT,
        Mode::Linkedin => PREFIX_LINKEDIN_RESULT,
    }
}

/// Mode-specific column: the LinkedIn URL or the verification payload.
const fn extra_column(mode: Mode) -> Option<&'static str> {
    match mode {
        Mode::Enrich => None,
        Mode::Verify => Some("result"),
        Mode::Linkedin => Some("linkedin_url"),
    }
}

/// Columns read back for every mode, with `NULL` for the ones a table lacks.
pub(crate) fn select_columns(mode: Mode) -> &'static str {
    match mode {
        Mode::Enrich => {
            "position, name, company, email, NULL, NULL, status, error, cached_at, cached_type, synced, source, history_id, created_at"
        }
        Mode::Verify => {
            "position, name, company, email, NULL, result, status, error, cached_at, cached_type, synced, source, history_id, created_at"
        }
        Mode::Linkedin => {
            "position, name, company, email, linkedin_url, NULL, status, error, cached_at, cached_type, synced, source, history_id, created_at"
        }
    }
}

impl LeadStore {
    /// Store the rows of a finished run in the mode's detail table.
    ///
    /// Blank names/companies fall back to the mapped source columns.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` on the first failed insert.
    pub async fn insert_results(
        &self,
        mode: Mode,
        history_id: &str,
        user_id: &str,
        rows: &[Row],
        mapping: Option<&ColumnMapping>,
    ) -> Result<usize, DatabaseError> {
        let table = results_table(mode);
        let extra = extra_column(mode);
        let columns = match extra {
            Some(col) => format!(
                "id, history_id, user_id, position, name, company, email, status, error, cached_at, cached_type, synced, source, created_at, {col}"
            ),
            None => "id, history_id, user_id, position, name, company, email, status, error, cached_at, cached_type, synced, source, created_at".to_owned(),
        };
        let placeholders = (1..=if extra.is_some() { 15 } else { 14 })
            .map(|i| format!("?{i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!("INSERT INTO {table} ({columns}) VALUES ({placeholders})");

        for (position, row) in rows.iter().enumerate() {
            let id = self.db().generate_id(id_prefix(mode)).await?;
            let name = fallback(&row.name, mapping.and_then(|m| m.name_header.as_deref()), &row.source);
            let company = fallback(
                &row.company,
                mapping.and_then(|m| m.company_header.as_deref()),
                &row.source,
            );
            let cached_at = row.cache.as_ref().map(|c| fmt_datetime(&c.cached_at));
            let cached_type = row
                .cache
                .as_ref()
                .and_then(|c| c.cached_via)
                .map(|k| k.as_str());
            let synced = row.cache.as_ref().is_some_and(|c| c.globally_synced);
            let source = json_text(&row.source)?;
            let extra_value = match mode {
                Mode::Enrich => None,
                Mode::Linkedin => Some(opt_text(row.linkedin_url.as_deref())),
                Mode::Verify => Some(match &row.result {
                    Some(ModeResult::Verify(v)) => json_text(v)?,
                    _ => libsql::Value::Null,
                }),
            };
            let created_at = fmt_datetime(&Utc::now());

            self.db()
                .execute_with(&sql, || {
                    let mut params = vec![
                        libsql::Value::from(id.as_str()),
                        libsql::Value::from(history_id),
                        libsql::Value::from(user_id),
                        libsql::Value::Integer(i64::try_from(position).unwrap_or(i64::MAX)),
                        opt_text(name),
                        opt_text(company),
                        opt_text(row.email()),
                        libsql::Value::from(row.status.as_str()),
                        opt_text(row.error.as_deref()),
                        opt_text(cached_at.as_deref()),
                        opt_text(cached_type),
                        libsql::Value::Integer(i64::from(synced)),
                        source.clone(),
                        libsql::Value::from(created_at.as_str()),
                    ];
                    params.extend(extra_value.clone());
                    libsql::params_from_iter(params)
                })
                .await?;
        }

        tracing::debug!(%mode, history_id, count = rows.len(), "detail rows stored");
        Ok(rows.len())
    }

    /// Rebuild the rows of a stored run, in their original order.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query or row parsing fails.
    pub async fn results_for_history(
        &self,
        mode: Mode,
        history_id: &str,
    ) -> Result<Vec<Row>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM {} WHERE history_id = ?1 ORDER BY position ASC, rowid ASC",
            select_columns(mode),
            results_table(mode)
        );
        let mut rows = self.db().query_with(&sql, || [history_id]).await?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().await? {
            out.push(stored_row(mode, &row)?.row);
        }
        Ok(out)
    }
}

/// A detail row plus the bookkeeping columns the cache needs.
pub(crate) struct StoredResult {
    pub row: Row,
    pub history_id: Option<String>,
    pub created_at: String,
}

/// Parse a row selected with [`select_columns`].
pub(crate) fn stored_row(mode: Mode, row: &libsql::Row) -> Result<StoredResult, DatabaseError> {
    let position = row.get::<Option<i64>>(0)?.unwrap_or_default();
    let raw_status = get_string_or_empty(row, 6)?;
    let status = mode.normalize(RowStatus::parse_stored(&raw_status).unwrap_or(RowStatus::Failed));
    let email = get_opt_string(row, 3)?;
    let linkedin_url = get_opt_string(row, 4)?;

    let result = if status.is_unresolved() || status == RowStatus::Failed {
        None
    } else {
        Some(match mode {
            Mode::Enrich => ModeResult::Enrich(EnrichResult {
                email: email.clone(),
            }),
            Mode::Linkedin => ModeResult::Linkedin(LinkedinResult {
                url: linkedin_url.clone(),
            }),
            Mode::Verify => {
                let payload = parse_optional_json(get_opt_string(row, 5)?.as_deref())?;
                ModeResult::Verify(verify_result(payload))
            }
        })
    };

    let cache = parse_optional_datetime(get_opt_string(row, 8)?.as_deref())?.map(|cached_at| {
        CacheProvenance {
            cached_at,
            cached_via: None,
            globally_synced: false,
        }
    });
    let cache = match cache {
        Some(mut c) => {
            c.cached_via = parse_enum_lenient(get_opt_string(row, 9)?.as_deref());
            c.globally_synced = row.get::<Option<i64>>(10)?.unwrap_or(0) != 0;
            Some(c)
        }
        None => None,
    };

    let source: Record = parse_optional_json(get_opt_string(row, 11)?.as_deref())?
        .and_then(|v| serde_json::from_value(v).ok())
        .unwrap_or_default();

    Ok(StoredResult {
        row: Row {
            id: position.to_string(),
            name: get_string_or_empty(row, 1)?,
            company: get_string_or_empty(row, 2)?,
            email,
            linkedin_url,
            status,
            error: get_opt_string(row, 7)?,
            result,
            cache,
            source,
        },
        history_id: get_opt_string(row, 12)?,
        created_at: get_string_or_empty(row, 13)?,
    })
}

/// Stored verification payloads are either a `VerifyResult` or the service's
/// raw JSON from older clients.
fn verify_result(payload: Option<serde_json::Value>) -> VerifyResult {
    let Some(value) = payload else {
        return VerifyResult::default();
    };
    if let Ok(parsed) = serde_json::from_value::<VerifyResult>(value.clone())
        && (parsed.verdict.is_some() || parsed.raw.is_some())
    {
        return parsed;
    }
    VerifyResult {
        verdict: value
            .get("status")
            .and_then(serde_json::Value::as_str)
            .map(str::to_owned),
        raw: Some(value),
    }
}

fn fallback<'a>(value: &'a str, header: Option<&str>, source: &'a Record) -> Option<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        header.and_then(|h| source.get(h))
    } else {
        Some(value)
    }
}
