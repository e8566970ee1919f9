//! Column parsing and parameter helpers shared by the repos.
//!
//! Timestamps are written as fixed-width RFC 3339 (microseconds, `Z`) so they
//! sort lexically; rows created by column defaults use `SQLite`'s
//! `"YYYY-MM-DD HH:MM:SS"` form. Both are accepted on read.

use chrono::{DateTime, SecondsFormat, Utc};
use libsql::Value;

use crate::error::DatabaseError;

/// Format a timestamp for storage.
#[must_use]
pub fn fmt_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse a TEXT timestamp in either stored format.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the string matches neither format.
pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>, DatabaseError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map(|naive| naive.and_utc())
        .map_err(|e| DatabaseError::Query(format!("Failed to parse datetime '{s}': {e}")))
}

/// Parse an optional TEXT timestamp; blank is `None`.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if a non-empty string cannot be parsed.
pub fn parse_optional_datetime(s: Option<&str>) -> Result<Option<DateTime<Utc>>, DatabaseError> {
    match s {
        Some(s) if !s.is_empty() => Ok(Some(parse_datetime(s)?)),
        _ => Ok(None),
    }
}

/// Read a nullable TEXT column. SQL NULL and `""` both read as `None`.
///
/// # Errors
///
/// Returns `DatabaseError` if the column read fails.
pub fn get_opt_string(row: &libsql::Row, idx: i32) -> Result<Option<String>, DatabaseError> {
    match row.get::<Option<String>>(idx)? {
        Some(s) if s.is_empty() => Ok(None),
        other => Ok(other),
    }
}

/// Read a nullable TEXT column, `""` when NULL.
///
/// # Errors
///
/// Returns `DatabaseError` if the column read fails.
pub fn get_string_or_empty(row: &libsql::Row, idx: i32) -> Result<String, DatabaseError> {
    Ok(row.get::<Option<String>>(idx)?.unwrap_or_default())
}

/// Parse an optional JSON TEXT column.
///
/// # Errors
///
/// Returns `DatabaseError::Json` if a non-empty string is not valid JSON.
pub fn parse_optional_json(s: Option<&str>) -> Result<Option<serde_json::Value>, DatabaseError> {
    match s {
        Some(s) if !s.is_empty() => Ok(Some(serde_json::from_str(s)?)),
        _ => Ok(None),
    }
}

/// Parse a TEXT column into a `snake_case` serde enum.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the string matches no variant.
pub fn parse_enum<T: serde::de::DeserializeOwned>(s: &str) -> Result<T, DatabaseError> {
    serde_json::from_value(serde_json::Value::String(s.to_string()))
        .map_err(|e| DatabaseError::Query(format!("Failed to parse enum from '{s}': {e}")))
}

/// Like [`parse_enum`] but yields `None` for blank or unrecognised values.
#[must_use]
pub fn parse_enum_lenient<T: serde::de::DeserializeOwned>(s: Option<&str>) -> Option<T> {
    s.filter(|s| !s.is_empty()).and_then(|s| parse_enum(s).ok())
}

/// Nullable TEXT parameter.
#[must_use]
pub fn opt_text(value: Option<&str>) -> Value {
    value.map_or(Value::Null, |v| Value::Text(v.to_owned()))
}

/// Serialize `value` as a JSON TEXT parameter.
///
/// # Errors
///
/// Returns `DatabaseError::Json` if serialization fails.
pub fn json_text<T: serde::Serialize>(value: &T) -> Result<Value, DatabaseError> {
    Ok(Value::Text(serde_json::to_string(value)?))
}
