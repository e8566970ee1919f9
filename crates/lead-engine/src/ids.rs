//! Client-side ids for history entries created before the store assigns one.
//!
//! `bulk-1767225600000-k3j9x0q2a` for a batch, `bulk-retry-1767225600000`
//! for a retry batch, and the same shapes with a `single` prefix.

use chrono::{DateTime, Utc};

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const SUFFIX_LEN: usize = 9;

#[must_use]
pub fn bulk_id(now: DateTime<Utc>) -> String {
    format!("bulk-{}-{}", now.timestamp_millis(), random_suffix())
}

#[must_use]
pub fn bulk_retry_id(now: DateTime<Utc>) -> String {
    format!("bulk-retry-{}", now.timestamp_millis())
}

#[must_use]
pub fn single_id(now: DateTime<Utc>) -> String {
    format!("single-{}-{}", now.timestamp_millis(), random_suffix())
}

#[must_use]
pub fn single_retry_id(now: DateTime<Utc>) -> String {
    format!("single-retry-{}", now.timestamp_millis())
}

/// Id of the lone row inside a single-run entry.
#[must_use]
pub fn single_row_id(now: DateTime<Utc>) -> String {
    format!("single-row-{}", now.timestamp_millis())
}

fn random_suffix() -> String {
    let mut n = getrandom::u64().unwrap_or_else(|error| {
        tracing::warn!(%error, "OS randomness unavailable; using clock for id suffix");
        Utc::now()
            .timestamp_nanos_opt()
            .map_or(0, i64::unsigned_abs)
    });
    let mut out = String::with_capacity(SUFFIX_LEN);
    for _ in 0..SUFFIX_LEN {
        out.push(char::from(BASE36[usize::try_from(n % 36).unwrap_or(0)]));
        n /= 36;
    }
    out
}
