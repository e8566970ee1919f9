use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::result::{CacheProvenance, ModeResult};
use crate::enums::{Mode, RowStatus};
use crate::errors::CoreError;

/// Source record of an imported row: column header → cell text.
///
/// Column order is kept separately (history `headers`), so a sorted map is
/// enough here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct Record(pub BTreeMap<String, String>);

impl Record {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Trimmed cell value under `header`, `None` when absent or blank.
    #[must_use]
    pub fn get(&self, header: &str) -> Option<&str> {
        self.0
            .get(header)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub fn insert(&mut self, header: impl Into<String>, value: impl Into<String>) {
        self.0.insert(header.into(), value.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.0.iter()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// One input row moving through the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Row {
    /// Position-derived identifier (`"0"`, `"1"`, ...).
    pub id: String,
    pub name: String,
    pub company: String,
    pub email: Option<String>,
    pub linkedin_url: Option<String>,
    pub status: RowStatus,
    pub error: Option<String>,
    pub result: Option<ModeResult>,
    pub cache: Option<CacheProvenance>,
    pub source: Record,
}

impl Row {
    /// A fresh `pending` row.
    #[must_use]
    pub fn pending(
        id: impl Into<String>,
        name: impl Into<String>,
        company: impl Into<String>,
        email: Option<String>,
        source: Record,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            company: company.into(),
            email,
            linkedin_url: None,
            status: RowStatus::Pending,
            error: None,
            result: None,
            cache: None,
            source,
        }
    }

    /// Whether the row carries a non-blank email.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref().map(str::trim).filter(|e| !e.is_empty())
    }

    #[must_use]
    pub const fn is_cached(&self) -> bool {
        self.cache.is_some()
    }

    /// Reset to `pending` for a retry, dropping the previous outcome.
    pub fn reset(&mut self) {
        self.status = RowStatus::Pending;
        self.error = None;
        self.result = None;
        self.cache = None;
    }
}

/// Outcome of processing one row, applied onto the row in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RowUpdate {
    pub status: RowStatus,
    pub error: Option<String>,
    pub result: Option<ModeResult>,
    pub cache: Option<CacheProvenance>,
}

impl RowUpdate {
    #[must_use]
    pub const fn status(status: RowStatus) -> Self {
        Self {
            status,
            error: None,
            result: None,
            cache: None,
        }
    }

    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            status: RowStatus::Failed,
            error: Some(message.into()),
            result: None,
            cache: None,
        }
    }

    #[must_use]
    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error = Some(message.into());
        self
    }

    #[must_use]
    pub fn with_result(mut self, result: ModeResult) -> Self {
        self.result = Some(result);
        self
    }

    #[must_use]
    pub fn with_cache(mut self, cache: CacheProvenance) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Apply this update to `row`.
    ///
    /// An enrich result fills the row's email and a LinkedIn result fills its
    /// profile URL. Verify results leave the input email untouched.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::StatusOutOfMode` if the status is foreign to `mode`.
    pub fn apply(self, mode: Mode, row: &mut Row) -> Result<(), CoreError> {
        mode.check(self.status)?;
        match &self.result {
            Some(ModeResult::Enrich(r)) if r.email.is_some() => row.email.clone_from(&r.email),
            Some(ModeResult::Linkedin(r)) if r.url.is_some() => {
                row.linkedin_url.clone_from(&r.url);
            }
            _ => {}
        }
        row.status = self.status;
        row.error = self.error;
        row.result = self.result;
        row.cache = self.cache;
        Ok(())
    }
}
