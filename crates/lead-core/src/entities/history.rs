use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::mapping::ColumnMapping;
use super::row::Row;
use crate::enums::{InputKind, Mode, RowStatus};

/// Record of one completed run (bulk or single).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct HistoryEntry {
    /// Client-generated (`bulk-…`) until persisted, then store-assigned (`his-…`).
    pub id: String,
    pub kind: InputKind,
    pub mode: Mode,
    /// Human-readable input label: file name, `Name @ Company`, or an email.
    pub input: String,
    /// Human-readable result summary.
    pub result: String,
    pub status: RowStatus,
    pub timestamp: DateTime<Utc>,
    pub snapshot: Snapshot,
    #[serde(default)]
    pub headers: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mapping: Option<ColumnMapping>,
    #[serde(default)]
    pub has_cached: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cached_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cached_via: Option<InputKind>,
    #[serde(default)]
    pub synced: bool,
}

impl HistoryEntry {
    /// Rows embedded in the snapshot, if it is a full one.
    #[must_use]
    pub fn rows(&self) -> Option<&[Row]> {
        match &self.snapshot {
            Snapshot::Full(rows) => Some(rows),
            Snapshot::Minimal(_) => None,
        }
    }

    /// The compact form written to the store's `history.data` column.
    #[must_use]
    pub fn minimal_stub(&self, user_id: &str) -> MinimalStub {
        MinimalStub {
            user_id: user_id.to_owned(),
            has_cached: self.has_cached,
            cached_at: self.cached_at,
            cached_type: self.cached_via,
            synced: self.synced,
        }
    }
}

/// Row data carried by a history entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "form", content = "data", rename_all = "snake_case")]
pub enum Snapshot {
    /// All rows, as produced in this process.
    Full(Vec<Row>),
    /// Stored form: rows live in the mode's detail table.
    Minimal(MinimalStub),
}

/// Cache and sync flags kept in place of the row snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MinimalStub {
    #[serde(rename = "user_id")]
    pub user_id: String,
    #[serde(default)]
    pub has_cached: bool,
    #[serde(default)]
    pub cached_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub cached_type: Option<InputKind>,
    #[serde(default)]
    pub synced: bool,
}

/// History entries split by feature mode, most recent first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct HistoryBuckets {
    pub enrich: Vec<HistoryEntry>,
    pub verify: Vec<HistoryEntry>,
    pub linkedin: Vec<HistoryEntry>,
}

impl HistoryBuckets {
    #[must_use]
    pub fn get(&self, mode: Mode) -> &[HistoryEntry] {
        match mode {
            Mode::Enrich => &self.enrich,
            Mode::Verify => &self.verify,
            Mode::Linkedin => &self.linkedin,
        }
    }

    pub fn get_mut(&mut self, mode: Mode) -> &mut Vec<HistoryEntry> {
        match mode {
            Mode::Enrich => &mut self.enrich,
            Mode::Verify => &mut self.verify,
            Mode::Linkedin => &mut self.linkedin,
        }
    }

    /// Find an entry by id across all modes.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&HistoryEntry> {
        Mode::ALL
            .into_iter()
            .flat_map(|mode| self.get(mode))
            .find(|entry| entry.id == id)
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut HistoryEntry> {
        self.enrich
            .iter_mut()
            .chain(self.verify.iter_mut())
            .chain(self.linkedin.iter_mut())
            .find(|entry| entry.id == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.enrich.len() + self.verify.len() + self.linkedin.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.enrich.clear();
        self.verify.clear();
        self.linkedin.clear();
    }
}
