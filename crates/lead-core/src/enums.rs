//! Feature modes, input kinds, and row status labels.
//!
//! All enums use `snake_case` serialization via `#[serde(rename_all = "snake_case")]`.
//! Row statuses are an unordered label set per mode rather than a state machine:
//! `Mode::statuses()` is the set a row of that mode may carry.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::CoreError;

// ---------------------------------------------------------------------------
// Mode
// ---------------------------------------------------------------------------

/// Feature mode of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Find a business email for a (name, company) pair.
    Enrich,
    /// Classify an email's deliverability.
    Verify,
    /// Guess a LinkedIn profile URL for a (name, company) pair.
    Linkedin,
}

impl Mode {
    pub const ALL: [Self; 3] = [Self::Enrich, Self::Verify, Self::Linkedin];

    /// Status labels a row of this mode may carry.
    #[must_use]
    pub const fn statuses(self) -> &'static [RowStatus] {
        match self {
            Self::Enrich => &[
                RowStatus::Pending,
                RowStatus::Processing,
                RowStatus::Completed,
                RowStatus::NotFound,
                RowStatus::Failed,
            ],
            Self::Linkedin => &[
                RowStatus::Pending,
                RowStatus::Searching,
                RowStatus::Found,
                RowStatus::NotFound,
                RowStatus::Failed,
            ],
            Self::Verify => &[
                RowStatus::Pending,
                RowStatus::Processing,
                RowStatus::Deliverable,
                RowStatus::Undeliverable,
                RowStatus::Risky,
                RowStatus::Unknown,
                RowStatus::Failed,
            ],
        }
    }

    /// Check whether `status` belongs to this mode's label set.
    #[must_use]
    pub fn allows(self, status: RowStatus) -> bool {
        self.statuses().contains(&status)
    }

    /// Reject a status that does not belong to this mode.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::StatusOutOfMode` when the label is foreign to the mode.
    pub fn check(self, status: RowStatus) -> Result<(), CoreError> {
        if self.allows(status) {
            Ok(())
        } else {
            Err(CoreError::StatusOutOfMode {
                mode: self.to_string(),
                status: status.to_string(),
            })
        }
    }

    /// Coerce a stored label into this mode's label set.
    ///
    /// `completed` and `found` are interchangeable between enrich and
    /// linkedin; anything else foreign to the mode becomes `failed`
    /// (`unknown` for verify, which has a label for unclassified results).
    #[must_use]
    pub fn normalize(self, status: RowStatus) -> RowStatus {
        if self.allows(status) {
            return status;
        }
        match (self, status) {
            (Self::Enrich, RowStatus::Found) => RowStatus::Completed,
            (Self::Linkedin, RowStatus::Completed) => RowStatus::Found,
            (Self::Linkedin, RowStatus::Processing) => RowStatus::Searching,
            (Self::Enrich | Self::Verify, RowStatus::Searching) => RowStatus::Processing,
            (Self::Verify, _) => RowStatus::Unknown,
            _ => RowStatus::Failed,
        }
    }

    /// Label shown while a row is being worked on.
    #[must_use]
    pub const fn in_progress(self) -> RowStatus {
        match self {
            Self::Linkedin => RowStatus::Searching,
            Self::Enrich | Self::Verify => RowStatus::Processing,
        }
    }

    /// Lookup key for the cache: email for verify, (name, company) otherwise.
    #[must_use]
    pub const fn keyed_by_email(self) -> bool {
        matches!(self, Self::Verify)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Enrich => "enrich",
            Self::Verify => "verify",
            Self::Linkedin => "linkedin",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// InputKind
// ---------------------------------------------------------------------------

/// Whether a run came from a spreadsheet or a single form entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    Bulk,
    Single,
}

impl InputKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bulk => "bulk",
            Self::Single => "single",
        }
    }
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// RowStatus
// ---------------------------------------------------------------------------

/// Status of a single row.
///
/// ```text
/// enrich:   pending → processing → completed | not_found | failed
/// linkedin: pending → searching  → found     | not_found | failed
/// verify:   pending → processing → deliverable | undeliverable | risky | unknown | failed
/// ```
///
/// Transitions are one-directional; the only way back is a user-triggered retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RowStatus {
    Pending,
    Processing,
    Searching,
    Completed,
    Found,
    NotFound,
    Failed,
    Deliverable,
    Undeliverable,
    Risky,
    Unknown,
}

impl RowStatus {
    /// Statuses preferred when choosing among stored results for the same key.
    ///
    /// Everything a remote service actually answered counts, including
    /// `not_found` and `undeliverable`; only `failed` and in-flight labels do not.
    #[must_use]
    pub const fn is_cache_success(self) -> bool {
        matches!(
            self,
            Self::Completed
                | Self::Found
                | Self::Deliverable
                | Self::Risky
                | Self::Unknown
                | Self::Undeliverable
                | Self::NotFound
        )
    }

    /// Statuses picked up by "Retry Failed Results".
    #[must_use]
    pub const fn is_retryable(self) -> bool {
        matches!(self, Self::Failed | Self::Undeliverable | Self::NotFound)
    }

    /// Pending or in flight.
    #[must_use]
    pub const fn is_unresolved(self) -> bool {
        matches!(self, Self::Pending | Self::Processing | Self::Searching)
    }

    /// Parse a label read back from the store.
    ///
    /// Accepts the legacy `valid` / `invalid` verification labels and is
    /// case-insensitive. Returns `None` for anything else.
    #[must_use]
    pub fn parse_stored(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_ascii_lowercase();
        let status = match normalized.as_str() {
            "pending" => Self::Pending,
            "processing" => Self::Processing,
            "searching" => Self::Searching,
            "completed" | "success" => Self::Completed,
            "found" => Self::Found,
            "not_found" => Self::NotFound,
            "failed" => Self::Failed,
            "deliverable" | "valid" => Self::Deliverable,
            "undeliverable" | "invalid" => Self::Undeliverable,
            "risky" => Self::Risky,
            "unknown" => Self::Unknown,
            _ => return None,
        };
        Some(status)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Searching => "searching",
            Self::Completed => "completed",
            Self::Found => "found",
            Self::NotFound => "not_found",
            Self::Failed => "failed",
            Self::Deliverable => "deliverable",
            Self::Undeliverable => "undeliverable",
            Self::Risky => "risky",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for RowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
