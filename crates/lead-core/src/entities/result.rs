use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{InputKind, Mode};

/// Outcome of a lookup, carrying only the fields relevant to its mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ModeResult {
    Enrich(EnrichResult),
    Verify(VerifyResult),
    Linkedin(LinkedinResult),
}

impl ModeResult {
    #[must_use]
    pub const fn mode(&self) -> Mode {
        match self {
            Self::Enrich(_) => Mode::Enrich,
            Self::Verify(_) => Mode::Verify,
            Self::Linkedin(_) => Mode::Linkedin,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct EnrichResult {
    /// Business email returned by the finder, if any.
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct VerifyResult {
    /// Deliverability label reported by the service (`valid`, `risky`, ...).
    pub verdict: Option<String>,
    /// Verification payload as returned by the service.
    pub raw: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct LinkedinResult {
    /// Best-guess profile URL.
    pub url: Option<String>,
}

/// Where a reused result came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CacheProvenance {
    /// When the reused result was first stored.
    pub cached_at: DateTime<Utc>,
    /// Kind of run that produced the reused result, when known.
    pub cached_via: Option<InputKind>,
    /// Some user's webhook sync log holds a matching record.
    pub globally_synced: bool,
}
