//! Pipeline tuning and CLI defaults.

use serde::{Deserialize, Serialize};

const fn default_row_delay_ms() -> u64 {
    300
}

const fn default_history_cap() -> usize {
    100
}

const fn default_dedup_window_ms() -> i64 {
    2000
}

const fn default_history_fetch_limit() -> u32 {
    200
}

const fn default_cache_scan_limit() -> u32 {
    50
}

const fn default_limit() -> u32 {
    20
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeneralConfig {
    /// Pause after each resolved row in a batch.
    #[serde(default = "default_row_delay_ms")]
    pub row_delay_ms: u64,

    /// Maximum in-memory history entries per mode.
    #[serde(default = "default_history_cap")]
    pub history_cap: usize,

    /// Same-input submissions closer than this are dropped.
    #[serde(default = "default_dedup_window_ms")]
    pub dedup_window_ms: i64,

    /// History rows loaded on sign-in.
    #[serde(default = "default_history_fetch_limit")]
    pub history_fetch_limit: u32,

    /// Stored results scanned per cache lookup.
    #[serde(default = "default_cache_scan_limit")]
    pub cache_scan_limit: u32,

    /// Default result limit for list commands.
    #[serde(default = "default_limit")]
    pub default_limit: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            row_delay_ms: default_row_delay_ms(),
            history_cap: default_history_cap(),
            dedup_window_ms: default_dedup_window_ms(),
            history_fetch_limit: default_history_fetch_limit(),
            cache_scan_limit: default_cache_scan_limit(),
            default_limit: default_limit(),
        }
    }
}
