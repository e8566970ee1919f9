//! Hosted auth service (GoTrue-compatible).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AuthConfig {
    /// Project URL; `/auth/v1` is appended.
    #[serde(default)]
    pub url: String,

    /// Public anon key sent as the `apikey` header.
    #[serde(default)]
    pub anon_key: String,
}

impl AuthConfig {
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.url.is_empty() && !self.anon_key.is_empty()
    }
}
