//! Email finder / verifier service.

use serde::{Deserialize, Serialize};

pub const DEFAULT_PROSPECT_BASE_URL: &str = "https://api.getprospect.com/public/v1/email";

fn default_base_url() -> String {
    DEFAULT_PROSPECT_BASE_URL.into()
}

const fn default_timeout_secs() -> u64 {
    10
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProspectConfig {
    /// Sent as the `apiKey` header.
    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ProspectConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ProspectConfig {
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_public_api() {
        let config = ProspectConfig::default();
        assert!(!config.is_configured());
        assert_eq!(config.base_url, DEFAULT_PROSPECT_BASE_URL);
        assert_eq!(config.timeout_secs, 10);
    }
}
