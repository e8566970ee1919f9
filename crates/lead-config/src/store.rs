//! Persistent store location.

use serde::{Deserialize, Serialize};

fn default_local_path() -> String {
    "leads.db".into()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    /// Hosted libSQL URL (e.g., `libsql://leads-acme.turso.io`).
    #[serde(default)]
    pub url: String,

    /// Auth token for the hosted store.
    #[serde(default)]
    pub auth_token: String,

    /// Local database file used when no hosted store is configured.
    /// Relative paths resolve against the project's `.leads/` directory.
    #[serde(default = "default_local_path")]
    pub local_path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            auth_token: String::new(),
            local_path: default_local_path(),
        }
    }
}

impl StoreConfig {
    /// Both URL and token are present, so the hosted store is used.
    #[must_use]
    pub fn is_remote(&self) -> bool {
        !self.url.is_empty() && !self.auth_token.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_local() {
        let config = StoreConfig::default();
        assert!(!config.is_remote());
        assert_eq!(config.local_path, "leads.db");
    }

    #[test]
    fn url_without_token_stays_local() {
        let config = StoreConfig {
            url: "libsql://leads.turso.io".into(),
            ..Default::default()
        };
        assert!(!config.is_remote());
    }
}
