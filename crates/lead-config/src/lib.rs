//! # lead-config
//!
//! Layered configuration for the lead console using figment.
//!
//! Sources, highest priority first:
//! 1. Environment variables (`LEADS_*` prefix, `__` separates sections)
//! 2. Project-level `.leads/config.toml`
//! 3. User-level `~/.config/leads/config.toml`
//! 4. Built-in defaults
//!
//! `LEADS_PROSPECT__API_KEY` maps to `prospect.api_key`,
//! `LEADS_GENERAL__ROW_DELAY_MS` to `general.row_delay_ms`, and so on.
//!
//! ```no_run
//! use lead_config::LeadsConfig;
//!
//! let config = LeadsConfig::load_with_dotenv().expect("config");
//! if config.prospect.is_configured() {
//!     println!("finder at {}", config.prospect.base_url);
//! }
//! ```

mod auth;
mod error;
mod general;
mod linkedin;
mod prospect;
mod store;
mod webhook;

pub use auth::AuthConfig;
pub use error::ConfigError;
pub use general::GeneralConfig;
pub use linkedin::{DEFAULT_LINKEDIN_BASE_URL, DEFAULT_LINKEDIN_MODEL, LinkedinConfig};
pub use prospect::{DEFAULT_PROSPECT_BASE_URL, ProspectConfig};
pub use store::StoreConfig;
pub use webhook::WebhookConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Project-local directory holding `config.toml` and the local store.
pub const PROJECT_DIR: &str = ".leads";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LeadsConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub prospect: ProspectConfig,
    #[serde(default)]
    pub linkedin: LinkedinConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub webhook: WebhookConfig,
    #[serde(default)]
    pub general: GeneralConfig,
}

impl LeadsConfig {
    /// Load from TOML files and the environment, rooted at the current directory.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a source fails to parse or a value is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_in(Path::new("."))
    }

    /// Load with `.env` support: the file is read before building the figment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a source fails to parse or a value is invalid.
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load()
    }

    /// Load with the project-level config taken from `project_root`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a source fails to parse or a value is invalid.
    pub fn load_in(project_root: &Path) -> Result<Self, ConfigError> {
        let config: Self = Self::figment_in(project_root).extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Provider chain rooted at the current directory.
    #[must_use]
    pub fn figment() -> Figment {
        Self::figment_in(Path::new("."))
    }

    /// Provider chain with the project-level file under `project_root`.
    #[must_use]
    pub fn figment_in(project_root: &Path) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(global_path));
        }

        let local_path = project_root.join(PROJECT_DIR).join("config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment.merge(Env::prefixed("LEADS_").split("__"))
    }

    /// Reject values the pipeline cannot work with.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` naming the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.general.history_cap == 0 {
            return Err(invalid("general.history_cap", "must be at least 1"));
        }
        if self.general.cache_scan_limit == 0 {
            return Err(invalid("general.cache_scan_limit", "must be at least 1"));
        }
        if self.general.dedup_window_ms < 0 {
            return Err(invalid("general.dedup_window_ms", "must not be negative"));
        }
        if self.store.url.is_empty() != self.store.auth_token.is_empty() {
            return Err(invalid(
                "store",
                "url and auth_token must be set together",
            ));
        }
        Ok(())
    }

    /// Auth settings, or an error telling the user what to set.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotConfigured` when the section is incomplete.
    pub fn require_auth(&self) -> Result<&AuthConfig, ConfigError> {
        if self.auth.is_configured() {
            Ok(&self.auth)
        } else {
            Err(ConfigError::NotConfigured {
                section: "auth",
                hint: "LEADS_AUTH__URL and LEADS_AUTH__ANON_KEY",
            })
        }
    }

    /// Webhook settings, or an error telling the user what to set.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotConfigured` when no webhook URL is set.
    pub fn require_webhook(&self) -> Result<&WebhookConfig, ConfigError> {
        if self.webhook.is_configured() {
            Ok(&self.webhook)
        } else {
            Err(ConfigError::NotConfigured {
                section: "webhook",
                hint: "LEADS_WEBHOOK__URL",
            })
        }
    }

    /// Resolved local database path under `project_root`.
    #[must_use]
    pub fn local_store_path(&self, project_root: &Path) -> PathBuf {
        let path = PathBuf::from(&self.store.local_path);
        if path.is_absolute() || self.store.local_path == ":memory:" {
            path
        } else {
            project_root.join(PROJECT_DIR).join(path)
        }
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("leads").join("config.toml"))
    }
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_owned(),
        reason: reason.to_owned(),
    }
}
