//! LLM-backed profile finder.

use serde::{Deserialize, Serialize};

pub const DEFAULT_LINKEDIN_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_LINKEDIN_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

fn default_model() -> String {
    DEFAULT_LINKEDIN_MODEL.into()
}

fn default_base_url() -> String {
    DEFAULT_LINKEDIN_BASE_URL.into()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LinkedinConfig {
    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_model")]
    pub model: String,

    /// Models endpoint; `/{model}:generateContent` is appended.
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for LinkedinConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_model(),
            base_url: default_base_url(),
        }
    }
}

impl LinkedinConfig {
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty() && !self.model.is_empty()
    }
}
