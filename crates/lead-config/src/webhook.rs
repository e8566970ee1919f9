use serde::{Deserialize, Serialize};

/// Optional endpoint that receives exported results.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct WebhookConfig {
    #[serde(default)]
    pub url: String,
}

impl WebhookConfig {
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.url.is_empty()
    }
}
