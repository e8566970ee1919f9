//! User-configured sync endpoint.
//!
//! Unlike the lookup adapters, failures here are hard errors: a sync is an
//! explicit user action and must report when it did not go through.

use std::time::Duration;

use lead_config::WebhookConfig;

use crate::error::RemoteError;
use crate::http::{build_client, check_response};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Clone)]
pub struct WebhookClient {
    http: reqwest::Client,
    url: String,
}

impl WebhookClient {
    /// # Errors
    ///
    /// Returns [`RemoteError::NotConfigured`] if no webhook URL is set.
    pub fn new(config: &WebhookConfig) -> Result<Self, RemoteError> {
        if !config.is_configured() {
            return Err(RemoteError::NotConfigured {
                service: "sync webhook",
                hint: "LEADS_WEBHOOK__URL",
            });
        }
        Ok(Self {
            http: build_client(REQUEST_TIMEOUT)?,
            url: config.url.clone(),
        })
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// POST `payload` as JSON and return the raw response body.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] on transport failure or a non-success status.
    pub async fn post_results(&self, payload: &serde_json::Value) -> Result<Vec<u8>, RemoteError> {
        tracing::debug!(url = %self.url, "posting results to webhook");
        let resp = self.http.post(&self.url).json(payload).send().await?;
        let body = check_response(resp).await?.bytes().await?;
        Ok(body.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requires_url() {
        let err = WebhookClient::new(&WebhookConfig::default()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "sync webhook is not configured: set LEADS_WEBHOOK__URL"
        );
    }

    #[test]
    fn keeps_configured_url() {
        let client = WebhookClient::new(&WebhookConfig {
            url: "https://hooks.example.test/enrich".into(),
        })
        .unwrap();
        assert_eq!(client.url(), "https://hooks.example.test/enrich");
    }
}
