//! Email finder and verifier.
//!
//! Both endpoints are plain GETs under the configured base URL with the key
//! in an `apiKey` header:
//! - `{base}/find?name=..&company=..` answers `{ "email": .. }`
//! - `{base}/verify?email=..` answers `{ "status": .., .. }`

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use lead_config::ProspectConfig;

use crate::error::RemoteError;
use crate::http::{build_client, check_response, read_json};
use crate::lookup::Lookup;

pub const NO_EMAIL_FOUND: &str = "No email found";
pub const UNKNOWN_VERIFICATION_STATUS: &str = "Unknown verification status";

/// Verification answer: the service's status label plus its full payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifyVerdict {
    /// `deliverable`, `undeliverable`, `risky`, `unknown`, or a legacy label.
    pub status: String,
    pub raw: Value,
}

#[derive(Debug, Clone)]
pub struct ProspectClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl ProspectClient {
    /// # Errors
    ///
    /// Returns [`RemoteError::NotConfigured`] without an API key, or
    /// [`RemoteError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &ProspectConfig) -> Result<Self, RemoteError> {
        if !config.is_configured() {
            return Err(RemoteError::NotConfigured {
                service: "email finder",
                hint: "LEADS_PROSPECT__API_KEY",
            });
        }
        Ok(Self {
            http: build_client(Duration::from_secs(config.timeout_secs))?,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            api_key: config.api_key.clone(),
        })
    }

    async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<Value, RemoteError> {
        let query = query
            .iter()
            .map(|(k, v)| format!("{k}={}", urlencoding::encode(v.trim())))
            .collect::<Vec<_>>()
            .join("&");
        let url = format!("{}/{path}?{query}", self.base_url);
        let resp = self
            .http
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .header("apiKey", &self.api_key)
            .send()
            .await?;
        read_json(check_response(resp).await?).await
    }

    /// Look up a business email for a person at a company or domain.
    pub async fn find_email(&self, name: &str, company: &str) -> Lookup<String> {
        let result = self
            .get("find", &[("name", name), ("company", company)])
            .await
            .map(|body| email_from_body(&body));
        Lookup::settle("email finder", result)
    }

    /// Check the deliverability of an address.
    pub async fn verify_email(&self, email: &str) -> Lookup<VerifyVerdict> {
        let result = self
            .get("verify", &[("email", email)])
            .await
            .map(verdict_from_body);
        Lookup::settle("email verifier", result)
    }
}

fn email_from_body(body: &Value) -> Lookup<String> {
    match body.get("email").and_then(Value::as_str) {
        Some(email) if !email.trim().is_empty() => Lookup::Found(email.trim().to_owned()),
        _ => Lookup::not_found(NO_EMAIL_FOUND),
    }
}

fn verdict_from_body(body: Value) -> Lookup<VerifyVerdict> {
    match body.get("status").and_then(Value::as_str) {
        Some(status) if !status.is_empty() => Lookup::Found(VerifyVerdict {
            status: status.to_owned(),
            raw: body.clone(),
        }),
        _ => Lookup::failed(UNKNOWN_VERIFICATION_STATUS),
    }
}
