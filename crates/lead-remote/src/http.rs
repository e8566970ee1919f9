//! Shared HTTP plumbing for the adapters.
//!
//! `check_response` turns 429 into [`RemoteError::RateLimited`] (falling back
//! to 60 s when `Retry-After` is absent) and any other non-success status into
//! [`RemoteError::Api`] carrying the body text.

use std::time::Duration;

use crate::error::RemoteError;

pub(crate) fn build_client(timeout: Duration) -> Result<reqwest::Client, RemoteError> {
    Ok(reqwest::Client::builder()
        .user_agent(concat!("leads/", env!("CARGO_PKG_VERSION")))
        .timeout(timeout)
        .build()?)
}

/// Check an HTTP response for error statuses, returning it unchanged on success.
///
/// # Errors
///
/// Returns [`RemoteError::RateLimited`] on 429 and [`RemoteError::Api`] on
/// any other non-success status.
pub async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, RemoteError> {
    if resp.status() == 429 {
        return Err(RemoteError::RateLimited {
            retry_after_secs: parse_retry_after(&resp),
        });
    }
    if !resp.status().is_success() {
        return Err(RemoteError::Api {
            status: resp.status().as_u16(),
            message: resp.text().await.unwrap_or_default(),
        });
    }
    Ok(resp)
}

fn parse_retry_after(resp: &reqwest::Response) -> u64 {
    resp.headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(60)
}

/// Parse a checked response body as JSON.
///
/// # Errors
///
/// Returns [`RemoteError::Parse`] if the body is not valid JSON.
pub(crate) async fn read_json(resp: reqwest::Response) -> Result<serde_json::Value, RemoteError> {
    let body = resp.text().await?;
    serde_json::from_str(&body).map_err(|e| RemoteError::Parse(e.to_string()))
}

#[cfg(test)]
pub(crate) fn mock_response(status: u16, body: &'static str) -> reqwest::Response {
    reqwest::Response::from(
        ::http::Response::builder()
            .status(status)
            .body(body)
            .unwrap(),
    )
}
