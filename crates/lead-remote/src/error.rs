//! Remote adapter error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status; `message` is the response body.
    #[error("API Error: {status} {message}")]
    Api { status: u16, message: String },

    #[error("API Error: 429 rate limited, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("parse error: {0}")]
    Parse(String),

    #[error("{service} is not configured: set {hint}")]
    NotConfigured {
        service: &'static str,
        hint: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_reads_like_a_row_message() {
        let err = RemoteError::Api {
            status: 404,
            message: "{\"error\":\"not found\"}".into(),
        };
        assert_eq!(err.to_string(), "API Error: 404 {\"error\":\"not found\"}");
    }
}
