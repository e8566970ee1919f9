use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("not signed in, run `leads auth login`")]
    NotAuthenticated,

    #[error("session expired, run `leads auth login`")]
    SessionExpired,

    /// The auth service refused the request; the text is shown as-is.
    #[error("{0}")]
    Rejected(String),

    #[error("auth service unreachable: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected auth response: {0}")]
    InvalidResponse(String),

    #[error("session store error: {0}")]
    SessionStore(String),

    #[error(transparent)]
    Config(#[from] lead_config::ConfigError),

    #[error("{0}")]
    Other(String),
}
