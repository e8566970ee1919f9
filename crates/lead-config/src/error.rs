use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Figment(#[from] figment::Error),

    /// A section the requested command depends on has no credentials.
    #[error("[{section}] is not configured: set {hint}")]
    NotConfigured {
        section: &'static str,
        hint: &'static str,
    },

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}
