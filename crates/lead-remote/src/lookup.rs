//! Soft outcome of a single remote lookup.

use serde::{Deserialize, Serialize};

use crate::error::RemoteError;

/// Outcome of one adapter call.
///
/// Adapters never propagate per-call failures: transport errors, error
/// statuses and unparseable bodies all become [`Lookup::Failed`] with a
/// human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Lookup<T> {
    Found(T),
    NotFound { message: String },
    Failed { message: String },
}

impl<T> Lookup<T> {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
        }
    }

    #[must_use]
    pub const fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    /// Message attached to a miss or failure.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Found(_) => None,
            Self::NotFound { message } | Self::Failed { message } => Some(message),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Lookup<U> {
        match self {
            Self::Found(value) => Lookup::Found(f(value)),
            Self::NotFound { message } => Lookup::NotFound { message },
            Self::Failed { message } => Lookup::Failed { message },
        }
    }

    /// Collapse an adapter result into a soft outcome.
    pub(crate) fn settle(service: &str, result: Result<Self, RemoteError>) -> Self {
        result.unwrap_or_else(|error| {
            tracing::warn!(service, %error, "remote lookup failed");
            Self::failed(error.to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn settle_turns_errors_into_failures() {
        let err: Result<Lookup<String>, RemoteError> = Err(RemoteError::Api {
            status: 401,
            message: "bad key".into(),
        });
        assert_eq!(
            Lookup::settle("prospect", err),
            Lookup::failed("API Error: 401 bad key")
        );
    }

    #[test]
    fn map_keeps_messages() {
        let miss: Lookup<u8> = Lookup::not_found("No email found");
        assert_eq!(miss.map(|n| n + 1).message(), Some("No email found"));
        assert!(Lookup::Found(1).map(|n| n + 1).is_found());
    }
}
