use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Lightweight signed-in user identity for cross-crate passing.
///
/// Produced by `lead-auth`, consumed by `lead-engine` and `lead-cli`.
/// Contains only data fields, no auth logic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct AuthIdentity {
    /// User ID assigned by the auth service (JWT `sub`).
    pub user_id: String,
    /// Sign-in email, when the auth service reports one.
    pub email: Option<String>,
}
