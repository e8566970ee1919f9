use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use lead_core::identity::AuthIdentity;

use crate::error::AuthError;

/// A signed-in session as persisted between runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
    pub user: SessionUser,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    /// Display name captured at sign-up.
    #[serde(default)]
    pub full_name: Option<String>,
}

impl AuthSession {
    #[must_use]
    pub fn to_identity(&self) -> AuthIdentity {
        AuthIdentity {
            user_id: self.user.id.clone(),
            email: self.user.email.clone(),
        }
    }

    /// Expired, or expiring within `buffer_secs`.
    #[must_use]
    pub fn is_near_expiry(&self, buffer_secs: i64) -> bool {
        self.expires_at <= Utc::now() + TimeDelta::seconds(buffer_secs)
    }
}

/// Token grant body returned by `/token` and (with autoconfirm) `/signup`.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    access_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    expires_at: Option<i64>,
    user: UserResponse,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserResponse {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: serde_json::Value,
}

impl UserResponse {
    pub(crate) fn into_user(self) -> SessionUser {
        let full_name = self
            .user_metadata
            .get("full_name")
            .and_then(serde_json::Value::as_str)
            .map(str::to_owned);
        SessionUser {
            id: self.id,
            email: self.email,
            full_name,
        }
    }
}

impl TokenResponse {
    /// Resolve the expiry from `expires_at`, then `expires_in`, then the JWT `exp`.
    pub(crate) fn into_session(self) -> Result<AuthSession, AuthError> {
        let expires_at = match (self.expires_at, self.expires_in) {
            (Some(at), _) => DateTime::from_timestamp(at, 0)
                .ok_or_else(|| AuthError::InvalidResponse(format!("bad expires_at {at}")))?,
            (None, Some(secs)) => Utc::now() + TimeDelta::seconds(secs),
            (None, None) => crate::refresh::decode_expiry(&self.access_token)?,
        };
        Ok(AuthSession {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at,
            user: self.user.into_user(),
        })
    }
}
