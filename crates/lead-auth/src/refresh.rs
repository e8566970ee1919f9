use base64::Engine as _;
use chrono::{DateTime, Utc};

use crate::client::AuthClient;
use crate::error::AuthError;
use crate::session::AuthSession;
use crate::token_store;

/// Sessions expiring within this window are refreshed before use.
pub const EXPIRY_BUFFER_SECS: i64 = 60;

/// Load the stored session, refreshing it when it is about to expire.
///
/// Returns `Ok(None)` when nobody is signed in, or when the service refuses
/// the refresh token (the stale session is then cleared).
///
/// # Errors
///
/// Returns `AuthError` if the auth service cannot be reached or the
/// refreshed session cannot be stored.
pub async fn resolve_session(client: &AuthClient) -> Result<Option<AuthSession>, AuthError> {
    let Some(session) = token_store::load() else {
        return Ok(None);
    };
    if !session.is_near_expiry(EXPIRY_BUFFER_SECS) {
        return Ok(Some(session));
    }

    tracing::debug!(expires_at = %session.expires_at, "refreshing session");
    match client.refresh(&session.refresh_token).await {
        Ok(fresh) => {
            token_store::store(&fresh)?;
            Ok(Some(fresh))
        }
        Err(AuthError::Rejected(reason)) => {
            tracing::warn!(%reason, "session refresh refused; signing out");
            token_store::delete()?;
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Decode the JWT `exp` claim without verifying the signature.
///
/// # Errors
///
/// Returns `AuthError::InvalidResponse` if the token is malformed or has no
/// `exp` claim.
pub fn decode_expiry(jwt: &str) -> Result<DateTime<Utc>, AuthError> {
    let parts: Vec<&str> = jwt.split('.').collect();
    if parts.len() != 3 {
        return Err(AuthError::InvalidResponse("invalid JWT format".into()));
    }
    let payload = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(parts[1])
        .map_err(|e| AuthError::InvalidResponse(format!("base64 decode failed: {e}")))?;
    let value: serde_json::Value = serde_json::from_slice(&payload)
        .map_err(|e| AuthError::InvalidResponse(format!("JSON parse failed: {e}")))?;
    let exp = value["exp"]
        .as_i64()
        .ok_or_else(|| AuthError::InvalidResponse("missing exp claim".into()))?;
    DateTime::from_timestamp(exp, 0)
        .ok_or_else(|| AuthError::InvalidResponse("invalid exp timestamp".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jwt_with_payload(payload: &str) -> String {
        let engine = base64::engine::general_purpose::URL_SAFE_NO_PAD;
        format!(
            "{}.{}.{}",
            engine.encode(r#"{"alg":"HS256"}"#),
            engine.encode(payload),
            engine.encode("sig")
        )
    }

    #[test]
    fn decodes_exp() {
        let exp = Utc::now().timestamp() + 3600;
        let jwt = jwt_with_payload(&format!(r#"{{"sub":"u1","exp":{exp}}}"#));
        assert_eq!(decode_expiry(&jwt).unwrap().timestamp(), exp);
    }

    #[test]
    fn rejects_malformed_tokens() {
        let err = decode_expiry("not-a-jwt").unwrap_err();
        assert!(err.to_string().contains("invalid JWT format"));

        let err = decode_expiry("h.!!!.s").unwrap_err();
        assert!(err.to_string().contains("base64 decode failed"));

        let err = decode_expiry(&jwt_with_payload(r#"{"sub":"u1"}"#)).unwrap_err();
        assert!(err.to_string().contains("missing exp claim"));
    }
}
