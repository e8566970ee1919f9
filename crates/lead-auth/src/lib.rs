//! # lead-auth
//!
//! Email/password authentication against a GoTrue-compatible service.
//!
//! Sessions are persisted in the OS keychain (falling back to an env var and
//! a `0600` file) and refreshed shortly before they expire.

pub mod client;
pub mod error;
pub mod refresh;
pub mod session;
pub mod token_store;

pub use client::{AuthClient, SignUp};
pub use error::AuthError;
pub use refresh::resolve_session;
pub use session::{AuthSession, SessionUser};

/// Sign in and persist the resulting session.
///
/// # Errors
///
/// Returns `AuthError::Rejected` with the service's message on bad
/// credentials, or a store error if the session cannot be saved.
pub async fn login(client: &AuthClient, email: &str, password: &str) -> Result<AuthSession, AuthError> {
    let session = client.sign_in(email, password).await?;
    token_store::store(&session)?;
    Ok(session)
}

/// Create an account, persisting the session when the service signs the
/// user in immediately.
///
/// # Errors
///
/// Returns `AuthError::Rejected` with the service's message, or a store error.
pub async fn signup(
    client: &AuthClient,
    email: &str,
    password: &str,
    full_name: Option<&str>,
) -> Result<SignUp, AuthError> {
    let outcome = client.sign_up(email, password, full_name).await?;
    if let SignUp::Session(session) = &outcome {
        token_store::store(session)?;
    }
    Ok(outcome)
}

/// Revoke the session remotely (best effort) and clear local credentials.
///
/// # Errors
///
/// Returns `AuthError::SessionStore` if the session file cannot be removed.
pub async fn logout(client: Option<&AuthClient>) -> Result<(), AuthError> {
    if let (Some(client), Some(session)) = (client, token_store::load())
        && let Err(error) = client.sign_out(&session.access_token).await
    {
        tracing::warn!(%error, "remote sign-out failed; clearing local session anyway");
    }
    token_store::delete()
}
