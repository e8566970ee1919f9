//! GoTrue REST client (`{url}/auth/v1`).

use std::time::Duration;

use serde::Deserialize;
use serde_json::{Value, json};

use lead_config::AuthConfig;

use crate::error::AuthError;
use crate::session::{AuthSession, TokenResponse, UserResponse};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Result of a sign-up request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignUp {
    /// The service signed the new user in directly.
    Session(Box<AuthSession>),
    /// The account exists but the email must be confirmed before signing in.
    ConfirmationRequired { email: String },
}

#[derive(Debug, Clone)]
pub struct AuthClient {
    http: reqwest::Client,
    base: String,
    anon_key: String,
}

impl AuthClient {
    /// # Errors
    ///
    /// Returns `AuthError::Config` if the auth section is incomplete.
    pub fn new(config: &AuthConfig) -> Result<Self, AuthError> {
        if !config.is_configured() {
            return Err(lead_config::ConfigError::NotConfigured {
                section: "auth",
                hint: "LEADS_AUTH__URL and LEADS_AUTH__ANON_KEY",
            }
            .into());
        }
        let http = reqwest::Client::builder()
            .user_agent(concat!("leads/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            base: format!("{}/auth/v1", config.url.trim_end_matches('/')),
            anon_key: config.anon_key.clone(),
        })
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.http
            .post(format!("{}/{path}", self.base))
            .header("apikey", &self.anon_key)
    }

    /// Create an account. `full_name` is stored in the user metadata.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Rejected` with the service's message (e.g. the
    /// address is already registered), or a transport error.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        full_name: Option<&str>,
    ) -> Result<SignUp, AuthError> {
        let body = json!({
            "email": email.trim(),
            "password": password,
            "data": { "full_name": full_name.map(str::trim) },
        });
        let resp = self.post("signup").json(&body).send().await?;
        let value = read_body(resp).await?;
        parse_sign_up(value, email)
    }

    /// Password sign-in.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Rejected` on bad credentials.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let resp = self
            .post("token?grant_type=password")
            .json(&json!({ "email": email.trim(), "password": password }))
            .send()
            .await?;
        parse_session(read_body(resp).await?)
    }

    /// Exchange a refresh token for a new session.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Rejected` if the refresh token is no longer valid.
    pub async fn refresh(&self, refresh_token: &str) -> Result<AuthSession, AuthError> {
        let resp = self
            .post("token?grant_type=refresh_token")
            .json(&json!({ "refresh_token": refresh_token }))
            .send()
            .await?;
        parse_session(read_body(resp).await?)
    }

    /// Revoke the session server-side.
    ///
    /// # Errors
    ///
    /// Returns an error if the service rejects the token or is unreachable.
    pub async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        let resp = self.post("logout").bearer_auth(access_token).send().await?;
        if resp.status().is_success() {
            return Ok(());
        }
        Err(rejection(resp).await)
    }
}

/// Body of a successful response, or the service's error message.
async fn read_body(resp: reqwest::Response) -> Result<Value, AuthError> {
    if !resp.status().is_success() {
        return Err(rejection(resp).await);
    }
    let text = resp.text().await?;
    serde_json::from_str(&text).map_err(|e| AuthError::InvalidResponse(e.to_string()))
}

async fn rejection(resp: reqwest::Response) -> AuthError {
    let status = resp.status();
    let text = resp.text().await.unwrap_or_default();
    AuthError::Rejected(error_message(status.as_u16(), &text))
}

/// GoTrue puts its message under one of several keys depending on the endpoint.
fn error_message(status: u16, body: &str) -> String {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    parsed
        .as_ref()
        .and_then(|v| {
            ["error_description", "msg", "message", "error"]
                .iter()
                .find_map(|k| v.get(*k).and_then(Value::as_str))
        })
        .map_or_else(|| format!("auth request failed ({status})"), str::to_owned)
}

fn parse_session(value: Value) -> Result<AuthSession, AuthError> {
    let token: TokenResponse =
        serde_json::from_value(value).map_err(|e| AuthError::InvalidResponse(e.to_string()))?;
    token.into_session()
}

fn parse_sign_up(value: Value, email: &str) -> Result<SignUp, AuthError> {
    #[derive(Deserialize)]
    struct Wrapped {
        user: UserResponse,
    }

    if value.get("access_token").is_some() {
        return Ok(SignUp::Session(Box::new(parse_session(value)?)));
    }
    // Without autoconfirm the body is the bare user, or `{ "user": .. }` on older servers.
    let user = serde_json::from_value::<UserResponse>(value.clone())
        .or_else(|_| serde_json::from_value::<Wrapped>(value).map(|w| w.user))
        .map_err(|e| AuthError::InvalidResponse(e.to_string()))?;
    Ok(SignUp::ConfirmationRequired {
        email: user.email.unwrap_or_else(|| email.trim().to_owned()),
    })
}
