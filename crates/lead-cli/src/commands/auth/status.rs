use lead_auth::token_store;
use lead_config::LeadsConfig;
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::output::output;

#[derive(Serialize, Default)]
struct AuthStatusResponse {
    authenticated: bool,
    user_id: Option<String>,
    email: Option<String>,
    full_name: Option<String>,
    expires_at: Option<String>,
    session_source: Option<&'static str>,
    note: Option<String>,
}

pub async fn handle(flags: &GlobalFlags, config: &LeadsConfig) -> anyhow::Result<()> {
    let status = if config.auth.is_configured() {
        match super::client(config) {
            Ok(client) => match lead_auth::resolve_session(&client).await {
                Ok(Some(session)) => AuthStatusResponse {
                    authenticated: true,
                    user_id: Some(session.user.id),
                    email: session.user.email,
                    full_name: session.user.full_name,
                    expires_at: Some(session.expires_at.to_rfc3339()),
                    session_source: token_store::load_with_source().map(|(_, source)| source.as_str()),
                    note: None,
                },
                Ok(None) => AuthStatusResponse {
                    note: Some("not signed in".into()),
                    ..Default::default()
                },
                Err(error) => AuthStatusResponse {
                    note: Some(error.to_string()),
                    ..Default::default()
                },
            },
            Err(error) => AuthStatusResponse {
                note: Some(error.to_string()),
                ..Default::default()
            },
        }
    } else {
        AuthStatusResponse {
            note: Some("LEADS_AUTH__URL / LEADS_AUTH__ANON_KEY not configured".into()),
            ..Default::default()
        }
    };

    output(&status, flags.format)
}
