use std::path::Path;

use lead_config::LeadsConfig;
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::auth::AuthLoginArgs;
use crate::output::output;

#[derive(Serialize)]
struct AuthLoginResponse {
    authenticated: bool,
    user_id: String,
    email: Option<String>,
    expires_at: String,
}

pub async fn handle(
    args: &AuthLoginArgs,
    flags: &GlobalFlags,
    config: &LeadsConfig,
    project_root: &Path,
) -> anyhow::Result<()> {
    let client = super::client(config)?;
    let password = super::password(args.password.as_deref())?;

    let session = lead_auth::login(&client, args.email.trim(), &password).await?;
    super::upsert_profile(config, project_root, &session).await;
    tracing::info!(user_id = %session.user.id, "signed in");

    output(
        &AuthLoginResponse {
            authenticated: true,
            user_id: session.user.id,
            email: session.user.email,
            expires_at: session.expires_at.to_rfc3339(),
        },
        flags.format,
    )
}
