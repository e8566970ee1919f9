use std::path::Path;

use lead_auth::SignUp;
use lead_config::LeadsConfig;
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::auth::AuthSignupArgs;
use crate::output::output;

#[derive(Serialize)]
struct AuthSignupResponse {
    authenticated: bool,
    user_id: Option<String>,
    email: String,
    note: Option<String>,
}

pub async fn handle(
    args: &AuthSignupArgs,
    flags: &GlobalFlags,
    config: &LeadsConfig,
    project_root: &Path,
) -> anyhow::Result<()> {
    let client = super::client(config)?;
    let password = super::password(args.password.as_deref())?;
    let email = args.email.trim();
    let full_name = args.full_name.as_deref().map(str::trim).filter(|n| !n.is_empty());

    let response = match lead_auth::signup(&client, email, &password, full_name).await? {
        SignUp::Session(session) => {
            super::upsert_profile(config, project_root, &session).await;
            AuthSignupResponse {
                authenticated: true,
                user_id: Some(session.user.id.clone()),
                email: session.user.email.clone().unwrap_or_else(|| email.to_owned()),
                note: None,
            }
        }
        SignUp::ConfirmationRequired { email } => AuthSignupResponse {
            authenticated: false,
            user_id: None,
            note: Some(format!(
                "check {email} for a confirmation link, then run `leads auth login`"
            )),
            email,
        },
    };

    output(&response, flags.format)
}
