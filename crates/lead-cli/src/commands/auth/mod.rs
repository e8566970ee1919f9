mod login;
mod logout;
mod signup;
mod status;

use std::io::BufRead;
use std::path::Path;

use lead_auth::{AuthClient, AuthSession};
use lead_config::LeadsConfig;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::AuthCommands;
use crate::context::AppContext;

/// Handle `leads auth <subcommand>` before the application context exists.
pub async fn handle(
    action: &AuthCommands,
    flags: &GlobalFlags,
    config: &LeadsConfig,
    project_root: &Path,
) -> anyhow::Result<()> {
    match action {
        AuthCommands::Signup(args) => signup::handle(args, flags, config, project_root).await,
        AuthCommands::Login(args) => login::handle(args, flags, config, project_root).await,
        AuthCommands::Status => status::handle(flags, config).await,
        AuthCommands::Logout => {
            unreachable!("logout runs through the application context")
        }
    }
}

/// `leads auth logout`: clears the session held by `ctx`.
pub async fn handle_logout(ctx: &mut AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    logout::handle(ctx, flags).await
}

fn client(config: &LeadsConfig) -> anyhow::Result<AuthClient> {
    let auth = config.require_auth()?;
    Ok(AuthClient::new(auth)?)
}

/// The `--password` value, else the first line of stdin.
fn password(given: Option<&str>) -> anyhow::Result<String> {
    if let Some(password) = given {
        return Ok(password.to_owned());
    }
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    let password = line.trim_end_matches(['\r', '\n']).to_owned();
    if password.is_empty() {
        anyhow::bail!("auth: no password given (pass --password or pipe it on stdin)");
    }
    Ok(password)
}

/// Record the signed-in user's profile. Failures are logged only.
async fn upsert_profile(config: &LeadsConfig, project_root: &Path, session: &AuthSession) {
    let store = match crate::context::open_store(config, project_root).await {
        Ok(store) => store,
        Err(error) => {
            tracing::warn!(%error, "profile not saved: store unavailable");
            return;
        }
    };
    let user = &session.user;
    if let Err(error) = store
        .upsert_profile(&user.id, user.email.as_deref(), user.full_name.as_deref())
        .await
    {
        tracing::warn!(%error, user_id = %user.id, "failed to save profile");
    }
}
