use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

#[derive(Serialize)]
struct AuthLogoutResponse {
    cleared: bool,
    user_id: Option<String>,
}

pub async fn handle(ctx: &mut AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let user_id = ctx.identity.as_ref().map(|identity| identity.user_id.clone());
    ctx.teardown().await?;
    output(
        &AuthLogoutResponse {
            cleared: true,
            user_id,
        },
        flags.format,
    )
}
