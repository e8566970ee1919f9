use lead_engine::{EngineError, sync};
use serde_json::Value;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::ApiResultsArgs;
use crate::commands::shared::limit::effective_limit;
use crate::commands::shared::session;
use crate::context::AppContext;
use crate::output::output;

/// Handle `leads api-results <history-id>`: stored webhook results for the
/// session, falling back to results matching its inputs.
pub async fn handle(
    args: &ApiResultsArgs,
    ctx: &mut AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let store = ctx
        .signed_in_store()
        .ok_or(EngineError::NotSignedIn("view API results"))?;
    let view = session::open(ctx, &args.id).await?;
    let limit = effective_limit(flags.limit, ctx.config.general.default_limit);

    let rows = sync::api_results(store, &view, limit).await?;
    let rows: Vec<Value> = rows.into_iter().map(Value::Object).collect();
    output(&rows, flags.format)
}
