use anyhow::Context;
use lead_engine::sync;
use lead_remote::WebhookClient;
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::SyncArgs;
use crate::commands::shared::session;
use crate::context::{AppContext, Workbench};
use crate::output::output;
use crate::progress::Progress;

#[derive(Serialize)]
struct SyncResponse {
    history_id: String,
    webhook: String,
    response_file: String,
    records: usize,
    stored: usize,
    synced: bool,
}

/// Handle `leads sync <history-id>`: POST the session's export records to
/// the webhook and keep the flattened response.
pub async fn handle(args: &SyncArgs, ctx: &mut AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let webhook = WebhookClient::new(ctx.config.require_webhook()?)?;
    let view = session::open(ctx, &args.id).await?;
    let out_dir = match &args.out {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().context("failed to read current directory")?,
    };

    let Workbench { owner, book, .. } = ctx.workbench();
    let spinner = Progress::spinner(&format!("syncing {} rows", view.rows.len()));
    let report = sync::sync_session(&webhook, &view, book, owner, &out_dir).await;
    spinner.finish_clear();
    let report = report.with_context(|| format!("sync of {} failed", view.history_id))?;

    output(
        &SyncResponse {
            history_id: view.history_id,
            webhook: webhook.url().to_owned(),
            response_file: report.response_file.display().to_string(),
            records: report.records.len(),
            stored: report.stored,
            synced: report.synced,
        },
        flags.format,
    )
}
