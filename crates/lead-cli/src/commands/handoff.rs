use lead_core::enums::{InputKind, Mode};
use lead_engine::sheet;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::HandoffArgs;
use crate::commands::shared::session::{self, SessionReport, emit};
use crate::context::{AppContext, Workbench};
use crate::progress::Progress;

/// Handle `leads handoff <history-id>`: verify every email an enrich batch
/// found, recorded as a new verify session.
pub async fn handle(args: &HandoffArgs, ctx: &mut AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let view = session::open(ctx, &args.id).await?;
    if view.mode != Mode::Enrich || view.kind != InputKind::Bulk {
        anyhow::bail!(
            "handoff: {} is a {} {} session; only enrich batches can be handed off",
            view.history_id,
            view.kind,
            view.mode
        );
    }

    let mut handoff = sheet::handoff(&view.rows);
    if handoff.rows.is_empty() {
        anyhow::bail!("handoff: session {} found no emails to verify", view.history_id);
    }

    let Workbench {
        processor,
        owner,
        book,
        ..
    } = ctx.workbench();

    let mut progress = Progress::bar(
        u64::try_from(handoff.rows.len()).unwrap_or(u64::MAX),
        &format!("verify {}", handoff.label),
    );
    let summary = processor
        .process_batch(Mode::Verify, &mut handoff.rows, &mut progress)
        .await;
    progress.finish_clear();

    let done = book
        .finalize_batch(
            Mode::Verify,
            handoff.rows.clone(),
            handoff.headers.clone(),
            Some(handoff.mapping),
            Some(&handoff.label),
            owner,
        )
        .await;

    let mut report = SessionReport::new(Mode::Verify, InputKind::Bulk, &handoff.headers, &handoff.rows);
    report.history_id = done.entry.id;
    report.input = done.entry.input;
    report.summary = Some(summary);
    report.stored = done.stored;
    report.duplicate = done.duplicate;
    emit(&report, &handoff.rows, flags)
}
