use anyhow::Context;
use lead_core::enums::InputKind;
use lead_engine::SessionView;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::RetryArgs;
use crate::commands::shared::session::{self, SessionReport, emit};
use crate::context::{AppContext, Workbench};
use crate::progress::Progress;

/// Handle `leads retry <history-id>`: look up failed rows again, skipping
/// the cache, and record the outcome as a new `Retry:` entry.
pub async fn handle(args: &RetryArgs, ctx: &mut AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let view = session::open(ctx, &args.id).await?;
    match view.kind {
        InputKind::Bulk => retry_batch(view, ctx, flags).await,
        InputKind::Single => retry_single(view, ctx, flags).await,
    }
}

async fn retry_batch(view: SessionView, ctx: &mut AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let mode = view.mode;
    let source_label = view.source_label().to_owned();
    let mut rows = view.rows;
    let retryable = rows.iter().filter(|row| row.status.is_retryable()).count();
    if retryable == 0 {
        anyhow::bail!("retry: session {} has no failed rows", view.history_id);
    }

    let Workbench {
        processor,
        owner,
        book,
        ..
    } = ctx.workbench();

    let mut progress = Progress::bar(
        u64::try_from(retryable).unwrap_or(u64::MAX),
        &format!("retry {mode} {source_label}"),
    );
    let retried = processor.retry_failed(mode, &mut rows, &mut progress).await;
    progress.finish_clear();

    let done = book
        .finalize_retry(
            mode,
            rows.clone(),
            view.headers.clone(),
            view.mapping,
            Some(&source_label),
            retried,
            owner,
        )
        .await;

    let mut report = SessionReport::new(mode, InputKind::Bulk, &view.headers, &rows);
    report.history_id = done.entry.id;
    report.input = done.entry.input;
    report.retried = Some(retried);
    report.stored = done.stored;
    emit(&report, &rows, flags)
}

async fn retry_single(view: SessionView, ctx: &mut AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let mode = view.mode;
    let input = view
        .single
        .context("retry: single entry has no input to replay")?;

    let Workbench {
        processor,
        owner,
        book,
        ..
    } = ctx.workbench();

    let spinner = Progress::spinner(&format!("retry {mode}: {}", input.label(mode)));
    let outcome = processor.retry_single(mode, &input).await;
    spinner.finish_clear();
    let outcome = outcome?;

    let done = book.finalize_single(mode, &input, &outcome, true, owner).await;

    let rows = [outcome.row];
    let mut report = SessionReport::new(mode, InputKind::Single, &[], &rows);
    report.history_id = done.entry.id;
    report.input = done.entry.input;
    report.retried = Some(1);
    report.stored = done.stored;
    report.message = outcome.message;
    emit(&report, &rows, flags)
}
