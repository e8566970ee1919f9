use anyhow::Context;
use lead_core::enums::InputKind;
use lead_engine::{ExportFormat, ExportTable, SessionView, SingleOutcome, export};
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::ExportArgs;
use crate::commands::shared::session;
use crate::context::AppContext;
use crate::output::output;

#[derive(Serialize)]
struct ExportResponse {
    history_id: String,
    path: String,
    format: ExportFormat,
    rows: usize,
    columns: Vec<String>,
}

/// Batch sessions keep their original columns; single lookups export the
/// fixed columns plus the message.
pub fn session_table(view: &SessionView) -> anyhow::Result<ExportTable> {
    match view.kind {
        InputKind::Bulk => Ok(export::export_records(&view.headers, &view.rows)),
        InputKind::Single => {
            let row = view
                .rows
                .first()
                .cloned()
                .context("export: single entry has no result row")?;
            let outcome = SingleOutcome {
                cached: row.is_cached(),
                row,
                message: view.message.clone(),
            };
            Ok(export::single_export_record(view.mode, &outcome))
        }
    }
}

/// Handle `leads export <history-id>`.
pub async fn handle(args: &ExportArgs, ctx: &mut AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let view = session::open(ctx, &args.id).await?;
    let table = session_table(&view)?;
    let format = ExportFormat::from(args.format_file);
    table
        .write(format, &args.out)
        .with_context(|| format!("failed to write {}", args.out.display()))?;
    tracing::info!(history_id = %view.history_id, path = %args.out.display(), "session exported");

    output(
        &ExportResponse {
            history_id: view.history_id,
            path: args.out.display().to_string(),
            format,
            rows: table.rows.len(),
            columns: table.columns,
        },
        flags.format,
    )
}
