use lead_core::display;
use lead_core::entities::HistoryEntry;
use lead_core::enums::{InputKind, Mode};
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::HistoryCommands;
use crate::commands::shared::limit::effective_limit;
use crate::commands::shared::session::{self, SessionReport, emit};
use crate::context::AppContext;
use crate::output::output_rows;

#[derive(Serialize)]
struct HistoryListItem {
    id: String,
    mode: Mode,
    kind: InputKind,
    input: String,
    result: String,
    status: String,
    timestamp: String,
    cached: bool,
    synced: bool,
}

const LIST_COLUMNS: [&str; 7] = ["id", "mode", "input", "result", "status", "when", "synced"];

/// Handle `leads history <subcommand>`.
pub async fn handle(
    action: &HistoryCommands,
    ctx: &mut AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        HistoryCommands::List { mode, full } => list(ctx, flags, mode.map(Mode::from), *full),
        HistoryCommands::Show { id } => show(ctx, flags, id).await,
    }
}

fn list(ctx: &AppContext, flags: &GlobalFlags, mode: Option<Mode>, full: bool) -> anyhow::Result<()> {
    let limit = effective_limit(flags.limit, ctx.config.general.default_limit);
    let items = list_items(ctx.book.buckets(), mode, full, limit);

    let cells = items
        .iter()
        .map(|item| {
            vec![
                item.id.clone(),
                item.mode.as_str().to_owned(),
                item.input.clone(),
                item.result.clone(),
                item.status.clone(),
                item.timestamp.clone(),
                if item.synced { "synced" } else { "-" }.to_owned(),
            ]
        })
        .collect::<Vec<_>>();
    let records = items
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<_>, _>>()?;
    let columns = LIST_COLUMNS.map(str::to_owned);
    output_rows(&columns, &cells, &records, flags.format)
}

/// Entries across the selected modes, newest first.
fn list_items(
    buckets: &lead_core::entities::HistoryBuckets,
    mode: Option<Mode>,
    full: bool,
    limit: u32,
) -> Vec<HistoryListItem> {
    let modes: Vec<Mode> = mode.map_or_else(|| Mode::ALL.to_vec(), |mode| vec![mode]);
    let mut entries: Vec<&HistoryEntry> = modes.iter().flat_map(|m| buckets.get(*m)).collect();
    entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    entries
        .into_iter()
        .take(usize::try_from(limit).unwrap_or(usize::MAX))
        .map(|entry| HistoryListItem {
            id: entry.id.clone(),
            mode: entry.mode,
            kind: entry.kind,
            input: if full {
                entry.input.clone()
            } else {
                display::history_input(entry)
            },
            result: if full {
                entry.result.clone()
            } else {
                display::history_result(&entry.result)
            },
            status: entry.status.as_str().to_owned(),
            timestamp: entry.timestamp.format("%Y-%m-%d %H:%M").to_string(),
            cached: entry.has_cached,
            synced: entry.synced,
        })
        .collect()
}

async fn show(ctx: &AppContext, flags: &GlobalFlags, id: &str) -> anyhow::Result<()> {
    let view = session::open(ctx, id).await?;

    let mut report = SessionReport::new(view.mode, view.kind, &view.headers, &view.rows);
    report.history_id = view.history_id.clone();
    report.input = view.input.clone();
    report.stored = ctx.identity.is_some();
    report.message = view.message.clone();
    emit(&report, &view.rows, flags)
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};
    use lead_core::entities::{HistoryBuckets, Snapshot};
    use lead_core::enums::RowStatus;
    use pretty_assertions::assert_eq;

    use super::*;

    fn entry(id: &str, mode: Mode, kind: InputKind, input: &str, result: &str, minutes: i64) -> HistoryEntry {
        let base = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
        HistoryEntry {
            id: id.to_owned(),
            kind,
            mode,
            input: input.to_owned(),
            result: result.to_owned(),
            status: RowStatus::Completed,
            timestamp: base + Duration::minutes(minutes),
            snapshot: Snapshot::Full(Vec::new()),
            headers: Vec::new(),
            mapping: None,
            has_cached: false,
            cached_at: None,
            cached_via: None,
            synced: false,
        }
    }

    fn buckets() -> HistoryBuckets {
        HistoryBuckets {
            enrich: vec![
                entry("his-3", Mode::Enrich, InputKind::Single, "Ada Lovelace @ Analytical", "ada@analytical.io", 30),
                entry("his-1", Mode::Enrich, InputKind::Bulk, "team.csv", "2 Records processed", 0),
            ],
            verify: vec![entry("his-2", Mode::Verify, InputKind::Single, "charles@engines.io", "deliverable", 10)],
            linkedin: Vec::new(),
        }
    }

    #[test]
    fn all_modes_merge_newest_first() {
        let items = list_items(&buckets(), None, false, 20);
        let ids: Vec<&str> = items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["his-3", "his-2", "his-1"]);
    }

    #[test]
    fn single_inputs_are_masked_unless_full() {
        let masked = list_items(&buckets(), Some(Mode::Enrich), false, 20);
        assert_eq!(masked[0].input, "Ada Lovelace");
        assert_ne!(masked[0].result, "ada@analytical.io");

        let full = list_items(&buckets(), Some(Mode::Enrich), true, 20);
        assert_eq!(full[0].input, "Ada Lovelace @ Analytical");
        assert_eq!(full[0].result, "ada@analytical.io");
    }

    #[test]
    fn limit_caps_the_list() {
        assert_eq!(list_items(&buckets(), None, false, 2).len(), 2);
    }
}
