//! Shared plumbing for commands that open or produce a session.

use lead_core::entities::{HistoryEntry, Row};
use lead_core::enums::{InputKind, Mode};
use lead_engine::history::{self, SessionView};
use lead_engine::{BatchSummary, StatusCount, export, stats};
use serde::Serialize;
use serde_json::Value;

use crate::cli::{GlobalFlags, OutputFormat};
use crate::context::AppContext;
use crate::output::{output, output_rows};

/// Look up a history entry by id in the current user's lists.
pub fn find_entry(ctx: &AppContext, id: &str) -> anyhow::Result<HistoryEntry> {
    if let Some(entry) = ctx.book.find(id) {
        return Ok(entry.clone());
    }
    if ctx.identity.is_none() {
        anyhow::bail!("no history entry '{id}' (sign in to keep history between runs)");
    }
    anyhow::bail!("no history entry '{id}'");
}

/// Open a history entry, re-reading stored rows when needed.
pub async fn open(ctx: &AppContext, id: &str) -> anyhow::Result<SessionView> {
    let entry = find_entry(ctx, id)?;
    Ok(history::load_session(&entry, ctx.signed_in_store()).await?)
}

/// What a session-producing command prints.
#[derive(Debug, Serialize)]
pub struct SessionReport {
    pub history_id: String,
    pub mode: Mode,
    pub kind: InputKind,
    pub input: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<BatchSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retried: Option<usize>,
    pub stored: bool,
    pub duplicate: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub breakdown: Vec<StatusCount>,
    pub records: Vec<Value>,
}

impl SessionReport {
    #[must_use]
    pub fn new(view_mode: Mode, kind: InputKind, headers: &[String], rows: &[Row]) -> Self {
        Self {
            history_id: String::new(),
            mode: view_mode,
            kind,
            input: String::new(),
            summary: None,
            retried: None,
            stored: false,
            duplicate: false,
            message: None,
            breakdown: stats::breakdown(view_mode, rows),
            records: export::export_records(headers, rows).records(),
        }
    }
}

/// Compact per-row columns for terminal tables.
fn row_table(mode: Mode, rows: &[Row]) -> (Vec<String>, Vec<Vec<String>>) {
    let found = match mode {
        Mode::Linkedin => "linkedin_url",
        Mode::Enrich | Mode::Verify => "email",
    };
    let columns = ["row", "name", "company", found, "status", "note"]
        .into_iter()
        .map(str::to_owned)
        .collect();
    let rows = rows
        .iter()
        .map(|row| {
            let found = match mode {
                Mode::Linkedin => row.linkedin_url.clone(),
                Mode::Enrich | Mode::Verify => row.email().map(str::to_owned),
            };
            let note = if row.is_cached() {
                "cached".to_owned()
            } else {
                row.error.clone().unwrap_or_default()
            };
            vec![
                row.id.clone(),
                row.name.clone(),
                row.company.clone(),
                found.unwrap_or_else(|| "-".to_owned()),
                row.status.as_str().to_owned(),
                note,
            ]
        })
        .collect();
    (columns, rows)
}

/// One-line summary printed under a session table.
#[must_use]
pub fn footer(report: &SessionReport) -> String {
    let mut parts = vec![format!("{} {}", report.mode, report.history_id)];
    if let Some(summary) = report.summary {
        parts.push(format!("{} processed", summary.processed));
        if summary.cached > 0 {
            parts.push(format!("{} cached", summary.cached));
        }
        if summary.skipped > 0 {
            parts.push(format!("{} skipped", summary.skipped));
        }
    }
    if let Some(retried) = report.retried {
        parts.push(format!("{retried} retried"));
    }
    for bucket in &report.breakdown {
        parts.push(format!("{}: {}", bucket.label, bucket.count));
    }
    if report.duplicate {
        parts.push("duplicate, not recorded".to_owned());
    }
    parts.join("  ")
}

/// Print a session: rows plus footer as a table, or the whole report.
pub fn emit(report: &SessionReport, rows: &[Row], flags: &GlobalFlags) -> anyhow::Result<()> {
    if flags.format != OutputFormat::Table {
        return output(report, flags.format);
    }
    let (columns, cells) = row_table(report.mode, rows);
    output_rows(&columns, &cells, &report.records, flags.format)?;
    if let Some(message) = &report.message {
        println!("{message}");
    }
    if !flags.quiet {
        println!("{}", footer(report));
    }
    Ok(())
}
