use anyhow::Context;
use lead_core::entities::ColumnMapping;
use lead_core::enums::{InputKind, Mode};
use lead_engine::sheet::{self, Sheet};
use lead_engine::{ExportFormat, export};

use crate::cli::GlobalFlags;
use crate::cli::subcommands::RunArgs;
use crate::commands::shared::session::{SessionReport, emit};
use crate::context::{AppContext, Workbench};
use crate::progress::Progress;

/// Handle `leads run <mode> --file <sheet>`.
pub async fn handle(args: &RunArgs, ctx: &mut AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let mode = Mode::from(args.mode);
    let imported = sheet::read_sheet(&args.file)?;
    let mapping = resolve_mapping(mode, &imported, args)?;
    let mut rows = sheet::rows_from_sheet(mode, &imported, &mapping);
    tracing::info!(%mode, file = %imported.name, rows = rows.len(), "starting batch");

    let Workbench {
        processor,
        owner,
        book,
        ..
    } = ctx.workbench();

    let mut progress = Progress::bar(
        u64::try_from(rows.len()).unwrap_or(u64::MAX),
        &format!("{mode} {}", imported.name),
    );
    let summary = processor.process_batch(mode, &mut rows, &mut progress).await;
    progress.finish_clear();

    let done = book
        .finalize_batch(
            mode,
            rows.clone(),
            imported.headers.clone(),
            Some(mapping),
            Some(&imported.name),
            owner,
        )
        .await;

    if let Some(path) = &args.out {
        let format = ExportFormat::from(args.out_format);
        export::export_records(&imported.headers, &rows)
            .write(format, path)
            .with_context(|| format!("failed to write {}", path.display()))?;
        tracing::info!(path = %path.display(), "results written");
    }

    let mut report = SessionReport::new(mode, InputKind::Bulk, &imported.headers, &rows);
    report.history_id = done.entry.id;
    report.input = done.entry.input;
    report.summary = Some(summary);
    report.stored = done.stored;
    report.duplicate = done.duplicate;
    emit(&report, &rows, flags)
}

/// Guessed mapping with any explicit `--*-col` flags applied on top.
fn resolve_mapping(mode: Mode, imported: &Sheet, args: &RunArgs) -> anyhow::Result<ColumnMapping> {
    let mut mapping = sheet::suggest_mapping(mode, &imported.headers);
    let overrides = [
        (&args.name_col, &mut mapping.name_header),
        (&args.company_col, &mut mapping.company_header),
        (&args.email_col, &mut mapping.email_header),
    ];
    for (given, slot) in overrides {
        if let Some(column) = given {
            if !imported.headers.iter().any(|header| header == column) {
                anyhow::bail!(
                    "column '{column}' not found in {} (headers: {})",
                    imported.name,
                    imported.headers.join(", ")
                );
            }
            *slot = Some(column.clone());
        }
    }

    match mode {
        Mode::Verify if mapping.email_header.is_none() => {
            anyhow::bail!("no email column found in {}; pass --email-col", imported.name)
        }
        Mode::Enrich | Mode::Linkedin
            if mapping.name_header.is_none() || mapping.company_header.is_none() =>
        {
            anyhow::bail!(
                "name and company columns are required for {mode}; pass --name-col and --company-col"
            )
        }
        _ => Ok(mapping),
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use lead_engine::sheet::parse_sheet;

    use super::*;
    use crate::cli::ModeArg;
    use crate::cli::subcommands::FileFormat;

    fn args(name_col: Option<&str>) -> RunArgs {
        RunArgs {
            mode: ModeArg::Enrich,
            file: PathBuf::from("team.csv"),
            name_col: name_col.map(str::to_owned),
            company_col: None,
            email_col: None,
            out: None,
            out_format: FileFormat::Csv,
        }
    }

    #[test]
    fn explicit_column_overrides_the_guess() {
        let sheet = parse_sheet("team.csv", b"Full Name,Nickname,Company\nAda Lovelace,Ada,Analytical\n", b',')
            .expect("sheet parses");
        let mapping = resolve_mapping(Mode::Enrich, &sheet, &args(Some("Nickname"))).expect("mapping");
        assert_eq!(mapping.name_header.as_deref(), Some("Nickname"));
        assert_eq!(mapping.company_header.as_deref(), Some("Company"));
    }

    #[test]
    fn unknown_column_is_rejected() {
        let sheet = parse_sheet("team.csv", b"Name,Company\nAda,Analytical\n", b',').expect("sheet parses");
        let error = resolve_mapping(Mode::Enrich, &sheet, &args(Some("Person")))
            .expect_err("missing column should fail");
        assert!(error.to_string().contains("column 'Person' not found"));
    }
}
