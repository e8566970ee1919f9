//! Result export: the original columns followed by the fixed result columns.

use std::path::Path;

use rust_xlsxwriter::Workbook;
use serde::Serialize;
use serde_json::{Map, Value};

use lead_core::entities::Row;
use lead_core::enums::Mode;

use crate::error::EngineError;
use crate::processor::SingleOutcome;

pub const PROSPECT_NAME: &str = "Prospect Name";
pub const PROSPECT_COMPANY: &str = "Prospect Company";
pub const ENRICHED_EMAIL: &str = "Enriched Email";
pub const LINKEDIN_URL: &str = "LinkedIn URL";
pub const STATUS: &str = "Status";
pub const MESSAGE: &str = "Message";

pub const EXPORT_COLUMNS: [&str; 5] = [PROSPECT_NAME, PROSPECT_COMPANY, ENRICHED_EMAIL, LINKEDIN_URL, STATUS];
pub const NOT_AVAILABLE: &str = "N/A";
pub const WORKSHEET_NAME: &str = "Results";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Xlsx,
    Csv,
    Json,
}

/// Rectangular export: column names plus one value per column per row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ExportTable {
    /// One JSON object per row, keyed by column name.
    #[must_use]
    pub fn records(&self) -> Vec<Value> {
        self.rows
            .iter()
            .map(|values| {
                let object: Map<String, Value> = self
                    .columns
                    .iter()
                    .cloned()
                    .zip(values.iter().cloned().map(Value::String))
                    .collect();
                Value::Object(object)
            })
            .collect()
    }

    /// # Errors
    ///
    /// Returns `EngineError::Csv` or `EngineError::Io` if writing fails.
    pub fn write_csv(&self, path: &Path) -> Result<(), EngineError> {
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(&self.columns)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `EngineError::Json` or `EngineError::Io` if writing fails.
    pub fn write_json(&self, path: &Path) -> Result<(), EngineError> {
        let body = serde_json::to_string_pretty(&self.records())?;
        std::fs::write(path, body)?;
        Ok(())
    }

    /// Single-sheet workbook named [`WORKSHEET_NAME`], header row first.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Xlsx` if the workbook cannot be built or saved.
    pub fn write_xlsx(&self, path: &Path) -> Result<(), EngineError> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name(WORKSHEET_NAME)?;
        for (r, values) in std::iter::once(&self.columns).chain(&self.rows).enumerate() {
            let r = u32::try_from(r).map_err(|_| rust_xlsxwriter::XlsxError::RowColumnLimitError)?;
            for (c, value) in values.iter().enumerate() {
                let c = u16::try_from(c).map_err(|_| rust_xlsxwriter::XlsxError::RowColumnLimitError)?;
                sheet.write_string(r, c, value)?;
            }
        }
        workbook.save(path)?;
        Ok(())
    }

    /// # Errors
    ///
    /// See [`Self::write_xlsx`], [`Self::write_csv`] and [`Self::write_json`].
    pub fn write(&self, format: ExportFormat, path: &Path) -> Result<(), EngineError> {
        match format {
            ExportFormat::Xlsx => self.write_xlsx(path),
            ExportFormat::Csv => self.write_csv(path),
            ExportFormat::Json => self.write_json(path),
        }
    }
}

/// Batch export. Original columns come from `headers`, or from the rows'
/// own source records when the session has no headers.
#[must_use]
pub fn export_records(headers: &[String], rows: &[Row]) -> ExportTable {
    let mut source_columns: Vec<String> = headers.to_vec();
    if source_columns.is_empty() {
        for row in rows {
            for (key, _) in row.source.iter() {
                if !source_columns.contains(key) {
                    source_columns.push(key.clone());
                }
            }
        }
    }
    source_columns.retain(|c| !EXPORT_COLUMNS.contains(&c.as_str()));

    let columns = source_columns
        .iter()
        .cloned()
        .chain(EXPORT_COLUMNS.iter().map(|c| (*c).to_owned()))
        .collect();
    let rows = rows
        .iter()
        .map(|row| {
            let mut values: Vec<String> = source_columns
                .iter()
                .map(|c| row.source.0.get(c).cloned().unwrap_or_default())
                .collect();
            values.extend([
                row.name.clone(),
                row.company.clone(),
                row.email().unwrap_or(NOT_AVAILABLE).to_owned(),
                row.linkedin_url
                    .as_deref()
                    .filter(|u| !u.is_empty())
                    .unwrap_or(NOT_AVAILABLE)
                    .to_owned(),
                row.status.as_str().to_owned(),
            ]);
            values
        })
        .collect();
    ExportTable { columns, rows }
}

/// Export of a single lookup: the fixed columns plus the outcome message.
/// Verify exports carry the checked address as the enriched email.
#[must_use]
pub fn single_export_record(mode: Mode, outcome: &SingleOutcome) -> ExportTable {
    let row = &outcome.row;
    let email = row.email().filter(|_| mode != Mode::Linkedin);
    let columns = EXPORT_COLUMNS
        .iter()
        .chain(std::iter::once(&MESSAGE))
        .map(|c| (*c).to_owned())
        .collect();
    let values = vec![
        row.name.clone(),
        row.company.clone(),
        email.unwrap_or(NOT_AVAILABLE).to_owned(),
        row.linkedin_url.clone().unwrap_or_else(|| NOT_AVAILABLE.to_owned()),
        row.status.as_str().to_owned(),
        outcome.message.clone().unwrap_or_default(),
    ];
    ExportTable {
        columns,
        rows: vec![values],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lead_core::entities::Record;
    use lead_core::enums::RowStatus;
    use pretty_assertions::assert_eq;

    fn rows() -> Vec<Row> {
        let mut ada = Row::pending(
            "0",
            "Ada",
            "Analytical",
            Some("ada@analytical.io".into()),
            [("Name", "Ada"), ("Company", "Analytical"), ("Notes", "vip")]
                .into_iter()
                .collect(),
        );
        ada.status = RowStatus::Completed;
        let mut bob = Row::pending(
            "1",
            "Bob",
            "Acme",
            None,
            [("Name", "Bob"), ("Company", "Acme")].into_iter().collect(),
        );
        bob.status = RowStatus::NotFound;
        vec![ada, bob]
    }

    #[test]
    fn batch_export_appends_fixed_columns() {
        let headers = vec!["Name".to_owned(), "Company".to_owned(), "Notes".to_owned()];
        let table = export_records(&headers, &rows());
        assert_eq!(
            table.columns,
            vec![
                "Name",
                "Company",
                "Notes",
                "Prospect Name",
                "Prospect Company",
                "Enriched Email",
                "LinkedIn URL",
                "Status"
            ]
        );
        assert_eq!(
            table.rows[1],
            vec!["Bob", "Acme", "", "Bob", "Acme", "N/A", "N/A", "not_found"]
        );
        assert_eq!(table.records()[0]["Enriched Email"], "ada@analytical.io");
    }

    #[test]
    fn headerless_sessions_use_source_keys() {
        let table = export_records(&[], &rows());
        assert_eq!(&table.columns[..3], &["Company", "Name", "Notes"]);
    }

    #[test]
    fn writes_csv_and_json() {
        let dir = tempfile::tempdir().unwrap();
        let table = export_records(&["Name".to_owned()], &rows());

        let csv_path = dir.path().join("out.csv");
        table.write(ExportFormat::Csv, &csv_path).unwrap();
        let text = std::fs::read_to_string(&csv_path).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("Name,Prospect Name,Prospect Company,Enriched Email,LinkedIn URL,Status")
        );
        assert_eq!(lines.next(), Some("Ada,Ada,Analytical,ada@analytical.io,N/A,completed"));

        let json_path = dir.path().join("out.json");
        table.write(ExportFormat::Json, &json_path).unwrap();
        let parsed: Vec<Value> = serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[1]["Status"], "not_found");
    }

    #[test]
    fn xlsx_export_reads_back_as_a_sheet() {
        let dir = tempfile::tempdir().unwrap();
        let headers = vec!["Name".to_owned(), "Company".to_owned(), "Notes".to_owned()];
        let table = export_records(&headers, &rows());

        let path = dir.path().join("results.xlsx");
        table.write(ExportFormat::Xlsx, &path).unwrap();
        let sheet = crate::sheet::read_sheet(&path).unwrap();
        assert_eq!(sheet.name, "results.xlsx");
        assert_eq!(sheet.headers, table.columns);
        assert_eq!(sheet.records.len(), 2);
        assert_eq!(sheet.records[0].get("Notes"), Some("vip"));
        assert_eq!(sheet.records[0].get("Enriched Email"), Some("ada@analytical.io"));
        assert_eq!(sheet.records[1].get("Status"), Some("not_found"));
        assert_eq!(sheet.records[1].get("LinkedIn URL"), Some("N/A"));
    }

    #[test]
    fn json_records_keep_column_order() {
        let headers = vec!["Zeta".to_owned(), "Alpha".to_owned()];
        let row = Row::pending(
            "0",
            "Ada",
            "Analytical",
            None,
            [("Zeta", "z"), ("Alpha", "a")].into_iter().collect(),
        );
        let table = export_records(&headers, &[row]);
        let record = &table.records()[0];
        let keys: Vec<&str> = record.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec![
                "Zeta",
                "Alpha",
                "Prospect Name",
                "Prospect Company",
                "Enriched Email",
                "LinkedIn URL",
                "Status"
            ]
        );
        let text = serde_json::to_string(record).unwrap();
        assert!(text.starts_with(r#"{"Zeta":"z","Alpha":"a","Prospect Name""#));
    }

    #[test]
    fn single_verify_export_uses_input_email() {
        let mut row = Row::pending("single-row-1", "", "", Some("ada@analytical.io".into()), Record::new());
        row.status = RowStatus::Deliverable;
        let outcome = SingleOutcome {
            row,
            message: Some("Already Processed".into()),
            cached: true,
        };
        let table = single_export_record(Mode::Verify, &outcome);
        let record = &table.records()[0];
        assert_eq!(record["Enriched Email"], "ada@analytical.io");
        assert_eq!(record["LinkedIn URL"], "N/A");
        assert_eq!(record["Message"], "Already Processed");
    }
}
