//! Spreadsheet import: XLSX/CSV/TSV parsing, column-mapping suggestion, and
//! the enrich → verify handoff.

use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};
use serde::Serialize;

use lead_core::entities::{ColumnMapping, Record, Row};
use lead_core::enums::Mode;

use crate::error::EngineError;

pub const EMPTY_FILE: &str = "The uploaded file appears to be empty.";
pub const UNREADABLE_FILE: &str = "Error parsing file. Ensure it's a valid XLSX/CSV.";
pub const HANDOFF_LABEL: &str = "Enriched Emails List";

pub const FOUND_EMAIL: &str = "Found Email";
pub const FOUND_NAME: &str = "Found Name";
pub const FOUND_COMPANY: &str = "Found Company";

const NAME_KEYWORDS: &[&str] = &["name", "person", "contact", "prospect"];
const COMPANY_KEYWORDS: &[&str] = &["company", "domain", "organization", "organisation", "org", "website", "employer"];

/// A parsed spreadsheet: header row plus one record per data row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sheet {
    pub name: String,
    pub headers: Vec<String>,
    pub records: Vec<Record>,
}

/// Read a spreadsheet. Workbooks (`.xlsx`, `.xls`, `.xlsm`, `.xlsb`, `.ods`) use their
/// first worksheet; `.tsv`/`.tab` files are tab-separated; anything else is
/// delimited text with the separator sniffed from the header line.
///
/// # Errors
///
/// Returns `EngineError::Import` when the file cannot be read, cannot be
/// parsed, or has no data rows.
pub fn read_sheet(path: &Path) -> Result<Sheet, EngineError> {
    let name = path
        .file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    if matches!(ext.as_str(), "xlsx" | "xls" | "xlsm" | "xlsb" | "ods") {
        return read_workbook(name, path);
    }

    let bytes = std::fs::read(path).map_err(|error| {
        tracing::warn!(%error, path = %path.display(), "cannot read spreadsheet");
        EngineError::Import(UNREADABLE_FILE.into())
    })?;
    let delimiter = match ext.as_str() {
        "tsv" | "tab" => b'\t',
        _ => sniff_delimiter(&bytes),
    };
    parse_sheet(name, &bytes, delimiter)
}

fn read_workbook(name: String, path: &Path) -> Result<Sheet, EngineError> {
    let unreadable = |error: calamine::Error| {
        tracing::warn!(%error, path = %path.display(), "workbook parse failed");
        EngineError::Import(UNREADABLE_FILE.into())
    };
    let mut workbook = open_workbook_auto(path).map_err(unreadable)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| EngineError::Import(EMPTY_FILE.into()))?
        .map_err(unreadable)?;

    let mut rows = range.rows().map(|cells| cells.iter().map(cell_text).collect::<Vec<_>>());
    let headers: Vec<String> = rows
        .next()
        .unwrap_or_default()
        .into_iter()
        .map(|h| h.trim().to_owned())
        .collect();
    build_sheet(name, headers, rows)
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn sniff_delimiter(bytes: &[u8]) -> u8 {
    let first_line = bytes.split(|b| *b == b'\n').next().unwrap_or_default();
    let tabs = first_line.iter().filter(|b| **b == b'\t').count();
    let commas = first_line.iter().filter(|b| **b == b',').count();
    if tabs > commas { b'\t' } else { b',' }
}

/// Parse spreadsheet bytes. The first row is the header row; blank rows are
/// skipped and short rows are padded with empty cells.
///
/// # Errors
///
/// Returns `EngineError::Import` with [`EMPTY_FILE`] when there are no data
/// rows, or [`UNREADABLE_FILE`] on malformed input.
pub fn parse_sheet(name: impl Into<String>, bytes: &[u8], delimiter: u8) -> Result<Sheet, EngineError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()
        .map_err(unreadable)?
        .iter()
        .map(str::to_owned)
        .collect();
    let cells = reader
        .records()
        .map(|result| result.map(|record| record.iter().map(str::to_owned).collect::<Vec<_>>()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(unreadable)?;
    build_sheet(name.into(), headers, cells.into_iter())
}

fn build_sheet(
    name: String,
    headers: Vec<String>,
    cells: impl Iterator<Item = Vec<String>>,
) -> Result<Sheet, EngineError> {
    if headers.iter().all(String::is_empty) {
        return Err(EngineError::Import(EMPTY_FILE.into()));
    }

    let records: Vec<Record> = cells
        .filter(|row| !row.iter().all(|cell| cell.trim().is_empty()))
        .map(|row| {
            headers
                .iter()
                .enumerate()
                .map(|(i, header)| (header.clone(), row.get(i).cloned().unwrap_or_default()))
                .collect()
        })
        .collect();
    if records.is_empty() {
        return Err(EngineError::Import(EMPTY_FILE.into()));
    }

    Ok(Sheet { name, headers, records })
}

fn unreadable(error: csv::Error) -> EngineError {
    tracing::warn!(%error, "spreadsheet parse failed");
    EngineError::Import(UNREADABLE_FILE.into())
}

/// Guess which headers hold the name, company and email.
///
/// Email is the first header mentioning "email". Name and company go by
/// keyword and never fall on the email column in verify mode.
#[must_use]
pub fn suggest_mapping(mode: Mode, headers: &[String]) -> ColumnMapping {
    let lower: Vec<String> = headers.iter().map(|h| h.to_lowercase()).collect();
    let email = lower.iter().position(|h| h.contains("email") || h.contains("e-mail"));

    let pick = |keywords: &[&str], taken: &[Option<usize>]| {
        lower.iter().enumerate().position(|(i, h)| {
            if taken.contains(&Some(i)) {
                return false;
            }
            if mode == Mode::Verify && Some(i) == email {
                return false;
            }
            keywords.iter().any(|k| h.contains(k))
        })
    };
    let company = pick(COMPANY_KEYWORDS, &[email]);
    let name = pick(NAME_KEYWORDS, &[email, company]);

    let header = |i: Option<usize>| i.map(|i| headers[i].as_str());
    ColumnMapping::new(header(name), header(company), header(email))
}

/// Pending rows for a sheet, numbered from zero.
#[must_use]
pub fn rows_from_sheet(mode: Mode, sheet: &Sheet, mapping: &ColumnMapping) -> Vec<Row> {
    sheet
        .records
        .iter()
        .enumerate()
        .map(|(i, record)| {
            let fields = mapping.apply(mode, record);
            Row::pending(i.to_string(), fields.name, fields.company, fields.email, record.clone())
        })
        .collect()
}

/// Enrich results prepared as a verify batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Handoff {
    pub label: String,
    pub headers: Vec<String>,
    pub mapping: ColumnMapping,
    pub rows: Vec<Row>,
}

/// Keep rows with a found email, reset them to pending, and add the
/// `Found *` columns to their source records.
#[must_use]
pub fn handoff(rows: &[Row]) -> Handoff {
    let rows = rows
        .iter()
        .filter_map(|row| {
            let email = row.email()?.to_owned();
            let mut next = row.clone();
            next.source.insert(FOUND_EMAIL, email.clone());
            next.source.insert(FOUND_NAME, row.name.clone());
            next.source.insert(FOUND_COMPANY, row.company.clone());
            next.email = Some(email);
            next.linkedin_url = None;
            next.reset();
            Some(next)
        })
        .collect::<Vec<_>>();

    Handoff {
        label: HANDOFF_LABEL.to_owned(),
        headers: vec![FOUND_EMAIL.into(), FOUND_NAME.into(), FOUND_COMPANY.into()],
        mapping: ColumnMapping::handoff(),
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lead_core::enums::RowStatus;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn headers(list: &[&str]) -> Vec<String> {
        list.iter().map(|h| (*h).to_owned()).collect()
    }

    #[test]
    fn parses_csv_with_padding_and_blank_rows() {
        let data = b"Name,Company,Email\nAda,Analytical,ada@analytical.io\n,,\nBob,Acme\n";
        let sheet = parse_sheet("leads.csv", data, b',').unwrap();
        assert_eq!(sheet.headers, headers(&["Name", "Company", "Email"]));
        assert_eq!(sheet.records.len(), 2);
        assert_eq!(sheet.records[1].get("Company"), Some("Acme"));
        assert_eq!(sheet.records[1].get("Email"), None);
    }

    #[test]
    fn header_only_file_is_empty() {
        let err = parse_sheet("x.csv", b"Name,Company\n", b',').unwrap_err();
        assert_eq!(err.to_string(), EMPTY_FILE);
        let err = parse_sheet("x.csv", b"", b',').unwrap_err();
        assert_eq!(err.to_string(), EMPTY_FILE);
    }

    #[test]
    fn invalid_utf8_is_unreadable() {
        let err = parse_sheet("x.csv", b"Name\n\xff\xfe\n", b',').unwrap_err();
        assert_eq!(err.to_string(), UNREADABLE_FILE);
    }

    #[test]
    fn reads_tsv_by_extension_and_sniffs_otherwise() {
        let dir = tempfile::tempdir().unwrap();
        let tsv = dir.path().join("leads.tsv");
        std::fs::File::create(&tsv)
            .unwrap()
            .write_all(b"Name\tCompany\nAda\tAnalytical, Ltd\n")
            .unwrap();
        let sheet = read_sheet(&tsv).unwrap();
        assert_eq!(sheet.name, "leads.tsv");
        assert_eq!(sheet.records[0].get("Company"), Some("Analytical, Ltd"));

        let txt = dir.path().join("leads.txt");
        std::fs::write(&txt, "Name\tCompany\nAda\tAnalytical\n").unwrap();
        assert_eq!(read_sheet(&txt).unwrap().headers, headers(&["Name", "Company"]));
    }

    #[test]
    fn reads_first_worksheet_of_xlsx() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("leads.xlsx");
        let mut workbook = rust_xlsxwriter::Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "Name").unwrap();
        sheet.write_string(0, 1, "Company").unwrap();
        sheet.write_string(0, 2, "Employees").unwrap();
        sheet.write_string(1, 0, "Ada").unwrap();
        sheet.write_string(1, 1, "Analytical").unwrap();
        sheet.write_number(1, 2, 12).unwrap();
        sheet.write_string(3, 0, "Bob").unwrap();
        workbook.add_worksheet().write_string(0, 0, "ignored").unwrap();
        workbook.save(&path).unwrap();

        let sheet = read_sheet(&path).unwrap();
        assert_eq!(sheet.headers, headers(&["Name", "Company", "Employees"]));
        assert_eq!(sheet.records.len(), 2);
        assert_eq!(sheet.records[0].get("Employees"), Some("12"));
        assert_eq!(sheet.records[1].get("Name"), Some("Bob"));
        assert_eq!(sheet.records[1].get("Company"), None);
    }

    #[test]
    fn corrupt_workbook_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("leads.xlsx");
        std::fs::write(&path, "Name,Company\nAda,Analytical\n").unwrap();
        let err = read_sheet(&path).unwrap_err();
        assert_eq!(err.to_string(), "Error parsing file. Ensure it's a valid XLSX/CSV.");
    }

    #[test]
    fn missing_file_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_sheet(&dir.path().join("nope.csv")).unwrap_err();
        assert!(matches!(err, EngineError::Import(_)));
    }

    #[test]
    fn suggests_mapping_from_keywords() {
        let hs = headers(&["Full Name", "Company Domain", "Work Email"]);
        assert_eq!(
            suggest_mapping(Mode::Enrich, &hs),
            ColumnMapping::new(Some("Full Name"), Some("Company Domain"), Some("Work Email"))
        );
    }

    #[test]
    fn verify_never_maps_name_to_email_column() {
        let hs = headers(&["Contact Email"]);
        let mapping = suggest_mapping(Mode::Verify, &hs);
        assert_eq!(mapping.email_header.as_deref(), Some("Contact Email"));
        assert_eq!(mapping.name_header, None);
    }

    #[test]
    fn rows_are_numbered_and_pending() {
        let sheet = parse_sheet("x.csv", b"Name,Company\nAda,Analytical\nBob,Acme\n", b',').unwrap();
        let mapping = ColumnMapping::new(Some("Name"), Some("Company"), None);
        let rows = rows_from_sheet(Mode::Enrich, &sheet, &mapping);
        let ids: Vec<&str> = rows.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["0", "1"]);
        assert!(rows.iter().all(|r| r.status == RowStatus::Pending));
        assert_eq!(rows[1].company, "Acme");
    }

    #[test]
    fn handoff_keeps_found_emails() {
        let mut ada = Row::pending("0", "Ada", "Analytical", Some("ada@analytical.io".into()), Record::new());
        ada.status = RowStatus::Completed;
        let mut bob = Row::pending("1", "Bob", "Acme", None, Record::new());
        bob.status = RowStatus::NotFound;

        let out = handoff(&[ada, bob]);
        assert_eq!(out.label, HANDOFF_LABEL);
        assert_eq!(out.rows.len(), 1);
        let row = &out.rows[0];
        assert_eq!(row.status, RowStatus::Pending);
        assert_eq!(row.source.get(FOUND_EMAIL), Some("ada@analytical.io"));
        assert_eq!(row.source.get(FOUND_COMPANY), Some("Analytical"));

        let fields = out.mapping.apply(Mode::Verify, &row.source);
        assert_eq!(fields.email.as_deref(), Some("ada@analytical.io"));
        assert_eq!(fields.name, "Ada");
    }
}
