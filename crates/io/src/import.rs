//! Upload parsing: a CSV or spreadsheet file becomes an ordered list of
//! [`ImportRow`]s, after the header contract has been checked.

use std::path::Path;

use serde::Serialize;

use vendorbook_core::text;
use vendorbook_core::ImportRow;

use crate::error::ImportError;

pub const LEGAL_NAME_HEADER: &str = "Raison Sociale";
pub const EXTERNAL_ID_HEADER: &str = "ID Oracle";
pub const ADDRESS_HEADER: &str = "Adresse";

/// Headers every upload must carry, matched exactly after trimming.
pub const REQUIRED_HEADERS: [&str; 3] = [LEGAL_NAME_HEADER, EXTERNAL_ID_HEADER, ADDRESS_HEADER];

/// Raw cell grid read from a file. The first non-empty row is the header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<TableRow>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    /// 1-based line (CSV) or row number (spreadsheet) in the source file.
    pub line: usize,
    pub cells: Vec<String>,
}

impl Table {
    /// Splits the first row off as headers.
    pub fn from_rows(rows: Vec<TableRow>) -> Result<Self, ImportError> {
        let mut rows = rows.into_iter();
        let header = rows.next().ok_or(ImportError::Empty)?;
        Ok(Self {
            headers: header.cells.iter().map(|h| h.trim().to_string()).collect(),
            rows: rows.collect(),
        })
    }

    fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }
}

/// Counters reported back to whoever uploaded the file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ParseReport {
    /// Data rows seen, blank rows excluded.
    pub rows: usize,
    pub kept: usize,
    /// Rows without a legal name.
    pub dropped: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedImport {
    pub rows: Vec<ImportRow>,
    pub report: ParseReport,
}

/// Which reader handles a given upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Csv,
    Spreadsheet,
}

impl SourceFormat {
    pub fn from_path(path: &Path) -> Result<Self, ImportError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "csv" => Ok(Self::Csv),
            "xlsx" | "xls" | "xlsb" | "ods" => Ok(Self::Spreadsheet),
            _ => Err(ImportError::UnsupportedFormat(ext)),
        }
    }
}

/// Read an uploaded supplier list.
///
/// Fails with [`ImportError::MissingColumns`] before producing any row when a
/// required header is absent. Rows with a missing legal name are dropped and
/// counted; fully blank rows are skipped.
pub fn parse_import(path: &Path) -> Result<ParsedImport, ImportError> {
    let format = SourceFormat::from_path(path)?;
    std::fs::metadata(path)?;

    let table = match format {
        SourceFormat::Csv => crate::csv::read_table(path)?,
        SourceFormat::Spreadsheet => crate::xlsx::read_table(path)?,
    };
    let parsed = rows_from_table(&table)?;

    log::info!(
        "parsed {}: {} row(s), {} kept, {} dropped",
        path.display(),
        parsed.report.rows,
        parsed.report.kept,
        parsed.report.dropped
    );
    Ok(parsed)
}

/// Header check plus row extraction over an already-read table.
pub fn rows_from_table(table: &Table) -> Result<ParsedImport, ImportError> {
    let mut indices = Vec::with_capacity(REQUIRED_HEADERS.len());
    let mut missing = Vec::new();
    for name in REQUIRED_HEADERS {
        match table.column(name) {
            Some(idx) => indices.push(idx),
            None => missing.push(name.to_string()),
        }
    }
    if !missing.is_empty() {
        return Err(ImportError::MissingColumns(missing));
    }
    let (name_col, id_col, address_col) = (indices[0], indices[1], indices[2]);

    let mut report = ParseReport::default();
    let mut rows = Vec::new();

    for row in &table.rows {
        if row.cells.iter().all(|c| c.trim().is_empty()) {
            continue;
        }
        report.rows += 1;

        let cell = |idx: usize| row.cells.get(idx).map(String::as_str).unwrap_or("");
        let Some(legal_name) = text::clean(cell(name_col)) else {
            log::debug!("line {}: no legal name, dropped", row.line);
            report.dropped += 1;
            continue;
        };

        rows.push(ImportRow {
            legal_name,
            external_id: text::clean(cell(id_col)),
            address: text::clean(cell(address_col)),
            source_row: row.line,
        });
    }

    report.kept = rows.len();
    Ok(ParsedImport { rows, report })
}
