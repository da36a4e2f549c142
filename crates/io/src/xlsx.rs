// Excel/ODS import (calamine) and XLSX export (rust_xlsxwriter)

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader, Sheets};
use rust_xlsxwriter::{Format, Workbook as XlsxWorkbook};

use crate::error::{ExportError, ImportError};
use crate::import::{Table, TableRow};

/// One cell of an export row.
#[derive(Debug, Clone, PartialEq)]
pub enum ExportCell {
    Text(String),
    Number(f64),
    Bool(bool),
}

/// Read the first worksheet of an xlsx/xls/xlsb/ods file.
pub fn read_table(path: &Path) -> Result<Table, ImportError> {
    let mut workbook: Sheets<_> = open_workbook_auto(path)
        .map_err(|e| ImportError::Parse(format!("failed to open workbook: {}", e)))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(ImportError::Empty)?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| ImportError::Parse(format!("failed to read sheet '{}': {}", sheet_name, e)))?;

    // Ranges start at the first used cell, not necessarily A1
    let first_row = range.start().map(|(row, _)| row as usize).unwrap_or(0);

    let rows = range
        .rows()
        .enumerate()
        .map(|(idx, cells)| TableRow {
            line: first_row + idx + 1,
            cells: cells.iter().map(cell_text).collect(),
        })
        .collect();

    log::debug!("{}: reading sheet '{}'", path.display(), sheet_name);
    Table::from_rows(rows)
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(n) => {
            // Integers without decimals: an ID typed as 100 must not read as "100.0"
            if n.fract() == 0.0 && n.abs() < 1e15 {
                format!("{}", *n as i64)
            } else {
                format!("{}", n)
            }
        }
        Data::Int(n) => format!("{}", n),
        Data::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        Data::Error(e) => format!("#{:?}", e),
        Data::DateTime(dt) => format!("{}", dt.as_f64()),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
    }
}

/// Write one worksheet: a bold header row, then `rows`.
pub fn write_rows<I>(
    path: &Path,
    sheet_name: &str,
    header: &[&str],
    rows: I,
) -> Result<(), ExportError>
where
    I: IntoIterator<Item = Vec<ExportCell>>,
{
    let mut xlsx_workbook = XlsxWorkbook::new();
    let bold = Format::new().set_bold();

    let worksheet = xlsx_workbook
        .add_worksheet()
        .set_name(sheet_name)
        .map_err(|e| ExportError::Write(format!("failed to create sheet '{sheet_name}': {e}")))?;

    for (col, name) in header.iter().enumerate() {
        worksheet
            .write_string_with_format(0, col as u16, *name, &bold)
            .map_err(|e| ExportError::Write(format!("failed to write header: {}", e)))?;
    }

    for (idx, row) in rows.into_iter().enumerate() {
        let row32 = (idx + 1) as u32;
        for (col, cell) in row.iter().enumerate() {
            let col16 = col as u16;
            let written = match cell {
                ExportCell::Text(s) if s.is_empty() => continue,
                ExportCell::Text(s) => worksheet.write_string(row32, col16, s),
                ExportCell::Number(n) => worksheet.write_number(row32, col16, *n),
                ExportCell::Bool(b) => worksheet.write_boolean(row32, col16, *b),
            };
            written.map_err(|e| {
                ExportError::Write(format!("failed to write row {}: {}", row32 + 1, e))
            })?;
        }
    }

    xlsx_workbook
        .save(path)
        .map_err(|e| ExportError::Write(format!("failed to save XLSX file: {}", e)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_written_sheet_reads_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("suppliers.xlsx");

        write_rows(
            &path,
            "Fournisseurs",
            &["Raison Sociale", "ID Oracle", "Adresse"],
            vec![
                vec![
                    ExportCell::Text("Acme".into()),
                    ExportCell::Number(100.0),
                    ExportCell::Text("1 Main St".into()),
                ],
                vec![
                    ExportCell::Text("Globex".into()),
                    ExportCell::Number(2.5),
                    ExportCell::Text(String::new()),
                ],
            ],
        )
        .unwrap();

        let table = read_table(&path).unwrap();
        assert_eq!(table.headers, vec!["Raison Sociale", "ID Oracle", "Adresse"]);
        assert_eq!(table.rows[0].line, 2);
        assert_eq!(table.rows[0].cells, vec!["Acme", "100", "1 Main St"]);
        assert_eq!(table.rows[1].cells[0], "Globex");
        assert_eq!(table.rows[1].cells[1], "2.5");
        assert_eq!(table.rows[1].cells.get(2).map(String::as_str).unwrap_or(""), "");
    }

    #[test]
    fn test_cell_text_variants() {
        assert_eq!(cell_text(&Data::Float(42.0)), "42");
        assert_eq!(cell_text(&Data::Int(7)), "7");
        assert_eq!(cell_text(&Data::Bool(true)), "TRUE");
        assert_eq!(cell_text(&Data::Empty), "");
    }

    #[test]
    fn test_corrupt_workbook_is_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.xlsx");
        std::fs::write(&path, b"not a zip").unwrap();
        assert!(matches!(read_table(&path), Err(ImportError::Parse(_))));
    }
}
