// CSV import/export

use std::io::Read;
use std::path::Path;

use crate::error::{ExportError, ImportError};
use crate::import::{Table, TableRow};

/// Read a CSV upload into a raw table, sniffing its delimiter.
pub fn read_table(path: &Path) -> Result<Table, ImportError> {
    let content = read_file_as_utf8(path)?;
    let delimiter = sniff_delimiter(&content);
    log::debug!("{}: delimiter {:?}", path.display(), delimiter as char);
    table_from_str(&content, delimiter)
}

/// Detect the most likely field delimiter by checking consistency across the first few lines.
///
/// For each candidate (tab, semicolon, comma, pipe), count fields per line. The delimiter
/// that produces the most consistent field count (>1 field) wins.
fn sniff_delimiter(content: &str) -> u8 {
    let candidates: &[u8] = &[b'\t', b';', b',', b'|'];
    let sample_lines: Vec<&str> = content.lines().take(10).collect();

    if sample_lines.is_empty() {
        return b',';
    }

    let mut best = b',';
    let mut best_score = 0u64;

    for &delim in candidates {
        let counts: Vec<usize> = sample_lines
            .iter()
            .map(|line| {
                ::csv::ReaderBuilder::new()
                    .delimiter(delim)
                    .has_headers(false)
                    .flexible(true)
                    .from_reader(line.as_bytes())
                    .records()
                    .next()
                    .and_then(|r| r.ok())
                    .map(|r| r.len())
                    .unwrap_or(1)
            })
            .collect();

        // The header line must split
        let target = counts.first().copied().unwrap_or(0);
        if target <= 1 {
            continue;
        }

        let consistent = counts.iter().filter(|&&c| c == target).count() as u64;
        let score = consistent * target as u64;

        if score > best_score {
            best_score = score;
            best = delim;
        }
    }

    best
}

/// Read file and convert to UTF-8 if needed (Windows-1252 fallback). A UTF-8 BOM is dropped.
pub fn read_file_as_utf8(path: &Path) -> Result<String, ImportError> {
    let mut file = std::fs::File::open(path)?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;

    let content = match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => {
            // Excel on Windows still writes CP-1252 "CSV"
            let bytes = e.into_bytes();
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            log::debug!("{}: not UTF-8, decoded as Windows-1252", path.display());
            decoded.into_owned()
        }
    };

    Ok(match content.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_string(),
        None => content,
    })
}

fn table_from_str(content: &str, delimiter: u8) -> Result<Table, ImportError> {
    let mut reader = ::csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut lines = LineCursor::new(content);
    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let record = result?;
        // The reader's own line counter ignores skipped blank lines
        let line = record
            .position()
            .map(|p| lines.line_at(p.byte() as usize))
            .unwrap_or(idx + 1);
        rows.push(TableRow {
            line,
            cells: record.iter().map(str::to_string).collect(),
        });
    }

    Table::from_rows(rows)
}

/// Maps record byte offsets to 1-based physical lines. Offsets must not go backwards.
struct LineCursor<'a> {
    bytes: &'a [u8],
    pos: usize,
    line: usize,
}

impl<'a> LineCursor<'a> {
    fn new(content: &'a str) -> Self {
        Self { bytes: content.as_bytes(), pos: 0, line: 1 }
    }

    /// Line of the record starting at or after `byte`, past any blank lines.
    fn line_at(&mut self, byte: usize) -> usize {
        let mut start = byte.clamp(self.pos, self.bytes.len());
        while start < self.bytes.len() && matches!(self.bytes[start], b'\r' | b'\n') {
            start += 1;
        }
        self.line += self.bytes[self.pos..start].iter().filter(|&&b| b == b'\n').count();
        self.pos = start;
        self.line
    }
}

/// Write a header row followed by `rows`, comma-delimited.
pub fn write_rows<I>(path: &Path, header: &[&str], rows: I) -> Result<(), ExportError>
where
    I: IntoIterator<Item = Vec<String>>,
{
    let mut writer = ::csv::WriterBuilder::new()
        .delimiter(b',')
        .from_path(path)?;

    writer.write_record(header)?;
    for row in rows {
        writer.write_record(&row)?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_sniff_semicolon_delimiter() {
        let content = "Raison Sociale;ID Oracle;Adresse\nAcme;100;Geneve\nGlobex;200;Lausanne\n";
        assert_eq!(sniff_delimiter(content), b';');
    }

    #[test]
    fn test_sniff_comma_delimiter() {
        let content = "Raison Sociale,ID Oracle,Adresse\nAcme,100,Geneve\n";
        assert_eq!(sniff_delimiter(content), b',');
    }

    #[test]
    fn test_sniff_tab_delimiter() {
        let content = "Raison Sociale\tID Oracle\tAdresse\nAcme\t100\tGeneve\n";
        assert_eq!(sniff_delimiter(content), b'\t');
    }

    #[test]
    fn test_sniff_semicolon_with_commas_in_values() {
        let content = "Raison Sociale;ID Oracle;Adresse\n\
                       \"Doe, Jane SA\";1;\"1 Main St, Apt 4\"\n\
                       Bob;2;\"456 Elm\"\n";
        assert_eq!(sniff_delimiter(content), b';');
    }

    #[test]
    fn test_single_column_defaults_to_comma() {
        assert_eq!(sniff_delimiter("Raison Sociale\nAcme\n"), b',');
        assert_eq!(sniff_delimiter(""), b',');
    }

    #[test]
    fn test_bom_and_line_numbers() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("upload.csv");
        fs::write(
            &path,
            "\u{feff}Raison Sociale;ID Oracle;Adresse\n\nAcme;100;1 Main St\n",
        )
        .unwrap();

        let table = read_table(&path).unwrap();
        assert_eq!(table.headers, vec!["Raison Sociale", "ID Oracle", "Adresse"]);
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].line, 3);
        assert_eq!(table.rows[0].cells, vec!["Acme", "100", "1 Main St"]);
    }

    #[test]
    fn test_line_numbers_with_crlf_and_quoted_newlines() {
        let content = "Raison Sociale,ID Oracle,Adresse\r\n\r\n\r\n\
                       Acme,1,\"1 Main St\nFloor 2\"\r\n\
                       \r\n\
                       Globex,2,Zurich\r\n";
        let table = table_from_str(content, b',').unwrap();
        let lines: Vec<usize> = table.rows.iter().map(|r| r.line).collect();
        assert_eq!(lines, vec![4, 7]);
    }

    #[test]
    fn test_line_cursor_skips_blank_lines() {
        let mut lines = LineCursor::new("a\n\n\nb\nc\n");
        assert_eq!(lines.line_at(0), 1);
        assert_eq!(lines.line_at(1), 4);
        assert_eq!(lines.line_at(6), 5);
    }

    #[test]
    fn test_windows_1252_fallback() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("latin.csv");
        // "Genève" with 0xE8 for è
        let mut bytes = b"Raison Sociale,ID Oracle,Adresse\nAcme,1,Gen".to_vec();
        bytes.push(0xE8);
        bytes.extend_from_slice(b"ve\n");
        fs::write(&path, bytes).unwrap();

        let content = read_file_as_utf8(&path).unwrap();
        assert!(content.contains("Genève"));
    }

    #[test]
    fn test_write_rows_quotes_delimiters() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");
        write_rows(
            &path,
            &["legal_name", "tags"],
            vec![vec!["Acme".to_string(), "Conforme,RSE+".to_string()]],
        )
        .unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("legal_name,tags"));
        assert!(content.contains("Acme,\"Conforme,RSE+\""));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        let err = read_table(&dir.path().join("nope.csv")).unwrap_err();
        assert!(!err.is_format());
    }
}
