//! Export of the current (filtered) record view.

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};

use vendorbook_core::{ExportFormat, SupplierRecord};

use crate::error::ExportError;
use crate::xlsx::ExportCell;

/// Persisted columns, in table order.
pub const EXPORT_COLUMNS: [&str; 12] = [
    "id",
    "legal_name",
    "external_id",
    "is_prospect",
    "address",
    "region",
    "contacts",
    "tags",
    "audit_status",
    "comments",
    "created_at",
    "updated_at",
];

const SHEET_NAME: &str = "Fournisseurs";

/// Format implied by the file extension, if it names one we can write.
pub fn format_for(path: &Path) -> Option<ExportFormat> {
    path.extension()
        .and_then(|e| e.to_str())
        .and_then(|e| e.parse().ok())
}

/// Export with the format taken from `path`'s extension.
pub fn export(records: &[SupplierRecord], path: &Path) -> Result<ExportFormat, ExportError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_string();
    let format = format_for(path).ok_or(ExportError::UnsupportedFormat(ext))?;
    export_as(records, path, format)?;
    Ok(format)
}

pub fn export_as(
    records: &[SupplierRecord],
    path: &Path,
    format: ExportFormat,
) -> Result<(), ExportError> {
    match format {
        ExportFormat::Csv => crate::csv::write_rows(
            path,
            &EXPORT_COLUMNS,
            records.iter().map(text_cells),
        )?,
        ExportFormat::Xlsx => crate::xlsx::write_rows(
            path,
            SHEET_NAME,
            &EXPORT_COLUMNS,
            records.iter().map(typed_cells),
        )?,
    }
    log::info!("exported {} record(s) to {}", records.len(), path.display());
    Ok(())
}

fn timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn text_cells(record: &SupplierRecord) -> Vec<String> {
    let f = &record.fields;
    vec![
        record.id.to_string(),
        f.legal_name.clone(),
        f.external_id.clone().unwrap_or_default(),
        f.is_prospect.to_string(),
        f.address.clone().unwrap_or_default(),
        f.region.label().to_string(),
        f.contacts.clone(),
        f.tags.to_storage(),
        f.audit_status.label().to_string(),
        f.comments.clone(),
        timestamp(&record.created_at),
        timestamp(&record.updated_at),
    ]
}

fn typed_cells(record: &SupplierRecord) -> Vec<ExportCell> {
    let mut cells: Vec<ExportCell> = text_cells(record).into_iter().map(ExportCell::Text).collect();
    cells[0] = ExportCell::Number(record.id.0 as f64);
    cells[3] = ExportCell::Bool(record.fields.is_prospect);
    cells
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;
    use vendorbook_core::{Region, SupplierFields, SupplierId, Tag};

    fn sample() -> SupplierRecord {
        let mut fields = SupplierFields::named("Acme, SA");
        fields.external_id = Some("100".into());
        fields.region = Region::Vaud;
        fields.tags.insert(Tag::Critical);
        fields.tags.insert(Tag::Compliant);
        let at = DateTime::parse_from_rfc3339("2024-03-01T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        SupplierRecord {
            id: SupplierId(3),
            fields,
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn test_csv_export_columns() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("view.csv");
        assert_eq!(export(&[sample()], &path).unwrap(), ExportFormat::Csv);

        let mut reader = ::csv::Reader::from_path(&path).unwrap();
        let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
        assert_eq!(headers, EXPORT_COLUMNS);

        let row = reader.records().next().unwrap().unwrap();
        assert_eq!(&row[0], "3");
        assert_eq!(&row[1], "Acme, SA");
        assert_eq!(&row[3], "false");
        assert_eq!(&row[4], "");
        assert_eq!(&row[5], "Vaud");
        assert_eq!(&row[7], sample().fields.tags.to_storage());
        assert_eq!(&row[10], "2024-03-01T10:00:00.000000Z");
    }

    #[test]
    fn test_xlsx_export_reads_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("view.xlsx");
        export(&[sample()], &path).unwrap();

        let table = crate::xlsx::read_table(&path).unwrap();
        assert_eq!(table.headers, EXPORT_COLUMNS);
        assert_eq!(table.rows[0].cells[0], "3");
        assert_eq!(table.rows[0].cells[3], "FALSE");
    }

    #[test]
    fn test_unknown_extension_writes_nothing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("view.pdf");
        assert_eq!(
            export(&[sample()], &path).unwrap_err(),
            ExportError::UnsupportedFormat("pdf".into())
        );
        assert!(fs::metadata(&path).is_err());
    }

    #[test]
    fn test_explicit_format_ignores_extension() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("view.txt");
        export_as(&[], &path, ExportFormat::Csv).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("id,legal_name,external_id"));
    }
}
