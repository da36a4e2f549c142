// File I/O operations

pub mod csv;
pub mod error;
pub mod export;
pub mod import;
pub mod xlsx;

pub use error::{ExportError, ImportError};
pub use export::{export, export_as, EXPORT_COLUMNS};
pub use import::{parse_import, ParseReport, ParsedImport, REQUIRED_HEADERS};
