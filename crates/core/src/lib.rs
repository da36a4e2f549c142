//! `vendorbook-core`: data model shared by the store, the importer and the CLI.
//!
//! Plain types only. No SQL, no file formats.

pub mod model;
pub mod text;
pub mod vocab;

pub use model::{
    ApplyMode, ExportFormat, ImportRow, RecordSummary, SupplierFields, SupplierId, SupplierRecord,
};
pub use vocab::{AuditStatus, Region, Tag, TagSet, UnknownLabel};
