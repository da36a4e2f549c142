use serde::Serialize;

use vendorbook_core::{SupplierFields, SupplierId};

/// One write in an import batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOp {
    /// Insert a fresh record, unless a record with that legal name exists.
    Insert(SupplierFields),
    /// Overwrite only the import-tracked fields of an existing record.
    SetImportFields {
        id: SupplierId,
        external_id: Option<String>,
        address: Option<String>,
    },
}

/// Counts of a finished batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchOutcome {
    pub inserted: usize,
    pub updated: usize,
    /// Inserts whose name was already taken and updates whose row is gone.
    pub skipped: usize,
}
