use std::fmt;

use vendorbook_core::SupplierId;

#[derive(Debug)]
pub enum StoreError {
    /// A required field is missing or malformed.
    Validation(String),
    /// No record with this id.
    NotFound(SupplierId),
    /// The underlying database failed (open, statement, corrupt row).
    Storage(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(msg) => write!(f, "validation error: {msg}"),
            Self::NotFound(id) => write!(f, "supplier {id} not found"),
            Self::Storage(msg) => write!(f, "storage error: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Storage(err.to_string())
    }
}
