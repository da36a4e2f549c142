use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::vocab::{AuditStatus, Region, TagSet};

/// System-assigned primary key. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SupplierId(pub i64);

impl fmt::Display for SupplierId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Every mutable field of a supplier. `create` and `update` take this whole.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplierFields {
    /// Natural key for import matching. Must be non-empty.
    pub legal_name: String,
    /// Identifier in the external financial system.
    pub external_id: Option<String>,
    pub is_prospect: bool,
    pub address: Option<String>,
    pub region: Region,
    pub contacts: String,
    pub tags: TagSet,
    pub audit_status: AuditStatus,
    pub comments: String,
}

impl SupplierFields {
    /// Fields with only a legal name set; everything else at its default.
    pub fn named(legal_name: impl Into<String>) -> Self {
        Self {
            legal_name: legal_name.into(),
            ..Self::default()
        }
    }
}

/// A persisted supplier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplierRecord {
    pub id: SupplierId,
    #[serde(flatten)]
    pub fields: SupplierFields,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// What the entry form needs to prefill a supplier picked by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSummary {
    pub id: SupplierId,
    pub external_id: Option<String>,
    pub address: Option<String>,
}

impl From<&SupplierRecord> for RecordSummary {
    fn from(record: &SupplierRecord) -> Self {
        Self {
            id: record.id,
            external_id: record.fields.external_id.clone(),
            address: record.fields.address.clone(),
        }
    }
}

/// One parsed row of an uploaded supplier list. Not persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportRow {
    pub legal_name: String,
    pub external_id: Option<String>,
    pub address: Option<String>,
    /// 1-based line in the source file, header included.
    pub source_row: usize,
}

/// How a batch of writes is committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplyMode {
    /// One transaction: either every write lands or none does.
    #[default]
    Transactional,
    /// Write by write; the first failure stops the batch and earlier writes stay.
    BestEffort,
}

impl fmt::Display for ApplyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transactional => write!(f, "transactional"),
            Self::BestEffort => write!(f, "best_effort"),
        }
    }
}

impl std::str::FromStr for ApplyMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "transactional" => Ok(Self::Transactional),
            "best_effort" => Ok(Self::BestEffort),
            other => Err(format!(
                "unknown apply mode: '{other}' (expected transactional or best_effort)"
            )),
        }
    }
}

/// Serialization used by `export` when the target path does not decide it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    #[default]
    Csv,
    Xlsx,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Xlsx => "xlsx",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().trim_start_matches('.').to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "xlsx" => Ok(Self::Xlsx),
            other => Err(format!("unknown export format: '{other}' (expected csv or xlsx)")),
        }
    }
}
