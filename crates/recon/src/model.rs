use std::collections::BTreeSet;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use vendorbook_core::{ImportRow, SupplierId};
use vendorbook_store::BatchOutcome;

use crate::error::ReconError;

// ---------------------------------------------------------------------------
// Analysis output
// ---------------------------------------------------------------------------

/// An uploaded row whose legal name matches exactly one stored record and
/// disagrees with it on at least one tracked field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictCandidate {
    pub record_id: SupplierId,
    pub legal_name: String,
    pub old_external_id: Option<String>,
    pub new_external_id: Option<String>,
    pub old_address: Option<String>,
    pub new_address: Option<String>,
    pub external_id_changed: bool,
    pub address_changed: bool,
    pub source_row: usize,
}

/// Matched row with nothing to change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnchangedRow {
    pub record_id: SupplierId,
    pub legal_name: String,
}

/// Row whose legal name is carried by several stored records. Never applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmbiguousMatch {
    pub row: ImportRow,
    pub record_ids: Vec<SupplierId>,
}

/// Result of analyzing one upload. Holds everything apply needs, so it can be
/// written to disk between the two steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportPlan {
    /// Uploaded file name, for display only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub analyzed_at: DateTime<Utc>,
    pub new: Vec<ImportRow>,
    pub conflicts: Vec<ConflictCandidate>,
    pub unchanged: Vec<UnchangedRow>,
    pub ambiguous: Vec<AmbiguousMatch>,
    /// Set by a successful apply. An applied plan is spent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applied_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PlanSummary {
    pub new: usize,
    pub conflicts: usize,
    pub unchanged: usize,
    pub ambiguous: usize,
}

impl ImportPlan {
    pub fn summary(&self) -> PlanSummary {
        PlanSummary {
            new: self.new.len(),
            conflicts: self.conflicts.len(),
            unchanged: self.unchanged.len(),
            ambiguous: self.ambiguous.len(),
        }
    }

    /// Nothing to insert and nothing to review.
    pub fn is_noop(&self) -> bool {
        self.new.is_empty() && self.conflicts.is_empty()
    }

    pub fn conflict(&self, legal_name: &str) -> Option<&ConflictCandidate> {
        self.conflicts.iter().find(|c| c.legal_name == legal_name)
    }

    pub fn to_json(&self) -> Result<String, ReconError> {
        serde_json::to_string_pretty(self).map_err(|e| ReconError::PlanParse(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, ReconError> {
        serde_json::from_str(json).map_err(|e| ReconError::PlanParse(e.to_string()))
    }

    pub fn save(&self, path: &Path) -> Result<(), ReconError> {
        let json = self.to_json()?;
        std::fs::write(path, json)
            .map_err(|e| ReconError::Io(format!("{}: {e}", path.display())))
    }

    pub fn load(path: &Path) -> Result<Self, ReconError> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| ReconError::Io(format!("{}: {e}", path.display())))?;
        Self::from_json(&json)
    }
}

// ---------------------------------------------------------------------------
// Apply input / output
// ---------------------------------------------------------------------------

/// Which conflicts the reviewer accepted. New rows are always applied.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Approval {
    All,
    #[default]
    None,
    /// Legal names, matched exactly after trimming.
    Names(BTreeSet<String>),
}

impl Approval {
    pub fn names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::Names(names.into_iter().map(|n| n.as_ref().trim().to_string()).collect())
    }

    pub fn approves(&self, legal_name: &str) -> bool {
        match self {
            Self::All => true,
            Self::None => false,
            Self::Names(names) => names.contains(legal_name.trim()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ApplyOutcome {
    pub inserted: usize,
    pub updated: usize,
    /// New rows whose name was taken meanwhile, and approved updates whose
    /// record was deleted after analysis.
    pub skipped: usize,
    /// Conflicts left unapproved.
    pub declined: usize,
}

impl ApplyOutcome {
    pub(crate) fn from_batch(batch: BatchOutcome, declined: usize) -> Self {
        Self {
            inserted: batch.inserted,
            updated: batch.updated,
            skipped: batch.skipped,
            declined,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn approval_by_name_trims() {
        let approval = Approval::names([" Acme "]);
        assert!(approval.approves("Acme"));
        assert!(!approval.approves("acme"));
        assert!(Approval::All.approves("anything"));
        assert!(!Approval::None.approves("Acme"));
    }

    #[test]
    fn plan_json_roundtrip() {
        let plan = ImportPlan {
            source: Some("upload.csv".into()),
            analyzed_at: Utc::now(),
            new: vec![ImportRow {
                legal_name: "Globex".into(),
                external_id: Some("7".into()),
                address: None,
                source_row: 2,
            }],
            conflicts: Vec::new(),
            unchanged: vec![UnchangedRow {
                record_id: SupplierId(1),
                legal_name: "Acme".into(),
            }],
            ambiguous: Vec::new(),
            applied_at: None,
        };
        let back = ImportPlan::from_json(&plan.to_json().unwrap()).unwrap();
        assert_eq!(back, plan);
        assert_eq!(back.summary().unchanged, 1);
    }

    #[test]
    fn garbage_plan_is_rejected() {
        assert!(matches!(
            ImportPlan::from_json("{\"new\": 3}"),
            Err(ReconError::PlanParse(_))
        ));
    }
}
