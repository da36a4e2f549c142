use std::collections::HashMap;

use vendorbook_core::{ApplyMode, ImportRow, SupplierFields, SupplierRecord};
use vendorbook_store::{BatchOp, Store};

use crate::classify::{classify, Verdict};
use crate::dedupe::dedupe_last;
use crate::error::ReconError;
use crate::model::{AmbiguousMatch, ApplyOutcome, Approval, ImportPlan};

/// Classify uploaded rows against a snapshot of stored records.
///
/// Duplicate names in `rows` are collapsed first (last row wins). Matching is
/// by exact legal name.
pub fn diff(rows: &[ImportRow], existing: &[SupplierRecord]) -> ImportPlan {
    let mut by_name: HashMap<&str, Vec<&SupplierRecord>> = HashMap::new();
    for record in existing {
        by_name
            .entry(record.fields.legal_name.as_str())
            .or_default()
            .push(record);
    }

    let mut plan = ImportPlan {
        source: None,
        analyzed_at: chrono::Utc::now(),
        new: Vec::new(),
        conflicts: Vec::new(),
        unchanged: Vec::new(),
        ambiguous: Vec::new(),
        applied_at: None,
    };

    for row in dedupe_last(rows.to_vec()) {
        match by_name.get(row.legal_name.as_str()).map(Vec::as_slice) {
            None | Some([]) => plan.new.push(row),
            Some([record]) => match classify(&row, record) {
                Verdict::Unchanged(u) => plan.unchanged.push(u),
                Verdict::Conflict(c) => plan.conflicts.push(c),
            },
            Some(matches) => {
                log::warn!(
                    "'{}' matches {} stored records; left out of the import",
                    row.legal_name,
                    matches.len()
                );
                plan.ambiguous.push(AmbiguousMatch {
                    record_ids: matches.iter().map(|r| r.id).collect(),
                    row,
                });
            }
        }
    }

    let s = plan.summary();
    log::info!(
        "analysis: {} new, {} conflict(s), {} unchanged, {} ambiguous",
        s.new,
        s.conflicts,
        s.unchanged,
        s.ambiguous
    );
    plan
}

/// Diff `rows` against the current contents of `store`. Reads only.
pub fn analyze(store: &Store, rows: &[ImportRow]) -> Result<ImportPlan, ReconError> {
    let existing = store.records()?;
    Ok(diff(rows, &existing))
}

/// Insert every new row and update the approved conflicts, then mark the
/// plan applied.
///
/// Updates touch only `external_id`, `address` and `updated_at`. A conflict
/// whose record was deleted since analysis is skipped, and so is a new row
/// whose name was stored in the meantime. Ambiguous rows are never written.
/// A plan that was already applied is refused.
pub fn apply(
    store: &mut Store,
    plan: &mut ImportPlan,
    approval: &Approval,
    mode: ApplyMode,
) -> Result<ApplyOutcome, ReconError> {
    if let Some(at) = plan.applied_at {
        return Err(ReconError::AlreadyApplied(at));
    }

    if let Approval::Names(names) = approval {
        for name in names {
            if plan.conflict(name).is_none() {
                log::warn!("'{name}' is not a conflict in this plan; approval ignored");
            }
        }
    }

    let mut ops: Vec<BatchOp> = plan
        .new
        .iter()
        .map(|row| {
            BatchOp::Insert(SupplierFields {
                legal_name: row.legal_name.clone(),
                external_id: row.external_id.clone(),
                address: row.address.clone(),
                is_prospect: false,
                ..SupplierFields::default()
            })
        })
        .collect();

    let mut declined = 0;
    for conflict in &plan.conflicts {
        if approval.approves(&conflict.legal_name) {
            ops.push(BatchOp::SetImportFields {
                id: conflict.record_id,
                external_id: conflict.new_external_id.clone(),
                address: conflict.new_address.clone(),
            });
        } else {
            declined += 1;
        }
    }

    let batch = store.apply_batch(&ops, mode)?;
    plan.applied_at = Some(chrono::Utc::now());
    Ok(ApplyOutcome::from_batch(batch, declined))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use vendorbook_core::SupplierId;

    fn record(
        id: i64,
        name: &str,
        external_id: Option<&str>,
        address: Option<&str>,
    ) -> SupplierRecord {
        let mut fields = SupplierFields::named(name);
        fields.external_id = external_id.map(String::from);
        fields.address = address.map(String::from);
        let now = Utc::now();
        SupplierRecord {
            id: SupplierId(id),
            fields,
            created_at: now,
            updated_at: now,
        }
    }

    fn row(name: &str, external_id: Option<&str>, address: Option<&str>, line: usize) -> ImportRow {
        ImportRow {
            legal_name: name.to_string(),
            external_id: external_id.map(String::from),
            address: address.map(String::from),
            source_row: line,
        }
    }

    #[test]
    fn diff_sorts_rows_into_buckets() {
        let existing = vec![
            record(1, "Acme", Some("100"), Some("1 Main St")),
            record(2, "Globex", None, Some("Zurich")),
            record(3, "Twin", None, None),
            record(4, "Twin", None, None),
        ];
        let rows = vec![
            row("Acme", Some("200"), Some("1 Main St"), 2),
            row("Globex", None, Some("Zurich"), 3),
            row("Initech", Some("7"), None, 4),
            row("Twin", Some("9"), None, 5),
        ];

        let plan = diff(&rows, &existing);

        assert_eq!(plan.new.len(), 1);
        assert_eq!(plan.new[0].legal_name, "Initech");

        assert_eq!(plan.conflicts.len(), 1);
        let acme = &plan.conflicts[0];
        assert_eq!(acme.record_id, SupplierId(1));
        assert!(acme.external_id_changed);
        assert!(!acme.address_changed);

        assert_eq!(plan.unchanged.len(), 1);
        assert_eq!(plan.unchanged[0].record_id, SupplierId(2));

        assert_eq!(plan.ambiguous.len(), 1);
        assert_eq!(plan.ambiguous[0].record_ids, vec![SupplierId(3), SupplierId(4)]);
    }

    #[test]
    fn diff_matches_names_exactly() {
        let existing = vec![record(1, "Acme", None, None)];
        let plan = diff(&[row("ACME", None, None, 2)], &existing);
        assert_eq!(plan.new.len(), 1);
        assert!(plan.conflicts.is_empty());
    }

    #[test]
    fn diff_of_nothing_is_noop() {
        let plan = diff(&[], &[record(1, "Acme", None, None)]);
        assert!(plan.is_noop());
    }
}
