use vendorbook_core::text::comparable;
use vendorbook_core::{ImportRow, SupplierRecord};

use crate::model::{ConflictCandidate, UnchangedRow};

/// How one uploaded row relates to the single record sharing its name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Unchanged(UnchangedRow),
    Conflict(ConflictCandidate),
}

/// Compare the tracked fields. Values are trimmed and a missing or NA value
/// on either side counts as the empty string.
pub fn classify(row: &ImportRow, existing: &SupplierRecord) -> Verdict {
    let old = &existing.fields;
    let external_id_changed =
        comparable(old.external_id.as_deref()) != comparable(row.external_id.as_deref());
    let address_changed = comparable(old.address.as_deref()) != comparable(row.address.as_deref());

    if !external_id_changed && !address_changed {
        return Verdict::Unchanged(UnchangedRow {
            record_id: existing.id,
            legal_name: row.legal_name.clone(),
        });
    }

    Verdict::Conflict(ConflictCandidate {
        record_id: existing.id,
        legal_name: row.legal_name.clone(),
        old_external_id: old.external_id.clone(),
        new_external_id: row.external_id.clone(),
        old_address: old.address.clone(),
        new_address: row.address.clone(),
        external_id_changed,
        address_changed,
        source_row: row.source_row,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use vendorbook_core::{SupplierFields, SupplierId};

    fn stored(external_id: Option<&str>, address: Option<&str>) -> SupplierRecord {
        let mut fields = SupplierFields::named("Acme");
        fields.external_id = external_id.map(String::from);
        fields.address = address.map(String::from);
        let now = Utc::now();
        SupplierRecord {
            id: SupplierId(1),
            fields,
            created_at: now,
            updated_at: now,
        }
    }

    fn upload(external_id: Option<&str>, address: Option<&str>) -> ImportRow {
        ImportRow {
            legal_name: "Acme".into(),
            external_id: external_id.map(String::from),
            address: address.map(String::from),
            source_row: 2,
        }
    }

    #[test]
    fn id_change_only() {
        let verdict = classify(
            &upload(Some("200"), Some("1 Main St")),
            &stored(Some("100"), Some("1 Main St")),
        );
        let Verdict::Conflict(c) = verdict else {
            panic!("expected conflict");
        };
        assert!(c.external_id_changed);
        assert!(!c.address_changed);
        assert_eq!(c.old_external_id.as_deref(), Some("100"));
        assert_eq!(c.new_external_id.as_deref(), Some("200"));
    }

    #[test]
    fn whitespace_is_not_a_change() {
        let verdict = classify(
            &upload(Some("100"), Some("1 Main St")),
            &stored(Some(" 100 "), Some("1 Main St ")),
        );
        assert!(matches!(verdict, Verdict::Unchanged(_)));
    }

    #[test]
    fn na_equals_missing() {
        let verdict = classify(&upload(None, None), &stored(Some("N/A"), Some("")));
        assert!(matches!(verdict, Verdict::Unchanged(_)));
    }

    #[test]
    fn clearing_a_value_is_a_change() {
        let verdict = classify(&upload(Some("100"), None), &stored(Some("100"), Some("1 Main St")));
        let Verdict::Conflict(c) = verdict else {
            panic!("expected conflict");
        };
        assert!(c.address_changed);
        assert!(!c.external_id_changed);
        assert_eq!(c.new_address, None);
    }
}
