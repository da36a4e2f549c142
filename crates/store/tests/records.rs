// Property tests for the record lifecycle: create, update, delete and the
// stored form of tags.
// CI: 64 cases (default). Soak: PROPTEST_CASES=2000 cargo test -p vendorbook-store

use proptest::prelude::*;
use vendorbook_core::{AuditStatus, Region, SupplierFields, Tag, TagSet};
use vendorbook_store::{ListQuery, Store};

fn config() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(64),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

fn arb_region() -> impl Strategy<Value = Region> {
    (0..Region::ALL.len()).prop_map(|i| Region::ALL[i])
}

fn arb_status() -> impl Strategy<Value = AuditStatus> {
    (0..AuditStatus::ALL.len()).prop_map(|i| AuditStatus::ALL[i])
}

fn arb_tags() -> impl Strategy<Value = TagSet> {
    prop::collection::vec(0..Tag::ALL.len(), 0..10)
        .prop_map(|idx| idx.into_iter().map(|i| Tag::ALL[i]).collect())
}

/// Non-blank optional text, as the store keeps it.
fn arb_optional() -> impl Strategy<Value = Option<String>> {
    prop::option::of(r"[A-Za-z0-9éè][A-Za-z0-9éè ,.-]{0,15}")
}

/// Field sets the store accepts unchanged: trimmed name, no blank optionals.
fn arb_fields() -> impl Strategy<Value = SupplierFields> {
    (
        r"[A-Za-zÉé0-9&][A-Za-zÉé0-9&' .,-]{0,30}",
        arb_optional(),
        any::<bool>(),
        arb_optional(),
        arb_region(),
        r"\PC{0,40}",
        arb_tags(),
        arb_status(),
        r"\PC{0,60}",
    )
        .prop_map(|(name, ext, is_prospect, address, region, contacts, tags, status, comments)| {
            SupplierFields {
                legal_name: name.trim().to_string(),
                external_id: ext,
                is_prospect,
                address,
                region,
                contacts,
                tags,
                audit_status: status,
                comments,
            }
        })
}

proptest! {
    #![proptest_config(config())]

    /// What goes in comes back, with matching timestamps.
    #[test]
    fn create_then_read_returns_input(fields in arb_fields()) {
        let store = Store::open_in_memory().unwrap();
        let id = store.create(&fields).unwrap();

        let record = store.read(id).unwrap().unwrap();
        prop_assert_eq!(record.id, id);
        prop_assert_eq!(&record.fields, &fields);
        prop_assert_eq!(record.created_at, record.updated_at);
    }

    /// Update replaces every field, keeps `created_at` and moves `updated_at` forward.
    #[test]
    fn update_then_read_reflects_new_fields(
        before in arb_fields(),
        after in arb_fields(),
        other in arb_fields(),
    ) {
        let store = Store::open_in_memory().unwrap();
        let id = store.create(&before).unwrap();
        let bystander = store.create(&other).unwrap();
        let original = store.get(id).unwrap();

        store.update(id, &after).unwrap();
        let updated = store.get(id).unwrap();
        prop_assert_eq!(&updated.fields, &after);
        prop_assert_eq!(updated.created_at, original.created_at);
        prop_assert!(updated.updated_at > original.updated_at);

        // Same fields again: nothing changes but the clock
        store.update(id, &after).unwrap();
        let again = store.get(id).unwrap();
        prop_assert_eq!(&again.fields, &after);
        prop_assert!(again.updated_at > updated.updated_at);

        prop_assert_eq!(&store.get(bystander).unwrap().fields, &other);
    }

    /// Deleting twice is fine and the record stays gone.
    #[test]
    fn delete_is_idempotent(fields in arb_fields(), keep in arb_fields()) {
        let store = Store::open_in_memory().unwrap();
        let id = store.create(&fields).unwrap();
        let kept = store.create(&keep).unwrap();

        prop_assert!(store.delete(id).unwrap());
        prop_assert!(store.read(id).unwrap().is_none());
        prop_assert!(!store.delete(id).unwrap());
        prop_assert!(store.read(id).unwrap().is_none());
        prop_assert!(store.read(kept).unwrap().is_some());
    }

    /// The stored tag text parses back to the same set and prints identically.
    #[test]
    fn tag_storage_round_trips(tags in arb_tags()) {
        let stored = tags.to_storage();
        let parsed = TagSet::from_storage(&stored).unwrap();
        prop_assert_eq!(&parsed, &tags);
        prop_assert_eq!(parsed.to_storage(), stored);
    }

    /// Tag, region and status filters select exactly what a plain scan would.
    #[test]
    fn view_filters_match_a_scan(
        rows in prop::collection::vec(arb_fields(), 0..15),
        wanted_tags in prop::collection::vec(0..Tag::ALL.len(), 0..3),
        wanted_regions in prop::collection::vec(arb_region(), 0..3),
        wanted_statuses in prop::collection::vec(arb_status(), 0..3),
    ) {
        let store = Store::open_in_memory().unwrap();
        for fields in &rows {
            store.create(fields).unwrap();
        }
        let wanted_tags: Vec<Tag> = wanted_tags.into_iter().map(|i| Tag::ALL[i]).collect();

        let page = store
            .list(
                &ListQuery::default()
                    .with_tags(wanted_tags.clone())
                    .in_regions(wanted_regions.clone())
                    .with_statuses(wanted_statuses.clone()),
            )
            .unwrap();

        let expected: Vec<&SupplierFields> = rows
            .iter()
            .filter(|f| wanted_tags.is_empty() || wanted_tags.iter().any(|t| f.tags.contains(*t)))
            .filter(|f| wanted_regions.is_empty() || wanted_regions.contains(&f.region))
            .filter(|f| wanted_statuses.is_empty() || wanted_statuses.contains(&f.audit_status))
            .collect();
        let got: Vec<&SupplierFields> = page.records.iter().map(|r| &r.fields).collect();
        prop_assert_eq!(page.total as usize, expected.len());
        prop_assert_eq!(got, expected);
    }
}
