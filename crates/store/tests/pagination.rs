// Property tests for stateless pagination over the suppliers table.
// CI: 64 cases (default). Soak: PROPTEST_CASES=2000 cargo test -p vendorbook-store

use std::collections::HashSet;

use proptest::prelude::*;
use vendorbook_core::{Region, SupplierFields, SupplierId};
use vendorbook_store::{ListQuery, SortKey, Store};

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

fn arb_sort() -> impl Strategy<Value = SortKey> {
    prop_oneof![
        Just(SortKey::Id),
        Just(SortKey::LegalName),
        Just(SortKey::Region),
        Just(SortKey::CreatedAt),
    ]
}

fn arb_region() -> impl Strategy<Value = Region> {
    (0..Region::ALL.len()).prop_map(|i| Region::ALL[i])
}

/// Names drawn from a tiny alphabet so sort ties are common.
fn arb_names() -> impl Strategy<Value = Vec<(String, Region)>> {
    prop::collection::vec((r"[ab]{1,2}", arb_region()), 0..30)
}

fn seed(rows: &[(String, Region)]) -> Store {
    let store = Store::open_in_memory().unwrap();
    for (name, region) in rows {
        let mut fields = SupplierFields::named(name.clone());
        fields.region = *region;
        store.create(&fields).unwrap();
    }
    store
}

proptest! {
    #![proptest_config(config())]

    /// Walking every page reproduces the unpaged listing exactly once each.
    #[test]
    fn pages_concatenate_to_full_listing(
        rows in arb_names(),
        page_size in 1u32..8,
        sort in arb_sort(),
        ascending in any::<bool>(),
    ) {
        let store = seed(&rows);
        let full = store
            .list(&ListQuery::default().sorted_by(sort, ascending))
            .unwrap();
        prop_assert_eq!(full.total as usize, rows.len());

        let mut walked: Vec<SupplierId> = Vec::new();
        let mut page_no = 1;
        loop {
            let page = store
                .list(&ListQuery::page(page_no, page_size).sorted_by(sort, ascending))
                .unwrap();
            prop_assert_eq!(page.total, full.total);
            if page.records.is_empty() {
                break;
            }
            prop_assert!(page.records.len() <= page_size as usize);
            walked.extend(page.records.iter().map(|r| r.id));
            page_no += 1;
        }

        let expected: Vec<SupplierId> = full.records.iter().map(|r| r.id).collect();
        prop_assert_eq!(&walked, &expected);

        let unique: HashSet<_> = walked.iter().collect();
        prop_assert_eq!(unique.len(), rows.len());
    }

    /// The same query twice returns the same page.
    #[test]
    fn pages_are_repeatable(rows in arb_names(), page in 1u32..5, page_size in 1u32..6) {
        let store = seed(&rows);
        let query = ListQuery::page(page, page_size)
            .with_filter(Some("a"))
            .sorted_by(SortKey::LegalName, true);

        let ids = |query: &ListQuery| -> Vec<SupplierId> {
            store.list(query).unwrap().records.into_iter().map(|r| r.id).collect()
        };
        let first = ids(&query);
        let second = ids(&query);
        prop_assert_eq!(first, second);
    }

    /// Listing by name is ordered case-insensitively.
    #[test]
    fn name_sort_is_ordered(rows in arb_names()) {
        let store = seed(&rows);
        let names: Vec<String> = store
            .list(&ListQuery::default().sorted_by(SortKey::LegalName, true))
            .unwrap()
            .records
            .into_iter()
            .map(|r| r.fields.legal_name.to_lowercase())
            .collect();

        let mut sorted = names.clone();
        sorted.sort();
        prop_assert_eq!(names, sorted);
    }
}
