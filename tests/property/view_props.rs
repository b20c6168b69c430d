//! Property-based tests for the view model
//!
//! Pagination, the page-button window and search filtering.

use proptest::prelude::*;

use voter_registry::record::VoterRecord;
use voter_registry::store::RecordStore;
use voter_registry::view::{page_window, total_pages, ViewState, MAX_PAGE_BUTTONS};

fn store_of(names: &[String]) -> RecordStore {
    RecordStore::from_records(
        names
            .iter()
            .map(|name| VoterRecord {
                name: name.clone(),
                ..Default::default()
            })
            .collect(),
    )
}

fn names_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-zA-Z]{1,8}", 0..60)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Walking every page visits each record exactly once, in store order.
    #[test]
    fn prop_pages_partition_records(names in names_strategy(), rows in 1usize..15) {
        let store = store_of(&names);
        let mut view = ViewState::new(rows).unwrap();
        let total = view.total_pages(&store);
        prop_assert_eq!(total, total_pages(names.len(), rows));

        let mut positions = Vec::new();
        for page_number in 1..=total {
            view.go_to_page(page_number, &store);
            let page = view.page(&store);
            prop_assert!(page.rows.len() <= rows);
            prop_assert!(!page.rows.is_empty());
            positions.extend(page.rows.iter().map(|r| r.position));
        }
        prop_assert_eq!(positions, (0..names.len()).collect::<Vec<_>>());
    }

    /// The window holds min(5, total) consecutive pages including the current one.
    #[test]
    fn prop_window_shape(total in 1usize..200, current_seed in any::<usize>()) {
        let current = current_seed % total + 1;
        let window = page_window(current, total).unwrap();
        let len = window.end() - window.start() + 1;
        prop_assert_eq!(len, MAX_PAGE_BUTTONS.min(total));
        prop_assert!(window.contains(&current));
        prop_assert!(*window.start() >= 1);
        prop_assert!(*window.end() <= total);
    }

    /// Every search result contains the query in some field, case-insensitively,
    /// and no record containing it is left out.
    #[test]
    fn prop_search_filters_exactly(names in names_strategy(), query in "[a-zA-Z]{1,3}") {
        let store = store_of(&names);
        let mut view = ViewState::new(100).unwrap();
        view.set_search(&query, &store);

        let needle = query.to_lowercase();
        let expected: Vec<usize> = names
            .iter()
            .enumerate()
            .filter(|(_, n)| n.to_lowercase().contains(&needle))
            .map(|(i, _)| i)
            .collect();
        let found: Vec<usize> = view.page(&store).rows.iter().map(|r| r.position).collect();
        prop_assert_eq!(found, expected);
        prop_assert_eq!(view.current_page(), 1);
    }

    /// After deleting the last record on the last page, the page is never empty
    /// unless the store is.
    #[test]
    fn prop_delete_never_leaves_empty_page(count in 1usize..50, rows in 1usize..12) {
        let names: Vec<String> = (0..count).map(|i| format!("v{}", i)).collect();
        let mut store = store_of(&names);
        let mut view = ViewState::new(rows).unwrap();
        let last = view.total_pages(&store);
        view.go_to_page(last, &store);

        store.delete(count - 1).unwrap();
        view.after_delete(&store);

        let page = view.page(&store);
        prop_assert_eq!(page.rows.is_empty(), store.is_empty());
        prop_assert!(view.current_page() >= 1);
    }
}

#[test]
fn test_twenty_three_records_three_pages() {
    let names: Vec<String> = (0..23).map(|i| format!("v{}", i)).collect();
    let store = store_of(&names);
    let mut view = ViewState::new(10).unwrap();
    assert_eq!(view.total_pages(&store), 3);
    view.go_to_page(3, &store);
    let positions: Vec<usize> = view.page(&store).rows.iter().map(|r| r.position).collect();
    assert_eq!(positions, vec![20, 21, 22]);
}
