//! View model
//!
//! Derives the visible page of records from a [`RecordStore`], a search query
//! and pagination settings. [`ViewState`] holds only the transient inputs
//! (page, page size, query, filtered ids); everything shown is recomputed
//! from the store on demand and is never authoritative.

use std::collections::HashMap;
use std::ops::RangeInclusive;

use crate::error::VoterRegistryError;
use crate::record::VoterRecord;
use crate::store::{RecordId, RecordStore, StoredRecord};

/// Default number of rows on a page.
pub const DEFAULT_ROWS_PER_PAGE: usize = 10;

/// Maximum number of page buttons shown at once.
pub const MAX_PAGE_BUTTONS: usize = 5;

/// Number of pages needed for `visible` rows, `0` when there are none.
pub fn total_pages(visible: usize, rows_per_page: usize) -> usize {
    visible.div_ceil(rows_per_page)
}

/// Range of page numbers to show as buttons.
///
/// At most [`MAX_PAGE_BUTTONS`] pages, centered on `current` where possible
/// and slid inward near either end so that `min(MAX_PAGE_BUTTONS, total)`
/// buttons are always shown. Returns `None` when there are no pages.
pub fn page_window(current: usize, total: usize) -> Option<RangeInclusive<usize>> {
    if total == 0 {
        return None;
    }
    let current = current.clamp(1, total);
    let mut start = current.saturating_sub(MAX_PAGE_BUTTONS / 2).max(1);
    let end = (start + MAX_PAGE_BUTTONS - 1).min(total);
    if end - start < MAX_PAGE_BUTTONS - 1 {
        start = (end + 1).saturating_sub(MAX_PAGE_BUTTONS).max(1);
    }
    Some(start..=end)
}

/// One row of a rendered page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRow<'a> {
    /// Absolute position of the record in the unfiltered store.
    pub position: usize,
    pub id: RecordId,
    pub record: &'a VoterRecord,
}

/// The computed contents of the current page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<'a> {
    pub rows: Vec<PageRow<'a>>,
    pub current_page: usize,
    pub total_pages: usize,
    /// Number of records matching the search (or the whole store).
    pub visible_count: usize,
    /// Page-button range; `None` in the empty state.
    pub buttons: Option<RangeInclusive<usize>>,
}

impl Page<'_> {
    /// True when nothing matches and the empty state should be shown.
    pub fn is_empty(&self) -> bool {
        self.visible_count == 0
    }

    pub fn has_prev(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }
}

/// Pagination and search state for the record table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    current_page: usize,
    rows_per_page: usize,
    search_query: String,
    filtered: Option<Vec<RecordId>>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            current_page: 1,
            rows_per_page: DEFAULT_ROWS_PER_PAGE,
            search_query: String::new(),
            filtered: None,
        }
    }
}

impl ViewState {
    /// Creates a view on page 1 with no search.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if `rows_per_page` is zero.
    pub fn new(rows_per_page: usize) -> Result<Self, VoterRegistryError> {
        check_rows_per_page(rows_per_page)?;
        Ok(Self {
            rows_per_page,
            ..Self::default()
        })
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn rows_per_page(&self) -> usize {
        self.rows_per_page
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    /// Ids of the records matching the active search, `None` without one.
    pub fn filtered(&self) -> Option<&[RecordId]> {
        self.filtered.as_deref()
    }

    /// Sets the search query, recomputes the match set and returns to page 1.
    pub fn set_search(&mut self, query: &str, store: &RecordStore) {
        self.search_query = query.to_string();
        self.current_page = 1;
        self.refresh(store);
    }

    /// Changes the page size and returns to page 1.
    pub fn set_rows_per_page(&mut self, rows_per_page: usize) -> Result<(), VoterRegistryError> {
        check_rows_per_page(rows_per_page)?;
        self.rows_per_page = rows_per_page;
        self.current_page = 1;
        Ok(())
    }

    /// Recomputes the match set after the store changed. The current page is
    /// kept; use [`after_delete`](Self::after_delete) when records were
    /// removed.
    pub fn refresh(&mut self, store: &RecordStore) {
        self.filtered = if self.search_query.is_empty() {
            None
        } else {
            let needle = self.search_query.to_lowercase();
            Some(
                store
                    .entries()
                    .iter()
                    .filter(|e| e.record.matches(&needle))
                    .map(|e| e.id)
                    .collect(),
            )
        };
    }

    /// Recomputes the match set after a deletion and steps back from a page
    /// that no longer has any rows.
    pub fn after_delete(&mut self, store: &RecordStore) {
        self.refresh(store);
        let total = total_pages(self.visible_count(store), self.rows_per_page);
        if self.current_page > 1 && self.current_page > total {
            self.current_page = total.max(1);
        }
    }

    /// Back to page 1 with the match set recomputed; used after an import.
    pub fn reset(&mut self, store: &RecordStore) {
        self.current_page = 1;
        self.refresh(store);
    }

    /// Number of records currently visible across all pages.
    pub fn visible_count(&self, store: &RecordStore) -> usize {
        match &self.filtered {
            Some(ids) => ids.len(),
            None => store.len(),
        }
    }

    pub fn total_pages(&self, store: &RecordStore) -> usize {
        total_pages(self.visible_count(store), self.rows_per_page)
    }

    /// Moves to `page`, clamped to the existing pages.
    pub fn go_to_page(&mut self, page: usize, store: &RecordStore) {
        let total = self.total_pages(store).max(1);
        self.current_page = page.clamp(1, total);
    }

    pub fn next_page(&mut self, store: &RecordStore) {
        self.go_to_page(self.current_page + 1, store);
    }

    pub fn prev_page(&mut self, store: &RecordStore) {
        self.go_to_page(self.current_page.saturating_sub(1), store);
    }

    /// All visible records in store order.
    ///
    /// Ids of the search result that are no longer in the store are skipped.
    pub fn visible<'a>(&self, store: &'a RecordStore) -> Vec<(usize, &'a StoredRecord)> {
        let entries = store.entries();
        match &self.filtered {
            None => entries.iter().enumerate().collect(),
            Some(ids) => {
                let positions: HashMap<RecordId, usize> = entries
                    .iter()
                    .enumerate()
                    .map(|(position, entry)| (entry.id, position))
                    .collect();
                ids.iter()
                    .filter_map(|id| {
                        let position = *positions.get(id)?;
                        Some((position, &entries[position]))
                    })
                    .collect()
            }
        }
    }

    /// Computes the current page.
    pub fn page<'a>(&self, store: &'a RecordStore) -> Page<'a> {
        let visible = self.visible(store);
        let visible_count = visible.len();
        let total = total_pages(visible_count, self.rows_per_page);
        let start = (self.current_page - 1) * self.rows_per_page;
        let end = (start + self.rows_per_page).min(visible_count);

        let rows = visible
            .get(start..end)
            .unwrap_or_default()
            .iter()
            .map(|(position, entry)| PageRow {
                position: *position,
                id: entry.id,
                record: &entry.record,
            })
            .collect();

        Page {
            rows,
            current_page: self.current_page,
            total_pages: total,
            visible_count,
            buttons: page_window(self.current_page, total),
        }
    }

    /// Resolves a row index on the current page to the record's id.
    pub fn id_for_row(&self, store: &RecordStore, row: usize) -> Option<RecordId> {
        self.page(store).rows.get(row).map(|r| r.id)
    }
}

fn check_rows_per_page(rows_per_page: usize) -> Result<(), VoterRegistryError> {
    if rows_per_page == 0 {
        return Err(VoterRegistryError::InvalidArgument(
            "rows per page must be greater than zero".to_string(),
        ));
    }
    Ok(())
}
