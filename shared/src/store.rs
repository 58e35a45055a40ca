//! Collection Store: the state of one mounted browse view.
//!
//! The store owns the fetched collection, the filter and sort parameters and
//! the current page. Every input change recomputes the derived view from
//! scratch through [`filter::derive`](crate::filter::derive).

use std::sync::Arc;

use tracing::debug;

use crate::filter::{self, FilterState, SortState};
use crate::model::{Collection, Record, RecordSequence};
use crate::pagination::{self, PageSummary, PageWindow};

/// What happens to the current page after the derived view is recomputed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PagePolicy {
    Reset,
    Clamp,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionStore {
    collection: Collection,
    filter: FilterState,
    sort: SortState,
    page_size: usize,
    current_page: usize,
    derived: RecordSequence,
}

impl CollectionStore {
    #[must_use]
    pub fn new(page_size: usize) -> Self {
        Self {
            collection: Collection::default(),
            filter: FilterState::default(),
            sort: SortState::default(),
            page_size: page_size.max(1),
            current_page: 1,
            derived: RecordSequence::empty(),
        }
    }

    pub fn set_collection(&mut self, collection: Collection) {
        self.collection = collection;
        self.recompute(PagePolicy::Reset);
    }

    pub fn set_filter(&mut self, filter: FilterState) {
        self.filter = filter;
        self.recompute(PagePolicy::Reset);
    }

    pub fn set_sort(&mut self, sort: SortState) {
        self.sort = sort;
        self.recompute(PagePolicy::Reset);
    }

    /// Edits the filter in place, then recomputes as [`set_filter`] does.
    ///
    /// [`set_filter`]: Self::set_filter
    pub fn update_filter(&mut self, edit: impl FnOnce(&mut FilterState)) {
        let mut filter = self.filter.clone();
        edit(&mut filter);
        self.set_filter(filter);
    }

    /// Changes the page size and keeps the user on the nearest valid page.
    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size.max(1);
        self.recompute(PagePolicy::Clamp);
    }

    /// Out-of-range pages are clamped.
    pub fn set_page(&mut self, page: usize) {
        self.current_page = pagination::clamp_page(page, self.total_pages());
    }

    pub fn next_page(&mut self) {
        self.current_page = pagination::next_page(self.current_page, self.total_pages());
    }

    pub fn prev_page(&mut self) {
        self.current_page = pagination::prev_page(self.current_page);
    }

    #[must_use]
    pub fn collection(&self) -> &Collection {
        &self.collection
    }

    #[must_use]
    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    #[must_use]
    pub const fn sort(&self) -> SortState {
        self.sort
    }

    #[must_use]
    pub const fn page_size(&self) -> usize {
        self.page_size
    }

    #[must_use]
    pub const fn current_page(&self) -> usize {
        self.current_page
    }

    #[must_use]
    pub fn total_pages(&self) -> usize {
        pagination::total_pages(self.derived.len(), self.page_size)
    }

    /// The whole derived view. Cloning the returned handle shares storage.
    #[must_use]
    pub fn derived(&self) -> &RecordSequence {
        &self.derived
    }

    #[must_use]
    pub fn page_window(&self) -> PageWindow {
        pagination::paginate(self.derived.len(), self.page_size, self.current_page)
    }

    #[must_use]
    pub fn visible_slice(&self) -> &[Arc<Record>] {
        let window = self.page_window();
        &self.derived[window.range]
    }

    #[must_use]
    pub fn page_summary(&self) -> PageSummary {
        self.page_window().summary()
    }

    fn recompute(&mut self, policy: PagePolicy) {
        self.derived = filter::derive(&self.collection, &self.filter, self.sort);
        self.current_page = match policy {
            PagePolicy::Reset => 1,
            PagePolicy::Clamp => pagination::clamp_page(self.current_page, self.total_pages()),
        };
        debug!(
            collection = self.collection.len(),
            derived = self.derived.len(),
            page = self.current_page,
            "derived view recomputed"
        );
    }
}
