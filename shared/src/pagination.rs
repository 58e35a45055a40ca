//! Pagination engine: maps a derived-view length and a page request to the
//! visible slice and the page-number strip.

use serde::{Deserialize, Serialize};
use std::ops::Range;

use crate::MAX_PAGE_LABELS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "page", rename_all = "snake_case")]
pub enum PageLabel {
    Page(usize),
    /// Non-interactive gap marker.
    Ellipsis,
}

impl PageLabel {
    #[must_use]
    pub const fn page(self) -> Option<usize> {
        match self {
            Self::Page(n) => Some(n),
            Self::Ellipsis => None,
        }
    }
}

impl std::fmt::Display for PageLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Page(n) => write!(f, "{n}"),
            Self::Ellipsis => f.write_str("…"),
        }
    }
}

/// 1-based inclusive display indices, e.g. "Showing 71-140 of 1025". Both
/// indices are 0 when there is nothing to show.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSummary {
    pub first_index: usize,
    pub last_index: usize,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageWindow {
    /// Indices into the derived view covered by the current page.
    pub range: Range<usize>,
    pub current_page: usize,
    pub total_pages: usize,
    /// Length of the whole derived view.
    pub total: usize,
    pub labels: Vec<PageLabel>,
}

impl PageWindow {
    #[must_use]
    pub fn summary(&self) -> PageSummary {
        if self.range.is_empty() {
            return PageSummary {
                first_index: 0,
                last_index: 0,
                total: self.total,
            };
        }
        PageSummary {
            first_index: self.range.start + 1,
            last_index: self.range.end,
            total: self.total,
        }
    }

    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }
}

/// At least one page, even for an empty view.
#[must_use]
pub fn total_pages(total: usize, page_size: usize) -> usize {
    total.div_ceil(page_size.max(1)).max(1)
}

/// Clamps a requested page into `[1, total_pages]`.
#[must_use]
pub fn clamp_page(page: usize, total_pages: usize) -> usize {
    page.clamp(1, total_pages.max(1))
}

#[must_use]
pub fn next_page(current: usize, total_pages: usize) -> usize {
    if current < total_pages {
        current + 1
    } else {
        current
    }
}

#[must_use]
pub fn prev_page(current: usize) -> usize {
    if current > 1 {
        current - 1
    } else {
        current
    }
}

#[must_use]
pub fn page_labels(current: usize, total_pages: usize) -> Vec<PageLabel> {
    if total_pages <= MAX_PAGE_LABELS {
        return (1..=total_pages).map(PageLabel::Page).collect();
    }

    let mut labels = Vec::with_capacity(7);
    if current <= 3 {
        labels.extend((1..=4).map(PageLabel::Page));
        labels.push(PageLabel::Ellipsis);
        labels.push(PageLabel::Page(total_pages));
    } else if current >= total_pages - 2 {
        labels.push(PageLabel::Page(1));
        labels.push(PageLabel::Ellipsis);
        labels.extend((total_pages - 3..=total_pages).map(PageLabel::Page));
    } else {
        labels.push(PageLabel::Page(1));
        labels.push(PageLabel::Ellipsis);
        labels.extend((current - 1..=current + 1).map(PageLabel::Page));
        labels.push(PageLabel::Ellipsis);
        labels.push(PageLabel::Page(total_pages));
    }
    labels
}

/// Out-of-range pages are clamped rather than rejected.
#[must_use]
pub fn paginate(total: usize, page_size: usize, current_page: usize) -> PageWindow {
    let page_size = page_size.max(1);
    let total_pages = total_pages(total, page_size);
    let current_page = clamp_page(current_page, total_pages);

    let start = ((current_page - 1) * page_size).min(total);
    let end = (current_page * page_size).min(total);

    PageWindow {
        range: start..end,
        current_page,
        total_pages,
        total,
        labels: page_labels(current_page, total_pages),
    }
}
