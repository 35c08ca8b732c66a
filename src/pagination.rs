//! Page window math for the table view.
//!
//! A [`PageWindow`] is what the user asked for (page size and page number).
//! [`PageWindow::resolve`] turns it into a [`PageSlice`] for a concrete row
//! count, clamping the page number so that shrinking the page size on a late
//! page never slices out of range.

use color_eyre::eyre::eyre;
use color_eyre::Result;
use std::ops::Range;

pub const ROWS_PER_PAGE_MIN: usize = 5;
pub const ROWS_PER_PAGE_MAX: usize = 100;
pub const ROWS_PER_PAGE_STEP: usize = 5;
pub const DEFAULT_ROWS_PER_PAGE: usize = 10;

/// Whether `rows_per_page` is one of 5, 10, ..., 100.
pub fn is_valid_rows_per_page(rows_per_page: usize) -> bool {
    (ROWS_PER_PAGE_MIN..=ROWS_PER_PAGE_MAX).contains(&rows_per_page)
        && rows_per_page % ROWS_PER_PAGE_STEP == 0
}

/// Requested page size and 1-based page number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    rows_per_page: usize,
    page_index: usize,
}

impl Default for PageWindow {
    fn default() -> Self {
        Self {
            rows_per_page: DEFAULT_ROWS_PER_PAGE,
            page_index: 1,
        }
    }
}

impl PageWindow {
    /// Strict constructor: rejects page sizes outside the slider steps and a
    /// zero page number.
    pub fn try_new(rows_per_page: usize, page_index: usize) -> Result<Self> {
        if !is_valid_rows_per_page(rows_per_page) {
            return Err(eyre!(
                "rows_per_page must be between {} and {} in steps of {}, got {}",
                ROWS_PER_PAGE_MIN,
                ROWS_PER_PAGE_MAX,
                ROWS_PER_PAGE_STEP,
                rows_per_page
            ));
        }
        if page_index == 0 {
            return Err(eyre!("page_index starts at 1"));
        }
        Ok(Self {
            rows_per_page,
            page_index,
        })
    }

    /// Lenient constructor: snaps the page size down to the nearest step and
    /// into range, and raises a zero page number to 1.
    pub fn clamped(rows_per_page: usize, page_index: usize) -> Self {
        let snapped = rows_per_page - rows_per_page % ROWS_PER_PAGE_STEP;
        Self {
            rows_per_page: snapped.clamp(ROWS_PER_PAGE_MIN, ROWS_PER_PAGE_MAX),
            page_index: page_index.max(1),
        }
    }

    pub fn rows_per_page(&self) -> usize {
        self.rows_per_page
    }

    pub fn page_index(&self) -> usize {
        self.page_index
    }

    pub fn with_rows_per_page(self, rows_per_page: usize) -> Self {
        Self::clamped(rows_per_page, self.page_index)
    }

    pub fn with_page_index(self, page_index: usize) -> Self {
        Self::clamped(self.rows_per_page, page_index)
    }

    /// `ceil(row_count / rows_per_page)`, never less than 1.
    pub fn total_pages(&self, row_count: usize) -> usize {
        row_count.div_ceil(self.rows_per_page).max(1)
    }

    /// Same window with the page number clamped into `[1, total_pages]`.
    /// A no-op for a window that is already valid.
    pub fn clamp_to(&self, row_count: usize) -> Self {
        Self {
            rows_per_page: self.rows_per_page,
            page_index: self.page_index.clamp(1, self.total_pages(row_count)),
        }
    }

    pub fn resolve(&self, row_count: usize) -> PageSlice {
        let window = self.clamp_to(row_count);
        let start_index = (window.page_index - 1) * window.rows_per_page;
        let end_index = (start_index + window.rows_per_page).min(row_count);
        PageSlice {
            page_index: window.page_index,
            total_pages: window.total_pages(row_count),
            rows_per_page: window.rows_per_page,
            start_index,
            end_index,
            row_count,
        }
    }
}

/// A resolved page: which rows `[start_index, end_index)` to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSlice {
    pub page_index: usize,
    pub total_pages: usize,
    pub rows_per_page: usize,
    pub start_index: usize,
    pub end_index: usize,
    pub row_count: usize,
}

impl PageSlice {
    pub fn range(&self) -> Range<usize> {
        self.start_index..self.end_index
    }

    pub fn len(&self) -> usize {
        self.end_index - self.start_index
    }

    pub fn is_empty(&self) -> bool {
        self.start_index == self.end_index
    }

    /// 1-based row number shown for the `offset`-th row of this page;
    /// continuous across pages.
    pub fn display_row(&self, offset: usize) -> usize {
        self.start_index + offset + 1
    }

    pub fn has_previous(&self) -> bool {
        self.page_index > 1
    }

    pub fn has_next(&self) -> bool {
        self.page_index < self.total_pages
    }

    /// "Showing rows X to Y of Z"
    pub fn caption(&self) -> String {
        if self.row_count == 0 {
            return "Showing rows 0 to 0 of 0".to_string();
        }
        format!(
            "Showing rows {} to {} of {}",
            self.start_index + 1,
            self.end_index,
            self.row_count
        )
    }
}
