//! Paginated table with per-cell truncation and a details overlay.
//!
//! Rendering is a pure function of `(table, window, theme)`. The returned
//! [`TableFragment`] keeps the structured page (ids, display and full text of
//! every cell) next to its markup so callers and tests can inspect what was
//! rendered without scraping HTML.
//!
//! Each cell owns a `<dialog>` holding its untruncated value, both as text
//! and in a `data-value` attribute. The Copy action reads the attribute, so
//! what reaches the clipboard is never the truncated form.

use maud::{html, Markup, PreEscaped, Render};
use std::borrow::Cow;

use crate::config::Theme;
use crate::pagination::{PageSlice, PageWindow};
use crate::render::style;
use crate::table::Table;
use crate::ThemeMode;

/// Longest string shown untruncated, in characters.
pub const MAX_CELL_CHARS: usize = 100;
/// Characters kept before the ellipsis when truncating.
pub const TRUNCATED_CHARS: usize = 97;
pub const ELLIPSIS: char = '…';

const OVERLAY_SCRIPT: &str = r#"
function csvviewOpenDetail(id) {
  var d = document.getElementById(id);
  if (d && !d.open) { d.showModal(); }
}
function csvviewCloseDetail(id) {
  var d = document.getElementById(id);
  if (d && d.open) { d.close(); }
}
function csvviewCopyDetail(id) {
  var d = document.getElementById(id);
  if (!d) { return; }
  var value = d.getAttribute('data-value') || '';
  var status = d.querySelector('.detail-status');
  navigator.clipboard.writeText(value).then(function () {
    if (status) { status.textContent = 'Copied!'; }
  }, function (err) {
    if (status) { status.textContent = 'Could not copy text'; }
    console.error('Could not copy text: ', err);
  });
}
"#;

/// Shorten `full` to [`TRUNCATED_CHARS`] characters plus an ellipsis when it
/// is longer than [`MAX_CELL_CHARS`] characters.
pub fn truncate_for_display(full: &str) -> Cow<'_, str> {
    match full.char_indices().nth(MAX_CELL_CHARS) {
        None => Cow::Borrowed(full),
        Some(_) => {
            // nth(MAX) exists, so nth(TRUNCATED) does too
            let cut = full
                .char_indices()
                .nth(TRUNCATED_CHARS)
                .map(|(i, _)| i)
                .unwrap_or(full.len());
            let mut shown = String::with_capacity(cut + ELLIPSIS.len_utf8());
            shown.push_str(&full[..cut]);
            shown.push(ELLIPSIS);
            Cow::Owned(shown)
        }
    }
}

pub fn cell_id(display_row: usize, column_position: usize) -> String {
    format!("cell-{}-{}", display_row, column_position)
}

pub fn detail_id(display_row: usize, column_position: usize) -> String {
    format!("detail-{}-{}", display_row, column_position)
}

/// One rendered cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedCell {
    pub id: String,
    pub detail_id: String,
    pub column: String,
    /// Possibly truncated text shown in the grid
    pub display: String,
    /// Untruncated text shown in the overlay and copied to the clipboard
    pub full: String,
    pub truncated: bool,
}

impl RenderedCell {
    /// "Row N, Column 'name'"
    pub fn detail_title(&self, display_row: usize) -> String {
        format!("Row {}, Column '{}'", display_row, self.column)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedRow {
    /// 1-based, continuous across pages
    pub display_row: usize,
    pub cells: Vec<RenderedCell>,
}

/// A rendered page of a table.
#[derive(Debug, Clone)]
pub struct TableFragment {
    pub slice: PageSlice,
    pub columns: Vec<String>,
    pub rows: Vec<RenderedRow>,
    pub theme_mode: ThemeMode,
    stylesheet: String,
}

impl TableFragment {
    pub fn caption(&self) -> String {
        self.slice.caption()
    }

    /// "Page p of n"
    pub fn page_summary(&self) -> String {
        format!("Page {} of {}", self.slice.page_index, self.slice.total_pages)
    }

    pub fn cells(&self) -> impl Iterator<Item = &RenderedCell> {
        self.rows.iter().flat_map(|row| row.cells.iter())
    }

    pub fn to_html(&self) -> String {
        self.render().into_string()
    }

    fn render_cell(&self, display_row: usize, cell: &RenderedCell) -> Markup {
        let open = format!("csvviewOpenDetail('{}')", cell.detail_id);
        let copy = format!("csvviewCopyDetail('{}')", cell.detail_id);
        let close = format!("csvviewCloseDetail('{}')", cell.detail_id);
        html! {
            td id=(cell.id) class="cell" data-truncated=[cell.truncated.then_some("true")] {
                span class="cell-value" { (cell.display) }
                button type="button" class="details-button" onclick=(open) { "Details" }
                dialog id=(cell.detail_id) class="detail-overlay" data-value=(cell.full) {
                    h4 class="detail-title" { (cell.detail_title(display_row)) }
                    pre class="detail-value" { (cell.full) }
                    div class="detail-actions" {
                        button type="button" class="copy-button" onclick=(copy) { "Copy" }
                        button type="button" class="close-button" onclick=(close) { "Close" }
                        span class="detail-status" {}
                    }
                }
            }
        }
    }
}

impl Render for TableFragment {
    fn render(&self) -> Markup {
        let slice = &self.slice;
        html! {
            div class="csv-view" data-theme=(self.theme_mode.as_str()) {
                style { (PreEscaped(&self.stylesheet)) }
                p class="caption" { (self.caption()) }
                div class="table-scroll" {
                    table class="csv-table" {
                        thead {
                            tr {
                                th class="row-number" { "Row" }
                                @for column in &self.columns {
                                    th { (column) }
                                }
                            }
                        }
                        tbody {
                            @for row in &self.rows {
                                tr {
                                    td class="row-number" { (row.display_row) }
                                    @for cell in &row.cells {
                                        (self.render_cell(row.display_row, cell))
                                    }
                                }
                            }
                        }
                    }
                }
                nav class="pager" data-rows-per-page=(slice.rows_per_page) {
                    span class="page-summary" { (self.page_summary()) }
                    @if slice.has_previous() {
                        span class="pager-hint" {
                            "Previous: " code { "--page " (slice.page_index - 1) }
                        }
                    }
                    @if slice.has_next() {
                        span class="pager-hint" {
                            "Next: " code { "--page " (slice.page_index + 1) }
                        }
                    }
                }
                script { (PreEscaped(OVERLAY_SCRIPT)) }
            }
        }
    }
}

/// Renders one page of a table.
pub struct TableView;

impl TableView {
    /// Render the page `window` selects. The window's page number is clamped
    /// to the table; `table` is only read.
    pub fn render(table: &Table, window: PageWindow, theme: &Theme) -> TableFragment {
        let slice = window.resolve(table.row_count());

        let rows = table.rows()[slice.range()]
            .iter()
            .enumerate()
            .map(|(offset, values)| {
                let display_row = slice.display_row(offset);
                let cells = table
                    .columns()
                    .iter()
                    .zip(values)
                    .enumerate()
                    .map(|(position, (column, value))| {
                        let full = value.display_string();
                        let display = truncate_for_display(&full);
                        let truncated = matches!(display, Cow::Owned(_));
                        RenderedCell {
                            id: cell_id(display_row, position),
                            detail_id: detail_id(display_row, position),
                            column: column.clone(),
                            truncated,
                            display: display.into_owned(),
                            full: full.into_owned(),
                        }
                    })
                    .collect();
                RenderedRow { display_row, cells }
            })
            .collect();

        tracing::debug!(
            page = slice.page_index,
            total_pages = slice.total_pages,
            rows_per_page = slice.rows_per_page,
            rows = slice.len(),
            "rendered table page"
        );

        TableFragment {
            slice,
            columns: table.columns().to_vec(),
            rows,
            theme_mode: theme.mode,
            stylesheet: style::table_stylesheet(theme),
        }
    }
}
