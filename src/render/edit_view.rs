//! Edit mode: one text input per cell of the current page.
//!
//! The page is a static document, so the inputs are read-only and show the
//! `ROW:COLUMN` target for `--set`. Inputs are named by cell id, and
//! `(cell id, value)` pairs map straight back to `(row, column)` through
//! [`edits_from_form`]. The resulting edits go to `Session::apply_edits`,
//! never to the table directly.

use color_eyre::eyre::eyre;
use color_eyre::Result;
use maud::{html, Markup};

use crate::pagination::PageWindow;
use crate::render::table_view::cell_id;
use crate::table::{Table, TableEdit};

pub fn render(table: &Table, window: PageWindow) -> Markup {
    let slice = window.resolve(table.row_count());
    let rows = &table.rows()[slice.range()];

    html! {
        div class="edit-view" {
            p class="caption" { (slice.caption()) }
            table class="csv-table" {
                thead {
                    tr {
                        th class="row-number" { "Row" }
                        @for column in table.columns() {
                            th { (column) }
                        }
                    }
                }
                tbody {
                    @for (offset, values) in rows.iter().enumerate() {
                        @let display_row = slice.display_row(offset);
                        tr {
                            td class="row-number" { (display_row) }
                            @for (position, value) in values.iter().enumerate() {
                                td {
                                    input type="text"
                                        name=(cell_id(display_row, position))
                                        value=(value.to_string())
                                        title=(format!("{}:{}", display_row, table.columns()[position]))
                                        readonly;
                                }
                            }
                        }
                    }
                }
            }
            p class="hint" {
                "Change a cell with "
                code { "--set ROW:COLUMN=VALUE" }
                " and write the edited file with "
                code { "--save-csv FILE" }
                "."
            }
        }
    }
}

/// Parse `cell-{row}-{col}` into a 0-based row index and a column position.
fn parse_cell_id(id: &str) -> Option<(usize, usize)> {
    let rest = id.strip_prefix("cell-")?;
    let (row, col) = rest.split_once('-')?;
    let display_row: usize = row.parse().ok()?;
    let position: usize = col.parse().ok()?;
    Some((display_row.checked_sub(1)?, position))
}

/// Turn submitted `(input name, value)` pairs into cell edits.
///
/// Fields that are not cell inputs are ignored, as are values equal to the
/// cell's current string form. Values are typed by their column through
/// [`Table::parse_input`]. Ids pointing outside the table are errors.
pub fn edits_from_form<'a, I>(table: &Table, fields: I) -> Result<Vec<TableEdit>>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut edits = Vec::new();
    for (name, submitted) in fields {
        if !name.starts_with("cell-") {
            continue;
        }
        let (row, position) =
            parse_cell_id(name).ok_or_else(|| eyre!("Malformed cell id: {}", name))?;
        let column = table
            .columns()
            .get(position)
            .ok_or_else(|| eyre!("Cell {} refers to a missing column", name))?;
        let current = table
            .rows()
            .get(row)
            .map(|values| &values[position])
            .ok_or_else(|| eyre!("Cell {} refers to a missing row", name))?;

        if current.display_string() != submitted {
            edits.push(TableEdit::SetCell {
                row,
                column: column.clone(),
                value: table.parse_input(position, submitted),
            });
        }
    }
    Ok(edits)
}
