use color_eyre::Result;
use maud::{html, Markup};

use crate::table::Table;

pub const NO_DATA_MESSAGE: &str = "No data available.";

/// The table as a pretty-printed list of records, one object per row.
pub fn render(table: &Table) -> Result<Markup> {
    if table.is_empty() {
        return Ok(html! {
            div class="json-view" {
                p class="notice warning" { (NO_DATA_MESSAGE) }
            }
        });
    }

    let json = table.to_json_pretty()?;
    Ok(html! {
        div class="json-view" {
            pre { code class="language-json" { (json) } }
        }
    })
}
