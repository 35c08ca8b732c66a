pub mod diff_view;
pub mod edit_view;
pub mod json_view;
pub mod page;
pub mod style;
pub mod table_view;

pub use table_view::{truncate_for_display, RenderedCell, RenderedRow, TableFragment, TableView};
