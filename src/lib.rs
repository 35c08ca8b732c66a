use color_eyre::eyre::eyre;
use color_eyre::Result;
use std::path::Path;

pub mod config;
pub mod diff;
pub mod error_display;
pub mod logging;
pub mod pagination;
pub mod render;
pub mod session;
pub mod source;
pub mod table;

pub use config::{AppConfig, ColorParser, ConfigManager, Theme};
pub use csvview_cli::{Args, CellAssignment, DiffAlgorithm, TextEncoding, ThemeMode, ViewMode};
pub use diff::{DiffSummary, DiffTag, DiffToken, WordDiff, WordDiffEngine};
pub use pagination::{PageSlice, PageWindow};
pub use render::{TableFragment, TableView};
pub use session::{DiffPanel, Notice, NoticeLevel, Session};
pub use source::{LoadOptions, LoadOutcome};
pub use table::{CellValue, Table, TableEdit};

/// Application name used for the config directory and other app-specific paths
pub const APP_NAME: &str = "csvview";

/// Build a session from CLI args and config, with CLI args taking precedence.
///
/// Files that fail to load, an unknown `--select` name, rejected `--set`
/// edits and unreadable `--compare` inputs become notices; only invalid
/// configuration is an error.
pub fn session_from_args_and_config(args: &Args, config: &AppConfig) -> Result<Session> {
    let mut session = Session::from_config(config)?;

    if let Some(theme) = args.theme {
        session.set_theme(theme);
    }
    if let Some(view) = args.view {
        session.set_view_mode(view);
    }
    if let Some(rows_per_page) = args.rows_per_page {
        session.set_rows_per_page(rows_per_page);
        if !pagination::is_valid_rows_per_page(rows_per_page) {
            session.push_notice(Notice::warning(format!(
                "Rows per page must be between 5 and 100 in steps of 5; using {}.",
                session.window().rows_per_page()
            )));
        }
    }
    if let Some(page) = args.page {
        session.set_page(page);
    }
    if let Some(algorithm) = args.diff_algorithm {
        *session.diff_panel_mut() = DiffPanel::new(algorithm);
    }

    let options = LoadOptions::from_args_and_config(args, config)?;
    session.ingest(source::load_paths(&args.paths, &options));

    if let Some(name) = &args.select {
        if let Err(e) = session.select(name) {
            session.push_notice(Notice::warning(e.to_string()));
        }
    }

    if !args.set.is_empty() {
        if let Err(e) = apply_assignments(&mut session, &args.set) {
            session.push_notice(Notice::error(format!("Edit: {}", e)));
        }
    }

    if let Some([left, right]) = args.compare.as_deref() {
        match (read_text(left, &options), read_text(right, &options)) {
            (Ok(left), Ok(right)) => {
                let panel = session.diff_panel_mut();
                panel.set_texts(left, right);
                panel.compare();
            }
            (Err(e), _) | (_, Err(e)) => {
                let message = error_display::user_message_from_report(&e, None);
                session.push_notice(Notice::error(format!("Text compare: {}", message)));
            }
        }
    }

    Ok(session)
}

/// Apply `--set` edits to the selected file, all or nothing.
///
/// Each assignment becomes a `(cell id, value)` pair, the same shape the edit
/// view names its inputs with, so values are typed by their column.
pub fn apply_assignments(session: &mut Session, assignments: &[CellAssignment]) -> Result<()> {
    let name = session
        .selected_name()
        .ok_or_else(|| eyre!("No file is loaded to edit"))?
        .to_string();
    let table = session
        .table(&name)
        .ok_or_else(|| eyre!("File not found: {}", name))?;

    let mut fields = Vec::with_capacity(assignments.len());
    for assignment in assignments {
        let position = table
            .column_index(&assignment.column)
            .ok_or_else(|| eyre!("Unknown column '{}' in {}", assignment.column, name))?;
        fields.push((
            render::table_view::cell_id(assignment.row, position),
            assignment.value.as_str(),
        ));
    }
    let edits = render::edit_view::edits_from_form(
        table,
        fields.iter().map(|(id, value)| (id.as_str(), *value)),
    )?;

    session.apply_edits(&name, &edits)?;
    tracing::info!(file = %name, edits = edits.len(), "applied cell edits");
    Ok(())
}

/// Write the selected file's table of record as CSV.
pub fn save_selected_csv(session: &Session, path: &Path) -> Result<()> {
    let table = session
        .selected_table()
        .ok_or_else(|| eyre!("No file is loaded to save"))?;
    std::fs::write(path, table.to_csv_string()?)?;
    tracing::info!(path = %path.display(), rows = table.row_count(), "saved csv");
    Ok(())
}

/// Read a text file in the configured encoding.
fn read_text(path: &Path, options: &LoadOptions) -> Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(source::decode_bytes(&bytes, options.encoding)?.into_owned())
}

/// Render the session as a standalone HTML document using the configured palette.
pub fn render_session(session: &Session, config: &AppConfig) -> Result<String> {
    let theme = Theme::from_config(&config.theme, session.theme())?;
    Ok(render::page::render(session, &theme)?.into_string())
}
