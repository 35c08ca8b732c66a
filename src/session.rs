//! Explicit state for one viewing session.
//!
//! Everything the views need is read from here and passed to them as
//! arguments; nothing in `render` or `diff` reaches back into a session.
//! Writes take `&mut self`, so a session has exactly one writer at a time.

use color_eyre::eyre::eyre;
use color_eyre::Result;

use crate::config::AppConfig;
use crate::diff::{DiffAlgorithm, WordDiff, WordDiffEngine};
use crate::error_display::user_message_from_report;
use crate::pagination::PageWindow;
use crate::source::LoadOutcome;
use crate::table::{Table, TableEdit};
use crate::{ThemeMode, ViewMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

impl NoticeLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

/// A non-blocking message shown above the current view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Sidebar metrics for a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileInfo {
    pub rows: usize,
    pub columns: usize,
}

/// The text-compare panel: two inputs and the last comparison.
#[derive(Debug, Clone, Default)]
pub struct DiffPanel {
    pub left: String,
    pub right: String,
    engine: WordDiffEngine,
    result: Option<WordDiff>,
}

impl DiffPanel {
    pub fn new(algorithm: DiffAlgorithm) -> Self {
        Self {
            engine: WordDiffEngine::with_algorithm(algorithm),
            ..Self::default()
        }
    }

    pub fn algorithm(&self) -> DiffAlgorithm {
        self.engine.algorithm()
    }

    pub fn set_texts(&mut self, left: impl Into<String>, right: impl Into<String>) {
        self.left = left.into();
        self.right = right.into();
    }

    /// Diff the current inputs and keep the result.
    pub fn compare(&mut self) -> &WordDiff {
        let diff = self.engine.compare(&self.left, &self.right);
        self.result.insert(diff)
    }

    /// Empty both inputs and drop the result.
    pub fn clear(&mut self) {
        self.left.clear();
        self.right.clear();
        self.result = None;
    }

    pub fn result(&self) -> Option<&WordDiff> {
        self.result.as_ref()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    /// Loaded tables in upload order
    files: Vec<(String, Table)>,
    selected: Option<String>,
    theme: ThemeMode,
    view_mode: ViewMode,
    window: PageWindow,
    diff_panel: DiffPanel,
    notices: Vec<Notice>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty session with the configured theme, view, page size and diff algorithm.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Ok(Self {
            theme: config.theme_mode()?,
            view_mode: config.view_mode()?,
            window: PageWindow::try_new(config.display.rows_per_page, 1)?,
            diff_panel: DiffPanel::new(config.diff_algorithm()?),
            ..Self::default()
        })
    }

    /// Add a loaded table. A name that is already present is ignored and
    /// `false` returned. The first table added becomes the selection.
    pub fn add_table(&mut self, name: impl Into<String>, table: Table) -> bool {
        let name = name.into();
        if self.position(&name).is_some() {
            tracing::debug!(file = %name, "file already loaded, keeping existing table");
            return false;
        }
        if self.selected.is_none() {
            self.selected = Some(name.clone());
        }
        self.files.push((name, table));
        true
    }

    /// Add every successful outcome; each failure becomes an error notice.
    pub fn ingest(&mut self, outcomes: Vec<LoadOutcome>) {
        for outcome in outcomes {
            match outcome.result {
                Ok(table) => {
                    if !self.add_table(outcome.name.clone(), table) {
                        self.push_notice(Notice::warning(format!(
                            "{} is already open; the new copy was skipped.",
                            outcome.name
                        )));
                    }
                }
                Err(e) => {
                    let message = user_message_from_report(&e, Some(&outcome.name));
                    self.push_notice(Notice::error(message));
                }
            }
        }
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.files.iter().position(|(n, _)| n == name)
    }

    pub fn file_names(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(|(name, _)| name.as_str())
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn has_files(&self) -> bool {
        !self.files.is_empty()
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.position(name).map(|i| &self.files[i].1)
    }

    pub fn selected_name(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn selected_table(&self) -> Option<&Table> {
        self.selected.as_deref().and_then(|name| self.table(name))
    }

    /// Select a loaded file. Switching files starts again at page 1.
    pub fn select(&mut self, name: &str) -> Result<()> {
        if self.position(name).is_none() {
            return Err(eyre!("No file named {} is loaded", name));
        }
        if self.selected.as_deref() != Some(name) {
            self.window = self.window.with_page_index(1);
            self.selected = Some(name.to_string());
            tracing::debug!(file = name, "selected file");
        }
        Ok(())
    }

    pub fn file_info(&self, name: &str) -> Option<FileInfo> {
        self.table(name).map(|table| FileInfo {
            rows: table.row_count(),
            columns: table.column_count(),
        })
    }

    /// Install `table` as the table of record for `name`.
    pub fn replace_table(&mut self, name: &str, table: Table) -> Result<()> {
        let index = self
            .position(name)
            .ok_or_else(|| eyre!("No file named {} is loaded", name))?;
        tracing::debug!(
            file = name,
            rows = table.row_count(),
            columns = table.column_count(),
            "replaced table"
        );
        self.files[index].1 = table;
        Ok(())
    }

    /// Apply `edit` to a copy of the file's table and install the copy.
    /// On error the current table is left as it was.
    pub fn apply_edit(&mut self, name: &str, edit: &TableEdit) -> Result<()> {
        let table = self
            .table(name)
            .ok_or_else(|| eyre!("No file named {} is loaded", name))?;
        let next = table.apply_edit(edit)?;
        self.replace_table(name, next)
    }

    /// Apply several edits as one replacement. Either all apply or none do.
    pub fn apply_edits(&mut self, name: &str, edits: &[TableEdit]) -> Result<()> {
        let mut next = self
            .table(name)
            .ok_or_else(|| eyre!("No file named {} is loaded", name))?
            .clone();
        for edit in edits {
            next = next.apply_edit(edit)?;
        }
        self.replace_table(name, next)
    }

    pub fn theme(&self) -> ThemeMode {
        self.theme
    }

    pub fn set_theme(&mut self, theme: ThemeMode) {
        self.theme = theme;
    }

    pub fn toggle_theme(&mut self) -> ThemeMode {
        self.theme = self.theme.toggled();
        self.theme
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn set_view_mode(&mut self, view_mode: ViewMode) {
        self.view_mode = view_mode;
    }

    pub fn window(&self) -> PageWindow {
        self.window
    }

    /// Out-of-range values are snapped into the slider's steps.
    pub fn set_rows_per_page(&mut self, rows_per_page: usize) {
        self.window = self.window.with_rows_per_page(rows_per_page);
    }

    /// Pages past the end are clamped when the view is rendered.
    pub fn set_page(&mut self, page_index: usize) {
        self.window = self.window.with_page_index(page_index);
    }

    pub fn diff_panel(&self) -> &DiffPanel {
        &self.diff_panel
    }

    pub fn diff_panel_mut(&mut self) -> &mut DiffPanel {
        &mut self.diff_panel
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn push_notice(&mut self, notice: Notice) {
        self.notices.push(notice);
    }

    pub fn clear_notices(&mut self) {
        self.notices.clear();
    }
}
