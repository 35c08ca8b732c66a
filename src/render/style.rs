//! Theme CSS. Palette entries become CSS custom properties (`--csv-<name>`)
//! so the static rules below never mention a concrete color.

use crate::config::Theme;

const TABLE_CSS: &str = r#"
.csv-view { color: var(--csv-text); font-family: system-ui, sans-serif; }
.csv-view .caption { color: var(--csv-text-muted); font-size: 0.85rem; margin: 0.25rem 0; }
.csv-view .table-scroll { max-height: 70vh; overflow: auto; border: 1px solid var(--csv-border); padding: 5px; }
.csv-table { width: 100%; border-collapse: collapse; background: var(--csv-surface); }
.csv-table th, .csv-table td { border: 1px solid var(--csv-border); padding: 8px; text-align: left; vertical-align: top; }
.csv-table th { background: var(--csv-header-bg); position: sticky; top: 0; }
.csv-table tbody tr:hover { background: var(--csv-row-hover); }
.csv-table .row-number { color: var(--csv-text-muted); width: 1%; white-space: nowrap; }
.csv-table .cell-value { display: block; max-width: 300px; white-space: pre-wrap; word-break: break-word; }
.details-button, .detail-actions button {
  background: var(--csv-button-bg); color: var(--csv-button-text);
  border: 1px solid var(--csv-border); border-radius: 4px; padding: 2px 8px; cursor: pointer; font-size: 0.75rem;
}
.detail-overlay { background: var(--csv-detail-bg); color: var(--csv-detail-text); border: 1px solid var(--csv-border); border-radius: 8px; max-width: 80vw; }
.detail-overlay::backdrop { background: rgba(0, 0, 0, 0.5); }
.detail-overlay pre { max-height: 60vh; overflow: auto; white-space: pre-wrap; word-break: break-word; }
.detail-status { margin-left: 0.5rem; color: var(--csv-accent); font-size: 0.75rem; }
.pager { display: flex; align-items: center; gap: 0.75rem; margin-top: 0.5rem; }
.pager-hint { color: var(--csv-text-muted); font-size: 0.8rem; }
"#;

const DIFF_CSS: &str = r#"
.diff-output { line-height: 1.8; white-space: pre-wrap; }
.diff-delete { background: var(--csv-diff-delete-bg); text-decoration: line-through; }
.diff-insert { background: var(--csv-diff-insert-bg); text-decoration: none; }
.diff-summary { color: var(--csv-text-muted); font-size: 0.85rem; }
"#;

const PAGE_CSS: &str = r#"
body { margin: 0; background: var(--csv-background); color: var(--csv-text); font-family: system-ui, sans-serif; }
.layout { display: flex; min-height: 100vh; }
.sidebar { width: 260px; padding: 1rem; border-right: 1px solid var(--csv-border); background: var(--csv-surface); }
.sidebar h1 { font-size: 1.2rem; }
.sidebar ul { list-style: none; padding: 0; }
.sidebar li.selected { color: var(--csv-accent); font-weight: bold; }
.metrics { display: flex; gap: 1rem; }
.metric .value { font-size: 1.4rem; }
.main { flex: 1; padding: 1rem 2rem; overflow: auto; }
.notice { padding: 0.5rem 0.75rem; border-radius: 4px; margin-bottom: 0.5rem; border: 1px solid var(--csv-border); }
.notice.error { color: var(--csv-error); border-color: var(--csv-error); }
.notice.warning { color: var(--csv-accent); }
.json-view pre { background: var(--csv-surface); padding: 0.75rem; overflow: auto; }
.edit-view input { width: 100%; box-sizing: border-box; background: var(--csv-surface); color: var(--csv-text); border: 1px solid var(--csv-border); }
.hint { color: var(--csv-text-muted); font-size: 0.85rem; }
.diff-inputs { display: flex; gap: 1rem; }
.diff-source { flex: 1; background: var(--csv-surface); padding: 0.5rem; white-space: pre-wrap; word-break: break-word; }
"#;

/// `--csv-<name>: <color>;` declarations, sorted by name.
pub fn palette_variables(theme: &Theme) -> String {
    let mut names: Vec<&String> = theme.colors.keys().collect();
    names.sort();
    names
        .into_iter()
        .map(|name| {
            format!(
                "--csv-{}: {};",
                name.replace('_', "-"),
                theme.get(name)
            )
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Styles for a standalone table fragment, scoped to `.csv-view`.
pub fn table_stylesheet(theme: &Theme) -> String {
    format!(".csv-view {{ {} }}\n{}", palette_variables(theme), TABLE_CSS)
}

/// Styles for the whole page: palette on `:root`, then every component.
pub fn page_stylesheet(theme: &Theme) -> String {
    format!(
        ":root {{ color-scheme: {}; {} }}\n{}{}{}",
        theme.mode.as_str(),
        palette_variables(theme),
        PAGE_CSS,
        TABLE_CSS,
        DIFF_CSS
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ThemeMode;

    #[test]
    fn test_palette_variables_follow_mode() {
        let dark = palette_variables(&Theme::builtin(ThemeMode::Dark));
        let light = palette_variables(&Theme::builtin(ThemeMode::Light));
        assert!(dark.contains("--csv-background: #0e1117;"));
        assert!(light.contains("--csv-background: #ffffff;"));
        assert!(dark.contains("--csv-diff-delete-bg:"));
    }

    #[test]
    fn test_page_stylesheet_sets_color_scheme() {
        let css = page_stylesheet(&Theme::builtin(ThemeMode::Light));
        assert!(css.starts_with(":root { color-scheme: light;"));
        assert!(css.contains(".diff-insert"));
    }
}
