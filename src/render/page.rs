//! The standalone HTML document: sidebar, selected view, diff panel.

use color_eyre::Result;
use maud::{html, Markup, PreEscaped, DOCTYPE};

use crate::config::Theme;
use crate::render::{diff_view, edit_view, json_view, style, table_view::TableView};
use crate::session::{DiffPanel, Session};
use crate::{ThemeMode, ViewMode};

pub const APP_TITLE: &str = "Interactive CSV Viewer";
pub const NO_FILE_MESSAGE: &str = "Upload a CSV file to start viewing.";

fn theme_indicator(mode: ThemeMode) -> &'static str {
    match mode {
        ThemeMode::Light => "\u{2600}\u{FE0F} Light theme",
        ThemeMode::Dark => "\u{1F319} Dark theme",
    }
}

fn sidebar(session: &Session) -> Markup {
    html! {
        aside class="sidebar" {
            h1 { (APP_TITLE) }
            p class="theme-indicator" data-theme=(session.theme().as_str()) {
                (theme_indicator(session.theme()))
                br;
                span class="hint" { "Switch with " code { "--theme " (session.theme().toggled().as_str()) } }
            }
            @if session.has_files() {
                h3 { "Select a file to view" }
                ul class="file-list" {
                    @for name in session.file_names() {
                        li class=[(session.selected_name() == Some(name)).then_some("selected")] {
                            (name)
                        }
                    }
                }
            }
            @if let Some(info) = session.selected_name().and_then(|name| session.file_info(name)) {
                hr;
                p class="caption" { "File Information" }
                div class="metrics" {
                    div class="metric" {
                        div class="label" { "Rows" }
                        div class="value" { (info.rows) }
                    }
                    div class="metric" {
                        div class="label" { "Columns" }
                        div class="value" { (info.columns) }
                    }
                }
            }
            h3 { "View" }
            ul class="view-modes" {
                @for mode in [ViewMode::Table, ViewMode::Json, ViewMode::Edit] {
                    li class=[(session.view_mode() == mode).then_some("selected")] {
                        (mode.title())
                    }
                }
            }
        }
    }
}

fn selected_view(session: &Session, theme: &Theme) -> Result<Markup> {
    let (Some(name), Some(table)) = (session.selected_name(), session.selected_table()) else {
        return Ok(html! { p class="notice info" { (NO_FILE_MESSAGE) } });
    };

    let body = match session.view_mode() {
        ViewMode::Table => html! { (TableView::render(table, session.window(), theme)) },
        ViewMode::Json => json_view::render(table)?,
        ViewMode::Edit => edit_view::render(table, session.window()),
    };

    Ok(html! {
        section class="file-view" {
            h2 { (name) " " small { "(" (session.view_mode().title()) ")" } }
            (body)
        }
    })
}

fn diff_panel(panel: &DiffPanel) -> Markup {
    html! {
        section class="diff-panel" {
            h2 { "Text Compare" }
            @match panel.result() {
                Some(result) => {
                    div class="diff-inputs" {
                        pre class="diff-source" data-side="left" { (panel.left) }
                        pre class="diff-source" data-side="right" { (panel.right) }
                    }
                    (diff_view::render_diff(result))
                }
                None => {
                    p class="hint" {
                        "Compare two text files word by word with "
                        code { "--compare LEFT RIGHT" }
                        "."
                    }
                }
            }
        }
    }
}

/// Render the whole page for the session's current state.
pub fn render(session: &Session, theme: &Theme) -> Result<Markup> {
    let view = selected_view(session, theme)?;
    Ok(html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { "CSV Viewer" }
                style { (PreEscaped(style::page_stylesheet(theme))) }
            }
            body data-theme=(theme.mode.as_str()) {
                div class="layout" {
                    (sidebar(session))
                    main class="main" {
                        @for notice in session.notices() {
                            div class={ "notice " (notice.level.as_str()) } role="status" {
                                (notice.message)
                            }
                        }
                        (view)
                        (diff_panel(session.diff_panel()))
                    }
                }
            }
        }
    })
}
