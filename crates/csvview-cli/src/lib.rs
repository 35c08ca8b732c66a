//! Shared CLI definitions for csvview.
//!
//! Used by the main application and by the build script (manpage) and
//! gen_docs binary (command-line-options markdown).

use clap::{CommandFactory, Parser, ValueEnum};
use std::path::PathBuf;
use std::str::FromStr;

/// Text encoding used to decode CSV bytes before parsing.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
pub enum TextEncoding {
    /// ISO-8859-1 (every byte maps to one character)
    #[default]
    Latin1,
    /// Windows code page 1252 (Latin-1 with punctuation in 0x80-0x9F)
    Windows1252,
    /// 7-bit ASCII; bytes above 0x7F are rejected
    Ascii,
    /// UTF-8 (not single-byte; accepted for convenience)
    Utf8,
}

impl TextEncoding {
    /// Parse an encoding label as written in config files (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "latin1" | "latin-1" | "iso-8859-1" | "iso8859-1" => Some(Self::Latin1),
            "windows-1252" | "windows1252" | "cp1252" => Some(Self::Windows1252),
            "ascii" | "us-ascii" => Some(Self::Ascii),
            "utf8" | "utf-8" => Some(Self::Utf8),
            _ => None,
        }
    }

    /// Canonical label
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Latin1 => "latin1",
            Self::Windows1252 => "windows-1252",
            Self::Ascii => "ascii",
            Self::Utf8 => "utf-8",
        }
    }

    /// Whether every byte decodes to exactly one character
    pub fn is_single_byte(&self) -> bool {
        !matches!(self, Self::Utf8)
    }
}

/// Color scheme of the rendered page
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
pub enum ThemeMode {
    Light,
    #[default]
    Dark,
}

impl ThemeMode {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    /// The other mode
    pub fn toggled(&self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

/// How the selected file is presented
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
pub enum ViewMode {
    /// Paginated table with per-cell details
    #[default]
    Table,
    /// Rows as a list of JSON records
    Json,
    /// Every cell as an editable input
    Edit,
}

impl ViewMode {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "table" => Some(Self::Table),
            "json" => Some(Self::Json),
            "edit" => Some(Self::Edit),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Table => "table",
            Self::Json => "json",
            Self::Edit => "edit",
        }
    }

    /// Heading suffix shown next to the file name
    pub fn title(&self) -> &'static str {
        match self {
            Self::Table => "Table View",
            Self::Json => "JSON View",
            Self::Edit => "Edit Mode",
        }
    }
}

/// Sequence alignment used by the word diff
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
pub enum DiffAlgorithm {
    /// Longest-matching-block matcher (recursive longest common run)
    #[default]
    Matcher,
    /// Myers' O(ND) difference algorithm
    Myers,
    /// Patience diff (unique-token anchors, Myers in between)
    Patience,
}

impl DiffAlgorithm {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "matcher" => Some(Self::Matcher),
            "myers" => Some(Self::Myers),
            "patience" => Some(Self::Patience),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Matcher => "matcher",
            Self::Myers => "myers",
            Self::Patience => "patience",
        }
    }
}

/// A `--set ROW:COLUMN=VALUE` cell edit. `row` is the 1-based row number
/// shown in the table; the value may itself contain `=` or `:`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellAssignment {
    pub row: usize,
    pub column: String,
    pub value: String,
}

impl FromStr for CellAssignment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (target, value) = s
            .split_once('=')
            .ok_or_else(|| format!("expected ROW:COLUMN=VALUE, got '{}'", s))?;
        let (row, column) = target
            .split_once(':')
            .ok_or_else(|| format!("expected ROW:COLUMN before '=', got '{}'", target))?;
        let row: usize = row
            .trim()
            .parse()
            .map_err(|_| format!("row must be a positive number, got '{}'", row))?;
        if row == 0 {
            return Err("rows are numbered from 1".to_string());
        }
        if column.is_empty() {
            return Err("column name is empty".to_string());
        }
        Ok(Self {
            row,
            column: column.to_string(),
            value: value.to_string(),
        })
    }
}

/// Command-line arguments for csvview
#[derive(Clone, Parser, Debug)]
#[command(
    name = "csvview",
    version,
    about = "Interactive CSV viewer with cell inspection and word diff",
    long_about = include_str!("../long_about.txt")
)]
pub struct Args {
    /// Path(s) to the CSV file(s) to open. Files that fail to load are reported and skipped
    #[arg(required_unless_present_any = ["generate_config", "compare"], num_args = 1.., value_name = "PATH")]
    pub paths: Vec<PathBuf>,

    /// Single-byte text encoding of the CSV files (default: latin1)
    #[arg(long = "encoding", value_enum)]
    pub encoding: Option<TextEncoding>,

    /// Specify the delimiter to use when reading a file
    #[arg(long = "delimiter")]
    pub delimiter: Option<u8>,

    /// Specify that the file has no header
    #[arg(long = "no-header")]
    pub no_header: Option<bool>,

    /// Rows shown per page: 5 to 100 in steps of 5 (default: 10)
    #[arg(long = "rows-per-page", value_name = "N")]
    pub rows_per_page: Option<usize>,

    /// Page to show, starting at 1. Values past the last page show the last page
    #[arg(long = "page", value_name = "N")]
    pub page: Option<usize>,

    /// Color scheme (default: dark)
    #[arg(long = "theme", value_enum)]
    pub theme: Option<ThemeMode>,

    /// Presentation of the selected file (default: table)
    #[arg(long = "view", value_enum)]
    pub view: Option<ViewMode>,

    /// Name of the file to select; defaults to the first file that loaded
    #[arg(long = "select", value_name = "NAME")]
    pub select: Option<String>,

    /// Compare the words of two text files and include the diff in the page
    #[arg(long = "compare", num_args = 2, value_names = ["LEFT", "RIGHT"])]
    pub compare: Option<Vec<PathBuf>>,

    /// Sequence alignment used by --compare (default: matcher)
    #[arg(long = "diff-algorithm", value_enum)]
    pub diff_algorithm: Option<DiffAlgorithm>,

    /// Set a cell of the selected file before rendering; repeatable. ROW is the 1-based row number
    #[arg(long = "set", value_name = "ROW:COLUMN=VALUE")]
    pub set: Vec<CellAssignment>,

    /// Write the selected file, after --set edits, as CSV to this file
    #[arg(long = "save-csv", value_name = "FILE")]
    pub save_csv: Option<PathBuf>,

    /// Write the page to this file instead of stdout
    #[arg(long = "output", short = 'o', value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Enable debug logging on stderr
    #[arg(long = "debug", action)]
    pub debug: bool,

    /// Generate default configuration file at ~/.config/csvview/config.toml
    #[arg(long = "generate-config", action)]
    pub generate_config: bool,

    /// Force overwrite existing config file when using --generate-config
    #[arg(long = "force", requires = "generate_config", action)]
    pub force: bool,
}

/// Escape `|` and newlines for use in markdown table cells.
fn escape_table_cell(s: &str) -> String {
    s.replace('|', "\\|").replace(['\n', '\r'], " ")
}

fn value_placeholder(arg: &clap::Arg) -> String {
    arg.get_value_names()
        .map(|names| {
            names
                .iter()
                .map(|n: &clap::builder::Str| format!("<{}>", n.as_ref() as &str))
                .collect::<Vec<_>>()
                .join(" ")
        })
        .unwrap_or_default()
}

/// Render command-line options as markdown.
///
/// Used by the gen_docs binary; output is written to stdout.
pub fn render_options_markdown() -> String {
    let mut cmd = Args::command();
    cmd.build();

    let mut out = String::from("# Command Line Options\n\n");

    out.push_str("## Usage\n\n```\n");
    out.push_str(&cmd.render_usage().to_string());
    out.push_str("\n```\n\n");

    out.push_str("## Options\n\n");
    out.push_str("| Option | Description |\n");
    out.push_str("|--------|-------------|\n");

    for arg in cmd.get_arguments() {
        let id = arg.get_id().as_ref().to_string();
        if id == "help" || id == "version" {
            continue;
        }

        let option_str = if arg.is_positional() {
            let placeholder = value_placeholder(arg);
            if arg.is_required_set() {
                placeholder
            } else {
                format!("[{placeholder}]")
            }
        } else {
            let mut parts = Vec::new();
            if let Some(s) = arg.get_short() {
                parts.push(format!("-{s}"));
            }
            if let Some(l) = arg.get_long() {
                parts.push(format!("--{l}"));
            }
            let op = parts.join(", ");
            let placeholder = if arg.get_action().takes_values() {
                value_placeholder(arg)
            } else {
                String::new()
            };
            if placeholder.is_empty() {
                op
            } else {
                format!("{op} {placeholder}")
            }
        };

        let help = arg
            .get_help()
            .map(|h| escape_table_cell(&h.to_string()))
            .unwrap_or_else(|| "-".to_string());

        out.push_str(&format!("| `{option_str}` | {help} |\n"));
    }

    out
}
