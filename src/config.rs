use color_eyre::eyre::eyre;
use color_eyre::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::pagination::{is_valid_rows_per_page, DEFAULT_ROWS_PER_PAGE};
use crate::{DiffAlgorithm, TextEncoding, ThemeMode, ViewMode};

/// Manages config directory and config file operations
#[derive(Clone)]
pub struct ConfigManager {
    pub(crate) config_dir: PathBuf,
}

impl ConfigManager {
    /// Create a ConfigManager with a custom config directory (primarily for testing)
    pub fn with_dir(config_dir: PathBuf) -> Self {
        Self { config_dir }
    }

    /// Create a new ConfigManager for the given app name
    pub fn new(app_name: &str) -> Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| eyre!("Could not determine config directory"))?
            .join(app_name);

        Ok(Self { config_dir })
    }

    /// Get the config directory path
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Get path to a specific config file or subdirectory
    pub fn config_path(&self, path: &str) -> PathBuf {
        self.config_dir.join(path)
    }

    /// Ensure the config directory exists
    pub fn ensure_config_dir(&self) -> Result<()> {
        if !self.config_dir.exists() {
            std::fs::create_dir_all(&self.config_dir)?;
        }
        Ok(())
    }

    /// Generate default configuration template as a string
    pub fn generate_default_config(&self) -> String {
        DEFAULT_CONFIG_TEMPLATE.to_string()
    }

    /// Write default configuration to config file
    pub fn write_default_config(&self, force: bool) -> Result<PathBuf> {
        let config_path = self.config_path("config.toml");

        if config_path.exists() && !force {
            return Err(eyre!(
                "Config file already exists at {}. Use --force to overwrite.",
                config_path.display()
            ));
        }

        self.ensure_config_dir()?;
        std::fs::write(&config_path, DEFAULT_CONFIG_TEMPLATE)?;

        Ok(config_path)
    }

    /// Read and parse `config.toml` from this directory; defaults when absent.
    pub fn load_config(&self) -> Result<AppConfig> {
        let config_path = self.config_path("config.toml");

        if !config_path.exists() {
            return Ok(AppConfig::default());
        }

        let content = std::fs::read_to_string(&config_path).map_err(|e| {
            eyre!(
                "Failed to read config file at {}: {}",
                config_path.display(),
                e
            )
        })?;

        toml::from_str(&content).map_err(|e| {
            eyre!(
                "Failed to parse config file at {}: {}",
                config_path.display(),
                e
            )
        })
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Configuration format version (for future compatibility)
    pub version: String,
    pub file_loading: FileLoadingConfig,
    pub display: DisplayConfig,
    pub theme: ThemeConfig,
    pub diff: DiffConfig,
    pub debug: DebugConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoadingConfig {
    pub encoding: String,
    pub delimiter: Option<u8>,
    pub has_header: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub rows_per_page: usize,
    pub view_mode: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    pub mode: String,
    pub light: PaletteConfig,
    pub dark: PaletteConfig,
}

/// Per-mode color overrides. Unset entries keep the built-in palette.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct PaletteConfig {
    pub background: Option<String>,
    pub surface: Option<String>,
    pub text: Option<String>,
    pub text_muted: Option<String>,
    pub header_bg: Option<String>,
    pub border: Option<String>,
    pub row_hover: Option<String>,
    pub button_bg: Option<String>,
    pub button_text: Option<String>,
    pub detail_bg: Option<String>,
    pub detail_text: Option<String>,
    pub accent: Option<String>,
    pub diff_delete_bg: Option<String>,
    pub diff_insert_bg: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffConfig {
    pub algorithm: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DebugConfig {
    pub enabled: bool,
}

// Default implementations
impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: "0.1".to_string(),
            file_loading: FileLoadingConfig::default(),
            display: DisplayConfig::default(),
            theme: ThemeConfig::default(),
            diff: DiffConfig::default(),
            debug: DebugConfig::default(),
        }
    }
}

impl Default for FileLoadingConfig {
    fn default() -> Self {
        Self {
            encoding: TextEncoding::default().as_str().to_string(),
            delimiter: None,
            has_header: None,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            rows_per_page: DEFAULT_ROWS_PER_PAGE,
            view_mode: ViewMode::default().as_str().to_string(),
        }
    }
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            mode: ThemeMode::default().as_str().to_string(),
            light: PaletteConfig::default(),
            dark: PaletteConfig::default(),
        }
    }
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            algorithm: DiffAlgorithm::default().as_str().to_string(),
        }
    }
}

// Configuration loading and merging
impl AppConfig {
    /// Load configuration from all layers (default → user)
    pub fn load(app_name: &str) -> Result<Self> {
        let mut config = AppConfig::default();

        // A missing or unreadable config dir just means defaults
        if let Ok(manager) = ConfigManager::new(app_name) {
            config.merge(manager.load_config()?);
        }

        config.validate()?;

        Ok(config)
    }

    /// Merge another config into this one (other takes precedence)
    pub fn merge(&mut self, other: AppConfig) {
        if other.version != AppConfig::default().version {
            self.version = other.version;
        }

        self.file_loading.merge(other.file_loading);
        self.display.merge(other.display);
        self.theme.merge(other.theme);
        self.diff.merge(other.diff);
        self.debug.merge(other.debug);
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if !self.version.starts_with("0.1") {
            return Err(eyre!(
                "Unsupported config version: {}. Expected 0.1.x",
                self.version
            ));
        }

        self.encoding()?;

        if !is_valid_rows_per_page(self.display.rows_per_page) {
            return Err(eyre!(
                "rows_per_page must be between 5 and 100 in steps of 5, got {}",
                self.display.rows_per_page
            ));
        }

        self.view_mode()?;
        self.theme_mode()?;
        self.diff_algorithm()?;

        let parser = ColorParser::new();
        self.theme.light.validate(&parser)?;
        self.theme.dark.validate(&parser)?;

        Ok(())
    }

    pub fn encoding(&self) -> Result<TextEncoding> {
        TextEncoding::from_name(&self.file_loading.encoding).ok_or_else(|| {
            eyre!(
                "Invalid encoding: {}. Must be 'latin1', 'windows-1252', 'ascii' or 'utf-8'",
                self.file_loading.encoding
            )
        })
    }

    pub fn view_mode(&self) -> Result<ViewMode> {
        ViewMode::from_name(&self.display.view_mode).ok_or_else(|| {
            eyre!(
                "Invalid view_mode: {}. Must be 'table', 'json' or 'edit'",
                self.display.view_mode
            )
        })
    }

    pub fn theme_mode(&self) -> Result<ThemeMode> {
        ThemeMode::from_name(&self.theme.mode).ok_or_else(|| {
            eyre!(
                "Invalid theme mode: {}. Must be 'light' or 'dark'",
                self.theme.mode
            )
        })
    }

    pub fn diff_algorithm(&self) -> Result<DiffAlgorithm> {
        DiffAlgorithm::from_name(&self.diff.algorithm).ok_or_else(|| {
            eyre!(
                "Invalid diff algorithm: {}. Must be 'matcher', 'myers' or 'patience'",
                self.diff.algorithm
            )
        })
    }
}

// Merge implementations for each config section
impl FileLoadingConfig {
    pub fn merge(&mut self, other: Self) {
        let default = FileLoadingConfig::default();
        if other.encoding != default.encoding {
            self.encoding = other.encoding;
        }
        if other.delimiter.is_some() {
            self.delimiter = other.delimiter;
        }
        if other.has_header.is_some() {
            self.has_header = other.has_header;
        }
    }
}

impl DisplayConfig {
    pub fn merge(&mut self, other: Self) {
        let default = DisplayConfig::default();
        if other.rows_per_page != default.rows_per_page {
            self.rows_per_page = other.rows_per_page;
        }
        if other.view_mode != default.view_mode {
            self.view_mode = other.view_mode;
        }
    }
}

impl ThemeConfig {
    pub fn merge(&mut self, other: Self) {
        let default = ThemeConfig::default();
        if other.mode != default.mode {
            self.mode = other.mode;
        }
        self.light.merge(other.light);
        self.dark.merge(other.dark);
    }
}

impl DiffConfig {
    pub fn merge(&mut self, other: Self) {
        let default = DiffConfig::default();
        if other.algorithm != default.algorithm {
            self.algorithm = other.algorithm;
        }
    }
}

impl DebugConfig {
    pub fn merge(&mut self, other: Self) {
        if other.enabled {
            self.enabled = true;
        }
    }
}

impl PaletteConfig {
    /// Overrides keyed by palette entry name, in palette order.
    fn entries(&self) -> [(&'static str, Option<&String>); 15] {
        [
            ("background", self.background.as_ref()),
            ("surface", self.surface.as_ref()),
            ("text", self.text.as_ref()),
            ("text_muted", self.text_muted.as_ref()),
            ("header_bg", self.header_bg.as_ref()),
            ("border", self.border.as_ref()),
            ("row_hover", self.row_hover.as_ref()),
            ("button_bg", self.button_bg.as_ref()),
            ("button_text", self.button_text.as_ref()),
            ("detail_bg", self.detail_bg.as_ref()),
            ("detail_text", self.detail_text.as_ref()),
            ("accent", self.accent.as_ref()),
            ("diff_delete_bg", self.diff_delete_bg.as_ref()),
            ("diff_insert_bg", self.diff_insert_bg.as_ref()),
            ("error", self.error.as_ref()),
        ]
    }

    /// Validate all color strings can be parsed
    fn validate(&self, parser: &ColorParser) -> Result<()> {
        for (name, value) in self.entries() {
            if let Some(value) = value {
                parser
                    .parse(value)
                    .map_err(|e| eyre!("Invalid color value for '{}': {}", name, e))?;
            }
        }
        Ok(())
    }

    pub fn merge(&mut self, other: Self) {
        macro_rules! take {
            ($($field:ident),*) => {
                $(
                    if other.$field.is_some() {
                        self.$field = other.$field;
                    }
                )*
            };
        }
        take!(
            background,
            surface,
            text,
            text_muted,
            header_bg,
            border,
            row_hover,
            button_bg,
            button_text,
            detail_bg,
            detail_text,
            accent,
            diff_delete_bg,
            diff_insert_bg,
            error
        );
    }
}

const DARK_PALETTE: [(&str, &str); 15] = [
    ("background", "#0e1117"),
    ("surface", "#1e1e1e"),
    ("text", "#ffffff"),
    ("text_muted", "#a3a8b8"),
    ("header_bg", "#333333"),
    ("border", "#dddddd"),
    ("row_hover", "rgba(255, 255, 255, 0.1)"),
    ("button_bg", "#2b2b2b"),
    ("button_text", "#4caf50"),
    ("detail_bg", "#1e201e"),
    ("detail_text", "#ffffff"),
    ("accent", "#4caf50"),
    ("diff_delete_bg", "#5c1f24"),
    ("diff_insert_bg", "#1f4d2b"),
    ("error", "#ff6b6b"),
];

const LIGHT_PALETTE: [(&str, &str); 15] = [
    ("background", "#ffffff"),
    ("surface", "#ffffff"),
    ("text", "#131010"),
    ("text_muted", "#555555"),
    ("header_bg", "#f2f2f2"),
    ("border", "#dddddd"),
    ("row_hover", "rgba(0, 0, 0, 0.05)"),
    ("button_bg", "#4caf50"),
    ("button_text", "#ffffff"),
    ("detail_bg", "#ffffff"),
    ("detail_text", "#131010"),
    ("accent", "#4caf50"),
    ("diff_delete_bg", "#ffd7d5"),
    ("diff_insert_bg", "#ccffd8"),
    ("error", "#c62828"),
];

/// Validates CSS color strings: `#rgb`, `#rrggbb`, `rgb(r, g, b)`,
/// `rgba(r, g, b, a)` and a handful of keywords.
#[derive(Debug, Default)]
pub struct ColorParser;

impl ColorParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse a color and return its normalized CSS form
    pub fn parse(&self, s: &str) -> Result<String> {
        let trimmed = s.trim();
        let lower = trimmed.to_lowercase();

        if let Some(hex) = lower.strip_prefix('#') {
            return parse_hex(hex).map(|(r, g, b)| format!("#{:02x}{:02x}{:02x}", r, g, b));
        }

        if let Some(args) = lower
            .strip_prefix("rgba(")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            let parts: Vec<&str> = args.split(',').map(str::trim).collect();
            if let [r, g, b, a] = parts.as_slice() {
                let (r, g, b) = (channel(r, trimmed)?, channel(g, trimmed)?, channel(b, trimmed)?);
                let alpha = a
                    .parse::<f64>()
                    .ok()
                    .filter(|a| (0.0..=1.0).contains(a))
                    .ok_or_else(|| eyre!("Invalid alpha in color: '{}'", trimmed))?;
                return Ok(format!("rgba({}, {}, {}, {})", r, g, b, alpha));
            }
            return Err(eyre!("Expected rgba(r, g, b, a), got '{}'", trimmed));
        }

        if let Some(args) = lower
            .strip_prefix("rgb(")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            let parts: Vec<&str> = args.split(',').map(str::trim).collect();
            if let [r, g, b] = parts.as_slice() {
                let (r, g, b) = (channel(r, trimmed)?, channel(g, trimmed)?, channel(b, trimmed)?);
                return Ok(format!("#{:02x}{:02x}{:02x}", r, g, b));
            }
            return Err(eyre!("Expected rgb(r, g, b), got '{}'", trimmed));
        }

        match lower.as_str() {
            "black" | "white" | "red" | "green" | "blue" | "gray" | "grey" | "transparent"
            | "inherit" | "currentcolor" => Ok(lower),
            _ => Err(eyre!(
                "Unknown color: '{}'. Supported: hex (#rgb, #rrggbb), rgb(), rgba() \
                 or basic keywords (black, white, transparent, ...)",
                trimmed
            )),
        }
    }
}

fn channel(s: &str, color: &str) -> Result<u8> {
    s.parse::<u8>()
        .map_err(|_| eyre!("Invalid color channel '{}' in '{}'", s, color))
}

/// Parse the digits of a hex color (without `#`) to RGB components
fn parse_hex(hex: &str) -> Result<(u8, u8, u8)> {
    let expanded: String = match hex.len() {
        3 => hex.chars().flat_map(|c| [c, c]).collect(),
        6 => hex.to_string(),
        _ => {
            return Err(eyre!(
                "Invalid hex color format: '#{}'. Expected #rgb or #rrggbb",
                hex
            ))
        }
    };
    if !expanded.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(eyre!("Invalid hex digits in color: '#{}'", hex));
    }

    let component = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&expanded[range], 16)
            .map_err(|_| eyre!("Invalid hex color: '#{}'", hex))
    };
    Ok((component(0..2)?, component(2..4)?, component(4..6)?))
}

/// Theme containing resolved CSS colors for one mode
#[derive(Debug, Clone)]
pub struct Theme {
    pub mode: ThemeMode,
    pub colors: HashMap<String, String>,
}

impl Theme {
    /// Built-in palette for `mode`
    pub fn builtin(mode: ThemeMode) -> Self {
        let base = match mode {
            ThemeMode::Light => &LIGHT_PALETTE,
            ThemeMode::Dark => &DARK_PALETTE,
        };
        let colors = base
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        Self { mode, colors }
    }

    /// Built-in palette for `mode` with the config overrides applied
    pub fn from_config(config: &ThemeConfig, mode: ThemeMode) -> Result<Self> {
        let parser = ColorParser::new();
        let overrides = match mode {
            ThemeMode::Light => &config.light,
            ThemeMode::Dark => &config.dark,
        };

        let mut theme = Self::builtin(mode);
        for (name, value) in overrides.entries() {
            if let Some(value) = value {
                let color = parser
                    .parse(value)
                    .map_err(|e| eyre!("Invalid color value for '{}': {}", name, e))?;
                theme.colors.insert(name.to_string(), color);
            }
        }
        Ok(theme)
    }

    /// Get a color by name, `inherit` if not found
    pub fn get(&self, name: &str) -> &str {
        self.colors.get(name).map(String::as_str).unwrap_or("inherit")
    }

    pub fn is_dark(&self) -> bool {
        self.mode == ThemeMode::Dark
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::builtin(ThemeMode::default())
    }
}

// Default configuration template
const DEFAULT_CONFIG_TEMPLATE: &str = include_str!("../config/default.toml");
