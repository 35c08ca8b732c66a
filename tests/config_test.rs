use csvview::config::{AppConfig, ConfigManager, Theme};
use csvview::{DiffAlgorithm, TextEncoding, ThemeMode, ViewMode};
use std::fs;
use tempfile::TempDir;

// Helper to create a temporary config directory for testing
fn setup_test_config_dir() -> (TempDir, ConfigManager) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_manager = ConfigManager::with_dir(temp_dir.path().to_path_buf());
    (temp_dir, config_manager)
}

#[test]
fn test_default_config() {
    let config = AppConfig::default();

    assert_eq!(config.version, "0.1");
    assert_eq!(config.encoding().unwrap(), TextEncoding::Latin1);
    assert_eq!(config.file_loading.delimiter, None);
    assert_eq!(config.file_loading.has_header, None);
    assert_eq!(config.display.rows_per_page, 10);
    assert_eq!(config.view_mode().unwrap(), ViewMode::Table);
    assert_eq!(config.theme_mode().unwrap(), ThemeMode::Dark);
    assert_eq!(config.diff_algorithm().unwrap(), DiffAlgorithm::Matcher);
    assert!(!config.debug.enabled);
    assert!(config.validate().is_ok());
}

#[test]
fn test_default_template_parses_to_defaults() {
    let (_temp_dir, config_manager) = setup_test_config_dir();
    let template = config_manager.generate_default_config();

    for section in [
        "[file_loading]",
        "[display]",
        "[theme]",
        "[theme.light]",
        "[theme.dark]",
        "[diff]",
        "[debug]",
    ] {
        assert!(template.contains(section), "missing {}", section);
    }
    assert!(template.contains("version = \"0.1\""));

    let parsed: AppConfig = toml::from_str(&template).expect("template should parse");
    assert!(parsed.validate().is_ok());
    assert_eq!(parsed.display.rows_per_page, 10);
    assert_eq!(parsed.theme.mode, "dark");
}

#[test]
fn test_write_default_config() {
    let (_temp_dir, config_manager) = setup_test_config_dir();

    let config_path = config_manager
        .write_default_config(false)
        .expect("Failed to write config");
    assert!(config_path.exists());

    let content = fs::read_to_string(&config_path).expect("Failed to read config");
    assert!(content.contains("[display]"));

    // Second write without force fails, with force succeeds
    assert!(config_manager.write_default_config(false).is_err());
    assert!(config_manager.write_default_config(true).is_ok());
}

#[test]
fn test_load_missing_config_gives_defaults() {
    let (_temp_dir, config_manager) = setup_test_config_dir();
    let config = config_manager.load_config().unwrap();
    assert_eq!(config.display.rows_per_page, 10);
}

#[test]
fn test_partial_config_merges_over_defaults() {
    let (_temp_dir, config_manager) = setup_test_config_dir();
    config_manager.ensure_config_dir().unwrap();
    fs::write(
        config_manager.config_path("config.toml"),
        r##"
[display]
rows_per_page = 25

[theme]
mode = "light"

[theme.light]
accent = "#ff0000"
"##,
    )
    .unwrap();

    let user = config_manager.load_config().unwrap();
    let mut config = AppConfig::default();
    config.merge(user);

    assert!(config.validate().is_ok());
    assert_eq!(config.display.rows_per_page, 25);
    assert_eq!(config.view_mode().unwrap(), ViewMode::Table);
    assert_eq!(config.theme_mode().unwrap(), ThemeMode::Light);
    assert_eq!(config.theme.light.accent.as_deref(), Some("#ff0000"));
    assert_eq!(config.theme.dark.accent, None);
}

#[test]
fn test_invalid_config_toml_is_error() {
    let (_temp_dir, config_manager) = setup_test_config_dir();
    config_manager.ensure_config_dir().unwrap();
    fs::write(
        config_manager.config_path("config.toml"),
        "[display\nrows_per_page = ",
    )
    .unwrap();
    assert!(config_manager.load_config().is_err());
}

#[test]
fn test_validate_rejects_bad_values() {
    let mut config = AppConfig::default();
    config.display.rows_per_page = 12;
    assert!(config.validate().is_err());

    let mut config = AppConfig::default();
    config.version = "2.0".to_string();
    assert!(config.validate().is_err());

    let mut config = AppConfig::default();
    config.file_loading.encoding = "ebcdic".to_string();
    assert!(config.validate().is_err());

    let mut config = AppConfig::default();
    config.theme.mode = "sepia".to_string();
    assert!(config.validate().is_err());

    let mut config = AppConfig::default();
    config.diff.algorithm = "histogram".to_string();
    assert!(config.validate().is_err());

    let mut config = AppConfig::default();
    config.theme.dark.text = Some("not-a-color".to_string());
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("text"));
}

#[test]
fn test_theme_from_config_applies_overrides() {
    let mut config = AppConfig::default();
    config.theme.dark.background = Some("rgb(1, 2, 3)".to_string());

    let dark = Theme::from_config(&config.theme, ThemeMode::Dark).unwrap();
    assert_eq!(dark.get("background"), "#010203");
    assert_eq!(dark.get("text"), "#ffffff");

    let light = Theme::from_config(&config.theme, ThemeMode::Light).unwrap();
    assert_eq!(light.get("background"), "#ffffff");
    assert_eq!(light.get("no-such-color"), "inherit");
}
