//! Loading and saving `config.yaml`.

use linemark_config::{BookmarksConfig, LogLevel};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_partial_file_fills_defaults() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("config.yaml");
    fs::write(
        &path,
        "group_color_overrides:\n  Review: \"#ff0000\"\nlog_level: debug\n",
    )
    .expect("write");

    let config = BookmarksConfig::load_from(&path).expect("load");
    assert_eq!(
        config.group_color_overrides.get("Review").map(String::as_str),
        Some("#ff0000")
    );
    assert_eq!(config.log_level, LogLevel::Debug);
    assert_eq!(config.default_colors, BookmarksConfig::default().default_colors);
    assert_eq!(config.opacity, BookmarksConfig::default().opacity);
}

#[test]
fn test_invalid_values_are_repaired() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("config.yaml");
    fs::write(
        &path,
        "group_color_overrides:\n  Bad: red\n  Good: \"#00ff00\"\ndefault_colors: [nope]\nopacity: 3.0\n",
    )
    .expect("write");

    let config = BookmarksConfig::load_from(&path).expect("load");
    assert_eq!(config.group_color_overrides.len(), 1);
    assert!(config.group_color_overrides.contains_key("Good"));
    assert_eq!(config.opacity, 1.0);
    assert_eq!(config.first_default_color(), "#f4d35e");
}

#[test]
fn test_malformed_yaml_is_error() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("config.yaml");
    fs::write(&path, "opacity: [").expect("write");
    assert!(BookmarksConfig::load_from(&path).is_err());
}

#[test]
fn test_save_then_load() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("nested").join("config.yaml");

    let mut config = BookmarksConfig::default();
    config
        .group_color_overrides
        .insert("Todo".to_string(), "#123456".to_string());
    config.opacity = 0.5;
    config.save_to(&path).expect("save");

    assert!(!path.with_extension("yaml.tmp").exists());
    assert_eq!(BookmarksConfig::load_from(&path).expect("load"), config);
}
