//! The configuration snapshot consumed by the bookmark engine.

use crate::defaults;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Log level configuration for the debug log file.
///
/// The `--log-level` CLI flag and `RUST_LOG` take precedence over this value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// No logging (log file not created)
    Off,
    /// Errors only
    Error,
    /// Warnings and errors
    #[default]
    Warn,
    /// Informational messages
    Info,
    /// Debug messages
    Debug,
    /// Most verbose
    Trace,
}

impl LogLevel {
    /// Parse a level name as accepted on the command line.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "off" => Some(LogLevel::Off),
            "error" => Some(LogLevel::Error),
            "warn" | "warning" => Some(LogLevel::Warn),
            "info" => Some(LogLevel::Info),
            "debug" => Some(LogLevel::Debug),
            "trace" => Some(LogLevel::Trace),
            _ => None,
        }
    }

    /// Convert to `log::LevelFilter`
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Off => log::LevelFilter::Off,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Returns true for `#rrggbb` strings.
pub fn is_hex_color(value: &str) -> bool {
    value.len() == 7
        && value.starts_with('#')
        && value[1..].chars().all(|c| c.is_ascii_hexdigit())
}

/// Configuration snapshot for the bookmark engine.
///
/// Read once at session start and again whenever the host reports a
/// configuration change.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookmarksConfig {
    /// Group name → `#rrggbb` color. Overrides win over persisted colors and
    /// unknown names create new groups.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub group_color_overrides: BTreeMap<String, String>,

    /// Palette for synthesized groups; the first entry colors "Default".
    #[serde(default = "crate::defaults::default_colors")]
    pub default_colors: Vec<String>,

    /// Decoration opacity in `[0.0, 1.0]`.
    #[serde(default = "crate::defaults::opacity")]
    pub opacity: f32,

    #[serde(default)]
    pub log_level: LogLevel,
}

impl Default for BookmarksConfig {
    fn default() -> Self {
        Self {
            group_color_overrides: BTreeMap::new(),
            default_colors: defaults::default_colors(),
            opacity: defaults::opacity(),
            log_level: LogLevel::default(),
        }
    }
}

impl BookmarksConfig {
    /// Parse a YAML document, then sanitize it.
    ///
    /// Fails on malformed YAML or on values that cannot be repaired
    /// (a non-finite opacity).
    pub fn from_yaml_str(contents: &str) -> Result<Self, ConfigError> {
        let mut config: BookmarksConfig = if contents.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml_ng::from_str(contents)?
        };
        if !config.opacity.is_finite() {
            return Err(ConfigError::Validation(format!(
                "opacity must be a number between 0 and 1, got {}",
                config.opacity
            )));
        }
        for warning in config.sanitize() {
            log::warn!("{warning}");
        }
        Ok(config)
    }

    /// Repair out-of-range values in place.
    ///
    /// Returns a list of warnings describing what was changed. Invalid
    /// colors are dropped, opacity is clamped, and an empty palette is
    /// replaced by the built-in one.
    pub fn sanitize(&mut self) -> Vec<String> {
        let mut warnings = Vec::new();

        if !(0.0..=1.0).contains(&self.opacity) {
            let clamped = self.opacity.clamp(0.0, 1.0);
            warnings.push(format!(
                "opacity {} out of range, clamped to {}",
                self.opacity, clamped
            ));
            self.opacity = clamped;
        }

        self.group_color_overrides.retain(|name, color| {
            if name.trim().is_empty() {
                warnings.push("ignoring color override with an empty group name".to_string());
                return false;
            }
            if !is_hex_color(color) {
                warnings.push(format!(
                    "ignoring invalid color '{color}' for group '{name}'"
                ));
                return false;
            }
            true
        });

        let before = self.default_colors.len();
        self.default_colors.retain(|c| is_hex_color(c));
        if self.default_colors.len() != before {
            warnings.push(format!(
                "dropped {} invalid entries from default_colors",
                before - self.default_colors.len()
            ));
        }
        if self.default_colors.is_empty() {
            warnings.push("default_colors is empty, using built-in palette".to_string());
            self.default_colors = defaults::default_colors();
        }

        warnings
    }

    /// Color given to a synthesized "Default" group.
    pub fn first_default_color(&self) -> String {
        self.default_colors
            .first()
            .cloned()
            .unwrap_or_else(|| defaults::default_colors().remove(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BookmarksConfig::default();
        assert!(config.group_color_overrides.is_empty());
        assert_eq!(config.default_colors.len(), 5);
        assert_eq!(config.first_default_color(), "#f4d35e");
        assert!((config.opacity - 0.35).abs() < f32::EPSILON);
        assert_eq!(config.log_level, LogLevel::Warn);
    }

    #[test]
    fn test_deserialize_minimal_yaml() {
        let config = BookmarksConfig::from_yaml_str("opacity: 0.5\n").expect("parse");
        assert!((config.opacity - 0.5).abs() < f32::EPSILON);
        assert_eq!(config.default_colors, defaults::default_colors());
    }

    #[test]
    fn test_empty_document_is_default() {
        let config = BookmarksConfig::from_yaml_str("   \n").expect("parse");
        assert_eq!(config, BookmarksConfig::default());
    }

    #[test]
    fn test_overrides_parse_in_key_order() {
        let yaml = "group_color_overrides:\n  Tests: \"#00ff00\"\n  Api: \"#0000ff\"\n";
        let config = BookmarksConfig::from_yaml_str(yaml).expect("parse");
        let names: Vec<&String> = config.group_color_overrides.keys().collect();
        assert_eq!(names, vec!["Api", "Tests"]);
    }

    #[test]
    fn test_sanitize_clamps_and_drops() {
        let mut config = BookmarksConfig {
            opacity: 1.7,
            default_colors: vec!["red".to_string(), "#112233".to_string()],
            ..Default::default()
        };
        config
            .group_color_overrides
            .insert("Bad".to_string(), "#12".to_string());
        config
            .group_color_overrides
            .insert("Good".to_string(), "#abcdef".to_string());

        let warnings = config.sanitize();

        assert_eq!(warnings.len(), 3);
        assert!((config.opacity - 1.0).abs() < f32::EPSILON);
        assert_eq!(config.default_colors, vec!["#112233".to_string()]);
        assert!(config.group_color_overrides.contains_key("Good"));
        assert!(!config.group_color_overrides.contains_key("Bad"));
    }

    #[test]
    fn test_empty_palette_restored() {
        let mut config = BookmarksConfig {
            default_colors: Vec::new(),
            ..Default::default()
        };
        config.sanitize();
        assert_eq!(config.default_colors, defaults::default_colors());
    }

    #[test]
    fn test_nan_opacity_rejected() {
        let err = BookmarksConfig::from_yaml_str("opacity: .nan\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_malformed_yaml_is_parse_error() {
        let err = BookmarksConfig::from_yaml_str("opacity: [").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_is_hex_color() {
        assert!(is_hex_color("#A0b1C2"));
        assert!(!is_hex_color("A0b1C2"));
        assert!(!is_hex_color("#a0b1c"));
        assert!(!is_hex_color("#a0b1cz"));
    }

    #[test]
    fn test_log_level_names() {
        assert_eq!(LogLevel::from_name("INFO"), Some(LogLevel::Info));
        assert_eq!(LogLevel::from_name("warning"), Some(LogLevel::Warn));
        assert_eq!(LogLevel::from_name("loud"), None);
        assert_eq!(
            LogLevel::Debug.to_level_filter(),
            log::LevelFilter::Debug
        );
    }
}
