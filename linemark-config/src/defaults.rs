//! Default value functions for configuration.
//!
//! Used as `#[serde(default = "crate::defaults::...")]` attributes on
//! [`BookmarksConfig`](crate::BookmarksConfig) fields.

/// Name of the group synthesized whenever no group exists.
pub const DEFAULT_GROUP_NAME: &str = "Default";

/// Palette used when a group has to be synthesized. Only the first entry is
/// consumed by the engine today; the rest are kept so users can reorder.
pub fn default_colors() -> Vec<String> {
    vec![
        "#f4d35e".to_string(), // Warm yellow
        "#8ecae6".to_string(), // Sky blue
        "#b5e48c".to_string(), // Light green
        "#ffadad".to_string(), // Salmon
        "#cdb4db".to_string(), // Lavender
    ]
}

/// Opacity applied to group colors for line decorations.
pub fn opacity() -> f32 {
    0.35
}

/// Debounce window for config file change notifications.
pub fn watch_debounce_ms() -> u64 {
    250
}
