//! Configuration system for linemark.
//!
//! This crate provides the configuration snapshot consumed by the bookmark
//! engine, along with loading, saving, and default values. It includes:
//!
//! - Group color overrides and the default color palette
//! - Decoration opacity
//! - Debug log level
//! - Configuration file watching

pub mod config;
pub mod defaults;
mod error;
pub mod persistence;
#[cfg(feature = "watcher")]
pub mod watcher;

pub use config::{BookmarksConfig, LogLevel, is_hex_color};
pub use defaults::DEFAULT_GROUP_NAME;
pub use error::ConfigError;
#[cfg(feature = "watcher")]
pub use watcher::{ConfigChanged, ConfigWatcher};
