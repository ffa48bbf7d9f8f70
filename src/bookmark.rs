//! Bookmark records and cursor positions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A zero-based line in a file.
///
/// Field order matters: the derived `Ord` sorts by file, then by line, which
/// is the navigation order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub file: String,
    pub line: u32,
}

impl Position {
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Editors show one-based line numbers
        write!(f, "{}:{}", self.file, self.line + 1)
    }
}

/// A marked line with the text it had when it was marked.
///
/// Persisted flat as `{ file, line, content, group }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    #[serde(flatten)]
    pub location: Position,

    /// Snapshot of the line text at creation time
    #[serde(default)]
    pub content: String,

    /// Name of the owning group
    pub group: String,
}

impl Bookmark {
    pub fn new(
        file: impl Into<String>,
        line: u32,
        content: impl Into<String>,
        group: impl Into<String>,
    ) -> Self {
        Self {
            location: Position::new(file, line),
            content: content.into(),
            group: group.into(),
        }
    }

    pub fn file(&self) -> &str {
        &self.location.file
    }

    pub fn line(&self) -> u32 {
        self.location.line
    }

    /// True if this record has the (file, line, group) key.
    pub fn matches(&self, file: &str, line: u32, group: &str) -> bool {
        self.location.line == line && self.location.file == file && self.group == group
    }
}
