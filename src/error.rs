//! Typed error types for linemark.
//!
//! Every store operation reports failure through [`BookmarkError`]; nothing in
//! the core panics on bad input. An `Err` from a session command means
//! in-memory state is unchanged. That includes [`BookmarkError::Storage`]: the
//! session rolls back memory and any slot it already rewrote, so the command
//! can simply be retried.

use thiserror::Error;

/// Failures of the persistence layer.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backing file could not be read or written.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored value could not be converted to or from its typed form.
    #[error("stored value has an unexpected shape: {0}")]
    Value(#[from] serde_json::Error),

    /// The backing YAML file is malformed.
    #[error("storage file is not valid YAML: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

/// Coarse classification used by the presentation layer to pick a
/// notification style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    AlreadyExists,
    EmptyState,
    NeedsConfirmation,
    Invalid,
    Storage,
}

/// Top-level error type for bookmark and group operations.
#[derive(Debug, Error)]
pub enum BookmarkError {
    #[error("group '{0}' does not exist")]
    GroupNotFound(String),

    #[error("no bookmark at {file}:{line} in group '{group}'")]
    BookmarkNotFound {
        file: String,
        line: u32,
        group: String,
    },

    #[error("group '{0}' already exists")]
    GroupAlreadyExists(String),

    /// Moving a bookmark would create a second record with the same
    /// (file, line, group) key.
    #[error("group '{group}' already has a bookmark at {file}:{line}")]
    DuplicateBookmark {
        file: String,
        line: u32,
        group: String,
    },

    #[error("group name must not be empty")]
    InvalidGroupName,

    #[error("invalid color '{0}', expected #rrggbb")]
    InvalidColor(String),

    /// The operation has nothing to act on.
    #[error("{0}")]
    EmptyState(String),

    /// Destructive bulk operations must be confirmed by the user first.
    #[error("clearing {count} bookmark(s) from group '{group}' requires confirmation")]
    ConfirmationRequired { group: String, count: usize },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl BookmarkError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BookmarkError::GroupNotFound(_) | BookmarkError::BookmarkNotFound { .. } => {
                ErrorKind::NotFound
            }
            BookmarkError::GroupAlreadyExists(_) | BookmarkError::DuplicateBookmark { .. } => {
                ErrorKind::AlreadyExists
            }
            BookmarkError::EmptyState(_) => ErrorKind::EmptyState,
            BookmarkError::ConfirmationRequired { .. } => ErrorKind::NeedsConfirmation,
            BookmarkError::InvalidGroupName | BookmarkError::InvalidColor(_) => {
                ErrorKind::Invalid
            }
            BookmarkError::Storage(_) => ErrorKind::Storage,
        }
    }
}

pub type Result<T> = std::result::Result<T, BookmarkError>;
