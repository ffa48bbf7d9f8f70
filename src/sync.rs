//! Translates document change events into bookmark line shifts.
//!
//! A change replaces the inclusive line range `start_line..=end_line_inclusive`
//! with `text`. The number of lines it adds or removes is applied to every
//! bookmark of the file below `start_line`. Changes of one event are applied
//! one after another in the order they were reported.

use crate::bookmark_store::BookmarkStore;
use serde::{Deserialize, Serialize};

/// One replaced line range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangedRange {
    pub start_line: u32,
    pub end_line_inclusive: u32,
    /// Replacement text, lines separated by `\n`
    pub text: String,
}

impl ChangedRange {
    pub fn new(start_line: u32, end_line_inclusive: u32, text: impl Into<String>) -> Self {
        Self {
            start_line,
            end_line_inclusive,
            text: text.into(),
        }
    }

    /// Lines added (positive) or removed (negative) by this change.
    ///
    /// A reversed range is treated as touching the single line `start_line`.
    pub fn line_delta(&self) -> i64 {
        let inserted = self.text.split('\n').count() as i64;
        let replaced =
            i64::from(self.end_line_inclusive.saturating_sub(self.start_line)) + 1;
        inserted - replaced
    }
}

/// A batch of changes to one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentChange {
    pub file: String,
    pub changes: Vec<ChangedRange>,
}

impl DocumentChange {
    pub fn new(file: impl Into<String>, changes: Vec<ChangedRange>) -> Self {
        Self {
            file: file.into(),
            changes,
        }
    }
}

/// Summary of one [`SyncEngine::apply`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Changes with a non-zero line delta
    pub changes_applied: usize,
    /// Changes that kept the line count
    pub changes_skipped: usize,
    /// Bookmark line updates across all changes
    pub bookmarks_moved: usize,
}

impl SyncReport {
    pub fn moved_any(&self) -> bool {
        self.bookmarks_moved > 0
    }
}

/// Stateless adapter from change events to [`BookmarkStore::apply_edit_delta`].
pub struct SyncEngine<'a> {
    bookmarks: &'a mut BookmarkStore,
}

impl<'a> SyncEngine<'a> {
    pub fn new(bookmarks: &'a mut BookmarkStore) -> Self {
        Self { bookmarks }
    }

    pub fn apply(&mut self, event: &DocumentChange) -> SyncReport {
        let mut report = SyncReport::default();
        for change in &event.changes {
            let delta = change.line_delta();
            if delta == 0 {
                report.changes_skipped += 1;
                continue;
            }
            report.changes_applied += 1;
            report.bookmarks_moved +=
                self.bookmarks
                    .apply_edit_delta(&event.file, change.start_line, delta);
        }
        if report.moved_any() {
            log::debug!(
                "{}: {} change(s) moved {} bookmark(s)",
                event.file,
                report.changes_applied,
                report.bookmarks_moved
            );
        }
        report
    }
}
