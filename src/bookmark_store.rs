//! The ordered collection of bookmark records.
//!
//! Records are unique by (file, line, group). Read views keep insertion
//! order; consumers that need another order sort for themselves.

use crate::bookmark::Bookmark;
use crate::error::{BookmarkError, Result};
use std::collections::HashSet;

/// Result of [`BookmarkStore::toggle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Added,
    Removed,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookmarkStore {
    bookmarks: Vec<Bookmark>,
}

impl BookmarkStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from persisted records, dropping later duplicates of a
    /// (file, line, group) key.
    pub fn from_records(records: Vec<Bookmark>) -> Self {
        let mut store = Self::new();
        let mut dropped = 0usize;
        for record in records {
            if store.position_of(record.file(), record.line(), &record.group).is_some() {
                dropped += 1;
                continue;
            }
            store.bookmarks.push(record);
        }
        if dropped > 0 {
            log::warn!("Dropped {dropped} duplicate bookmark record(s) while loading");
        }
        store
    }

    fn position_of(&self, file: &str, line: u32, group: &str) -> Option<usize> {
        self.bookmarks
            .iter()
            .position(|b| b.matches(file, line, group))
    }

    pub fn get(&self, file: &str, line: u32, group: &str) -> Option<&Bookmark> {
        self.position_of(file, line, group)
            .map(|idx| &self.bookmarks[idx])
    }

    pub fn contains(&self, file: &str, line: u32, group: &str) -> bool {
        self.position_of(file, line, group).is_some()
    }

    /// Add the bookmark if the key is free, otherwise remove the existing one.
    pub fn toggle(&mut self, file: &str, line: u32, content: &str, group: &str) -> ToggleOutcome {
        match self.position_of(file, line, group) {
            Some(idx) => {
                self.bookmarks.remove(idx);
                log::debug!("Removed bookmark {file}:{line} from '{group}'");
                ToggleOutcome::Removed
            }
            None => {
                self.bookmarks
                    .push(Bookmark::new(file, line, content, group));
                log::debug!("Added bookmark {file}:{line} to '{group}'");
                ToggleOutcome::Added
            }
        }
    }

    /// Remove the record with this key. Returns whether one existed.
    pub fn remove(&mut self, file: &str, line: u32, group: &str) -> bool {
        match self.position_of(file, line, group) {
            Some(idx) => {
                self.bookmarks.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Move a bookmark to another group, keeping its place in the order.
    ///
    /// Moving within the same group is a successful no-op. Fails without
    /// changing anything if the bookmark does not exist or the target group
    /// already marks the same line.
    pub fn move_to_group(&mut self, file: &str, line: u32, from: &str, to: &str) -> Result<()> {
        let idx = self
            .position_of(file, line, from)
            .ok_or_else(|| BookmarkError::BookmarkNotFound {
                file: file.to_string(),
                line,
                group: from.to_string(),
            })?;
        if from == to {
            return Ok(());
        }
        if self.contains(file, line, to) {
            return Err(BookmarkError::DuplicateBookmark {
                file: file.to_string(),
                line,
                group: to.to_string(),
            });
        }
        self.bookmarks[idx].group = to.to_string();
        Ok(())
    }

    /// Remove every bookmark owned by `group`. Returns how many were removed.
    pub fn clear_group(&mut self, group: &str) -> usize {
        let before = self.bookmarks.len();
        self.bookmarks.retain(|b| b.group != group);
        before - self.bookmarks.len()
    }

    /// Point every bookmark of group `old` at group `new`.
    ///
    /// Callers guarantee `new` holds no bookmarks (group names are unique),
    /// so no key can collide.
    pub fn rename_group_refs(&mut self, old: &str, new: &str) -> usize {
        let mut renamed = 0;
        for bookmark in self.bookmarks.iter_mut().filter(|b| b.group == old) {
            bookmark.group = new.to_string();
            renamed += 1;
        }
        renamed
    }

    /// Bookmarks of `group` in insertion order.
    pub fn list_by_group(&self, group: &str) -> Vec<&Bookmark> {
        self.bookmarks.iter().filter(|b| b.group == group).collect()
    }

    /// Bookmarks in `file`, across all groups, in insertion order.
    pub fn list_by_file(&self, file: &str) -> Vec<&Bookmark> {
        self.bookmarks.iter().filter(|b| b.file() == file).collect()
    }

    /// Distinct files marked in `group`, in first-seen order.
    pub fn files_in_group(&self, group: &str) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.bookmarks
            .iter()
            .filter(|b| b.group == group)
            .map(Bookmark::file)
            .filter(|file| seen.insert(*file))
            .collect()
    }

    /// Shift bookmarks below an edit by the edit's line-count change.
    ///
    /// Every bookmark in `file` whose line is strictly greater than
    /// `edit_start_line` moves by `delta`, clamped at line 0. A zero delta
    /// is skipped. A shifted bookmark that lands on a line its group already
    /// marks is folded into the existing record. Returns how many records
    /// changed (moved or folded).
    pub fn apply_edit_delta(&mut self, file: &str, edit_start_line: u32, delta: i64) -> usize {
        if delta == 0 {
            return 0;
        }

        let mut occupied: HashSet<(u32, String)> = self
            .bookmarks
            .iter()
            .filter(|b| b.file() == file && b.line() <= edit_start_line)
            .map(|b| (b.line(), b.group.clone()))
            .collect();

        let mut changed = 0;
        let mut folded = 0;
        let records = std::mem::take(&mut self.bookmarks);
        for mut bookmark in records {
            if bookmark.file() == file && bookmark.line() > edit_start_line {
                let shifted =
                    (i64::from(bookmark.line()) + delta).clamp(0, i64::from(u32::MAX)) as u32;
                if !occupied.insert((shifted, bookmark.group.clone())) {
                    folded += 1;
                    changed += 1;
                    continue;
                }
                if shifted != bookmark.line() {
                    bookmark.location.line = shifted;
                    changed += 1;
                }
            }
            self.bookmarks.push(bookmark);
        }
        if folded > 0 {
            log::debug!("Folded {folded} bookmark(s) onto existing marks in {file}");
        }
        changed
    }

    /// Retarget bookmarks after the host renamed a file.
    ///
    /// A moved record whose key already exists under the new name is dropped.
    pub fn rename_file(&mut self, old: &str, new: &str) -> usize {
        if old == new {
            return 0;
        }
        let existing: HashSet<(u32, String)> = self
            .bookmarks
            .iter()
            .filter(|b| b.file() == new)
            .map(|b| (b.line(), b.group.clone()))
            .collect();

        let before = self.bookmarks.len();
        self.bookmarks
            .retain(|b| !(b.file() == old && existing.contains(&(b.line(), b.group.clone()))));
        let dropped = before - self.bookmarks.len();
        if dropped > 0 {
            log::warn!("Dropped {dropped} bookmark(s) colliding with existing marks in {new}");
        }

        let mut renamed = 0;
        for bookmark in self.bookmarks.iter_mut().filter(|b| b.location.file == old) {
            bookmark.location.file = new.to_string();
            renamed += 1;
        }
        renamed
    }

    /// Drop every bookmark in a deleted file.
    pub fn remove_file(&mut self, file: &str) -> usize {
        let before = self.bookmarks.len();
        self.bookmarks.retain(|b| b.file() != file);
        before - self.bookmarks.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Bookmark> {
        self.bookmarks.iter()
    }

    /// All records in insertion order (for persistence).
    pub fn records(&self) -> &[Bookmark] {
        &self.bookmarks
    }

    pub fn len(&self) -> usize {
        self.bookmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bookmarks.is_empty()
    }
}
