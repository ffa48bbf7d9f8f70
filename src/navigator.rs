//! Next/previous bookmark navigation within one group.
//!
//! Bookmarks are ordered by file path (byte order) and then by line. The cursor
//! does not have to sit on a bookmark: the search looks for the insertion
//! point of the cursor in that order, so a cursor between two bookmarks moves
//! to the neighbour in the requested direction. Both directions wrap.

use crate::bookmark::{Bookmark, Position};
use crate::bookmark_store::BookmarkStore;

/// Direction of a navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Prev,
}

/// A sorted view of one group's bookmarks.
pub struct Navigator<'a> {
    sorted: Vec<&'a Bookmark>,
}

impl<'a> Navigator<'a> {
    pub fn new(bookmarks: &'a BookmarkStore, group: &str) -> Self {
        let mut sorted = bookmarks.list_by_group(group);
        sorted.sort_by(|a, b| a.location.cmp(&b.location));
        Self { sorted }
    }

    pub fn is_empty(&self) -> bool {
        self.sorted.is_empty()
    }

    /// First bookmark strictly after `cursor`, wrapping to the first.
    pub fn next(&self, cursor: &Position) -> Option<&'a Bookmark> {
        let after = self.sorted.partition_point(|b| b.location <= *cursor);
        self.sorted
            .get(after)
            .or_else(|| self.sorted.first())
            .copied()
    }

    /// Last bookmark strictly before `cursor`, wrapping to the last.
    pub fn prev(&self, cursor: &Position) -> Option<&'a Bookmark> {
        let before = self.sorted.partition_point(|b| b.location < *cursor);
        before
            .checked_sub(1)
            .and_then(|i| self.sorted.get(i))
            .or_else(|| self.sorted.last())
            .copied()
    }

    pub fn step(&self, cursor: &Position, direction: Direction) -> Option<&'a Bookmark> {
        match direction {
            Direction::Next => self.next(cursor),
            Direction::Prev => self.prev(cursor),
        }
    }
}
