//! The bookmark session: owner of all state and home of the command surface.
//!
//! A host creates one [`Session`] with [`Session::init`], routes every user
//! command and document event through it, and ends it with
//! [`Session::teardown`]. Each command validates, mutates memory and writes
//! the affected slots back to the [`KeyValueStore`] before it returns. A
//! command that fails leaves memory and the store as they were.

use crate::bookmark::{Bookmark, Position};
use crate::bookmark_store::{BookmarkStore, ToggleOutcome};
use crate::color::ColorAssigner;
use crate::error::{BookmarkError, Result, StorageError};
use crate::group_store::{Group, GroupStore};
use crate::navigator::{Direction, Navigator};
use crate::storage::{KeyValueStore, KeyValueStoreExt, keys};
use crate::sync::{DocumentChange, SyncEngine, SyncReport};
use crate::tree::{TreeItem, build_tree};
use linemark_config::BookmarksConfig;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// A session shared between threads of a multi-threaded host.
pub type SharedSession = Arc<Mutex<Session>>;

/// Persisted slots touched by a mutation.
#[derive(Debug, Clone, Copy, Default)]
struct Dirty {
    bookmarks: bool,
    groups: bool,
    active: bool,
}

impl Dirty {
    const BOOKMARKS: Dirty = Dirty {
        bookmarks: true,
        groups: false,
        active: false,
    };
    const GROUPS: Dirty = Dirty {
        bookmarks: false,
        groups: true,
        active: false,
    };
    const ALL: Dirty = Dirty {
        bookmarks: true,
        groups: true,
        active: true,
    };
}

/// In-memory state restored when a command fails.
struct Snapshot {
    groups: GroupStore,
    bookmarks: BookmarkStore,
}

/// Write the dirty slots of `groups` and `bookmarks`, recording each slot in
/// `written` once it is stored.
///
/// Groups and the active pointer go first so a store that stops halfway can
/// still resolve every saved bookmark's group.
fn write_slots(
    store: &mut (dyn KeyValueStore + Send),
    dirty: Dirty,
    groups: &GroupStore,
    bookmarks: &BookmarkStore,
    written: &mut Dirty,
) -> std::result::Result<(), StorageError> {
    if dirty.groups {
        store.set(keys::GROUPS, &groups.list_groups())?;
        written.groups = true;
    }
    if dirty.active {
        store.set(keys::ACTIVE_GROUP, groups.active_group())?;
        written.active = true;
    }
    if dirty.bookmarks {
        store.set(keys::BOOKMARKS, bookmarks.records())?;
        written.bookmarks = true;
    }
    Ok(())
}

/// Line highlight for one bookmark in a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoration {
    pub line: u32,
    pub group: String,
    /// `#rrggbbaa`
    pub color: String,
}

pub struct Session {
    config: BookmarksConfig,
    colors: ColorAssigner,
    groups: GroupStore,
    bookmarks: BookmarkStore,
    store: Box<dyn KeyValueStore + Send>,
}

/// Read a slot, falling back to `default` if it is unreadable.
fn read_slot<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str, default: T) -> T {
    match store.get_raw(key) {
        Ok(None) => default,
        Ok(Some(value)) => match serde_json::from_value(value) {
            Ok(typed) => typed,
            Err(e) => {
                log::warn!("Ignoring malformed '{key}' slot: {e}");
                default
            }
        },
        Err(e) => {
            log::warn!("Could not read '{key}' slot: {e}");
            default
        }
    }
}

impl Session {
    /// Load state from `store` and apply `config`.
    ///
    /// Malformed slots are logged and replaced by empty state. Groups
    /// referenced by bookmarks but missing from the group list are recreated
    /// with fresh colors.
    pub fn init(store: Box<dyn KeyValueStore + Send>, config: BookmarksConfig) -> Result<Self> {
        Self::init_with_colors(store, config, ColorAssigner::new())
    }

    /// Like [`Session::init`] with a caller-provided color source.
    pub fn init_with_colors(
        store: Box<dyn KeyValueStore + Send>,
        config: BookmarksConfig,
        mut colors: ColorAssigner,
    ) -> Result<Self> {
        let persisted_groups: Vec<Group> = read_slot(&*store, keys::GROUPS, Vec::new());
        let persisted_active: Option<String> = read_slot(&*store, keys::ACTIVE_GROUP, None);
        let mut records: Vec<Bookmark> = read_slot(&*store, keys::BOOKMARKS, Vec::new());
        let loaded = records.len();
        records.retain(|b| !b.group.trim().is_empty());
        if records.len() != loaded {
            log::warn!(
                "Dropped {} bookmark(s) without a group",
                loaded - records.len()
            );
        }

        let mut groups = GroupStore::restore(
            persisted_groups.clone(),
            persisted_active.clone(),
            &config.group_color_overrides,
            config.first_default_color(),
        );
        let bookmarks = BookmarkStore::from_records(records);

        for bookmark in bookmarks.iter() {
            if !groups.contains(&bookmark.group) {
                log::warn!(
                    "Bookmark {} refers to unknown group '{}', recreating it",
                    bookmark.location,
                    bookmark.group
                );
                groups.create_group(&bookmark.group, &mut colors)?;
            }
        }

        let mut session = Self {
            config,
            colors,
            groups,
            bookmarks,
            store,
        };

        let dirty = Dirty {
            bookmarks: session.bookmarks.len() != loaded,
            groups: session.groups.list_groups() != persisted_groups,
            active: persisted_active.as_deref() != Some(session.groups.active_group()),
        };
        write_slots(
            &mut *session.store,
            dirty,
            &session.groups,
            &session.bookmarks,
            &mut Dirty::default(),
        )?;
        log::info!(
            "Session ready: {} group(s), {} bookmark(s), active group '{}'",
            session.groups.len(),
            session.bookmarks.len(),
            session.groups.active_group()
        );
        Ok(session)
    }

    /// End the session and hand the store back to the host.
    pub fn teardown(self) -> Box<dyn KeyValueStore + Send> {
        log::debug!("Session torn down");
        self.store
    }

    pub fn into_shared(self) -> SharedSession {
        Arc::new(Mutex::new(self))
    }

    /// Run a mutation and persist the slots it reports dirty.
    ///
    /// Any error, from validation or from the store, restores the in-memory
    /// state and every slot already rewritten, so a failed command leaves no
    /// trace and is safe to retry.
    fn transact<T>(&mut self, op: impl FnOnce(&mut Self) -> Result<(T, Dirty)>) -> Result<T> {
        let snapshot = Snapshot {
            groups: self.groups.clone(),
            bookmarks: self.bookmarks.clone(),
        };
        let (value, dirty) = match op(self) {
            Ok(done) => done,
            Err(e) => {
                self.restore(snapshot);
                return Err(e);
            }
        };

        let mut written = Dirty::default();
        if let Err(e) = write_slots(
            &mut *self.store,
            dirty,
            &self.groups,
            &self.bookmarks,
            &mut written,
        ) {
            log::error!("Failed to persist bookmark state: {e}");
            if let Err(undo) = write_slots(
                &mut *self.store,
                written,
                &snapshot.groups,
                &snapshot.bookmarks,
                &mut Dirty::default(),
            ) {
                log::error!("Failed to restore persisted state: {undo}");
            }
            self.restore(snapshot);
            return Err(e.into());
        }
        Ok(value)
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.groups = snapshot.groups;
        self.bookmarks = snapshot.bookmarks;
    }

    /// Resolve an optional group argument to an existing group name.
    fn resolve_group(&self, group: Option<&str>) -> Result<String> {
        match group {
            Some(name) if self.groups.contains(name) => Ok(name.to_string()),
            Some(name) => Err(BookmarkError::GroupNotFound(name.to_string())),
            None => Ok(self.groups.active_group().to_string()),
        }
    }

    // ========== Queries ==========

    pub fn config(&self) -> &BookmarksConfig {
        &self.config
    }

    pub fn bookmarks(&self) -> &BookmarkStore {
        &self.bookmarks
    }

    pub fn groups(&self) -> &GroupStore {
        &self.groups
    }

    pub fn list_groups(&self) -> Vec<Group> {
        self.groups.list_groups()
    }

    pub fn active_group(&self) -> &str {
        self.groups.active_group()
    }

    pub fn tree(&self) -> Vec<TreeItem> {
        build_tree(&self.groups, &self.bookmarks)
    }

    /// Translucent highlight color of a group.
    pub fn decoration_color(&mut self, group: &str) -> Option<String> {
        let color = self.groups.color_of(group)?.to_string();
        Some(self.colors.with_alpha(&color, self.config.opacity))
    }

    /// Highlights for every bookmark in `file`, sorted by line.
    pub fn decorations(&mut self, file: &str) -> Vec<Decoration> {
        let marks: Vec<(u32, String)> = self
            .bookmarks
            .list_by_file(file)
            .into_iter()
            .map(|b| (b.line(), b.group.clone()))
            .collect();
        let mut decorations: Vec<Decoration> = marks
            .into_iter()
            .filter_map(|(line, group)| {
                let color = self.decoration_color(&group)?;
                Some(Decoration { line, group, color })
            })
            .collect();
        decorations.sort_by_key(|d| d.line);
        decorations
    }

    // ========== Bookmark commands ==========

    /// Add or remove a bookmark at `position` in `group` (the active group if
    /// `None`).
    pub fn toggle(
        &mut self,
        position: &Position,
        content: &str,
        group: Option<&str>,
    ) -> Result<ToggleOutcome> {
        self.transact(|session| {
            let groups_created = session.groups.ensure_default();
            let group = session.resolve_group(group)?;
            let outcome = session
                .bookmarks
                .toggle(&position.file, position.line, content, &group);
            let dirty = if groups_created {
                Dirty::ALL
            } else {
                Dirty::BOOKMARKS
            };
            Ok((outcome, dirty))
        })
    }

    pub fn remove(&mut self, position: &Position, group: Option<&str>) -> Result<Bookmark> {
        let group = self.resolve_group(group)?;
        let removed = self
            .bookmarks
            .get(&position.file, position.line, &group)
            .cloned()
            .ok_or_else(|| BookmarkError::BookmarkNotFound {
                file: position.file.clone(),
                line: position.line,
                group: group.clone(),
            })?;
        self.transact(|session| {
            session
                .bookmarks
                .remove(&position.file, position.line, &group);
            Ok((removed, Dirty::BOOKMARKS))
        })
    }

    /// Remove every bookmark of a group. Requires `confirmed`.
    pub fn clear_group(&mut self, group: Option<&str>, confirmed: bool) -> Result<usize> {
        let group = self.resolve_group(group)?;
        let count = self.bookmarks.list_by_group(&group).len();
        if count == 0 {
            return Err(BookmarkError::EmptyState(format!(
                "group '{group}' has no bookmarks"
            )));
        }
        if !confirmed {
            return Err(BookmarkError::ConfirmationRequired { group, count });
        }
        let removed = self.transact(|session| {
            Ok((session.bookmarks.clear_group(&group), Dirty::BOOKMARKS))
        })?;
        log::info!("Cleared {removed} bookmark(s) from '{group}'");
        Ok(removed)
    }

    pub fn move_bookmark(&mut self, position: &Position, from: &str, to: &str) -> Result<()> {
        if !self.groups.contains(to) {
            return Err(BookmarkError::GroupNotFound(to.to_string()));
        }
        self.transact(|session| {
            session
                .bookmarks
                .move_to_group(&position.file, position.line, from, to)?;
            let dirty = if from != to {
                Dirty::BOOKMARKS
            } else {
                Dirty::default()
            };
            Ok(((), dirty))
        })
    }

    // ========== Group commands ==========

    pub fn create_group(&mut self, name: &str) -> Result<Group> {
        self.transact(|session| {
            let group = session.groups.create_group(name, &mut session.colors)?;
            Ok((group, Dirty::GROUPS))
        })
    }

    pub fn rename_group(&mut self, old: &str, new: &str) -> Result<usize> {
        if old == new && self.groups.contains(old) {
            return Ok(0);
        }
        self.transact(|session| {
            let moved = session
                .groups
                .rename_group(old, new, &mut session.bookmarks)?;
            Ok((moved, Dirty::ALL))
        })
    }

    pub fn delete_group(&mut self, name: &str) -> Result<usize> {
        self.transact(|session| {
            let removed = session
                .groups
                .delete_group(name, &mut session.bookmarks)?;
            Ok((removed, Dirty::ALL))
        })
    }

    pub fn set_active_group(&mut self, name: &str) -> Result<()> {
        self.transact(|session| {
            session.groups.set_active_group(name)?;
            Ok((
                (),
                Dirty {
                    active: true,
                    ..Dirty::default()
                },
            ))
        })
    }

    pub fn set_group_color(&mut self, name: &str, color: &str) -> Result<()> {
        self.transact(|session| {
            session.groups.set_group_color(name, color)?;
            Ok(((), Dirty::GROUPS))
        })
    }

    // ========== Navigation ==========

    /// Next bookmark of the active group after `cursor`, wrapping around.
    pub fn next(&self, cursor: &Position) -> Option<Bookmark> {
        self.navigate(cursor, Direction::Next)
    }

    /// Previous bookmark of the active group before `cursor`, wrapping around.
    pub fn prev(&self, cursor: &Position) -> Option<Bookmark> {
        self.navigate(cursor, Direction::Prev)
    }

    pub fn navigate(&self, cursor: &Position, direction: Direction) -> Option<Bookmark> {
        Navigator::new(&self.bookmarks, self.groups.active_group())
            .step(cursor, direction)
            .cloned()
    }

    // ========== Host events ==========

    /// Shift bookmarks after an edit. Persists only if a bookmark moved.
    pub fn apply_document_change(&mut self, change: &DocumentChange) -> Result<SyncReport> {
        self.transact(|session| {
            let report = SyncEngine::new(&mut session.bookmarks).apply(change);
            let dirty = if report.moved_any() {
                Dirty::BOOKMARKS
            } else {
                Dirty::default()
            };
            Ok((report, dirty))
        })
    }

    pub fn rename_file(&mut self, old: &str, new: &str) -> Result<usize> {
        self.transact(|session| {
            let before = session.bookmarks.len();
            let renamed = session.bookmarks.rename_file(old, new);
            let dirty = if renamed > 0 || session.bookmarks.len() != before {
                Dirty::BOOKMARKS
            } else {
                Dirty::default()
            };
            Ok((renamed, dirty))
        })
    }

    pub fn remove_file(&mut self, file: &str) -> Result<usize> {
        self.transact(|session| {
            let removed = session.bookmarks.remove_file(file);
            let dirty = if removed > 0 {
                Dirty::BOOKMARKS
            } else {
                Dirty::default()
            };
            Ok((removed, dirty))
        })
    }

    /// Apply a new configuration snapshot. Returns whether any group color
    /// changed.
    pub fn reload_config(&mut self, config: BookmarksConfig) -> Result<bool> {
        let changed = self.transact(|session| {
            let active = session.groups.active_group().to_string();
            session
                .groups
                .set_default_color(config.first_default_color());
            let changed = session
                .groups
                .merge_overrides(&config.group_color_overrides);
            let dirty = Dirty {
                bookmarks: false,
                groups: changed,
                active: session.groups.active_group() != active,
            };
            Ok((changed, dirty))
        })?;
        self.config = config;
        log::info!("Configuration reloaded (group colors changed: {changed})");
        Ok(changed)
    }
}
