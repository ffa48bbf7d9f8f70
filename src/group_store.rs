//! Named, colored bookmark groups and the active-group pointer.
//!
//! Groups keep their insertion order; "first group" always means the first in
//! that order. Once initialized the store is never empty: removing the last
//! group synthesizes [`DEFAULT_GROUP_NAME`] again.
//!
//! Operations that affect bookmarks take the [`BookmarkStore`] explicitly so
//! the cascade happens in the same call as the group change.

use crate::bookmark_store::BookmarkStore;
use crate::color::ColorAssigner;
use crate::error::{BookmarkError, Result};
use linemark_config::{DEFAULT_GROUP_NAME, is_hex_color};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// A group as persisted and as shown to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub name: String,
    /// `#rrggbb`
    pub color: String,
}

impl Group {
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: color.into(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct GroupStore {
    /// Colors indexed by group name
    colors: HashMap<String, String>,

    /// Group names in insertion order
    order: Vec<String>,

    /// Name of the active group; empty only before the first group exists
    active: String,

    /// Color used when "Default" has to be synthesized
    default_color: String,
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(BookmarkError::InvalidGroupName);
    }
    Ok(())
}

impl GroupStore {
    /// An empty store. Call [`GroupStore::ensure_default`] or add groups
    /// before use.
    pub fn new(default_color: impl Into<String>) -> Self {
        Self {
            default_color: default_color.into(),
            ..Self::default()
        }
    }

    /// Rebuild the store from persisted state and configuration overrides.
    ///
    /// Overrides replace persisted colors and append unknown names in key
    /// order. An empty result is seeded with "Default", and an active name
    /// that is missing or unknown falls back to the first group.
    pub fn restore(
        persisted: Vec<Group>,
        active: Option<String>,
        overrides: &BTreeMap<String, String>,
        default_color: impl Into<String>,
    ) -> Self {
        let mut store = Self::new(default_color);
        for group in persisted {
            if validate_name(&group.name).is_err() {
                log::warn!("Skipping persisted group with an empty name");
                continue;
            }
            store.insert(group.name, group.color);
        }
        store.merge_overrides(overrides);
        store.ensure_default();
        store.active = active.unwrap_or_default();
        store.repair_active();
        store
    }

    fn insert(&mut self, name: String, color: String) {
        if !self.colors.contains_key(&name) {
            self.order.push(name.clone());
        }
        self.colors.insert(name, color);
    }

    /// Apply configured color overrides. Returns true if anything changed.
    pub fn merge_overrides(&mut self, overrides: &BTreeMap<String, String>) -> bool {
        let mut changed = false;
        for (name, color) in overrides {
            if self.colors.get(name) == Some(color) {
                continue;
            }
            log::debug!("Applying color override {color} to group '{name}'");
            self.insert(name.clone(), color.clone());
            changed = true;
        }
        if changed && self.active.is_empty() {
            self.repair_active();
        }
        changed
    }

    /// Create "Default" if no group exists. Returns true if it did.
    pub fn ensure_default(&mut self) -> bool {
        if !self.order.is_empty() {
            return false;
        }
        log::info!("No groups left, creating '{DEFAULT_GROUP_NAME}'");
        self.insert(DEFAULT_GROUP_NAME.to_string(), self.default_color.clone());
        self.active = DEFAULT_GROUP_NAME.to_string();
        true
    }

    /// Point the active group at the first group if it names nothing.
    fn repair_active(&mut self) {
        if self.colors.contains_key(&self.active) {
            return;
        }
        if let Some(first) = self.order.first() {
            if !self.active.is_empty() {
                log::warn!(
                    "Active group '{}' does not exist, switching to '{}'",
                    self.active,
                    first
                );
            }
            self.active = first.clone();
        } else {
            self.active.clear();
        }
    }

    /// Color used for future synthesized "Default" groups.
    pub fn set_default_color(&mut self, color: impl Into<String>) {
        self.default_color = color.into();
    }

    /// All groups in order.
    pub fn list_groups(&self) -> Vec<Group> {
        self.order
            .iter()
            .filter_map(|name| {
                self.colors
                    .get(name)
                    .map(|color| Group::new(name.clone(), color.clone()))
            })
            .collect()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn color_of(&self, name: &str) -> Option<&str> {
        self.colors.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.colors.contains_key(name)
    }

    pub fn active_group(&self) -> &str {
        &self.active
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Create a group with a freshly generated color.
    pub fn create_group(&mut self, name: &str, colors: &mut ColorAssigner) -> Result<Group> {
        validate_name(name)?;
        if self.contains(name) {
            return Err(BookmarkError::GroupAlreadyExists(name.to_string()));
        }
        let color = colors.color_for_new_group();
        self.insert(name.to_string(), color.clone());
        if self.active.is_empty() {
            self.active = name.to_string();
        }
        log::info!("Created group '{name}' ({color})");
        Ok(Group::new(name, color))
    }

    /// Rename a group, carrying its color, position, bookmarks and active
    /// status over to the new name. Returns how many bookmarks were retargeted.
    pub fn rename_group(
        &mut self,
        old: &str,
        new: &str,
        bookmarks: &mut BookmarkStore,
    ) -> Result<usize> {
        validate_name(new)?;
        if !self.contains(old) {
            return Err(BookmarkError::GroupNotFound(old.to_string()));
        }
        if old == new {
            return Ok(0);
        }
        if self.contains(new) {
            return Err(BookmarkError::GroupAlreadyExists(new.to_string()));
        }

        if let Some(color) = self.colors.remove(old) {
            self.colors.insert(new.to_string(), color);
        }
        if let Some(slot) = self.order.iter_mut().find(|n| n.as_str() == old) {
            *slot = new.to_string();
        }
        let moved = bookmarks.rename_group_refs(old, new);
        if self.active == old {
            self.active = new.to_string();
        }
        log::info!("Renamed group '{old}' to '{new}' ({moved} bookmark(s))");
        Ok(moved)
    }

    /// Delete a group and every bookmark it owns. Returns how many bookmarks
    /// were removed.
    pub fn delete_group(&mut self, name: &str, bookmarks: &mut BookmarkStore) -> Result<usize> {
        if !self.contains(name) {
            return Err(BookmarkError::GroupNotFound(name.to_string()));
        }
        self.colors.remove(name);
        self.order.retain(|n| n != name);
        let removed = bookmarks.clear_group(name);

        if !self.ensure_default() {
            self.repair_active();
        }
        log::info!(
            "Deleted group '{name}' ({removed} bookmark(s)), active group is '{}'",
            self.active
        );
        Ok(removed)
    }

    pub fn set_active_group(&mut self, name: &str) -> Result<()> {
        if !self.contains(name) {
            return Err(BookmarkError::GroupNotFound(name.to_string()));
        }
        self.active = name.to_string();
        Ok(())
    }

    pub fn set_group_color(&mut self, name: &str, color: &str) -> Result<()> {
        if !is_hex_color(color) {
            return Err(BookmarkError::InvalidColor(color.to_string()));
        }
        match self.colors.get_mut(name) {
            Some(slot) => {
                *slot = color.to_string();
                Ok(())
            }
            None => Err(BookmarkError::GroupNotFound(name.to_string())),
        }
    }
}
