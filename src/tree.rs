//! View model for a presentation-layer bookmark tree.
//!
//! Three levels: group, file within the group, bookmark within the file.
//! Groups appear in group order, files in first-bookmarked order and bookmarks
//! by line.

use crate::bookmark::Bookmark;
use crate::bookmark_store::BookmarkStore;
use crate::group_store::GroupStore;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TreeItem {
    Group {
        name: String,
        color: String,
        active: bool,
        children: Vec<TreeItem>,
    },
    FileGroup {
        file: String,
        children: Vec<TreeItem>,
    },
    Bookmark(Bookmark),
}

impl TreeItem {
    /// Primary text of the node.
    pub fn label(&self) -> String {
        match self {
            TreeItem::Group { name, active, .. } => {
                if *active {
                    format!("{name} (active)")
                } else {
                    name.clone()
                }
            }
            TreeItem::FileGroup { file, .. } => file_name(file).to_string(),
            TreeItem::Bookmark(bookmark) => {
                let content = bookmark.content.trim();
                if content.is_empty() {
                    format!("Line {}", bookmark.line() + 1)
                } else {
                    format!("{}: {}", bookmark.line() + 1, content)
                }
            }
        }
    }

    /// Secondary text, if the node has any.
    pub fn description(&self) -> Option<String> {
        match self {
            TreeItem::Group { children, .. } => {
                let count: usize = children.iter().map(TreeItem::bookmark_count).sum();
                Some(format!("{count} bookmark(s)"))
            }
            TreeItem::FileGroup { file, .. } => Some(file.clone()),
            TreeItem::Bookmark(_) => None,
        }
    }

    pub fn children(&self) -> &[TreeItem] {
        match self {
            TreeItem::Group { children, .. } | TreeItem::FileGroup { children, .. } => children,
            TreeItem::Bookmark(_) => &[],
        }
    }

    /// Bookmarks at or below this node.
    pub fn bookmark_count(&self) -> usize {
        match self {
            TreeItem::Bookmark(_) => 1,
            _ => self.children().iter().map(TreeItem::bookmark_count).sum(),
        }
    }
}

fn file_name(path: &str) -> &str {
    path.rsplit(['/', '\\'])
        .find(|part| !part.is_empty())
        .unwrap_or(path)
}

/// Build the full tree. Empty groups are included so they stay visible.
pub fn build_tree(groups: &GroupStore, bookmarks: &BookmarkStore) -> Vec<TreeItem> {
    groups
        .list_groups()
        .into_iter()
        .map(|group| {
            let children = bookmarks
                .files_in_group(&group.name)
                .into_iter()
                .map(|file| {
                    let mut marks: Vec<&Bookmark> = bookmarks
                        .list_by_file(file)
                        .into_iter()
                        .filter(|b| b.group == group.name)
                        .collect();
                    marks.sort_by_key(|b| b.line());
                    TreeItem::FileGroup {
                        file: file.to_string(),
                        children: marks
                            .into_iter()
                            .map(|b| TreeItem::Bookmark(b.clone()))
                            .collect(),
                    }
                })
                .collect();
            TreeItem::Group {
                active: group.name == groups.active_group(),
                name: group.name,
                color: group.color,
                children,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group_store::Group;
    use std::collections::BTreeMap;

    fn fixture() -> (GroupStore, BookmarkStore) {
        let groups = GroupStore::restore(
            vec![Group::new("Main", "#111111"), Group::new("Empty", "#222222")],
            Some("Main".to_string()),
            &BTreeMap::new(),
            "#f4d35e",
        );
        let mut bookmarks = BookmarkStore::new();
        bookmarks.toggle("src/lib.rs", 9, "  pub fn run() {", "Main");
        bookmarks.toggle("src/main.rs", 0, "", "Main");
        bookmarks.toggle("src/lib.rs", 2, "use std;", "Main");
        (groups, bookmarks)
    }

    #[test]
    fn test_tree_shape() {
        let (groups, bookmarks) = fixture();
        let tree = build_tree(&groups, &bookmarks);
        assert_eq!(tree.len(), 2);

        let main = &tree[0];
        assert_eq!(main.label(), "Main (active)");
        assert_eq!(main.description().as_deref(), Some("3 bookmark(s)"));
        let files: Vec<String> = main.children().iter().map(TreeItem::label).collect();
        assert_eq!(files, vec!["lib.rs", "main.rs"]);

        let lib_marks: Vec<String> = main.children()[0]
            .children()
            .iter()
            .map(TreeItem::label)
            .collect();
        assert_eq!(lib_marks, vec!["3: use std;", "10: pub fn run() {"]);
        assert_eq!(main.children()[1].children()[0].label(), "Line 1");

        let empty = &tree[1];
        assert_eq!(empty.label(), "Empty");
        assert!(empty.children().is_empty());
        assert_eq!(empty.bookmark_count(), 0);
    }

    #[test]
    fn test_tree_serializes_tagged() {
        let (groups, bookmarks) = fixture();
        let tree = build_tree(&groups, &bookmarks);
        let value = serde_json::to_value(&tree[1]).expect("serialize");
        assert_eq!(value["kind"], "group");
        assert_eq!(value["name"], "Empty");
        assert_eq!(value["active"], false);
    }

    #[test]
    fn test_file_name() {
        assert_eq!(file_name("a/b/c.rs"), "c.rs");
        assert_eq!(file_name("c.rs"), "c.rs");
        assert_eq!(file_name("C:\\x\\y.rs"), "y.rs");
    }
}
