//! The command surface as data.
//!
//! Hosts that dispatch commands from keybindings or menus build a [`Command`]
//! and call [`Session::execute`]. The [`CommandOutcome`] says what changed and
//! which parts of the presentation need a refresh.

use crate::bookmark::{Bookmark, Position};
use crate::bookmark_store::ToggleOutcome;
use crate::error::Result;
use crate::group_store::Group;
use crate::session::Session;
use crate::sync::DocumentChange;
use linemark_config::BookmarksConfig;

#[derive(Debug, Clone)]
pub enum Command {
    Toggle {
        position: Position,
        content: String,
        group: Option<String>,
    },
    Remove {
        position: Position,
        group: Option<String>,
    },
    ClearGroup {
        group: Option<String>,
        confirmed: bool,
    },
    CreateGroup {
        name: String,
    },
    RenameGroup {
        old: String,
        new: String,
    },
    DeleteGroup {
        name: String,
    },
    SetActiveGroup {
        name: String,
    },
    SetGroupColor {
        name: String,
        color: String,
    },
    MoveBookmark {
        position: Position,
        from: String,
        to: String,
    },
    Next {
        cursor: Position,
    },
    Prev {
        cursor: Position,
    },
    ApplyDocumentChange(DocumentChange),
    RenameFile {
        old: String,
        new: String,
    },
    RemoveFile {
        file: String,
    },
    ReloadConfig(Box<BookmarksConfig>),
}

/// Presentation parts that have to be redrawn after a command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Refresh {
    pub tree: bool,
    pub decorations: bool,
}

impl Refresh {
    pub const NONE: Refresh = Refresh {
        tree: false,
        decorations: false,
    };
    pub const ALL: Refresh = Refresh {
        tree: true,
        decorations: true,
    };
    pub const TREE: Refresh = Refresh {
        tree: true,
        decorations: false,
    };
}

#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    Toggled {
        outcome: ToggleOutcome,
        position: Position,
        group: String,
    },
    Removed(Bookmark),
    Cleared {
        group: String,
        removed: usize,
    },
    GroupCreated(Group),
    GroupRenamed {
        old: String,
        new: String,
        bookmarks: usize,
    },
    GroupDeleted {
        name: String,
        bookmarks: usize,
        active: String,
    },
    ActiveGroupChanged(String),
    GroupRecolored {
        name: String,
        color: String,
    },
    Moved {
        position: Position,
        to: String,
    },
    /// Where the cursor should go; `None` if the active group is empty
    Navigate(Option<Bookmark>),
    Synced {
        bookmarks_moved: usize,
    },
    FileRenamed {
        bookmarks: usize,
    },
    FileRemoved {
        bookmarks: usize,
    },
    ConfigReloaded {
        colors_changed: bool,
    },
}

impl CommandOutcome {
    /// What the presentation layer should redraw.
    pub fn refresh(&self) -> Refresh {
        match self {
            CommandOutcome::Navigate(_) => Refresh::NONE,
            CommandOutcome::GroupCreated(_) | CommandOutcome::ActiveGroupChanged(_) => {
                Refresh::TREE
            }
            CommandOutcome::Synced { bookmarks_moved: n }
            | CommandOutcome::FileRenamed { bookmarks: n }
            | CommandOutcome::FileRemoved { bookmarks: n } => {
                if *n > 0 {
                    Refresh::ALL
                } else {
                    Refresh::NONE
                }
            }
            // Opacity may have changed even when no group color did
            CommandOutcome::ConfigReloaded { colors_changed } => Refresh {
                tree: *colors_changed,
                decorations: true,
            },
            _ => Refresh::ALL,
        }
    }
}

impl Session {
    pub fn execute(&mut self, command: Command) -> Result<CommandOutcome> {
        log::debug!("Executing {command:?}");
        let outcome = match command {
            Command::Toggle {
                position,
                content,
                group,
            } => {
                let outcome = self.toggle(&position, &content, group.as_deref())?;
                let group = group.unwrap_or_else(|| self.active_group().to_string());
                CommandOutcome::Toggled {
                    outcome,
                    position,
                    group,
                }
            }
            Command::Remove { position, group } => {
                CommandOutcome::Removed(self.remove(&position, group.as_deref())?)
            }
            Command::ClearGroup { group, confirmed } => {
                let removed = self.clear_group(group.as_deref(), confirmed)?;
                let group = group.unwrap_or_else(|| self.active_group().to_string());
                CommandOutcome::Cleared { group, removed }
            }
            Command::CreateGroup { name } => CommandOutcome::GroupCreated(self.create_group(&name)?),
            Command::RenameGroup { old, new } => {
                let bookmarks = self.rename_group(&old, &new)?;
                CommandOutcome::GroupRenamed {
                    old,
                    new,
                    bookmarks,
                }
            }
            Command::DeleteGroup { name } => {
                let bookmarks = self.delete_group(&name)?;
                CommandOutcome::GroupDeleted {
                    name,
                    bookmarks,
                    active: self.active_group().to_string(),
                }
            }
            Command::SetActiveGroup { name } => {
                self.set_active_group(&name)?;
                CommandOutcome::ActiveGroupChanged(name)
            }
            Command::SetGroupColor { name, color } => {
                self.set_group_color(&name, &color)?;
                CommandOutcome::GroupRecolored { name, color }
            }
            Command::MoveBookmark { position, from, to } => {
                self.move_bookmark(&position, &from, &to)?;
                CommandOutcome::Moved { position, to }
            }
            Command::Next { cursor } => CommandOutcome::Navigate(self.next(&cursor)),
            Command::Prev { cursor } => CommandOutcome::Navigate(self.prev(&cursor)),
            Command::ApplyDocumentChange(change) => {
                let report = self.apply_document_change(&change)?;
                CommandOutcome::Synced {
                    bookmarks_moved: report.bookmarks_moved,
                }
            }
            Command::RenameFile { old, new } => CommandOutcome::FileRenamed {
                bookmarks: self.rename_file(&old, &new)?,
            },
            Command::RemoveFile { file } => CommandOutcome::FileRemoved {
                bookmarks: self.remove_file(&file)?,
            },
            Command::ReloadConfig(config) => CommandOutcome::ConfigReloaded {
                colors_changed: self.reload_config(*config)?,
            },
        };
        Ok(outcome)
    }
}
