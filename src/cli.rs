//! Command-line interface for linemark.
//!
//! Every subcommand opens the file-backed session, runs one [`Command`]
//! through [`Session::execute`] and prints the outcome. Lines are one-based
//! on the command line and zero-based everywhere else.

use crate::bookmark::{Bookmark, Position};
use crate::bookmark_store::ToggleOutcome;
use crate::command::{Command, CommandOutcome};
use crate::session::Session;
use crate::storage::FileStore;
use crate::sync::{ChangedRange, DocumentChange};
use crate::tree::TreeItem;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use linemark_config::{BookmarksConfig, ConfigWatcher, LogLevel, persistence};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// linemark - line bookmarks with named, colored groups
#[derive(Parser)]
#[command(name = "linemark")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Bookmark state file (default: ~/.config/linemark/bookmarks.yaml)
    #[arg(long, value_name = "PATH", global = true)]
    pub store: Option<PathBuf>,

    /// Configuration file (default: ~/.config/linemark/config.yaml)
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Log level: off, error, warn, info, debug or trace
    #[arg(long, value_name = "LEVEL", global = true, value_parser = parse_log_level)]
    pub log_level: Option<LogLevel>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add or remove a bookmark on a line
    Toggle {
        file: String,
        #[arg(value_parser = parse_line)]
        line: u32,
        /// Text of the line, shown in listings
        #[arg(long, default_value = "")]
        content: String,
        /// Group to use instead of the active one
        #[arg(long)]
        group: Option<String>,
    },

    /// Remove a bookmark
    Remove {
        file: String,
        #[arg(value_parser = parse_line)]
        line: u32,
        #[arg(long)]
        group: Option<String>,
    },

    /// Remove every bookmark of a group
    Clear {
        /// Group to clear instead of the active one
        #[arg(long)]
        group: Option<String>,
        /// Skip confirmation
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// List bookmarks
    List {
        /// Only this group
        #[arg(long)]
        group: Option<String>,
    },

    /// Print the bookmark tree
    Tree,

    /// Jump to the next bookmark of the active group
    Next {
        file: String,
        #[arg(value_parser = parse_line)]
        line: u32,
    },

    /// Jump to the previous bookmark of the active group
    Prev {
        file: String,
        #[arg(value_parser = parse_line)]
        line: u32,
    },

    /// Move a bookmark to another group
    Move {
        file: String,
        #[arg(value_parser = parse_line)]
        line: u32,
        /// Target group
        to: String,
        /// Source group (default: active group)
        #[arg(long)]
        from: Option<String>,
    },

    /// Report an edit that replaced lines START..=END with TEXT
    Edit {
        file: String,
        #[arg(value_parser = parse_line)]
        start: u32,
        #[arg(value_parser = parse_line)]
        end: u32,
        /// Replacement text (may contain newlines)
        #[arg(default_value = "")]
        text: String,
    },

    /// Report that a file was renamed
    RenameFile { old: String, new: String },

    /// Report that a file was deleted
    RemoveFile { file: String },

    /// Print line highlight colors for a file
    Decorations { file: String },

    /// Manage groups
    #[command(subcommand)]
    Group(GroupCommands),

    /// Reload group colors whenever the config file changes
    Watch {
        /// Exit after the specified number of seconds
        #[arg(long, value_name = "SECONDS")]
        exit_after: Option<f64>,
    },
}

#[derive(Subcommand)]
pub enum GroupCommands {
    /// List groups in order
    List,
    /// Create a group with a fresh color
    Create { name: String },
    /// Rename a group and retarget its bookmarks
    Rename { old: String, new: String },
    /// Delete a group and its bookmarks
    Delete { name: String },
    /// Make a group the active one
    Activate { name: String },
    /// Set a group's color (#rrggbb)
    Color { name: String, color: String },
}

fn parse_log_level(value: &str) -> std::result::Result<LogLevel, String> {
    LogLevel::from_name(value).ok_or_else(|| format!("unknown log level '{value}'"))
}

/// Parse a one-based line number into a zero-based line.
fn parse_line(value: &str) -> std::result::Result<u32, String> {
    match value.parse::<u32>() {
        Ok(0) => Err("line numbers start at 1".to_string()),
        Ok(line) => Ok(line - 1),
        Err(e) => Err(e.to_string()),
    }
}

fn load_config(path: Option<&Path>) -> Result<BookmarksConfig> {
    match path {
        Some(path) => BookmarksConfig::load_from(path),
        None => BookmarksConfig::load(),
    }
}

fn open_session(cli: &Cli, config: BookmarksConfig) -> Result<Session> {
    let path = cli.store.clone().unwrap_or_else(persistence::state_path);
    let store = FileStore::open(&path)
        .with_context(|| format!("Failed to open bookmark store {}", path.display()))?;
    Ok(Session::init(Box::new(store), config)?)
}

/// Run the parsed command line.
pub fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;
    crate::debug::apply_config_level(config.log_level);
    let mut session = open_session(&cli, config)?;

    let command = match cli.command {
        Commands::Toggle {
            file,
            line,
            content,
            group,
        } => Command::Toggle {
            position: Position::new(file, line),
            content,
            group,
        },
        Commands::Remove { file, line, group } => Command::Remove {
            position: Position::new(file, line),
            group,
        },
        Commands::Clear { group, yes } => Command::ClearGroup {
            group,
            confirmed: yes,
        },
        Commands::List { group } => {
            print_bookmarks(&session, group.as_deref());
            return Ok(());
        }
        Commands::Tree => {
            print_tree(&session.tree(), 0);
            return Ok(());
        }
        Commands::Next { file, line } => Command::Next {
            cursor: Position::new(file, line),
        },
        Commands::Prev { file, line } => Command::Prev {
            cursor: Position::new(file, line),
        },
        Commands::Move {
            file,
            line,
            to,
            from,
        } => Command::MoveBookmark {
            position: Position::new(file, line),
            from: from.unwrap_or_else(|| session.active_group().to_string()),
            to,
        },
        Commands::Edit {
            file,
            start,
            end,
            text,
        } => Command::ApplyDocumentChange(DocumentChange::new(
            file,
            vec![ChangedRange::new(start, end, text)],
        )),
        Commands::RenameFile { old, new } => Command::RenameFile { old, new },
        Commands::RemoveFile { file } => Command::RemoveFile { file },
        Commands::Decorations { file } => {
            for decoration in session.decorations(&file) {
                println!(
                    "{}\t{}\t{}",
                    decoration.line + 1,
                    decoration.color,
                    decoration.group
                );
            }
            return Ok(());
        }
        Commands::Group(GroupCommands::List) => {
            let active = session.active_group().to_string();
            for group in session.list_groups() {
                let marker = if group.name == active { "*" } else { " " };
                println!("{marker} {}\t{}", group.name, group.color);
            }
            return Ok(());
        }
        Commands::Group(GroupCommands::Create { name }) => Command::CreateGroup { name },
        Commands::Group(GroupCommands::Rename { old, new }) => Command::RenameGroup { old, new },
        Commands::Group(GroupCommands::Delete { name }) => Command::DeleteGroup { name },
        Commands::Group(GroupCommands::Activate { name }) => Command::SetActiveGroup { name },
        Commands::Group(GroupCommands::Color { name, color }) => {
            Command::SetGroupColor { name, color }
        }
        Commands::Watch { exit_after } => {
            let config_path = cli.config.clone().unwrap_or_else(persistence::config_path);
            return watch(&mut session, &config_path, exit_after);
        }
    };

    let outcome = session.execute(command)?;
    println!("{}", describe(&outcome));
    Ok(())
}

fn watch(session: &mut Session, config_path: &Path, exit_after: Option<f64>) -> Result<()> {
    let watcher = ConfigWatcher::new(config_path, linemark_config::defaults::watch_debounce_ms())?;
    let deadline = exit_after.map(|secs| Instant::now() + Duration::from_secs_f64(secs.max(0.0)));
    println!("Watching {}", config_path.display());

    while deadline.is_none_or(|d| Instant::now() < d) {
        if let Some(change) = watcher.try_recv() {
            match BookmarksConfig::load_from(&change.path) {
                Ok(config) => {
                    crate::debug::apply_config_level(config.log_level);
                    let outcome = session.execute(Command::ReloadConfig(Box::new(config)))?;
                    println!("{}", describe(&outcome));
                }
                Err(e) => log::warn!("Ignoring invalid config change: {e:#}"),
            }
        }
        std::thread::sleep(Duration::from_millis(100));
    }
    Ok(())
}

fn describe(outcome: &CommandOutcome) -> String {
    match outcome {
        CommandOutcome::Toggled {
            outcome: ToggleOutcome::Added,
            position,
            group,
        } => format!("Added {position} to '{group}'"),
        CommandOutcome::Toggled {
            outcome: ToggleOutcome::Removed,
            position,
            group,
        } => format!("Removed {position} from '{group}'"),
        CommandOutcome::Removed(bookmark) => {
            format!("Removed {} from '{}'", bookmark.location, bookmark.group)
        }
        CommandOutcome::Cleared { group, removed } => {
            format!("Cleared {removed} bookmark(s) from '{group}'")
        }
        CommandOutcome::GroupCreated(group) => {
            format!("Created group '{}' ({})", group.name, group.color)
        }
        CommandOutcome::GroupRenamed {
            old,
            new,
            bookmarks,
        } => format!("Renamed '{old}' to '{new}' ({bookmarks} bookmark(s))"),
        CommandOutcome::GroupDeleted {
            name,
            bookmarks,
            active,
        } => format!("Deleted '{name}' ({bookmarks} bookmark(s)); active group is '{active}'"),
        CommandOutcome::ActiveGroupChanged(name) => format!("Active group is '{name}'"),
        CommandOutcome::GroupRecolored { name, color } => format!("Group '{name}' is now {color}"),
        CommandOutcome::Moved { position, to } => format!("Moved {position} to '{to}'"),
        CommandOutcome::Navigate(Some(bookmark)) => bookmark.location.to_string(),
        CommandOutcome::Navigate(None) => "No bookmarks in the active group".to_string(),
        CommandOutcome::Synced { bookmarks_moved } => {
            format!("Moved {bookmarks_moved} bookmark(s)")
        }
        CommandOutcome::FileRenamed { bookmarks } => {
            format!("Retargeted {bookmarks} bookmark(s)")
        }
        CommandOutcome::FileRemoved { bookmarks } => format!("Removed {bookmarks} bookmark(s)"),
        CommandOutcome::ConfigReloaded { colors_changed } => {
            if *colors_changed {
                "Configuration reloaded, group colors updated".to_string()
            } else {
                "Configuration reloaded".to_string()
            }
        }
    }
}

fn print_bookmarks(session: &Session, group: Option<&str>) {
    let marks: Vec<&Bookmark> = match group {
        Some(group) => session.bookmarks().list_by_group(group),
        None => session.bookmarks().iter().collect(),
    };
    for bookmark in marks {
        println!(
            "{}\t{}\t{}",
            bookmark.group,
            bookmark.location,
            bookmark.content.trim()
        );
    }
}

fn print_tree(items: &[TreeItem], depth: usize) {
    for item in items {
        let indent = "  ".repeat(depth);
        match item.description() {
            Some(description) if !matches!(item, TreeItem::FileGroup { .. }) => {
                println!("{indent}{} - {description}", item.label())
            }
            _ => println!("{indent}{}", item.label()),
        }
        print_tree(item.children(), depth + 1);
    }
}
