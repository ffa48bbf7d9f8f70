// Library exports for hosts and tests
//
// # Ownership Model
//
// All state lives in one `Session`. Commands take `&mut Session`, so a single
// host thread needs no locking. Multi-threaded hosts wrap the session in
// `SharedSession` (`Arc<parking_lot::Mutex<Session>>`) and hold the lock for
// the whole command, which keeps every read-modify-write cycle atomic.

/// Library version, for hosts that report it.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod bookmark;
pub mod bookmark_store;
pub mod cli;
pub mod color;
pub mod command;
pub mod debug;
pub mod error;
pub mod group_store;
pub mod navigator;
pub mod session;
pub mod storage;
pub mod sync;
pub mod tree;

pub use bookmark::{Bookmark, Position};
pub use bookmark_store::{BookmarkStore, ToggleOutcome};
pub use color::ColorAssigner;
pub use command::{Command, CommandOutcome, Refresh};
pub use error::{BookmarkError, ErrorKind, Result, StorageError};
pub use group_store::{Group, GroupStore};
pub use navigator::{Direction, Navigator};
pub use session::{Decoration, Session, SharedSession};
pub use storage::{FileStore, KeyValueStore, KeyValueStoreExt, MemoryStore};
pub use sync::{ChangedRange, DocumentChange, SyncEngine, SyncReport};
pub use tree::{TreeItem, build_tree};

// Re-export the configuration crate so hosts need only one dependency
pub use linemark_config::{self as config, BookmarksConfig, DEFAULT_GROUP_NAME, LogLevel};
