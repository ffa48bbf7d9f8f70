//! Next/previous navigation through `Session`.

mod common;

use common::{memory_session, pos};
use linemark::{Command, CommandOutcome, Session};

fn fixture() -> Session {
    let mut session = memory_session();
    for (file, line) in [("fileB", 1), ("fileA", 9), ("fileA", 3)] {
        session.toggle(&pos(file, line), "", None).expect("toggle");
    }
    session
}

fn loc(session: &Session, next: bool, file: &str, line: u32) -> Option<(String, u32)> {
    let cursor = pos(file, line);
    let found = if next {
        session.next(&cursor)
    } else {
        session.prev(&cursor)
    };
    found.map(|b| (b.file().to_string(), b.line()))
}

#[test]
fn test_wraparound() {
    let session = fixture();
    assert_eq!(loc(&session, true, "fileB", 1), Some(("fileA".into(), 3)));
    assert_eq!(loc(&session, false, "fileA", 3), Some(("fileB".into(), 1)));
}

#[test]
fn test_walks_full_cycle() {
    let session = fixture();
    let mut cursor = ("fileA".to_string(), 3);
    let mut visited = Vec::new();
    for _ in 0..3 {
        cursor = loc(&session, true, &cursor.0, cursor.1).expect("next");
        visited.push(cursor.clone());
    }
    assert_eq!(
        visited,
        vec![
            ("fileA".to_string(), 9),
            ("fileB".to_string(), 1),
            ("fileA".to_string(), 3)
        ]
    );
}

#[test]
fn test_cursor_off_bookmark() {
    let session = fixture();
    assert_eq!(loc(&session, true, "fileA", 5), Some(("fileA".into(), 9)));
    assert_eq!(loc(&session, false, "fileA", 5), Some(("fileA".into(), 3)));
    assert_eq!(loc(&session, true, "fileA", 100), Some(("fileB".into(), 1)));
    assert_eq!(loc(&session, false, "fileC", 0), Some(("fileB".into(), 1)));
}

#[test]
fn test_empty_active_group_is_noop() {
    let mut session = fixture();
    session.create_group("Empty").expect("create");
    session.set_active_group("Empty").expect("activate");
    let outcome = session
        .execute(Command::Prev {
            cursor: pos("fileA", 3),
        })
        .expect("prev");
    assert_eq!(outcome, CommandOutcome::Navigate(None));
}
