//! Group lifecycle driven through `Session`.

mod common;

use common::{lines_in, memory_session, pos};
use linemark::{BookmarkError, DEFAULT_GROUP_NAME, Group};

#[test]
fn test_delete_cascades_and_falls_back() {
    let mut session = memory_session();
    session.delete_group(DEFAULT_GROUP_NAME).expect("delete default");
    session.create_group("Main").expect("create");
    session.create_group("Tests").expect("create");
    session.set_active_group("Tests").expect("activate");
    for line in [1, 2, 3] {
        session.toggle(&pos("t.rs", line), "", None).expect("toggle");
    }
    session.toggle(&pos("m.rs", 9), "", Some("Main")).expect("toggle");
    // Deleting Default left a synthesized Default in front
    let names: Vec<String> = session.list_groups().into_iter().map(|g| g.name).collect();
    assert_eq!(names, vec![DEFAULT_GROUP_NAME, "Main", "Tests"]);
    session.delete_group(DEFAULT_GROUP_NAME).expect("delete default");

    assert_eq!(session.delete_group("Tests").expect("delete"), 3);

    assert!(session.bookmarks().list_by_group("Tests").is_empty());
    assert_eq!(session.bookmarks().len(), 1);
    assert_eq!(session.active_group(), "Main");
}

#[test]
fn test_rename_keeps_color_and_bookmarks() {
    let mut session = memory_session();
    let created = session.create_group("A").expect("create");
    session.set_active_group("A").expect("activate");
    session.toggle(&pos("f.rs", 1), "", None).expect("toggle");
    session.toggle(&pos("f.rs", 2), "", None).expect("toggle");

    assert_eq!(session.rename_group("A", "B").expect("rename"), 2);

    assert_eq!(session.groups().color_of("B"), Some(created.color.as_str()));
    assert!(!session.groups().contains("A"));
    assert_eq!(session.active_group(), "B");
    assert_eq!(lines_in(&session, "f.rs", "B"), vec![1, 2]);
    assert!(session.bookmarks().list_by_group("A").is_empty());
}

#[test]
fn test_rename_conflict_changes_nothing() {
    let mut session = memory_session();
    session.create_group("A").expect("create");
    session.toggle(&pos("f.rs", 1), "", Some("A")).expect("toggle");
    let groups = session.list_groups();

    assert!(matches!(
        session.rename_group("A", DEFAULT_GROUP_NAME),
        Err(BookmarkError::GroupAlreadyExists(_))
    ));
    assert_eq!(session.list_groups(), groups);
    assert!(session.bookmarks().contains("f.rs", 1, "A"));
}

#[test]
fn test_deleting_only_group_recreates_default() {
    let mut session = memory_session();
    let config_color = session.config().first_default_color();
    session.create_group("Solo").expect("create");
    session.delete_group(DEFAULT_GROUP_NAME).expect("delete");
    session.delete_group("Solo").expect("delete");

    assert_eq!(
        session.list_groups(),
        vec![Group::new(DEFAULT_GROUP_NAME, config_color)]
    );
    assert_eq!(session.active_group(), DEFAULT_GROUP_NAME);
}

#[test]
fn test_new_groups_get_valid_colors() {
    let mut session = memory_session();
    let a = session.create_group("A").expect("create");
    let b = session.create_group("B").expect("create");
    for group in [&a, &b] {
        assert!(linemark::config::is_hex_color(&group.color), "{}", group.color);
    }
    assert_eq!(session.groups().color_of("B"), Some(b.color.as_str()));
}

#[test]
fn test_unknown_group_errors() {
    let mut session = memory_session();
    assert!(matches!(
        session.set_active_group("Nope"),
        Err(BookmarkError::GroupNotFound(_))
    ));
    assert!(matches!(
        session.delete_group("Nope"),
        Err(BookmarkError::GroupNotFound(_))
    ));
    assert!(matches!(
        session.rename_group("Nope", "Other"),
        Err(BookmarkError::GroupNotFound(_))
    ));
    assert!(matches!(
        session.set_group_color("Nope", "#000000"),
        Err(BookmarkError::GroupNotFound(_))
    ));
}
