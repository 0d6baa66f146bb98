mod common;

use zipflow::sink::MemorySink;
use zipflow::{Archive, ArchiveError, ArchiveOptions, FileOptions};

fn new_archive() -> Archive<MemorySink> {
    Archive::new("state.zip", MemorySink::new(), ArchiveOptions::new()).unwrap()
}

/// Property #7: adding two members with the same path fails with
/// StateError on the second, and the first member is unaffected.
#[test]
fn duplicate_path_fails_and_first_member_survives() {
    let mut archive = new_archive();
    archive.add_file("a.txt", b"first", FileOptions::new()).unwrap();

    let result = archive.add_file("a.txt", b"second", FileOptions::new());
    assert!(matches!(result, Err(ArchiveError::State(_))));
}

/// Property #8: `add` fails once the archive is no longer in state
/// INIT (here: after a failure already moved it to ERROR).
#[test]
fn add_outside_init_state_fails() {
    let mut archive = new_archive();
    archive.add_file("a.txt", b"x", FileOptions::new()).unwrap();
    let _ = archive.add_file("a.txt", b"y", FileOptions::new()); // moves archive to ERROR

    let result = archive.add_file("b.txt", b"z", FileOptions::new());
    assert!(matches!(result, Err(ArchiveError::State(_))));
}

/// Property #8: `close` fails once the archive is no longer in state
/// INIT.
#[test]
fn close_outside_init_state_fails() {
    let mut archive = new_archive();
    archive.add_file("a.txt", b"x", FileOptions::new()).unwrap();
    let _ = archive.add_file("a.txt", b"y", FileOptions::new()); // moves archive to ERROR

    let result = archive.close();
    assert!(matches!(result, Err(ArchiveError::State(_))));
}

/// Ownership enforces the rest of property #8 statically: `Archive::close`
/// takes `self` by value, so a second `close` or an `add` after `close`
/// cannot be expressed at all — the compiler rejects it rather than the
/// runtime having to.
#[test]
fn archive_is_unusable_after_close_by_construction() {
    let mut archive = new_archive();
    archive.add_file("a.txt", b"x", FileOptions::new()).unwrap();
    let (_size, _sink) = archive.close().unwrap();
    // `archive` has been moved; there is no further call to make on it.
}
