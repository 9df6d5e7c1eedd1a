//! Hard-link awareness across scanning, resolution and accounting.
#![cfg(unix)]

use super::common::{deletehl, options, run, write_file};
use linkdupe::actions::{Mode, ResolvePolicy};
use linkdupe::duplicates::DuplicateFinder;
use linkdupe::error::ExitCode;
use std::fs;
use std::os::unix::fs::MetadataExt;
use tempfile::tempdir;

#[test]
fn test_hard_links_form_a_group_with_shared_inode() {
    let dir = tempdir().unwrap();
    let a = write_file(dir.path(), "a.txt", b"x");
    fs::hard_link(&a, dir.path().join("b.txt")).unwrap();

    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_duplicates_in_paths(&[dir.path().to_path_buf()])
        .unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].len(), 2);
    assert!(groups[0].files[1].shares_inode_with(&groups[0].files[0]));
    assert_eq!(summary.reclaimable_space, 0);
}

#[test]
fn test_delete_leaves_hard_links_intact() {
    let dir = tempdir().unwrap();
    let logs = tempdir().unwrap();
    let a = write_file(dir.path(), "a.txt", b"x");
    let b = dir.path().join("b.txt");
    fs::hard_link(&a, &b).unwrap();

    let opts = options(Mode::Delete, ResolvePolicy::default(), &[dir.path()], logs.path());
    let (result, out) = run(&opts);

    assert_eq!(result.unwrap(), ExitCode::Success);
    assert!(a.exists() && b.exists());
    assert_eq!(out.trim(), "No (non-hard-link) duplicates found.");
}

#[test]
fn test_deletehl_removes_link_but_frees_nothing() {
    let dir = tempdir().unwrap();
    let logs = tempdir().unwrap();
    let a = write_file(dir.path(), "a.txt", b"x");
    let b = dir.path().join("b.txt");
    fs::hard_link(&a, &b).unwrap();

    let opts = options(Mode::Delete, deletehl(), &[dir.path()], logs.path());
    let (result, out) = run(&opts);

    assert_eq!(result.unwrap(), ExitCode::Success);
    assert!(a.exists());
    assert!(!b.exists());
    assert!(out.contains("Deleted 1 files."));
    assert!(out.contains("no space was freed"));
    assert!(!out.contains("Freed approximately"));
}

#[test]
fn test_hardlink_mode_links_copies_to_original() {
    let dir = tempdir().unwrap();
    let logs = tempdir().unwrap();
    let a = write_file(dir.path(), "a", b"payload");
    let b = write_file(dir.path(), "b", b"payload");
    let c = write_file(dir.path(), "c", b"payload");

    let opts = options(Mode::Hardlink, ResolvePolicy::default(), &[dir.path()], logs.path());
    let (result, out) = run(&opts);

    assert_eq!(result.unwrap(), ExitCode::Success);
    let ino = fs::metadata(&a).unwrap().ino();
    assert_eq!(fs::metadata(&b).unwrap().ino(), ino);
    assert_eq!(fs::metadata(&c).unwrap().ino(), ino);
    assert_eq!(fs::metadata(&a).unwrap().nlink(), 3);
    assert_eq!(fs::read(&c).unwrap(), b"payload");
    assert!(out.contains("Deleted 2 files."));
    assert!(out.contains("Replaced 2 files with hard links."));
}

#[test]
fn test_hardlink_then_delete_finds_nothing_to_free() {
    let dir = tempdir().unwrap();
    let logs = tempdir().unwrap();
    write_file(dir.path(), "a", b"z");
    write_file(dir.path(), "b", b"z");

    let hardlink = options(Mode::Hardlink, ResolvePolicy::default(), &[dir.path()], logs.path());
    run(&hardlink).0.unwrap();

    let delete = options(Mode::Delete, ResolvePolicy::default(), &[dir.path()], logs.path());
    let (result, out) = run(&delete);
    result.unwrap();
    assert_eq!(out.trim(), "No (non-hard-link) duplicates found.");
    assert!(dir.path().join("b").exists());
}

#[test]
fn test_hardlink_rejects_deletehl() {
    let dir = tempdir().unwrap();
    let logs = tempdir().unwrap();
    let opts = options(Mode::Hardlink, deletehl(), &[dir.path()], logs.path());

    let err = run(&opts).0.unwrap_err();
    assert_eq!(err.exit_code(), ExitCode::Usage);
}
