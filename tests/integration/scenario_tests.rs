//! End-to-end runs of the documented usage scenarios.

use super::common::{audit_text, deletehl, force, options, run, write_file};
use linkdupe::actions::{Mode, ResolvePolicy};
use linkdupe::error::ExitCode;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_hello_hello_world_list_then_delete() {
    let dir = tempdir().unwrap();
    let logs = tempdir().unwrap();
    let a = write_file(dir.path(), "a.txt", b"hello");
    let b = write_file(dir.path(), "b.txt", b"hello");
    let c = write_file(dir.path(), "c.txt", b"world");

    let list = options(Mode::List, ResolvePolicy::default(), &[dir.path()], logs.path());
    let (result, out) = run(&list);
    assert_eq!(result.unwrap(), ExitCode::Success);
    let lines: Vec<_> = out.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].split(' ').next(), lines[1].split(' ').next());
    assert!(lines[0].ends_with("a.txt"));
    assert!(lines[1].ends_with("b.txt"));

    let delete = options(Mode::Delete, ResolvePolicy::default(), &[dir.path()], logs.path());
    let (result, out) = run(&delete);
    assert_eq!(result.unwrap(), ExitCode::Success);
    assert!(a.exists());
    assert!(!b.exists());
    assert!(c.exists());
    assert!(out.contains("Deleted 1 files."));
    assert!(out.contains("Freed approximately 5"));
}

#[test]
#[cfg(unix)]
fn test_hard_linked_x_scenario() {
    let dir = tempdir().unwrap();
    let logs = tempdir().unwrap();
    let a = write_file(dir.path(), "a.txt", b"x");
    let b = dir.path().join("b.txt");
    fs::hard_link(&a, &b).unwrap();

    let delete = options(Mode::Delete, ResolvePolicy::default(), &[dir.path()], logs.path());
    let (result, out) = run(&delete);
    assert_eq!(result.unwrap(), ExitCode::Success);
    assert_eq!(out.trim(), "No (non-hard-link) duplicates found.");
    assert!(a.exists() && b.exists());

    let delete_hl = options(Mode::Delete, deletehl(), &[dir.path()], logs.path());
    let (result, out) = run(&delete_hl);
    assert_eq!(result.unwrap(), ExitCode::Success);
    assert!(out.contains("Deleted 1 files."));
    assert!(!out.contains("Freed approximately"));
    assert_eq!([a.exists(), b.exists()].iter().filter(|e| **e).count(), 1);
}

#[test]
fn test_missing_search_path() {
    let dir = tempdir().unwrap();
    let logs = tempdir().unwrap();
    let missing = dir.path().join("does-not-exist");

    let opts = options(Mode::List, ResolvePolicy::default(), &[missing.as_path()], logs.path());
    let (result, out) = run(&opts);

    let err = result.unwrap_err();
    assert_eq!(err.exit_code(), ExitCode::Failure);
    assert_eq!(err.exit_code().as_i32(), 1);
    assert!(out.is_empty());
    assert!(audit_text(logs.path()).is_empty(), "no run is logged");
}

#[test]
fn test_search_path_is_a_file() {
    let dir = tempdir().unwrap();
    let logs = tempdir().unwrap();
    let file = write_file(dir.path(), "plain", b"x");

    let opts = options(Mode::Delete, ResolvePolicy::default(), &[file.as_path()], logs.path());
    let err = run(&opts).0.unwrap_err();
    assert_eq!(err.exit_code(), ExitCode::Failure);
}

#[test]
#[cfg(unix)]
fn test_delete_force_with_undeletable_duplicate() {
    use super::common::is_privileged;
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    let logs = tempdir().unwrap();
    if is_privileged(logs.path()) {
        eprintln!("Skipping: permissions are not enforced for this user");
        return;
    }
    let original = write_file(dir.path(), "a0", b"triple");
    let d1 = write_file(dir.path(), "a1", b"triple");
    let stuck = write_file(dir.path(), "b/locked", b"triple");
    let d3 = write_file(dir.path(), "c", b"triple");
    let locked_dir = dir.path().join("b");
    fs::set_permissions(&locked_dir, fs::Permissions::from_mode(0o555)).unwrap();

    let opts = options(Mode::Delete, force(), &[dir.path()], logs.path());
    let (result, out) = run(&opts);
    fs::set_permissions(&locked_dir, fs::Permissions::from_mode(0o755)).unwrap();

    assert_eq!(result.unwrap(), ExitCode::Success);
    assert!(original.exists());
    assert!(!d1.exists());
    assert!(stuck.exists());
    assert!(!d3.exists());
    assert!(out.contains("Deleted 2 files."));
    assert!(out.contains("Freed approximately 12"));

    let audit = audit_text(logs.path());
    assert!(audit.contains("failed: permission denied"));
    assert!(audit.contains("tally deleted=2 linked=0 freed_bytes=12 failures=1"));
}

#[test]
fn test_audit_log_records_the_run() {
    let dir = tempdir().unwrap();
    let logs = tempdir().unwrap();
    write_file(dir.path(), "a", b"same");
    write_file(dir.path(), "b", b"same");

    let opts = options(Mode::Delete, ResolvePolicy::default(), &[dir.path()], logs.path());
    run(&opts).0.unwrap();

    let files: Vec<_> = fs::read_dir(logs.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    assert_eq!(files.len(), 1);
    assert!(files[0].starts_with("linkdupe_") && files[0].ends_with(".log"));

    let audit = audit_text(logs.path());
    let canonical = dir.path().canonicalize().unwrap();
    assert!(audit.contains("run mode=delete force=false deletehl=false"));
    assert!(audit.contains(&format!("search path: {}", canonical.display())));
    assert!(audit.contains("dup "));
    assert!(audit.contains(&format!("deleted {}", canonical.join("b").display())));
    assert!(audit.contains("tally deleted=1"));
}

#[test]
fn test_no_audit_log_when_disabled() {
    let dir = tempdir().unwrap();
    let logs = tempdir().unwrap();
    write_file(dir.path(), "a", b"same");

    let mut opts = options(Mode::List, ResolvePolicy::default(), &[dir.path()], logs.path());
    opts.log_dir = None;
    run(&opts).0.unwrap();

    assert!(audit_text(logs.path()).is_empty());
}

#[test]
fn test_no_duplicates_list_is_empty() {
    let dir = tempdir().unwrap();
    let logs = tempdir().unwrap();
    write_file(dir.path(), "a", b"one");
    write_file(dir.path(), "b", b"two");

    let opts = options(Mode::List, ResolvePolicy::default(), &[dir.path()], logs.path());
    let (result, out) = run(&opts);
    assert_eq!(result.unwrap(), ExitCode::Success);
    assert!(out.is_empty());
    assert!(audit_text(logs.path()).contains("no duplicates found"));
}
