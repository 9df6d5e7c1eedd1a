use super::common::{audit_text, force, options, run, write_file};
use linkdupe::actions::{tally, ActionKind, Mode, ResolveError, ResolvePolicy, Resolver};
use linkdupe::duplicates::DuplicateFinder;
use linkdupe::error::ExitCode;
use std::fs;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tempfile::tempdir;

#[test]
fn test_list_never_mutates() {
    let dir = tempdir().unwrap();
    let logs = tempdir().unwrap();
    let a = write_file(dir.path(), "a", b"dup");
    let b = write_file(dir.path(), "b", b"dup");
    let before_a = fs::metadata(&a).unwrap().modified().unwrap();

    let opts = options(Mode::List, ResolvePolicy::default(), &[dir.path()], logs.path());
    let (result, out) = run(&opts);

    assert_eq!(result.unwrap(), ExitCode::Success);
    assert!(a.exists() && b.exists());
    assert_eq!(fs::metadata(&a).unwrap().modified().unwrap(), before_a);
    assert_eq!(out.lines().count(), 2);
}

#[test]
fn test_list_line_format() {
    let dir = tempdir().unwrap();
    let logs = tempdir().unwrap();
    write_file(dir.path(), "a", b"dup");
    write_file(dir.path(), "b", b"dup");

    let opts = options(Mode::List, ResolvePolicy::default(), &[dir.path()], logs.path());
    let (_, out) = run(&opts);

    let root = dir.path().canonicalize().unwrap();
    let mut lines = out.lines();
    let first: Vec<_> = lines.next().unwrap().splitn(3, ' ').collect();
    let second: Vec<_> = lines.next().unwrap().splitn(3, ' ').collect();

    assert_eq!(first[0].len(), 64);
    assert_eq!(first[0], second[0]);
    assert!(first[1].parse::<u64>().is_ok());
    assert_eq!(first[2], root.join("a").display().to_string());
    assert_eq!(second[2], root.join("b").display().to_string());
}

#[test]
fn test_delete_is_idempotent_with_list() {
    let dir = tempdir().unwrap();
    let logs = tempdir().unwrap();
    write_file(dir.path(), "a", b"dup");
    write_file(dir.path(), "b", b"dup");
    write_file(dir.path(), "c", b"dup");
    write_file(dir.path(), "d", b"other");

    let delete = options(Mode::Delete, ResolvePolicy::default(), &[dir.path()], logs.path());
    run(&delete).0.unwrap();

    let list = options(Mode::List, ResolvePolicy::default(), &[dir.path()], logs.path());
    let (result, out) = run(&list);
    result.unwrap();
    assert!(out.is_empty());
    assert!(dir.path().join("a").exists());
    assert!(dir.path().join("d").exists());
}

#[test]
fn test_abort_without_force_keeps_prior_deletions() {
    let dir = tempdir().unwrap();
    let a = write_file(dir.path(), "a", b"dup");
    let b = write_file(dir.path(), "b", b"dup");
    let c = write_file(dir.path(), "c", b"dup");
    let d = write_file(dir.path(), "d", b"dup");

    let (groups, _) = DuplicateFinder::with_defaults()
        .find_duplicates_in_paths(&[dir.path().to_path_buf()])
        .unwrap();
    // c disappears between scan and resolution
    fs::remove_file(&c).unwrap();

    let err = Resolver::new(Mode::Delete, ResolvePolicy::default())
        .unwrap()
        .resolve(&groups)
        .unwrap_err();

    assert!(matches!(err, ResolveError::Aborted { .. }));
    assert!(a.exists());
    assert!(!b.exists(), "deletion before the failure stays done");
    assert!(d.exists(), "nothing after the failure is attempted");

    let totals = tally(err.partial_report());
    assert_eq!(totals.files_deleted, 1);
    assert_eq!(totals.bytes_freed, 3);
    assert_eq!(totals.failures, 1);
}

#[test]
#[cfg(unix)]
fn test_abort_exit_code_and_audit() {
    use super::common::is_privileged;
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    let logs = tempdir().unwrap();
    if is_privileged(logs.path()) {
        eprintln!("Skipping: permissions are not enforced for this user");
        return;
    }
    let a = write_file(dir.path(), "a", b"dup");
    let b = write_file(dir.path(), "locked/b", b"dup");
    let locked = dir.path().join("locked");
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o555)).unwrap();

    let opts = options(Mode::Delete, ResolvePolicy::default(), &[dir.path()], logs.path());
    let (result, out) = run(&opts);
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

    let err = result.unwrap_err();
    assert_eq!(err.exit_code(), ExitCode::ActionFailed);
    assert!(a.exists() && b.exists());
    assert_eq!(
        out.lines().collect::<Vec<_>>(),
        vec![
            "No (non-hard-link) duplicates found.",
            "1 actions failed; see the audit log."
        ]
    );

    let audit = audit_text(logs.path());
    assert!(audit.contains("fatal: permission denied"));
    assert!(audit.contains("tally deleted=0"));
}

#[test]
fn test_force_continues_past_failures() {
    let dir = tempdir().unwrap();
    let a = write_file(dir.path(), "a", b"dup");
    let b = write_file(dir.path(), "b", b"dup");
    let c = write_file(dir.path(), "c", b"dup");
    let d = write_file(dir.path(), "d", b"dup");

    let (groups, _) = DuplicateFinder::with_defaults()
        .find_duplicates_in_paths(&[dir.path().to_path_buf()])
        .unwrap();
    fs::remove_file(&b).unwrap();

    let report = Resolver::new(Mode::Delete, force())
        .unwrap()
        .resolve(&groups)
        .unwrap();

    assert!(a.exists());
    assert!(!c.exists());
    assert!(!d.exists());
    let kinds: Vec<_> = report.actions().map(|(_, a)| a.kind).collect();
    assert_eq!(
        kinds,
        vec![
            ActionKind::Failed { removed: false },
            ActionKind::Deleted {
                shares_inode: false
            },
            ActionKind::Deleted {
                shares_inode: false
            },
        ]
    );
    assert_eq!(report.failures.len(), 1);
}

#[test]
fn test_interrupt_before_resolution_deletes_nothing() {
    let dir = tempdir().unwrap();
    let a = write_file(dir.path(), "a", b"dup");
    let b = write_file(dir.path(), "b", b"dup");

    let (groups, _) = DuplicateFinder::with_defaults()
        .find_duplicates_in_paths(&[dir.path().to_path_buf()])
        .unwrap();

    let flag = Arc::new(AtomicBool::new(true));
    let err = Resolver::new(Mode::Hardlink, ResolvePolicy::default())
        .unwrap()
        .with_shutdown_flag(flag)
        .resolve(&groups)
        .unwrap_err();

    assert!(matches!(err, ResolveError::Interrupted { .. }));
    assert!(a.exists() && b.exists());
}

#[test]
fn test_groups_resolved_in_scan_order() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "a1", b"second-content");
    write_file(dir.path(), "b1", b"first-content");
    write_file(dir.path(), "b2", b"second-content");
    write_file(dir.path(), "c1", b"first-content");

    let (groups, _) = DuplicateFinder::with_defaults()
        .find_duplicates_in_paths(&[dir.path().to_path_buf()])
        .unwrap();
    let report = Resolver::new(Mode::Delete, ResolvePolicy::default())
        .unwrap()
        .resolve(&groups)
        .unwrap();

    let deleted: Vec<_> = report
        .actions()
        .map(|(_, a)| a.path.file_name().unwrap().to_str().unwrap().to_string())
        .collect();
    assert_eq!(deleted, vec!["b2", "c1"]);
}
