use super::common::write_file;
use linkdupe::duplicates::{DuplicateFinder, FinderConfig};
use linkdupe::scanner::{hash_to_hex, scan, Hasher};
use std::fs;
use tempfile::tempdir;

#[test]
fn test_hello_world_grouping() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "a.txt", b"hello");
    write_file(dir.path(), "b.txt", b"hello");
    write_file(dir.path(), "c.txt", b"world");

    let finder = DuplicateFinder::with_defaults();
    let (groups, summary) = finder
        .find_duplicates_in_paths(&[dir.path().to_path_buf()])
        .unwrap();

    assert_eq!(groups.len(), 1);
    let names: Vec<_> = groups[0]
        .files
        .iter()
        .map(|f| f.path.file_name().unwrap().to_str().unwrap())
        .collect();
    assert_eq!(names, vec!["a.txt", "b.txt"]);
    assert_eq!(groups[0].hash, Hasher::hash_bytes(b"hello"));
    assert_eq!(summary.total_files, 3);
    assert_eq!(summary.reclaimable_space, 5);
}

#[test]
fn test_same_size_different_content_not_grouped() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "a", b"abcd");
    write_file(dir.path(), "b", b"abce");

    let (groups, _) = DuplicateFinder::with_defaults()
        .find_duplicates_in_paths(&[dir.path().to_path_buf()])
        .unwrap();
    assert!(groups.is_empty());
}

#[test]
fn test_large_files_differing_late_not_grouped() {
    let dir = tempdir().unwrap();
    let mut a = vec![7u8; 200_000];
    let b = a.clone();
    write_file(dir.path(), "b", &b);
    *a.last_mut().unwrap() = 8;
    write_file(dir.path(), "a", &a);
    write_file(dir.path(), "c", &b);

    let (groups, _) = DuplicateFinder::with_defaults()
        .find_duplicates_in_paths(&[dir.path().to_path_buf()])
        .unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].len(), 2);
    assert_eq!(hash_to_hex(&groups[0].hash), hash_to_hex(&Hasher::hash_bytes(&b)));
}

#[test]
fn test_excluded_names_and_dotted_directories() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "keep1", b"same");
    write_file(dir.path(), "keep2", b"same");
    write_file(dir.path(), ".DS_Store", b"same");
    write_file(dir.path(), "sub/.localized", b"same");
    write_file(dir.path(), "my.app/inner", b"same");
    write_file(dir.path(), "a/.git/deep/file", b"same");
    // A dotted file name is fine
    write_file(dir.path(), "notes.txt", b"same");

    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_duplicates_in_paths(&[dir.path().to_path_buf()])
        .unwrap();

    assert_eq!(summary.total_files, 3);
    let names: Vec<_> = groups[0]
        .files
        .iter()
        .map(|f| f.path.file_name().unwrap().to_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["keep1", "keep2", "notes.txt"]);
}

#[test]
fn test_root_with_dot_in_name_is_scanned() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("My.Folder");
    write_file(&root, "a", b"x");
    write_file(&root, "b", b"x");

    let entries = scan(&[root.clone()], None).unwrap();
    assert_eq!(entries.len(), 2);

    let dated = dir.path().join("photos.2020");
    write_file(&dated, "a.txt", b"hello");
    write_file(&dated, "b.txt", b"hello");
    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_duplicates_in_paths(&[dated])
        .unwrap();
    assert_eq!(summary.total_files, 2);
    assert_eq!(groups.len(), 1);
}

#[test]
fn test_empty_files_are_duplicates_of_each_other() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "e1", b"");
    write_file(dir.path(), "e2", b"");

    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_duplicates_in_paths(&[dir.path().to_path_buf()])
        .unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(summary.reclaimable_space, 0);
}

#[test]
fn test_scan_order_is_sorted_and_recursive() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "z/1", b"q");
    write_file(dir.path(), "a/2", b"q");
    write_file(dir.path(), "m", b"q");

    let entries = scan(&[dir.path().to_path_buf()], None).unwrap();
    let rel: Vec<_> = entries
        .iter()
        .map(|e| {
            e.path
                .strip_prefix(dir.path().canonicalize().unwrap())
                .unwrap()
                .to_path_buf()
        })
        .collect();

    assert_eq!(
        rel,
        vec![
            std::path::PathBuf::from("a/2"),
            std::path::PathBuf::from("m"),
            std::path::PathBuf::from("z/1"),
        ]
    );
    let orders: Vec<_> = entries.iter().map(|e| e.order).collect();
    assert_eq!(orders, vec![0, 1, 2]);
}

#[test]
fn test_single_io_thread_gives_same_result() {
    let dir = tempdir().unwrap();
    for i in 0..20 {
        write_file(dir.path(), &format!("f{i:02}"), format!("{}", i % 4).as_bytes());
    }

    let roots = [dir.path().to_path_buf()];
    let (one, _) = DuplicateFinder::new(FinderConfig::default().with_io_threads(1))
        .find_duplicates_in_paths(&roots)
        .unwrap();
    let (many, _) = DuplicateFinder::new(FinderConfig::default().with_io_threads(8))
        .find_duplicates_in_paths(&roots)
        .unwrap();

    assert_eq!(one, many);
    assert_eq!(one.len(), 4);
}

#[test]
#[cfg(unix)]
fn test_symlinks_ignored() {
    let dir = tempdir().unwrap();
    let target = write_file(dir.path(), "target", b"data");
    std::os::unix::fs::symlink(&target, dir.path().join("link")).unwrap();
    fs::create_dir(dir.path().join("real")).unwrap();
    std::os::unix::fs::symlink(dir.path().join("real"), dir.path().join("dirlink")).unwrap();

    let entries = scan(&[dir.path().to_path_buf()], None).unwrap();
    assert_eq!(entries.len(), 1);
    assert!(entries[0].path.ends_with("target"));
}
