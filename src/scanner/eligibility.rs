//! Eligibility rules for directory entries.
//!
//! An entry participates in deduplication only if it is a regular file,
//! is not one of the Finder metadata files (`.DS_Store`, `.localized`), and
//! is not nested inside a directory whose name contains a `.`. The last rule
//! keeps the internals of bundle-style directories (`Foo.app/`, `Bar.photoslibrary/`)
//! and hidden directories (`.git/`) out of the scan.
//!
//! Paths are judged relative to the scan root they were found under.
//!
//! # Example
//!
//! ```
//! use linkdupe::scanner::{is_eligible, EntryKind};
//! use std::path::Path;
//!
//! assert!(is_eligible(Path::new("docs/report.pdf"), EntryKind::File));
//! assert!(!is_eligible(Path::new("Tool.app/Contents/Info.plist"), EntryKind::File));
//! assert!(!is_eligible(Path::new("photos/.DS_Store"), EntryKind::File));
//! ```

use std::ffi::OsStr;
use std::fs::FileType;
use std::path::{Component, Path};

/// File names that are never deduplicated.
pub const EXCLUDED_NAMES: [&str; 2] = [".DS_Store", ".localized"];

/// Kind of a directory entry, as reported without following symlinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Regular file
    File,
    /// Directory
    Dir,
    /// Symbolic link
    Symlink,
    /// Sockets, FIFOs, devices, ...
    Other,
}

impl From<FileType> for EntryKind {
    fn from(file_type: FileType) -> Self {
        if file_type.is_symlink() {
            Self::Symlink
        } else if file_type.is_dir() {
            Self::Dir
        } else if file_type.is_file() {
            Self::File
        } else {
            Self::Other
        }
    }
}

/// Decide whether an entry takes part in deduplication.
///
/// # Arguments
///
/// * `relative` - Path of the entry relative to its scan root
/// * `kind` - Entry kind (symlinks not followed)
#[must_use]
pub fn is_eligible(relative: &Path, kind: EntryKind) -> bool {
    if kind != EntryKind::File {
        return false;
    }

    let Some(name) = relative.file_name() else {
        return false;
    };
    if is_excluded_name(name) {
        return false;
    }

    match relative.parent() {
        Some(parent) => !has_dotted_segment(parent),
        None => true,
    }
}

/// Whether a file name is one of [`EXCLUDED_NAMES`].
#[must_use]
pub fn is_excluded_name(name: &OsStr) -> bool {
    EXCLUDED_NAMES.iter().any(|excluded| name == OsStr::new(excluded))
}

/// Whether a directory name would exclude everything below it.
#[must_use]
pub fn is_dotted_dir_name(name: &OsStr) -> bool {
    name.to_string_lossy().contains('.')
}

fn has_dotted_segment(dir: &Path) -> bool {
    dir.components().any(|component| match component {
        Component::Normal(segment) => is_dotted_dir_name(segment),
        // `.` and `..` are path syntax, not directory names
        _ => false,
    })
}
