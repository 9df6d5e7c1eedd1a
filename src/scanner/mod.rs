//! Scanner module for directory traversal and file hashing.
//!
//! This module provides functionality for:
//! - Eligibility filtering of directory entries
//! - Parallel directory walking using jwalk
//! - Multi-root scanning with identity deduplication
//! - Content hashing with BLAKE3
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`eligibility`]: Pure predicate deciding which entries participate
//! - [`walker`]: Single-root traversal and file discovery
//! - [`multi`]: Multi-root scanning and the dedup serialization point
//! - [`hardlink`]: Device + inode identity keys
//! - [`hasher`]: BLAKE3 file hashing (streaming)
//!
//! # Example
//!
//! ```no_run
//! use linkdupe::scanner::scan;
//! use std::path::PathBuf;
//!
//! let entries = scan(&[PathBuf::from(".")], None).unwrap();
//! for entry in &entries {
//!     println!("{} {} {}", entry.inode.ino(), entry.size, entry.path.display());
//! }
//! ```

pub mod eligibility;
pub mod hardlink;
pub mod hasher;
pub mod multi;
pub mod walker;

use std::path::PathBuf;

// Re-export main types
pub use eligibility::{is_eligible, EntryKind};
pub use hardlink::InodeKey;
pub use hasher::{hash_to_hex, hex_to_hash, Hash, Hasher};
pub use multi::{scan, validate_root, MultiWalker};
pub use walker::Walker;

/// A discovered file, as captured by the scanner.
///
/// The `order` field is the file's position in the global scan order and is
/// what canonical selection is based on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Absolute path to the file
    pub path: PathBuf,
    /// Identity of the underlying storage object
    pub inode: InodeKey,
    /// File size in bytes
    pub size: u64,
    /// Position in the scan order (0-based)
    pub order: usize,
}

impl FileEntry {
    /// Create a new FileEntry.
    #[must_use]
    pub fn new(path: PathBuf, inode: InodeKey, size: u64, order: usize) -> Self {
        Self {
            path,
            inode,
            size,
            order,
        }
    }
}

/// A scanned file together with its content fingerprint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Absolute path to the file
    pub path: PathBuf,
    /// Identity of the underlying storage object
    pub inode: InodeKey,
    /// File size in bytes at scan time
    pub size: u64,
    /// Position in the scan order (0-based)
    pub order: usize,
    /// BLAKE3 digest of the full content
    pub hash: Hash,
}

impl FileRecord {
    /// Attach a computed hash to a scanned entry.
    #[must_use]
    pub fn from_entry(entry: FileEntry, hash: Hash) -> Self {
        Self {
            path: entry.path,
            inode: entry.inode,
            size: entry.size,
            order: entry.order,
            hash,
        }
    }

    /// Whether this record and `other` are hard links to the same storage.
    #[must_use]
    pub fn shares_inode_with(&self, other: &FileRecord) -> bool {
        self.inode == other.inode
    }
}

/// Errors that can occur during directory scanning.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// A search root does not exist.
    #[error("Search path not found: {0}")]
    RootNotFound(PathBuf),

    /// A search root exists but is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// The scan was interrupted by a shutdown request.
    #[error("Scan interrupted by user")]
    Interrupted,

    /// Permission was denied when accessing a file or directory.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// An entry vanished between being listed and being inspected.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// An I/O error occurred while accessing a file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The traversal itself failed (unreadable directory, loop, ...).
    #[error("Directory traversal failed at {path}: {message}")]
    Walk {
        /// Path where the traversal failed
        path: PathBuf,
        /// Error reported by the walker
        message: String,
    },
}

impl ScanError {
    /// Whether this error is about an invalid search root rather than a
    /// failure during traversal.
    #[must_use]
    pub fn is_invalid_root(&self) -> bool {
        matches!(self, Self::RootNotFound(_) | Self::NotADirectory(_))
    }

    /// Classify an I/O error for `path` into a scan error.
    pub(crate) fn from_io(path: PathBuf, error: std::io::Error) -> Self {
        match error.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path),
            std::io::ErrorKind::NotFound => Self::NotFound(path),
            _ => Self::Io {
                path,
                source: error,
            },
        }
    }
}

/// Errors that can occur during file hashing.
#[derive(thiserror::Error, Debug)]
pub enum HashError {
    /// The specified file was not found.
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Permission was denied when reading the file.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// An I/O error occurred while reading the file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Hashing was abandoned because shutdown was requested.
    #[error("Hashing interrupted: {0}")]
    Interrupted(PathBuf),
}

impl HashError {
    /// Path of the file that could not be hashed.
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::NotFound(p) | Self::PermissionDenied(p) | Self::Interrupted(p) => p,
            Self::Io { path, .. } => path,
        }
    }
}
