//! Device + inode identity keys.
//!
//! # Overview
//!
//! Hardlinks are multiple directory entries pointing to the same inode on disk.
//! They share content but are the same storage object: removing one of them
//! frees no space while another remains. Every scanned file carries an
//! [`InodeKey`] so the resolver can tell a real duplicate from a second name
//! of the original.
//!
//! # Platform Support
//!
//! - **Unix**: Uses (device_id, inode) pairs from file metadata
//! - **Other**: No inode is exposed by `std`; each path gets a unique
//!   synthetic key, so no two paths are ever considered hard links

use std::fs::Metadata;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

/// Device id used for synthetic keys on platforms without inode support.
const SYNTHETIC_DEV: u64 = u64::MAX;

static NEXT_SYNTHETIC_INO: AtomicU64 = AtomicU64::new(0);

/// Identity of the storage object behind a path.
///
/// Two paths with equal keys are hard links to each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InodeKey {
    dev: u64,
    ino: u64,
}

impl InodeKey {
    /// Create a key from raw device and inode numbers.
    #[must_use]
    pub const fn new(dev: u64, ino: u64) -> Self {
        Self { dev, ino }
    }

    /// Read the key from file metadata.
    ///
    /// Returns `None` where the platform doesn't expose inode information.
    #[cfg(unix)]
    #[must_use]
    pub fn from_metadata(metadata: &Metadata) -> Option<Self> {
        use std::os::unix::fs::MetadataExt;
        Some(Self {
            dev: metadata.dev(),
            ino: metadata.ino(),
        })
    }

    #[cfg(not(unix))]
    #[must_use]
    pub fn from_metadata(_metadata: &Metadata) -> Option<Self> {
        None
    }

    /// Read the key from metadata, or mint a unique synthetic key.
    #[must_use]
    pub fn from_metadata_or_unique(metadata: &Metadata) -> Self {
        Self::from_metadata(metadata).unwrap_or_else(Self::unique)
    }

    /// A key guaranteed not to equal any other key minted in this process.
    #[must_use]
    pub fn unique() -> Self {
        Self {
            dev: SYNTHETIC_DEV,
            ino: NEXT_SYNTHETIC_INO.fetch_add(1, Ordering::Relaxed),
        }
    }

    /// Look up the key of an existing path without following symlinks.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if the path cannot be inspected.
    pub fn of_path(path: &Path) -> std::io::Result<Self> {
        let metadata = std::fs::symlink_metadata(path)?;
        Ok(Self::from_metadata_or_unique(&metadata))
    }

    /// Device id.
    #[must_use]
    pub const fn dev(&self) -> u64 {
        self.dev
    }

    /// Inode number (the identity column of the listing).
    #[must_use]
    pub const fn ino(&self) -> u64 {
        self.ino
    }

    /// Whether hard-link detection is supported on this platform.
    #[must_use]
    pub const fn is_supported() -> bool {
        cfg!(unix)
    }
}
