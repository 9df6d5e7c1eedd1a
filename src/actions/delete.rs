//! Filesystem mutations: removing duplicates and re-linking them.
//!
//! # Overview
//!
//! Two primitive operations back the resolver:
//! - [`remove_duplicate`]: permanently unlink one path
//! - [`link_to_original`]: create a hard link to the original at a path
//!   that was just removed
//!
//! Neither operation is retried or rolled back. A removal that succeeded
//! stays done even if the following link fails.
//!
//! # Example
//!
//! ```no_run
//! use linkdupe::actions::delete::{link_to_original, remove_duplicate};
//! use std::path::Path;
//!
//! let original = Path::new("/photos/a.jpg");
//! let copy = Path::new("/backup/a.jpg");
//! remove_duplicate(copy).unwrap();
//! link_to_original(original, copy).unwrap();
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Error type for deletion operations.
#[derive(Debug, Error)]
pub enum DeleteError {
    /// File was not found (may have been deleted or moved).
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    /// Permission denied when attempting to delete.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// General I/O error.
    #[error("delete failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl DeleteError {
    /// Get the path associated with this error.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound(p) | Self::PermissionDenied(p) | Self::Io { path: p, .. } => p,
        }
    }

    fn from_io(path: &Path, error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: error,
            },
        }
    }
}

/// Error replacing a duplicate with a hard link.
#[derive(Debug, Error)]
#[error("hard link {path} -> {original} failed: {source}")]
pub struct LinkError {
    /// Path where the link should have been created
    pub path: PathBuf,
    /// The original the link should point at
    pub original: PathBuf,
    /// Whether the duplicate at `path` was already removed
    pub removed: bool,
    /// The underlying I/O error
    #[source]
    pub source: io::Error,
}

impl LinkError {
    /// The duplicate lives on another device than the original, so no link
    /// can be made. Reported before anything is removed.
    #[must_use]
    pub fn cross_device(original: &Path, path: &Path) -> Self {
        log::error!(
            "Cannot link {} -> {}: different devices",
            path.display(),
            original.display()
        );
        Self {
            path: path.to_path_buf(),
            original: original.to_path_buf(),
            removed: false,
            source: io::Error::new(
                io::ErrorKind::Unsupported,
                "original is on a different device",
            ),
        }
    }
}

/// Permanently delete a single file.
///
/// **WARNING**: This operation cannot be undone.
///
/// # Errors
///
/// - `NotFound` if the file doesn't exist
/// - `PermissionDenied` if deletion is not allowed
/// - `Io` for any other failure
pub fn remove_duplicate(path: &Path) -> Result<(), DeleteError> {
    fs::remove_file(path).map_err(|e| {
        log::error!("Delete failed for {}: {}", path.display(), e);
        DeleteError::from_io(path, e)
    })?;

    log::info!("Deleted: {}", path.display());
    Ok(())
}

/// Create a hard link at `path` pointing to the storage of `original`.
///
/// # Errors
///
/// Returns a [`LinkError`] if the link cannot be created (cross-device,
/// permission, path reoccupied, ...).
pub fn link_to_original(original: &Path, path: &Path) -> Result<(), LinkError> {
    fs::hard_link(original, path).map_err(|e| {
        log::error!(
            "Hard link {} -> {} failed: {}",
            path.display(),
            original.display(),
            e
        );
        LinkError {
            path: path.to_path_buf(),
            original: original.to_path_buf(),
            removed: true,
            source: e,
        }
    })?;

    log::info!("Linked: {} -> {}", path.display(), original.display());
    Ok(())
}
