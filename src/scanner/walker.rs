//! Directory walker implementation using jwalk for parallel traversal.
//!
//! # Overview
//!
//! This module provides the [`Walker`] struct for traversing one scan root
//! and collecting the eligible files in it. It uses [`jwalk`] for parallel
//! directory reading while still yielding entries in a deterministic order:
//! children of every directory are sorted by file name, so the scan order of
//! a fixed tree is reproducible from run to run.
//!
//! # Features
//!
//! - Parallel directory traversal on a rayon pool of its own, so roots
//!   walked concurrently never starve each other
//! - Symlinks are reported but never followed
//! - Directories with a `.` in their name are pruned without being read
//! - Graceful shutdown via atomic flag
//!
//! # Example
//!
//! ```no_run
//! use linkdupe::scanner::Walker;
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("/home/user/Pictures"));
//! for entry in walker.walk() {
//!     match entry {
//!         Ok(file) => println!("{}: {} bytes", file.path.display(), file.size),
//!         Err(e) => eprintln!("Scan failed: {}", e),
//!     }
//! }
//! ```

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use jwalk::{Parallelism, WalkDir};

use super::eligibility::{is_dotted_dir_name, is_eligible, EntryKind};
use super::hardlink::InodeKey;
use super::{FileEntry, ScanError};

/// Directory walker for one scan root.
#[derive(Debug)]
pub struct Walker {
    /// Root path to walk
    root: PathBuf,
    /// Optional shutdown flag for graceful termination
    shutdown_flag: Option<Arc<AtomicBool>>,
}

impl Walker {
    /// Create a new walker for the given root directory.
    #[must_use]
    pub fn new(path: &Path) -> Self {
        Self {
            root: path.to_path_buf(),
            shutdown_flag: None,
        }
    }

    /// Set the shutdown flag for graceful termination.
    ///
    /// When the flag is set to `true`, the walker will stop iteration
    /// as soon as possible.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Root this walker traverses.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Walk the directory tree, yielding eligible file entries.
    ///
    /// Entries carry a root-local `order`; [`MultiWalker`](super::MultiWalker)
    /// renumbers them into the global scan order. Traversal failures are
    /// yielded as [`ScanError`] values.
    pub fn walk(&self) -> impl Iterator<Item = Result<FileEntry, ScanError>> + '_ {
        let walk_dir = WalkDir::new(&self.root)
            .follow_links(false)
            .skip_hidden(false)
            .parallelism(Parallelism::RayonNewPool(0))
            .process_read_dir(|depth, _path, _read_dir_state, children| {
                // Sort children for deterministic output
                children.sort_by(|a, b| match (a, b) {
                    (Ok(a), Ok(b)) => a.file_name().cmp(b.file_name()),
                    (Ok(_), Err(_)) => std::cmp::Ordering::Less,
                    (Err(_), Ok(_)) => std::cmp::Ordering::Greater,
                    (Err(_), Err(_)) => std::cmp::Ordering::Equal,
                });
                // The root itself arrives with no depth and is never pruned
                if depth.is_none() {
                    return;
                }
                // Nothing below a dotted directory is eligible; don't read it
                for entry in children.iter_mut().flatten() {
                    if entry.file_type().is_dir() && is_dotted_dir_name(entry.file_name()) {
                        entry.read_children_path = None;
                    }
                }
            });

        let mut order = 0usize;

        walk_dir.into_iter().filter_map(move |entry_result| {
            if self.is_shutdown_requested() {
                log::debug!("Walker: Shutdown requested, stopping iteration");
                return None;
            }

            match entry_result {
                Ok(entry) => {
                    if entry.depth() == 0 {
                        return None;
                    }

                    let path = entry.path();
                    let kind = EntryKind::from(entry.file_type());
                    let relative = path.strip_prefix(&self.root).unwrap_or(&path);

                    if !is_eligible(relative, kind) {
                        if kind == EntryKind::File || kind == EntryKind::Symlink {
                            log::trace!("Skipping ineligible entry: {}", path.display());
                        }
                        return None;
                    }

                    let metadata = match std::fs::symlink_metadata(&path) {
                        Ok(m) => m,
                        Err(e) => {
                            log::warn!("Cannot stat {}: {}", path.display(), e);
                            return Some(Err(ScanError::from_io(path, e)));
                        }
                    };

                    // Re-check: the entry may have been replaced since listing
                    if !metadata.is_file() {
                        return None;
                    }

                    let file = FileEntry::new(
                        path,
                        InodeKey::from_metadata_or_unique(&metadata),
                        metadata.len(),
                        order,
                    );
                    order += 1;
                    Some(Ok(file))
                }
                Err(e) => Some(Err(self.handle_jwalk_error(e))),
            }
        })
    }

    /// Convert a jwalk error, keeping permission failures distinguishable.
    fn handle_jwalk_error(&self, error: jwalk::Error) -> ScanError {
        let path = error
            .path()
            .map_or_else(|| self.root.clone(), std::borrow::ToOwned::to_owned);
        log::warn!("Walker error for {}: {}", path.display(), error);

        match error.io_error().map(std::io::Error::kind) {
            Some(std::io::ErrorKind::PermissionDenied) => ScanError::PermissionDenied(path),
            Some(std::io::ErrorKind::NotFound) => ScanError::NotFound(path),
            _ => ScanError::Walk {
                path,
                message: error.to_string(),
            },
        }
    }
}
