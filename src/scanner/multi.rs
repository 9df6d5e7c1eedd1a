//! Multi-root scanning.
//!
//! # Overview
//!
//! [`MultiWalker`] validates and canonicalizes every root, walks independent
//! roots concurrently, and then - once every root has finished - removes
//! repeat sightings of the same directory entry. A file reached through two
//! roots (the same root given twice, or a root nested in another) is kept
//! once, at the first position it was seen. Distinct paths to the same inode
//! are *not* merged: those are hard links, and the resolver needs to see them.
//!
//! Scan order is the order the roots were given, then the sorted walk order
//! within each root.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rayon::prelude::*;

use super::hardlink::InodeKey;
use super::walker::Walker;
use super::{FileEntry, ScanError};
use crate::progress::ProgressCallback;

/// Validate a search root and return its canonical form.
///
/// # Errors
///
/// - `RootNotFound` if the path does not exist
/// - `NotADirectory` if it exists but is not a directory
/// - `PermissionDenied` / `Io` if it cannot be inspected or canonicalized
pub fn validate_root(path: &Path) -> Result<PathBuf, ScanError> {
    let metadata = match std::fs::metadata(path) {
        Ok(m) => m,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ScanError::RootNotFound(path.to_path_buf()));
        }
        Err(e) => return Err(ScanError::from_io(path.to_path_buf(), e)),
    };

    if !metadata.is_dir() {
        return Err(ScanError::NotADirectory(path.to_path_buf()));
    }

    std::fs::canonicalize(path).map_err(|e| ScanError::from_io(path.to_path_buf(), e))
}

/// Walker over several roots.
pub struct MultiWalker {
    roots: Vec<PathBuf>,
    shutdown_flag: Option<Arc<AtomicBool>>,
    progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for MultiWalker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultiWalker")
            .field("roots", &self.roots)
            .field("shutdown_flag", &self.shutdown_flag.is_some())
            .field("progress_callback", &self.progress_callback.is_some())
            .finish()
    }
}

impl MultiWalker {
    /// Validate and canonicalize `paths`, dropping exact repeats.
    ///
    /// # Errors
    ///
    /// Fails on the first root that does not exist or is not a directory.
    pub fn new(paths: &[PathBuf]) -> Result<Self, ScanError> {
        let mut roots: Vec<PathBuf> = Vec::with_capacity(paths.len());
        for path in paths {
            let root = validate_root(path)?;
            if roots.contains(&root) {
                log::debug!("Ignoring repeated root: {}", path.display());
                continue;
            }
            roots.push(root);
        }
        Ok(Self {
            roots,
            shutdown_flag: None,
            progress_callback: None,
        })
    }

    /// Set the shutdown flag shared with every per-root walker.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set a progress callback notified once per completed root.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Canonical roots that will be walked, in the order given.
    #[must_use]
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Walk every root and return the deduplicated entries in scan order.
    ///
    /// # Errors
    ///
    /// Returns the first [`ScanError`] hit by any root's traversal, in root
    /// order.
    pub fn walk(&self) -> Result<Vec<FileEntry>, ScanError> {
        let per_root: Vec<Result<Vec<FileEntry>, ScanError>> = self
            .roots
            .par_iter()
            .map(|root| {
                let mut walker = Walker::new(root);
                if let Some(ref flag) = self.shutdown_flag {
                    walker = walker.with_shutdown_flag(flag.clone());
                }
                let files = walker.walk().collect::<Result<Vec<_>, _>>()?;
                log::debug!("Root {}: {} eligible file(s)", root.display(), files.len());
                if let Some(ref callback) = self.progress_callback {
                    callback.on_progress(files.len(), &root.to_string_lossy());
                }
                Ok(files)
            })
            .collect();

        // Serialization point: every root is complete before deduplication
        let mut all = Vec::new();
        for files in per_root {
            all.extend(files?);
        }
        Ok(dedup_entries(all))
    }

    pub(crate) fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }
}

/// Keep the first sighting of every (identity, path) pair and assign the
/// global scan order.
#[must_use]
pub fn dedup_entries(entries: Vec<FileEntry>) -> Vec<FileEntry> {
    let mut seen: HashSet<(InodeKey, PathBuf)> = HashSet::with_capacity(entries.len());
    let mut kept = Vec::with_capacity(entries.len());

    for entry in entries {
        if !seen.insert((entry.inode, entry.path.clone())) {
            log::trace!("Already scanned via another root: {}", entry.path.display());
            continue;
        }
        kept.push(entry);
    }

    for (order, entry) in kept.iter_mut().enumerate() {
        entry.order = order;
    }
    kept
}

/// Scan `roots` and return every eligible, physically unique entry.
///
/// # Errors
///
/// - `RootNotFound` / `NotADirectory` for an invalid root
/// - any traversal failure
/// - `Interrupted` if shutdown was requested during the walk
pub fn scan(
    roots: &[PathBuf],
    shutdown_flag: Option<Arc<AtomicBool>>,
) -> Result<Vec<FileEntry>, ScanError> {
    let mut walker = MultiWalker::new(roots)?;
    if let Some(flag) = shutdown_flag {
        walker = walker.with_shutdown_flag(flag);
    }
    let entries = walker.walk()?;
    if walker.is_shutdown_requested() {
        return Err(ScanError::Interrupted);
    }
    Ok(entries)
}
