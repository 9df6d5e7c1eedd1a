//! Duplicate finder implementation.
//!
//! # Overview
//!
//! This module orchestrates the detection pipeline:
//! 1. **Scan**: walk every root and collect eligible, physically unique files
//!    in scan order (see [`crate::scanner::multi`])
//! 2. **Fingerprint**: hash the full content of every file on a bounded
//!    rayon pool
//! 3. **Group**: partition by hash and order canonically (see
//!    [`crate::duplicates::groups`])
//!
//! Every file is hashed; there is no size or prehash elimination step, so
//! every group is backed by a digest over the complete content. Files that
//! vanish or become unreadable between scan and hash are left out of grouping
//! and reported in [`ScanSummary::hash_errors`].
//!
//! # Example
//!
//! ```no_run
//! use linkdupe::duplicates::{DuplicateFinder, FinderConfig};
//! use std::path::PathBuf;
//!
//! let finder = DuplicateFinder::new(FinderConfig::default().with_io_threads(4));
//! let (groups, summary) = finder
//!     .find_duplicates_in_paths(&[PathBuf::from("/some/path")])
//!     .unwrap();
//!
//! println!("Found {} duplicate groups", summary.duplicate_groups);
//! ```

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::prelude::*;

use super::groups::{group_by_hash_with_stats, DuplicateGroup};
use crate::progress::{ProgressCallback, PHASE_HASHING, PHASE_WALKING};
use crate::scanner::{FileEntry, FileRecord, Hash, HashError, Hasher, MultiWalker, ScanError};

/// Default number of concurrent hashing threads.
pub const DEFAULT_IO_THREADS: usize = 4;

/// Configuration for the duplicate finder.
#[derive(Clone)]
pub struct FinderConfig {
    /// Number of I/O threads for parallel hashing.
    pub io_threads: usize,
    /// Shutdown flag shared with walkers and the hasher.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Progress reporting.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderConfig")
            .field("io_threads", &self.io_threads)
            .field("shutdown_flag", &self.shutdown_flag.is_some())
            .field("progress_callback", &self.progress_callback.is_some())
            .finish()
    }
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            io_threads: DEFAULT_IO_THREADS,
            shutdown_flag: None,
            progress_callback: None,
        }
    }
}

impl FinderConfig {
    /// Set the number of hashing threads (at least 1).
    #[must_use]
    pub fn with_io_threads(mut self, threads: usize) -> Self {
        self.io_threads = threads.max(1);
        self
    }

    /// Set the shutdown flag.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }
}

/// Summary statistics from a scan.
#[derive(Debug, Default)]
pub struct ScanSummary {
    /// Canonical roots that were walked
    pub roots: Vec<PathBuf>,
    /// Eligible, physically unique files found
    pub total_files: usize,
    /// Combined size of those files
    pub total_size: u64,
    /// Files hashed successfully
    pub hashed_files: usize,
    /// Files left out because they could not be hashed
    pub hash_errors: Vec<HashError>,
    /// Number of duplicate groups
    pub duplicate_groups: usize,
    /// Files that belong to some group (originals included)
    pub duplicate_files: usize,
    /// Bytes reclaimable by removing physically distinct copies
    pub reclaimable_space: u64,
    /// Wall time of the scan
    pub scan_duration: Duration,
}

/// Errors that can occur during duplicate finding.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// The scan was interrupted by user (Ctrl+C or shutdown signal).
    #[error("Scan interrupted by user")]
    Interrupted,

    /// Enumeration failed, or a root is invalid.
    #[error(transparent)]
    Scan(#[from] ScanError),
}

impl FinderError {
    /// Whether the error is about an invalid search root.
    #[must_use]
    pub fn is_invalid_root(&self) -> bool {
        matches!(self, Self::Scan(e) if e.is_invalid_root())
    }
}

/// Duplicate finder that orchestrates scan, hash and grouping.
pub struct DuplicateFinder {
    config: FinderConfig,
    hasher: Arc<Hasher>,
}

impl DuplicateFinder {
    /// Create a new duplicate finder with the given configuration.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        let mut hasher = Hasher::new();
        if let Some(ref flag) = config.shutdown_flag {
            hasher = hasher.with_shutdown_flag(flag.clone());
        }
        Self {
            config,
            hasher: Arc::new(hasher),
        }
    }

    /// Create a new duplicate finder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(FinderConfig::default())
    }

    /// Find all duplicate files under the given roots.
    ///
    /// # Errors
    ///
    /// Returns `FinderError` if:
    /// - A root does not exist or is not a directory
    /// - Directory traversal fails
    /// - The scan is interrupted by shutdown signal
    pub fn find_duplicates_in_paths(
        &self,
        paths: &[PathBuf],
    ) -> Result<(Vec<DuplicateGroup>, ScanSummary), FinderError> {
        let start_time = Instant::now();

        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        let mut walker = MultiWalker::new(paths)?;
        if let Some(ref flag) = self.config.shutdown_flag {
            walker = walker.with_shutdown_flag(flag.clone());
        }
        if let Some(ref callback) = self.config.progress_callback {
            walker = walker.with_progress_callback(callback.clone());
        }

        log::info!(
            "Scanning {} directory root(s): {:?}",
            walker.roots().len(),
            walker.roots().iter().map(|p| p.display()).collect::<Vec<_>>()
        );

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_start(PHASE_WALKING, walker.roots().len());
        }
        let walked = walker.walk();
        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_end(PHASE_WALKING);
        }
        let entries = walked?;

        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        let roots = walker.roots().to_vec();
        let (groups, mut summary) = self.find_duplicates_from_entries(entries)?;
        summary.roots = roots;
        summary.scan_duration = start_time.elapsed();
        Ok((groups, summary))
    }

    /// Hash and group already-scanned entries.
    ///
    /// Entries are expected in scan order with distinct `order` values.
    ///
    /// # Errors
    ///
    /// Returns `Interrupted` if shutdown was requested while hashing.
    pub fn find_duplicates_from_entries(
        &self,
        entries: Vec<FileEntry>,
    ) -> Result<(Vec<DuplicateGroup>, ScanSummary), FinderError> {
        let start_time = Instant::now();
        let mut summary = ScanSummary {
            total_files: entries.len(),
            total_size: entries.iter().map(|e| e.size).sum(),
            ..Default::default()
        };

        log::info!(
            "Found {} files ({} bytes total)",
            summary.total_files,
            summary.total_size
        );

        let results = self.hash_all(entries);

        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        let mut records = Vec::with_capacity(results.len());
        for (entry, result) in results {
            match result {
                Ok(hash) => records.push(FileRecord::from_entry(entry, hash)),
                Err(e) => {
                    log::warn!("Skipping unhashable file: {}", e);
                    summary.hash_errors.push(e);
                }
            }
        }
        summary.hashed_files = records.len();

        let (groups, stats) = group_by_hash_with_stats(records);
        summary.duplicate_groups = stats.duplicate_groups;
        summary.duplicate_files = stats.duplicate_files;
        summary.reclaimable_space = groups.iter().map(DuplicateGroup::reclaimable_space).sum();
        summary.scan_duration = start_time.elapsed();

        log::info!(
            "Scan complete: {} groups, {} files in groups, {} bytes reclaimable",
            summary.duplicate_groups,
            summary.duplicate_files,
            summary.reclaimable_space
        );

        Ok((groups, summary))
    }

    /// Hash every entry on a pool bounded by `io_threads`, preserving input
    /// order in the output.
    fn hash_all(&self, entries: Vec<FileEntry>) -> Vec<(FileEntry, Result<Hash, HashError>)> {
        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_start(PHASE_HASHING, entries.len());
        }

        let hash_one = |entry: FileEntry| {
            if self.config.is_shutdown_requested() {
                let err = HashError::Interrupted(entry.path.clone());
                return (entry, Err(err));
            }
            if let Some(ref callback) = self.config.progress_callback {
                callback.on_progress(entry.order, &entry.path.to_string_lossy());
            }
            let result = self.hasher.full_hash(&entry.path);
            if let Some(ref callback) = self.config.progress_callback {
                callback.on_item_completed(entry.size);
            }
            log::trace!("Hashed {}", entry.path.display());
            (entry, result)
        };

        let results: Vec<(FileEntry, Result<Hash, HashError>)> = match rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.io_threads)
            .build()
        {
            Ok(pool) => pool.install(|| entries.into_par_iter().map(hash_one).collect()),
            Err(e) => {
                log::warn!(
                    "Failed to create hashing pool ({}), using global pool with {} threads",
                    e,
                    rayon::current_num_threads()
                );
                entries.into_par_iter().map(hash_one).collect()
            }
        };

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_end(PHASE_HASHING);
        }
        results
    }
}
