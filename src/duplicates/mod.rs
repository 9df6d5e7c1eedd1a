//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Full-content hashing of every scanned file
//! - Grouping by hash with canonical (first-scanned) ordering
//! - Scan summaries

pub mod finder;
pub mod groups;

pub use finder::{DuplicateFinder, FinderConfig, FinderError, ScanSummary, DEFAULT_IO_THREADS};
pub use groups::{
    canonical_order, group_by_hash, group_by_hash_with_stats, DuplicateGroup, GroupingStats,
};
