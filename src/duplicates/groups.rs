//! Duplicate grouping and canonical ordering.
//!
//! # Overview
//!
//! [`group_by_hash`] partitions hashed files by digest, discards digests
//! seen only once, and orders each group canonical-first. The canonical
//! member (the "original") is the file encountered first during the scan;
//! [`canonical_order`] is the comparator that decides it.
//!
//! Groups themselves are returned in the scan order of their originals, so
//! the whole result is a pure function of the scan order.
//!
//! # Example
//!
//! ```
//! use linkdupe::duplicates::group_by_hash;
//! use linkdupe::scanner::{FileEntry, FileRecord, InodeKey};
//! use std::path::PathBuf;
//!
//! let record = |name: &str, ino: u64, order: usize, hash: u8| {
//!     let entry = FileEntry::new(PathBuf::from(name), InodeKey::new(1, ino), 5, order);
//!     FileRecord::from_entry(entry, [hash; 32])
//! };
//!
//! let groups = group_by_hash(vec![
//!     record("/a.txt", 10, 0, 1),
//!     record("/b.txt", 11, 1, 1),
//!     record("/c.txt", 12, 2, 2),
//! ]);
//!
//! assert_eq!(groups.len(), 1);
//! assert_eq!(groups[0].original().path, PathBuf::from("/a.txt"));
//! ```

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::scanner::{FileRecord, Hash};

/// Confirmed duplicate group of files.
///
/// Always holds at least two members, all with the same hash, ordered
/// canonical-first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateGroup {
    /// BLAKE3 hash of the file content (32 bytes)
    pub hash: Hash,
    /// Members, canonical first
    pub files: Vec<FileRecord>,
}

impl DuplicateGroup {
    /// Build a group, sorting the members canonically.
    ///
    /// Returns `None` for fewer than two members.
    #[must_use]
    pub fn new(hash: Hash, mut files: Vec<FileRecord>) -> Option<Self> {
        if files.len() < 2 {
            return None;
        }
        debug_assert!(files.iter().all(|f| f.hash == hash));
        files.sort_by(canonical_order);
        Some(Self { hash, files })
    }

    /// The member that is never deleted.
    #[must_use]
    pub fn original(&self) -> &FileRecord {
        &self.files[0]
    }

    /// Every member except the original, in canonical order.
    #[must_use]
    pub fn duplicates(&self) -> &[FileRecord] {
        &self.files[1..]
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Groups are never empty; provided for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Size of the original file in bytes.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.original().size
    }

    /// Duplicates that are physically distinct from the original.
    #[must_use]
    pub fn independent_copies(&self) -> usize {
        let original = self.original();
        self.duplicates()
            .iter()
            .filter(|f| !f.shares_inode_with(original))
            .count()
    }

    /// Bytes that deleting every independent copy would reclaim.
    #[must_use]
    pub fn reclaimable_space(&self) -> u64 {
        self.size() * self.independent_copies() as u64
    }
}

/// Canonical tie-break: earlier in the scan wins.
///
/// Scan order is unique per record, so this is a total order; path is a
/// final fallback for records built by hand with equal orders.
#[must_use]
pub fn canonical_order(a: &FileRecord, b: &FileRecord) -> Ordering {
    a.order.cmp(&b.order).then_with(|| a.path.cmp(&b.path))
}

/// Statistics about a grouping pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupingStats {
    /// Records that went in
    pub total_files: usize,
    /// Records that ended up in a group
    pub duplicate_files: usize,
    /// Number of groups
    pub duplicate_groups: usize,
}

/// Partition records by hash, keep groups of two or more, order canonically.
#[must_use]
pub fn group_by_hash(records: Vec<FileRecord>) -> Vec<DuplicateGroup> {
    group_by_hash_with_stats(records).0
}

/// [`group_by_hash`] plus statistics.
#[must_use]
pub fn group_by_hash_with_stats(records: Vec<FileRecord>) -> (Vec<DuplicateGroup>, GroupingStats) {
    let mut stats = GroupingStats {
        total_files: records.len(),
        ..Default::default()
    };

    let mut partitions: HashMap<Hash, Vec<FileRecord>> = HashMap::new();
    for record in records {
        partitions.entry(record.hash).or_default().push(record);
    }

    let mut groups: Vec<DuplicateGroup> = partitions
        .into_iter()
        .filter_map(|(hash, files)| DuplicateGroup::new(hash, files))
        .collect();
    groups.sort_by(|a, b| canonical_order(a.original(), b.original()));

    stats.duplicate_groups = groups.len();
    stats.duplicate_files = groups.iter().map(DuplicateGroup::len).sum();

    log::debug!(
        "Grouping: {} files -> {} groups with {} members",
        stats.total_files,
        stats.duplicate_groups,
        stats.duplicate_files
    );

    (groups, stats)
}
