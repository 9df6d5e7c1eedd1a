//! Per-group resolution plans.
//!
//! A [`ResolutionPlan`] fixes the original of a group and lists every other
//! member, in canonical order, together with whether it is already a hard
//! link to the original. Plans are built before any mutation of the group
//! starts, so the original cannot change while its duplicates are processed.

use crate::duplicates::DuplicateGroup;
use crate::scanner::FileRecord;

/// A member scheduled for removal (or skipping) in a plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedRemoval {
    /// The duplicate
    pub record: FileRecord,
    /// Whether it shares device + inode with the original
    pub shares_inode: bool,
}

/// Original plus the ordered members to act on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionPlan {
    /// The canonical member; never deleted
    pub original: FileRecord,
    /// Every other member, canonical order
    pub to_remove: Vec<PlannedRemoval>,
}

impl ResolutionPlan {
    /// Build the plan for a group.
    #[must_use]
    pub fn for_group(group: &DuplicateGroup) -> Self {
        let original = group.original().clone();
        let to_remove = group
            .duplicates()
            .iter()
            .map(|record| PlannedRemoval {
                shares_inode: record.shares_inode_with(&original),
                record: record.clone(),
            })
            .collect();
        Self {
            original,
            to_remove,
        }
    }

    /// Members that are physically distinct from the original.
    pub fn independent(&self) -> impl Iterator<Item = &PlannedRemoval> {
        self.to_remove.iter().filter(|r| !r.shares_inode)
    }
}
