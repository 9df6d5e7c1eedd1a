//! Tallies of what a resolution run removed.

use super::resolve::{ActionKind, ResolutionReport};

/// Totals for a resolution run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    /// Members removed, including those re-created as links
    pub files_deleted: usize,
    /// Bytes reclaimed; shared-inode removals contribute nothing
    pub bytes_freed: u64,
    /// Members removed that were hard links to their original
    pub shared_inode_deletions: usize,
    /// Members replaced by a link
    pub files_linked: usize,
    /// Failed actions (fatal or tolerated)
    pub failures: usize,
}

impl Tally {
    /// Whether anything was removed at all.
    #[must_use]
    pub fn deleted_anything(&self) -> bool {
        self.files_deleted > 0
    }
}

/// Sum up a report.
///
/// Every removal counts as a deletion. The original's size is added to
/// `bytes_freed` once per removal of a member that did not share the
/// original's inode, so removing a second name of the same storage frees
/// nothing.
#[must_use]
pub fn tally(report: &ResolutionReport) -> Tally {
    let mut tally = Tally::default();

    for (group, action) in report.actions() {
        match action.kind {
            ActionKind::Deleted { shares_inode: true } => {
                tally.files_deleted += 1;
                tally.shared_inode_deletions += 1;
            }
            ActionKind::Deleted {
                shares_inode: false,
            } => {
                tally.files_deleted += 1;
                tally.bytes_freed += group.original.size;
            }
            ActionKind::Replaced => {
                tally.files_deleted += 1;
                tally.files_linked += 1;
                tally.bytes_freed += group.original.size;
            }
            ActionKind::Failed { removed } => {
                tally.failures += 1;
                if removed {
                    tally.files_deleted += 1;
                    tally.bytes_freed += group.original.size;
                }
            }
            ActionKind::KeptSharedInode | ActionKind::AlreadyLinked => {}
        }
    }

    tally
}
