//! Human-readable end-of-run messages.

use bytesize::ByteSize;

use crate::actions::{Mode, Tally};
use crate::duplicates::ScanSummary;

/// Message printed after a list run.
#[must_use]
pub fn scan_message(summary: &ScanSummary) -> String {
    if summary.duplicate_groups == 0 {
        return "No duplicates found.".to_string();
    }
    format!(
        "{} duplicate files in {} groups, {} reclaimable (scanned {} files in {:.2?}).",
        summary.duplicate_files,
        summary.duplicate_groups,
        ByteSize::b(summary.reclaimable_space),
        summary.total_files,
        summary.scan_duration
    )
}

/// Lines printed after a delete or hardlink run.
#[must_use]
pub fn resolution_message(mode: Mode, tally: &Tally) -> Vec<String> {
    if !tally.deleted_anything() {
        let mut lines = vec!["No (non-hard-link) duplicates found.".to_string()];
        if tally.failures > 0 {
            lines.push(failure_line(tally.failures));
        }
        return lines;
    }

    let mut lines = vec![format!("Deleted {} files.", tally.files_deleted)];
    if mode == Mode::Hardlink {
        lines.push(format!(
            "Replaced {} files with hard links.",
            tally.files_linked
        ));
    }
    if tally.bytes_freed > 0 {
        lines.push(format!(
            "Freed approximately {}.",
            ByteSize::b(tally.bytes_freed)
        ));
    } else {
        lines.push(
            "Only files sharing an inode with their original were deleted; no space was freed."
                .to_string(),
        );
    }
    if tally.failures > 0 {
        lines.push(failure_line(tally.failures));
    }
    lines
}

fn failure_line(failures: usize) -> String {
    format!("{} actions failed; see the audit log.", failures)
}
