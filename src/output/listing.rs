//! Plain-text listing of duplicate groups.
//!
//! One line per group member: `<hex hash> <inode> <path>`. Groups appear in
//! canonical order and members canonical-first. Paths are written as-is,
//! without escaping.

use std::io::Write;

use crate::duplicates::DuplicateGroup;
use crate::scanner::{hash_to_hex, FileRecord};

/// Formatter for the duplicate listing.
pub struct Listing<'a> {
    /// Duplicate groups to list
    pub groups: &'a [DuplicateGroup],
}

impl<'a> Listing<'a> {
    /// Create a new listing formatter.
    #[must_use]
    pub fn new(groups: &'a [DuplicateGroup]) -> Self {
        Self { groups }
    }

    /// Every line of the listing, in order.
    pub fn lines(&self) -> impl Iterator<Item = String> + 'a {
        self.groups
            .iter()
            .flat_map(|group| group.files.iter().map(format_member))
    }

    /// Write the listing to a writer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for line in self.lines() {
            writeln!(writer, "{}", line)?;
        }
        writer.flush()
    }
}

/// Format a single member line.
#[must_use]
pub fn format_member(record: &FileRecord) -> String {
    format!(
        "{} {} {}",
        hash_to_hex(&record.hash),
        record.inode.ino(),
        record.path.display()
    )
}
