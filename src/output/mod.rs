//! Output formatters for duplicate scan results.
//!
//! This module provides:
//! - [`listing`]: the `<hash> <inode> <path>` listing written to stdout
//! - [`summary`]: end-of-run messages with human-readable sizes
//!
//! # Example
//!
//! ```no_run
//! use linkdupe::duplicates::DuplicateFinder;
//! use linkdupe::output::{scan_message, Listing};
//! use std::path::PathBuf;
//!
//! let finder = DuplicateFinder::with_defaults();
//! let (groups, summary) = finder.find_duplicates_in_paths(&[PathBuf::from(".")]).unwrap();
//!
//! Listing::new(&groups).write_to(&mut std::io::stdout()).unwrap();
//! eprintln!("{}", scan_message(&summary));
//! ```

pub mod listing;
pub mod summary;

// Re-export main types
pub use listing::{format_member, Listing};
pub use summary::{resolution_message, scan_message};
