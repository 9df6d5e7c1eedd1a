//! File actions module.
//!
//! This module provides functionality for:
//! - Per-group resolution plans (original + members to act on)
//! - Listing, deleting, or hard-linking duplicates
//! - Tallying deletions and reclaimed space
//!
//! # Resolution
//!
//! ```no_run
//! use linkdupe::actions::{tally, Mode, ResolvePolicy, Resolver};
//! use linkdupe::duplicates::DuplicateFinder;
//! use std::path::PathBuf;
//!
//! let (groups, _) = DuplicateFinder::with_defaults()
//!     .find_duplicates_in_paths(&[PathBuf::from(".")])
//!     .unwrap();
//! let policy = ResolvePolicy { force: true, include_hard_links: false };
//! let report = Resolver::new(Mode::Hardlink, policy).unwrap().resolve(&groups).unwrap();
//! println!("{} files replaced", tally(&report).files_linked);
//! ```

pub mod accounting;
pub mod delete;
pub mod plan;
pub mod resolve;

// Re-export commonly used types
pub use accounting::{tally, Tally};
pub use delete::{link_to_original, remove_duplicate, DeleteError, LinkError};
pub use plan::{PlannedRemoval, ResolutionPlan};
pub use resolve::{
    Action, ActionKind, GroupOutcome, Mode, ResolutionReport, ResolveError, ResolveFailure,
    ResolveObserver, ResolvePolicy, Resolver,
};
