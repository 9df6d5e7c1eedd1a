//! Resolution of duplicate groups: list, delete or replace with hard links.
//!
//! # Overview
//!
//! The [`Resolver`] walks groups sequentially and, inside a group, members in
//! canonical order. The original of each group is never touched. What
//! happens to every other member depends on the [`Mode`] and whether the
//! member already shares the original's device + inode:
//!
//! | Mode       | independent copy           | shares inode                     |
//! |------------|----------------------------|----------------------------------|
//! | `List`     | nothing                    | nothing                          |
//! | `Delete`   | removed                    | kept, or removed with `--deletehl` |
//! | `Hardlink` | removed, then linked       | already linked                   |
//!
//! A failed delete or link aborts the run unless [`ResolvePolicy::force`] is
//! set. Completed removals are never rolled back.
//!
//! # Example
//!
//! ```no_run
//! use linkdupe::actions::{Mode, ResolvePolicy, Resolver};
//! use linkdupe::duplicates::DuplicateFinder;
//! use std::path::PathBuf;
//!
//! let finder = DuplicateFinder::with_defaults();
//! let (groups, _) = finder.find_duplicates_in_paths(&[PathBuf::from(".")]).unwrap();
//!
//! let resolver = Resolver::new(Mode::Delete, ResolvePolicy::default()).unwrap();
//! let report = resolver.resolve(&groups).unwrap();
//! println!("{} failures", report.failures.len());
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use thiserror::Error;

use super::delete::{link_to_original, remove_duplicate, DeleteError, LinkError};
use super::plan::{PlannedRemoval, ResolutionPlan};
use crate::duplicates::DuplicateGroup;
use crate::error::UsageError;
use crate::scanner::{FileRecord, Hash, InodeKey};

/// What to do with duplicate groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Report groups only.
    #[default]
    List,
    /// Remove every non-canonical member.
    Delete,
    /// Replace every non-canonical member with a hard link to the original.
    Hardlink,
}

impl Mode {
    /// Lowercase name, as used on the command line.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Delete => "delete",
            Self::Hardlink => "hardlink",
        }
    }

    /// Whether this mode changes the filesystem.
    #[must_use]
    pub fn is_mutating(self) -> bool {
        !matches!(self, Self::List)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options that modify how a mode is carried out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResolvePolicy {
    /// Keep going after a failed delete or link.
    pub force: bool,
    /// In delete mode, also remove members that are hard links to the
    /// original.
    pub include_hard_links: bool,
}

impl ResolvePolicy {
    /// Check that the options make sense for `mode`.
    ///
    /// # Errors
    ///
    /// - `--force` with list mode
    /// - `--deletehl` with anything but delete mode
    pub fn validate(&self, mode: Mode) -> Result<(), UsageError> {
        if self.force && !mode.is_mutating() {
            return Err(UsageError::ForceWithoutMutation);
        }
        if self.include_hard_links && mode != Mode::Delete {
            return Err(UsageError::HardLinksNotDeletable(mode.as_str()));
        }
        Ok(())
    }
}

/// A failed delete or link.
#[derive(Debug, Error)]
pub enum ResolveFailure {
    /// Removing the duplicate failed; nothing changed on disk.
    #[error(transparent)]
    Delete(#[from] DeleteError),
    /// The replacement link failed or could not be attempted.
    #[error(transparent)]
    Link(#[from] LinkError),
}

impl ResolveFailure {
    /// Path of the member the failure is about.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Delete(e) => e.path(),
            Self::Link(e) => &e.path,
        }
    }

    /// Whether the member was already removed when the failure happened.
    #[must_use]
    pub fn removed(&self) -> bool {
        matches!(self, Self::Link(e) if e.removed)
    }
}

/// Outcome for a single non-canonical member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    /// Removed. `shares_inode` records whether it was a hard link to the
    /// original (no space reclaimed).
    Deleted {
        /// Member shared the original's inode
        shares_inode: bool,
    },
    /// Removed and re-created as a hard link to the original.
    Replaced,
    /// Left alone because it is a hard link to the original.
    KeptSharedInode,
    /// Already a hard link to the original; nothing to do.
    AlreadyLinked,
    /// The delete or link failed. `removed` is true if the member is gone.
    Failed {
        /// Member was deleted before the failure
        removed: bool,
    },
}

impl ActionKind {
    /// Whether the member no longer exists as an independent file.
    #[must_use]
    pub fn removed_member(self) -> bool {
        matches!(
            self,
            Self::Deleted { .. } | Self::Replaced | Self::Failed { removed: true }
        )
    }
}

/// One member's action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    /// The member's path
    pub path: PathBuf,
    /// The member's identity at scan time
    pub inode: InodeKey,
    /// What happened
    pub kind: ActionKind,
}

/// Actions taken for one group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupOutcome {
    /// Content hash of the group
    pub hash: Hash,
    /// The canonical member
    pub original: FileRecord,
    /// Actions in canonical order; empty in list mode
    pub actions: Vec<Action>,
}

/// Everything the resolver did.
#[derive(Debug, Default)]
pub struct ResolutionReport {
    /// Mode the report was produced in
    pub mode: Mode,
    /// Per-group outcomes in processing order
    pub groups: Vec<GroupOutcome>,
    /// Failures tolerated under `force`
    pub failures: Vec<ResolveFailure>,
}

impl ResolutionReport {
    fn new(mode: Mode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    /// Iterate over every action of every group.
    pub fn actions(&self) -> impl Iterator<Item = (&GroupOutcome, &Action)> {
        self.groups
            .iter()
            .flat_map(|g| g.actions.iter().map(move |a| (g, a)))
    }
}

/// Errors that stop resolution early.
///
/// Both variants carry the partial report: everything done before the stop
/// remains done.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// A delete or link failed and `force` was not set.
    #[error("aborting: {failure}")]
    Aborted {
        /// The failure that caused the abort
        failure: ResolveFailure,
        /// Work completed before the abort
        partial: Box<ResolutionReport>,
    },

    /// Shutdown was requested between two mutations.
    #[error("resolution interrupted by user")]
    Interrupted {
        /// Work completed before the interrupt
        partial: Box<ResolutionReport>,
    },
}

impl ResolveError {
    /// The work completed before resolution stopped.
    #[must_use]
    pub fn partial_report(&self) -> &ResolutionReport {
        match self {
            Self::Aborted { partial, .. } | Self::Interrupted { partial } => partial,
        }
    }
}

/// Receives resolution events as they happen.
///
/// All methods default to no-ops.
pub trait ResolveObserver: Send + Sync {
    /// Called before a group is processed.
    fn on_group(&self, _mode: Mode, _group: &DuplicateGroup) {}

    /// Called after each member's action is decided (and carried out).
    fn on_action(&self, _original: &FileRecord, _action: &Action) {}

    /// Called for every failure. `fatal` is true when the run aborts.
    fn on_failure(&self, _failure: &ResolveFailure, _fatal: bool) {}
}

/// Executes a mode over duplicate groups.
pub struct Resolver<'a> {
    mode: Mode,
    policy: ResolvePolicy,
    shutdown_flag: Option<Arc<AtomicBool>>,
    observer: Option<&'a dyn ResolveObserver>,
}

impl fmt::Debug for Resolver<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("mode", &self.mode)
            .field("policy", &self.policy)
            .field("shutdown_flag", &self.shutdown_flag)
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

impl<'a> Resolver<'a> {
    /// Create a resolver after validating the policy against the mode.
    ///
    /// # Errors
    ///
    /// Returns a [`UsageError`] for invalid mode/option combinations.
    pub fn new(mode: Mode, policy: ResolvePolicy) -> Result<Self, UsageError> {
        policy.validate(mode)?;
        Ok(Self {
            mode,
            policy,
            shutdown_flag: None,
            observer: None,
        })
    }

    /// Set a shutdown flag checked before every mutation.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Attach an observer.
    #[must_use]
    pub fn with_observer(mut self, observer: &'a dyn ResolveObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    /// The configured mode.
    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Resolve every group.
    ///
    /// # Errors
    ///
    /// - [`ResolveError::Aborted`] on the first failure without `force`
    /// - [`ResolveError::Interrupted`] if shutdown was requested
    pub fn resolve(&self, groups: &[DuplicateGroup]) -> Result<ResolutionReport, ResolveError> {
        let mut report = ResolutionReport::new(self.mode);

        for group in groups {
            if let Some(observer) = self.observer {
                observer.on_group(self.mode, group);
            }

            let plan = ResolutionPlan::for_group(group);
            let mut outcome = GroupOutcome {
                hash: group.hash,
                original: plan.original.clone(),
                actions: Vec::with_capacity(plan.to_remove.len()),
            };

            if self.mode.is_mutating() {
                if let Err(stop) = self.resolve_plan(&plan, &mut outcome, &mut report.failures) {
                    report.groups.push(outcome);
                    return Err(stop.into_error(report));
                }
            }

            report.groups.push(outcome);
        }

        log::debug!(
            "Resolved {} groups in {} mode ({} tolerated failures)",
            report.groups.len(),
            self.mode,
            report.failures.len()
        );
        Ok(report)
    }

    fn resolve_plan(
        &self,
        plan: &ResolutionPlan,
        outcome: &mut GroupOutcome,
        failures: &mut Vec<ResolveFailure>,
    ) -> Result<(), Stop> {
        for removal in &plan.to_remove {
            let result = match self.skip_reason(removal) {
                Some(kind) => Ok(kind),
                None => {
                    if self.is_shutdown_requested() {
                        log::info!(
                            "Shutdown requested, stopping before {}",
                            removal.record.path.display()
                        );
                        return Err(Stop::Interrupted);
                    }
                    self.apply(&plan.original, removal)
                }
            };

            match result {
                Ok(kind) => self.record(outcome, &plan.original, removal, kind),
                Err(failure) => {
                    let kind = ActionKind::Failed {
                        removed: failure.removed(),
                    };
                    self.record(outcome, &plan.original, removal, kind);

                    let fatal = !self.policy.force;
                    if let Some(observer) = self.observer {
                        observer.on_failure(&failure, fatal);
                    }
                    if fatal {
                        return Err(Stop::Aborted(failure));
                    }
                    log::warn!("Continuing after failure: {}", failure);
                    failures.push(failure);
                }
            }
        }
        Ok(())
    }

    /// Members that need no filesystem operation.
    fn skip_reason(&self, removal: &PlannedRemoval) -> Option<ActionKind> {
        if !removal.shares_inode {
            return None;
        }
        match self.mode {
            Mode::Delete if self.policy.include_hard_links => None,
            Mode::Delete => Some(ActionKind::KeptSharedInode),
            Mode::Hardlink => Some(ActionKind::AlreadyLinked),
            Mode::List => None,
        }
    }

    fn apply(
        &self,
        original: &FileRecord,
        removal: &PlannedRemoval,
    ) -> Result<ActionKind, ResolveFailure> {
        let path = &removal.record.path;
        if self.mode == Mode::Hardlink && removal.record.inode.dev() != original.inode.dev() {
            return Err(LinkError::cross_device(&original.path, path).into());
        }
        remove_duplicate(path)?;

        match self.mode {
            Mode::Hardlink => {
                link_to_original(&original.path, path)?;
                Ok(ActionKind::Replaced)
            }
            _ => Ok(ActionKind::Deleted {
                shares_inode: removal.shares_inode,
            }),
        }
    }

    fn record(
        &self,
        outcome: &mut GroupOutcome,
        original: &FileRecord,
        removal: &PlannedRemoval,
        kind: ActionKind,
    ) {
        let action = Action {
            path: removal.record.path.clone(),
            inode: removal.record.inode,
            kind,
        };
        if let Some(observer) = self.observer {
            observer.on_action(original, &action);
        }
        outcome.actions.push(action);
    }
}

/// Why a plan stopped early.
enum Stop {
    Aborted(ResolveFailure),
    Interrupted,
}

impl Stop {
    fn into_error(self, report: ResolutionReport) -> ResolveError {
        let partial = Box::new(report);
        match self {
            Self::Aborted(failure) => ResolveError::Aborted { failure, partial },
            Self::Interrupted => ResolveError::Interrupted { partial },
        }
    }
}
