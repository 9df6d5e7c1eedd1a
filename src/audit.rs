//! Dated, append-only audit log.
//!
//! Every run appends to `<log dir>/linkdupe_<YYYY-MM-DD>.log`. Each line is
//! prefixed with a local timestamp. The log records the search paths, mode
//! and options, the full duplicate listing, every action and every failure
//! (whether or not `--force` let the run continue), files that could not be
//! hashed, and the final tally. Nothing reads it back.
//!
//! Write failures are logged as warnings and otherwise ignored; the audit
//! log never aborts a run once it is open.

use std::fmt::Display;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Context;
use chrono::{Local, NaiveDate};
use directories::ProjectDirs;

use crate::actions::{
    Action, ActionKind, Mode, ResolveFailure, ResolveObserver, ResolvePolicy, Tally,
};
use crate::duplicates::DuplicateGroup;
use crate::output::format_member;
use crate::scanner::{hash_to_hex, FileRecord, HashError};

/// Append-only audit log file.
#[derive(Debug)]
pub struct AuditLog {
    path: PathBuf,
    file: Mutex<File>,
}

impl AuditLog {
    /// File name of the log for `date`.
    #[must_use]
    pub fn file_name(date: NaiveDate) -> String {
        format!("linkdupe_{}.log", date.format("%Y-%m-%d"))
    }

    /// Per-user default log directory.
    #[must_use]
    pub fn default_dir() -> Option<PathBuf> {
        ProjectDirs::from("", "", "linkdupe").map(|dirs| dirs.data_local_dir().join("logs"))
    }

    /// Open (or create) today's log under `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the file
    /// cannot be opened for appending.
    pub fn open(dir: &Path) -> anyhow::Result<Self> {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

        let path = dir.join(Self::file_name(Local::now().date_naive()));
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open audit log {}", path.display()))?;

        log::debug!("Audit log: {}", path.display());
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    /// Path of the open log file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_line(&self, line: impl Display) {
        let stamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        let result = match self.file.lock() {
            Ok(mut file) => writeln!(file, "{} {}", stamp, line),
            Err(_) => {
                log::warn!("Audit log lock poisoned; dropping entry");
                return;
            }
        };
        if let Err(e) = result {
            log::warn!("Failed to write audit log {}: {}", self.path.display(), e);
        }
    }

    /// Record the start of a run.
    pub fn record_run(&self, mode: Mode, policy: ResolvePolicy, roots: &[PathBuf]) {
        self.write_line(format_args!(
            "run mode={} force={} deletehl={}",
            mode, policy.force, policy.include_hard_links
        ));
        for root in roots {
            self.write_line(format_args!("search path: {}", root.display()));
        }
    }

    /// Record the full duplicate listing.
    pub fn record_listing(&self, groups: &[DuplicateGroup]) {
        if groups.is_empty() {
            self.write_line("no duplicates found");
            return;
        }
        for group in groups {
            for record in &group.files {
                self.write_line(format_args!("dup {}", format_member(record)));
            }
        }
    }

    /// Record a file left out because it could not be hashed.
    pub fn record_hash_error(&self, error: &HashError) {
        self.write_line(format_args!("hash error: {}", error));
    }

    /// Record the final totals.
    pub fn record_tally(&self, tally: &Tally) {
        self.write_line(format_args!(
            "tally deleted={} linked={} freed_bytes={} failures={}",
            tally.files_deleted, tally.files_linked, tally.bytes_freed, tally.failures
        ));
    }

    /// Record a fatal error that ended the run.
    pub fn record_error(&self, error: &dyn Display) {
        self.write_line(format_args!("error: {}", error));
    }
}

impl ResolveObserver for AuditLog {
    fn on_group(&self, mode: Mode, group: &DuplicateGroup) {
        self.write_line(format_args!(
            "{} group {} ({} files)",
            mode,
            hash_to_hex(&group.hash),
            group.len()
        ));
    }

    fn on_action(&self, original: &FileRecord, action: &Action) {
        let path = action.path.display();
        match action.kind {
            ActionKind::Deleted { shares_inode } => self.write_line(format_args!(
                "deleted {}{}",
                path,
                if shares_inode { " (shared inode)" } else { "" }
            )),
            ActionKind::Replaced => self.write_line(format_args!(
                "linked {} -> {}",
                path,
                original.path.display()
            )),
            ActionKind::KeptSharedInode => {
                self.write_line(format_args!("kept {} (shares inode)", path));
            }
            ActionKind::AlreadyLinked => {
                self.write_line(format_args!("already linked {}", path));
            }
            ActionKind::Failed { .. } => {}
        }
    }

    fn on_failure(&self, failure: &ResolveFailure, fatal: bool) {
        self.write_line(format_args!(
            "{} {}",
            if fatal { "fatal:" } else { "failed:" },
            failure
        ));
    }
}
