//! Command-line interface definitions for linkdupe.
//!
//! This module defines all CLI arguments, subcommands, and options using the clap derive API.
//! Global options (verbosity, logging, threads) may appear before or after the subcommand.
//! Without a subcommand, the given paths are listed.
//!
//! # Example
//!
//! ```bash
//! # List duplicates (default mode)
//! linkdupe ~/Photos ~/Backup
//!
//! # Delete duplicates, keeping the first copy found
//! linkdupe delete ~/Photos
//!
//! # Replace duplicates with hard links, continuing past failures
//! linkdupe hardlink --force ~/Photos ~/Backup
//!
//! # Also delete extra hard links to the original
//! linkdupe delete --deletehl ~/Photos
//! ```

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::actions::{Mode, ResolvePolicy};
use crate::error::UsageError;

/// Find duplicate files and list, delete, or hard-link them.
///
/// linkdupe compares files by a BLAKE3 hash of their full content. In each
/// group of identical files the first one found is the original; it is never
/// deleted. Files under directories whose name contains a dot, and files
/// named .DS_Store or .localized, are skipped.
#[derive(Debug, Parser)]
#[command(name = "linkdupe")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Print errors as JSON objects on stderr
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// Number of threads used for hashing (default: 4)
    #[arg(long, value_name = "N", global = true, value_parser = clap::value_parser!(u16).range(1..))]
    pub io_threads: Option<u16>,

    /// Directory for the audit log
    #[arg(long, value_name = "DIR", global = true)]
    pub log_dir: Option<PathBuf>,

    /// Do not write the audit log
    #[arg(long, global = true, conflicts_with = "log_dir")]
    pub no_audit_log: bool,

    /// Do not show progress bars
    #[arg(long, global = true)]
    pub no_progress: bool,

    /// Print the default configuration file and exit
    #[arg(long)]
    pub print_config: bool,

    /// Subcommand to execute (list when omitted)
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Directories to search
    #[arg(value_name = "PATH")]
    pub paths: Vec<PathBuf>,
}

/// Available subcommands for linkdupe.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List duplicate groups without changing anything
    List(ListArgs),
    /// Delete every duplicate except the original
    Delete(DeleteArgs),
    /// Replace every duplicate with a hard link to the original
    Hardlink(HardlinkArgs),
}

/// Arguments for the list subcommand.
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Directories to search
    #[arg(value_name = "PATH")]
    pub paths: Vec<PathBuf>,
}

/// Arguments for the delete subcommand.
#[derive(Debug, Args)]
pub struct DeleteArgs {
    /// Continue after a file cannot be deleted
    #[arg(long)]
    pub force: bool,

    /// Also delete duplicates that are hard links to the original
    #[arg(long)]
    pub deletehl: bool,

    /// Directories to search
    #[arg(value_name = "PATH")]
    pub paths: Vec<PathBuf>,
}

/// Arguments for the hardlink subcommand.
#[derive(Debug, Args)]
pub struct HardlinkArgs {
    /// Continue after a file cannot be deleted or linked
    #[arg(long)]
    pub force: bool,

    /// Directories to search
    #[arg(value_name = "PATH")]
    pub paths: Vec<PathBuf>,
}

/// Mode, policy and paths extracted from the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// What to do with duplicates
    pub mode: Mode,
    /// Force / deletehl
    pub policy: ResolvePolicy,
    /// Search paths as given
    pub paths: Vec<PathBuf>,
}

impl Cli {
    /// Flatten the subcommand into an [`Invocation`].
    #[must_use]
    pub fn invocation(&self) -> Invocation {
        let (mode, policy, paths) = match &self.command {
            None => (Mode::List, ResolvePolicy::default(), &self.paths),
            Some(Commands::List(args)) => (Mode::List, ResolvePolicy::default(), &args.paths),
            Some(Commands::Delete(args)) => (
                Mode::Delete,
                ResolvePolicy {
                    force: args.force,
                    include_hard_links: args.deletehl,
                },
                &args.paths,
            ),
            Some(Commands::Hardlink(args)) => (
                Mode::Hardlink,
                ResolvePolicy {
                    force: args.force,
                    include_hard_links: false,
                },
                &args.paths,
            ),
        };
        Invocation {
            mode,
            policy,
            paths: paths.clone(),
        }
    }
}

/// Ask for a single folder on the terminal.
///
/// # Errors
///
/// Returns `UsageError::NoPaths` when stdin is not a terminal, the prompt
/// fails, or the answer is empty.
pub fn prompt_for_path() -> Result<PathBuf, UsageError> {
    use dialoguer::Input;

    if !std::io::stdin().is_terminal() {
        return Err(UsageError::NoPaths);
    }

    let answer: String = Input::new()
        .with_prompt("Folder to search")
        .interact_text()
        .map_err(|e| {
            log::debug!("Prompt failed: {}", e);
            UsageError::NoPaths
        })?;

    let trimmed = answer.trim();
    if trimmed.is_empty() {
        return Err(UsageError::NoPaths);
    }
    Ok(PathBuf::from(trimmed))
}
