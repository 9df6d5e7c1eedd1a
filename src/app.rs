//! One run of the tool, from validated paths to the final summary.

use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use anyhow::Context;

use crate::actions::{tally, Mode, ResolutionReport, ResolvePolicy, Resolver};
use crate::audit::AuditLog;
use crate::cli::{Cli, Invocation};
use crate::config::Config;
use crate::duplicates::{DuplicateFinder, FinderConfig, FinderError};
use crate::error::{AppError, ExitCode, UsageError};
use crate::output::{resolution_message, scan_message, Listing};
use crate::progress::Progress;
use crate::scanner::validate_root;

/// Everything a run needs, after CLI and config are merged.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// List, delete or hardlink
    pub mode: Mode,
    /// Force / deletehl
    pub policy: ResolvePolicy,
    /// Search paths as given
    pub paths: Vec<PathBuf>,
    /// Hashing threads
    pub io_threads: usize,
    /// Audit log directory; `None` disables the audit log
    pub log_dir: Option<PathBuf>,
    /// Show progress bars
    pub progress: bool,
    /// Suppress informational output on stderr
    pub quiet: bool,
}

impl RunOptions {
    /// Merge the command line over the loaded configuration.
    #[must_use]
    pub fn from_cli(cli: &Cli, invocation: Invocation, config: &Config) -> Self {
        let log_dir = if cli.no_audit_log || (!config.audit_log && cli.log_dir.is_none()) {
            None
        } else {
            cli.log_dir.clone().or_else(|| config.resolved_log_dir())
        };
        Self {
            mode: invocation.mode,
            policy: invocation.policy,
            paths: invocation.paths,
            io_threads: cli.io_threads.map_or(config.io_threads, usize::from),
            log_dir,
            progress: config.progress && !cli.no_progress && !cli.quiet,
            quiet: cli.quiet,
        }
    }
}

/// Execute a run, writing the listing and summary to `out`.
///
/// Search paths are validated before the audit log is opened, so a bad path
/// leaves no trace of a run.
///
/// # Errors
///
/// Returns an [`AppError`] whose [`exit_code`](AppError::exit_code) is the
/// process exit status.
pub fn execute<W: Write>(
    options: &RunOptions,
    shutdown_flag: Option<Arc<AtomicBool>>,
    out: &mut W,
) -> Result<ExitCode, AppError> {
    options.policy.validate(options.mode)?;
    if options.paths.is_empty() {
        return Err(UsageError::NoPaths.into());
    }

    let roots = options
        .paths
        .iter()
        .map(|p| validate_root(p))
        .collect::<Result<Vec<_>, _>>()
        .map_err(FinderError::from)?;

    let audit = match options.log_dir {
        Some(ref dir) => Some(AuditLog::open(dir)?),
        None => None,
    };
    if let Some(ref audit) = audit {
        audit.record_run(options.mode, options.policy, &roots);
    }

    let mut finder_config = FinderConfig::default().with_io_threads(options.io_threads);
    if let Some(ref flag) = shutdown_flag {
        finder_config = finder_config.with_shutdown_flag(flag.clone());
    }
    if options.progress {
        finder_config = finder_config.with_progress_callback(Arc::new(Progress::new(false)));
    }

    let finder = DuplicateFinder::new(finder_config);
    let (groups, summary) = match finder.find_duplicates_in_paths(&roots) {
        Ok(found) => found,
        Err(e) => {
            if let Some(ref audit) = audit {
                audit.record_error(&e);
            }
            return Err(e.into());
        }
    };

    if let Some(ref audit) = audit {
        for error in &summary.hash_errors {
            audit.record_hash_error(error);
        }
        audit.record_listing(&groups);
    }

    if options.mode == Mode::List {
        Listing::new(&groups)
            .write_to(out)
            .context("Failed to write listing")?;
        if !options.quiet {
            eprintln!("{}", scan_message(&summary));
        }
        return Ok(ExitCode::Success);
    }

    let mut resolver = Resolver::new(options.mode, options.policy)?;
    if let Some(ref flag) = shutdown_flag {
        resolver = resolver.with_shutdown_flag(flag.clone());
    }
    if let Some(ref audit) = audit {
        resolver = resolver.with_observer(audit);
    }

    match resolver.resolve(&groups) {
        Ok(report) => {
            finish(options.mode, &report, audit.as_ref(), out)?;
            Ok(ExitCode::Success)
        }
        Err(e) => {
            if let Some(ref audit) = audit {
                audit.record_error(&e);
            }
            finish(options.mode, e.partial_report(), audit.as_ref(), out)?;
            Err(e.into())
        }
    }
}

/// Tally a (possibly partial) report, log it and print the summary.
fn finish<W: Write>(
    mode: Mode,
    report: &ResolutionReport,
    audit: Option<&AuditLog>,
    out: &mut W,
) -> anyhow::Result<()> {
    let totals = tally(report);
    if let Some(audit) = audit {
        audit.record_tally(&totals);
    }
    for line in resolution_message(mode, &totals) {
        writeln!(out, "{}", line).context("Failed to write summary")?;
    }
    Ok(())
}
