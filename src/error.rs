//! Structured error handling and exit codes.
//!
//! Library layers return their own `thiserror` enums. [`AppError`] gathers
//! them at the application edge and decides the process [`ExitCode`].

use serde::Serialize;
use thiserror::Error;

use crate::actions::ResolveError;
use crate::duplicates::FinderError;
use crate::scanner::ScanError;

/// Exit codes for the linkdupe application.
///
/// - 0: Success (including "no duplicates")
/// - 1: A search path is missing or not a directory, or another fatal error
/// - 2: Usage error
/// - 3: A delete or link failed and `--force` was not given
/// - 4: Directory enumeration failed
/// - 130: Interrupted by user (Ctrl+C)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Completed normally.
    Success = 0,
    /// Bad search path or an unexpected fatal error.
    Failure = 1,
    /// Invalid command-line usage.
    Usage = 2,
    /// A resolution step failed without `--force`.
    ActionFailed = 3,
    /// Enumeration of a search path failed.
    ScanFailed = 4,
    /// Interrupted by user (Ctrl+C).
    Interrupted = 130,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "LD000",
            Self::Failure => "LD001",
            Self::Usage => "LD002",
            Self::ActionFailed => "LD003",
            Self::ScanFailed => "LD004",
            Self::Interrupted => "LD130",
        }
    }
}

/// Invalid combination of mode and options.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UsageError {
    /// `--deletehl` only makes sense when deleting.
    #[error("--deletehl cannot be combined with {0} mode")]
    HardLinksNotDeletable(&'static str),

    /// `--force` only makes sense for a mutating mode.
    #[error("--force cannot be combined with list mode")]
    ForceWithoutMutation,

    /// No search path was given and none could be prompted for.
    #[error("no search path given")]
    NoPaths,
}

/// Top-level application error.
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid usage.
    #[error(transparent)]
    Usage(#[from] UsageError),

    /// Scanning or hashing failed.
    #[error(transparent)]
    Find(#[from] FinderError),

    /// Resolution aborted or was interrupted.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// Anything else (configuration, audit log I/O).
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// The exit code this error maps to.
    #[must_use]
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::Usage(_) => ExitCode::Usage,
            Self::Find(FinderError::Interrupted | FinderError::Scan(ScanError::Interrupted)) => {
                ExitCode::Interrupted
            }
            Self::Find(e) if e.is_invalid_root() => ExitCode::Failure,
            Self::Find(_) => ExitCode::ScanFailed,
            Self::Resolve(ResolveError::Interrupted { .. }) => ExitCode::Interrupted,
            Self::Resolve(ResolveError::Aborted { .. }) => ExitCode::ActionFailed,
            Self::Other(_) => ExitCode::Failure,
        }
    }
}

/// Structured error information for JSON output.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "LD001")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Human-readable error message
    pub message: String,
    /// Whether the operation was interrupted
    pub interrupted: bool,
}

impl StructuredError {
    /// Create a structured error from an application error.
    #[must_use]
    pub fn new(err: &AppError) -> Self {
        let exit_code = err.exit_code();
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: err.to_string(),
            interrupted: exit_code == ExitCode::Interrupted,
        }
    }
}
