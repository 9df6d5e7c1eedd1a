//! linkdupe - duplicate file finder and hard-link deduplicator
//!
//! Finds content-identical files under one or more directory trees using
//! full-content BLAKE3 hashes, then lists them, deletes redundant copies, or
//! replaces redundant copies with hard links to a single original.

pub mod actions;
pub mod app;
pub mod audit;
pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod signal;

use crate::app::{execute, RunOptions};
use crate::cli::{prompt_for_path, Cli};
use crate::config::Config;
use crate::error::{AppError, ExitCode};

/// Run the application for parsed command-line arguments.
///
/// Loads the configuration, prompts for a folder when none was given,
/// installs the Ctrl+C handler and executes the run against stdout.
///
/// # Errors
///
/// Returns an [`AppError`] carrying the exit code for the failure.
pub fn run_app(cli: Cli) -> Result<ExitCode, AppError> {
    if cli.print_config {
        let text = Config::default_toml().map_err(anyhow::Error::from)?;
        print!("{}", text);
        return Ok(ExitCode::Success);
    }

    let config = Config::load()?;
    let mut invocation = cli.invocation();
    invocation.policy.validate(invocation.mode)?;
    if invocation.paths.is_empty() {
        invocation.paths.push(prompt_for_path()?);
    }
    let options = RunOptions::from_cli(&cli, invocation, &config);

    let shutdown = signal::install_handler().map_err(anyhow::Error::from)?;
    log::debug!("Run options: {:?}", options);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    execute(&options, Some(shutdown.get_flag()), &mut out)
}
