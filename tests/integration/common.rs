//! Shared fixtures for integration tests.

use std::fs;
use std::path::{Path, PathBuf};

use linkdupe::actions::{Mode, ResolvePolicy};
use linkdupe::app::{execute, RunOptions};
use linkdupe::error::{AppError, ExitCode};

/// Write `content` to `dir/name`, creating parent directories.
pub fn write_file(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

/// Run options with progress off and the audit log under `log_dir`.
pub fn options(mode: Mode, policy: ResolvePolicy, paths: &[&Path], log_dir: &Path) -> RunOptions {
    RunOptions {
        mode,
        policy,
        paths: paths.iter().map(|p| p.to_path_buf()).collect(),
        io_threads: 2,
        log_dir: Some(log_dir.to_path_buf()),
        progress: false,
        quiet: true,
    }
}

/// Execute a run, returning the outcome and everything written to stdout.
pub fn run(options: &RunOptions) -> (Result<ExitCode, AppError>, String) {
    let mut out = Vec::new();
    let result = execute(options, None, &mut out);
    (result, String::from_utf8(out).unwrap())
}

/// Contents of every audit log under `log_dir`, concatenated.
pub fn audit_text(log_dir: &Path) -> String {
    let Ok(entries) = fs::read_dir(log_dir) else {
        return String::new();
    };
    entries
        .filter_map(Result::ok)
        .map(|e| fs::read_to_string(e.path()).unwrap())
        .collect()
}

pub fn force() -> ResolvePolicy {
    ResolvePolicy {
        force: true,
        include_hard_links: false,
    }
}

pub fn deletehl() -> ResolvePolicy {
    ResolvePolicy {
        force: false,
        include_hard_links: true,
    }
}

/// Whether the process can ignore directory permissions (root).
#[cfg(unix)]
pub fn is_privileged(probe_dir: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    let locked = probe_dir.join("privilege-probe");
    fs::create_dir(&locked).unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o555)).unwrap();
    let writable = fs::write(locked.join("f"), b"").is_ok();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
    fs::remove_dir_all(&locked).unwrap();
    writable
}
