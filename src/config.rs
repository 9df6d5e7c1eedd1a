//! Application configuration management.
//!
//! Settings are layered with figment, later layers winning:
//!
//! 1. Built-in defaults
//! 2. `config.toml` in the platform config directory
//! 3. `LINKDUPE_*` environment variables (e.g. `LINKDUPE_IO_THREADS=8`)
//! 4. Command-line flags, applied by the caller
//!
//! A missing config file is not an error; a malformed one is.

use std::path::{Path, PathBuf};

use anyhow::Context;
use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::audit::AuditLog;
use crate::duplicates::DEFAULT_IO_THREADS;

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "LINKDUPE_";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Threads used for hashing.
    pub io_threads: usize,
    /// Directory for audit logs; the per-user default when unset.
    pub log_dir: Option<PathBuf>,
    /// Whether to write the audit log at all.
    pub audit_log: bool,
    /// Whether to show progress bars.
    pub progress: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            io_threads: DEFAULT_IO_THREADS,
            log_dir: None,
            audit_log: true,
            progress: true,
        }
    }
}

impl Config {
    /// Default platform-specific configuration file path.
    #[must_use]
    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "linkdupe").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Layered provider: defaults, then `file` if given, then environment.
    #[must_use]
    pub fn figment(file: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(path) = file {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    /// Load the configuration from the default locations.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file or an environment override is
    /// malformed.
    pub fn load() -> anyhow::Result<Self> {
        let path = Self::config_path();
        Self::load_from(path.as_deref())
    }

    /// Load with an explicit config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file or an environment override is malformed.
    pub fn load_from(file: Option<&Path>) -> anyhow::Result<Self> {
        let config: Self = Self::figment(file)
            .extract()
            .context("Failed to load configuration")?;
        log::debug!("Configuration: {:?}", config);
        Ok(config)
    }

    /// The defaults rendered as TOML, suitable as a starting config file.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn default_toml() -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(&Self::default())
    }

    /// Effective audit log directory.
    #[must_use]
    pub fn resolved_log_dir(&self) -> Option<PathBuf> {
        self.log_dir.clone().or_else(AuditLog::default_dir)
    }
}
