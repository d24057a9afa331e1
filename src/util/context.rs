//! Global context for slipway operations.
//!
//! Centralizes the filesystem layout: where archives are cached, where
//! sources are staged, where packages are installed, and where the
//! configuration files live.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{Context, Result};
use directories::{BaseDirs, ProjectDirs};

/// Project directories for slipway.
static PROJECT_DIRS: LazyLock<Option<ProjectDirs>> =
    LazyLock::new(|| ProjectDirs::from("io", "slipway", "slipway"));

/// Global context containing paths and output settings.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Current working directory
    cwd: PathBuf,

    /// Home directory for global slipway data (~/.slipway/)
    home: PathBuf,

    /// Whether to use verbose output
    verbose: bool,

    /// Whether to use colors in output
    color: bool,
}

impl GlobalContext {
    /// Create a new GlobalContext with defaults.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;

        let home = if let Some(dirs) = PROJECT_DIRS.as_ref() {
            dirs.cache_dir().to_path_buf()
        } else {
            BaseDirs::new()
                .map(|b| b.home_dir().join(".slipway"))
                .unwrap_or_else(|| PathBuf::from(".slipway"))
        };

        Ok(GlobalContext {
            cwd,
            home,
            verbose: false,
            color: true,
        })
    }

    /// Create a GlobalContext with a specific working directory.
    pub fn with_cwd(cwd: PathBuf) -> Result<Self> {
        let mut ctx = Self::new()?;
        ctx.cwd = cwd;
        Ok(ctx)
    }

    /// Set verbose mode.
    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    /// Set color output.
    pub fn set_color(&mut self, color: bool) {
        self.color = color;
    }

    /// Get the current working directory.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Get the slipway home directory.
    pub fn home(&self) -> &Path {
        &self.home
    }

    /// Cache directory for downloaded archives, keyed by checksum.
    pub fn archive_cache_dir(&self) -> PathBuf {
        self.home.join("cache").join("archives")
    }

    /// Cache directory for git checkouts.
    pub fn git_cache_dir(&self) -> PathBuf {
        self.home.join("cache").join("git")
    }

    /// Root for per-build staging directories.
    pub fn stage_root(&self) -> PathBuf {
        self.home.join("stage")
    }

    /// Default root for install prefixes (configuration may override).
    pub fn default_install_root(&self) -> PathBuf {
        self.home.join("opt")
    }

    /// Global configuration file path.
    pub fn config_path(&self) -> PathBuf {
        self.home.join("config.toml")
    }

    /// Project-local configuration file path.
    pub fn project_config_path(&self) -> PathBuf {
        self.cwd.join("slipway.toml")
    }

    /// Check if verbose mode is enabled.
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Check if color output is enabled.
    pub fn color(&self) -> bool {
        self.color
    }
}
