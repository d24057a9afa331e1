//! Configuration file support.
//!
//! Two locations are read:
//! - Global: `~/.slipway/config.toml` - user-wide defaults
//! - Project: `./slipway.toml` - per-directory overrides
//!
//! The project file takes precedence: its toolchain replaces the global
//! one wholesale, and its providers override the global set per slot.
//! The configuration is where the external dependency-resolution system
//! records its choices - slipway treats every provider entry as final.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::core::provider::{Provider, ProviderSet, Virtual};
use crate::core::spec::Toolchain;
use crate::util::context::GlobalContext;

/// Materialized configuration after overlaying project on global.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Toolchain facts for the selected compiler family.
    pub toolchain: Option<Toolchain>,

    /// Providers chosen for each virtual dependency.
    pub providers: ProviderSet,

    /// Root directory for install prefixes.
    pub install_root: Option<PathBuf>,
}

/// On-disk configuration schema.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    toolchain: Option<Toolchain>,
    providers: BTreeMap<Virtual, Provider>,
    install_root: Option<PathBuf>,
}

impl ConfigFile {
    fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config: {}", path.display()))
    }

    fn load_if_exists(path: &Path) -> Result<Option<Self>> {
        if path.exists() {
            Ok(Some(Self::load(path)?))
        } else {
            Ok(None)
        }
    }
}

impl Config {
    /// Load configuration for a context, overlaying the project file on
    /// the global one.
    pub fn load(ctx: &GlobalContext) -> Result<Self> {
        let global = ConfigFile::load_if_exists(&ctx.config_path())?;
        let project = ConfigFile::load_if_exists(&ctx.project_config_path())?;
        Ok(Self::merge(global, project))
    }

    fn merge(global: Option<ConfigFile>, project: Option<ConfigFile>) -> Self {
        let mut config = Config::default();

        for file in [global, project].into_iter().flatten() {
            if file.toolchain.is_some() {
                config.toolchain = file.toolchain;
            }
            if file.install_root.is_some() {
                config.install_root = file.install_root;
            }
            for (slot, provider) in file.providers {
                config.providers.insert(slot, provider);
            }
        }

        config
    }

    /// The configured toolchain, or an error telling the user what to
    /// write.
    pub fn require_toolchain(&self) -> Result<&Toolchain> {
        self.toolchain.as_ref().ok_or_else(|| {
            anyhow::anyhow!(
                "no [toolchain] configured\n{}",
                crate::util::diagnostic::suggestions::NO_CONFIG
            )
        })
    }

    /// Install root, falling back to the context default.
    pub fn install_root(&self, ctx: &GlobalContext) -> PathBuf {
        self.install_root
            .clone()
            .unwrap_or_else(|| ctx.default_install_root())
    }
}
