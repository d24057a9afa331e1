//! The applier - everything after resolution.
//!
//! Orchestrates stage, configure, build, and install for one resolved
//! spec. The resolver never touches the filesystem or environment;
//! every side effect of a build lives here.

pub mod executor;
pub mod template;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use crate::core::plan::BuildPlan;
use crate::core::recipe::{BuildSystem, Recipe};
use crate::core::spec::TargetSpec;
use crate::sources::{stage, StagedSource};
use crate::util::config::Config;
use crate::util::context::GlobalContext;
use crate::util::fs::{ensure_dir, remove_dir_all_if_exists};
use crate::util::hash::spec_fingerprint;

/// Options for an install run.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Parallel jobs for the build tool.
    pub jobs: Option<usize>,

    /// Keep the stage directory for debugging.
    pub keep_stage: bool,
}

/// The install prefix a spec resolves to under the configured root.
pub fn install_prefix(spec: &TargetSpec, config: &Config, ctx: &GlobalContext) -> PathBuf {
    executor::install_prefix(
        &config.install_root(ctx),
        &spec.name,
        spec.version.as_str(),
        &spec_fingerprint(spec),
    )
}

/// Build and install one resolved spec. Returns the install prefix.
pub fn install(
    recipe: &dyn Recipe,
    spec: &TargetSpec,
    plan: &BuildPlan,
    config: &Config,
    ctx: &GlobalContext,
    opts: &BuildOptions,
) -> Result<PathBuf> {
    let prefix = install_prefix(spec, config, ctx);
    if prefix.exists() {
        tracing::info!("{} already installed at {}", spec.name, prefix.display());
        return Ok(prefix);
    }

    let release = recipe
        .release_for(&spec.version)
        .with_context(|| format!("recipe `{}` has no release `{}`", spec.name, spec.version))?;

    let stage_dir = ctx.stage_root().join(format!(
        "{}-{}-{}",
        spec.name,
        spec.version,
        spec_fingerprint(spec)
    ));
    remove_dir_all_if_exists(&stage_dir)?;
    ensure_dir(&stage_dir)?;

    let staged = stage(recipe, &release, ctx, &stage_dir)
        .with_context(|| format!("failed to stage {}@{}", spec.name, spec.version))?;

    match recipe.build_system() {
        BuildSystem::Makefile => {
            let StagedSource::Tree(src) = staged else {
                bail!("makefile recipe `{}` staged no source tree", spec.name);
            };
            let template = plan
                .template
                .as_deref()
                .with_context(|| format!("makefile recipe `{}` chose no template", spec.name))?;

            // The chosen template becomes the tree's makefile.include.
            template::apply_to_file(
                &src.join(template),
                &plan.substitutions,
                &src.join("makefile.include"),
            )?;

            executor::run_make(&src, &recipe.make_args(), &plan.env.build, opts.jobs)?;
            executor::install_trees(&src, recipe.install_trees(), &prefix)?;
        }

        BuildSystem::CMake => {
            let StagedSource::Tree(src) = staged else {
                bail!("cmake recipe `{}` staged no source tree", spec.name);
            };
            let build_dir = stage_dir.join("build");
            executor::run_cmake(
                &src,
                &build_dir,
                &prefix,
                &plan.configure_args,
                &plan.env.build,
                opts.jobs,
            )?;
        }

        BuildSystem::Binary => {
            let StagedSource::Archive(archive) = staged else {
                bail!("binary recipe `{}` staged no archive", spec.name);
            };
            executor::unpack_into_prefix(&archive, &prefix)?;
        }
    }

    if !opts.keep_stage {
        remove_dir_all_if_exists(&stage_dir)?;
    }

    tracing::info!("installed {} to {}", spec.name, prefix.display());
    Ok(prefix)
}
