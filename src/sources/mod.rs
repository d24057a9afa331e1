//! Release sources.
//!
//! Sources fetch a release into a per-build stage directory: archives
//! are downloaded (or found locally), checksum-verified, and extracted;
//! git references are checked out from a cached clone. Staging never
//! touches the install prefix.

pub mod archive;
pub mod git;

pub use git::GitSource;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use walkdir::WalkDir;

use crate::core::recipe::{Recipe, Release, SourceKind};
use crate::util::context::GlobalContext;
use crate::util::fs::{ensure_dir, sole_subdirectory};

/// What staging produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StagedSource {
    /// An extracted source tree, rooted at the returned path.
    Tree(PathBuf),
    /// A still-packed archive (prebuilt-binary releases).
    Archive(PathBuf),
}

/// Fetch a release into `stage_dir`.
pub fn stage(
    recipe: &dyn Recipe,
    release: &Release,
    ctx: &GlobalContext,
    stage_dir: &Path,
) -> Result<StagedSource> {
    match &release.source {
        SourceKind::Archive { url, sha256, expand } => {
            let cached = archive::fetch(
                recipe.name(),
                url,
                sha256,
                recipe.manual_download(),
                ctx.cwd(),
                &ctx.archive_cache_dir(),
            )?;

            if *expand {
                let src_dir = stage_dir.join("src");
                archive::extract_tgz(&cached, &src_dir)?;
                // Tarballs usually unpack to a single top-level directory.
                let root = sole_subdirectory(&src_dir)?.unwrap_or(src_dir);
                Ok(StagedSource::Tree(root))
            } else {
                Ok(StagedSource::Archive(cached))
            }
        }

        SourceKind::Git { url, reference } => {
            let mut source = GitSource::new(url, reference.clone(), &ctx.git_cache_dir())?;
            let checkout = source.obtain()?.to_path_buf();

            let src_dir = stage_dir.join("src");
            copy_tree_sans_git(&checkout, &src_dir)?;
            Ok(StagedSource::Tree(src_dir))
        }
    }
}

/// Copy a checkout into the stage, leaving `.git` behind so builds
/// cannot depend on repository state.
fn copy_tree_sans_git(src: &Path, dst: &Path) -> Result<()> {
    ensure_dir(dst)?;

    let walker = WalkDir::new(src)
        .into_iter()
        .filter_entry(|e| e.file_name() != ".git");

    for entry in walker {
        let entry = entry.with_context(|| format!("failed to walk {}", src.display()))?;
        let rel = entry
            .path()
            .strip_prefix(src)
            .expect("walkdir yields paths under its root");
        if rel.as_os_str().is_empty() {
            continue;
        }
        let target = dst.join(rel);

        if entry.file_type().is_dir() {
            ensure_dir(&target)?;
        } else {
            std::fs::copy(entry.path(), &target).with_context(|| {
                format!("failed to copy {} to {}", entry.path().display(), target.display())
            })?;
        }
    }
    Ok(())
}
