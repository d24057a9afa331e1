//! Build-tool invocation and artifact installation.
//!
//! All invocations are sequential, blocking subprocesses; a nonzero
//! exit aborts the build with the tool's stderr attached. The plan's
//! build-environment overlay is applied to the child process only.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::core::plan::EnvAction;
use crate::util::fs::{copy_tree, ensure_dir};
use crate::util::process::{find_build_tool, ProcessBuilder};

/// Assemble the `make` invocation for a staged makefile build.
pub fn make_command(
    make: &Path,
    build_dir: &Path,
    make_args: &[String],
    env: &[EnvAction],
    jobs: Option<usize>,
) -> ProcessBuilder {
    let mut builder = ProcessBuilder::new(make).cwd(build_dir).overlay(env);
    if let Some(jobs) = jobs {
        builder = builder.arg(format!("-j{}", jobs));
    }
    builder.args(make_args)
}

/// Run `make` in the staged source tree.
pub fn run_make(
    build_dir: &Path,
    make_args: &[String],
    env: &[EnvAction],
    jobs: Option<usize>,
) -> Result<()> {
    let make = find_build_tool("make")?;
    let cmd = make_command(&make, build_dir, make_args, env, jobs);
    tracing::info!("running `{}`", cmd.display_command());
    cmd.exec_streaming()
}

/// Assemble the CMake configure invocation.
pub fn cmake_configure_command(
    cmake: &Path,
    source_dir: &Path,
    build_dir: &Path,
    prefix: &Path,
    configure_args: &[String],
    env: &[EnvAction],
) -> ProcessBuilder {
    ProcessBuilder::new(cmake)
        .arg("-S")
        .arg(source_dir)
        .arg("-B")
        .arg(build_dir)
        .arg(format!("-DCMAKE_INSTALL_PREFIX={}", prefix.display()))
        .args(configure_args)
        .overlay(env)
}

/// Configure, build, and install a CMake source tree.
pub fn run_cmake(
    source_dir: &Path,
    build_dir: &Path,
    prefix: &Path,
    configure_args: &[String],
    env: &[EnvAction],
    jobs: Option<usize>,
) -> Result<()> {
    let cmake = find_build_tool("cmake")?;

    let configure = cmake_configure_command(&cmake, source_dir, build_dir, prefix, configure_args, env);
    tracing::info!("running `{}`", configure.display_command());
    configure.exec_streaming()?;

    let mut build = ProcessBuilder::new(&cmake)
        .arg("--build")
        .arg(build_dir)
        .overlay(env);
    if let Some(jobs) = jobs {
        build = build.arg("--parallel").arg(jobs.to_string());
    }
    build.exec_streaming()?;

    ProcessBuilder::new(&cmake)
        .arg("--install")
        .arg(build_dir)
        .exec_streaming()
}

/// Copy the named subtrees of a finished build into the prefix.
pub fn install_trees(build_dir: &Path, trees: &[&str], prefix: &Path) -> Result<()> {
    ensure_dir(prefix)?;

    for tree in trees {
        let src = build_dir.join(tree);
        if !src.exists() {
            bail!(
                "build finished but `{}` was not produced in {}",
                tree,
                build_dir.display()
            );
        }
        copy_tree(&src, &prefix.join(tree))
            .with_context(|| format!("failed to install `{}` into {}", tree, prefix.display()))?;
    }
    Ok(())
}

/// Unpack a still-packed release archive straight into the prefix.
pub fn unpack_into_prefix(archive: &Path, prefix: &Path) -> Result<()> {
    ensure_dir(prefix)?;
    crate::sources::archive::extract_tgz(archive, prefix)
}

/// The install prefix for a spec under an install root.
pub fn install_prefix(root: &Path, name: &str, version: &str, fingerprint: &str) -> PathBuf {
    root.join(format!("{}-{}-{}", name, version, fingerprint))
}
