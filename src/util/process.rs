//! Subprocess execution utilities.
//!
//! Environment overlays are applied to the spawned child only; the
//! parent process environment is never mutated.

use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use anyhow::{bail, Context, Result};

use crate::core::plan::EnvAction;
use crate::util::diagnostic::ToolNotFoundError;

/// Builder for subprocess execution.
#[derive(Debug, Clone)]
pub struct ProcessBuilder {
    program: PathBuf,
    args: Vec<String>,
    env: BTreeMap<String, String>,
    cwd: Option<PathBuf>,
}

impl ProcessBuilder {
    /// Create a new process builder for the given program.
    pub fn new(program: impl AsRef<Path>) -> Self {
        ProcessBuilder {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
            env: BTreeMap::new(),
            cwd: None,
        }
    }

    /// Add a single argument.
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_string_lossy().into_owned());
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args.extend(
            args.into_iter()
                .map(|s| s.as_ref().to_string_lossy().into_owned()),
        );
        self
    }

    /// Set an environment variable on the child.
    pub fn env(mut self, key: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.env
            .insert(key.as_ref().to_string(), value.as_ref().to_string());
        self
    }

    /// Apply environment-overlay actions to the child.
    ///
    /// Path prepends read the parent's current value once; repeated
    /// prepends to the same variable stack left to right.
    pub fn overlay(mut self, actions: &[EnvAction]) -> Self {
        for action in actions {
            match action {
                EnvAction::Set { name, value } => {
                    self.env.insert(name.clone(), value.clone());
                }
                EnvAction::PathPrepend { name, value } => {
                    let current = self
                        .env
                        .get(name)
                        .cloned()
                        .or_else(|| std::env::var(name).ok())
                        .unwrap_or_default();
                    let joined = if current.is_empty() {
                        value.clone()
                    } else {
                        format!("{}:{}", value, current)
                    };
                    self.env.insert(name.clone(), joined);
                }
            }
        }
        self
    }

    /// Set the working directory.
    pub fn cwd(mut self, cwd: impl AsRef<Path>) -> Self {
        self.cwd = Some(cwd.as_ref().to_path_buf());
        self
    }

    /// Get the environment the child will see (tests inspect this).
    pub fn get_env(&self) -> &BTreeMap<String, String> {
        &self.env
    }

    fn build_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);

        for (key, value) in &self.env {
            cmd.env(key, value);
        }

        if let Some(ref cwd) = self.cwd {
            cmd.current_dir(cwd);
        }

        cmd
    }

    /// Execute the command and wait for completion, capturing output.
    pub fn exec(&self) -> Result<Output> {
        let output = self
            .build_command()
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .with_context(|| format!("failed to spawn `{}`", self.program.display()))?;

        Ok(output)
    }

    /// Execute and require success. A nonzero exit is fatal with stderr
    /// attached; nothing is retried.
    pub fn exec_and_check(&self) -> Result<Output> {
        let output = self.exec()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!(
                "`{}` failed with exit code {:?}\n{}",
                self.display_command(),
                output.status.code(),
                stderr
            );
        }
        Ok(output)
    }

    /// Execute, streaming output to the parent's stdio, and require
    /// success. Used for build tools whose progress the user wants live.
    pub fn exec_streaming(&self) -> Result<()> {
        let status = self
            .build_command()
            .status()
            .with_context(|| format!("failed to spawn `{}`", self.program.display()))?;

        if !status.success() {
            bail!(
                "`{}` failed with exit code {:?}",
                self.display_command(),
                status.code()
            );
        }
        Ok(())
    }

    /// Display the command for error messages.
    pub fn display_command(&self) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }
}

/// Find a build tool in PATH, failing with a helpful diagnostic.
pub fn find_build_tool(name: &str) -> Result<PathBuf> {
    which::which(name).map_err(|_| {
        ToolNotFoundError {
            tool: name.to_string(),
        }
        .into()
    })
}
