//! The resolver's output - a complete, internally consistent build plan.
//!
//! A plan is pure data: ordered flag lists, the chosen template, the
//! substitutions to apply to it, and the environment overlay. It is
//! consumed by the builder, which performs all filesystem and process
//! work. Identical specs always produce byte-identical plans.

use serde::{Deserialize, Serialize};

/// A textual substitution applied to the base template file.
///
/// `pattern` is a line-anchored regex matched against the *original*
/// template text only; replacements are never re-scanned by later
/// substitutions. `replacement` is literal text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Substitution {
    pub pattern: String,
    pub replacement: String,

    /// Match `pattern` as a literal string instead of a regex.
    #[serde(default)]
    pub literal: bool,
}

impl Substitution {
    /// Create a regex substitution.
    pub fn new(pattern: impl Into<String>, replacement: impl Into<String>) -> Self {
        Substitution {
            pattern: pattern.into(),
            replacement: replacement.into(),
            literal: false,
        }
    }

    /// Create a literal-string substitution.
    pub fn literal(pattern: impl Into<String>, replacement: impl Into<String>) -> Self {
        Substitution {
            pattern: pattern.into(),
            replacement: replacement.into(),
            literal: true,
        }
    }
}

/// An action to apply to a process environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum EnvAction {
    /// Set a variable, replacing any existing value.
    Set { name: String, value: String },
    /// Prepend a path-list entry to a variable.
    PathPrepend { name: String, value: String },
}

/// Environment changes for the build phase and, separately, run time.
///
/// The resolver only records these; the builder applies build actions to
/// the spawned build tool, and `slipway env` renders run actions as
/// shell exports. Nothing mutates the parent process environment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentOverlay {
    #[serde(default)]
    pub build: Vec<EnvAction>,

    #[serde(default)]
    pub run: Vec<EnvAction>,
}

impl EnvironmentOverlay {
    /// Set a build-time variable.
    pub fn set_build(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.build.push(EnvAction::Set {
            name: name.into(),
            value: value.into(),
        });
    }

    /// Prepend to a build-time path variable.
    pub fn prepend_build_path(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.build.push(EnvAction::PathPrepend {
            name: name.into(),
            value: value.into(),
        });
    }

    /// Set a run-time variable.
    pub fn set_run(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.run.push(EnvAction::Set {
            name: name.into(),
            value: value.into(),
        });
    }

    /// Prepend to a run-time path variable.
    pub fn prepend_run_path(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.run.push(EnvAction::PathPrepend {
            name: name.into(),
            value: value.into(),
        });
    }

    /// True if neither phase has actions.
    pub fn is_empty(&self) -> bool {
        self.build.is_empty() && self.run.is_empty()
    }
}

/// A complete build plan.
///
/// All lists are ordered; the order is part of the contract because the
/// substitution step is textual. A plan never references a flag or path
/// for a feature that was not enabled in the originating spec.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildPlan {
    /// Base template file inside the source tree, e.g.
    /// `arch/makefile.include.gnu`. `None` for recipes that do not edit
    /// a template (CMake- and binary-based builds).
    pub template: Option<String>,

    /// Preprocessor defines, e.g. `-DMPI`.
    pub defines: Vec<String>,

    /// C compiler flags.
    pub cflags: Vec<String>,

    /// C++ compiler flags.
    pub cxxflags: Vec<String>,

    /// Fortran compiler flags.
    pub fflags: Vec<String>,

    /// Linker tokens (library search paths and libraries).
    pub ldflags: Vec<String>,

    /// Include-path tokens.
    pub includes: Vec<String>,

    /// Configure arguments for CMake-style recipes.
    pub configure_args: Vec<String>,

    /// Substitutions to apply to the template, in order. Computed only
    /// after every flag list above is final.
    pub substitutions: Vec<Substitution>,

    /// Environment overlay for build and run phases.
    pub env: EnvironmentOverlay,
}

impl BuildPlan {
    /// True if the define list contains `define` exactly.
    pub fn has_define(&self, define: &str) -> bool {
        self.defines.iter().any(|d| d == define)
    }

    /// Every flag-list token in the plan, in plan order. Used by tests
    /// asserting superset relations between plans.
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.defines
            .iter()
            .chain(&self.cflags)
            .chain(&self.cxxflags)
            .chain(&self.fflags)
            .chain(&self.ldflags)
            .chain(&self.includes)
            .chain(&self.configure_args)
            .map(String::as_str)
    }
}
