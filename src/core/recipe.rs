//! Recipe declarations - what a package knows about building itself.
//!
//! A recipe is declarative data (releases, variant vocabulary, supported
//! families, constraints) plus one pure step: `assemble`, which turns a
//! validated spec into a build plan. Dispatch is on declared data, never
//! on type hierarchy; a recipe composes a build system kind with
//! whatever capability declarations it needs.

use crate::core::family::CompilerFamily;
use crate::core::plan::BuildPlan;
use crate::core::provider::{Provider, Virtual};
use crate::core::spec::TargetSpec;
use crate::core::variant::{VariantDef, VariantSet};
use crate::core::version::VersionId;
use crate::resolver::errors::ResolveError;

/// How a recipe's build is driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildSystem {
    /// Edit a makefile template, then run `make`.
    Makefile,
    /// Configure, build, and install with CMake.
    CMake,
    /// Unpack a prebuilt archive into the install prefix.
    Binary,
}

impl BuildSystem {
    /// Get the build-system name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildSystem::Makefile => "makefile",
            BuildSystem::CMake => "cmake",
            BuildSystem::Binary => "binary",
        }
    }
}

/// Git reference for git-sourced releases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitReference {
    DefaultBranch,
    Branch(String),
    Tag(String),
    Rev(String),
}

/// Where a release's source comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceKind {
    /// Checksummed archive (`https`, `http`, or `file` URL).
    Archive {
        url: String,
        sha256: String,
        /// Extract at stage time. Prebuilt-binary releases stay packed
        /// and are unpacked straight into the install prefix.
        expand: bool,
    },
    /// Git checkout.
    Git { url: String, reference: GitReference },
}

/// One installable release of a recipe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
    pub version: VersionId,
    pub source: SourceKind,
}

impl Release {
    /// Declare an expanded, checksummed archive release.
    pub fn archive(version: impl Into<VersionId>, url: impl Into<String>, sha256: impl Into<String>) -> Self {
        Release {
            version: version.into(),
            source: SourceKind::Archive {
                url: url.into(),
                sha256: sha256.into(),
                expand: true,
            },
        }
    }

    /// Declare a checksummed archive release that stays packed at stage
    /// time.
    pub fn packed_archive(
        version: impl Into<VersionId>,
        url: impl Into<String>,
        sha256: impl Into<String>,
    ) -> Self {
        Release {
            version: version.into(),
            source: SourceKind::Archive {
                url: url.into(),
                sha256: sha256.into(),
                expand: false,
            },
        }
    }

    /// Declare a git release.
    pub fn git(version: impl Into<VersionId>, url: impl Into<String>, reference: GitReference) -> Self {
        Release {
            version: version.into(),
            source: SourceKind::Git {
                url: url.into(),
                reference,
            },
        }
    }
}

/// A declared constraint, checked before any flag assembly.
///
/// Constraints mirror the compatibility facts a recipe knows about
/// itself; violating one is a hard resolution failure, never a silent
/// fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    /// Enabling `feature` requires this compiler family.
    FeatureNeedsFamily {
        feature: &'static str,
        family: CompilerFamily,
        /// How the requirement reads in the error, e.g. `vendor compiler`.
        requirement: &'static str,
    },

    /// Enabling `feature` requires a non-empty list value for `variant`.
    FeatureNeedsList {
        feature: &'static str,
        variant: &'static str,
        requirement: &'static str,
    },

    /// Choosing `provider` for `slot` requires this compiler family.
    ProviderNeedsFamily {
        slot: Virtual,
        provider: &'static str,
        family: CompilerFamily,
        requirement: &'static str,
    },

    /// The family's compiler must be at least this major version.
    FamilyMinimumVersion {
        family: CompilerFamily,
        minimum: u64,
        requirement: &'static str,
    },

    /// The family branch exists only from this recipe release on.
    FamilyMinimumRelease {
        family: CompilerFamily,
        minimum: (u64, u64, u64),
        requirement: &'static str,
    },
}

/// A recipe: declarative metadata plus the pure flag-assembly step.
pub trait Recipe: Send + Sync {
    /// Recipe name, e.g. `vasp`.
    fn name(&self) -> &'static str;

    /// One-line description.
    fn summary(&self) -> &'static str;

    /// Upstream homepage.
    fn homepage(&self) -> &'static str;

    /// How the build is driven.
    fn build_system(&self) -> BuildSystem;

    /// Known releases, newest first.
    fn releases(&self) -> Vec<Release>;

    /// Declared variant vocabulary. Requests outside this vocabulary
    /// fail resolution.
    fn variants(&self) -> Vec<VariantDef> {
        Vec::new()
    }

    /// Compiler families with a configuration branch in this recipe.
    fn supported_families(&self) -> &'static [CompilerFamily];

    /// Declared compatibility constraints.
    fn constraints(&self) -> Vec<Constraint> {
        Vec::new()
    }

    /// Virtual dependencies that must have providers, given the
    /// effective variants.
    fn required_virtuals(&self, _variants: &VariantSet) -> Vec<Virtual> {
        Vec::new()
    }

    /// Arguments passed to `make` for makefile builds.
    fn make_args(&self) -> Vec<String> {
        vec!["all".to_string()]
    }

    /// Subtrees of the build directory copied into the install prefix
    /// after a makefile build.
    fn install_trees(&self) -> &'static [&'static str] {
        &[]
    }

    /// The archive must be supplied locally rather than downloaded
    /// (license-restricted upstreams).
    fn manual_download(&self) -> bool {
        false
    }

    /// Assemble the build plan. Called only after validation has
    /// accepted the spec; must be pure and deterministic.
    fn assemble(&self, spec: &TargetSpec) -> Result<BuildPlan, ResolveError>;

    /// Find the release matching a version.
    fn release_for(&self, version: &VersionId) -> Option<Release> {
        self.releases().into_iter().find(|r| &r.version == version)
    }

    /// The preferred release, used when a spec names no version. The
    /// first declared release wins, so `latest`-style branch trackers
    /// never beat a tagged release by accident.
    fn default_release(&self) -> Release {
        self.releases()
            .into_iter()
            .next()
            .unwrap_or_else(|| panic!("recipe `{}` declares no releases", self.name()))
    }
}

/// Fetch a provider or fail with the resolver's missing-prerequisite
/// error. Recipes use this inside `assemble` for slots that validation
/// guarantees, keeping `?` flow instead of panics.
pub fn require_provider<'s>(
    spec: &'s TargetSpec,
    slot: Virtual,
    needed_by: &str,
) -> Result<&'s Provider, ResolveError> {
    spec.providers.get(slot).ok_or_else(|| ResolveError::MissingPrerequisite {
        what: slot.to_string(),
        needed_by: needed_by.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_release_constructors() {
        let archive = Release::archive("6.5.1", "file://./vasp-6.5.1.tgz", "aa".repeat(32));
        assert!(matches!(
            archive.source,
            SourceKind::Archive { expand: true, .. }
        ));

        let packed = Release::packed_archive("0.9.0", "https://example.com/x.tgz", "bb".repeat(32));
        assert!(matches!(
            packed.source,
            SourceKind::Archive { expand: false, .. }
        ));

        let git = Release::git("latest", "https://example.com/r.git", GitReference::DefaultBranch);
        assert!(matches!(git.source, SourceKind::Git { .. }));
    }

    #[test]
    fn test_build_system_names() {
        assert_eq!(BuildSystem::Makefile.as_str(), "makefile");
        assert_eq!(BuildSystem::CMake.as_str(), "cmake");
        assert_eq!(BuildSystem::Binary.as_str(), "binary");
    }
}
