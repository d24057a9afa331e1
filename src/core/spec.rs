//! Target specification - the resolved build request.
//!
//! A `TargetSpec` is the complete input to resolution: which recipe at
//! which version, the requested variants, the toolchain facts, and the
//! providers chosen for each virtual dependency. It is immutable once
//! constructed and owned by the resolver invocation consuming it.
//!
//! The `SpecRequest` half of this module parses command-line spec
//! strings such as `vasp@6.5.1 +openmp ~shmem %gnu cuda_arch=70,80`.

use std::path::PathBuf;
use std::str::FromStr;

use semver::Version;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::family::CompilerFamily;
use crate::core::provider::ProviderSet;
use crate::core::variant::VariantSet;
use crate::core::version::VersionId;

/// Toolchain facts for the selected compiler family.
///
/// Command names are the literal driver invocations placed into build
/// plans (`mpifc` ends up on the template's `FC =` line verbatim).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toolchain {
    /// Compiler family.
    pub family: CompilerFamily,

    /// Compiler version (drives version-gated family rules).
    pub version: Version,

    /// Vendor toolchain install prefix, when the family ships as an SDK
    /// (nvhpc derives its qd-emulation paths from this).
    #[serde(default)]
    pub prefix: Option<PathBuf>,

    /// Target architecture family name, e.g. `x86_64` or `aarch64`.
    #[serde(default = "default_target_arch")]
    pub target_arch: String,

    /// C compiler command.
    pub cc: String,

    /// C++ compiler command.
    pub cxx: String,

    /// Fortran compiler command.
    pub fc: String,

    /// MPI C wrapper command.
    pub mpicc: String,

    /// MPI Fortran wrapper command.
    pub mpifc: String,

    /// Link tokens for the C++ standard library, e.g. `["-lstdc++"]`.
    #[serde(default)]
    pub stdcxx_libs: Vec<String>,
}

fn default_target_arch() -> String {
    "x86_64".to_string()
}

impl Default for Toolchain {
    fn default() -> Self {
        Toolchain {
            family: CompilerFamily::Gnu,
            version: Version::new(13, 2, 0),
            prefix: None,
            target_arch: default_target_arch(),
            cc: "gcc".to_string(),
            cxx: "g++".to_string(),
            fc: "gfortran".to_string(),
            mpicc: "mpicc".to_string(),
            mpifc: "mpif90".to_string(),
            stdcxx_libs: vec!["-lstdc++".to_string()],
        }
    }
}

/// The complete, resolved build request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetSpec {
    /// Recipe name.
    pub name: String,

    /// Requested release version.
    pub version: VersionId,

    /// Requested variant values (defaults are overlaid by the resolver).
    pub variants: VariantSet,

    /// Toolchain facts.
    pub toolchain: Toolchain,

    /// Chosen providers for each virtual dependency.
    pub providers: ProviderSet,
}

impl TargetSpec {
    /// Create a spec with empty variants and providers.
    pub fn new(name: impl Into<String>, version: impl Into<VersionId>, toolchain: Toolchain) -> Self {
        TargetSpec {
            name: name.into(),
            version: version.into(),
            variants: VariantSet::new(),
            toolchain,
            providers: ProviderSet::new(),
        }
    }
}

/// A parsed command-line spec string.
///
/// Carries only what the user typed; version defaults, toolchain facts,
/// and providers are attached from configuration afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpecRequest {
    pub name: String,
    pub version: Option<VersionId>,
    pub variants: VariantSet,
    pub family: Option<CompilerFamily>,
}

/// Error parsing a spec string.
#[derive(Debug, Clone, Error)]
pub enum SpecParseError {
    #[error("empty spec string")]
    Empty,

    #[error("bad spec token `{0}` (expected +feature, ~feature, %family, or key=value)")]
    BadToken(String),

    #[error("{0}")]
    BadFamily(#[from] crate::core::family::CompilerFamilyParseError),

    #[error("duplicate version in spec (both `{0}` and `{1}`)")]
    DuplicateVersion(String, String),
}

impl FromStr for SpecRequest {
    type Err = SpecParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut tokens = s.split_whitespace();

        let head = tokens.next().ok_or(SpecParseError::Empty)?;
        let (name, version) = match head.split_once('@') {
            Some((name, version)) => (name.to_string(), Some(VersionId::new(version))),
            None => (head.to_string(), None),
        };
        if name.is_empty() {
            return Err(SpecParseError::BadToken(head.to_string()));
        }

        let mut request = SpecRequest {
            name,
            version,
            variants: VariantSet::new(),
            family: None,
        };

        for token in tokens {
            if let Some(feature) = token.strip_prefix('+') {
                request.variants.set_bool(feature, true);
            } else if let Some(feature) = token.strip_prefix('~').or_else(|| token.strip_prefix('-')) {
                request.variants.set_bool(feature, false);
            } else if let Some(family) = token.strip_prefix('%') {
                request.family = Some(family.parse()?);
            } else if let Some((key, values)) = token.split_once('=') {
                let values: Vec<String> = values
                    .split(',')
                    .filter(|v| !v.is_empty())
                    .map(str::to_string)
                    .collect();
                request.variants.set_list(key, values);
            } else if let Some(version) = token.strip_prefix('@') {
                match &request.version {
                    Some(existing) => {
                        return Err(SpecParseError::DuplicateVersion(
                            existing.to_string(),
                            version.to_string(),
                        ))
                    }
                    None => request.version = Some(VersionId::new(version)),
                }
            } else {
                return Err(SpecParseError::BadToken(token.to_string()));
            }
        }

        Ok(request)
    }
}
