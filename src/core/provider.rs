//! Dependency providers - concrete packages satisfying abstract virtuals.
//!
//! The external dependency-resolution system picks one provider per
//! virtual (which MPI, which BLAS) and hands slipway its install prefix
//! plus opaque include/link flag strings. Slipway never parses those
//! tokens; it only places them.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use semver::Version;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An abstract dependency slot a provider can fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Virtual {
    Mpi,
    Blas,
    Lapack,
    FftwApi,
    Scalapack,
    Nccl,
    Hdf5,
    Cuda,
}

impl Virtual {
    /// Get the virtual name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Virtual::Mpi => "mpi",
            Virtual::Blas => "blas",
            Virtual::Lapack => "lapack",
            Virtual::FftwApi => "fftw-api",
            Virtual::Scalapack => "scalapack",
            Virtual::Nccl => "nccl",
            Virtual::Hdf5 => "hdf5",
            Virtual::Cuda => "cuda",
        }
    }
}

impl fmt::Display for Virtual {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error parsing a virtual name.
#[derive(Debug, Clone, Error)]
#[error("unknown virtual dependency `{0}`")]
pub struct VirtualParseError(pub String);

impl FromStr for Virtual {
    type Err = VirtualParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mpi" => Ok(Virtual::Mpi),
            "blas" => Ok(Virtual::Blas),
            "lapack" => Ok(Virtual::Lapack),
            "fftw-api" => Ok(Virtual::FftwApi),
            "scalapack" => Ok(Virtual::Scalapack),
            "nccl" => Ok(Virtual::Nccl),
            "hdf5" => Ok(Virtual::Hdf5),
            "cuda" => Ok(Virtual::Cuda),
            other => Err(VirtualParseError(other.to_string())),
        }
    }
}

/// A concrete dependency chosen by the external resolution system.
///
/// `include_flags` and `link_flags` are opaque tokens supplied by that
/// system; slipway copies them into plans verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provider {
    /// Concrete package name, e.g. `openmpi` or `amdfftw`.
    pub name: String,

    /// Provider version.
    pub version: Version,

    /// Install prefix of the provider.
    pub prefix: PathBuf,

    /// Opaque include-flag string, e.g. `-I/opt/fftw/include`.
    #[serde(default)]
    pub include_flags: String,

    /// Opaque link-flag string, e.g. `-L/opt/fftw/lib -lfftw3`.
    #[serde(default)]
    pub link_flags: String,
}

impl Provider {
    /// Create a provider with empty flag tokens.
    pub fn new(name: impl Into<String>, version: Version, prefix: impl Into<PathBuf>) -> Self {
        Provider {
            name: name.into(),
            version,
            prefix: prefix.into(),
            include_flags: String::new(),
            link_flags: String::new(),
        }
    }

    /// Attach the opaque include-flag token.
    pub fn with_include_flags(mut self, flags: impl Into<String>) -> Self {
        self.include_flags = flags.into();
        self
    }

    /// Attach the opaque link-flag token.
    pub fn with_link_flags(mut self, flags: impl Into<String>) -> Self {
        self.link_flags = flags.into();
        self
    }
}

/// The chosen providers of a spec, keyed by virtual.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderSet {
    providers: BTreeMap<Virtual, Provider>,
}

impl ProviderSet {
    /// Create an empty provider set.
    pub fn new() -> Self {
        ProviderSet::default()
    }

    /// Assign a provider to a virtual slot.
    pub fn insert(&mut self, slot: Virtual, provider: Provider) {
        self.providers.insert(slot, provider);
    }

    /// Builder-style assignment.
    pub fn with(mut self, slot: Virtual, provider: Provider) -> Self {
        self.insert(slot, provider);
        self
    }

    /// Look up the provider for a slot.
    pub fn get(&self, slot: Virtual) -> Option<&Provider> {
        self.providers.get(&slot)
    }

    /// True if the slot has a provider.
    pub fn contains(&self, slot: Virtual) -> bool {
        self.providers.contains_key(&slot)
    }

    /// Iterate `(slot, provider)` in stable order.
    pub fn iter(&self) -> impl Iterator<Item = (Virtual, &Provider)> {
        self.providers.iter().map(|(slot, p)| (*slot, p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_virtual_roundtrip() {
        for slot in [Virtual::Mpi, Virtual::FftwApi, Virtual::Scalapack] {
            assert_eq!(slot.as_str().parse::<Virtual>().unwrap(), slot);
        }
        assert!("fftw_api".parse::<Virtual>().is_err());
    }

    #[test]
    fn test_provider_set_lookup() {
        let set = ProviderSet::new().with(
            Virtual::Blas,
            Provider::new("openblas", Version::new(0, 3, 27), "/opt/openblas")
                .with_link_flags("-L/opt/openblas/lib -lopenblas"),
        );

        assert!(set.contains(Virtual::Blas));
        assert!(!set.contains(Virtual::Mpi));
        assert_eq!(
            set.get(Virtual::Blas).unwrap().link_flags,
            "-L/opt/openblas/lib -lopenblas"
        );
    }

    #[test]
    fn test_provider_toml_deserialization() {
        let provider: Provider = toml::from_str(
            r#"
            name = "fftw"
            version = "3.3.10"
            prefix = "/opt/fftw"
            include_flags = "-I/opt/fftw/include"
            "#,
        )
        .unwrap();

        assert_eq!(provider.name, "fftw");
        assert_eq!(provider.version, Version::new(3, 3, 10));
        assert!(provider.link_flags.is_empty());
    }
}
