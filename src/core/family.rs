//! Compiler family identification.
//!
//! A family selects exactly one branch of a recipe's configuration tree.
//! Families partition resolution: rules from one family are never
//! evaluated while another is selected.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The compiler family a build is configured for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompilerFamily {
    /// GNU toolchain (gcc/g++/gfortran)
    Gnu,
    /// NVIDIA HPC SDK (nvc/nvc++/nvfortran)
    Nvhpc,
    /// AMD Optimizing Compilers (clang/flang based)
    Aocc,
    /// Fujitsu compilers (A64FX systems)
    Fujitsu,
}

impl CompilerFamily {
    /// All families slipway knows about.
    pub const ALL: [CompilerFamily; 4] = [
        CompilerFamily::Gnu,
        CompilerFamily::Nvhpc,
        CompilerFamily::Aocc,
        CompilerFamily::Fujitsu,
    ];

    /// Get the family name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            CompilerFamily::Gnu => "gnu",
            CompilerFamily::Nvhpc => "nvhpc",
            CompilerFamily::Aocc => "aocc",
            CompilerFamily::Fujitsu => "fujitsu",
        }
    }

    /// The OpenMP activation flag for this family's Fortran driver.
    pub fn openmp_flag(&self) -> &'static str {
        match self {
            CompilerFamily::Gnu | CompilerFamily::Aocc => "-fopenmp",
            CompilerFamily::Nvhpc => "-mp",
            CompilerFamily::Fujitsu => "-Kopenmp",
        }
    }
}

impl fmt::Display for CompilerFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error parsing a compiler family name.
#[derive(Debug, Clone, Error)]
#[error("unknown compiler family `{0}` (expected one of: gnu, nvhpc, aocc, fujitsu)")]
pub struct CompilerFamilyParseError(pub String);

impl FromStr for CompilerFamily {
    type Err = CompilerFamilyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gnu" | "gcc" => Ok(CompilerFamily::Gnu),
            "nvhpc" => Ok(CompilerFamily::Nvhpc),
            "aocc" => Ok(CompilerFamily::Aocc),
            "fujitsu" | "fj" => Ok(CompilerFamily::Fujitsu),
            other => Err(CompilerFamilyParseError(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_family() {
        assert_eq!("gnu".parse::<CompilerFamily>().unwrap(), CompilerFamily::Gnu);
        assert_eq!("gcc".parse::<CompilerFamily>().unwrap(), CompilerFamily::Gnu);
        assert_eq!("fj".parse::<CompilerFamily>().unwrap(), CompilerFamily::Fujitsu);
        assert!("icc".parse::<CompilerFamily>().is_err());
    }

    #[test]
    fn test_openmp_flags() {
        assert_eq!(CompilerFamily::Gnu.openmp_flag(), "-fopenmp");
        assert_eq!(CompilerFamily::Nvhpc.openmp_flag(), "-mp");
        assert_eq!(CompilerFamily::Fujitsu.openmp_flag(), "-Kopenmp");
    }

    #[test]
    fn test_display_roundtrip() {
        for family in CompilerFamily::ALL {
            assert_eq!(family.to_string().parse::<CompilerFamily>().unwrap(), family);
        }
    }
}
