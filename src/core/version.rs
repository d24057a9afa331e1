//! Release version identifiers.
//!
//! Not every upstream tags semver (inference-engine snapshots are tagged
//! `b6276`, and `latest` tracks a branch), so a release version is the raw
//! upstream string with a semver view on the side for the recipes whose
//! conditional rules compare versions.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use semver::Version;
use serde::{Deserialize, Serialize};

/// An upstream release version identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionId(String);

impl VersionId {
    /// Create a version identifier from the raw upstream string.
    pub fn new(raw: impl Into<String>) -> Self {
        VersionId(raw.into())
    }

    /// Get the raw version string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse as semver, if the upstream string is one.
    ///
    /// Two-component versions (`23.9`) are padded with a zero patch so
    /// vendor-style release numbering still gets a semver view.
    pub fn semver(&self) -> Option<Version> {
        if let Ok(v) = Version::parse(&self.0) {
            return Some(v);
        }
        let dots = self.0.chars().filter(|c| *c == '.').count();
        if dots == 1 {
            return Version::parse(&format!("{}.0", self.0)).ok();
        }
        None
    }

    /// True if this version is semver and at least `major.minor.patch`.
    pub fn at_least(&self, major: u64, minor: u64, patch: u64) -> bool {
        match self.semver() {
            Some(v) => v >= Version::new(major, minor, patch),
            None => false,
        }
    }

    /// True if this version is semver and within `[min, max]` inclusive.
    pub fn in_range(&self, min: (u64, u64, u64), max: (u64, u64, u64)) -> bool {
        match self.semver() {
            Some(v) => {
                v >= Version::new(min.0, min.1, min.2) && v <= Version::new(max.0, max.1, max.2)
            }
            None => false,
        }
    }

    /// True if the raw string equals `other` exactly.
    pub fn is(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl fmt::Display for VersionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for VersionId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(VersionId::new(s))
    }
}

impl From<&str> for VersionId {
    fn from(s: &str) -> Self {
        VersionId::new(s)
    }
}

/// Semver versions order numerically; everything else falls back to a
/// lexicographic comparison on the raw string, with semver sorting above
/// non-semver so `latest`-style tags never win a "newest release" pick.
impl Ord for VersionId {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.semver(), other.semver()) {
            (Some(a), Some(b)) => a.cmp(&b),
            (Some(_), None) => Ordering::Greater,
            (None, Some(_)) => Ordering::Less,
            (None, None) => self.0.cmp(&other.0),
        }
    }
}

impl PartialOrd for VersionId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
