//! Ollama - model-serving binary, prebuilt-archive recipe.
//!
//! Nothing is compiled: the release archive stays packed at stage time
//! and is unpacked straight into the install prefix.

use crate::core::family::CompilerFamily;
use crate::core::plan::BuildPlan;
use crate::core::recipe::{BuildSystem, Recipe, Release};
use crate::core::spec::TargetSpec;
use crate::resolver::errors::ResolveError;

/// Get up and running with large language models.
pub struct Ollama;

impl Recipe for Ollama {
    fn name(&self) -> &'static str {
        "ollama"
    }

    fn summary(&self) -> &'static str {
        "Local model-serving runtime (prebuilt binary)"
    }

    fn homepage(&self) -> &'static str {
        "https://ollama.com"
    }

    fn build_system(&self) -> BuildSystem {
        BuildSystem::Binary
    }

    fn releases(&self) -> Vec<Release> {
        vec![
            Release::packed_archive(
                "0.12.10",
                "https://github.com/ollama/ollama/releases/download/v0.12.10/ollama-linux-amd64.tgz",
                "8f4bf70a9856a34ba71355745c2189a472e2691a020ebd2e242a58e4d2094722",
            ),
            Release::packed_archive(
                "0.12.6",
                "https://github.com/ollama/ollama/releases/download/v0.12.6/ollama-linux-amd64.tgz",
                "de82adce2ab79235115d511ff22fcb099ac53b67127870f12b80198c033ec0a1",
            ),
            Release::packed_archive(
                "0.9.0",
                "https://github.com/ollama/ollama/releases/download/v0.9.0/ollama-linux-amd64.tgz",
                "ae9cebd61552d6cf3c527cb88e3a4865a25f22950aa8bb5328887ffd96cfd22a",
            ),
        ]
    }

    fn supported_families(&self) -> &'static [CompilerFamily] {
        // No compilation happens; any configured family is acceptable.
        &CompilerFamily::ALL
    }

    fn assemble(&self, _spec: &TargetSpec) -> Result<BuildPlan, ResolveError> {
        Ok(BuildPlan::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::recipe::SourceKind;
    use crate::resolver::resolve;
    use crate::test_support::{fujitsu_toolchain, gnu_toolchain};

    #[test]
    fn test_plan_is_empty() {
        let spec = TargetSpec::new("ollama", "0.12.10", gnu_toolchain());
        let plan = resolve(&Ollama, &spec).unwrap();

        assert!(plan.template.is_none());
        assert!(plan.tokens().next().is_none());
        assert!(plan.substitutions.is_empty());
        assert!(plan.env.is_empty());
    }

    #[test]
    fn test_any_family_is_accepted() {
        let spec = TargetSpec::new("ollama", "0.9.0", fujitsu_toolchain());
        assert!(resolve(&Ollama, &spec).is_ok());
    }

    #[test]
    fn test_releases_stay_packed() {
        for release in Ollama.releases() {
            assert!(matches!(
                release.source,
                SourceKind::Archive { expand: false, .. }
            ));
        }
    }

    #[test]
    fn test_default_release_is_newest() {
        assert_eq!(Ollama.default_release().version.as_str(), "0.12.10");
    }

    #[test]
    fn test_unknown_variant_rejected() {
        let mut spec = TargetSpec::new("ollama", "0.12.10", gnu_toolchain());
        spec.variants.set_bool("cuda", true);

        let err = resolve(&Ollama, &spec).unwrap_err();
        assert!(matches!(err, ResolveError::UnknownFeature { .. }));
    }
}
