//! Build-configuration resolution.
//!
//! `resolve` maps a `TargetSpec` to a `BuildPlan` through a fixed
//! pipeline: variant-vocabulary validation, compiler-family check,
//! declared-constraint check, provider-presence check, then the
//! recipe's own flag assembly. The whole pipeline is pure - no
//! filesystem, no process environment - so concurrent invocations for
//! independent specs need no coordination, and identical specs always
//! produce byte-identical plans.

pub mod errors;

pub use errors::ResolveError;

use crate::core::plan::BuildPlan;
use crate::core::recipe::{Constraint, Recipe};
use crate::core::spec::TargetSpec;
use crate::core::variant::{VariantDef, VariantSet, VariantValue};

/// Resolve a spec against a recipe, producing a complete build plan.
///
/// All error conditions surface before any plan content is assembled;
/// partial plans are never exposed.
pub fn resolve(recipe: &dyn Recipe, spec: &TargetSpec) -> Result<BuildPlan, ResolveError> {
    let defs = recipe.variants();

    // Unknown variant names fail fast rather than being ignored.
    for name in spec.variants.names() {
        if !defs.iter().any(|d| d.name == name) {
            return Err(ResolveError::UnknownFeature {
                recipe: recipe.name().to_string(),
                feature: name.to_string(),
                known: defs.iter().map(|d| d.name.to_string()).collect(),
            });
        }
    }

    let family = spec.toolchain.family;
    if !recipe.supported_families().contains(&family) {
        return Err(ResolveError::UnsupportedCompiler {
            recipe: recipe.name().to_string(),
            family: family.to_string(),
            supported: recipe
                .supported_families()
                .iter()
                .map(|f| f.to_string())
                .collect(),
        });
    }

    let effective = effective_variants(&defs, &spec.variants)?;
    let spec = TargetSpec {
        variants: effective,
        ..spec.clone()
    };

    check_constraints(recipe, &spec)?;

    for slot in recipe.required_virtuals(&spec.variants) {
        if !spec.providers.contains(slot) {
            return Err(ResolveError::MissingPrerequisite {
                what: slot.to_string(),
                needed_by: format!("recipe `{}`", recipe.name()),
            });
        }
    }

    recipe.assemble(&spec)
}

/// Overlay requested values on declared defaults.
///
/// A variant gated by `when` follows its prerequisite: its default only
/// applies while the prerequisite is enabled, and explicitly enabling it
/// without the prerequisite is a conflict, not a silent no-op.
fn effective_variants(
    defs: &[VariantDef],
    requested: &VariantSet,
) -> Result<VariantSet, ResolveError> {
    let mut effective = VariantSet::new();

    // Ungated variants first, so gated ones can see their prerequisites.
    for def in defs.iter().filter(|d| d.when.is_none()) {
        apply_one(&mut effective, def, requested.get(def.name));
    }

    for def in defs.iter() {
        let Some(prerequisite) = def.when else {
            continue;
        };
        let satisfied = effective.enabled(prerequisite);

        match requested.get(def.name) {
            Some(value) if value.is_enabled() && !satisfied => {
                return Err(ResolveError::Conflict {
                    requested: def.name.to_string(),
                    requirement: prerequisite.to_string(),
                });
            }
            Some(value) => apply_one(&mut effective, def, Some(value)),
            None if satisfied => apply_one(&mut effective, def, None),
            None => apply_one(&mut effective, def, Some(&VariantValue::Bool(false))),
        }
    }

    Ok(effective)
}

fn apply_one(effective: &mut VariantSet, def: &VariantDef, requested: Option<&VariantValue>) {
    let value = requested.unwrap_or(&def.default).clone();
    match value {
        VariantValue::Bool(b) => effective.set_bool(def.name, b),
        VariantValue::List(values) => effective.set_list(def.name, values),
    }
}

/// Evaluate declared constraints against the effective spec. Runs
/// before flag assembly, so a conflicting request never produces plan
/// fragments.
fn check_constraints(recipe: &dyn Recipe, spec: &TargetSpec) -> Result<(), ResolveError> {
    let family = spec.toolchain.family;

    for constraint in recipe.constraints() {
        match constraint {
            Constraint::FeatureNeedsFamily {
                feature,
                family: required,
                requirement,
            } => {
                if spec.variants.enabled(feature) && family != required {
                    return Err(ResolveError::Conflict {
                        requested: feature.to_string(),
                        requirement: format!("{} ({})", requirement, required),
                    });
                }
            }

            Constraint::FeatureNeedsList {
                feature,
                variant,
                requirement,
            } => {
                if spec.variants.enabled(feature) && spec.variants.list(variant).is_empty() {
                    return Err(ResolveError::Conflict {
                        requested: feature.to_string(),
                        requirement: format!("{} ({}=...)", requirement, variant),
                    });
                }
            }

            Constraint::ProviderNeedsFamily {
                slot,
                provider,
                family: required,
                requirement,
            } => {
                let chosen = spec.providers.get(slot);
                if chosen.is_some_and(|p| p.name == provider) && family != required {
                    return Err(ResolveError::Conflict {
                        requested: format!("{} provider `{}`", slot, provider),
                        requirement: format!("{} ({})", requirement, required),
                    });
                }
            }

            Constraint::FamilyMinimumVersion {
                family: gated,
                minimum,
                requirement,
            } => {
                if family == gated && spec.toolchain.version.major < minimum {
                    return Err(ResolveError::Conflict {
                        requested: format!("{} {}", family, spec.toolchain.version),
                        requirement: format!("{} (major version {} or newer)", requirement, minimum),
                    });
                }
            }

            Constraint::FamilyMinimumRelease {
                family: gated,
                minimum,
                requirement,
            } => {
                if family == gated && !spec.version.at_least(minimum.0, minimum.1, minimum.2) {
                    return Err(ResolveError::Conflict {
                        requested: format!("{} with release {}", family, spec.version),
                        requirement: format!(
                            "{} (release {}.{}.{} or newer)",
                            requirement, minimum.0, minimum.1, minimum.2
                        ),
                    });
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::family::CompilerFamily;
    use crate::core::provider::Virtual;
    use crate::core::recipe::{BuildSystem, Release};
    use crate::core::spec::Toolchain;

    /// Minimal recipe exercising the shared pipeline.
    struct Probe;

    impl Recipe for Probe {
        fn name(&self) -> &'static str {
            "probe"
        }

        fn summary(&self) -> &'static str {
            "pipeline probe"
        }

        fn homepage(&self) -> &'static str {
            "https://example.com"
        }

        fn build_system(&self) -> BuildSystem {
            BuildSystem::Makefile
        }

        fn releases(&self) -> Vec<Release> {
            vec![Release::archive("1.0.0", "file://./probe.tgz", "00".repeat(32))]
        }

        fn variants(&self) -> Vec<VariantDef> {
            vec![
                VariantDef::boolean("fast", false, "go fast"),
                VariantDef::boolean("turbo", true, "even faster").when("fast"),
            ]
        }

        fn supported_families(&self) -> &'static [CompilerFamily] {
            &[CompilerFamily::Gnu]
        }

        fn required_virtuals(&self, _variants: &VariantSet) -> Vec<Virtual> {
            vec![Virtual::Blas]
        }

        fn assemble(&self, spec: &TargetSpec) -> Result<BuildPlan, ResolveError> {
            let mut plan = BuildPlan::default();
            if spec.variants.enabled("fast") {
                plan.defines.push("-DFAST".to_string());
            }
            if spec.variants.enabled("turbo") {
                plan.defines.push("-DTURBO".to_string());
            }
            Ok(plan)
        }
    }

    fn spec_with_blas() -> TargetSpec {
        use crate::core::provider::Provider;
        use semver::Version;

        let mut spec = TargetSpec::new("probe", "1.0.0", Toolchain::default());
        spec.providers.insert(
            Virtual::Blas,
            Provider::new("openblas", Version::new(0, 3, 27), "/opt/openblas"),
        );
        spec
    }

    #[test]
    fn test_unknown_feature_fails_fast() {
        let mut spec = spec_with_blas();
        spec.variants.set_bool("warp", true);

        let err = resolve(&Probe, &spec).unwrap_err();
        assert!(matches!(err, ResolveError::UnknownFeature { feature, .. } if feature == "warp"));
    }

    #[test]
    fn test_unsupported_family() {
        let mut spec = spec_with_blas();
        spec.toolchain.family = CompilerFamily::Fujitsu;

        let err = resolve(&Probe, &spec).unwrap_err();
        assert!(matches!(err, ResolveError::UnsupportedCompiler { .. }));
    }

    #[test]
    fn test_missing_provider() {
        let spec = TargetSpec::new("probe", "1.0.0", Toolchain::default());

        let err = resolve(&Probe, &spec).unwrap_err();
        assert!(matches!(err, ResolveError::MissingPrerequisite { what, .. } if what == "blas"));
    }

    #[test]
    fn test_gated_default_follows_prerequisite() {
        // turbo defaults on, but only while fast is enabled.
        let plan = resolve(&Probe, &spec_with_blas()).unwrap();
        assert!(!plan.has_define("-DTURBO"));

        let mut spec = spec_with_blas();
        spec.variants.set_bool("fast", true);
        let plan = resolve(&Probe, &spec).unwrap();
        assert!(plan.has_define("-DFAST"));
        assert!(plan.has_define("-DTURBO"));
    }

    #[test]
    fn test_gated_explicit_enable_conflicts() {
        let mut spec = spec_with_blas();
        spec.variants.set_bool("turbo", true);

        let err = resolve(&Probe, &spec).unwrap_err();
        assert!(matches!(
            err,
            ResolveError::Conflict { requested, requirement }
                if requested == "turbo" && requirement == "fast"
        ));
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let mut spec = spec_with_blas();
        spec.variants.set_bool("fast", true);

        let a = resolve(&Probe, &spec).unwrap();
        let b = resolve(&Probe, &spec).unwrap();
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }
}
