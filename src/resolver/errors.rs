//! Resolution error types and diagnostics.
//!
//! Every error is raised synchronously before any plan content is
//! returned; a partial `BuildPlan` is never exposed. The caller aborts
//! and surfaces the diagnostic verbatim.

use thiserror::Error;

use crate::util::diagnostic::Diagnostic;

/// Error during build-configuration resolution.
#[derive(Debug, Clone, Error)]
pub enum ResolveError {
    /// The spec names a compiler family the recipe has no branch for.
    #[error("recipe `{recipe}` has no configuration for compiler family `{family}`")]
    UnsupportedCompiler {
        recipe: String,
        family: String,
        supported: Vec<String>,
    },

    /// A requested variant is outside the recipe's vocabulary.
    #[error("unknown feature `{feature}` for recipe `{recipe}`")]
    UnknownFeature {
        recipe: String,
        feature: String,
        known: Vec<String>,
    },

    /// Two requirements of the spec are incompatible.
    #[error("{requested} requires {requirement}")]
    Conflict {
        requested: String,
        requirement: String,
    },

    /// A required dependency-provider token was not supplied.
    #[error("no provider supplied for `{what}`")]
    MissingPrerequisite { what: String, needed_by: String },
}

impl ResolveError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ResolveError::UnsupportedCompiler {
                recipe,
                family,
                supported,
            } => {
                let mut diag = Diagnostic::error(format!(
                    "recipe `{}` has no configuration for compiler family `{}`",
                    recipe, family
                ));

                if !supported.is_empty() {
                    diag = diag.with_context(format!(
                        "supported families: {}",
                        supported.join(", ")
                    ));
                }

                diag.with_suggestion(format!(
                    "Select a supported family, e.g. `{} %{}`",
                    recipe,
                    supported.first().map(String::as_str).unwrap_or("gnu")
                ))
            }

            ResolveError::UnknownFeature {
                recipe,
                feature,
                known,
            } => {
                let mut diag = Diagnostic::error(format!(
                    "unknown feature `{}` for recipe `{}`",
                    feature, recipe
                ));

                let stem: String = feature.chars().take(2).collect();
                let close: Vec<&str> = known
                    .iter()
                    .map(String::as_str)
                    .filter(|k| k.starts_with(&stem))
                    .collect();
                if !close.is_empty() {
                    diag = diag.with_context(format!("did you mean: {}?", close.join(", ")));
                }
                if !known.is_empty() {
                    diag = diag.with_context(format!("known features: {}", known.join(", ")));
                }

                diag.with_suggestion(format!("Run `slipway info {}` to list features", recipe))
            }

            ResolveError::Conflict {
                requested,
                requirement,
            } => Diagnostic::error(format!("{} requires {}", requested, requirement))
                .with_context(format!("requested: {}", requested))
                .with_context(format!("requirement: {}", requirement))
                .with_suggestion(
                    "Drop the conflicting request or satisfy its requirement".to_string(),
                ),

            ResolveError::MissingPrerequisite { what, needed_by } => {
                Diagnostic::error(format!("no provider supplied for `{}`", what))
                    .with_context(format!("required by {}", needed_by))
                    .with_suggestion(format!(
                        "Add a `[providers.{}]` section to slipway.toml",
                        what
                    ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_message_names_both_sides() {
        let err = ResolveError::Conflict {
            requested: "cuda".to_string(),
            requirement: "vendor compiler (nvhpc)".to_string(),
        };

        assert_eq!(err.to_string(), "cuda requires vendor compiler (nvhpc)");

        let output = err.to_diagnostic().format(false);
        assert!(output.contains("cuda"));
        assert!(output.contains("vendor compiler"));
    }

    #[test]
    fn test_unknown_feature_diagnostic() {
        let err = ResolveError::UnknownFeature {
            recipe: "vasp".to_string(),
            feature: "opnmp".to_string(),
            known: vec!["openmp".to_string(), "cuda".to_string()],
        };

        let output = err.to_diagnostic().format(false);
        assert!(output.contains("unknown feature `opnmp`"));
        assert!(output.contains("openmp"));
        assert!(output.contains("slipway info vasp"));
    }

    #[test]
    fn test_missing_prerequisite_diagnostic() {
        let err = ResolveError::MissingPrerequisite {
            what: "fftw-api".to_string(),
            needed_by: "vasp baseline".to_string(),
        };

        let output = err.to_diagnostic().format(false);
        assert!(output.contains("fftw-api"));
        assert!(output.contains("providers.fftw-api"));
    }

    #[test]
    fn test_unsupported_compiler_diagnostic() {
        let err = ResolveError::UnsupportedCompiler {
            recipe: "llamacpp".to_string(),
            family: "fujitsu".to_string(),
            supported: vec!["gnu".to_string(), "aocc".to_string()],
        };

        let output = err.to_diagnostic().format(false);
        assert!(output.contains("fujitsu"));
        assert!(output.contains("supported families: gnu, aocc"));
    }
}
