//! Core data model: specs, variants, providers, plans, and the recipe
//! trait.

pub mod family;
pub mod plan;
pub mod provider;
pub mod recipe;
pub mod spec;
pub mod variant;
pub mod version;

pub use family::CompilerFamily;
pub use plan::{BuildPlan, EnvAction, EnvironmentOverlay, Substitution};
pub use provider::{Provider, ProviderSet, Virtual};
pub use recipe::{BuildSystem, Constraint, GitReference, Recipe, Release, SourceKind};
pub use spec::{SpecRequest, TargetSpec, Toolchain};
pub use variant::{VariantDef, VariantSet, VariantValue};
pub use version::VersionId;
