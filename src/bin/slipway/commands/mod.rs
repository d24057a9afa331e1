//! Subcommand implementations.

pub mod completions;
pub mod env;
pub mod info;
pub mod install;
pub mod list;
pub mod resolve;

use anyhow::{bail, Result};

use slipway::core::recipe::Recipe;
use slipway::core::spec::{SpecRequest, TargetSpec};
use slipway::resolver;
use slipway::util::config::Config;
use slipway::util::diagnostic::{self, suggestions};
use slipway::{BuildPlan, RecipeRegistry};

/// Look up a recipe by name, with a did-you-mean hint on failure.
pub fn find_recipe<'r>(registry: &'r RecipeRegistry, name: &str) -> Result<&'r dyn Recipe> {
    if let Some(recipe) = registry.get(name) {
        return Ok(recipe);
    }

    let close = registry.suggest(name);
    if close.is_empty() {
        bail!("unknown recipe `{}`\n{}", name, suggestions::UNKNOWN_RECIPE);
    }
    bail!(
        "unknown recipe `{}` (did you mean: {}?)\n{}",
        name,
        close.join(", "),
        suggestions::UNKNOWN_RECIPE
    );
}

/// Attach configuration to a parsed spec request.
///
/// The configured toolchain supplies the compiler facts; a `%family`
/// selector in the spec must agree with it, since the command names in
/// the configuration belong to that family.
pub fn target_spec(
    request: &SpecRequest,
    recipe: &dyn Recipe,
    config: &Config,
) -> Result<TargetSpec> {
    let toolchain = config.require_toolchain()?.clone();

    if let Some(family) = request.family {
        if family != toolchain.family {
            bail!(
                "spec selects compiler family `{}` but the configured toolchain is `{}`\n\
                 help: Update [toolchain] in slipway.toml or drop the %{} selector",
                family,
                toolchain.family,
                family
            );
        }
    }

    let version = request
        .version
        .clone()
        .unwrap_or_else(|| recipe.default_release().version);

    Ok(TargetSpec {
        name: recipe.name().to_string(),
        version,
        variants: request.variants.clone(),
        toolchain,
        providers: config.providers.clone(),
    })
}

/// Resolve a spec, emitting the full diagnostic on failure.
pub fn resolve_or_report(
    recipe: &dyn Recipe,
    spec: &TargetSpec,
    color: bool,
) -> Result<BuildPlan> {
    match resolver::resolve(recipe, spec) {
        Ok(plan) => Ok(plan),
        Err(err) => {
            diagnostic::emit(&err.to_diagnostic(), color);
            bail!("could not resolve `{}@{}`", spec.name, spec.version);
        }
    }
}
