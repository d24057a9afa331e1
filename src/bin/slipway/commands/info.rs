//! `slipway info` command

use anyhow::Result;

use slipway::core::variant::VariantValue;
use slipway::RecipeRegistry;

use crate::cli::InfoArgs;
use crate::commands::find_recipe;

pub fn execute(args: InfoArgs) -> Result<()> {
    let registry = RecipeRegistry::builtin();
    let recipe = find_recipe(&registry, &args.recipe)?;

    println!("{} - {}", recipe.name(), recipe.summary());
    println!("  homepage:     {}", recipe.homepage());
    println!("  build system: {}", recipe.build_system().as_str());

    let families: Vec<&str> = recipe
        .supported_families()
        .iter()
        .map(|f| f.as_str())
        .collect();
    println!("  compilers:    {}", families.join(", "));

    let versions: Vec<String> = recipe
        .releases()
        .iter()
        .map(|r| r.version.to_string())
        .collect();
    println!("  versions:     {}", versions.join(", "));

    let variants = recipe.variants();
    if !variants.is_empty() {
        println!("  features:");
        for def in variants {
            let default = match &def.default {
                VariantValue::Bool(true) => "on".to_string(),
                VariantValue::Bool(false) => "off".to_string(),
                VariantValue::List(values) if values.is_empty() => "none".to_string(),
                VariantValue::List(values) => values.join(","),
            };
            let gate = match def.when {
                Some(prerequisite) => format!(" (with +{})", prerequisite),
                None => String::new(),
            };
            println!(
                "    {:<12} [default: {}]{} {}",
                def.name, default, gate, def.description
            );
        }
    }

    let base_virtuals = recipe.required_virtuals(&Default::default());
    if !base_virtuals.is_empty() {
        let names: Vec<&str> = base_virtuals.iter().map(|v| v.as_str()).collect();
        println!("  providers:    {}", names.join(", "));
    }

    Ok(())
}
