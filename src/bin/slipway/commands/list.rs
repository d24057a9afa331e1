//! `slipway list` command

use anyhow::Result;

use slipway::RecipeRegistry;

pub fn execute() -> Result<()> {
    let registry = RecipeRegistry::builtin();

    for recipe in registry.iter() {
        let versions: Vec<String> = recipe
            .releases()
            .iter()
            .map(|r| r.version.to_string())
            .collect();

        println!("{:<10} {}", recipe.name(), recipe.summary());
        println!("{:<10}   [{}] {}", "", recipe.build_system().as_str(), versions.join(", "));
    }

    Ok(())
}
