//! Built-in recipes and the registry over them.

mod llamacpp;
mod ollama;
mod vasp;

pub use llamacpp::LlamaCpp;
pub use ollama::Ollama;
pub use vasp::Vasp;

use crate::core::recipe::Recipe;

/// The set of known recipes, looked up by name.
pub struct RecipeRegistry {
    recipes: Vec<Box<dyn Recipe>>,
}

impl RecipeRegistry {
    /// Registry of the built-in recipes.
    pub fn builtin() -> Self {
        RecipeRegistry {
            recipes: vec![Box::new(LlamaCpp), Box::new(Ollama), Box::new(Vasp)],
        }
    }

    /// Look up a recipe by name.
    pub fn get(&self, name: &str) -> Option<&dyn Recipe> {
        self.recipes
            .iter()
            .find(|r| r.name() == name)
            .map(Box::as_ref)
    }

    /// Iterate recipes in name order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Recipe> {
        self.recipes.iter().map(Box::as_ref)
    }

    /// Recipe names that share a prefix with `name`, for did-you-mean
    /// hints.
    pub fn suggest(&self, name: &str) -> Vec<&'static str> {
        let stem: String = name.chars().take(3).collect();
        self.recipes
            .iter()
            .map(|r| r.name())
            .filter(|candidate| !stem.is_empty() && candidate.starts_with(&stem))
            .collect()
    }
}
