//! CP-002: Recipe catalog — ingredients, pairwise recipes, creation recipes.
//!
//! Recipes are keyed by the canonical [`IngredientPair`], so at most one
//! recipe exists per unordered pair regardless of argument order. A result
//! that is itself an ingredient gets a creation recipe; two different pairs
//! creating the same ingredient is rejected.

use super::error::CraftError;
use super::types::{IngredientPair, Recipe};
use indexmap::{IndexMap, IndexSet};
use std::collections::HashMap;

/// Validated recipe tables.
#[derive(Debug, Clone, Default)]
pub struct RecipeCatalog {
    ingredients: IndexSet<String>,
    recipes: HashMap<IngredientPair, Recipe>,
    creation: IndexMap<String, IngredientPair>,
}

impl RecipeCatalog {
    /// Create a catalog over an ordered, duplicate-free ingredient list.
    pub fn new<I, S>(names: I) -> Result<Self, CraftError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut ingredients = IndexSet::new();
        for name in names {
            let name = name.into();
            if ingredients.contains(&name) {
                return Err(CraftError::DuplicateIngredient(name));
            }
            ingredients.insert(name);
        }
        Ok(Self {
            ingredients,
            ..Self::default()
        })
    }

    /// Register the recipe for `(a, b)`. Re-adding an identical recipe for
    /// the same unordered pair is a no-op.
    pub fn add_recipe(&mut self, a: &str, b: &str, recipe: Recipe) -> Result<(), CraftError> {
        for name in [a, b] {
            if !self.ingredients.contains(name) {
                return Err(CraftError::UnknownIngredient(name.to_string()));
            }
        }
        let pair = IngredientPair::new(a, b);
        if recipe.quantity == 0 {
            return Err(CraftError::InvalidConfig(format!(
                "recipe for {} yields zero {}",
                pair, recipe.result
            )));
        }

        if let Some(existing) = self.recipes.get(&pair) {
            if *existing == recipe {
                return Ok(());
            }
            return Err(CraftError::ConflictingRecipe {
                pair: pair.to_string(),
                existing: existing.to_string(),
                incoming: recipe.to_string(),
            });
        }

        if self.ingredients.contains(&recipe.result) {
            if let Some(existing) = self.creation.get(&recipe.result) {
                if *existing != pair {
                    return Err(CraftError::ConflictingCreation {
                        ingredient: recipe.result,
                        existing: existing.to_string(),
                        incoming: pair.to_string(),
                    });
                }
            }
            tracing::debug!(ingredient = %recipe.result, %pair, "creation recipe");
            self.creation.insert(recipe.result.clone(), pair.clone());
        }

        self.recipes.insert(pair, recipe);
        Ok(())
    }

    /// Ingredient names in catalog order.
    pub fn ingredients(&self) -> impl Iterator<Item = &str> {
        self.ingredients.iter().map(String::as_str)
    }

    pub fn ingredient_count(&self) -> usize {
        self.ingredients.len()
    }

    pub fn is_ingredient(&self, name: &str) -> bool {
        self.ingredients.contains(name)
    }

    pub fn recipe(&self, a: &str, b: &str) -> Option<&Recipe> {
        self.recipes.get(&IngredientPair::new(a, b))
    }

    pub fn recipe_count(&self) -> usize {
        self.recipes.len()
    }

    /// The pair that creates `name`, if it is craftable.
    pub fn creation_recipe(&self, name: &str) -> Option<&IngredientPair> {
        self.creation.get(name)
    }

    pub fn is_craftable(&self, name: &str) -> bool {
        self.creation.contains_key(name)
    }

    /// Craftable ingredients in the order their creation recipe was found.
    pub fn craftable(&self) -> impl Iterator<Item = &str> {
        self.creation.keys().map(String::as_str)
    }

    /// Every pair `(i, j)` with `i <= j` in catalog order that has a recipe.
    pub fn pairs(&self) -> Vec<(IngredientPair, &Recipe)> {
        let n = self.ingredients.len();
        let mut pairs = Vec::new();
        for i in 0..n {
            for j in i..n {
                let pair = IngredientPair::new(&self.ingredients[i], &self.ingredients[j]);
                if let Some(recipe) = self.recipes.get(&pair) {
                    pairs.push((pair, recipe));
                }
            }
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recipe(quantity: u64, result: &str) -> Recipe {
        Recipe {
            quantity,
            result: result.to_string(),
        }
    }

    #[test]
    fn test_cp002_duplicate_ingredient() {
        let result = RecipeCatalog::new(["Wood", "Stone", "Wood"]);
        assert!(matches!(result, Err(CraftError::DuplicateIngredient(n)) if n == "Wood"));
    }

    #[test]
    fn test_cp002_recipe_lookup_either_order() {
        let mut catalog = RecipeCatalog::new(["Wood", "Stone"]).unwrap();
        catalog
            .add_recipe("Wood", "Stone", recipe(2, "Wildcards"))
            .unwrap();
        assert_eq!(catalog.recipe("Stone", "Wood"), Some(&recipe(2, "Wildcards")));
        assert!(catalog.recipe("Wood", "Wood").is_none());
        assert!(!catalog.is_craftable("Wildcards"));
    }

    #[test]
    fn test_cp002_mirrored_recipe_accepted() {
        let mut catalog = RecipeCatalog::new(["A", "B"]).unwrap();
        catalog.add_recipe("A", "B", recipe(1, "Gem")).unwrap();
        catalog.add_recipe("B", "A", recipe(1, "Gem")).unwrap();
        assert_eq!(catalog.recipe_count(), 1);
    }

    #[test]
    fn test_cp002_conflicting_recipe() {
        let mut catalog = RecipeCatalog::new(["A", "B"]).unwrap();
        catalog.add_recipe("A", "B", recipe(1, "Gem")).unwrap();
        let err = catalog.add_recipe("B", "A", recipe(3, "Gem")).unwrap_err();
        assert!(matches!(err, CraftError::ConflictingRecipe { .. }));
    }

    #[test]
    fn test_cp002_unknown_ingredient() {
        let mut catalog = RecipeCatalog::new(["A"]).unwrap();
        let err = catalog.add_recipe("A", "Ghost", recipe(1, "X")).unwrap_err();
        assert!(matches!(err, CraftError::UnknownIngredient(n) if n == "Ghost"));
    }

    #[test]
    fn test_cp002_zero_quantity_rejected() {
        let mut catalog = RecipeCatalog::new(["A"]).unwrap();
        let err = catalog.add_recipe("A", "A", recipe(0, "X")).unwrap_err();
        assert!(matches!(err, CraftError::InvalidConfig(_)));
    }

    #[test]
    fn test_cp002_creation_recipe_registered() {
        let mut catalog = RecipeCatalog::new(["A", "B"]).unwrap();
        catalog.add_recipe("A", "A", recipe(1, "B")).unwrap();
        assert_eq!(catalog.creation_recipe("B"), Some(&IngredientPair::new("A", "A")));
        assert!(catalog.is_craftable("B"));
        assert!(!catalog.is_craftable("A"));
        assert_eq!(catalog.craftable().collect::<Vec<_>>(), vec!["B"]);
    }

    #[test]
    fn test_cp002_conflicting_creation() {
        let mut catalog = RecipeCatalog::new(["A", "B", "C"]).unwrap();
        catalog.add_recipe("A", "A", recipe(1, "C")).unwrap();
        let err = catalog.add_recipe("A", "B", recipe(1, "C")).unwrap_err();
        match err {
            CraftError::ConflictingCreation { ingredient, .. } => assert_eq!(ingredient, "C"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_cp002_pairs_in_catalog_order() {
        let mut catalog = RecipeCatalog::new(["Wood", "Stone", "Iron"]).unwrap();
        catalog.add_recipe("Iron", "Iron", recipe(1, "Plate")).unwrap();
        catalog.add_recipe("Stone", "Wood", recipe(1, "Axe")).unwrap();
        catalog.add_recipe("Wood", "Wood", recipe(1, "Plank")).unwrap();
        let results: Vec<&str> = catalog
            .pairs()
            .into_iter()
            .map(|(_, r)| r.result.as_str())
            .collect();
        assert_eq!(results, vec!["Plank", "Axe", "Plate"]);
    }
}
