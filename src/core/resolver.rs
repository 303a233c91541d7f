//! CP-003: Raw-material cost resolution.
//!
//! `cost_of(x)` is `{x: 1}` for raw ingredients and the combined cost of
//! both inputs for craftable ones. Results are memoized so every ingredient
//! is expanded once regardless of DAG fan-in. Evaluation walks an explicit
//! stack instead of recursing, so deep creation chains cannot overflow the
//! call stack; a creation cycle is reported instead of looping, and a
//! requirement too large for `u64` is `CostOverflow`.

use super::catalog::RecipeCatalog;
use super::error::CraftError;
use super::types::{CostMap, IngredientPair};
use indexmap::{IndexMap, IndexSet};
use std::collections::HashMap;

/// Memoizing cost resolver over a catalog's creation recipes.
pub struct CostResolver<'a> {
    catalog: &'a RecipeCatalog,
    cache: HashMap<String, CostMap>,
}

impl<'a> CostResolver<'a> {
    pub fn new(catalog: &'a RecipeCatalog) -> Self {
        Self {
            catalog,
            cache: HashMap::new(),
        }
    }

    /// Minimal raw-ingredient cost of one unit of `ingredient`.
    pub fn cost_of(&mut self, ingredient: &str) -> Result<CostMap, CraftError> {
        if let Some(cached) = self.cache.get(ingredient) {
            return Ok(cached.clone());
        }
        if !self.catalog.is_ingredient(ingredient) {
            return Err(CraftError::UnknownIngredient(ingredient.to_string()));
        }

        // (name, inputs already pushed)
        let mut stack: Vec<(String, bool)> = vec![(ingredient.to_string(), false)];
        // Ingredients on the current expansion path, outermost first.
        let mut in_progress: IndexSet<String> = IndexSet::new();

        while let Some((name, expanded)) = stack.pop() {
            if self.cache.contains_key(&name) {
                continue;
            }
            let Some(pair) = self.catalog.creation_recipe(&name) else {
                self.cache.insert(name.clone(), CostMap::unit(&name));
                continue;
            };

            if expanded {
                let cost = self.combined(pair)?;
                tracing::debug!(ingredient = %name, %cost, "resolved cost");
                in_progress.shift_remove(&name);
                self.cache.insert(name, cost);
                continue;
            }

            if let Some(start) = in_progress.get_index_of(&name) {
                let members = in_progress
                    .iter()
                    .skip(start)
                    .cloned()
                    .collect::<Vec<_>>();
                return Err(CraftError::CreationCycle(members));
            }
            in_progress.insert(name.clone());
            stack.push((name, true));
            for input in [pair.second(), pair.first()] {
                if !self.cache.contains_key(input) {
                    stack.push((input.to_string(), false));
                }
            }
        }

        self.cache
            .get(ingredient)
            .cloned()
            .ok_or_else(|| CraftError::MissingCost(ingredient.to_string()))
    }

    fn combined(&self, pair: &IngredientPair) -> Result<CostMap, CraftError> {
        let first = self
            .cache
            .get(pair.first())
            .ok_or_else(|| CraftError::MissingCost(pair.first().to_string()))?;
        let second = self
            .cache
            .get(pair.second())
            .ok_or_else(|| CraftError::MissingCost(pair.second().to_string()))?;
        first.combine(second)
    }

    /// Resolve every catalog ingredient and freeze the memo table.
    pub fn resolve_all(mut self) -> Result<CostTable, CraftError> {
        let catalog = self.catalog;
        let mut costs = IndexMap::with_capacity(catalog.ingredient_count());
        for name in catalog.ingredients() {
            let cost = self.cost_of(name)?;
            costs.insert(name.to_string(), cost);
        }
        Ok(CostTable { costs })
    }
}

/// Resolve the cost of every ingredient in `catalog`.
pub fn resolve_costs(catalog: &RecipeCatalog) -> Result<CostTable, CraftError> {
    CostResolver::new(catalog).resolve_all()
}

/// Immutable per-ingredient cost table, in catalog order.
#[derive(Debug, Clone, Default)]
pub struct CostTable {
    costs: IndexMap<String, CostMap>,
}

impl CostTable {
    pub fn get(&self, name: &str) -> Option<&CostMap> {
        self.costs.get(name)
    }

    /// Like [`get`](Self::get), but a missing entry is an error.
    pub fn cost(&self, name: &str) -> Result<&CostMap, CraftError> {
        self.costs
            .get(name)
            .ok_or_else(|| CraftError::MissingCost(name.to_string()))
    }

    /// Combined cost of both inputs of a pair.
    pub fn pair_cost(&self, pair: &IngredientPair) -> Result<CostMap, CraftError> {
        self.cost(pair.first())?.combine(self.cost(pair.second())?)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CostMap)> {
        self.costs.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.costs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.costs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Recipe;
    use proptest::prelude::*;

    fn recipe(quantity: u64, result: &str) -> Recipe {
        Recipe {
            quantity,
            result: result.to_string(),
        }
    }

    fn cost(entries: &[(&str, u64)]) -> CostMap {
        entries.iter().map(|(n, q)| (n.to_string(), *q)).collect()
    }

    fn chain_catalog() -> RecipeCatalog {
        let mut catalog = RecipeCatalog::new(["A", "B", "C"]).unwrap();
        catalog.add_recipe("A", "A", recipe(1, "B")).unwrap();
        catalog.add_recipe("B", "B", recipe(1, "C")).unwrap();
        catalog.add_recipe("C", "C", recipe(1, "Target")).unwrap();
        catalog
    }

    #[test]
    fn test_cp003_raw_cost_is_self() {
        let catalog = RecipeCatalog::new(["Wood", "Stone"]).unwrap();
        let mut resolver = CostResolver::new(&catalog);
        assert_eq!(resolver.cost_of("Wood").unwrap(), CostMap::unit("Wood"));
        assert_eq!(resolver.cost_of("Stone").unwrap(), CostMap::unit("Stone"));
    }

    #[test]
    fn test_cp003_chain_doubles() {
        let catalog = chain_catalog();
        let mut resolver = CostResolver::new(&catalog);
        assert_eq!(resolver.cost_of("B").unwrap(), cost(&[("A", 2)]));
        assert_eq!(resolver.cost_of("C").unwrap(), cost(&[("A", 4)]));
        let table = resolver.resolve_all().unwrap();
        let target = table.pair_cost(&IngredientPair::new("C", "C")).unwrap();
        assert_eq!(target, cost(&[("A", 8)]));
    }

    #[test]
    fn test_cp003_derived_is_combined_inputs() {
        let mut catalog = RecipeCatalog::new(["Wood", "Stone", "Axe", "Hut"]).unwrap();
        catalog.add_recipe("Wood", "Stone", recipe(1, "Axe")).unwrap();
        catalog.add_recipe("Axe", "Wood", recipe(1, "Hut")).unwrap();
        let table = resolve_costs(&catalog).unwrap();
        let hut = table.get("Hut").unwrap();
        let expected = table
            .get("Axe")
            .unwrap()
            .combine(table.get("Wood").unwrap())
            .unwrap();
        assert_eq!(hut, &expected);
        assert_eq!(hut, &cost(&[("Wood", 2), ("Stone", 1)]));
    }

    #[test]
    fn test_cp003_deep_chain_no_overflow() {
        let names: Vec<String> = (0..5000).map(|i| format!("n{i:05}")).collect();
        let mut catalog = RecipeCatalog::new(names.clone()).unwrap();
        for i in 1..names.len() {
            catalog
                .add_recipe(&names[i - 1], &names[0], recipe(1, &names[i]))
                .unwrap();
        }
        let mut resolver = CostResolver::new(&catalog);
        let last = resolver.cost_of(&names[names.len() - 1]).unwrap();
        assert_eq!(last.get("n00000"), Some(5000));
    }

    #[test]
    fn test_cp003_doubling_chain_overflow_is_error() {
        let names: Vec<String> = (0..66).map(|i| format!("L{i:02}")).collect();
        let mut catalog = RecipeCatalog::new(names.clone()).unwrap();
        for k in 0..names.len() - 1 {
            catalog
                .add_recipe(&names[k], &names[k], recipe(1, &names[k + 1]))
                .unwrap();
        }

        let mut resolver = CostResolver::new(&catalog);
        assert_eq!(resolver.cost_of("L63").unwrap().get("L00"), Some(1u64 << 63));
        match resolver.cost_of("L64") {
            Err(CraftError::CostOverflow(name)) => assert_eq!(name, "L00"),
            other => panic!("expected overflow, got {other:?}"),
        }
        assert!(matches!(
            resolve_costs(&catalog),
            Err(CraftError::CostOverflow(_))
        ));
    }

    #[test]
    fn test_cp003_cycle_detected() {
        let mut catalog = RecipeCatalog::new(["A", "B", "C"]).unwrap();
        catalog.add_recipe("A", "C", recipe(1, "B")).unwrap();
        catalog.add_recipe("B", "C", recipe(1, "A")).unwrap();
        let mut resolver = CostResolver::new(&catalog);
        match resolver.cost_of("A") {
            Err(CraftError::CreationCycle(members)) => {
                assert!(members.contains(&"A".to_string()));
                assert!(members.contains(&"B".to_string()));
                assert!(!members.contains(&"C".to_string()));
            }
            other => panic!("expected cycle, got {other:?}"),
        }
    }

    #[test]
    fn test_cp003_self_creation_is_cycle() {
        let mut catalog = RecipeCatalog::new(["A", "B"]).unwrap();
        catalog.add_recipe("A", "B", recipe(1, "A")).unwrap();
        let result = resolve_costs(&catalog);
        assert!(matches!(result, Err(CraftError::CreationCycle(m)) if m == vec!["A".to_string()]));
    }

    #[test]
    fn test_cp003_unknown_ingredient() {
        let catalog = RecipeCatalog::new(["A"]).unwrap();
        let mut resolver = CostResolver::new(&catalog);
        assert!(matches!(
            resolver.cost_of("Wildcards"),
            Err(CraftError::UnknownIngredient(_))
        ));
    }

    #[test]
    fn test_cp003_table_in_catalog_order() {
        let table = resolve_costs(&chain_catalog()).unwrap();
        let names: Vec<&str> = table.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
        assert!(matches!(table.cost("Target"), Err(CraftError::MissingCost(_))));
    }

    fn arb_cost() -> impl Strategy<Value = CostMap> {
        prop::collection::vec(("[A-E]", 1u64..50), 0..6)
            .prop_map(|entries| entries.into_iter().collect::<CostMap>())
    }

    proptest! {
        #[test]
        fn prop_cp003_combine_commutative(a in arb_cost(), b in arb_cost()) {
            prop_assert_eq!(a.combine(&b).unwrap(), b.combine(&a).unwrap());
        }

        #[test]
        fn prop_cp003_combine_associative(a in arb_cost(), b in arb_cost(), c in arb_cost()) {
            let left = a.combine(&b).unwrap().combine(&c).unwrap();
            let right = a.combine(&b.combine(&c).unwrap()).unwrap();
            prop_assert_eq!(left, right);
        }

        #[test]
        fn prop_cp003_combine_identity(a in arb_cost()) {
            prop_assert_eq!(a.combine(&CostMap::new()).unwrap(), a.clone());
            prop_assert_eq!(CostMap::new().combine(&a).unwrap(), a);
        }

        #[test]
        fn prop_cp003_combine_total_adds(a in arb_cost(), b in arb_cost()) {
            prop_assert_eq!(a.combine(&b).unwrap().total(), a.total() + b.total());
        }
    }
}
