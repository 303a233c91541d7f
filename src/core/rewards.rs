//! CP-004: Reward path index.
//!
//! For every recipe result, the ways to obtain it. Each recipe contributes
//! a direct option priced at raw cost. When an input is craftable, extra
//! "folded" options count that input as one crafted unit instead of its
//! raw expansion.

use super::catalog::RecipeCatalog;
use super::error::CraftError;
use super::resolver::CostTable;
use super::types::{CostMap, FoldMode, OptionKind, RewardOption};
use indexmap::IndexMap;

/// Result name → options, in discovery order.
#[derive(Debug, Clone, Default)]
pub struct RewardIndex {
    options: IndexMap<String, Vec<RewardOption>>,
}

impl RewardIndex {
    /// Build the index: all direct options first, then the folded ones.
    pub fn build(
        catalog: &RecipeCatalog,
        costs: &CostTable,
        fold_mode: FoldMode,
    ) -> Result<Self, CraftError> {
        let pairs = catalog.pairs();
        let mut options: IndexMap<String, Vec<RewardOption>> = IndexMap::new();

        for (pair, recipe) in &pairs {
            options
                .entry(recipe.result.clone())
                .or_default()
                .push(RewardOption {
                    pair: pair.clone(),
                    quantity: recipe.quantity,
                    cost: costs.pair_cost(pair)?,
                    kind: OptionKind::Direct,
                });
        }

        for (pair, recipe) in &pairs {
            let first_craftable = catalog.is_craftable(pair.first());
            let second_craftable = catalog.is_craftable(pair.second());
            if !first_craftable && !second_craftable {
                continue;
            }

            let existing = options
                .get_mut(&recipe.result)
                .ok_or_else(|| CraftError::MissingRewardEntry(recipe.result.clone()))?;
            let mut fold = |cost: CostMap, kind: OptionKind| {
                existing.push(RewardOption {
                    pair: pair.clone(),
                    quantity: recipe.quantity,
                    cost,
                    kind,
                });
            };

            if first_craftable {
                let cost = costs
                    .cost(pair.second())?
                    .combine(&CostMap::unit(pair.first()))?;
                fold(cost, OptionKind::FoldFirst);
            }
            if second_craftable {
                let cost = costs
                    .cost(pair.first())?
                    .combine(&CostMap::unit(pair.second()))?;
                fold(cost, OptionKind::FoldSecond);

                if first_craftable {
                    let cost = match fold_mode {
                        FoldMode::Reference => {
                            CostMap::new().with(pair.second(), 1).with(pair.second(), 2)
                        }
                        FoldMode::Corrected => {
                            CostMap::unit(pair.first()).combine(&CostMap::unit(pair.second()))?
                        }
                    };
                    fold(cost, OptionKind::FoldBoth);
                }
            }
        }

        tracing::debug!(
            results = options.len(),
            options = options.values().map(Vec::len).sum::<usize>(),
            "reward index built"
        );
        Ok(Self { options })
    }

    /// Options for `result`, in discovery order.
    pub fn options_for(&self, result: &str) -> Option<&[RewardOption]> {
        self.options.get(result).map(Vec::as_slice)
    }

    /// True if any option for `target` lists `ingredient` in its cost.
    pub fn needs_directly(&self, target: &str, ingredient: &str) -> bool {
        self.options_for(target)
            .is_some_and(|opts| opts.iter().any(|o| o.cost.contains(ingredient)))
    }

    /// Result names sorted alphabetically.
    pub fn results(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.options.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Options for `result` ordered by quantity, highest first. Equal
    /// quantities keep discovery order.
    pub fn ranked(&self, result: &str) -> Vec<&RewardOption> {
        let mut ranked: Vec<&RewardOption> = self
            .options_for(result)
            .map(|opts| opts.iter().collect())
            .unwrap_or_default();
        ranked.sort_by(|a, b| b.quantity.cmp(&a.quantity));
        ranked
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}
