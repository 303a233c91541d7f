//! CP-005: Greedy crafting planner.
//!
//! Each pass clones the baseline inventory and repeatedly executes the
//! single best-valued recipe, as many times as the working inventory
//! allows, until nothing useful can run. Passes repeat from the resulting
//! inventory until a pass leaves every baseline entry unchanged.
//!
//! Recipes are always paid at raw cost, so every execution consumes raw
//! ingredients and the outer loop terminates on any acyclic catalog.

use super::catalog::RecipeCatalog;
use super::error::CraftError;
use super::resolver::CostTable;
use super::rewards::RewardIndex;
use super::types::*;
use std::collections::{BTreeSet, HashSet};
use tracing::{debug, info, warn};

/// A catalog recipe with its raw cost, priced once per plan.
struct PricedRecipe {
    pair: IngredientPair,
    quantity: u64,
    result: String,
    cost: CostMap,
    total_cost: u64,
}

/// A recipe that can run right now and leads somewhere useful.
struct Candidate<'r> {
    recipe: &'r PricedRecipe,
    can_execute: u64,
    tier: ValueTier,
    value: f64,
}

/// What stays fixed across the passes of one plan.
struct PlanContext<'a> {
    recipes: Vec<PricedRecipe>,
    target: &'a str,
    leads_to_target: BTreeSet<String>,
    /// Names that appear in the cost of some target option
    direct_inputs: HashSet<&'a str>,
    settings: &'a PlannerSettings,
}

/// Plan how to maximize `target` from `inventory`.
pub fn plan(
    catalog: &RecipeCatalog,
    costs: &CostTable,
    rewards: &RewardIndex,
    inventory: &Inventory,
    target: &str,
    settings: &PlannerSettings,
) -> Result<PlanOutcome, CraftError> {
    let Some(target_options) = rewards.options_for(target) else {
        info!(item = %target, "no recipes produce target");
        return Ok(PlanOutcome {
            target: target.to_string(),
            passes: Vec::new(),
            final_inventory: inventory.clone(),
            total_target_obtained: 0,
            stop: StopReason::NoRewardOptions,
        });
    };

    let ctx = PlanContext {
        recipes: price_recipes(catalog, costs)?,
        target,
        leads_to_target: leads_to_target(catalog, target),
        direct_inputs: target_options
            .iter()
            .flat_map(|o| o.cost.iter().map(|(name, _)| name))
            .collect(),
        settings,
    };
    debug!(
        leads = ?ctx.leads_to_target,
        "ingredients that can lead to {}", target
    );

    let mut baseline = inventory.clone();
    let mut passes: Vec<PassReport> = Vec::new();
    let mut running_total = 0u64;

    let stop = loop {
        let pass = passes.len() + 1;
        let feasible = feasible_options(target_options, &baseline);
        if feasible.is_empty() && settings.stop_when_target_infeasible {
            info!(pass, item = %target, "no target recipe is payable; stopping");
            break StopReason::NoFeasibleTargetRecipe;
        }
        info!(pass, feasible = feasible.len(), "starting pass");
        let report = run_pass(&ctx, pass, feasible, &baseline);
        if settings.accumulate_across_passes {
            running_total = running_total.saturating_add(report.target_obtained);
        } else if !report.steps.is_empty() {
            running_total = report.target_obtained;
        }
        let unchanged = report.inventory.agrees_with(&baseline);
        baseline.clone_from(&report.inventory);
        passes.push(report);

        if unchanged {
            break StopReason::FixedPoint;
        }
    };

    info!(
        item = %target,
        total = running_total,
        passes = passes.len(),
        %stop,
        "planning finished"
    );
    Ok(PlanOutcome {
        target: target.to_string(),
        passes,
        final_inventory: baseline,
        total_target_obtained: running_total,
        stop,
    })
}

/// Smallest set holding `target` and both inputs of every recipe whose
/// result is already in the set.
pub fn leads_to_target(catalog: &RecipeCatalog, target: &str) -> BTreeSet<String> {
    let pairs = catalog.pairs();
    let mut leads = BTreeSet::new();
    leads.insert(target.to_string());

    let mut grew = true;
    while grew {
        grew = false;
        for (pair, recipe) in &pairs {
            if !leads.contains(&recipe.result) {
                continue;
            }
            for input in [pair.first(), pair.second()] {
                if !leads.contains(input) {
                    leads.insert(input.to_string());
                    grew = true;
                }
            }
        }
    }
    leads
}

/// Target options payable from `inventory`, largest total yield first.
pub fn feasible_options(options: &[RewardOption], inventory: &Inventory) -> Vec<FeasibleOption> {
    let mut feasible: Vec<FeasibleOption> = options
        .iter()
        .filter_map(|option| {
            let max_executions = option.cost.max_executions(inventory);
            (max_executions > 0).then(|| FeasibleOption {
                option: option.clone(),
                max_executions,
            })
        })
        .collect();
    feasible.sort_by(|a, b| b.total_yield().cmp(&a.total_yield()));
    feasible
}

fn price_recipes(
    catalog: &RecipeCatalog,
    costs: &CostTable,
) -> Result<Vec<PricedRecipe>, CraftError> {
    catalog
        .pairs()
        .into_iter()
        .map(|(pair, recipe)| {
            let cost = costs.pair_cost(&pair)?;
            Ok(PricedRecipe {
                total_cost: cost.total(),
                pair,
                quantity: recipe.quantity,
                result: recipe.result.clone(),
                cost,
            })
        })
        .collect()
}

/// One outer pass: greedy inner loop over a copy of `baseline`.
fn run_pass(
    ctx: &PlanContext<'_>,
    pass: usize,
    feasible: Vec<FeasibleOption>,
    baseline: &Inventory,
) -> PassReport {
    let mut working = baseline.clone();
    let mut steps: Vec<PlanStep> = Vec::new();
    let mut target_obtained = 0u64;

    let inner_stop = loop {
        if steps.len() >= ctx.settings.max_iterations {
            warn!(
                pass,
                cap = ctx.settings.max_iterations,
                "hit iteration limit; ending pass early"
            );
            break InnerStop::IterationCap;
        }

        let candidates = score_candidates(ctx, &working);
        let Some(best) = select_best(&candidates) else {
            debug!(pass, "no more recipes can be executed");
            break InnerStop::Exhausted;
        };

        let step = execute(best, &mut working, pass, steps.len() + 1);
        if step.tier == ValueTier::Target {
            target_obtained = target_obtained.saturating_add(step.produced());
        }
        steps.push(step);
    };

    PassReport {
        pass,
        feasible,
        leads_to_target: ctx.leads_to_target.iter().cloned().collect(),
        steps,
        target_obtained,
        inner_stop,
        inventory: working,
    }
}

/// Every runnable, positively valued recipe whose result is the target or
/// leads to it.
fn score_candidates<'r>(ctx: &'r PlanContext<'_>, working: &Inventory) -> Vec<Candidate<'r>> {
    let weights = &ctx.settings.weights;
    let mut candidates = Vec::new();

    for recipe in &ctx.recipes {
        let can_execute = recipe.cost.max_executions(working);
        if can_execute == 0 {
            continue;
        }

        let (tier, weight) = if recipe.result == ctx.target {
            (ValueTier::Target, weights.target)
        } else if !ctx.leads_to_target.contains(&recipe.result) {
            continue;
        } else if ctx.direct_inputs.contains(recipe.result.as_str()) {
            (ValueTier::DirectInput, weights.direct_input)
        } else {
            (ValueTier::Indirect, weights.indirect)
        };

        let value = recipe.quantity as f64 * weight / recipe.total_cost.max(1) as f64;
        if value.is_nan() || value <= 0.0 {
            continue;
        }
        candidates.push(Candidate {
            recipe,
            can_execute,
            tier,
            value,
        });
    }
    candidates
}

/// Highest-valued target producer if any, else highest-valued overall.
/// Ties go to the earliest candidate.
fn select_best<'c, 'r>(candidates: &'c [Candidate<'r>]) -> Option<&'c Candidate<'r>> {
    let direct = candidates.iter().filter(|c| c.tier == ValueTier::Target);
    highest_value(direct).or_else(|| highest_value(candidates.iter()))
}

fn highest_value<'c, 'r>(
    candidates: impl Iterator<Item = &'c Candidate<'r>>,
) -> Option<&'c Candidate<'r>>
where
    'r: 'c,
{
    candidates.fold(None, |best, c| match best {
        Some(b) if b.value >= c.value => Some(b),
        _ => Some(c),
    })
}

fn execute(
    candidate: &Candidate<'_>,
    working: &mut Inventory,
    pass: usize,
    iteration: usize,
) -> PlanStep {
    let recipe = candidate.recipe;
    let times = candidate.can_execute;
    for (name, need) in recipe.cost.iter() {
        working.take(name, need.saturating_mul(times));
    }

    let produced = recipe.quantity.saturating_mul(times);
    if candidate.tier != ValueTier::Target {
        working.add(&recipe.result, produced);
    }
    debug!(
        pass,
        iteration,
        pair = %recipe.pair,
        times,
        produced,
        result = %recipe.result,
        tier = %candidate.tier,
        value = candidate.value,
        "execute"
    );

    PlanStep {
        pass,
        iteration,
        pair: recipe.pair.clone(),
        result: recipe.result.clone(),
        quantity: recipe.quantity,
        times,
        tier: candidate.tier,
        value: candidate.value,
    }
}
