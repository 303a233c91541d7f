//! CP-010: CLI subcommands — init, validate, costs, rewards, plan.

use crate::core::catalog::RecipeCatalog;
use crate::core::error::CraftError;
use crate::core::resolver::{self, CostTable};
use crate::core::rewards::RewardIndex;
use crate::core::{parser, planner, types};
use clap::{Args, Subcommand};
use std::path::{Path, PathBuf};

const DEFAULT_RECIPES: &str = "recipeData.csv";
const DEFAULT_INVENTORY: &str = "inventoryData.csv";

/// Input locations shared by every command that reads tables.
#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Path to craftplan.yaml (optional; defaults apply when missing)
    #[arg(short, long, default_value = "craftplan.yaml")]
    pub config: PathBuf,

    /// Recipe matrix CSV (overrides the config)
    #[arg(long)]
    pub recipes: Option<PathBuf>,

    /// Inventory CSV (overrides the config)
    #[arg(long)]
    pub inventory: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a craftplan.yaml and sample tables
    Init {
        /// Directory to initialize (default: current)
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Load and validate the recipe and inventory tables
    Validate {
        #[command(flatten)]
        inputs: InputArgs,
    },

    /// Show the raw-ingredient cost of every craftable ingredient
    Costs {
        #[command(flatten)]
        inputs: InputArgs,
    },

    /// Show every way to obtain each recipe result
    Rewards {
        #[command(flatten)]
        inputs: InputArgs,

        /// Only show this result
        #[arg(short, long)]
        reward: Option<String>,
    },

    /// Compute a greedy plan that maximizes the target
    Plan {
        #[command(flatten)]
        inputs: InputArgs,

        /// Item to maximize (overrides the config)
        #[arg(short, long)]
        target: Option<String>,

        /// Emit the plan as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Dispatch a CLI command.
pub fn dispatch(cmd: Commands) -> Result<(), CraftError> {
    match cmd {
        Commands::Init { path } => cmd_init(&path),
        Commands::Validate { inputs } => cmd_validate(&inputs),
        Commands::Costs { inputs } => cmd_costs(&inputs),
        Commands::Rewards { inputs, reward } => cmd_rewards(&inputs, reward.as_deref()),
        Commands::Plan {
            inputs,
            target,
            json,
        } => cmd_plan(&inputs, target, json),
    }
}

/// Everything loaded and derived from the inputs.
struct Workspace {
    config: types::CraftConfig,
    catalog: RecipeCatalog,
    costs: CostTable,
    rewards: RewardIndex,
    inventory: types::Inventory,
}

/// Read the config (if present) and apply CLI overrides.
fn load_config(inputs: &InputArgs) -> Result<types::CraftConfig, CraftError> {
    let mut config = if inputs.config.exists() {
        parser::parse_config_file(&inputs.config)?
    } else {
        tracing::debug!(path = %inputs.config.display(), "no config file; using defaults");
        types::CraftConfig::default()
    };
    if let Some(ref recipes) = inputs.recipes {
        config.recipes = Some(recipes.clone());
    }
    if let Some(ref inventory) = inputs.inventory {
        config.inventory = Some(inventory.clone());
    }
    Ok(config)
}

fn load_workspace(inputs: &InputArgs) -> Result<Workspace, CraftError> {
    let config = load_config(inputs)?;
    let recipes_path = config
        .recipes
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_RECIPES));
    let inventory_path = config
        .inventory
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_INVENTORY));

    let catalog = parser::parse_recipe_file(&recipes_path)?;
    tracing::info!(
        path = %recipes_path.display(),
        ingredients = catalog.ingredient_count(),
        recipes = catalog.recipe_count(),
        "loaded recipes"
    );
    let inventory = parser::parse_inventory_file(&inventory_path, &catalog)?;
    tracing::info!(path = %inventory_path.display(), "loaded inventory");

    let costs = resolver::resolve_costs(&catalog)?;
    let rewards = RewardIndex::build(&catalog, &costs, config.planner.fold_mode)?;

    Ok(Workspace {
        config,
        catalog,
        costs,
        rewards,
        inventory,
    })
}

fn cmd_init(path: &Path) -> Result<(), CraftError> {
    let config_path = path.join("craftplan.yaml");
    if config_path.exists() {
        return Err(CraftError::InvalidConfig(format!(
            "{} already exists",
            config_path.display()
        )));
    }
    std::fs::create_dir_all(path).map_err(|e| CraftError::io(path, e))?;

    let config = r#"target: Wildcards
recipes: recipeData.csv
inventory: inventoryData.csv

planner:
  max_iterations: 1000
  accumulate_across_passes: true
  stop_when_target_infeasible: false
  fold_mode: corrected
  weights:
    target: 1000.0
    direct_input: 100.0
    indirect: 10.0
"#;
    let recipes = "\
// Row ingredient combined with column ingredient. Empty cells have no recipe.
X,Wood,Stone,Plank
Wood,Plank,2 Wildcards,
Stone,2 Wildcards,,
Plank,,,5 Wildcards
";
    let inventory = "Ingredient,Quantity\nWood,6\nStone,2\n";

    let files = [
        (config_path, config),
        (path.join(DEFAULT_RECIPES), recipes),
        (path.join(DEFAULT_INVENTORY), inventory),
    ];
    for (file, _) in &files[1..] {
        if file.exists() {
            return Err(CraftError::InvalidConfig(format!(
                "{} already exists",
                file.display()
            )));
        }
    }
    for (file, content) in &files {
        std::fs::write(file, content).map_err(|e| CraftError::io(file, e))?;
    }

    println!("Initialized craftplan project at {}", path.display());
    for (file, _) in &files {
        println!("  Created: {}", file.display());
    }
    Ok(())
}

fn cmd_validate(inputs: &InputArgs) -> Result<(), CraftError> {
    let ws = load_workspace(inputs)?;
    let held = ws.inventory.iter().filter(|(_, q)| *q > 0).count();
    println!(
        "OK: {} ingredients ({} craftable), {} recipes, {} rewards, {} stocked",
        ws.catalog.ingredient_count(),
        ws.catalog.craftable().count(),
        ws.catalog.recipe_count(),
        ws.rewards.len(),
        held
    );
    if ws.rewards.options_for(&ws.config.target).is_none() {
        println!("  warning: no recipe produces target '{}'", ws.config.target);
    }
    Ok(())
}

fn cmd_costs(inputs: &InputArgs) -> Result<(), CraftError> {
    let ws = load_workspace(inputs)?;
    for name in ws.catalog.craftable() {
        println!("Cost to create {}: {}", name, ws.costs.cost(name)?);
    }
    Ok(())
}

fn cmd_rewards(inputs: &InputArgs, only: Option<&str>) -> Result<(), CraftError> {
    let ws = load_workspace(inputs)?;
    let results = match only {
        Some(name) if ws.rewards.options_for(name).is_none() => {
            return Err(CraftError::InvalidConfig(format!(
                "no recipes produce '{}'",
                name
            )));
        }
        Some(name) => vec![name],
        None => ws.rewards.results(),
    };
    for result in results {
        print_reward_options(&ws.rewards, result);
    }
    Ok(())
}

fn cmd_plan(inputs: &InputArgs, target: Option<String>, json: bool) -> Result<(), CraftError> {
    let mut ws = load_workspace(inputs)?;
    if let Some(target) = target {
        ws.config.target = target;
    }
    parser::validate_config(&ws.config)?;

    let outcome = planner::plan(
        &ws.catalog,
        &ws.costs,
        &ws.rewards,
        &ws.inventory,
        &ws.config.target,
        &ws.config.planner,
    )?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print_outcome(&outcome);
    }
    Ok(())
}

fn print_reward_options(rewards: &RewardIndex, result: &str) {
    println!("Possible ways to get reward {}:", result);
    for option in rewards.ranked(result) {
        let tag = match option.kind {
            types::OptionKind::Direct => String::new(),
            kind => format!(" [{}]", kind),
        };
        println!(
            "  From {} x {} with cost: {}{}",
            option.pair, option.quantity, option.cost, tag
        );
    }
}

/// Display a plan outcome to stdout.
fn print_outcome(outcome: &types::PlanOutcome) {
    let target = &outcome.target;
    println!("=== Computing recipes to maximize {} ===", target);

    for pass in &outcome.passes {
        println!();
        println!("--- Pass {} ---", pass.pass);
        if pass.feasible.is_empty() {
            println!("No recipes can be executed with current inventory to produce {}", target);
        } else {
            println!("Feasible recipes for {}:", target);
            for f in &pass.feasible {
                println!(
                    "  {} can be executed {} times",
                    f.option.pair, f.max_executions
                );
                println!(
                    "    Yields: {} x {} per execution = {} total {}",
                    f.option.quantity,
                    target,
                    f.total_yield(),
                    target
                );
                println!("    Cost per execution: {}", f.option.cost);
            }
        }
        println!(
            "Ingredients that can lead to {}: {}",
            target,
            pass.leads_to_target.join(", ")
        );
        for step in &pass.steps {
            match step.tier {
                types::ValueTier::Target => println!(
                    "  Execute {} x {} times -> {} {} (DIRECT)",
                    step.pair,
                    step.times,
                    step.produced(),
                    step.result
                ),
                tier => println!(
                    "  Execute {} x {} times -> {} {} ({}, value={:.2})",
                    step.pair,
                    step.times,
                    step.produced(),
                    step.result,
                    tier,
                    step.value
                ),
            }
        }
        if pass.inner_stop == types::InnerStop::IterationCap {
            println!("  Hit iteration limit!");
        }
        println!("  Obtained this pass: {} {}", pass.target_obtained, target);
    }

    println!();
    println!("=== Execution Plan Summary ===");
    println!("Total {} obtained: {}", target, outcome.total_target_obtained);
    println!("Stopped: {}", outcome.stop);

    let steps: Vec<&types::PlanStep> = outcome.steps().collect();
    if steps.is_empty() {
        return;
    }
    println!();
    println!("Recipes to execute:");
    for step in steps {
        println!(
            "  Combine {} + {}: {} times -> {} {}",
            step.pair.first(),
            step.pair.second(),
            step.times,
            step.produced(),
            step.result
        );
    }
    println!();
    println!("Remaining inventory:");
    for (name, qty) in outcome.final_inventory.remaining() {
        println!("  {}: {}", name, qty);
    }
}
