//! CP-006: Input parsing and validation.
//!
//! - Recipe matrix CSV → [`RecipeCatalog`]
//! - Inventory CSV → [`Inventory`] covering every catalog ingredient
//! - `craftplan.yaml` → [`CraftConfig`]
//!
//! Any violation aborts loading with a [`CraftError`]; nothing is
//! partially accepted.

use super::catalog::RecipeCatalog;
use super::error::CraftError;
use super::types::*;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Header cell that labels the row-name column.
const CORNER_LABEL: &str = "X";

/// Required first line of an inventory file.
pub const INVENTORY_HEADER: &str = "Ingredient,Quantity";

fn read(path: &Path) -> Result<String, CraftError> {
    std::fs::read_to_string(path).map_err(|e| CraftError::io(path, e))
}

/// Split a cell like `"2 Wildcards"` into quantity and result. Text without
/// a leading positive integer is a single unit of the whole text.
pub fn parse_result_text(text: &str) -> Recipe {
    if let Some((count, name)) = text.split_once(' ') {
        if let Ok(quantity) = count.parse::<u64>() {
            if quantity > 0 {
                return Recipe {
                    quantity,
                    result: name.to_string(),
                };
            }
        }
    }
    Recipe {
        quantity: 1,
        result: text.to_string(),
    }
}

/// Parse a recipe matrix file from disk.
pub fn parse_recipe_file(path: &Path) -> Result<RecipeCatalog, CraftError> {
    let text = read(path)?;
    parse_recipe_table(&text)
}

/// Parse a recipe matrix: a header of ingredient names, then one row per
/// ingredient whose cells give the recipe with each header column.
pub fn parse_recipe_table(text: &str) -> Result<RecipeCatalog, CraftError> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l.trim_end_matches('\r')))
        .filter(|(_, l)| !l.starts_with("//") && !l.trim().is_empty());

    let Some((_, header_line)) = lines.next() else {
        return Err(CraftError::InvalidConfig(
            "recipe table has no header".to_string(),
        ));
    };
    let header: Vec<String> = header_line
        .split(',')
        .map(str::trim)
        .filter(|c| *c != CORNER_LABEL)
        .map(str::to_string)
        .collect();
    tracing::debug!(ingredients = ?header, "recipe header");
    let mut catalog = RecipeCatalog::new(header.clone())?;
    let mut seen_rows: HashSet<String> = HashSet::new();

    for (line_no, line) in lines {
        let cells: Vec<&str> = line.split(',').map(str::trim).collect();
        if cells.len() != header.len() + 1 {
            return Err(CraftError::RowLength {
                line: line_no,
                found: cells.len(),
                expected: header.len() + 1,
            });
        }

        let row = cells[0];
        if !catalog.is_ingredient(row) {
            return Err(CraftError::UnknownIngredient(row.to_string()));
        }
        if !seen_rows.insert(row.to_string()) {
            return Err(CraftError::DuplicateRow {
                line: line_no,
                ingredient: row.to_string(),
            });
        }

        for (column, cell) in header.iter().zip(&cells[1..]) {
            if cell.is_empty() {
                continue;
            }
            let recipe = parse_result_text(cell);
            tracing::debug!(row, column = %column, %recipe, "recipe");
            catalog.add_recipe(row, column, recipe)?;
        }
    }

    Ok(catalog)
}

/// Parse an inventory file from disk against `catalog`.
pub fn parse_inventory_file(path: &Path, catalog: &RecipeCatalog) -> Result<Inventory, CraftError> {
    let text = read(path)?;
    parse_inventory(&text, catalog)
}

/// Parse an inventory table. Ingredients not listed hold zero.
pub fn parse_inventory(text: &str, catalog: &RecipeCatalog) -> Result<Inventory, CraftError> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l.trim_end_matches('\r')))
        .filter(|(_, l)| !l.trim().is_empty());

    match lines.next() {
        Some((_, header)) if header.trim() == INVENTORY_HEADER => {}
        Some((_, header)) => return Err(CraftError::InvalidHeader(header.to_string())),
        None => return Err(CraftError::InvalidHeader(String::new())),
    }

    let mut inventory = Inventory::zeroed(catalog.ingredients());
    let mut listed: HashSet<String> = HashSet::new();

    for (line_no, line) in lines {
        let cells: Vec<&str> = line.split(',').map(str::trim).collect();
        let [ingredient, quantity] = cells.as_slice() else {
            return Err(CraftError::InvalidLine {
                line: line_no,
                text: line.to_string(),
            });
        };

        let qty = quantity
            .parse::<u64>()
            .map_err(|_| CraftError::InvalidQuantity {
                ingredient: ingredient.to_string(),
                value: quantity.to_string(),
            })?;
        if !catalog.is_ingredient(ingredient) {
            return Err(CraftError::UnknownIngredient(ingredient.to_string()));
        }
        if !listed.insert(ingredient.to_string()) {
            return Err(CraftError::DuplicateInventory(ingredient.to_string()));
        }

        tracing::debug!(ingredient, qty, "inventory");
        inventory.set(ingredient, qty);
    }

    Ok(inventory)
}

/// Parse `craftplan.yaml` from disk. Relative CSV paths are resolved
/// against the config file's directory.
pub fn parse_config_file(path: &Path) -> Result<CraftConfig, CraftError> {
    let text = read(path)?;
    let mut config = parse_config(&text)?;
    let base = path.parent().unwrap_or_else(|| Path::new(""));
    config.recipes = config.recipes.map(|p| rebase(base, p));
    config.inventory = config.inventory.map(|p| rebase(base, p));
    Ok(config)
}

fn rebase(base: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}

/// Parse and validate a config from a YAML string.
pub fn parse_config(yaml: &str) -> Result<CraftConfig, CraftError> {
    let config: CraftConfig = serde_yaml_ng::from_str(yaml)?;
    validate_config(&config)?;
    Ok(config)
}

/// Check value ranges that serde cannot express.
pub fn validate_config(config: &CraftConfig) -> Result<(), CraftError> {
    if config.target.trim().is_empty() {
        return Err(CraftError::InvalidConfig("target must not be empty".to_string()));
    }
    let planner = &config.planner;
    if planner.max_iterations == 0 {
        return Err(CraftError::InvalidConfig(
            "planner.max_iterations must be at least 1".to_string(),
        ));
    }
    let weights = [
        ("target", planner.weights.target),
        ("direct_input", planner.weights.direct_input),
        ("indirect", planner.weights.indirect),
    ];
    for (name, weight) in weights {
        if !weight.is_finite() || weight <= 0.0 {
            return Err(CraftError::InvalidConfig(format!(
                "planner.weights.{} must be positive, got {}",
                name, weight
            )));
        }
    }
    Ok(())
}
