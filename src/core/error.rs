//! CP-000: Error taxonomy.
//!
//! Every variant is fatal for the run. Non-fatal planning conditions
//! (no feasible recipe, iteration cap) are reported through
//! [`StopReason`](super::types::StopReason) instead.

use std::path::PathBuf;

/// Errors raised while loading inputs, resolving costs, or indexing rewards.
#[derive(Debug, thiserror::Error)]
pub enum CraftError {
    /// Recipe header lists the same ingredient twice.
    #[error("ingredient '{0}' already exists in the header")]
    DuplicateIngredient(String),

    /// A recipe row has the wrong number of cells.
    #[error("line {line}: row has {found} cells, expected {expected}")]
    RowLength {
        line: usize,
        found: usize,
        expected: usize,
    },

    /// A name that is not in the ingredient header.
    #[error("ingredient '{0}' not found in the ingredient list")]
    UnknownIngredient(String),

    /// The same ingredient heads two recipe rows.
    #[error("line {line}: recipe row for '{ingredient}' already defined")]
    DuplicateRow { line: usize, ingredient: String },

    /// Two different recipes for the same unordered pair.
    #[error("conflicting recipes for {pair}: '{existing}' vs '{incoming}'")]
    ConflictingRecipe {
        pair: String,
        existing: String,
        incoming: String,
    },

    /// An ingredient produced by two different pairs.
    #[error("ingredient '{ingredient}' can be created by both {existing} and {incoming}")]
    ConflictingCreation {
        ingredient: String,
        existing: String,
        incoming: String,
    },

    /// Inventory header is not `Ingredient,Quantity`.
    #[error("invalid inventory header: '{0}'")]
    InvalidHeader(String),

    /// Inventory line without exactly two cells.
    #[error("line {line}: invalid inventory line '{text}'")]
    InvalidLine { line: usize, text: String },

    /// Negative or unparseable inventory quantity.
    #[error("invalid quantity for ingredient '{ingredient}': '{value}'")]
    InvalidQuantity { ingredient: String, value: String },

    /// Ingredient listed twice in the inventory.
    #[error("ingredient '{0}' already exists in inventory")]
    DuplicateInventory(String),

    /// Creation recipes form a cycle.
    #[error("creation recipe cycle detected involving: {}", .0.join(", "))]
    CreationCycle(Vec<String>),

    /// A raw-ingredient requirement does not fit in a `u64`.
    #[error("cost of '{0}' overflows")]
    CostOverflow(String),

    /// Planner configuration is out of range or incomplete.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// A recipe result never received a direct reward option.
    #[error("reward '{0}' has no direct option; reward index built out of order")]
    MissingRewardEntry(String),

    /// A cost lookup for an ingredient that was never resolved.
    #[error("no resolved cost for '{0}'")]
    MissingCost(String),

    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CraftError {
    /// Wrap an I/O failure with the path that caused it.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cp000_cycle_message_lists_members() {
        let err = CraftError::CreationCycle(vec!["A".to_string(), "B".to_string()]);
        assert_eq!(
            err.to_string(),
            "creation recipe cycle detected involving: A, B"
        );
    }

    #[test]
    fn test_cp000_io_message_has_path() {
        let err = CraftError::io(
            "missing.csv",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        let msg = err.to_string();
        assert!(msg.contains("missing.csv"));
        assert!(msg.contains("gone"));
    }
}
