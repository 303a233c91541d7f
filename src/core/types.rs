//! CP-001: Shared types — pairs, recipes, cost maps, inventory, planner
//! settings and plan outcomes.
//!
//! Cost maps and inventories are insertion-ordered (`IndexMap`) so reports
//! list entries in discovery order; equality ignores that order.

use super::error::CraftError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

// ============================================================================
// Recipes
// ============================================================================

/// Unordered pair of ingredient names, stored sorted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IngredientPair {
    first: String,
    second: String,
}

impl IngredientPair {
    /// Build the canonical pair; argument order does not matter.
    pub fn new(a: &str, b: &str) -> Self {
        let (first, second) = if a <= b { (a, b) } else { (b, a) };
        Self {
            first: first.to_string(),
            second: second.to_string(),
        }
    }

    pub fn first(&self) -> &str {
        &self.first
    }

    pub fn second(&self) -> &str {
        &self.second
    }

    /// True for recipes that combine an ingredient with itself.
    pub fn is_self_pair(&self) -> bool {
        self.first == self.second
    }
}

impl fmt::Display for IngredientPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.first, self.second)
    }
}

/// What combining a pair yields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    /// Units produced per execution (always positive)
    pub quantity: u64,

    /// Result name; may or may not be a catalog ingredient
    pub result: String,
}

impl fmt::Display for Recipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] x {}", self.quantity, self.result)
    }
}

// ============================================================================
// Cost maps
// ============================================================================

/// Raw-ingredient requirement: base ingredient name → quantity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CostMap(IndexMap<String, u64>);

impl CostMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// `{name: 1}`, the cost of a raw ingredient.
    pub fn unit(name: &str) -> Self {
        let mut map = IndexMap::new();
        map.insert(name.to_string(), 1);
        Self(map)
    }

    /// Set `name` to `qty`, replacing any previous quantity.
    pub fn with(mut self, name: &str, qty: u64) -> Self {
        self.0.insert(name.to_string(), qty);
        self
    }

    /// Sum two cost maps key by key. Keys present in only one side keep
    /// that side's quantity.
    pub fn combine(&self, other: &CostMap) -> Result<CostMap, CraftError> {
        let mut combined = self.clone();
        for (name, qty) in &other.0 {
            let held = combined.0.entry(name.clone()).or_insert(0);
            *held = held
                .checked_add(*qty)
                .ok_or_else(|| CraftError::CostOverflow(name.clone()))?;
        }
        Ok(combined)
    }

    pub fn get(&self, name: &str) -> Option<u64> {
        self.0.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Sum of all required quantities, saturating at `u64::MAX`.
    pub fn total(&self) -> u64 {
        self.0.values().fold(0, |acc, &q| acc.saturating_add(q))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// How many whole times this cost can be paid from `inventory`.
    /// An empty cost is unbounded.
    pub fn max_executions(&self, inventory: &Inventory) -> u64 {
        self.0
            .iter()
            .map(|(name, &need)| inventory.get(name) / need)
            .min()
            .unwrap_or(u64::MAX)
    }
}

impl FromIterator<(String, u64)> for CostMap {
    fn from_iter<T: IntoIterator<Item = (String, u64)>>(iter: T) -> Self {
        let mut map = CostMap::new();
        for (name, qty) in iter {
            let held = map.0.entry(name).or_insert(0);
            *held = held.saturating_add(qty);
        }
        map
    }
}

impl fmt::Display for CostMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(name, qty)| format!("{} x {}", qty, name))
            .collect();
        write!(f, "{}", parts.join(", "))
    }
}

// ============================================================================
// Inventory
// ============================================================================

/// On-hand quantities. Missing names read as zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Inventory(IndexMap<String, u64>);

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Zero entry for every name, in the given order.
    pub fn zeroed<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        Self(names.into_iter().map(|n| (n.to_string(), 0)).collect())
    }

    pub fn get(&self, name: &str) -> u64 {
        self.0.get(name).copied().unwrap_or(0)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn set(&mut self, name: &str, qty: u64) {
        self.0.insert(name.to_string(), qty);
    }

    /// Add to an entry, creating it if absent.
    pub fn add(&mut self, name: &str, qty: u64) {
        let held = self.0.entry(name.to_string()).or_insert(0);
        *held = held.saturating_add(qty);
    }

    /// Remove `qty` from an entry. Callers bound `qty` by what is held.
    pub fn take(&mut self, name: &str, qty: u64) {
        let held = self.0.entry(name.to_string()).or_insert(0);
        debug_assert!(*held >= qty, "taking {} {} but only {} held", qty, name, held);
        *held = held.saturating_sub(qty);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// True when every key of `baseline` holds the same quantity here.
    pub fn agrees_with(&self, baseline: &Inventory) -> bool {
        baseline
            .0
            .iter()
            .all(|(name, &qty)| self.0.get(name) == Some(&qty))
    }

    /// Non-zero entries sorted by name.
    pub fn remaining(&self) -> Vec<(&str, u64)> {
        let mut held: Vec<(&str, u64)> = self.iter().filter(|(_, q)| *q > 0).collect();
        held.sort_by(|a, b| a.0.cmp(b.0));
        held
    }
}

// ============================================================================
// Reward options
// ============================================================================

/// Which construction rule produced a reward option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionKind {
    /// Both inputs paid at raw cost
    Direct,
    /// First input counted as one crafted unit
    FoldFirst,
    /// Second input counted as one crafted unit
    FoldSecond,
    /// Both inputs counted as crafted units
    FoldBoth,
}

impl fmt::Display for OptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Direct => write!(f, "direct"),
            Self::FoldFirst => write!(f, "fold-first"),
            Self::FoldSecond => write!(f, "fold-second"),
            Self::FoldBoth => write!(f, "fold-both"),
        }
    }
}

/// One way to obtain a result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RewardOption {
    pub pair: IngredientPair,
    pub quantity: u64,
    pub cost: CostMap,
    pub kind: OptionKind,
}

// ============================================================================
// Configuration
// ============================================================================

/// Cost rule for reward options where both inputs are craftable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FoldMode {
    /// `{second: 2}`: the legacy tool's last-write-wins shape, emitted
    /// once per canonical pair
    Reference,
    /// `{first: 1, second: 1}`
    #[default]
    Corrected,
}

/// Value multipliers for the greedy heuristic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Weights {
    /// Recipe yields the target directly
    #[serde(default = "default_target_weight")]
    pub target: f64,

    /// Result appears in the cost of some target option
    #[serde(default = "default_direct_weight")]
    pub direct_input: f64,

    /// Result only leads to the target transitively
    #[serde(default = "default_indirect_weight")]
    pub indirect: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            target: default_target_weight(),
            direct_input: default_direct_weight(),
            indirect: default_indirect_weight(),
        }
    }
}

fn default_target_weight() -> f64 {
    1000.0
}

fn default_direct_weight() -> f64 {
    100.0
}

fn default_indirect_weight() -> f64 {
    10.0
}

/// Planner tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerSettings {
    /// Safety cap on executed steps per pass
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,

    /// Keep the running target total across passes
    #[serde(default = "default_true")]
    pub accumulate_across_passes: bool,

    /// End planning when no target option is payable at the start of a
    /// pass, as the legacy tool did
    #[serde(default)]
    pub stop_when_target_infeasible: bool,

    #[serde(default)]
    pub fold_mode: FoldMode,

    #[serde(default)]
    pub weights: Weights,
}

impl Default for PlannerSettings {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            accumulate_across_passes: true,
            stop_when_target_infeasible: false,
            fold_mode: FoldMode::default(),
            weights: Weights::default(),
        }
    }
}

fn default_max_iterations() -> usize {
    1000
}

fn default_true() -> bool {
    true
}

/// Root of `craftplan.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CraftConfig {
    /// Item the planner maximizes
    #[serde(default = "default_target")]
    pub target: String,

    /// Recipe matrix CSV
    #[serde(default)]
    pub recipes: Option<PathBuf>,

    /// Starting inventory CSV
    #[serde(default)]
    pub inventory: Option<PathBuf>,

    #[serde(default)]
    pub planner: PlannerSettings,
}

impl Default for CraftConfig {
    fn default() -> Self {
        Self {
            target: default_target(),
            recipes: None,
            inventory: None,
            planner: PlannerSettings::default(),
        }
    }
}

fn default_target() -> String {
    "Wildcards".to_string()
}

// ============================================================================
// Plan
// ============================================================================

/// Why a candidate recipe was valued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueTier {
    Target,
    DirectInput,
    Indirect,
}

impl fmt::Display for ValueTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Target => write!(f, "DIRECT"),
            Self::DirectInput => write!(f, "input"),
            Self::Indirect => write!(f, "intermediate"),
        }
    }
}

/// A single executed recipe.
#[derive(Debug, Clone, Serialize)]
pub struct PlanStep {
    pub pass: usize,
    pub iteration: usize,
    pub pair: IngredientPair,
    pub result: String,
    pub quantity: u64,
    pub times: u64,
    pub tier: ValueTier,
    pub value: f64,
}

impl PlanStep {
    pub fn produced(&self) -> u64 {
        self.quantity.saturating_mul(self.times)
    }
}

/// A target reward option payable from the pass's starting inventory.
#[derive(Debug, Clone, Serialize)]
pub struct FeasibleOption {
    pub option: RewardOption,
    pub max_executions: u64,
}

impl FeasibleOption {
    pub fn total_yield(&self) -> u64 {
        self.option.quantity.saturating_mul(self.max_executions)
    }
}

/// Why a pass's inner loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InnerStop {
    Exhausted,
    IterationCap,
}

/// Why planning ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    NoRewardOptions,
    NoFeasibleTargetRecipe,
    FixedPoint,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoRewardOptions => write!(f, "no recipes produce the target"),
            Self::NoFeasibleTargetRecipe => {
                write!(f, "no target recipe can be executed with current inventory")
            }
            Self::FixedPoint => write!(f, "inventory reached a fixed point"),
        }
    }
}

/// Everything one outer pass did.
#[derive(Debug, Clone, Serialize)]
pub struct PassReport {
    pub pass: usize,
    /// Sorted by total yield, descending
    pub feasible: Vec<FeasibleOption>,
    /// Sorted by name
    pub leads_to_target: Vec<String>,
    pub steps: Vec<PlanStep>,
    pub target_obtained: u64,
    pub inner_stop: InnerStop,
    /// Working inventory at the end of the pass
    pub inventory: Inventory,
}

/// Result of a planning run.
#[derive(Debug, Clone, Serialize)]
pub struct PlanOutcome {
    pub target: String,
    pub passes: Vec<PassReport>,
    pub final_inventory: Inventory,
    pub total_target_obtained: u64,
    pub stop: StopReason,
}

impl PlanOutcome {
    /// Every executed step, in order, across all passes.
    pub fn steps(&self) -> impl Iterator<Item = &PlanStep> {
        self.passes.iter().flat_map(|p| p.steps.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cost(entries: &[(&str, u64)]) -> CostMap {
        entries.iter().map(|(n, q)| (n.to_string(), *q)).collect()
    }

    #[test]
    fn test_cp001_pair_is_unordered() {
        assert_eq!(
            IngredientPair::new("Wood", "Stone"),
            IngredientPair::new("Stone", "Wood")
        );
        let pair = IngredientPair::new("Wood", "Stone");
        assert_eq!(pair.first(), "Stone");
        assert_eq!(pair.to_string(), "(Stone, Wood)");
        assert!(IngredientPair::new("A", "A").is_self_pair());
    }

    #[test]
    fn test_cp001_combine_sums_shared_keys() {
        let a = cost(&[("Wood", 2), ("Stone", 1)]);
        let b = cost(&[("Stone", 3), ("Iron", 1)]);
        let c = a.combine(&b).unwrap();
        assert_eq!(c.get("Wood"), Some(2));
        assert_eq!(c.get("Stone"), Some(4));
        assert_eq!(c.get("Iron"), Some(1));
        assert_eq!(c.total(), 7);
    }

    #[test]
    fn test_cp001_combine_overflow_is_error() {
        let big = cost(&[("Wood", u64::MAX), ("Stone", 1)]);
        let err = big.combine(&CostMap::unit("Wood")).unwrap_err();
        assert!(matches!(err, CraftError::CostOverflow(n) if n == "Wood"));
        assert_eq!(big.total(), u64::MAX);
    }

    #[test]
    fn test_cp001_cost_equality_ignores_order() {
        assert_eq!(cost(&[("A", 1), ("B", 2)]), cost(&[("B", 2), ("A", 1)]));
    }

    #[test]
    fn test_cp001_cost_display() {
        assert_eq!(cost(&[("Wood", 2), ("Stone", 1)]).to_string(), "2 x Wood, 1 x Stone");
    }

    #[test]
    fn test_cp001_max_executions_floor() {
        let mut inv = Inventory::zeroed(["Wood", "Stone"]);
        inv.set("Wood", 7);
        inv.set("Stone", 3);
        assert_eq!(cost(&[("Wood", 2), ("Stone", 1)]).max_executions(&inv), 3);
        assert_eq!(cost(&[("Wood", 8)]).max_executions(&inv), 0);
        assert_eq!(cost(&[("Gold", 1)]).max_executions(&inv), 0);
        assert_eq!(CostMap::new().max_executions(&inv), u64::MAX);
    }

    #[test]
    fn test_cp001_inventory_agrees_with_baseline_keys() {
        let mut base = Inventory::zeroed(["A", "B"]);
        base.set("A", 2);
        let mut working = base.clone();
        working.add("Extra", 5);
        assert!(working.agrees_with(&base));
        working.take("A", 1);
        assert!(!working.agrees_with(&base));
    }

    #[test]
    fn test_cp001_remaining_sorted_nonzero() {
        let mut inv = Inventory::zeroed(["Zinc", "Apple", "Moss"]);
        inv.set("Zinc", 1);
        inv.set("Apple", 4);
        assert_eq!(inv.remaining(), vec![("Apple", 4), ("Zinc", 1)]);
    }

    #[test]
    fn test_cp001_config_defaults() {
        let config: CraftConfig = serde_yaml_ng::from_str("{}").unwrap();
        assert_eq!(config.target, "Wildcards");
        assert_eq!(config.planner.max_iterations, 1000);
        assert!(config.planner.accumulate_across_passes);
        assert!(!config.planner.stop_when_target_infeasible);
        assert_eq!(config.planner.fold_mode, FoldMode::Corrected);
        assert_eq!(config.planner.weights.target, 1000.0);
    }

    #[test]
    fn test_cp001_config_partial_weights() {
        let yaml = r#"
target: Gems
planner:
  fold_mode: reference
  weights:
    indirect: 1.5
"#;
        let config: CraftConfig = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(config.target, "Gems");
        assert_eq!(config.planner.fold_mode, FoldMode::Reference);
        assert_eq!(config.planner.weights.indirect, 1.5);
        assert_eq!(config.planner.weights.direct_input, 100.0);
    }
}
