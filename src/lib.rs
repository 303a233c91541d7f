//! Craftplan — recipe cost derivation and greedy crafting plans.
//!
//! Loads a pairwise recipe matrix and a starting inventory, resolves the
//! raw-material cost of every craftable ingredient, indexes every way to
//! obtain each result, and plans a greedy sequence of combinations that
//! maximizes a chosen target.

pub mod cli;
pub mod core;
