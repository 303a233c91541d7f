//! Core crafting logic — types, parsing, cost resolution, reward indexing, planning.

pub mod catalog;
pub mod error;
pub mod parser;
pub mod planner;
pub mod resolver;
pub mod rewards;
pub mod types;
