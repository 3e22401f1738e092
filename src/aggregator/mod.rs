//! Aggregation of parsed plan nodes into folded stacks and metrics.
//!
//! This module transforms parsed plan lines into:
//! - A linked plan tree (from indentation depth)
//! - Folded stack format (for flamegraph generation)
//! - Hot path analysis (slowest operators)
//! - Time distribution statistics

pub mod metrics;
pub mod stack_builder;
pub mod tree_builder;

// Re-export main types and functions
pub use metrics::{calculate_hot_paths, calculate_time_distribution, TimeDistribution};
pub use stack_builder::{build_folded_stacks, to_folded_text, total_weight, FoldedStack};
pub use tree_builder::{build_tree, PlanTree};
