//! Calculate hot paths and time distribution from folded stacks.
//!
//! Hot paths are the plan paths that take the most time.
//! These are the primary targets for query tuning.

use super::stack_builder::{total_weight, FoldedStack};
use crate::parser::schema::HotPath;
use log::debug;

/// Calculate hot paths from folded stacks
///
/// **Public** - main entry point for metrics calculation
///
/// # Arguments
/// * `stacks` - Folded stacks in any order
/// * `top_n` - Number of top paths to return (e.g., 10)
///
/// # Returns
/// Vector of hot paths, sorted by time (descending). Ties keep plan order.
pub fn calculate_hot_paths(stacks: &[FoldedStack], top_n: usize) -> Vec<HotPath> {
    debug!("Calculating top {} hot paths from {} stacks", top_n, stacks.len());

    let total = total_weight(stacks);

    let mut ranked: Vec<&FoldedStack> = stacks.iter().collect();
    ranked.sort_by(|a, b| b.weight.cmp(&a.weight));

    ranked
        .into_iter()
        .take(top_n)
        .map(|stack| create_hot_path(stack, total))
        .collect()
}

/// Create a HotPath from a FoldedStack
///
/// **Public** - conversion used by the JSON profile
pub fn create_hot_path(stack: &FoldedStack, total_time: u64) -> HotPath {
    let percentage = if total_time > 0 {
        (stack.weight as f64 / total_time as f64) * 100.0
    } else {
        0.0
    };

    HotPath {
        stack: stack.stack.clone(),
        time_ms: stack.weight,
        percentage,
    }
}

/// Calculate time distribution statistics
///
/// **Public** - provides summary statistics
pub fn calculate_time_distribution(stacks: &[FoldedStack]) -> TimeDistribution {
    if stacks.is_empty() {
        return TimeDistribution::default();
    }

    let total = total_weight(stacks);
    let count = stacks.len();
    let mean = total / count as u64;

    let mut weights: Vec<u64> = stacks.iter().map(|s| s.weight).collect();
    weights.sort_unstable_by(|a, b| b.cmp(a));
    let median = weights[weights.len() / 2];

    // Top 10% of stacks by weight
    let top_10_percent_count = (count as f64 * 0.1).ceil() as usize;
    let top_10_percent_time = weights
        .iter()
        .take(top_10_percent_count)
        .fold(0u64, |sum, w| sum.saturating_add(*w));

    TimeDistribution {
        total_time_ms: total,
        stack_count: count,
        mean_time_per_stack: mean,
        median_time_per_stack: median,
        top_10_percent_time,
        top_10_percent_percentage: if total > 0 {
            (top_10_percent_time as f64 / total as f64) * 100.0
        } else {
            0.0
        },
    }
}

/// Time distribution statistics
///
/// **Public** - returned from calculate_time_distribution
#[derive(Debug, Clone, Default)]
pub struct TimeDistribution {
    /// Total time across all stacks
    pub total_time_ms: u64,

    /// Number of unique stacks
    pub stack_count: usize,

    /// Mean time per stack
    pub mean_time_per_stack: u64,

    /// Median time per stack
    pub median_time_per_stack: u64,

    /// Time attributed to the top 10% of stacks
    pub top_10_percent_time: u64,

    /// Percentage of total time in top 10%
    pub top_10_percent_percentage: f64,
}

impl TimeDistribution {
    /// Returns true if the top 10% of stacks take more than 80% of the time
    pub fn is_highly_concentrated(&self) -> bool {
        self.top_10_percent_percentage > 80.0
    }

    /// Get human-readable summary
    ///
    /// **Public** - for logging and debugging
    pub fn summary(&self) -> String {
        format!(
            "Total: {} ms | Stacks: {} | Mean: {} | Median: {} | Top 10%: {:.1}%",
            self.total_time_ms,
            self.stack_count,
            self.mean_time_per_stack,
            self.median_time_per_stack,
            self.top_10_percent_percentage
        )
    }
}
