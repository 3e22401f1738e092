//! Build folded stack format from a linked plan tree.
//!
//! Folded stacks are the input format for flamegraph generation.
//! Format: "parent;child;grandchild weight"
//!
//! Example: "Nested Loop;Table scan on t 20"
//! This means: the table scan ran under the nested loop and took 20 ms.

use super::tree_builder::PlanTree;
use crate::utils::config::PATH_DELIMITER;
use log::debug;
use std::collections::HashSet;
use std::fmt;

/// A single folded stack entry
///
/// **Public** - used by flamegraph generator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoldedStack {
    /// Root-to-node descriptions joined by `;`
    pub stack: String,

    /// Node time in milliseconds, truncated toward zero
    ///
    /// Times beyond `u64::MAX` saturate to `u64::MAX`; negative or NaN times become 0.
    pub weight: u64,
}

impl FoldedStack {
    /// Create a new folded stack
    ///
    /// **Public** - constructor
    pub fn new(stack: String, weight: u64) -> Self {
        Self { stack, weight }
    }

    /// Leaf frame of the stack
    pub fn leaf(&self) -> &str {
        self.stack.rsplit(PATH_DELIMITER).next().unwrap_or(&self.stack)
    }

    /// Render as one line of folded-stack text (`<stack> <weight>`)
    pub fn to_line(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for FoldedStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.stack, self.weight)
    }
}

/// Build folded stacks from a plan tree
///
/// **Public** - main entry point for stack building
///
/// # Algorithm
/// 1. Walk nodes in input order
/// 2. Join the root-to-node descriptions with `;`
/// 3. Keep the first occurrence of each path string with that node's own time
///
/// Later nodes rendering an identical path are skipped, so structurally
/// distinct operators with identical ancestry text collapse into one line.
/// Output order is first-seen order, never sorted.
pub fn build_folded_stacks(tree: &PlanTree) -> Vec<FoldedStack> {
    debug!("Building folded stacks from {} plan nodes", tree.len());

    let mut seen: HashSet<String> = HashSet::new();
    let mut stacks = Vec::new();

    for (index, node) in tree.nodes().iter().enumerate() {
        let path = format_path(tree, index);
        if seen.contains(&path) {
            continue;
        }

        seen.insert(path.clone());
        stacks.push(FoldedStack::new(path, node.time_ms as u64));
    }

    debug!("Built {} unique folded stacks", stacks.len());

    stacks
}

/// Join the descriptions on the path to `index`
fn format_path(tree: &PlanTree, index: usize) -> String {
    let delimiter = PATH_DELIMITER.to_string();
    tree.path_to(index)
        .iter()
        .map(|node| node.description.as_str())
        .collect::<Vec<_>>()
        .join(&delimiter)
}

/// Sum of all stack weights, saturating at `u64::MAX`
pub fn total_weight(stacks: &[FoldedStack]) -> u64 {
    stacks
        .iter()
        .fold(0u64, |total, stack| total.saturating_add(stack.weight))
}

/// Render folded stacks as the newline-separated text a renderer consumes
pub fn to_folded_text(stacks: &[FoldedStack]) -> String {
    stacks
        .iter()
        .map(FoldedStack::to_line)
        .collect::<Vec<_>>()
        .join("\n")
}
