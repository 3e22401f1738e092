//! Plan node model and output JSON schema definitions.
//!
//! `PlanNode` is the in-memory shape of one parsed plan line. The tree is an
//! arena: nodes live in a single `Vec` and refer to each other by index.
//! `PlanProfile` is the structure of JSON files we write to disk.

use serde::{Deserialize, Serialize};

/// One operator line of an execution plan after parsing
#[derive(Debug, Clone, PartialEq)]
pub struct PlanNode {
    /// Assigned in input order, starting at 1
    pub sequence_id: usize,

    /// Nesting level derived from indentation (always >= 1)
    pub depth: usize,

    /// Operator text with cost/time annotations removed
    pub description: String,

    /// Elapsed time in milliseconds (0.0 when the line has no timing)
    pub time_ms: f64,

    /// Index of the parent node in the owning arena
    pub parent: Option<usize>,

    /// Indices of child nodes, in input order
    pub children: Vec<usize>,
}

impl PlanNode {
    /// Create an unlinked node
    pub fn new(sequence_id: usize, depth: usize, description: impl Into<String>, time_ms: f64) -> Self {
        Self {
            sequence_id,
            depth,
            description: description.into(),
            time_ms,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Top-level profile structure written to JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanProfile {
    /// Schema version for compatibility checking
    pub version: String,

    /// Identifier of the profiled statement (flamegraph title)
    pub sql_id: String,

    /// Sum of all folded stack weights, in milliseconds
    pub total_time_ms: u64,

    /// Number of plan nodes parsed from the input
    pub node_count: usize,

    /// Top hot paths (ranked by time)
    pub hot_paths: Vec<HotPath>,

    /// Every folded stack in first-seen order
    pub stacks: Vec<StackEntry>,

    /// Timestamp when profile was generated
    pub generated_at: String,
}

/// A hot path in the plan (folded stack with its share of time)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HotPath {
    /// Folded stack representation (e.g., "Nested Loop;Seq Scan on t")
    pub stack: String,

    /// Time attributed to this path, in milliseconds
    pub time_ms: u64,

    /// Percentage of total time
    pub percentage: f64,
}

/// Serialized form of a single folded stack
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StackEntry {
    pub stack: String,
    pub time_ms: u64,
}
