//! Plan parsing and schema definitions.
//!
//! This module handles:
//! - Cleaning raw EXPLAIN ANALYZE lines
//! - Extracting depth, operator description and time
//! - Defining the plan node model and output schema

pub mod explain;
pub mod schema;

// Re-export main types
pub use explain::{parse_explain_line, parse_plan, ParsedLine};
pub use schema::{HotPath, PlanNode, PlanProfile, StackEntry};
