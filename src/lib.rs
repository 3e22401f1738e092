//! Explain Flamegraph
//!
//! Turns `EXPLAIN ANALYZE` output into folded stacks and flamegraphs.
//!
//! The plan text carries no parent pointers, only indentation. Each line is
//! cleaned and parsed into a depth, an operator description and a time; the
//! tree is rebuilt from the depths; every distinct root-to-node path becomes
//! one folded stack line (`Nested loop;Table scan on t 20`).
//!
//! ```bash
//! mysql -BNEe 'explain analyze <sql>' | explain-flamegraph render
//! ```

pub mod aggregator;
pub mod commands;
pub mod flamegraph;
pub mod output;
pub mod parser;
pub mod pipeline;
pub mod store;
pub mod utils;

pub use pipeline::{fold_explain, generate_svg_from_explain, FoldedPlan};
