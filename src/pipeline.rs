//! End-to-end conversion of EXPLAIN ANALYZE text.
//!
//! Every call works on its own node arena; nothing here holds state
//! between calls, so concurrent requests need no coordination.

use crate::aggregator::{build_folded_stacks, FoldedStack, PlanTree};
use crate::flamegraph::{generate_flamegraph, FlamegraphConfig};
use crate::parser::parse_plan;
use crate::utils::config::ParseOptions;
use crate::utils::error::RenderError;

/// Folded stacks for one plan, plus the number of nodes they came from
#[derive(Debug, Clone, Default)]
pub struct FoldedPlan {
    pub node_count: usize,
    pub stacks: Vec<FoldedStack>,
}

impl FoldedPlan {
    /// Folded-stack text, one line per stack, no trailing newline
    pub fn to_text(&self) -> String {
        crate::aggregator::to_folded_text(&self.stacks)
    }
}

/// Parse, link and fold one plan
pub fn fold_explain(explain_text: &str, options: &ParseOptions) -> FoldedPlan {
    let nodes = parse_plan(explain_text, options);
    let tree = PlanTree::build(nodes, options.verbose);

    FoldedPlan {
        node_count: tree.len(),
        stacks: build_folded_stacks(&tree),
    }
}

/// Fold one plan and render it as an SVG flamegraph
pub fn generate_svg_from_explain(
    explain_text: &str,
    options: &ParseOptions,
    config: &FlamegraphConfig,
) -> Result<Vec<u8>, RenderError> {
    let folded = fold_explain(explain_text, options);
    generate_flamegraph(&folded.stacks, config)
}
