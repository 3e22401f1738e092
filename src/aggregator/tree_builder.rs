//! Rebuild the plan tree from depth-stamped nodes.
//!
//! EXPLAIN ANALYZE output has no parent pointers, only indentation. A stack
//! of open ancestors (indices into the node arena) is enough to recover the
//! structure in one forward pass.

use crate::parser::PlanNode;
use log::debug;

/// Plan nodes linked into a tree
///
/// Owns every node; `parent` and `children` are indices into `nodes`.
#[derive(Debug, Clone, Default)]
pub struct PlanTree {
    nodes: Vec<PlanNode>,
    leaves: Vec<usize>,
}

impl PlanTree {
    /// Link `nodes` into a tree
    ///
    /// **Public** - main entry point for tree construction
    pub fn build(mut nodes: Vec<PlanNode>, verbose: bool) -> Self {
        let leaves = build_tree(&mut nodes, verbose);
        Self { nodes, leaves }
    }

    pub fn nodes(&self) -> &[PlanNode] {
        &self.nodes
    }

    /// Indices of nodes without children, in input order
    pub fn leaves(&self) -> &[usize] {
        &self.leaves
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes from the root down to `index`, inclusive
    pub fn path_to(&self, index: usize) -> Vec<&PlanNode> {
        let mut path = Vec::new();
        let mut current = self.nodes.get(index);

        while let Some(node) = current {
            path.push(node);
            current = node.parent.and_then(|parent| self.nodes.get(parent));
        }

        path.reverse();
        path
    }
}

/// Assign parent/children links in place and return leaf indices
///
/// The first node is the root whatever its depth. Every later node pops
/// ancestors whose depth is greater than or equal to its own, so equal
/// depth means sibling. Depth jumps of more than one level attach to the
/// nearest shallower node still open.
pub fn build_tree(nodes: &mut [PlanNode], verbose: bool) -> Vec<usize> {
    if nodes.is_empty() {
        return Vec::new();
    }

    let mut stack: Vec<usize> = vec![0];

    for index in 1..nodes.len() {
        let depth = nodes[index].depth;

        while let Some(&top) = stack.last() {
            if nodes[top].depth >= depth {
                stack.pop();
            } else {
                break;
            }
        }

        if let Some(&parent) = stack.last() {
            nodes[index].parent = Some(parent);
            nodes[parent].children.push(index);
        }

        stack.push(index);
    }

    if verbose {
        debug!("Tree structure built:");
        for node in nodes.iter() {
            debug!(
                "Node {}: level={}, description='{}', time={}",
                node.sequence_id, node.depth, node.description, node.time_ms
            );
        }
    }

    nodes
        .iter()
        .enumerate()
        .filter(|(_, node)| node.is_leaf())
        .map(|(index, _)| index)
        .collect()
}
