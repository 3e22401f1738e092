//! Flamegraph rendering for folded plan stacks.
//!
//! This module converts folded stacks into SVG flamegraphs, either with the
//! inferno crate or by piping them through an external `flamegraph.pl`.

pub mod generator;

// Re-export main types
pub use generator::{
    generate_flamegraph,
    generate_text_summary,
    FlamegraphConfig,
    RendererBackend,
};
