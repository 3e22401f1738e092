//! CLI command implementations.
//!
//! Each command is implemented in its own module.
//! Commands orchestrate the various library components to perform user tasks.

pub mod fold;
pub mod render;
pub mod utils;

// Re-export main command functions
pub use fold::{execute_fold, FoldArgs};
pub use render::{execute_render, read_explain_input, validate_args, RenderArgs};
pub use utils::{display_version, validate_parse_options};
