//! Fold command implementation.
//!
//! Prints or writes the folded-stack text without rendering, for use with
//! any flamegraph tool that reads the folded format.

use super::render::read_explain_input;
use super::utils::validate_parse_options;
use crate::output::write_folded;
use crate::pipeline::fold_explain;
use crate::utils::config::ParseOptions;
use anyhow::{Context, Result};
use log::info;
use std::io::Write;
use std::path::PathBuf;

/// Arguments for the fold command
#[derive(Debug, Clone, Default)]
pub struct FoldArgs {
    /// File with EXPLAIN ANALYZE output (stdin when absent)
    pub input: Option<PathBuf>,

    /// Output path for folded text (stdout when absent)
    pub output: Option<PathBuf>,

    pub parse_options: ParseOptions,
}

/// Execute the fold command
///
/// An empty plan produces empty output, not an error.
pub fn execute_fold(args: FoldArgs) -> Result<()> {
    validate_parse_options(&args.parse_options)?;

    let explain_text = read_explain_input(args.input.as_deref())?;
    let folded = fold_explain(&explain_text, &args.parse_options);

    info!("Folded {} plan nodes into {} stacks", folded.node_count, folded.stacks.len());

    match &args.output {
        Some(path) => {
            write_folded(&folded.stacks, path)
                .context("Failed to write folded stacks")?;
            info!("✓ Folded stacks written to: {}", path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            for stack in &folded.stacks {
                writeln!(stdout, "{}", stack)?;
            }
            stdout.flush()?;
        }
    }

    Ok(())
}
