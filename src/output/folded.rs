//! Folded stack text writer.
//!
//! Writes the exact text handed to a flamegraph renderer, one
//! `<stack> <weight>` line per unique plan path.

use super::prepare_output_path;
use crate::aggregator::stack_builder::FoldedStack;
use crate::utils::error::OutputError;
use log::info;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Write folded stacks to a file, newline terminated
pub fn write_folded(stacks: &[FoldedStack], output_path: impl AsRef<Path>) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();

    prepare_output_path(output_path)?;

    let mut writer = BufWriter::new(File::create(output_path)?);
    for stack in stacks {
        writeln!(writer, "{}", stack)?;
    }
    writer.flush()?;

    info!("Wrote {} folded stacks to: {}", stacks.len(), output_path.display());
    Ok(())
}
