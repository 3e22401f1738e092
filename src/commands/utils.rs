use crate::utils::config::{ParseOptions, SCHEMA_VERSION};
use anyhow::Result;

/// Display version information
pub fn display_version() {
    println!("Explain Flamegraph v{}", env!("CARGO_PKG_VERSION"));
    println!("Profile Schema: v{}", SCHEMA_VERSION);
    println!();
    println!("Flamegraphs from MySQL EXPLAIN ANALYZE output.");
}

/// Validate parse options shared by every command
pub fn validate_parse_options(options: &ParseOptions) -> Result<()> {
    let multiplier = options.time_multiplier;
    if !multiplier.is_finite() || multiplier < 0.0 {
        anyhow::bail!("time multiplier must be a non-negative number");
    }

    Ok(())
}
