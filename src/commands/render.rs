//! Render command implementation.
//!
//! The render command:
//! 1. Reads EXPLAIN ANALYZE text from a file or stdin
//! 2. Parses plan lines and rebuilds the tree
//! 3. Builds folded stacks
//! 4. Renders the flamegraph
//! 5. Records the submitted plan (best effort)
//! 6. Writes output files

use super::utils::validate_parse_options;
use crate::aggregator::calculate_time_distribution;
use crate::flamegraph::{generate_flamegraph, generate_text_summary, FlamegraphConfig};
use crate::output::{build_profile, write_profile, write_svg};
use crate::pipeline::fold_explain;
use crate::store::{persist_in_background, JsonlPlanStore, PlanRecord, PlanStore};
use crate::utils::config::{default_svg_path, ParseOptions, DEFAULT_SQL_ID};
use anyhow::{Context, Result};
use log::{debug, info};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// Arguments for the render command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct RenderArgs {
    /// File with EXPLAIN ANALYZE output (stdin when absent)
    pub input: Option<PathBuf>,

    /// Statement identifier, used for the title and default file name
    pub sql_id: String,

    /// Output path for the SVG (defaults to `<sql_id>.svg`)
    pub output_svg: Option<PathBuf>,

    /// Also write the SVG to stdout
    pub print_svg: bool,

    /// Output path for a JSON profile (optional)
    pub output_json: Option<PathBuf>,

    /// Number of top hot paths to include in the profile and summary
    pub top_paths: usize,

    /// Print text summary to stdout
    pub print_summary: bool,

    /// JSON Lines file recording every submitted plan (optional)
    pub audit_log: Option<PathBuf>,

    pub parse_options: ParseOptions,

    pub flamegraph_config: FlamegraphConfig,
}

impl Default for RenderArgs {
    fn default() -> Self {
        Self {
            input: None,
            sql_id: DEFAULT_SQL_ID.to_string(),
            output_svg: None,
            print_svg: false,
            output_json: None,
            top_paths: 20,
            print_summary: false,
            audit_log: None,
            parse_options: ParseOptions::default(),
            flamegraph_config: FlamegraphConfig::default(),
        }
    }
}

impl RenderArgs {
    /// Where the SVG will be written
    pub fn svg_path(&self) -> PathBuf {
        self.output_svg
            .clone()
            .unwrap_or_else(|| default_svg_path(&self.sql_id))
    }
}

/// Execute the render command
///
/// **Public** - main entry point called from main.rs
///
/// # Errors
/// * Input file missing or unreadable
/// * Flamegraph renderer unavailable or failing
/// * File write errors
///
/// A failing audit write is logged and does not fail the command.
pub fn execute_render(args: RenderArgs) -> Result<()> {
    let start_time = Instant::now();

    info!("Step 1/5: Reading plan text...");
    let explain_text = read_explain_input(args.input.as_deref())?;

    info!("Step 2/5: Building folded stacks...");
    let folded = fold_explain(&explain_text, &args.parse_options);

    debug!("Parsed {} plan nodes into {} unique stacks",
           folded.node_count,
           folded.stacks.len());

    let distribution = calculate_time_distribution(&folded.stacks);
    info!("Time distribution: {}", distribution.summary());

    info!("Step 3/5: Generating flamegraph...");
    let svg = generate_flamegraph(&folded.stacks, &args.flamegraph_config)
        .context("Failed to generate flamegraph")?;

    let audit = args.audit_log.as_ref().map(|path| {
        info!("Step 4/5: Recording plan in {}", path.display());
        let store: Arc<dyn PlanStore> = Arc::new(JsonlPlanStore::new(path));
        let record = PlanRecord::new(
            explain_text.clone(),
            None,
            Some(format!("explain-flamegraph/{}", env!("CARGO_PKG_VERSION"))),
        );
        persist_in_background(store, record)
    });

    info!("Step 5/5: Writing output files...");
    let svg_path = args.svg_path();
    write_svg(&svg, &svg_path)
        .context("Failed to write flamegraph SVG")?;

    info!("✓ Flamegraph written to: {}", svg_path.display());

    if let Some(json_path) = &args.output_json {
        let profile = build_profile(&args.sql_id, &folded.stacks, folded.node_count, args.top_paths);
        write_profile(&profile, json_path)
            .context("Failed to write profile JSON")?;

        info!("✓ Profile written to: {}", json_path.display());
    }

    if args.print_summary {
        println!("\n{}", "=".repeat(80));
        println!("PLAN SUMMARY");
        println!("{}", "=".repeat(80));
        println!("SQL ID:        {}", args.sql_id);
        println!("Plan Nodes:    {}", folded.node_count);
        println!("Unique Stacks: {}", folded.stacks.len());
        println!("Total Time:    {} ms", distribution.total_time_ms);
        println!("\n{}", generate_text_summary(&folded.stacks, args.top_paths));
        println!("{}", "=".repeat(80));
    }

    if args.print_svg {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(&svg)?;
        stdout.flush()?;
    }

    if let Some(handle) = audit {
        // The audit thread logs its own failures
        let _ = handle.join();
    }

    let elapsed = start_time.elapsed();
    info!("Render completed in {:.2}s", elapsed.as_secs_f64());

    Ok(())
}

/// Read plan text from `path`, or from stdin when no path is given
///
/// **Public** - shared by the render and fold commands
pub fn read_explain_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => {
            debug!("Reading plan from: {}", path.display());
            std::fs::read_to_string(path)
                .with_context(|| format!("Error: File '{}' not found or unreadable", path.display()))
        }
        None => {
            debug!("Reading plan from stdin");
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read plan from stdin")?;
            Ok(text)
        }
    }
}

/// Validate render arguments
///
/// **Public** - can be called before execute_render for early validation
pub fn validate_args(args: &RenderArgs) -> Result<()> {
    if args.sql_id.trim().is_empty() {
        anyhow::bail!("sql_id cannot be empty");
    }

    if args.sql_id.contains(['/', '\\']) {
        anyhow::bail!("sql_id cannot contain path separators");
    }

    if args.flamegraph_config.width == 0 {
        anyhow::bail!("width must be greater than 0");
    }

    if args.flamegraph_config.frame_height == 0 {
        anyhow::bail!("height must be greater than 0");
    }

    if args.flamegraph_config.font_size == 0 {
        anyhow::bail!("font size must be greater than 0");
    }

    validate_parse_options(&args.parse_options)?;

    if args.top_paths == 0 {
        anyhow::bail!("top_paths must be greater than 0");
    }

    if args.top_paths > 1000 {
        anyhow::bail!("top_paths is too large (max 1000)");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flamegraph::RendererBackend;

    const PLAN: &str = "-> Nested loop inner join  (cost=1.00 rows=1) (actual time=0.010..0.020 rows=1 loops=1)\n    -> Table scan on t  (cost=0.35 rows=1) (actual time=0.005..0.010 rows=1 loops=1)\n";

    #[test]
    fn test_validate_args_defaults() {
        assert!(validate_args(&RenderArgs::default()).is_ok());
    }

    #[test]
    fn test_validate_args_empty_sql_id() {
        let args = RenderArgs {
            sql_id: "  ".to_string(),
            ..Default::default()
        };
        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_validate_args_sql_id_with_separator() {
        let args = RenderArgs {
            sql_id: "../q1".to_string(),
            ..Default::default()
        };
        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_validate_args_zero_width() {
        let mut args = RenderArgs::default();
        args.flamegraph_config.width = 0;
        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_validate_args_negative_multiplier() {
        let args = RenderArgs {
            parse_options: ParseOptions::new().with_time_multiplier(-1.0),
            ..Default::default()
        };
        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_validate_args_top_paths_zero() {
        let args = RenderArgs {
            top_paths: 0,
            ..Default::default()
        };
        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_svg_path_defaults_to_sql_id() {
        let args = RenderArgs {
            sql_id: "q7".to_string(),
            ..Default::default()
        };
        assert_eq!(args.svg_path(), PathBuf::from("q7.svg"));
    }

    #[test]
    fn test_read_explain_input_missing_file() {
        assert!(read_explain_input(Some(Path::new("/nonexistent/explain.txt"))).is_err());
    }

    #[test]
    fn test_execute_render_writes_outputs() {
        let temp_dir = tempfile::tempdir().unwrap();
        let input = temp_dir.path().join("explain.txt");
        std::fs::write(&input, PLAN).unwrap();

        let args = RenderArgs {
            input: Some(input),
            output_svg: Some(temp_dir.path().join("out/explain.svg")),
            output_json: Some(temp_dir.path().join("out/explain.json")),
            audit_log: Some(temp_dir.path().join("audit.jsonl")),
            ..Default::default()
        };

        execute_render(args).unwrap();

        let svg = std::fs::read_to_string(temp_dir.path().join("out/explain.svg")).unwrap();
        assert!(svg.contains("Table scan on t"));
        assert!(temp_dir.path().join("out/explain.json").exists());

        let audit = JsonlPlanStore::new(temp_dir.path().join("audit.jsonl"));
        assert_eq!(audit.load_all().unwrap()[0].explain_output, PLAN);
    }

    #[test]
    fn test_execute_render_missing_renderer() {
        let temp_dir = tempfile::tempdir().unwrap();
        let input = temp_dir.path().join("explain.txt");
        std::fs::write(&input, PLAN).unwrap();

        let args = RenderArgs {
            input: Some(input),
            output_svg: Some(temp_dir.path().join("explain.svg")),
            flamegraph_config: FlamegraphConfig::new().with_backend(RendererBackend::Script(
                temp_dir.path().join("flamegraph.pl"),
            )),
            ..Default::default()
        };

        let err = execute_render(args).unwrap_err();
        assert!(format!("{:#}", err).contains("not found"));
        assert!(!temp_dir.path().join("explain.svg").exists());
    }

    #[test]
    fn test_execute_render_empty_plan() {
        let temp_dir = tempfile::tempdir().unwrap();
        let input = temp_dir.path().join("explain.txt");
        std::fs::write(&input, "\n\n").unwrap();

        let args = RenderArgs {
            input: Some(input),
            output_svg: Some(temp_dir.path().join("explain.svg")),
            ..Default::default()
        };

        assert!(execute_render(args).is_err());
    }
}
