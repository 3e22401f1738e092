//! Explain Flamegraph CLI
//!
//! Reads MySQL `EXPLAIN ANALYZE` output from a file or stdin and produces
//! folded stacks or an SVG flamegraph.

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use env_logger::Env;
use std::path::PathBuf;

use explain_flamegraph::commands::{
    display_version, execute_fold, execute_render, validate_args, FoldArgs, RenderArgs,
};
use explain_flamegraph::flamegraph::{FlamegraphConfig, RendererBackend};
use explain_flamegraph::utils::config::{
    ParseOptions, DEFAULT_FLAMEGRAPH_SCRIPT, DEFAULT_SQL_ID, DEFAULT_TIME_MULTIPLIER,
};

/// Explain Flamegraph - flamegraphs from EXPLAIN ANALYZE
#[derive(Parser, Debug)]
#[command(name = "explain-flamegraph")]
#[command(version, about, long_about = None)]
#[command(after_help = "Examples:\n  \
    mysql -BNEe 'explain analyze <sql>' > explain.txt && explain-flamegraph render explain.txt\n  \
    mysql -BNEe 'explain analyze <sql>' | explain-flamegraph render --sql-id q1")]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Flamegraph renderer selection
#[derive(ValueEnum, Clone, Copy, Debug)]
enum Renderer {
    /// Built-in renderer
    Inferno,
    /// External flamegraph.pl script
    Script,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Render an SVG flamegraph from a plan
    Render {
        /// File containing EXPLAIN ANALYZE output (reads stdin if omitted)
        explain_file: Option<PathBuf>,

        /// SQL ID for the flamegraph title and file name
        #[arg(long, default_value = DEFAULT_SQL_ID)]
        sql_id: String,

        /// Output path for the SVG (defaults to <sql-id>.svg)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also print the SVG to stdout
        #[arg(long)]
        stdout: bool,

        /// Flamegraph renderer
        #[arg(long, value_enum, default_value = "inferno")]
        renderer: Renderer,

        /// Path to flamegraph.pl for the script renderer
        #[arg(long, env = "FLAMEGRAPH_SCRIPT", default_value = DEFAULT_FLAMEGRAPH_SCRIPT)]
        script: PathBuf,

        /// Flamegraph width in pixels
        #[arg(long, default_value = "1000")]
        width: usize,

        /// Frame height in pixels
        #[arg(long, default_value = "20")]
        height: usize,

        /// Font size
        #[arg(long, default_value = "13")]
        font_size: usize,

        /// Multiplier applied to `actual time` end values
        #[arg(long, default_value_t = DEFAULT_TIME_MULTIPLIER)]
        time_multiplier: f64,

        /// Output path for a JSON profile (optional)
        #[arg(long)]
        json: Option<PathBuf>,

        /// Number of top hot paths in the profile and summary
        #[arg(long, default_value = "20")]
        top_paths: usize,

        /// Print text summary to stdout
        #[arg(long)]
        summary: bool,

        /// Append the submitted plan to this JSON Lines audit log
        #[arg(long, env = "EXPLAIN_AUDIT_LOG")]
        audit_log: Option<PathBuf>,
    },

    /// Print folded stacks without rendering
    Fold {
        /// File containing EXPLAIN ANALYZE output (reads stdin if omitted)
        explain_file: Option<PathBuf>,

        /// Output path for folded stacks (prints to stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Multiplier applied to `actual time` end values
        #[arg(long, default_value_t = DEFAULT_TIME_MULTIPLIER)]
        time_multiplier: f64,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    // Execute command
    match cli.command {
        Commands::Render {
            explain_file,
            sql_id,
            output,
            stdout,
            renderer,
            script,
            width,
            height,
            font_size,
            time_multiplier,
            json,
            top_paths,
            summary,
            audit_log,
        } => {
            let backend = match renderer {
                Renderer::Inferno => RendererBackend::Inferno,
                Renderer::Script => RendererBackend::Script(script),
            };

            let mut flamegraph_config = FlamegraphConfig::new()
                .with_title(sql_id.clone())
                .with_backend(backend);
            flamegraph_config.width = width;
            flamegraph_config.frame_height = height;
            flamegraph_config.font_size = font_size;

            let args = RenderArgs {
                input: explain_file,
                sql_id,
                output_svg: output,
                print_svg: stdout,
                output_json: json,
                top_paths,
                print_summary: summary,
                audit_log,
                parse_options: ParseOptions::new()
                    .with_verbose(cli.verbose)
                    .with_time_multiplier(time_multiplier),
                flamegraph_config,
            };

            // Validate args first
            validate_args(&args)?;

            execute_render(args)?;
        }

        Commands::Fold {
            explain_file,
            output,
            time_multiplier,
        } => {
            execute_fold(FoldArgs {
                input: explain_file,
                output,
                parse_options: ParseOptions::new()
                    .with_verbose(cli.verbose)
                    .with_time_multiplier(time_multiplier),
            })?;
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}
