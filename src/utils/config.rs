//! Configuration and constants for the CLI.

use std::path::PathBuf;

/// Current JSON profile schema version
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Leading spaces per nesting level in EXPLAIN ANALYZE output
pub const INDENT_WIDTH: usize = 4;

/// Separator between frames of a folded stack
pub const PATH_DELIMITER: char = ';';

// MySQL reports `actual time` per loop; the folded weight is end * loops * multiplier
pub const DEFAULT_TIME_MULTIPLIER: f64 = 1000.0;

/// Used for the flamegraph title and the default output file stem
pub const DEFAULT_SQL_ID: &str = "explain";

/// Location of Brendan Gregg's flamegraph.pl when the script backend is selected
pub const DEFAULT_FLAMEGRAPH_SCRIPT: &str = "./flamegraph.pl";

// Display defaults mirrored from the flamegraph.pl invocation
pub const DEFAULT_COUNT_NAME: &str = "milliseconds";
pub const DEFAULT_NAME_TYPE: &str = "Operator ->";
pub const DEFAULT_IMAGE_WIDTH: usize = 1000;
pub const DEFAULT_FRAME_HEIGHT: usize = 20;
pub const DEFAULT_FONT_SIZE: usize = 13;

/// Options that control how raw plan text is parsed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParseOptions {
    /// Emit a debug record for every parsed line and the built tree
    pub verbose: bool,

    /// Scale applied to `end * loops` when extracting node time
    pub time_multiplier: f64,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            verbose: false,
            time_multiplier: DEFAULT_TIME_MULTIPLIER,
        }
    }
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_time_multiplier(mut self, multiplier: f64) -> Self {
        self.time_multiplier = multiplier;
        self
    }
}

/// Default SVG file name for a given sql id (`<sql_id>.svg`)
pub fn default_svg_path(sql_id: &str) -> PathBuf {
    PathBuf::from(format!("{}.svg", sql_id))
}
