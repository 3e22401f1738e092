//! Line parser for EXPLAIN ANALYZE output.
//!
//! Each plan line is cleaned of client noise (row banners, `EXPLAIN:` labels,
//! `->` connectors), then split into a nesting depth, an operator description
//! and an elapsed time. Lines that carry no operator are skipped.

use super::schema::PlanNode;
use crate::utils::config::{ParseOptions, INDENT_WIDTH};
use crate::utils::error::LineParseError;
use log::{debug, warn};
use regex::Regex;
use std::sync::OnceLock;

static ROW_BANNER_RE: OnceLock<Regex> = OnceLock::new();
static EXPLAIN_PREFIX_RE: OnceLock<Regex> = OnceLock::new();
static ACTUAL_TIME_RE: OnceLock<Regex> = OnceLock::new();
static LOOPS_RE: OnceLock<Regex> = OnceLock::new();
static COST_RE: OnceLock<Regex> = OnceLock::new();
static ACTUAL_TIME_GROUP_RE: OnceLock<Regex> = OnceLock::new();
static WHITESPACE_RE: OnceLock<Regex> = OnceLock::new();

fn cached_regex(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("valid regex"))
}

/// Result of parsing one plan line
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedLine {
    pub depth: usize,
    pub description: String,
    pub time_ms: f64,
}

/// Parse a whole EXPLAIN ANALYZE text blob into unlinked plan nodes
///
/// **Public** - main entry point for parsing
///
/// Blank and noise-only lines are dropped. A line that fails to parse is
/// logged and skipped; it never aborts the rest of the plan.
pub fn parse_plan(explain_text: &str, options: &ParseOptions) -> Vec<PlanNode> {
    let mut nodes = Vec::new();

    for line in explain_text.lines() {
        if line.trim().is_empty() {
            continue;
        }

        match parse_explain_line(line, options) {
            Ok(Some(parsed)) => {
                let sequence_id = nodes.len() + 1;
                nodes.push(PlanNode::new(
                    sequence_id,
                    parsed.depth,
                    parsed.description,
                    parsed.time_ms,
                ));
            }
            Ok(None) => {}
            Err(e) => {
                warn!("Error parsing line: {}", line);
                warn!("Error details: {}", e);
            }
        }
    }

    debug!("Parsed {} plan nodes", nodes.len());
    nodes
}

/// Parse a single EXPLAIN ANALYZE line
///
/// **Public** - exposed for tests and for callers feeding lines one at a time
///
/// # Returns
/// * `Ok(None)` - the line is blank or carries no operator text
/// * `Ok(Some(_))` - depth, cleaned description and time in milliseconds
///
/// # Errors
/// * `LineParseError::InvalidTime` - `actual time` end value is not a number
/// * `LineParseError::InvalidLoops` - `loops` value does not fit a counter
pub fn parse_explain_line(
    line: &str,
    options: &ParseOptions,
) -> Result<Option<ParsedLine>, LineParseError> {
    let line = clean_mysql_output(line);
    if line.trim().is_empty() {
        return Ok(None);
    }

    let depth = compute_depth(&line);
    let time_ms = extract_time(&line, options.time_multiplier)?;
    let description = clean_description(&line);

    if description.is_empty() {
        return Ok(None);
    }

    if options.verbose {
        debug!(
            "Parsed line: level={}, description='{}', time={}",
            depth, description, time_ms
        );
    }

    Ok(Some(ParsedLine {
        depth,
        description,
        time_ms,
    }))
}

/// Remove client decoration that is not part of the plan itself
///
/// Strips `*** N. row ***` banners, a leading `EXPLAIN:` label and every
/// `->` connector. Indentation is left untouched.
pub fn clean_mysql_output(line: &str) -> String {
    let line = cached_regex(&ROW_BANNER_RE, r"\*+\s*[0-9]+\.\s*row\s*\*+").replace_all(line, "");
    let line = cached_regex(&EXPLAIN_PREFIX_RE, r"(?i)^EXPLAIN:\s*").replace(&line, "");
    line.replace("->", "")
}

/// Nesting level from leading spaces: 0-3 spaces is level 1, 4-7 level 2, ...
pub fn compute_depth(line: &str) -> usize {
    let indent = line.len() - line.trim_start_matches(' ').len();
    if indent >= INDENT_WIDTH {
        indent / INDENT_WIDTH + 1
    } else {
        1
    }
}

/// Extract node time from `actual time=<start>..<end>` and `loops=<n>`
///
/// Returns `end * loops * multiplier`, or 0.0 when the line has no
/// `actual time` annotation. A missing `loops` counts as one loop.
pub fn extract_time(line: &str, multiplier: f64) -> Result<f64, LineParseError> {
    let Some(captures) = cached_regex(&ACTUAL_TIME_RE, r"actual time=([0-9.]+)\.\.([0-9.]+)").captures(line)
    else {
        return Ok(0.0);
    };

    let end_raw = &captures[2];
    let end_time: f64 = end_raw.parse().map_err(|_| LineParseError::InvalidTime {
        value: end_raw.to_string(),
    })?;

    let loops = match cached_regex(&LOOPS_RE, r"loops=([0-9]+)").captures(line) {
        Some(loops_captures) => {
            let loops_raw = &loops_captures[1];
            loops_raw.parse::<u64>().map_err(|_| LineParseError::InvalidLoops {
                value: loops_raw.to_string(),
            })?
        }
        None => 1,
    };

    Ok(end_time * loops as f64 * multiplier)
}

/// Operator text with cost/time groups and semicolons removed, whitespace collapsed
pub fn clean_description(line: &str) -> String {
    let description = cached_regex(&COST_RE, r"\(cost[^)]+\)").replace_all(line, "");
    let description = cached_regex(&ACTUAL_TIME_GROUP_RE, r"\(actual time[^)]+\)").replace_all(&description, "");
    let description = description.replace(';', "");
    let description = cached_regex(&WHITESPACE_RE, r"\s+").replace_all(description.trim_start(), " ");
    description.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Option<ParsedLine> {
        parse_explain_line(line, &ParseOptions::default()).unwrap()
    }

    #[test]
    fn test_compute_depth_boundaries() {
        assert_eq!(compute_depth("Scan"), 1);
        assert_eq!(compute_depth("   Scan"), 1);
        assert_eq!(compute_depth("    Scan"), 2);
        assert_eq!(compute_depth("       Scan"), 2);
        assert_eq!(compute_depth("        Scan"), 3);
        assert_eq!(compute_depth("            Scan"), 4);
    }

    #[test]
    fn test_compute_depth_ignores_tabs() {
        assert_eq!(compute_depth("\t\tScan"), 1);
    }

    #[test]
    fn test_extract_time_with_loops() {
        let time = extract_time("(actual time=12.500..45.750 rows=10 loops=3)", 1000.0).unwrap();
        assert_eq!(time, 137250.0);
    }

    #[test]
    fn test_extract_time_defaults_to_one_loop() {
        let time = extract_time("(actual time=0.5..2.5 rows=10)", 1000.0).unwrap();
        assert_eq!(time, 2500.0);
    }

    #[test]
    fn test_extract_time_absent() {
        assert_eq!(extract_time("Table scan on t (cost=0.35 rows=1)", 1000.0).unwrap(), 0.0);
    }

    #[test]
    fn test_extract_time_invalid_number() {
        let err = extract_time("(actual time=1.0..2.0.0 rows=1 loops=1)", 1000.0).unwrap_err();
        assert_eq!(err, LineParseError::InvalidTime { value: "2.0.0".to_string() });
    }

    #[test]
    fn test_extract_time_ignores_non_ascii_loops() {
        let time = extract_time("(actual time=0.1..2 rows=1 loops=\u{0663})", 1000.0).unwrap();
        assert_eq!(time, 2000.0);
    }

    #[test]
    fn test_extract_time_custom_multiplier() {
        let time = extract_time("(actual time=0.1..4 rows=1 loops=2)", 1.0).unwrap();
        assert_eq!(time, 8.0);
    }

    #[test]
    fn test_clean_mysql_output_strips_banner_prefix_and_arrows() {
        assert_eq!(
            clean_mysql_output("*************************** 1. row ***************************"),
            ""
        );
        assert_eq!(clean_mysql_output("EXPLAIN: -> Limit: 10 row(s)"), " Limit: 10 row(s)");
        assert_eq!(clean_mysql_output("explain: Limit"), "Limit");
        assert_eq!(clean_mysql_output("    -> Sort"), "     Sort");
    }

    #[test]
    fn test_clean_description() {
        let description = clean_description(
            "     Filter: (t.a > 1);  (cost=0.35 rows=1) (actual time=0.01..0.02 rows=1 loops=1)",
        );
        assert_eq!(description, "Filter: (t.a > 1)");
    }

    #[test]
    fn test_parse_line_full() {
        let parsed = parse(
            "    -> Table scan on t  (cost=0.35 rows=1) (actual time=0.050..0.100 rows=2 loops=4)",
        )
        .unwrap();

        assert_eq!(parsed.depth, 2);
        assert_eq!(parsed.description, "Table scan on t");
        assert_eq!(parsed.time_ms, 0.1 * 4.0 * 1000.0);
    }

    #[test]
    fn test_parse_line_skips_noise() {
        assert!(parse("").is_none());
        assert!(parse("      ").is_none());
        assert!(parse("*************************** 1. row ***************************").is_none());
        assert!(parse("->").is_none());
        assert!(parse("  ;;  ").is_none());
    }

    #[test]
    fn test_parse_line_unbalanced_parens() {
        let parsed = parse("-> Sort: t.a (cost=1.00 rows=2").unwrap();
        assert_eq!(parsed.description, "Sort: t.a (cost=1.00 rows=2");
        assert_eq!(parsed.time_ms, 0.0);
    }

    #[test]
    fn test_parse_plan_skips_bad_lines() {
        let text = "-> Limit (actual time=0.1..0.2 rows=1 loops=1)\n\
                    \n\
                    -> Broken (actual time=1..2.2.2 rows=1 loops=1)\n\
                    \x20   -> Scan (actual time=0.1..0.1 rows=1 loops=1)\n";

        let nodes = parse_plan(text, &ParseOptions::default());

        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].description, "Limit");
        assert_eq!(nodes[0].sequence_id, 1);
        assert_eq!(nodes[1].description, "Scan");
        assert_eq!(nodes[1].sequence_id, 2);
        assert_eq!(nodes[1].depth, 2);
    }
}
