//! JSON profile output writer.
//!
//! Writes PlanProfile structs to JSON files with proper formatting.

use super::prepare_output_path;
use crate::aggregator::metrics::calculate_hot_paths;
use crate::aggregator::stack_builder::{total_weight, FoldedStack};
use crate::parser::schema::{PlanProfile, StackEntry};
use crate::utils::config::SCHEMA_VERSION;
use crate::utils::error::OutputError;
use log::{debug, info};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Assemble a profile from folded stacks
///
/// **Public** - used by the render command before writing
pub fn build_profile(
    sql_id: &str,
    stacks: &[FoldedStack],
    node_count: usize,
    top_paths: usize,
) -> PlanProfile {
    PlanProfile {
        version: SCHEMA_VERSION.to_string(),
        sql_id: sql_id.to_string(),
        total_time_ms: total_weight(stacks),
        node_count,
        hot_paths: calculate_hot_paths(stacks, top_paths),
        stacks: stacks
            .iter()
            .map(|s| StackEntry {
                stack: s.stack.clone(),
                time_ms: s.weight,
            })
            .collect(),
        generated_at: chrono::Utc::now().to_rfc3339(),
    }
}

/// Write a profile to a JSON file
///
/// **Public** - main entry point for JSON output
///
/// # Errors
/// * `OutputError::WriteFailed` - I/O error during write
/// * `OutputError::SerializationFailed` - JSON serialization error
/// * `OutputError::InvalidPath` - Path cannot be created or is invalid
pub fn write_profile(profile: &PlanProfile, output_path: impl AsRef<Path>) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();

    info!("Writing profile to: {}", output_path.display());

    prepare_output_path(output_path)?;

    let writer = BufWriter::new(File::create(output_path)?);
    serde_json::to_writer_pretty(writer, profile)?;

    info!("Profile written successfully ({} bytes)",
          calculate_file_size(output_path));

    Ok(())
}

/// Calculate file size in bytes
///
/// **Private** - internal utility
fn calculate_file_size(path: &Path) -> u64 {
    std::fs::metadata(path)
        .map(|m| m.len())
        .unwrap_or(0)
}

/// Read a profile from a JSON file
///
/// **Public** - useful for validation and testing
///
/// # Errors
/// * `OutputError::WriteFailed` - File read error (reusing WriteFailed for I/O)
/// * `OutputError::SerializationFailed` - JSON parse error
pub fn read_profile(input_path: impl AsRef<Path>) -> Result<PlanProfile, OutputError> {
    let input_path = input_path.as_ref();

    debug!("Reading profile from: {}", input_path.display());

    let file = File::open(input_path)?;
    let profile: PlanProfile = serde_json::from_reader(file)?;

    debug!("Profile loaded: version {}, sql id {}",
           profile.version,
           profile.sql_id);

    Ok(profile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn create_test_profile() -> PlanProfile {
        let stacks = vec![
            FoldedStack::new("Limit".to_string(), 300),
            FoldedStack::new("Limit;Sort".to_string(), 600),
            FoldedStack::new("Limit;Sort;Scan".to_string(), 100),
        ];
        build_profile("q42", &stacks, 3, 2)
    }

    #[test]
    fn test_build_profile() {
        let profile = create_test_profile();

        assert_eq!(profile.version, SCHEMA_VERSION);
        assert_eq!(profile.total_time_ms, 1000);
        assert_eq!(profile.stacks.len(), 3);
        assert_eq!(profile.stacks[0].stack, "Limit");
        assert_eq!(profile.hot_paths.len(), 2);
        assert_eq!(profile.hot_paths[0].stack, "Limit;Sort");
        assert_eq!(profile.hot_paths[0].percentage, 60.0);
    }

    #[test]
    fn test_build_profile_huge_total_saturates() {
        let stacks = vec![
            FoldedStack::new("Hash join".to_string(), u64::MAX),
            FoldedStack::new("Hash join;Table scan on t".to_string(), u64::MAX),
        ];
        let profile = build_profile("q1", &stacks, 2, 5);

        assert_eq!(profile.total_time_ms, u64::MAX);
        assert_eq!(profile.hot_paths.len(), 2);
    }

    #[test]
    fn test_write_and_read_profile() {
        let profile = create_test_profile();
        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path();

        write_profile(&profile, path).unwrap();
        let loaded = read_profile(path).unwrap();

        assert_eq!(loaded.sql_id, "q42");
        assert_eq!(loaded.node_count, 3);
        assert_eq!(loaded.generated_at, profile.generated_at);
    }

    #[test]
    fn test_write_profile_empty_path() {
        let result = write_profile(&create_test_profile(), "");
        assert!(matches!(result, Err(OutputError::InvalidPath(_))));
    }

    #[test]
    fn test_write_creates_parent_dirs() {
        let temp_dir = tempfile::tempdir().unwrap();
        let nested_path = temp_dir.path().join("nested/dirs/profile.json");

        write_profile(&create_test_profile(), &nested_path).unwrap();

        assert!(nested_path.exists());
    }
}
