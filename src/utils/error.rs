//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while parsing a single plan line
///
/// These never abort a whole plan: the caller logs them and skips the line.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LineParseError {
    #[error("Invalid actual time value: {value}")]
    InvalidTime { value: String },

    #[error("Invalid loops value: {value}")]
    InvalidLoops { value: String },
}

/// Errors that can occur during flamegraph rendering
#[derive(Error, Debug)]
pub enum RenderError {
    #[error(
        "Flamegraph renderer not found at {}. Download \
         https://github.com/brendangregg/FlameGraph/blob/master/flamegraph.pl \
         and grant it execution permission",
        .path.display()
    )]
    RendererUnavailable { path: PathBuf },

    #[error("Flamegraph renderer exited with {status}: {stderr}")]
    RendererFailed { status: String, stderr: String },

    #[error("Flamegraph rendering failed: {0}")]
    Render(String),

    #[error("Empty stack data")]
    EmptyStacks,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Errors that can occur while persisting submitted plans
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to write audit record: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize audit record: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors that can occur during file output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Failed to serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),
}
