//! SVG flamegraph rendering for folded plan stacks.
//!
//! Two backends consume the same folded-stack text:
//! - `Inferno`: in-process rendering with the inferno crate
//! - `Script`: Brendan Gregg's `flamegraph.pl`, fed on stdin

use crate::aggregator::stack_builder::{to_folded_text, total_weight, FoldedStack};
use crate::utils::config::{
    DEFAULT_COUNT_NAME, DEFAULT_FONT_SIZE, DEFAULT_FRAME_HEIGHT, DEFAULT_IMAGE_WIDTH,
    DEFAULT_NAME_TYPE, DEFAULT_SQL_ID,
};
use crate::utils::error::RenderError;
use inferno::flamegraph::{self, Options};
use log::{debug, info};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Which renderer turns folded stacks into SVG
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RendererBackend {
    #[default]
    Inferno,
    Script(PathBuf),
}

/// Flamegraph configuration
#[derive(Debug, Clone)]
pub struct FlamegraphConfig {
    pub title: String,
    pub count_name: String,
    pub name_type: String,
    pub width: usize,
    pub frame_height: usize,
    pub font_size: usize,
    pub backend: RendererBackend,
}

impl Default for FlamegraphConfig {
    fn default() -> Self {
        Self {
            title: DEFAULT_SQL_ID.to_string(),
            count_name: DEFAULT_COUNT_NAME.to_string(),
            name_type: DEFAULT_NAME_TYPE.to_string(),
            width: DEFAULT_IMAGE_WIDTH,
            frame_height: DEFAULT_FRAME_HEIGHT,
            font_size: DEFAULT_FONT_SIZE,
            backend: RendererBackend::Inferno,
        }
    }
}

impl FlamegraphConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_backend(mut self, backend: RendererBackend) -> Self {
        self.backend = backend;
        self
    }
}

/// Render folded stacks into SVG bytes
///
/// **Public** - main entry point for rendering
///
/// # Errors
/// * `RenderError::EmptyStacks` - nothing to draw
/// * `RenderError::RendererUnavailable` - script backend not found or not executable
/// * `RenderError::RendererFailed` - script exited unsuccessfully
/// * `RenderError::Render` - inferno failed or the total time is out of its range
/// * `RenderError::IoError` - pipe failure
pub fn generate_flamegraph(
    stacks: &[FoldedStack],
    config: &FlamegraphConfig,
) -> Result<Vec<u8>, RenderError> {
    if stacks.is_empty() {
        return Err(RenderError::EmptyStacks);
    }

    info!("Generating flamegraph with {} stacks", stacks.len());

    let svg = match &config.backend {
        RendererBackend::Inferno => render_with_inferno(stacks, config)?,
        RendererBackend::Script(path) => render_with_script(stacks, config, path)?,
    };

    info!("Flamegraph generated successfully ({} bytes)", svg.len());
    Ok(svg)
}

fn render_with_inferno(
    stacks: &[FoldedStack],
    config: &FlamegraphConfig,
) -> Result<Vec<u8>, RenderError> {
    let mut svg = Vec::new();
    write_inferno_svg(stacks, config, &mut svg)?;
    Ok(svg)
}

fn write_inferno_svg<W: Write>(
    stacks: &[FoldedStack],
    config: &FlamegraphConfig,
    writer: W,
) -> Result<(), RenderError> {
    // inferno accumulates sample counts in usize
    let total = stacks.iter().try_fold(0usize, |total, stack| {
        usize::try_from(stack.weight)
            .ok()
            .and_then(|weight| total.checked_add(weight))
    });
    if total.is_none() {
        return Err(RenderError::Render(
            "total plan time exceeds the renderer's sample range".to_string(),
        ));
    }

    let mut options = Options::default();
    options.title = config.title.clone();
    options.count_name = config.count_name.clone();
    options.name_type = config.name_type.clone();
    options.image_width = Some(config.width);
    options.frame_height = config.frame_height;
    options.font_size = config.font_size;

    let lines: Vec<String> = stacks.iter().map(FoldedStack::to_line).collect();
    flamegraph::from_lines(&mut options, lines.iter().map(String::as_str), writer)
        .map_err(|e| RenderError::Render(e.to_string()))
}

fn render_with_script(
    stacks: &[FoldedStack],
    config: &FlamegraphConfig,
    script: &Path,
) -> Result<Vec<u8>, RenderError> {
    if !script.is_file() {
        return Err(RenderError::RendererUnavailable { path: script.to_path_buf() });
    }

    debug!("Invoking {}", script.display());

    let mut child = Command::new(script)
        .arg("--title")
        .arg(&config.title)
        .arg("--countname")
        .arg(&config.count_name)
        .arg("--width")
        .arg(config.width.to_string())
        .arg("--height")
        .arg(config.frame_height.to_string())
        .arg("--fontsize")
        .arg(config.font_size.to_string())
        .arg("--nametype")
        .arg(&config.name_type)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| match e.kind() {
            ErrorKind::NotFound | ErrorKind::PermissionDenied => {
                RenderError::RendererUnavailable { path: script.to_path_buf() }
            }
            _ => RenderError::IoError(e),
        })?;

    let folded = to_folded_text(stacks);
    let writer = child.stdin.take().map(|mut stdin| {
        std::thread::spawn(move || stdin.write_all(folded.as_bytes()))
    });

    let output = child.wait_with_output()?;

    if let Some(writer) = writer {
        // A script that exits early closes the pipe; its status is reported below
        if let Ok(Err(e)) = writer.join() {
            debug!("Renderer stdin closed early: {}", e);
        }
    }

    if !output.status.success() {
        return Err(RenderError::RendererFailed {
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(output.stdout)
}

/// Create a text summary of the slowest plan paths
pub fn generate_text_summary(stacks: &[FoldedStack], max_lines: usize) -> String {
    let mut ranked: Vec<&FoldedStack> = stacks.iter().collect();
    ranked.sort_by(|a, b| b.weight.cmp(&a.weight));

    let total_time = total_weight(stacks).max(1);
    let mut lines = Vec::new();

    lines.push("  PLAN HOT PATHS".to_string());
    lines.push(format!("  {:<60} {:>12} {:>7}", "Plan Path (Slowest First)", "MS", "%"));
    lines.push(format!("  {}", "-".repeat(81)));

    for stack in ranked.iter().take(max_lines) {
        let percentage = (stack.weight as f64 / total_time as f64) * 100.0;

        // Keep the leaf end of long paths visible
        let char_count = stack.stack.chars().count();
        let display_stack = if char_count > 60 {
            let tail: String = stack.stack.chars().skip(char_count - 57).collect();
            format!("...{}", tail)
        } else {
            stack.stack.clone()
        };

        lines.push(format!(
            "  {:<60} {:>12} {:>6.1}%",
            display_stack, stack.weight, percentage
        ));
    }

    if stacks.len() > max_lines {
        lines.push(String::new());
        lines.push(format!("   (Showing top {} of {} unique paths)", max_lines, stacks.len()));
    }

    lines.join("\n")
}
