pub mod json;
pub mod terminal;

use std::fs;
use std::io::Write;
use std::path::Path;

use crate::cli::OutputFormat;
use crate::core::{Error, Result};
use crate::snapshot::AggregationOutcome;

pub use json::{render_json, render_json_at, ReportEnvelope};
pub use terminal::{render_terminal, ColorMode, ReportView, TerminalOptions};

pub fn format_outcome(
    outcome: &AggregationOutcome,
    format: OutputFormat,
    options: &TerminalOptions,
) -> Result<String> {
    match format {
        OutputFormat::Json => render_json(outcome),
        OutputFormat::Terminal => Ok(render_terminal(outcome, options)),
    }
}

/// Write `content` to `path`, or stdout when no path is given.
pub fn write_output(content: &str, path: Option<&Path>) -> Result<()> {
    let Some(path) = path else {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(content.as_bytes())?;
        if !content.ends_with('\n') {
            stdout.write_all(b"\n")?;
        }
        stdout.flush()?;
        return Ok(());
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| file_error("create directory", parent, e))?;
    }
    fs::write(path, content).map_err(|e| file_error("write", path, e))
}

fn file_error(action: &str, path: &Path, source: std::io::Error) -> Error {
    Error::FileSystem {
        message: format!("failed to {} {}: {}", action, path.display(), source),
        path: Some(path.to_path_buf()),
        source: Some(source),
    }
}
