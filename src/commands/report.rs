use crate::cli::OutputFormat;
use crate::config::{self, SiteProgressConfig};
use crate::output::{self, ColorMode, ReportView, TerminalOptions};
use crate::snapshot::{aggregate_site, AggregationOutcome, JsonDirSource};
use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::info;

pub struct ReportCommand {
    pub data_dir: PathBuf,
    pub site: String,
    pub format: OutputFormat,
    pub output: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub top: Option<usize>,
    pub view: ReportView,
    pub plain: bool,
}

impl ReportCommand {
    fn load_config(&self) -> Result<SiteProgressConfig> {
        match &self.config {
            Some(path) => config::load_config_from_path(path)
                .with_context(|| format!("loading {}", path.display())),
            None => Ok(config::load_config()),
        }
    }

    fn terminal_options(&self, config: &SiteProgressConfig) -> TerminalOptions {
        TerminalOptions {
            view: self.view,
            top_assignees: self.top.or(config.report.top_assignees),
            color: if self.plain {
                ColorMode::Never
            } else {
                ColorMode::Auto
            },
        }
    }
}

/// Run the report command; the outcome is returned so the caller can pick
/// an exit status for unavailable snapshots.
pub fn handle_report(command: ReportCommand) -> Result<AggregationOutcome> {
    let config = command.load_config()?;
    let source = JsonDirSource::new(&command.data_dir);

    info!(site = %command.site, data_dir = %command.data_dir.display(), "building report");
    let outcome = aggregate_site(&source, &command.site, &config);

    let content = output::format_outcome(
        &outcome,
        command.format,
        &command.terminal_options(&config),
    )?;
    output::write_output(&content, command.output.as_deref())?;

    Ok(outcome)
}
