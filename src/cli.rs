use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::output::ReportView;

#[derive(Parser, Debug)]
#[command(name = "siteprogress")]
#[command(about = "Construction-site progress rollups from activity measurements", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Aggregate one site's activities into a progress report
    Report {
        /// Directory holding one subdirectory of JSON exports per site
        data_dir: PathBuf,

        /// Site identifier (subdirectory of DATA_DIR)
        #[arg(short, long, env = "SITEPROGRESS_SITE")]
        site: String,

        /// Output format
        #[arg(short, long, value_enum, default_value = "terminal")]
        format: OutputFormat,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Configuration file (defaults to the nearest .siteprogress.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Show only the top N assignees
        #[arg(long = "top", visible_alias = "head")]
        top: Option<usize>,

        /// Which measurement track to print in terminal output
        #[arg(long, value_enum, default_value = "all")]
        view: ReportView,

        /// Disable colored output
        #[arg(long)]
        plain: bool,

        /// Increase log verbosity (can be repeated: -v, -vv)
        #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
        verbosity: u8,
    },

    /// Write a default .siteprogress.toml in the current directory
    Init {
        /// Force overwrite existing config
        #[arg(long)]
        force: bool,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum OutputFormat {
    Json,
    Terminal,
}

/// Log filter directive for a `-v` count, unless `RUST_LOG` says otherwise.
pub fn log_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "siteprogress=warn",
        1 => "siteprogress=info",
        2 => "siteprogress=debug",
        _ => "siteprogress=trace",
    }
}
