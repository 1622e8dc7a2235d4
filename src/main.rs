use anyhow::Result;
use clap::Parser;
use siteprogress::cli::{log_directive, Cli, Commands};
use siteprogress::commands::{self, ReportCommand};
use tracing_subscriber::EnvFilter;

fn init_tracing(verbosity: u8) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::new(log_directive(verbosity)),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialise logging: {e}"))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Report {
            data_dir,
            site,
            format,
            output,
            config,
            top,
            view,
            plain,
            verbosity,
        } => {
            init_tracing(verbosity)?;
            let outcome = commands::handle_report(ReportCommand {
                data_dir,
                site,
                format,
                output,
                config,
                top,
                view,
                plain,
            })?;
            if !outcome.is_ready() {
                std::process::exit(2);
            }
        }
        Commands::Init { force } => {
            init_tracing(0)?;
            commands::init_config(force)?;
        }
    }

    Ok(())
}
