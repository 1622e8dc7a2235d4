//! CLI command implementations.
//!
//! - **report**: fetch one site's snapshot and render its progress rollup
//! - **init**: write a default `.siteprogress.toml`

pub mod init;
pub mod report;

pub use init::{init_config, init_config_in};
pub use report::{handle_report, ReportCommand};
