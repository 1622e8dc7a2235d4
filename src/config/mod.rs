// Sub-modules
mod core;
pub mod fetch;
mod loader;
pub mod retry;

pub use core::{ReportConfig, SiteProgressConfig};
pub use fetch::{FetchConfig, DEFAULT_BATCH_SIZE};
pub use loader::{
    default_config_toml, directory_ancestors, load_config, load_config_from,
    load_config_from_path, parse_and_validate_config, CONFIG_FILE_NAME,
};
pub use retry::{RetryConfig, RetryStrategy};
