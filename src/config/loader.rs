use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::core::SiteProgressConfig;
use crate::core::{Error, Result, ResultExt};

/// File name searched for in the current directory and its ancestors.
pub const CONFIG_FILE_NAME: &str = ".siteprogress.toml";

const MAX_TRAVERSAL_DEPTH: usize = 10;

/// Parse and validate config from a TOML string.
///
/// Invalid values fall back to defaults with a warning; only a TOML syntax
/// or type error is reported as an error.
pub fn parse_and_validate_config(contents: &str) -> Result<SiteProgressConfig> {
    let config = toml::from_str::<SiteProgressConfig>(contents)?;

    if let Err(e) = config.validate() {
        warn!("Invalid configuration: {}. Using defaults.", e);
        return Ok(SiteProgressConfig::default());
    }

    Ok(config)
}

/// Load configuration from an explicit path.
pub fn load_config_from_path(path: &Path) -> Result<SiteProgressConfig> {
    let contents = fs::read_to_string(path).map_err(|e| Error::FileSystem {
        message: format!("Failed to read config file: {}", e),
        path: Some(path.to_path_buf()),
        source: Some(e),
    })?;
    let config = parse_and_validate_config(&contents)
        .context(format!("Failed to parse {}", path.display()))?;
    debug!("Loaded config from {}", path.display());
    Ok(config)
}

fn try_load_config_from_path(config_path: &Path) -> Option<SiteProgressConfig> {
    if !config_path.is_file() {
        return None;
    }
    match load_config_from_path(config_path) {
        Ok(config) => Some(config),
        Err(e) => {
            warn!("{}. Using defaults.", e);
            None
        }
    }
}

/// Directory and its ancestors, nearest first, up to `max_depth` entries.
pub fn directory_ancestors(start: PathBuf, max_depth: usize) -> impl Iterator<Item = PathBuf> {
    std::iter::successors(Some(start), |dir| {
        let mut parent = dir.clone();
        if parent.pop() {
            Some(parent)
        } else {
            None
        }
    })
    .take(max_depth)
}

/// Find the nearest config file above `start`, or defaults.
pub fn load_config_from(start: PathBuf) -> SiteProgressConfig {
    directory_ancestors(start, MAX_TRAVERSAL_DEPTH)
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find_map(|path| try_load_config_from_path(&path))
        .unwrap_or_else(|| {
            debug!(
                "No config found after checking {} directories. Using default config.",
                MAX_TRAVERSAL_DEPTH
            );
            SiteProgressConfig::default()
        })
}

/// Find the nearest config file above the current directory, or defaults.
pub fn load_config() -> SiteProgressConfig {
    match std::env::current_dir() {
        Ok(dir) => load_config_from(dir),
        Err(e) => {
            warn!(
                "Failed to get current directory: {}. Using default config.",
                e
            );
            SiteProgressConfig::default()
        }
    }
}

/// Default configuration rendered as TOML, for `siteprogress init`.
pub fn default_config_toml() -> Result<String> {
    toml::to_string_pretty(&SiteProgressConfig::default())
        .map_err(|e| Error::Configuration(e.to_string()))
}
