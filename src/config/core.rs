use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::fetch::FetchConfig;
use super::retry::RetryConfig;

/// Root configuration structure for siteprogress
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct SiteProgressConfig {
    /// Batched activity fetch settings
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Retry policy for failed fetch batches
    #[serde(default)]
    pub retry: RetryConfig,

    /// Report rendering and caching
    #[serde(default)]
    pub report: ReportConfig,
}

impl SiteProgressConfig {
    /// Check values a TOML file can express but the loader cannot use.
    pub fn validate(&self) -> Result<(), String> {
        if self.fetch.batch_size == 0 {
            return Err("fetch.batch_size must be greater than 0".to_string());
        }
        if !(0.0..=1.0).contains(&self.retry.jitter_factor) {
            return Err(format!(
                "retry.jitter_factor must be within 0.0..=1.0, got {}",
                self.retry.jitter_factor
            ));
        }
        if self.report.top_assignees == Some(0) {
            return Err("report.top_assignees must be greater than 0 when set".to_string());
        }
        Ok(())
    }
}

fn default_cache_ttl_seconds() -> u64 {
    60
}

/// Report configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportConfig {
    /// Only show the N best assignees in terminal output
    #[serde(default)]
    pub top_assignees: Option<usize>,

    /// How long a computed report may be served from cache
    #[serde(default = "default_cache_ttl_seconds")]
    pub cache_ttl_seconds: u64,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            top_assignees: None,
            cache_ttl_seconds: default_cache_ttl_seconds(),
        }
    }
}

impl ReportConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds)
    }
}
