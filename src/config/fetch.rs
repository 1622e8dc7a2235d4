//! Snapshot fetch configuration.
//!
//! The document store caps "any of N keys" queries, so activities are read
//! in batches of task ids. Batches are independent reads and may run
//! concurrently on rayon's thread pool.

use serde::{Deserialize, Serialize};

/// Store limit for membership queries.
pub const DEFAULT_BATCH_SIZE: usize = 10;

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

fn default_parallel() -> bool {
    true
}

/// Configuration for batched activity fetches.
///
/// # Example
///
/// ```rust
/// use siteprogress::config::FetchConfig;
///
/// let config = FetchConfig {
///     batch_size: 10,
///     parallel: true,
///     max_concurrency: Some(4),
/// };
/// assert_eq!(config.batch_count(25), 3);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FetchConfig {
    /// Task ids per activity query (default: 10)
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Issue batches concurrently (default: true)
    #[serde(default = "default_parallel")]
    pub parallel: bool,

    /// Upper bound on concurrent batches (default: available cores)
    #[serde(default)]
    pub max_concurrency: Option<usize>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            parallel: default_parallel(),
            max_concurrency: None,
        }
    }
}

impl FetchConfig {
    /// Batches issued one after another.
    pub fn sequential() -> Self {
        Self {
            parallel: false,
            ..Default::default()
        }
    }

    /// Batch size, never zero.
    pub fn effective_batch_size(&self) -> usize {
        self.batch_size.max(1)
    }

    pub fn effective_concurrency(&self) -> usize {
        self.max_concurrency.filter(|n| *n > 0).unwrap_or_else(num_cpus)
    }

    /// Number of queries needed for `task_count` task ids.
    pub fn batch_count(&self, task_count: usize) -> usize {
        task_count.div_ceil(self.effective_batch_size())
    }
}

fn num_cpus() -> usize {
    std::thread::available_parallelism()
        .map(|p| p.get())
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = FetchConfig::default();
        assert_eq!(config.batch_size, 10);
        assert!(config.parallel);
        assert!(config.max_concurrency.is_none());
    }

    #[test]
    fn test_sequential_config() {
        assert!(!FetchConfig::sequential().parallel);
    }

    #[test]
    fn test_zero_batch_size_is_treated_as_one() {
        let config = FetchConfig {
            batch_size: 0,
            ..Default::default()
        };
        assert_eq!(config.effective_batch_size(), 1);
        assert_eq!(config.batch_count(3), 3);
    }

    #[test]
    fn test_batch_count() {
        let config = FetchConfig::default();
        assert_eq!(config.batch_count(0), 0);
        assert_eq!(config.batch_count(10), 1);
        assert_eq!(config.batch_count(11), 2);
    }

    #[test]
    fn test_effective_concurrency() {
        let config = FetchConfig {
            max_concurrency: Some(3),
            ..Default::default()
        };
        assert_eq!(config.effective_concurrency(), 3);
        assert!(FetchConfig::default().effective_concurrency() >= 1);
    }

    #[test]
    fn test_deserialize_partial() {
        let config: FetchConfig = toml::from_str("batch_size = 5").unwrap();
        assert_eq!(config.batch_size, 5);
        assert!(config.parallel);
    }
}
