//! Short-lived memoisation of site reports.
//!
//! The engine itself is stateless; callers that serve the same site
//! repeatedly can put this in front of [`aggregate_site`](super::aggregate_site).
//! Only `Ready` outcomes are stored, so an unavailable snapshot is retried
//! on the next call instead of being served stale.

use std::time::{Duration, Instant};

use dashmap::DashMap;
use tracing::debug;

use super::loader::AggregationOutcome;
use crate::config::ReportConfig;

#[derive(Debug, Clone)]
struct CachedOutcome {
    outcome: AggregationOutcome,
    stored_at: Instant,
}

/// Concurrent TTL cache of aggregation outcomes keyed by site.
#[derive(Debug)]
pub struct ReportCache {
    entries: DashMap<String, CachedOutcome>,
    ttl: Duration,
}

impl ReportCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// Cache whose TTL is the `[report] cache_ttl_seconds` setting.
    pub fn from_config(config: &ReportConfig) -> Self {
        Self::new(config.cache_ttl())
    }

    /// Fresh cached outcome for `site`, if any. Expired entries are evicted.
    pub fn get(&self, site: &str) -> Option<AggregationOutcome> {
        self.entries
            .remove_if(site, |_, entry| entry.stored_at.elapsed() >= self.ttl);
        self.entries.get(site).map(|entry| entry.outcome.clone())
    }

    /// Cached outcome for `site`, or the result of `load` (cached if ready).
    pub fn get_or_load(
        &self,
        site: &str,
        load: impl FnOnce() -> AggregationOutcome,
    ) -> AggregationOutcome {
        if let Some(outcome) = self.get(site) {
            debug!(site, "report served from cache");
            return outcome;
        }
        let outcome = load();
        if outcome.is_ready() {
            self.entries.insert(
                site.to_string(),
                CachedOutcome {
                    outcome: outcome.clone(),
                    stored_at: Instant::now(),
                },
            );
        }
        outcome
    }

    pub fn invalidate(&self, site: &str) {
        self.entries.remove(site);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
