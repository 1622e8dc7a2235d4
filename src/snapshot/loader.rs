//! Gathers a complete site snapshot from a [`SnapshotSource`].
//!
//! Taxonomy, tasks and users are independent reads. Activities are read
//! by task-id membership in batches no larger than the store's query limit,
//! and batches may run concurrently. Each fetch is retried on transient
//! failure; any fetch that still fails aborts the load, so a snapshot is
//! either complete or absent.

use std::thread;
use std::time::Instant;

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, info_span, warn};

use super::source::{Fetched, SnapshotSource};
use crate::config::{FetchConfig, RetryConfig, SiteProgressConfig};
use crate::core::{Activity, ActivityRecord, Error, FetchError, TaxonomyNode, Task, User};
use crate::rollup::{aggregate, ProgressReport};

/// Bookkeeping for one load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotStats {
    pub activity_batches: usize,
    pub retries: u32,
    pub skipped_records: usize,
}

/// Immutable input for one aggregation pass.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SiteSnapshot {
    pub site: String,
    pub taxonomy: Vec<TaxonomyNode>,
    pub tasks: Vec<Task>,
    pub activities: Vec<Activity>,
    pub users: Vec<User>,
    pub stats: SnapshotStats,
}

impl SiteSnapshot {
    pub fn aggregate(&self) -> ProgressReport {
        aggregate(&self.taxonomy, &self.tasks, &self.activities, &self.users)
    }
}

/// Loads snapshots with the configured batching and retry policy.
pub struct SnapshotLoader<S> {
    source: S,
    fetch: FetchConfig,
    retry: RetryConfig,
}

impl<S: SnapshotSource> SnapshotLoader<S> {
    pub fn new(source: S, fetch: FetchConfig, retry: RetryConfig) -> Self {
        Self {
            source,
            fetch,
            retry,
        }
    }

    pub fn from_config(source: S, config: &SiteProgressConfig) -> Self {
        Self::new(source, config.fetch.clone(), config.retry.clone())
    }

    /// Fetch every record set for `site`.
    pub fn load(&self, site: &str) -> Result<SiteSnapshot, FetchError> {
        let _span = info_span!("load_snapshot", site).entered();

        let (lookups, tasks) = if self.fetch.parallel {
            rayon::join(
                || self.load_lookups(site),
                || self.with_retry("tasks", || self.source.fetch_tasks(site)),
            )
        } else {
            (
                self.load_lookups(site),
                self.with_retry("tasks", || self.source.fetch_tasks(site)),
            )
        };
        let ((taxonomy, users), mut stats) = lookups?;
        let (tasks, task_stats) = tasks?;
        stats.absorb(task_stats);

        let (records, activity_stats) = self.load_activities(site, &tasks)?;
        stats.absorb(activity_stats);

        info!(
            taxonomy = taxonomy.len(),
            tasks = tasks.len(),
            activities = records.len(),
            users = users.len(),
            batches = stats.activity_batches,
            retries = stats.retries,
            "snapshot loaded"
        );

        Ok(SiteSnapshot {
            site: site.to_string(),
            taxonomy,
            tasks,
            activities: records.into_iter().map(Activity::from).collect(),
            users,
            stats,
        })
    }

    #[allow(clippy::type_complexity)]
    fn load_lookups(
        &self,
        site: &str,
    ) -> Result<((Vec<TaxonomyNode>, Vec<User>), SnapshotStats), FetchError> {
        let (taxonomy, taxonomy_stats) =
            self.with_retry("taxonomy", || self.source.fetch_taxonomy(site))?;
        let (users, user_stats) = self.with_retry("users", || self.source.fetch_users(site))?;

        let mut stats = taxonomy_stats;
        stats.absorb(user_stats);
        Ok(((taxonomy, users), stats))
    }

    fn load_activities(
        &self,
        site: &str,
        tasks: &[Task],
    ) -> Result<(Vec<ActivityRecord>, SnapshotStats), FetchError> {
        if tasks.is_empty() {
            debug!("no tasks, skipping activity fetch");
            return Ok((Vec::new(), SnapshotStats::default()));
        }

        let task_ids: Vec<String> = tasks.iter().map(|t| t.id.clone()).collect();
        let batches: Vec<&[String]> = task_ids.chunks(self.fetch.effective_batch_size()).collect();
        debug!(batches = batches.len(), "fetching activities");

        let fetch_batch =
            |ids: &&[String]| self.with_retry("activities", || self.source.fetch_activities(site, ids));

        let results: Vec<(Vec<ActivityRecord>, SnapshotStats)> = if self.fetch.parallel {
            let run = || batches.par_iter().map(fetch_batch).collect::<Result<Vec<_>, _>>();
            if self.fetch.max_concurrency.is_some() {
                rayon::ThreadPoolBuilder::new()
                    .num_threads(self.fetch.effective_concurrency())
                    .build()
                    .map_err(|e| FetchError::permanent("activities", e.to_string()))?
                    .install(run)?
            } else {
                run()?
            }
        } else {
            batches.iter().map(fetch_batch).collect::<Result<Vec<_>, _>>()?
        };

        let mut stats = SnapshotStats {
            activity_batches: batches.len(),
            ..Default::default()
        };
        let mut records = Vec::new();
        for (batch, batch_stats) in results {
            records.extend(batch);
            stats.absorb(batch_stats);
        }
        Ok((records, stats))
    }

    /// Run `fetch` until it succeeds or the retry policy gives up.
    fn with_retry<T>(
        &self,
        collection: &str,
        fetch: impl Fn() -> Result<Fetched<T>, FetchError>,
    ) -> Result<(Vec<T>, SnapshotStats), FetchError> {
        let started = Instant::now();
        let mut attempt = 0;
        loop {
            match fetch() {
                Ok(fetched) => {
                    if fetched.skipped > 0 {
                        warn!(collection, skipped = fetched.skipped, "undecodable records skipped");
                    }
                    let stats = SnapshotStats {
                        retries: attempt,
                        skipped_records: fetched.skipped,
                        ..Default::default()
                    };
                    return Ok((fetched.records, stats));
                }
                Err(e) if e.is_retryable() && self.retry.should_retry(attempt, started.elapsed()) => {
                    attempt += 1;
                    let delay = self.retry.delay_for_attempt(attempt);
                    warn!(collection, attempt, ?delay, error = %e, "fetch failed, retrying");
                    thread::sleep(delay);
                }
                Err(e) => {
                    warn!(collection, attempts = attempt + 1, error = %e, "fetch failed");
                    return Err(e);
                }
            }
        }
    }
}

impl SnapshotStats {
    fn absorb(&mut self, other: SnapshotStats) {
        self.activity_batches += other.activity_batches;
        self.retries += other.retries;
        self.skipped_records += other.skipped_records;
    }
}

/// Result of a fetch-and-aggregate call.
///
/// `Unavailable` is distinct from an all-zero report: it means the data
/// could not be gathered, not that no progress exists.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum AggregationOutcome {
    Ready {
        site: String,
        report: ProgressReport,
        stats: SnapshotStats,
    },
    Unavailable {
        site: String,
        reason: String,
    },
}

impl AggregationOutcome {
    pub fn report(&self) -> Option<&ProgressReport> {
        match self {
            Self::Ready { report, .. } => Some(report),
            Self::Unavailable { .. } => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready { .. })
    }
}

/// Load `site` and roll it up; never returns a partial report.
pub fn aggregate_site<S: SnapshotSource>(
    source: S,
    site: &str,
    config: &SiteProgressConfig,
) -> AggregationOutcome {
    let loader = SnapshotLoader::from_config(source, config);
    match loader.load(site) {
        Ok(snapshot) => AggregationOutcome::Ready {
            site: site.to_string(),
            report: snapshot.aggregate(),
            stats: snapshot.stats,
        },
        Err(e) => {
            let error = Error::fetch(site, e);
            warn!(%error, "no report produced");
            AggregationOutcome::Unavailable {
                site: site.to_string(),
                reason: error.to_string(),
            }
        }
    }
}
