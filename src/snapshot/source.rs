//! The record store seen from the engine's side.
//!
//! The engine never talks to the document store. The caller gathers the four
//! record sets through a [`SnapshotSource`] and hands them over as one
//! immutable snapshot. Implementations may be a remote store client, a local
//! cache, or a test fixture.

use crate::core::{ActivityRecord, FetchError, TaxonomyNode, Task, User};

/// Records returned by one fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct Fetched<T> {
    pub records: Vec<T>,
    /// Records the source could not decode and left out.
    pub skipped: usize,
}

impl<T> Fetched<T> {
    pub fn new(records: Vec<T>, skipped: usize) -> Self {
        Self { records, skipped }
    }
}

impl<T> From<Vec<T>> for Fetched<T> {
    fn from(records: Vec<T>) -> Self {
        Self {
            records,
            skipped: 0,
        }
    }
}

/// Read access to one site's records.
///
/// Implementations must be `Send + Sync`: activity batches are fetched
/// concurrently.
pub trait SnapshotSource: Send + Sync {
    /// All menu-taxonomy records for `site`.
    fn fetch_taxonomy(&self, site: &str) -> Result<Fetched<TaxonomyNode>, FetchError>;

    /// All tasks for `site`.
    fn fetch_tasks(&self, site: &str) -> Result<Fetched<Task>, FetchError>;

    /// All potential assignees for `site`.
    fn fetch_users(&self, site: &str) -> Result<Fetched<User>, FetchError>;

    /// Activities whose `taskId` is one of `task_ids`.
    ///
    /// Callers never pass more ids than the store's membership-query limit.
    fn fetch_activities(
        &self,
        site: &str,
        task_ids: &[String],
    ) -> Result<Fetched<ActivityRecord>, FetchError>;
}

impl<S: SnapshotSource + ?Sized> SnapshotSource for &S {
    fn fetch_taxonomy(&self, site: &str) -> Result<Fetched<TaxonomyNode>, FetchError> {
        (**self).fetch_taxonomy(site)
    }

    fn fetch_tasks(&self, site: &str) -> Result<Fetched<Task>, FetchError> {
        (**self).fetch_tasks(site)
    }

    fn fetch_users(&self, site: &str) -> Result<Fetched<User>, FetchError> {
        (**self).fetch_users(site)
    }

    fn fetch_activities(
        &self,
        site: &str,
        task_ids: &[String],
    ) -> Result<Fetched<ActivityRecord>, FetchError> {
        (**self).fetch_activities(site, task_ids)
    }
}
