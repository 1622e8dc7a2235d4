//! File-backed snapshot source.
//!
//! Reads one directory per site, each holding a JSON array per record set:
//!
//! ```text
//! <root>/<site>/taxonomy.json
//! <root>/<site>/tasks.json
//! <root>/<site>/activities.json
//! <root>/<site>/users.json
//! ```
//!
//! Elements that do not decode into the expected record shape are skipped
//! and counted; a missing or unparseable file fails the fetch.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use super::source::{Fetched, SnapshotSource};
use crate::core::{ActivityRecord, FetchError, TaxonomyNode, Task, User};

pub const TAXONOMY_FILE: &str = "taxonomy.json";
pub const TASKS_FILE: &str = "tasks.json";
pub const ACTIVITIES_FILE: &str = "activities.json";
pub const USERS_FILE: &str = "users.json";

/// Snapshot source over a directory of JSON exports.
#[derive(Debug, Clone)]
pub struct JsonDirSource {
    root: PathBuf,
}

impl JsonDirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn site_dir(&self, site: &str) -> PathBuf {
        self.root.join(site)
    }

    fn read_records<T: DeserializeOwned>(
        &self,
        site: &str,
        file: &str,
    ) -> Result<Fetched<T>, FetchError> {
        let values = read_array(&self.site_dir(site).join(file), file)?;
        Ok(decode_records(values, file))
    }
}

fn decode_records<T: DeserializeOwned>(values: Vec<Value>, file: &str) -> Fetched<T> {
    let total = values.len();
    let records: Vec<T> = values
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value(value) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(file, index, error = %e, "skipping malformed record");
                None
            }
        })
        .collect();

    let skipped = total - records.len();
    debug!(file, records = records.len(), skipped, "decoded records");
    Fetched::new(records, skipped)
}

fn read_array(path: &Path, collection: &str) -> Result<Vec<Value>, FetchError> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        let message = format!("{}: {}", path.display(), e);
        match e.kind() {
            ErrorKind::NotFound | ErrorKind::PermissionDenied | ErrorKind::InvalidData => {
                FetchError::permanent(collection, message)
            }
            _ => FetchError::transient(collection, message),
        }
    })?;

    serde_json::from_str::<Vec<Value>>(&contents).map_err(|e| {
        FetchError::permanent(
            collection,
            format!("{} is not a JSON array of records: {}", path.display(), e),
        )
    })
}

impl SnapshotSource for JsonDirSource {
    fn fetch_taxonomy(&self, site: &str) -> Result<Fetched<TaxonomyNode>, FetchError> {
        self.read_records(site, TAXONOMY_FILE)
    }

    fn fetch_tasks(&self, site: &str) -> Result<Fetched<Task>, FetchError> {
        self.read_records(site, TASKS_FILE)
    }

    fn fetch_users(&self, site: &str) -> Result<Fetched<User>, FetchError> {
        self.read_records(site, USERS_FILE)
    }

    fn fetch_activities(
        &self,
        site: &str,
        task_ids: &[String],
    ) -> Result<Fetched<ActivityRecord>, FetchError> {
        let path = self.site_dir(site).join(ACTIVITIES_FILE);
        let in_batch: Vec<Value> = read_array(&path, ACTIVITIES_FILE)?
            .into_iter()
            .filter(|value| {
                value
                    .get("taskId")
                    .and_then(Value::as_str)
                    .is_some_and(|id| task_ids.iter().any(|wanted| wanted == id))
            })
            .collect();
        Ok(decode_records(in_batch, ACTIVITIES_FILE))
    }
}
