//! Gathering the record sets the engine consumes.
//!
//! - [`SnapshotSource`]: read access to one site's records
//! - [`SnapshotLoader`]: batched, retried, all-or-nothing loading
//! - [`JsonDirSource`]: a directory of JSON exports
//! - [`ReportCache`]: short TTL memoisation for callers

pub mod cache;
pub mod json_dir;
pub mod loader;
pub mod source;

pub use cache::ReportCache;
pub use json_dir::JsonDirSource;
pub use loader::{aggregate_site, AggregationOutcome, SiteSnapshot, SnapshotLoader, SnapshotStats};
pub use source::{Fetched, SnapshotSource};
