//! Progress rollups for construction sites.
//!
//! Activities carry two independent measurements: locally planned scope and
//! the contractual bill of quantities (BOQ). A single pass over a site's
//! activities classifies each one, resolves its scope and category, and
//! produces site-wide, per-category, per-assignee and BOQ-only views.
//!
//! ```rust
//! use siteprogress::core::{Activity, TaxonomyNode, Task};
//! use siteprogress::rollup::aggregate;
//!
//! let taxonomy = vec![
//!     TaxonomyNode::main("M1", "Civil Works"),
//!     TaxonomyNode::sub("S1", "Trenching", Some("M1")),
//! ];
//! let tasks = vec![Task::new("T1", "trenching")];
//! let activities = vec![Activity {
//!     scope_value: Some(200.0),
//!     qc_value: 50.0,
//!     ..Activity::new("Dig trench", "T1")
//! }];
//!
//! let report = aggregate(&taxonomy, &tasks, &activities, &[]);
//! assert_eq!(report.site_wide.totals.percentage.value(), 25.0);
//! assert!(report.by_main_category().contains_key("civil-works"));
//! ```

pub mod classify;
pub mod cli;
pub mod commands;
pub mod config;
pub mod core;
pub mod output;
pub mod rollup;
pub mod scope;
pub mod snapshot;
pub mod taxonomy;

pub use crate::classify::{classify, BoqTally, Classification, ExclusionReason, Tracks};
pub use crate::core::{Activity, Error, FetchError, Result, TaxonomyNode, Task, User};
pub use crate::rollup::{
    aggregate, AggregateBucket, AssigneeAggregate, BoqAggregate, Percentage, ProgressReport,
    RollupDiagnostics, SiteAggregate,
};
pub use crate::scope::resolve_scope;
pub use crate::snapshot::{aggregate_site, AggregationOutcome, JsonDirSource, ReportCache};
pub use crate::taxonomy::Taxonomy;
