//! Progress rollups over a site snapshot.

pub mod assignee;
pub mod bucket;
pub mod engine;

pub use assignee::{AssigneeAggregate, TaskAggregate, UserDirectory};
pub use bucket::{AggregateBucket, Percentage, Tally};
pub use engine::{
    aggregate, aggregate_resolved, BoqAggregate, ProgressReport, RollupDiagnostics,
    RollupPipeline, SiteAggregate,
};
