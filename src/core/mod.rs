pub mod errors;
pub mod types;

pub use errors::{Error, FetchError, Result, ResultExt};
pub use types::{
    Activity, ActivityRecord, FlexibleColumn, GridConfig, TaxonomyLevel, TaxonomyNode, Task, User,
};
