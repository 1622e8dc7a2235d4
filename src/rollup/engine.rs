//! Single-pass rollup over one site snapshot.
//!
//! Each activity is classified once and its numbers are pushed into every
//! structure it is eligible for, so the four views always describe the same
//! activity set:
//!
//! - `site_wide`: local-scope track, global and per main category
//! - `by_assignee`: local-scope track per resolved user, with task and
//!   category breakdowns plus a contractual share
//! - `boq_only`: contractual track, global and per main category
//! - `diagnostics`: why activities were left out
//!
//! Percentages are derived after the pass from final sums.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use tracing::{debug, debug_span};

use super::assignee::{AssigneeAggregate, AssigneeContribution, AssigneeRollup, UserDirectory};
use super::bucket::{AggregateBucket, CategoryTallies, Tally};
use crate::classify::{classify, BoqTally, ExclusionReason};
use crate::core::{Activity, TaxonomyNode, Task, User};
use crate::taxonomy::Taxonomy;

/// Local-scope progress for the whole site.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteAggregate {
    pub totals: AggregateBucket,
    pub by_main_category: BTreeMap<String, AggregateBucket>,
}

/// Contractual (bill-of-quantities) progress for the whole site.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoqAggregate {
    pub totals: AggregateBucket,
    pub by_main_category: BTreeMap<String, AggregateBucket>,
    #[serde(rename = "activitiesWithBOQ")]
    pub activities_with_boq: usize,
    #[serde(rename = "activitiesWithoutBOQ")]
    pub activities_without_boq: usize,
}

/// Counts that explain the gap between scanned and rolled-up activities.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RollupDiagnostics {
    pub activities_scanned: usize,
    pub excluded: BTreeMap<ExclusionReason, usize>,
    /// Eligible activities whose sub-category has no main category.
    pub uncategorized_activities: usize,
    /// Local-track activities naming an assignee absent from the user set.
    pub unresolved_assignees: usize,
    pub orphaned_sub_categories: usize,
}

/// All four views produced by one pass.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressReport {
    pub site_wide: SiteAggregate,
    /// Sorted by descending local percentage.
    pub by_assignee: Vec<AssigneeAggregate>,
    pub boq_only: BoqAggregate,
    pub diagnostics: RollupDiagnostics,
    /// Display names for every main-category key in the taxonomy.
    pub category_names: BTreeMap<String, String>,
}

impl ProgressReport {
    fn empty(taxonomy: &Taxonomy) -> Self {
        Self {
            diagnostics: RollupDiagnostics {
                orphaned_sub_categories: taxonomy.orphaned_subs(),
                ..Default::default()
            },
            category_names: category_names(taxonomy),
            ..Default::default()
        }
    }

    /// Site-wide local progress per main category.
    pub fn by_main_category(&self) -> &BTreeMap<String, AggregateBucket> {
        &self.site_wide.by_main_category
    }

    pub fn assignee(&self, user_id: &str) -> Option<&AssigneeAggregate> {
        self.by_assignee.iter().find(|a| a.user_id == user_id)
    }

    pub fn category_name<'a>(&'a self, key: &'a str) -> &'a str {
        self.category_names
            .get(key)
            .map(String::as_str)
            .unwrap_or(key)
    }

    /// True when nothing was rolled up on either track.
    pub fn is_empty(&self) -> bool {
        self.site_wide.totals.is_zero() && self.boq_only.totals.is_zero()
    }
}

fn category_names(taxonomy: &Taxonomy) -> BTreeMap<String, String> {
    taxonomy
        .all_main_keys()
        .iter()
        .map(|key| (key.clone(), taxonomy.main_name(key).to_string()))
        .collect()
}

/// Roll up a full snapshot.
///
/// ```rust
/// use siteprogress::core::{Activity, TaxonomyNode, Task, User};
/// use siteprogress::rollup::aggregate;
///
/// let taxonomy = vec![
///     TaxonomyNode::main("M1", "Cabling"),
///     TaxonomyNode::sub("S1", "mv-cable", Some("M1")),
/// ];
/// let tasks = vec![Task::new("T1", "mv-cable")];
/// let activities = vec![Activity {
///     sub_category_key: "mv-cable".into(),
///     scope_value: Some(100.0),
///     qc_value: 40.0,
///     supervisor_input_value: 70.0,
///     assignee_id: Some("U1".into()),
///     ..Activity::new("Pull cable", "T1")
/// }];
/// let users = vec![User { id: "U1".into(), ..Default::default() }];
///
/// let report = aggregate(&taxonomy, &tasks, &activities, &users);
/// assert_eq!(report.site_wide.totals.percentage.value(), 40.0);
/// assert_eq!(report.by_main_category()["cabling"].scope, 100.0);
/// ```
pub fn aggregate(
    taxonomy: &[TaxonomyNode],
    tasks: &[Task],
    activities: &[Activity],
    users: &[User],
) -> ProgressReport {
    let taxonomy = Taxonomy::resolve(taxonomy);
    aggregate_resolved(&taxonomy, tasks, activities, users)
}

/// Roll up a snapshot against an already resolved taxonomy.
pub fn aggregate_resolved(
    taxonomy: &Taxonomy,
    tasks: &[Task],
    activities: &[Activity],
    users: &[User],
) -> ProgressReport {
    let _span = debug_span!(
        "rollup",
        tasks = tasks.len(),
        activities = activities.len(),
        users = users.len()
    )
    .entered();

    if tasks.is_empty() {
        debug!("no tasks in snapshot, returning empty report");
        return ProgressReport::empty(taxonomy);
    }

    let mut pipeline = RollupPipeline::new(taxonomy, tasks, users);
    for activity in activities {
        pipeline.add_activity(activity);
    }
    pipeline.finish()
}

/// Accumulator threaded through one pass.
pub struct RollupPipeline<'a> {
    taxonomy: &'a Taxonomy,
    tasks: HashMap<&'a str, &'a Task>,
    users: UserDirectory<'a>,
    site: Tally,
    site_categories: CategoryTallies,
    boq: Tally,
    boq_categories: CategoryTallies,
    tally: BoqTally,
    assignees: AssigneeRollup,
    diagnostics: RollupDiagnostics,
}

impl<'a> RollupPipeline<'a> {
    pub fn new(taxonomy: &'a Taxonomy, tasks: &'a [Task], users: &'a [User]) -> Self {
        Self {
            taxonomy,
            tasks: tasks.iter().map(|t| (t.id.as_str(), t)).collect(),
            users: UserDirectory::new(users),
            site: Tally::default(),
            site_categories: CategoryTallies::default(),
            boq: Tally::default(),
            boq_categories: CategoryTallies::default(),
            tally: BoqTally::default(),
            assignees: AssigneeRollup::default(),
            diagnostics: RollupDiagnostics {
                orphaned_sub_categories: taxonomy.orphaned_subs(),
                ..Default::default()
            },
        }
    }

    pub fn add_activity(&mut self, activity: &Activity) {
        let taxonomy = self.taxonomy;
        self.diagnostics.activities_scanned += 1;

        let classification = classify(activity);
        self.tally.record(&classification);
        if let Some(reason) = classification.reason {
            *self.diagnostics.excluded.entry(reason).or_default() += 1;
        }
        if !classification.eligible {
            return;
        }

        let task_id = activity.task_ref();
        let task = task_id.and_then(|id| self.tasks.get(id).copied());
        let sub_category = effective_sub_category(activity, task);
        let main_key = taxonomy.main_for(sub_category);
        if main_key.is_none() {
            self.diagnostics.uncategorized_activities += 1;
        }

        let boq = classification.tracks.boq.then(|| {
            Tally::new(
                activity.qc_value,
                activity.supervisor_input_value,
                classification.boq_scope,
            )
        });
        if let Some(boq) = boq {
            self.boq += boq;
            self.boq_categories.add(main_key, boq);
        }

        if !classification.tracks.local {
            return;
        }
        let local = Tally::new(
            activity.qc_value,
            activity.supervisor_input_value,
            classification.local_scope,
        );
        self.site += local;
        self.site_categories.add(main_key, local);

        let Some(assignee_id) = activity.assignee_ref() else {
            return;
        };
        match self.users.resolve(assignee_id) {
            Some(user) => self.assignees.add(
                user,
                AssigneeContribution {
                    task_id,
                    task,
                    sub_category,
                    main_key,
                    local,
                    boq,
                },
                taxonomy,
            ),
            None => {
                debug!(assignee = assignee_id, activity = %activity.name, "assignee not found in user set");
                self.diagnostics.unresolved_assignees += 1;
            }
        }
    }

    pub fn finish(self) -> ProgressReport {
        let by_assignee = self.assignees.finish(&self.boq, &self.boq_categories);

        let report = ProgressReport {
            site_wide: SiteAggregate {
                totals: self.site.finish(),
                by_main_category: self.site_categories.finish(),
            },
            by_assignee,
            boq_only: BoqAggregate {
                totals: self.boq.finish(),
                by_main_category: self.boq_categories.finish(),
                activities_with_boq: self.tally.activities_with_boq,
                activities_without_boq: self.tally.activities_without_boq,
            },
            diagnostics: self.diagnostics,
            category_names: category_names(self.taxonomy),
        };

        debug!(
            site_percentage = report.site_wide.totals.percentage.value(),
            boq_percentage = report.boq_only.totals.percentage.value(),
            assignees = report.by_assignee.len(),
            "rollup complete"
        );
        report
    }
}

/// The activity's own sub-category, or its task's when the activity has none.
fn effective_sub_category<'a>(activity: &'a Activity, task: Option<&'a Task>) -> &'a str {
    if !activity.sub_category_key.trim().is_empty() {
        return &activity.sub_category_key;
    }
    task.map_or("", |t| t.sub_category_key.as_str())
}
