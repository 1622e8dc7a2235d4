//! Per-assignee rollups with task and category breakdowns.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use super::bucket::{AggregateBucket, CategoryTallies, Percentage, Tally};
use crate::core::{Task, User};
use crate::taxonomy::Taxonomy;

/// Looks users up by `id` or by `externalId`.
///
/// An `id` match wins when one string is both some user's `id` and another
/// user's `externalId`.
#[derive(Debug, Default)]
pub struct UserDirectory<'a> {
    by_id: HashMap<&'a str, &'a User>,
    by_external_id: HashMap<&'a str, &'a User>,
}

impl<'a> UserDirectory<'a> {
    pub fn new(users: &'a [User]) -> Self {
        let mut directory = Self::default();
        for user in users {
            directory.by_id.entry(user.id.as_str()).or_insert(user);
            if let Some(external) = user.external_id.as_deref().filter(|e| !e.is_empty()) {
                directory.by_external_id.entry(external).or_insert(user);
            }
        }
        directory
    }

    pub fn resolve(&self, assignee_id: &str) -> Option<&'a User> {
        self.by_id
            .get(assignee_id)
            .or_else(|| self.by_external_id.get(assignee_id))
            .copied()
    }
}

/// Progress of one task for one assignee.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskAggregate {
    pub task_id: String,
    pub display_name: String,
    pub sub_category: String,
    pub totals: AggregateBucket,
}

/// Everything one assignee contributed during a pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssigneeAggregate {
    pub user_id: String,
    pub name: String,
    pub role: String,
    pub activity_count: usize,
    pub totals: AggregateBucket,
    pub by_main_category: BTreeMap<String, AggregateBucket>,
    /// Sorted by descending task percentage.
    pub by_task: Vec<TaskAggregate>,
    /// Contractual measurements; percentages are shares of site-wide BOQ scope.
    pub boq: AggregateBucket,
    pub by_main_category_boq: BTreeMap<String, AggregateBucket>,
}

impl AssigneeAggregate {
    pub fn percentage(&self) -> Percentage {
        self.totals.percentage
    }
}

#[derive(Debug)]
struct TaskTallies {
    task_id: String,
    display_name: String,
    sub_category: String,
    tally: Tally,
}

#[derive(Debug)]
struct AssigneeTallies {
    user: User,
    activity_count: usize,
    total: Tally,
    by_main_category: CategoryTallies,
    tasks: Vec<TaskTallies>,
    task_index: HashMap<String, usize>,
    boq: Tally,
    by_main_category_boq: CategoryTallies,
}

impl AssigneeTallies {
    fn new(user: &User) -> Self {
        Self {
            user: user.clone(),
            activity_count: 0,
            total: Tally::default(),
            by_main_category: CategoryTallies::default(),
            tasks: Vec::new(),
            task_index: HashMap::new(),
            boq: Tally::default(),
            by_main_category_boq: CategoryTallies::default(),
        }
    }
}

/// One local-track activity as seen by the assignee rollup.
#[derive(Debug, Clone, Copy)]
pub(crate) struct AssigneeContribution<'a> {
    pub task_id: Option<&'a str>,
    pub task: Option<&'a Task>,
    pub sub_category: &'a str,
    pub main_key: Option<&'a str>,
    pub local: Tally,
    pub boq: Option<Tally>,
}

/// Accumulates per-assignee tallies in first-seen order.
#[derive(Debug, Default)]
pub(crate) struct AssigneeRollup {
    entries: Vec<AssigneeTallies>,
    index: HashMap<String, usize>,
}

impl AssigneeRollup {
    pub fn add(&mut self, user: &User, contribution: AssigneeContribution<'_>, taxonomy: &Taxonomy) {
        let slot = match self.index.get(&user.id) {
            Some(&slot) => slot,
            None => {
                self.entries.push(AssigneeTallies::new(user));
                self.index.insert(user.id.clone(), self.entries.len() - 1);
                self.entries.len() - 1
            }
        };
        let entry = &mut self.entries[slot];

        entry.activity_count += 1;
        entry.total += contribution.local;
        entry
            .by_main_category
            .add(contribution.main_key, contribution.local);

        if let Some(task_id) = contribution.task_id {
            let task_slot = match entry.task_index.get(task_id) {
                Some(&task_slot) => task_slot,
                None => {
                    entry.tasks.push(task_tallies(task_id, contribution, taxonomy));
                    entry
                        .task_index
                        .insert(task_id.to_string(), entry.tasks.len() - 1);
                    entry.tasks.len() - 1
                }
            };
            entry.tasks[task_slot].tally += contribution.local;
        }

        if let Some(boq) = contribution.boq {
            entry.boq += boq;
            entry.by_main_category_boq.add(contribution.main_key, boq);
        }
    }

    /// Finalize against the site-wide BOQ totals and sort by percentage.
    pub fn finish(
        self,
        site_boq: &Tally,
        site_boq_categories: &CategoryTallies,
    ) -> Vec<AssigneeAggregate> {
        let mut aggregates: Vec<AssigneeAggregate> = self
            .entries
            .into_iter()
            .map(|entry| {
                let mut by_task: Vec<TaskAggregate> = entry
                    .tasks
                    .into_iter()
                    .map(|task| TaskAggregate {
                        task_id: task.task_id,
                        display_name: task.display_name,
                        sub_category: task.sub_category,
                        totals: task.tally.finish(),
                    })
                    .collect();
                sort_by_percentage(&mut by_task, |t| t.totals.percentage);

                AssigneeAggregate {
                    user_id: entry.user.id,
                    name: entry.user.name,
                    role: entry.user.role,
                    activity_count: entry.activity_count,
                    totals: entry.total.finish(),
                    by_main_category: entry.by_main_category.finish(),
                    by_task,
                    boq: entry.boq.finish_against(site_boq.scope),
                    by_main_category_boq: entry
                        .by_main_category_boq
                        .finish_against(site_boq_categories),
                }
            })
            .collect();

        sort_by_percentage(&mut aggregates, AssigneeAggregate::percentage);
        aggregates
    }
}

fn task_tallies(task_id: &str, contribution: AssigneeContribution<'_>, taxonomy: &Taxonomy) -> TaskTallies {
    let display_name = match contribution.task {
        Some(task) => task.display_name(),
        None => Task::new(task_id, "").display_name(),
    };
    let sub_category = contribution
        .task
        .map(|t| t.sub_category_key.as_str())
        .filter(|key| !key.trim().is_empty())
        .unwrap_or(contribution.sub_category);

    TaskTallies {
        task_id: task_id.to_string(),
        display_name,
        sub_category: taxonomy.sub_name(sub_category).to_string(),
        tally: Tally::default(),
    }
}

/// Descending by percentage; `sort_by` is stable so ties keep scan order.
fn sort_by_percentage<T>(items: &mut [T], key: impl Fn(&T) -> Percentage) {
    items.sort_by(|a, b| {
        key(b)
            .partial_cmp(&key(a))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}
